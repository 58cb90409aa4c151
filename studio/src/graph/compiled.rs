//! Compiled state graph: immutable, supports `invoke` and `stream`.
//!
//! Built by `StateGraph::compile`. Each run starts at the entry node and executes
//! exactly one node at a time; the next node is chosen by the node's fixed edge or
//! by its conditional router evaluated on the state the node returned. The run ends
//! when END is reached, a node fails, the step budget is exhausted, or the run's
//! cancellation token fires.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::error::{AgentError, RunError};
use crate::stream::StreamEvent;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_missing_write, log_node_complete,
    log_node_start, log_node_state, log_route,
};
use super::node::FieldCheckFn;
use super::retry::RetryPolicy;
use super::state_graph::END;
use super::{NextEntry, Node, RunConfig};

/// Compiled graph: immutable structure, cheap to clone, safe to run concurrently.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Registration order of node ids.
    pub(super) node_order: Vec<String>,
    pub(super) entry: String,
    /// Node id → how to pick the next node.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) retry_policy: RetryPolicy,
    pub(super) field_check: Option<FieldCheckFn<S>>,
    pub(super) step_limit: usize,
}

type EventTx<S> = mpsc::Sender<StreamEvent<S>>;

/// Sends `event` to the stream consumer, if any. A dropped receiver stops the run as
/// cancelled at `node_id`.
async fn emit<S>(
    tx: Option<&EventTx<S>>,
    node_id: &str,
    event: StreamEvent<S>,
) -> Result<(), RunError>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    match tx {
        Some(tx) if tx.send(event).await.is_err() => {
            tracing::info!(node_id = node_id, "stream receiver dropped, stopping run");
            Err(RunError::Cancelled {
                node_id: node_id.to_string(),
            })
        }
        _ => Ok(()),
    }
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node ids in registration order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_order
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    /// Runs one node, retrying transient failures per the retry policy. The node (and
    /// any backoff sleep) is raced against the cancellation token.
    async fn execute_node_with_retry(
        &self,
        node_id: &str,
        node: &Arc<dyn Node<S>>,
        state: &S,
        cancel: Option<&CancellationToken>,
    ) -> Result<S, RunError> {
        let mut attempt = 0;
        loop {
            let result = match cancel {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        return Err(RunError::Cancelled { node_id: node_id.to_string() });
                    }
                    r = node.run(state.clone()) => r,
                },
                None => node.run(state.clone()).await,
            };

            match result {
                Ok(next) => return Ok(next),
                Err(e) if e.is_transient() && self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay(attempt);
                    tracing::warn!(
                        node_id = node_id,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient node failure, retrying"
                    );
                    if !delay.is_zero() {
                        match cancel {
                            Some(token) => tokio::select! {
                                biased;
                                _ = token.cancelled() => {
                                    return Err(RunError::Cancelled { node_id: node_id.to_string() });
                                }
                                _ = tokio::time::sleep(delay) => {}
                            },
                            None => tokio::time::sleep(delay).await,
                        }
                    }
                    attempt += 1;
                }
                Err(e) => {
                    return Err(RunError::Node {
                        node_id: node_id.to_string(),
                        source: e,
                    })
                }
            }
        }
    }

    fn check_reads(&self, node_id: &str, node: &Arc<dyn Node<S>>, state: &S) -> Result<(), RunError> {
        let Some(check) = &self.field_check else {
            return Ok(());
        };
        match node.reads().iter().find(|field| !check(state, **field)) {
            Some(field) => Err(RunError::Node {
                node_id: node_id.to_string(),
                source: AgentError::missing(*field),
            }),
            None => Ok(()),
        }
    }

    fn check_writes(&self, node_id: &str, node: &Arc<dyn Node<S>>, state: &S) {
        if let Some(check) = &self.field_check {
            for field in node.writes().iter().filter(|field| !check(state, **field)) {
                log_missing_write(node_id, field);
            }
        }
    }

    /// Picks the node after `current_id`. Applies the branch update of the chosen label.
    async fn next_node(
        &self,
        current_id: &str,
        state: &mut S,
        tx: Option<&EventTx<S>>,
    ) -> Result<String, RunError> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Unconditional(to)) => Ok(to.clone()),
            Some(NextEntry::Conditional(router)) => {
                let decision = router.decide(state);
                let Some(target) = decision.target else {
                    return Err(RunError::UnknownLabel {
                        node_id: current_id.to_string(),
                        label: decision.label,
                    });
                };
                router.apply_update(&decision.label, state);
                log_route(current_id, &decision.label, &target);
                emit(
                    tx,
                    current_id,
                    StreamEvent::Route {
                        from: current_id.to_string(),
                        label: decision.label,
                        to: target.clone(),
                    },
                )
                .await?;
                Ok(target)
            }
            // compile() guarantees every node has an exit; treat a gap as END.
            None => Ok(END.to_string()),
        }
    }

    /// Shared run loop used by `invoke` and `stream`.
    async fn run_loop(
        &self,
        mut state: S,
        config: &RunConfig,
        tx: Option<&EventTx<S>>,
    ) -> Result<S, RunError> {
        let limit = config.step_limit.unwrap_or(self.step_limit);
        let cancel = config.cancel.as_ref();
        let mut current_id = self.entry.clone();
        let mut steps = 0usize;

        loop {
            let node = self
                .nodes
                .get(&current_id)
                .cloned()
                .ok_or(RunError::EmptyGraph)?;

            if cancel.is_some_and(|t| t.is_cancelled()) {
                return Err(RunError::Cancelled {
                    node_id: current_id,
                });
            }
            if steps >= limit {
                return Err(RunError::StepLimitExceeded {
                    limit,
                    node_id: current_id,
                });
            }
            steps += 1;

            log_node_start(&current_id, steps);
            log_node_state(&current_id, &state);
            emit(
                tx,
                &current_id,
                StreamEvent::TaskStart {
                    node_id: current_id.clone(),
                    step: steps,
                },
            )
            .await?;

            let outcome = match self.check_reads(&current_id, &node, &state) {
                Ok(()) => {
                    self.execute_node_with_retry(&current_id, &node, &state, cancel)
                        .await
                }
                Err(e) => Err(e),
            };
            state = match outcome {
                Ok(next) => next,
                Err(e) => {
                    emit(
                        tx,
                        &current_id,
                        StreamEvent::TaskEnd {
                            node_id: current_id.clone(),
                            result: Err(e.to_string()),
                        },
                    )
                    .await?;
                    return Err(e);
                }
            };

            self.check_writes(&current_id, &node, &state);
            log_node_complete(&current_id);
            emit(
                tx,
                &current_id,
                StreamEvent::TaskEnd {
                    node_id: current_id.clone(),
                    result: Ok(()),
                },
            )
            .await?;
            emit(
                tx,
                &current_id,
                StreamEvent::Updates {
                    node_id: current_id.clone(),
                    state: state.clone(),
                },
            )
            .await?;

            let next_id = self.next_node(&current_id, &mut state, tx).await?;
            if next_id == END {
                log_graph_complete(steps);
                return Ok(state);
            }
            current_id = next_id;
        }
    }

    async fn run_instrumented(
        &self,
        state: S,
        config: RunConfig,
        tx: Option<&EventTx<S>>,
    ) -> Result<S, RunError> {
        if self.nodes.is_empty() || !self.nodes.contains_key(&self.entry) {
            let err = RunError::EmptyGraph;
            log_graph_error(&err);
            return Err(err);
        }
        let run_id = config
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!("graph_run", run_id = %run_id);
        async {
            log_graph_start(&run_id);
            let result = self.run_loop(state, &config, tx).await;
            if let Err(e) = &result {
                log_graph_error(e);
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// Pass `None` for the defaults: random run id, the graph's step limit, no cancellation.
    pub async fn invoke(&self, state: S, config: Option<RunConfig>) -> Result<S, RunError> {
        self.run_instrumented(state, config.unwrap_or_default(), None)
            .await
    }

    /// Runs the graph on a spawned task and streams its progress. The final event is
    /// `Finished(state)` or `Failed(error)`.
    ///
    /// Dropping the returned stream cancels the run, including a node that is mid-call.
    /// A caller-supplied cancellation token is observed but never cancelled by this.
    pub fn stream(&self, state: S, config: Option<RunConfig>) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mut config = config.unwrap_or_default();
        let run_token = config
            .cancel
            .as_ref()
            .map(CancellationToken::child_token)
            .unwrap_or_default();
        config.cancel = Some(run_token.clone());

        let watch_tx = tx.clone();
        let watch_token = run_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watch_tx.closed() => watch_token.cancel(),
                _ = watch_token.cancelled() => {}
            }
        });

        tokio::spawn(async move {
            let result = graph.run_instrumented(state, config, Some(&tx)).await;
            // Run is over; release the receiver watcher.
            run_token.cancel();
            let last = match result {
                Ok(state) => StreamEvent::Finished(state),
                Err(e) => StreamEvent::Failed(e),
            };
            let _ = tx.send(last).await;
        });
        ReceiverStream::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FnNode, StateGraph};

    /// **Scenario**: a graph whose entry is not registered fails with EmptyGraph.
    #[tokio::test]
    async fn invoke_empty_graph_returns_empty_graph_error() {
        let graph = CompiledStateGraph::<i32> {
            nodes: HashMap::new(),
            node_order: vec![],
            entry: "missing".into(),
            next_map: HashMap::new(),
            retry_policy: RetryPolicy::None,
            field_check: None,
            step_limit: 10,
        };
        assert!(matches!(
            graph.invoke(0, None).await,
            Err(RunError::EmptyGraph)
        ));
    }

    #[tokio::test]
    async fn invoke_linear_chain() {
        let mut g = StateGraph::<i32>::new();
        g.add_node("inc", Arc::new(FnNode::new("inc", |s: i32| Ok(s + 1))))
            .unwrap()
            .add_node("dbl", Arc::new(FnNode::new("dbl", |s: i32| Ok(s * 2))))
            .unwrap()
            .set_entry_point("inc")
            .unwrap()
            .add_edge("inc", "dbl")
            .unwrap()
            .add_edge("dbl", END)
            .unwrap();
        let compiled = g.compile().unwrap();
        assert_eq!(compiled.invoke(3, None).await.unwrap(), 8);
    }

    /// **Scenario**: a declared read that the field check reports missing fails the run
    /// before the node body executes.
    #[tokio::test]
    async fn missing_read_fails_before_node_runs() {
        let mut g = StateGraph::<i32>::new().with_field_check(Arc::new(|s: &i32, field: &str| {
            field != "positive" || *s > 0
        }));
        g.add_node(
            "needs_positive",
            Arc::new(
                FnNode::new("needs_positive", |_s: i32| -> Result<i32, AgentError> {
                    panic!("node must not run")
                })
                .with_reads(&["positive"]),
            ),
        )
        .unwrap()
        .set_entry_point("needs_positive")
        .unwrap()
        .add_edge("needs_positive", END)
        .unwrap();
        let compiled = g.compile().unwrap();
        match compiled.invoke(0, None).await {
            Err(RunError::Node { node_id, source }) => {
                assert_eq!(node_id, "needs_positive");
                assert!(matches!(source, AgentError::MissingField(f) if f == "positive"));
            }
            other => panic!("expected missing field error, got {:?}", other),
        }
    }
}
