//! The content pipeline: agents wired into a state graph with two decision points.
//!
//! ```text
//! research ─┬─ writer ───► generate_hooks ─► write_script ─┐
//!           └─ shortform ► shortform_script ───────────────┤
//!                                                          ▼
//!            ┌──────────────► edit_script ─► post_process ─► evaluate_quality ─┬─ finish ─► END
//!            │                                                                  │
//!            └──────────────────────────── revise_script ◄─── revise ───────────┘
//! ```
//!
//! The revise branch is bounded by `QualityPolicy::max_revisions`; the counter and
//! the feedback are written by the branch update before `revise_script` runs.

use std::sync::Arc;

use crate::agents::{
    EditorAgent, HookAgent, PostProcessAgent, QualityAgent, ResearchAgent, ScriptWriter,
    ShortFormAgent,
};
use crate::graph::{CompilationError, CompiledStateGraph, StateGraph, END};
use crate::llm::LlmClient;
use crate::settings::{PipelineSettings, QualityPolicy};
use crate::state::ScriptState;

/// Node ids.
pub mod nodes {
    pub const RESEARCH: &str = "research";
    pub const GENERATE_HOOKS: &str = "generate_hooks";
    pub const WRITE_SCRIPT: &str = "write_script";
    pub const SHORTFORM_SCRIPT: &str = "shortform_script";
    pub const EDIT_SCRIPT: &str = "edit_script";
    pub const POST_PROCESS: &str = "post_process";
    pub const EVALUATE_QUALITY: &str = "evaluate_quality";
    pub const REVISE_SCRIPT: &str = "revise_script";
}

/// Branch labels.
pub mod labels {
    pub const WRITER: &str = "writer";
    pub const SHORTFORM: &str = "shortform";
    pub const REVISE: &str = "revise";
    pub const FINISH: &str = "finish";
}

/// Picks the writer: `"shortform"` for Instagram (any case), `"writer"` otherwise.
/// An absent content type counts as YouTube.
pub fn content_type_router(state: &ScriptState) -> String {
    let content_type = state.content_type.as_deref().unwrap_or("youtube");
    if content_type.trim().eq_ignore_ascii_case("instagram") {
        labels::SHORTFORM.to_string()
    } else {
        labels::WRITER.to_string()
    }
}

/// Decides whether a script goes back for revision, and records the revision.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityGate {
    pub policy: QualityPolicy,
}

impl QualityGate {
    pub fn new(policy: QualityPolicy) -> Self {
        Self { policy }
    }

    /// `"finish"` once the revision cap is reached or the style score meets the
    /// threshold, `"revise"` otherwise. A missing report counts as a perfect score.
    pub fn decide(&self, state: &ScriptState) -> &'static str {
        let score = state
            .quality_report
            .as_ref()
            .map_or(1.0, |r| r.style_match_score);
        let revisions = state.revisions();
        if revisions >= self.policy.max_revisions {
            tracing::info!(score = score, revisions = revisions, "revision cap reached, finishing");
            labels::FINISH
        } else if score < self.policy.threshold {
            tracing::info!(
                score = score,
                threshold = self.policy.threshold,
                "quality below threshold, revising"
            );
            labels::REVISE
        } else {
            tracing::info!(score = score, "quality accepted");
            labels::FINISH
        }
    }

    /// Copies the report's feedback into `revision_feedback` and bumps the counter.
    pub fn apply_revision(&self, state: &mut ScriptState) {
        state.revision_feedback = Some(
            state
                .quality_report
                .as_ref()
                .map(|r| r.feedback.clone())
                .unwrap_or_default(),
        );
        state.revision_count = Some(state.revisions() + 1);
    }

    /// `decide` followed by `apply_revision` when the answer is `"revise"`.
    pub fn route(&self, state: &mut ScriptState) -> &'static str {
        let label = self.decide(state);
        if label == labels::REVISE {
            self.apply_revision(state);
        }
        label
    }
}

/// Builds and compiles the pipeline graph with every agent sharing `llm`.
pub fn build_script_graph(
    llm: Arc<dyn LlmClient>,
    settings: &PipelineSettings,
) -> Result<CompiledStateGraph<ScriptState>, CompilationError> {
    use labels::*;
    use nodes::*;

    let gate = QualityGate::new(settings.quality);
    let mut graph = StateGraph::<ScriptState>::new()
        .with_retry_policy(settings.llm.retry_policy())
        .with_step_limit(settings.step_limit)
        .with_field_check(Arc::new(|state: &ScriptState, field: &str| {
            state.has_field(field)
        }));

    graph
        .add_node(RESEARCH, Arc::new(ResearchAgent::new(llm.clone())))?
        .add_node(GENERATE_HOOKS, Arc::new(HookAgent::new(llm.clone())))?
        .add_node(WRITE_SCRIPT, Arc::new(ScriptWriter::draft(llm.clone())))?
        .add_node(SHORTFORM_SCRIPT, Arc::new(ShortFormAgent::new(llm.clone())))?
        .add_node(EDIT_SCRIPT, Arc::new(EditorAgent::new(llm.clone())))?
        .add_node(POST_PROCESS, Arc::new(PostProcessAgent::new(llm.clone())))?
        .add_node(EVALUATE_QUALITY, Arc::new(QualityAgent::new(llm.clone())))?
        .add_node(REVISE_SCRIPT, Arc::new(ScriptWriter::revise(llm)))?;

    graph
        .set_entry_point(RESEARCH)?
        .add_conditional_edges(
            RESEARCH,
            Arc::new(content_type_router),
            [
                (WRITER.to_string(), GENERATE_HOOKS.to_string()),
                (SHORTFORM.to_string(), SHORTFORM_SCRIPT.to_string()),
            ]
            .into(),
        )?
        .add_edge(GENERATE_HOOKS, WRITE_SCRIPT)?
        .add_edge(WRITE_SCRIPT, EDIT_SCRIPT)?
        .add_edge(SHORTFORM_SCRIPT, EDIT_SCRIPT)?
        .add_edge(EDIT_SCRIPT, POST_PROCESS)?
        .add_edge(POST_PROCESS, EVALUATE_QUALITY)?
        .add_conditional_edges(
            EVALUATE_QUALITY,
            Arc::new(move |state: &ScriptState| gate.decide(state).to_string()),
            [
                (REVISE.to_string(), REVISE_SCRIPT.to_string()),
                (FINISH.to_string(), END.to_string()),
            ]
            .into(),
        )?
        .add_branch_update(
            EVALUATE_QUALITY,
            REVISE,
            Arc::new(move |state: &mut ScriptState| gate.apply_revision(state)),
        )?
        .add_edge(REVISE_SCRIPT, EDIT_SCRIPT)?;

    graph.compile()
}
