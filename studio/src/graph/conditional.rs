//! Conditional edges: route to the next node based on state.
//!
//! A source node has a routing function that takes the current state and returns a
//! label; the label is looked up in the path map to get the next node id (or END).
//! A label may also carry a branch update: a state mutation the runner applies only
//! when that label is taken, before moving on. Routing functions themselves stay pure.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

/// Router function: takes a reference to state and returns a routing label.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// State update applied when a specific branch label is taken.
pub type BranchUpdateFn<S> = Arc<dyn Fn(&mut S) + Send + Sync>;

/// Outcome of evaluating a router: the label and its target, if the label is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub label: String,
    /// `None` when the label has no entry in the path map.
    pub target: Option<String>,
}

/// Conditional edge definition: routing function, label → node map, branch updates.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: HashMap<String, String>,
    pub(super) updates: HashMap<String, BranchUpdateFn<S>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: HashMap<String, String>) -> Self {
        Self {
            path,
            path_map,
            updates: HashMap::new(),
        }
    }

    /// Evaluates the router on `state` and looks the label up. Does not mutate state.
    pub fn decide(&self, state: &S) -> RouteDecision {
        let label = (self.path)(state);
        let target = self.path_map.get(&label).cloned();
        RouteDecision { label, target }
    }

    /// Applies the branch update registered for `label`, if any. Returns whether one ran.
    pub fn apply_update(&self, label: &str, state: &mut S) -> bool {
        match self.updates.get(label) {
            Some(update) => {
                update(state);
                true
            }
            None => false,
        }
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.path_map.contains_key(label)
    }

    /// Label → target pairs, ordered by label.
    pub fn branches(&self) -> BTreeMap<&str, &str> {
        self.path_map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// How to determine the next node after a given node runs.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Single fixed next node (or END).
    Unconditional(String),
    /// Next node is decided by the router from state.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parity_router() -> ConditionalRouter<i32> {
        let map = [
            ("even".to_string(), "a".to_string()),
            ("odd".to_string(), "b".to_string()),
        ]
        .into_iter()
        .collect();
        ConditionalRouter::new(
            Arc::new(|s: &i32| if s % 2 == 0 { "even".into() } else { "odd".into() }),
            map,
        )
    }

    #[test]
    fn decide_resolves_label_through_path_map() {
        let router = parity_router();
        assert_eq!(
            router.decide(&2),
            RouteDecision {
                label: "even".into(),
                target: Some("a".into())
            }
        );
        assert_eq!(router.decide(&3).target.as_deref(), Some("b"));
    }

    /// **Scenario**: a label missing from the map yields no target instead of falling through.
    #[test]
    fn decide_unknown_label_has_no_target() {
        let router = ConditionalRouter::new(
            Arc::new(|_: &i32| "nowhere".to_string()),
            [("x".to_string(), "a".to_string())].into_iter().collect(),
        );
        let d = router.decide(&0);
        assert_eq!(d.label, "nowhere");
        assert!(d.target.is_none());
    }

    #[test]
    fn apply_update_runs_only_registered_label() {
        let mut router = parity_router();
        router
            .updates
            .insert("odd".into(), Arc::new(|s: &mut i32| *s += 10));
        let mut s = 1;
        assert!(!router.apply_update("even", &mut s));
        assert_eq!(s, 1);
        assert!(router.apply_update("odd", &mut s));
        assert_eq!(s, 11);
    }
}
