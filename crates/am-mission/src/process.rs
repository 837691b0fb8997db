//! Segment process pipeline: ordered, named, swappable stages.

use crate::error::MissionResult;
use crate::segment::Segment;
use std::fmt;
use std::sync::Arc;

/// One pipeline step: a plain function mutating segment state in place.
pub type Step = Arc<dyn Fn(&mut Segment) -> MissionResult<()> + Send + Sync>;

/// An ordered list of named steps.
///
/// Segment types customize behavior by appending, replacing, or removing
/// individual entries; the shared machinery never needs to know which
/// segment type it is running.
#[derive(Clone, Default)]
pub struct StageList {
    steps: Vec<(String, Step)>,
}

impl StageList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, step: Step) {
        self.steps.push((name.into(), step));
    }

    /// Replace a step by name. Returns false when the name is absent.
    pub fn replace(&mut self, name: &str, step: Step) -> bool {
        for (key, value) in self.steps.iter_mut() {
            if key == name {
                *value = step;
                return true;
            }
        }
        false
    }

    /// Remove a step by name. Returns false when the name is absent.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|(key, _)| key != name);
        self.steps.len() != before
    }

    pub fn names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Snapshot the steps for execution (cheap Arc clones), so the caller
    /// can run them against `&mut Segment` without borrowing the list.
    pub fn snapshot(&self) -> Vec<Step> {
        self.steps.iter().map(|(_, step)| step.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for StageList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The per-segment pipeline: initialize once, converge (which repeatedly
/// drives the iterate list), then post-process once.
#[derive(Clone)]
pub struct Process {
    pub initialize: StageList,
    /// The converge stage; swappable like any other step
    pub converge: Step,
    pub iterate: StageList,
    pub post_process: StageList,
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("initialize", &self.initialize)
            .field("iterate", &self.iterate)
            .field("post_process", &self.post_process)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Step {
        Arc::new(|_: &mut Segment| Ok(()))
    }

    #[test]
    fn stages_keep_insertion_order() {
        let mut stages = StageList::new();
        stages.append("atmosphere", noop());
        stages.append("forces", noop());
        stages.append("residuals", noop());
        assert_eq!(stages.names(), vec!["atmosphere", "forces", "residuals"]);
    }

    #[test]
    fn replace_and_remove_by_name() {
        let mut stages = StageList::new();
        stages.append("conditions", noop());
        stages.append("forces", noop());

        assert!(stages.replace("conditions", noop()));
        assert!(!stages.replace("nonexistent", noop()));

        assert!(stages.remove("forces"));
        assert!(!stages.remove("forces"));
        assert_eq!(stages.names(), vec!["conditions"]);
    }

    #[test]
    fn snapshot_is_independent_of_later_edits() {
        let mut stages = StageList::new();
        stages.append("a", noop());
        let snapshot = stages.snapshot();
        stages.remove("a");
        assert_eq!(snapshot.len(), 1);
        assert!(stages.is_empty());
    }
}
