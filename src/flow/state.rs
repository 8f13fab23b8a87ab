//! # Run state: the step queue and its bookkeeping.
//!
//! [`RunState`] owns everything the machine mutates: the queue itself, the
//! cursor (next step to dispatch), the current pointer (step being
//! dispatched), the lifecycle phase, the replay flag, and the label
//! registry. It is a plain struct behind the `Flow` handle's mutex; nothing
//! here is global.
//!
//! ## Rules
//! - The cursor only moves forward on its own; jumps may move it anywhere.
//! - Label names are unique; registering a duplicate is an error.
//! - Nested inserts land after the contiguous run of same-level steps that
//!   starts at the cursor, which keeps siblings in registration order and
//!   places sub-steps between their parent and the parent's next sibling.
//! - A replaying step (already executed, re-entered through a jump back)
//!   never re-inserts its children.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FlowError;
use crate::flow::step::{Step, StepRef};

/// Lifecycle phase of a flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    /// Created, not yet started; registration is rejected.
    Idle,
    /// Started; top-level registration appends to the tail.
    Building,
    /// The runner is dispatching; registration becomes nested insertion.
    Running,
    /// The queue was consumed (or the run aborted); registration is rejected.
    Done,
}

/// Outcome of a registration attempt.
#[derive(Debug)]
pub(crate) enum Insertion {
    /// The step entered the queue at `index` with nesting `level`.
    Added { index: usize, level: usize },
    /// The registering step is replaying; the insert was suppressed.
    Suppressed { by: Option<usize> },
}

/// One unit of dispatch handed to the runner.
pub(crate) struct Dispatch {
    /// Queue index of the step being dispatched.
    pub(crate) index: usize,
    /// The body to execute.
    pub(crate) body: StepRef,
    /// True when this step had already executed before (jump back).
    pub(crate) replaying: bool,
}

/// A read-only view of one queued step, for diagnostics.
pub(crate) struct StepLine {
    pub(crate) level: usize,
    pub(crate) executed: bool,
    pub(crate) label: Option<Arc<str>>,
    pub(crate) name: String,
}

/// A read-only view of the whole queue, for diagnostics.
pub(crate) struct Snapshot {
    pub(crate) steps: Vec<StepLine>,
    pub(crate) current: Option<usize>,
    pub(crate) cursor: usize,
}

/// The mutable heart of the machine.
pub(crate) struct RunState {
    steps: Vec<Step>,
    /// Index of the next step to dispatch.
    cursor: usize,
    /// Index of the step currently being dispatched.
    current: Option<usize>,
    phase: Phase,
    /// Set while the current dispatch is a replay of an executed step.
    replaying: bool,
    /// Label name → queue index. Kept in sync with queue shifts.
    labels: HashMap<Arc<str>, usize>,
}

impl RunState {
    pub(crate) fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor: 0,
            current: None,
            phase: Phase::Idle,
            replaying: false,
            labels: HashMap::new(),
        }
    }

    /// Idle → Building.
    pub(crate) fn start(&mut self) -> Result<(), FlowError> {
        match self.phase {
            Phase::Idle => {
                self.phase = Phase::Building;
                Ok(())
            }
            _ => Err(FlowError::AlreadyStarted),
        }
    }

    /// Building → Running.
    pub(crate) fn begin_run(&mut self) -> Result<(), FlowError> {
        match self.phase {
            Phase::Building => {
                self.phase = Phase::Running;
                Ok(())
            }
            Phase::Idle => Err(FlowError::NotStarted),
            Phase::Running => Err(FlowError::AlreadyStarted),
            Phase::Done => Err(FlowError::Finished),
        }
    }

    /// Any → Done.
    pub(crate) fn finish(&mut self) {
        self.phase = Phase::Done;
    }

    /// Registers a step, either as a top-level append (while building) or a
    /// nested insert (while running).
    pub(crate) fn insert(
        &mut self,
        body: StepRef,
        label: Option<Arc<str>>,
    ) -> Result<Insertion, FlowError> {
        match self.phase {
            Phase::Idle => Err(FlowError::NotStarted),
            Phase::Done => Err(FlowError::Finished),
            Phase::Building => {
                let index = self.steps.len();
                self.claim_label(&label, index)?;
                self.steps.push(Step::new(body, 0, label));
                Ok(Insertion::Added { index, level: 0 })
            }
            Phase::Running => {
                if self.replaying {
                    return Ok(Insertion::Suppressed { by: self.current });
                }
                let level = match self.current {
                    Some(i) => self.steps[i].level + 1,
                    // No step in flight; treat the insert as top-level.
                    None => 0,
                };
                let mut index = self.cursor;
                while index < self.steps.len() && self.steps[index].level == level {
                    index += 1;
                }
                self.claim_label(&label, index)?;
                self.shift_labels_from(index);
                self.steps.insert(index, Step::new(body, level, label));
                Ok(Insertion::Added { index, level })
            }
        }
    }

    /// Moves the cursor to the position registered for `name`.
    ///
    /// Returns the target index, or `None` (cursor untouched) when the
    /// label does not exist.
    pub(crate) fn jump(&mut self, name: &str) -> Result<Option<usize>, FlowError> {
        if self.phase != Phase::Running {
            return Err(FlowError::NotRunning);
        }
        match self.labels.get(name) {
            Some(&index) => {
                self.cursor = index;
                Ok(Some(index))
            }
            None => Ok(None),
        }
    }

    /// Pulls the next step for dispatch, advancing the cursor and marking
    /// the step executed. Returns `None` when the cursor has walked past the
    /// end of the queue.
    pub(crate) fn take_next(&mut self) -> Option<Dispatch> {
        if self.cursor >= self.steps.len() {
            return None;
        }
        let index = self.cursor;
        self.current = Some(index);
        self.cursor += 1;

        let (body, replaying) = {
            let step = &mut self.steps[index];
            let replaying = step.executed;
            // Marked at dispatch start, not completion: "executed" means the
            // runner reached this step, not that its body finished.
            step.executed = true;
            (step.body.clone(), replaying)
        };
        self.replaying = replaying;

        Some(Dispatch {
            index,
            body,
            replaying,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.steps.len()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }

    pub(crate) fn current(&self) -> Option<usize> {
        self.current
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            steps: self
                .steps
                .iter()
                .map(|s| StepLine {
                    level: s.level,
                    executed: s.executed,
                    label: s.label.clone(),
                    name: s.body.name().to_string(),
                })
                .collect(),
            current: self.current,
            cursor: self.cursor,
        }
    }

    /// Reserves `label` at `index`, rejecting duplicates.
    fn claim_label(&mut self, label: &Option<Arc<str>>, index: usize) -> Result<(), FlowError> {
        if let Some(name) = label {
            if self.labels.contains_key(name) {
                return Err(FlowError::DuplicateLabel {
                    label: name.to_string(),
                });
            }
            self.labels.insert(name.clone(), index);
        }
        Ok(())
    }

    /// Shifts registered label positions after a mid-queue insert at `index`.
    fn shift_labels_from(&mut self, index: usize) {
        for position in self.labels.values_mut() {
            if *position >= index {
                *position += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use crate::flow::{Flow, StepFn};

    fn noop(name: &'static str) -> StepRef {
        StepFn::arc(name, |_ctx: Flow| async move { Ok::<_, StepError>(()) })
    }

    fn started() -> RunState {
        let mut state = RunState::new();
        state.start().unwrap();
        state
    }

    #[test]
    fn test_insert_before_start_is_rejected() {
        let mut state = RunState::new();
        let err = state.insert(noop("a"), None).unwrap_err();
        assert!(matches!(err, FlowError::NotStarted));
    }

    #[test]
    fn test_building_appends_level_zero_in_order() {
        let mut state = started();
        for name in ["a", "b", "c"] {
            state.insert(noop(name), None).unwrap();
        }
        let snap = state.snapshot();
        assert_eq!(snap.steps.len(), 3);
        assert!(snap.steps.iter().all(|s| s.level == 0));
        let names: Vec<_> = snap.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_nested_insert_lands_before_next_sibling() {
        let mut state = started();
        state.insert(noop("parent"), None).unwrap();
        state.insert(noop("sibling"), None).unwrap();
        state.begin_run().unwrap();

        // Dispatch "parent", then register two children from within it.
        let d = state.take_next().unwrap();
        assert_eq!(d.index, 0);
        let first = state.insert(noop("child-1"), None).unwrap();
        let second = state.insert(noop("child-2"), None).unwrap();

        assert!(matches!(first, Insertion::Added { index: 1, level: 1 }));
        assert!(matches!(second, Insertion::Added { index: 2, level: 1 }));

        let names: Vec<_> = state
            .snapshot()
            .steps
            .iter()
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(names, vec!["parent", "child-1", "child-2", "sibling"]);
    }

    #[test]
    fn test_nested_insert_without_current_defaults_to_level_zero() {
        let mut state = started();
        state.begin_run().unwrap();
        let ins = state.insert(noop("orphan"), None).unwrap();
        assert!(matches!(ins, Insertion::Added { level: 0, .. }));
    }

    #[test]
    fn test_replay_suppresses_insert() {
        let mut state = started();
        state.insert(noop("s"), None).unwrap();
        state.begin_run().unwrap();

        let first = state.take_next().unwrap();
        assert!(!first.replaying);
        state.insert(noop("child"), None).unwrap();

        // Jump back over the executed step and dispatch it again.
        state.jump_to_start_for_test();
        let second = state.take_next().unwrap();
        assert!(second.replaying);
        let len_before = state.len();
        let ins = state.insert(noop("child-again"), None).unwrap();
        assert!(matches!(ins, Insertion::Suppressed { by: Some(0) }));
        assert_eq!(state.len(), len_before);
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let mut state = started();
        state
            .insert(noop("label step"), Some("top".into()))
            .unwrap();
        let err = state
            .insert(noop("label step"), Some("top".into()))
            .unwrap_err();
        assert!(matches!(err, FlowError::DuplicateLabel { .. }));
    }

    #[test]
    fn test_jump_moves_cursor_to_label() {
        let mut state = started();
        state.insert(noop("a"), None).unwrap();
        state.insert(noop("mark"), Some("mark".into())).unwrap();
        state.insert(noop("b"), None).unwrap();
        state.begin_run().unwrap();

        state.take_next().unwrap();
        state.take_next().unwrap();
        state.take_next().unwrap();
        assert_eq!(state.cursor(), 3);

        let target = state.jump("mark").unwrap();
        assert_eq!(target, Some(1));
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_jump_miss_leaves_cursor_untouched() {
        let mut state = started();
        state.insert(noop("a"), None).unwrap();
        state.begin_run().unwrap();
        state.take_next().unwrap();

        let before = state.cursor();
        let target = state.jump("nowhere").unwrap();
        assert_eq!(target, None);
        assert_eq!(state.cursor(), before);
    }

    #[test]
    fn test_jump_outside_run_is_rejected() {
        let mut state = started();
        state.insert(noop("mark"), Some("mark".into())).unwrap();
        let err = state.jump("mark").unwrap_err();
        assert!(matches!(err, FlowError::NotRunning));
    }

    #[test]
    fn test_nested_insert_shifts_label_positions() {
        let mut state = started();
        state.insert(noop("parent"), None).unwrap();
        state.insert(noop("mark"), Some("mark".into())).unwrap();
        state.begin_run().unwrap();

        state.take_next().unwrap();
        // Child lands at index 1, pushing the label step to index 2.
        state.insert(noop("child"), None).unwrap();

        let target = state.jump("mark").unwrap();
        assert_eq!(target, Some(2));
    }

    impl RunState {
        /// Test helper: emulate a jump back to the head of the queue.
        fn jump_to_start_for_test(&mut self) {
            self.cursor = 0;
        }
    }
}
