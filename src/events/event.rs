//! # Runtime events emitted by the flow machine.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Queue events**: a step entered the queue, or a re-registration was
//!   suppressed on replay.
//! - **Jump events**: a `goto` moved the cursor, or named a label that does
//!   not exist.
//! - **Run events**: the queue was exhausted and the run completed.
//!
//! The [`Event`] struct carries optional metadata such as the 1-based step
//! position, nesting level, label name, and elapsed time.
//!
//! ## Ordering guarantees
//! Each event carries a sequence number (`seq`) stamped by the run's
//! [`Bus`](crate::Bus) at publish time, monotonic per bus. Use `seq` to
//! restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use prospector::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::StepAdded).with_step(4).with_level(1);
//!
//! assert_eq!(ev.kind, EventKind::StepAdded);
//! assert_eq!(ev.step, Some(4));
//! assert_eq!(ev.level, Some(1));
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Queue events ===
    /// A step entered the queue (top-level push or nested insert).
    ///
    /// Sets:
    /// - `step`: 1-based queue position of the new step
    /// - `level`: nesting level of the new step
    /// - `label`: label name, when the step is a label
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StepAdded,

    /// A nested registration was suppressed because the registering step was
    /// replaying after a jump back.
    ///
    /// Sets:
    /// - `step`: 1-based position of the replaying step
    /// - `reason`: always `"replay"`
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    StepSuppressed,

    // === Jump events ===
    /// A `goto` resolved its label and moved the cursor.
    ///
    /// Sets:
    /// - `label`: jump target name
    /// - `step`: 1-based position the cursor was moved to
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JumpTaken,

    /// A `goto` named a label that does not exist; the cursor was left
    /// untouched.
    ///
    /// Sets:
    /// - `label`: the missing label name
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    JumpMissed,

    // === Run events ===
    /// The cursor walked past the end of the queue with no pending jump.
    ///
    /// Sets:
    /// - `steps`: total number of steps in the queue
    /// - `elapsed_ms`: wall-clock duration of the run
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RunComplete,
}

/// Runtime event with optional metadata.
///
/// - `seq`: publish-order sequence, stamped by the bus
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Sequence number within the run's bus, stamped at publish time;
    /// zero until published.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// 1-based queue position, if applicable.
    pub step: Option<usize>,
    /// Nesting level, if applicable.
    pub level: Option<usize>,
    /// Label name, if applicable.
    pub label: Option<Arc<str>>,
    /// Total number of steps (RunComplete).
    pub steps: Option<usize>,
    /// Elapsed run time in milliseconds (RunComplete).
    pub elapsed_ms: Option<u64>,
    /// Human-readable reason (suppressions, diagnostics).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    ///
    /// The sequence number is assigned by the [`Bus`](crate::Bus) when the
    /// event is published.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            step: None,
            level: None,
            label: None,
            steps: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Sets the 1-based step position.
    pub fn with_step(mut self, position: usize) -> Self {
        self.step = Some(position);
        self
    }

    /// Sets the nesting level.
    pub fn with_level(mut self, level: usize) -> Self {
        self.level = Some(level);
        self
    }

    /// Sets the label name.
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the total step count.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Sets the elapsed run time.
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed_ms = Some(elapsed.as_millis() as u64);
        self
    }

    /// Sets a human-readable reason.
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_fields() {
        let ev = Event::now(EventKind::JumpTaken)
            .with_label("top")
            .with_step(2);
        assert_eq!(ev.kind, EventKind::JumpTaken);
        assert_eq!(ev.label.as_deref(), Some("top"));
        assert_eq!(ev.step, Some(2));
        assert_eq!(ev.level, None);
    }

    #[test]
    fn test_elapsed_is_millis() {
        let ev = Event::now(EventKind::RunComplete).with_elapsed(Duration::from_secs(2));
        assert_eq!(ev.elapsed_ms, Some(2000));
    }
}
