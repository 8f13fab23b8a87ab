//! Error types used by the flow machine and by step bodies.
//!
//! This module defines two main error enums:
//!
//! - [`FlowError`] — misuse of the registration / control-flow surface,
//!   raised synchronously to the caller.
//! - [`StepError`] — failures inside individual step bodies.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. A missing jump target is deliberately **not** an error:
//! the cursor stays put and a `JumpMissed` event is published instead.

use thiserror::Error;

/// # Errors produced by the flow registration and control-flow surface.
///
/// These represent misuse of the machine itself rather than failures of the
/// work being scheduled: registering before `start()`, jumping outside a
/// run, colliding label names.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FlowError {
    /// A step was registered before the flow was started.
    #[error("flow not started; call start() before registering steps")]
    NotStarted,

    /// `start()` was called on a flow that is already past its idle phase.
    #[error("flow already started")]
    AlreadyStarted,

    /// A step was registered after the run completed and the queue was retired.
    #[error("flow already finished; the step queue is retired")]
    Finished,

    /// A label name was registered twice.
    #[error("duplicate label {label:?}")]
    DuplicateLabel {
        /// The colliding label name.
        label: String,
    },

    /// `goto` was invoked while no run was in progress.
    ///
    /// Jumps only have meaning against a live cursor, so they must be issued
    /// from inside a step body, not during program construction.
    #[error("goto outside a running flow; wrap the jump in a step body")]
    NotRunning,

    /// A step body failed; the run was aborted and the error propagated.
    #[error(transparent)]
    Step(#[from] StepError),
}

impl FlowError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use prospector::FlowError;
    ///
    /// assert_eq!(FlowError::NotStarted.as_label(), "flow_not_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::NotStarted => "flow_not_started",
            FlowError::AlreadyStarted => "flow_already_started",
            FlowError::Finished => "flow_finished",
            FlowError::DuplicateLabel { .. } => "flow_duplicate_label",
            FlowError::NotRunning => "flow_not_running",
            FlowError::Step(_) => "flow_step_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::DuplicateLabel { label } => format!("duplicate label: {label}"),
            FlowError::Step(e) => e.as_message(),
            other => other.to_string(),
        }
    }
}

/// # Errors produced by step bodies.
///
/// Step bodies own their failures: the runner does not catch them centrally,
/// it aborts the run and hands the error back through
/// [`Flow::run`](crate::Flow::run). The variants mirror what navigation
/// steps actually do: talk to the page, decode what came back, write output.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StepError {
    /// A page interaction failed (navigation, click, evaluation).
    #[error("page interaction failed: {error}")]
    Page {
        /// The underlying error message.
        error: String,
    },

    /// Data extracted from the page could not be decoded.
    #[error("decode failed: {error}")]
    Decode {
        /// The underlying error message.
        error: String,
    },

    /// Writing to the output sink failed.
    #[error("output write failed: {error}")]
    Io {
        /// The underlying error message.
        error: String,
    },

    /// Any other step-level failure.
    #[error("step failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl StepError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use prospector::StepError;
    ///
    /// let err = StepError::Decode { error: "bad json".into() };
    /// assert_eq!(err.as_label(), "step_decode");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StepError::Page { .. } => "step_page",
            StepError::Decode { .. } => "step_decode",
            StepError::Io { .. } => "step_io",
            StepError::Fail { .. } => "step_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StepError::Page { error } => format!("page: {error}"),
            StepError::Decode { error } => format!("decode: {error}"),
            StepError::Io { error } => format!("io: {error}"),
            StepError::Fail { error } => format!("error: {error}"),
        }
    }
}

impl From<crate::browser::BrowserError> for StepError {
    fn from(e: crate::browser::BrowserError) -> Self {
        StepError::Page {
            error: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for StepError {
    fn from(e: serde_json::Error) -> Self {
        StepError::Decode {
            error: e.to_string(),
        }
    }
}

impl From<std::io::Error> for StepError {
    fn from(e: std::io::Error) -> Self {
        StepError::Io {
            error: e.to_string(),
        }
    }
}

// Lets step bodies `?` control-flow calls (`ctx.goto`, `ctx.then`) straight
// out of their own result type.
impl From<FlowError> for StepError {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Step(inner) => inner,
            other => StepError::Fail {
                error: other.to_string(),
            },
        }
    }
}
