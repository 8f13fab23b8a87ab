//! # Step abstraction.
//!
//! This module defines the [`StepBody`] trait (async, executed by the runner
//! with the [`Flow`] handle as its context) and the queue's internal [`Step`]
//! record. The common handle type is [`StepRef`], an `Arc<dyn StepBody>`
//! suitable for sharing across the machine.
//!
//! A step record is plain data: the callable lives behind `body`, and the
//! queue bookkeeping (`level`, `executed`, `label`) lives beside it rather
//! than being stapled onto the callable itself.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StepError;
use crate::flow::Flow;

/// Shared handle to a step body.
pub type StepRef = Arc<dyn StepBody>;

/// # Asynchronous unit of navigation work.
///
/// A `StepBody` has a display [`name`](StepBody::name) (used by the step
/// dump) and an async [`run`](StepBody::run) method that receives the
/// [`Flow`] handle. Through that handle a body may register sub-steps or
/// jump the cursor; everything else it needs (browser, output sink, shared
/// state) it captures itself.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use prospector::{Flow, StepBody, StepError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl StepBody for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, _ctx: Flow) -> Result<(), StepError> {
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait StepBody: Send + Sync + 'static {
    /// Returns a stable, human-readable step name.
    fn name(&self) -> &str;

    /// Executes the step until completion.
    ///
    /// The runner awaits this before touching the queue again, so at most
    /// one body is ever in flight.
    async fn run(&self, ctx: Flow) -> Result<(), StepError>;
}

/// A queued step: the body plus its queue bookkeeping.
pub(crate) struct Step {
    /// The deferred work.
    pub(crate) body: StepRef,
    /// Nesting depth; top-level steps are level 0, steps registered from
    /// within a running step sit one level below their parent.
    pub(crate) level: usize,
    /// Whether the runner has dispatched this step at least once.
    pub(crate) executed: bool,
    /// Jump-target name, when this step was registered through `label`.
    pub(crate) label: Option<Arc<str>>,
}

impl Step {
    pub(crate) fn new(body: StepRef, level: usize, label: Option<Arc<str>>) -> Self {
        Self {
            body,
            level,
            executed: false,
            label,
        }
    }
}
