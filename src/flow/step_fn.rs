//! # Function-backed step (`StepFn`)
//!
//! [`StepFn`] wraps a closure `F: Fn(Flow) -> Fut`, producing a fresh future
//! per dispatch. Because a jump can send the cursor back over an already
//! executed step, bodies must be re-runnable; `Fn` (not `FnOnce`) enforces
//! that, and any state shared between passes is captured explicitly behind
//! an `Arc`.
//!
//! ## Example
//! ```rust
//! use prospector::{Flow, StepBody, StepError, StepFn, StepRef};
//!
//! let step: StepRef = StepFn::arc("open-portal", |_ctx: Flow| async move {
//!     // drive the page...
//!     Ok::<_, StepError>(())
//! });
//!
//! assert_eq!(step.name(), "open-portal");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StepError;
use crate::flow::{Flow, StepBody};

/// Function-backed step implementation.
///
/// Wraps a closure that *creates* a new future per dispatch.
#[derive(Debug)]
pub struct StepFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> StepFn<F> {
    /// Creates a new function-backed step.
    ///
    /// Prefer [`StepFn::arc`] when you immediately need a [`StepRef`](crate::StepRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the step and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> StepBody for StepFn<F>
where
    F: Fn(Flow) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), StepError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: Flow) -> Result<(), StepError> {
        (self.f)(ctx).await
    }
}
