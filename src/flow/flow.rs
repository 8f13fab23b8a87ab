//! # Flow: the public handle over the step machine.
//!
//! A [`Flow`] is cheap to clone and is handed to every step body as its run
//! context, so bodies can register sub-steps and jump the cursor through
//! the same surface the surrounding program uses.
//!
//! ## Key responsibilities
//! - own the run state and the event [`Bus`]
//! - expose registration (`then`, `label`) and control flow (`goto`)
//! - expose diagnostics (`dump_steps`, cursor/current accessors)
//! - hand the dispatch loop to the runner (`run`, `run_with`)
//!
//! ## Example
//! ```rust
//! use prospector::{Flow, FlowConfig, StepError, StepFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let flow = Flow::builder(FlowConfig::default()).build();
//!     flow.start()?;
//!
//!     flow.then(StepFn::arc("hello", |_ctx: Flow| async move {
//!         println!("hello from a step");
//!         Ok::<_, StepError>(())
//!     }))?;
//!
//!     flow.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::config::FlowConfig;
use crate::error::{FlowError, StepError};
use crate::events::{Bus, Event, EventKind};
use crate::flow::dump;
use crate::flow::runner;
use crate::flow::state::{Insertion, RunState};
use crate::flow::step::StepRef;
use crate::flow::step_fn::StepFn;

/// Callback invoked once the queue is exhausted.
///
/// A failing callback is caught and logged; it never fails the run.
pub type OnComplete = Box<dyn FnOnce(&Flow) -> Result<(), StepError> + Send>;

pub(crate) struct Shared {
    pub(crate) bus: Bus,
    pub(crate) cancel: CancellationToken,
    pub(crate) state: Mutex<RunState>,
}

/// Handle over a step program: registration, control flow, diagnostics,
/// and the run entry point.
#[derive(Clone)]
pub struct Flow {
    pub(crate) shared: Arc<Shared>,
}

impl Flow {
    /// Creates a builder for a new flow.
    pub fn builder(cfg: FlowConfig) -> crate::flow::FlowBuilder {
        crate::flow::FlowBuilder::new(cfg)
    }

    pub(crate) fn from_shared(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Opens the flow for registration.
    ///
    /// Must be called before any [`then`](Flow::then) / [`label`](Flow::label);
    /// calling it twice fails with [`FlowError::AlreadyStarted`].
    pub fn start(&self) -> Result<(), FlowError> {
        self.state().start()
    }

    /// Registers a step.
    ///
    /// Before [`run`](Flow::run) this appends a level-0 step to the tail of
    /// the queue. From inside a running step it becomes a nested insert: the
    /// new step sits one level below its parent, between the parent and the
    /// parent's next sibling. A replaying parent (re-entered through a jump
    /// back) has its inserts suppressed so children are never duplicated.
    pub fn then(&self, step: StepRef) -> Result<(), FlowError> {
        self.register(step, None)
    }

    /// Registers a no-op step carrying a jump-target name.
    ///
    /// The label reserves a queue position that [`goto`](Flow::goto) can
    /// aim at. Names are unique; re-registering one fails with
    /// [`FlowError::DuplicateLabel`].
    pub fn label(&self, name: &str) -> Result<(), FlowError> {
        let target: Arc<str> = name.into();
        let body = StepFn::arc(format!("label {name}"), |_ctx: Flow| async move {
            Ok::<_, StepError>(())
        });
        self.register(body, Some(target))
    }

    /// Moves the cursor to the step registered under `name`.
    ///
    /// Only meaningful while the runner is live, so it must be issued from
    /// inside a step body; during program construction it fails with
    /// [`FlowError::NotRunning`]. A missing label leaves the cursor
    /// untouched and publishes [`EventKind::JumpMissed`].
    ///
    /// The jump affects the *next* dispatch: the body that calls `goto`
    /// still runs to completion first.
    pub fn goto(&self, name: &str) -> Result<(), FlowError> {
        let target = self.state().jump(name)?;
        match target {
            Some(index) => self.publish(
                Event::now(EventKind::JumpTaken)
                    .with_label(name)
                    .with_step(index + 1),
            ),
            None => self.publish(Event::now(EventKind::JumpMissed).with_label(name)),
        }
        Ok(())
    }

    /// Runs the program until the cursor walks past the end of the queue.
    ///
    /// Step-body errors are not caught centrally; the first failure aborts
    /// the run and is returned here.
    pub async fn run(&self) -> Result<(), FlowError> {
        runner::drive(self, None).await
    }

    /// Like [`run`](Flow::run), with a completion callback invoked once the
    /// queue is exhausted. A failing callback is logged, not escalated.
    pub async fn run_with(&self, on_complete: OnComplete) -> Result<(), FlowError> {
        runner::drive(self, Some(on_complete)).await
    }

    /// Renders a diagnostic dump of every step in the queue: position,
    /// level, executed flag, label, and the current-step marker. With
    /// `verbose`, each line also carries the step's display name.
    ///
    /// Read-only; run state is not touched.
    pub fn dump_steps(&self, verbose: bool) -> String {
        dump::render(&self.state().snapshot(), verbose)
    }

    /// Number of steps in the queue.
    pub fn len(&self) -> usize {
        self.state().len()
    }

    /// True when no steps have been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the next step to dispatch.
    pub fn cursor(&self) -> usize {
        self.state().cursor()
    }

    /// Index of the step currently (or most recently) dispatched.
    pub fn current(&self) -> Option<usize> {
        self.state().current()
    }

    /// The event bus; subscribe here for raw event access.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, RunState> {
        // Lock sections never panic; recover the guard if one ever did.
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn publish(&self, event: Event) {
        self.shared.bus.publish(event);
    }

    fn register(&self, body: StepRef, label: Option<Arc<str>>) -> Result<(), FlowError> {
        let outcome = {
            let mut state = self.state();
            state.insert(body, label.clone())?
        };
        match outcome {
            Insertion::Added { index, level } => {
                let mut ev = Event::now(EventKind::StepAdded)
                    .with_step(index + 1)
                    .with_level(level);
                if let Some(name) = label {
                    ev = ev.with_label(name);
                }
                self.publish(ev);
            }
            Insertion::Suppressed { by } => {
                let mut ev = Event::now(EventKind::StepSuppressed).with_reason("replay");
                if let Some(index) = by {
                    ev = ev.with_step(index + 1);
                }
                self.publish(ev);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> Flow {
        Flow::builder(FlowConfig::default()).build()
    }

    fn noop(name: &'static str) -> StepRef {
        StepFn::arc(name, |_ctx: Flow| async move { Ok::<_, StepError>(()) })
    }

    #[test]
    fn test_then_before_start_fails() {
        let f = flow();
        let err = f.then(noop("early")).unwrap_err();
        assert!(matches!(err, FlowError::NotStarted));
    }

    #[test]
    fn test_start_twice_fails() {
        let f = flow();
        f.start().unwrap();
        assert!(matches!(f.start().unwrap_err(), FlowError::AlreadyStarted));
    }

    #[test]
    fn test_goto_during_construction_fails() {
        let f = flow();
        f.start().unwrap();
        f.label("top").unwrap();
        let err = f.goto("top").unwrap_err();
        assert!(matches!(err, FlowError::NotRunning));
    }

    #[test]
    fn test_duplicate_label_fails() {
        let f = flow();
        f.start().unwrap();
        f.label("top").unwrap();
        let err = f.label("top").unwrap_err();
        assert!(matches!(err, FlowError::DuplicateLabel { label } if label == "top"));
    }

    #[test]
    fn test_registration_counts() {
        let f = flow();
        f.start().unwrap();
        assert!(f.is_empty());
        f.then(noop("a")).unwrap();
        f.label("mark").unwrap();
        assert_eq!(f.len(), 2);
    }
}
