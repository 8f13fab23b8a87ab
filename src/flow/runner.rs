//! # The dispatch loop.
//!
//! Drives a [`Flow`] one step at a time: pull the step under the cursor,
//! advance the cursor, await the body, repeat. Suspension is nothing more
//! than the await on whatever page operation the body is waiting for, so at
//! most one step body is ever in flight.
//!
//! ## Loop shape
//! ```text
//! loop {
//!   ├─ cancellation requested?        → stop between dispatches
//!   ├─ take_next():
//!   │     current = cursor; cursor += 1
//!   │     replaying = step.executed; step.executed = true
//!   ├─ Some(step) → await body(flow.clone())
//!   │     └─ Err  → retire the queue, propagate
//!   └─ None → publish RunComplete { steps, elapsed }
//!             invoke on_complete (caught + logged on failure)
//! }
//! ```
//!
//! ## Rules
//! - Step-body errors are **not** caught centrally; the first failure
//!   aborts the run.
//! - The completion callback's failure is caught and logged; by then the
//!   run is already complete.
//! - The state lock is never held across an await.

use std::time::Instant;

use crate::error::FlowError;
use crate::events::{Event, EventKind};
use crate::flow::{Flow, OnComplete};

/// Executes the flow until the queue is exhausted, a body fails, or
/// cancellation is requested.
pub(crate) async fn drive(flow: &Flow, on_complete: Option<OnComplete>) -> Result<(), FlowError> {
    let started = Instant::now();
    flow.state().begin_run()?;

    loop {
        if flow.shared.cancel.is_cancelled() {
            flow.state().finish();
            return Ok(());
        }

        let next = flow.state().take_next();
        match next {
            Some(dispatch) => {
                if let Err(err) = dispatch.body.run(flow.clone()).await {
                    flow.state().finish();
                    return Err(FlowError::Step(err));
                }
            }
            None => {
                complete(flow, started, on_complete);
                return Ok(());
            }
        }
    }
}

/// Queue exhausted: retire the state, publish completion, run the callback.
fn complete(flow: &Flow, started: Instant, on_complete: Option<OnComplete>) {
    let total = {
        let mut state = flow.state();
        state.finish();
        state.len()
    };
    flow.publish(
        Event::now(EventKind::RunComplete)
            .with_steps(total)
            .with_elapsed(started.elapsed()),
    );
    if let Some(callback) = on_complete {
        if let Err(err) = callback(flow) {
            eprintln!(
                "[prospector] could not complete final step: {}",
                err.as_message()
            );
        }
    }
}
