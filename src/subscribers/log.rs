//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [step-added] step=4 level=0
//! [step-added] step=5 level=0 label=results_loop
//! [step-suppressed] step=3 reason=replay
//! [jump] label=results_loop step=5
//! [jump-missed] label=nowhere
//! [complete] steps=12 elapsed=840ms
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::StepAdded => {
                let mut line = String::from("[step-added]");
                if let Some(step) = e.step {
                    line.push_str(&format!(" step={step}"));
                }
                if let Some(level) = e.level {
                    line.push_str(&format!(" level={level}"));
                }
                if let Some(label) = &e.label {
                    line.push_str(&format!(" label={label}"));
                }
                println!("{line}");
            }
            EventKind::StepSuppressed => {
                println!(
                    "[step-suppressed] step={:?} reason={:?}",
                    e.step, e.reason
                );
            }
            EventKind::JumpTaken => {
                if let (Some(label), Some(step)) = (&e.label, e.step) {
                    println!("[jump] label={label} step={step}");
                }
            }
            EventKind::JumpMissed => {
                println!("[jump-missed] label={:?}", e.label);
            }
            EventKind::RunComplete => {
                println!(
                    "[complete] steps={} elapsed={}ms",
                    e.steps.unwrap_or(0),
                    e.elapsed_ms.unwrap_or(0)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
