//! # prospector
//!
//! **Prospector** scrapes business-directory listings out of a paginated web
//! directory and emits them as CSV lines. The interesting part is not the
//! scraping glue but the machine underneath it: a strictly sequential queue
//! of asynchronous navigation steps extended with **named labels** and
//! **unconditional jumps**, so a linear program gains loops, conditionals
//! and early exits without ever leaving its append/execute contract.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     then(step)   label(name)         goto(name)
//!         │            │                   │
//!         ▼            ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Flow (run handle, passed to every step body as its context)      │
//! │  - RunState (queue, cursor, current, phase, label registry)       │
//! │  - Bus (stamps seq, broadcasts StepAdded / JumpTaken / …)         │
//! │      └─► listener task ─► SubscriberSet (ordered delivery)        │
//! └──────────────────────────┬────────────────────────────────────────┘
//!                            ▼
//!                  ┌──────────────────┐
//!                  │  runner (loop)   │   one step body in flight at a time
//!                  │  current = cursor│
//!                  │  cursor += 1     │
//!                  │  dispatch + await│
//!                  └────────┬─────────┘
//!                           │ step bodies drive the external collaborator
//!                           ▼
//!                  ┌──────────────────┐
//!                  │  Browser (trait) │   open / evaluate / click / exists
//!                  └──────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Flow::builder(cfg).build() ──► flow.start() ──► flow.then(...) / flow.label(...)
//!                                                       │
//!                                                       ▼
//!                                              flow.run().await
//!
//! loop {
//!   ├─► current = cursor; step = steps[cursor]; cursor += 1
//!   ├─► replaying = step.executed; step.executed = true
//!   ├─► dispatch body(flow.clone()) and await it
//!   │       ├─ body may then() sub-steps (inserted after the parent,
//!   │       │  before the parent's next same-level sibling; suppressed
//!   │       │  when the parent is replaying after a jump back)
//!   │       └─ body may goto(label) → cursor = label position
//!   └─ cursor past the end ──► publish RunComplete, invoke on_complete
//! }
//! ```
//!
//! ## Features
//! | Area            | Description                                              | Key types / traits          |
//! |-----------------|----------------------------------------------------------|-----------------------------|
//! | **Control flow**| Labels and jumps over a linear async step queue.         | [`Flow`], [`StepFn`]        |
//! | **Events**      | Broadcast of step/jump/run lifecycle events.             | [`Event`], [`EventKind`]    |
//! | **Subscribers** | Non-blocking fan-out to user observers.                  | [`Subscribe`]               |
//! | **Browser**     | Seam for the page-automation collaborator.               | [`Browser`]                 |
//! | **Scraping**    | Directory program, listing model, CSV output.            | [`build_program`], [`Listing`] |
//! | **Errors**      | Typed errors for registration misuse and step failures.  | [`FlowError`], [`StepError`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//! - `chrome`: exports [`ChromeBrowser`], a headless-Chrome `Browser` implementation.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use prospector::{Flow, FlowConfig, StepError, StepFn};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let flow = Flow::builder(FlowConfig::default()).build();
//!     flow.start()?;
//!
//!     let left = Arc::new(AtomicU32::new(3));
//!
//!     flow.label("top")?;
//!     flow.then(StepFn::arc("work", |_ctx: Flow| async move {
//!         Ok::<_, StepError>(())
//!     }))?;
//!     flow.then(StepFn::arc("again?", move |ctx: Flow| {
//!         let left = left.clone();
//!         async move {
//!             if left.fetch_sub(1, Ordering::SeqCst) > 1 {
//!                 ctx.goto("top")?;
//!             }
//!             Ok::<_, StepError>(())
//!         }
//!     }))?;
//!
//!     flow.run().await?;
//!     Ok(())
//! }
//! ```

mod browser;
mod config;
mod error;
mod events;
mod flow;
mod scrape;
mod subscribers;

// ---- Public re-exports ----

pub use browser::{Browser, BrowserError, BrowserRef};
pub use config::{FlowConfig, ScrapeConfig};
pub use error::{FlowError, StepError};
pub use events::{Bus, Event, EventKind};
pub use flow::{Flow, FlowBuilder, OnComplete, StepBody, StepFn, StepRef};
pub use scrape::{build_program, CsvSink, Listing, ListingKind, CSV_HEADER};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose the headless-Chrome browser implementation.
// Enable with: `--features chrome`
#[cfg(feature = "chrome")]
pub use browser::ChromeBrowser;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
