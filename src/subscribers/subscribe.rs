//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers
//! into the machine. Handlers are awaited one at a time by the flow's
//! listener task, off the publisher's path: a slow handler delays the
//! event stream behind it, never the run itself.
//!
//! ## Contract
//! - Handlers see events in publish order ([`Event::seq`](crate::Event)).
//! - A handler that panics is caught by the
//!   [`SubscriberSet`](crate::SubscriberSet); other subscribers still
//!   receive the event.
//! - Handlers that fall more than the bus capacity behind cost the whole
//!   listener its oldest events, so keep them quick or hand work off.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from the flow's listener task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
