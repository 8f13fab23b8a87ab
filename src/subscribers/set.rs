//! # SubscriberSet: ordered delivery to the run's subscribers
//!
//! The flow has exactly one event producer and one listener task draining
//! the bus, so fan-out here is deliberately simple: [`SubscriberSet::deliver`]
//! walks the subscribers in registration order and awaits each handler in
//! turn. That buys a guarantee queue-per-subscriber designs give up:
//! **every subscriber observes the same total event order**.
//!
//! ## What it guarantees
//! - Delivery in registration order, one handler at a time.
//! - The same total event order for every subscriber.
//! - A panicking handler is caught and reported; the remaining subscribers
//!   still receive the event.
//!
//! ## What it does **not** guarantee
//! - Isolation from slow handlers: a slow subscriber delays the ones after
//!   it and the listener itself. The run is unaffected (`Bus::publish`
//!   never waits on the listener), but a listener that falls more than the
//!   bus capacity behind skips the oldest events (`Lagged`).

use std::sync::Arc;

use futures::FutureExt;

use crate::events::Event;

use super::Subscribe;

/// The run's subscribers, delivered to in registration order.
pub struct SubscriberSet {
    subs: Vec<Arc<dyn Subscribe>>,
}

impl SubscriberSet {
    /// Creates a new set. Construction is passive; delivery only happens
    /// through [`deliver`](SubscriberSet::deliver).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self { subs }
    }

    /// Hands `event` to every subscriber in registration order, awaiting
    /// each handler before moving to the next.
    ///
    /// A handler that panics is caught and reported with the subscriber's
    /// name; delivery continues with the rest of the set.
    pub async fn deliver(&self, event: &Event) {
        for sub in &self.subs {
            let fut = sub.on_event(event);
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                eprintln!(
                    "[prospector] subscriber '{}' panicked: {:?}",
                    sub.name(),
                    panic_err
                );
            }
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subs.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::events::EventKind;

    struct Recorder {
        tag: &'static str,
        seen: Arc<Mutex<Vec<(&'static str, u64)>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push((self.tag, event.seq));
        }

        fn name(&self) -> &'static str {
            self.tag
        }
    }

    struct Grumpy;

    #[async_trait]
    impl Subscribe for Grumpy {
        async fn on_event(&self, _event: &Event) {
            panic!("refusing the event");
        }

        fn name(&self) -> &'static str {
            "grumpy"
        }
    }

    fn stamped(seq: u64) -> Event {
        let mut ev = Event::now(EventKind::StepAdded);
        ev.seq = seq;
        ev
    }

    #[tokio::test]
    async fn test_deliver_walks_subscribers_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![
            Arc::new(Recorder {
                tag: "a",
                seen: seen.clone(),
            }) as Arc<dyn Subscribe>,
            Arc::new(Recorder {
                tag: "b",
                seen: seen.clone(),
            }),
        ]);
        assert_eq!(set.len(), 2);

        set.deliver(&stamped(0)).await;
        set.deliver(&stamped(1)).await;

        // Both subscribers saw both events, in the same total order.
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("a", 0), ("b", 0), ("a", 1), ("b", 1)]
        );
    }

    #[tokio::test]
    async fn test_panicking_subscriber_does_not_starve_the_rest() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let set = SubscriberSet::new(vec![
            Arc::new(Grumpy) as Arc<dyn Subscribe>,
            Arc::new(Recorder {
                tag: "b",
                seen: seen.clone(),
            }),
        ]);

        set.deliver(&stamped(0)).await;
        assert_eq!(*seen.lock().unwrap(), vec![("b", 0)]);
    }
}
