//! # Event bus: broadcast channel plus the run's sequence counter.
//!
//! [`Bus`] couples a [`tokio::sync::broadcast`] channel with the sequence
//! counter for one run: every event is stamped with the next `seq` on its
//! way out of [`Bus::publish`]. Keeping the counter on the bus (rather
//! than in a process-wide static) means two flows in the same process
//! never share ordering state, and an event's `seq` always reflects the
//! moment it was published, not the moment it was built.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` stamps and sends; it never
//!   waits on receivers.
//! - **Bounded capacity**: a single ring buffer stores recent events for
//!   all receivers; the minimum capacity is 1 (clamped).
//! - **Lag handling**: a receiver that falls behind gets
//!   `RecvError::Lagged(n)` and skips the `n` oldest items.
//! - **No persistence**: events published with no live receiver are gone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for one run's events.
///
/// Cheap to clone; clones share the channel and the sequence counter, so
/// `seq` stays monotonic no matter which handle publishes.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    seq: Arc<AtomicU64>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self {
            tx,
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamps `ev` with this bus's next sequence number and publishes it
    /// to all active receivers.
    ///
    /// If there are no receivers the event is dropped; the sequence number
    /// is consumed either way.
    pub fn publish(&self, mut ev: Event) {
        ev.seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets events **sent after** it subscribes.
    /// - Slow receivers get `RecvError::Lagged(n)` and skip over missed items.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[test]
    fn test_publish_stamps_sequence_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::now(EventKind::StepAdded));
        bus.publish(Event::now(EventKind::RunComplete));

        assert_eq!(rx.try_recv().unwrap().seq, 0);
        assert_eq!(rx.try_recv().unwrap().seq, 1);
    }

    #[test]
    fn test_clones_share_the_counter_but_buses_do_not() {
        let bus = Bus::new(8);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        bus.publish(Event::now(EventKind::StepAdded));
        clone.publish(Event::now(EventKind::StepAdded));
        assert_eq!(rx.try_recv().unwrap().seq, 0);
        assert_eq!(rx.try_recv().unwrap().seq, 1);

        let other = Bus::new(8);
        let mut other_rx = other.subscribe();
        other.publish(Event::now(EventKind::StepAdded));
        assert_eq!(other_rx.try_recv().unwrap().seq, 0);
    }
}
