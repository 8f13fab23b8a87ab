//! Builder for constructing a [`Flow`] with optional features.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::config::FlowConfig;
use crate::events::Bus;
use crate::flow::flow::{Flow, Shared};
use crate::flow::state::RunState;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Flow`].
pub struct FlowBuilder {
    cfg: FlowConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    cancel: CancellationToken,
}

impl FlowBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: FlowConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (steps added, jumps, completion)
    /// in publish order. With at least one subscriber,
    /// [`build`](FlowBuilder::build) must run inside a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds a single subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sets the cancellation token observed between dispatches.
    ///
    /// Cancelling the token does not interrupt the step in flight; the
    /// runner stops before dispatching the next one.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds and returns the flow handle.
    ///
    /// When subscribers are present, a listener task is spawned that owns
    /// the [`SubscriberSet`] and drains the bus into it for the lifetime of
    /// the flow, so even construction-phase events are observed.
    pub fn build(self) -> Flow {
        let bus = Bus::new(self.cfg.bus_capacity);
        let subs = SubscriberSet::new(self.subscribers);

        let flow = Flow::from_shared(Arc::new(Shared {
            bus: bus.clone(),
            cancel: self.cancel,
            state: Mutex::new(RunState::new()),
        }));

        if !subs.is_empty() {
            let mut rx = bus.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => subs.deliver(&ev).await,
                        Err(RecvError::Lagged(skipped)) => {
                            eprintln!(
                                "[prospector] subscriber listener lagged; skipped {skipped} events"
                            );
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }

        flow
    }
}
