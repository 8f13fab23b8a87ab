//! Event plumbing: the [`Event`] vocabulary and the broadcast [`Bus`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
