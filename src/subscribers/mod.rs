//! Event observers: the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out, plus the optional built-in [`LogWriter`].

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
