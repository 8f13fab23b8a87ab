//! # Browser: the page-automation collaborator seam.
//!
//! The step machine never touches a page itself; step bodies drive an
//! implementation of the [`Browser`] trait. The trait covers exactly what a
//! navigation step needs: open a URL, evaluate JavaScript in page context,
//! click an element, test for an element's existence. How pages are
//! fetched, rendered, or waited for is the implementation's business; each
//! call resolves once the page has settled enough for the next step.
//!
//! The `chrome` feature provides [`ChromeBrowser`], a headless-Chrome
//! implementation. Tests substitute their own mock.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "chrome")]
mod chrome;

#[cfg(feature = "chrome")]
pub use chrome::ChromeBrowser;

/// Shared handle to a browser implementation.
pub type BrowserRef = Arc<dyn Browser>;

/// # Errors produced by the page-automation collaborator.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BrowserError {
    /// The browser process could not be launched or attached to.
    #[error("browser launch failed: {error}")]
    Launch {
        /// The underlying error message.
        error: String,
    },

    /// Navigation to a URL failed.
    #[error("navigation to {url} failed: {error}")]
    Navigate {
        /// The URL being opened.
        url: String,
        /// The underlying error message.
        error: String,
    },

    /// In-page JavaScript evaluation failed.
    #[error("evaluation failed: {error}")]
    Evaluate {
        /// The underlying error message.
        error: String,
    },

    /// An element interaction failed.
    #[error("element {selector:?} interaction failed: {error}")]
    Element {
        /// The CSS selector involved.
        selector: String,
        /// The underlying error message.
        error: String,
    },

    /// The driver session died underneath us.
    #[error("browser session failed: {error}")]
    Session {
        /// The underlying error message.
        error: String,
    },
}

/// # Asynchronous page-automation primitives.
///
/// Everything a navigation step does to a page goes through these four
/// calls. Implementations are free to block internally (behind
/// `spawn_blocking`) or be natively async; either way a call returning
/// means the operation finished and the page is ready for the next step.
#[async_trait]
pub trait Browser: Send + Sync + 'static {
    /// Opens `url` and waits for the page to settle.
    async fn open(&self, url: &str) -> Result<(), BrowserError>;

    /// Evaluates a JavaScript expression in page context and returns its
    /// value. Expressions that need to hand back structured data should
    /// return a JSON string.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Clicks the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), BrowserError>;

    /// Returns whether an element matching `selector` is present.
    async fn exists(&self, selector: &str) -> Result<bool, BrowserError>;
}
