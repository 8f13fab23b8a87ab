//! # Headless-Chrome implementation of the [`Browser`] seam.
//!
//! Drives a single tab of a headless Chrome through the DevTools protocol.
//! The underlying client is blocking, so every call is pushed through
//! [`tokio::task::spawn_blocking`] to keep the step runner's thread free.
//!
//! The directory serves obfuscated hrefs to browsers it does not
//! recognize, so the tab's user agent is pinned at launch.

use std::sync::Arc;

use headless_chrome::{Browser as Chrome, LaunchOptions, Tab};
use tokio::task;

use super::{Browser, BrowserError};

/// Headless-Chrome backed [`Browser`].
///
/// Holds the browser process handle for the lifetime of the scrape; all
/// page work happens in one tab.
pub struct ChromeBrowser {
    tab: Arc<Tab>,
    // Keeps the browser process alive as long as the tab is in use.
    _chrome: Chrome,
}

impl ChromeBrowser {
    /// Launches a headless Chrome, opens a tab, and pins the user agent.
    pub fn launch(user_agent: &str) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| BrowserError::Launch {
                error: e.to_string(),
            })?;
        let chrome = Chrome::new(options).map_err(|e| BrowserError::Launch {
            error: e.to_string(),
        })?;
        let tab = chrome.new_tab().map_err(|e| BrowserError::Launch {
            error: e.to_string(),
        })?;
        tab.set_user_agent(user_agent, None, None)
            .map_err(|e| BrowserError::Launch {
                error: e.to_string(),
            })?;
        Ok(Self {
            tab,
            _chrome: chrome,
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, BrowserError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Tab>) -> Result<T, BrowserError> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        task::spawn_blocking(move || op(tab))
            .await
            .map_err(|e| BrowserError::Session {
                error: e.to_string(),
            })?
    }
}

#[async_trait::async_trait]
impl Browser for ChromeBrowser {
    async fn open(&self, url: &str) -> Result<(), BrowserError> {
        let url = url.to_string();
        self.blocking(move |tab| {
            tab.navigate_to(&url).map_err(|e| BrowserError::Navigate {
                url: url.clone(),
                error: e.to_string(),
            })?;
            tab.wait_until_navigated()
                .map_err(|e| BrowserError::Navigate {
                    url: url.clone(),
                    error: e.to_string(),
                })?;
            Ok(())
        })
        .await
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let script = script.to_string();
        self.blocking(move |tab| {
            let object = tab
                .evaluate(&script, false)
                .map_err(|e| BrowserError::Evaluate {
                    error: e.to_string(),
                })?;
            Ok(object.value.unwrap_or(serde_json::Value::Null))
        })
        .await
    }

    async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let selector = selector.to_string();
        self.blocking(move |tab| {
            let element = tab
                .find_element(&selector)
                .map_err(|e| BrowserError::Element {
                    selector: selector.clone(),
                    error: e.to_string(),
                })?;
            element.click().map_err(|e| BrowserError::Element {
                selector: selector.clone(),
                error: e.to_string(),
            })?;
            // Clicks that trigger a navigation should settle before the
            // next step evaluates anything; a click that stays on the page
            // simply times out here and that is fine.
            let _ = tab.wait_until_navigated();
            Ok(())
        })
        .await
    }

    async fn exists(&self, selector: &str) -> Result<bool, BrowserError> {
        let selector = selector.to_string();
        self.blocking(move |tab| Ok(tab.find_element(&selector).is_ok()))
            .await
    }
}
