//! # The directory program.
//!
//! [`build_program`] registers the full navigation program against a
//! [`Flow`]: iterate the (term, department) search pairs, submit the
//! portal's form for each, page through the result set, and write one CSV
//! line per extracted listing.
//!
//! ## Program shape
//! ```text
//!   csv header
//! search_loop:
//!   open portal
//!   advance search ── pairs exhausted? ──► goto search_done
//!   submit search form
//! results_loop:
//!   reveal phone numbers
//!   extract listings
//!   write csv lines
//!   next page? ── absent ──► goto results_done
//!   goto results_loop
//! results_done:
//!   goto search_loop
//! search_done:
//! ```
//!
//! Every step is top-level; the loops exist purely through the labels and
//! the jumps, which is the whole point of the machine underneath.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::browser::BrowserRef;
use crate::config::ScrapeConfig;
use crate::error::{FlowError, StepError};
use crate::flow::{Flow, StepFn};
use crate::scrape::listing::{Listing, CSV_HEADER};
use crate::scrape::queries;

/// Shared output sink for CSV lines.
///
/// The binary hands in stdout; tests hand in a buffer.
pub type CsvSink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Mutable state threaded through the program's steps.
struct Crawl {
    /// (term, department) pairs still to be searched, in order.
    pairs: Vec<(Arc<str>, u32)>,
    /// Index of the next pair.
    position: usize,
    /// Term of the search in flight.
    term: Arc<str>,
    /// Department of the search in flight.
    department: u32,
    /// Listings extracted from the current results page.
    listings: Vec<Listing>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers the directory program on `flow`.
///
/// The flow must be started and not yet running; the program occupies the
/// queue from the CSV header step down to the `search_done` label.
pub fn build_program(
    flow: &Flow,
    browser: BrowserRef,
    cfg: &ScrapeConfig,
    sink: CsvSink,
) -> Result<(), FlowError> {
    let crawl = Arc::new(Mutex::new(Crawl {
        pairs: cfg.pairs(),
        position: 0,
        term: "".into(),
        department: 0,
        listings: Vec::new(),
    }));
    let portal: Arc<str> = cfg.portal_url.as_str().into();

    let out = sink.clone();
    flow.then(StepFn::arc("csv header", move |_ctx: Flow| {
        let out = out.clone();
        async move {
            writeln!(lock(&out), "{CSV_HEADER}")?;
            Ok::<_, StepError>(())
        }
    }))?;

    flow.label("search_loop")?;

    let open_browser = browser.clone();
    flow.then(StepFn::arc("open portal", move |_ctx: Flow| {
        let browser = open_browser.clone();
        let portal = portal.clone();
        async move {
            browser.open(&portal).await?;
            Ok(())
        }
    }))?;

    let advance_crawl = crawl.clone();
    flow.then(StepFn::arc("advance search", move |ctx: Flow| {
        let crawl = advance_crawl.clone();
        async move {
            let done = {
                let mut crawl = lock(&crawl);
                match crawl.pairs.get(crawl.position).cloned() {
                    Some((term, department)) => {
                        crawl.term = term;
                        crawl.department = department;
                        crawl.position += 1;
                        false
                    }
                    None => true,
                }
            };
            if done {
                ctx.goto("search_done")?;
            }
            Ok(())
        }
    }))?;

    let submit_browser = browser.clone();
    let submit_crawl = crawl.clone();
    flow.then(StepFn::arc("submit search", move |_ctx: Flow| {
        let browser = submit_browser.clone();
        let crawl = submit_crawl.clone();
        async move {
            let (term, department) = {
                let crawl = lock(&crawl);
                (crawl.term.clone(), crawl.department)
            };
            browser
                .evaluate(&queries::search_form(&term, department))
                .await?;
            Ok(())
        }
    }))?;

    flow.label("results_loop")?;

    let reveal_browser = browser.clone();
    flow.then(StepFn::arc("reveal phones", move |_ctx: Flow| {
        let browser = reveal_browser.clone();
        async move {
            // Zero-result pages carry no reveal control; skip quietly.
            if browser.exists(queries::PHONE_REVEAL).await? {
                browser.click(queries::PHONE_REVEAL).await?;
            }
            Ok(())
        }
    }))?;

    let extract_browser = browser.clone();
    let extract_crawl = crawl.clone();
    flow.then(StepFn::arc("extract listings", move |_ctx: Flow| {
        let browser = extract_browser.clone();
        let crawl = extract_crawl.clone();
        async move {
            let value = browser.evaluate(queries::EXTRACT_LISTINGS).await?;
            let payload = value.as_str().ok_or_else(|| StepError::Decode {
                error: "extraction script returned a non-string value".to_string(),
            })?;
            let listings: Vec<Listing> = serde_json::from_str(payload)?;
            lock(&crawl).listings = listings;
            Ok(())
        }
    }))?;

    let write_crawl = crawl.clone();
    let write_out = sink.clone();
    flow.then(StepFn::arc("write csv lines", move |_ctx: Flow| {
        let crawl = write_crawl.clone();
        let out = write_out.clone();
        async move {
            let crawl = lock(&crawl);
            let mut out = lock(&out);
            for listing in &crawl.listings {
                writeln!(out, "{}", listing.csv_line(crawl.department, &crawl.term))?;
            }
            Ok::<_, StepError>(())
        }
    }))?;

    let next_browser = browser.clone();
    flow.then(StepFn::arc("next page", move |ctx: Flow| {
        let browser = next_browser.clone();
        async move {
            if browser.exists(queries::NEXT_LINK).await? {
                browser.click(queries::NEXT_LINK_ANCHOR).await?;
            } else {
                ctx.goto("results_done")?;
            }
            Ok(())
        }
    }))?;

    flow.then(StepFn::arc("loop results", |ctx: Flow| async move {
        ctx.goto("results_loop")?;
        Ok(())
    }))?;

    flow.label("results_done")?;

    flow.then(StepFn::arc("loop search", |ctx: Flow| async move {
        ctx.goto("search_loop")?;
        Ok(())
    }))?;

    flow.label("search_done")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use async_trait::async_trait;

    use super::*;
    use crate::browser::{Browser, BrowserError};
    use crate::config::FlowConfig;

    /// Scripted browser: extraction payloads and next-page answers are
    /// consumed in order, everything else is recorded and succeeds.
    struct MockBrowser {
        extractions: Mutex<VecDeque<String>>,
        next_pages: Mutex<VecDeque<bool>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockBrowser {
        fn new(extractions: Vec<&str>, next_pages: Vec<bool>) -> Arc<Self> {
            Arc::new(Self {
                extractions: Mutex::new(extractions.into_iter().map(String::from).collect()),
                next_pages: Mutex::new(next_pages.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn count(&self, call: &str) -> usize {
            lock(&self.calls).iter().filter(|c| c.as_str() == call).count()
        }
    }

    #[async_trait]
    impl Browser for MockBrowser {
        async fn open(&self, _url: &str) -> Result<(), BrowserError> {
            lock(&self.calls).push("open".to_string());
            Ok(())
        }

        async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
            if script.contains(".visitCard") {
                lock(&self.calls).push("extract".to_string());
                let payload = lock(&self.extractions)
                    .pop_front()
                    .unwrap_or_else(|| "[]".to_string());
                Ok(serde_json::Value::String(payload))
            } else {
                lock(&self.calls).push("submit".to_string());
                Ok(serde_json::Value::Bool(true))
            }
        }

        async fn click(&self, selector: &str) -> Result<(), BrowserError> {
            lock(&self.calls).push(format!("click {selector}"));
            Ok(())
        }

        async fn exists(&self, selector: &str) -> Result<bool, BrowserError> {
            if selector == queries::NEXT_LINK {
                Ok(lock(&self.next_pages).pop_front().unwrap_or(false))
            } else {
                Ok(false)
            }
        }
    }

    /// `Write` handle over a shared buffer, so tests can read back what
    /// the program wrote.
    #[derive(Clone)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            lock(&self.0).extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture() -> (CsvSink, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink: CsvSink = Arc::new(Mutex::new(Box::new(SharedBuf(buf.clone()))));
        (sink, buf)
    }

    fn config(departments: Vec<u32>, term: &str) -> ScrapeConfig {
        ScrapeConfig {
            departments,
            terms: vec![term.to_string()],
            ..ScrapeConfig::default()
        }
    }

    const ACME_PAGE: &str = r#"[{"kind":"page_pro","name":"Acme","siret":"123",
        "site":"acme.fr","tels":["0611112222","0145000000"],"adresse":"1 Rue X"}]"#;

    #[tokio::test]
    async fn test_two_departments_one_with_listings() {
        let browser = MockBrowser::new(vec![ACME_PAGE, "[]"], vec![false, false]);
        let (sink, buf) = capture();
        let flow = Flow::builder(FlowConfig::default()).build();
        flow.start().unwrap();
        build_program(&flow, browser.clone(), &config(vec![25, 52], "menuiserie bois"), sink)
            .unwrap();

        flow.run().await.unwrap();

        let output = String::from_utf8(lock(&buf).clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "expected header plus exactly one data line");
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(
            lines[1],
            "Acme;123;acme.fr;1 Rue X;0611112222;0145000000;25;menuiserie bois"
        );

        // One search per department, one results page each, plus the final
        // portal visit that discovers the pairs are exhausted.
        assert_eq!(browser.count("open"), 3);
        assert_eq!(browser.count("submit"), 2);
        assert_eq!(browser.count("extract"), 2);
    }

    #[tokio::test]
    async fn test_pagination_follows_next_link_until_absent() {
        let browser = MockBrowser::new(vec!["[]", "[]", "[]"], vec![true, true, false]);
        let (sink, buf) = capture();
        let flow = Flow::builder(FlowConfig::default()).build();
        flow.start().unwrap();
        build_program(&flow, browser.clone(), &config(vec![25], "menuiserie bois"), sink)
            .unwrap();

        flow.run().await.unwrap();

        // Two next-page clicks means three result pages extracted.
        assert_eq!(browser.count("extract"), 3);
        assert_eq!(browser.count(&format!("click {}", queries::NEXT_LINK_ANCHOR)), 2);

        // No listings anywhere: header only.
        let output = String::from_utf8(lock(&buf).clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_bad_extraction_payload_aborts_run() {
        let browser = MockBrowser::new(vec!["not json"], vec![false]);
        let (sink, _buf) = capture();
        let flow = Flow::builder(FlowConfig::default()).build();
        flow.start().unwrap();
        build_program(&flow, browser, &config(vec![25], "menuiserie bois"), sink).unwrap();

        let err = flow.run().await.unwrap_err();
        assert!(matches!(err, FlowError::Step(StepError::Decode { .. })));
    }
}
