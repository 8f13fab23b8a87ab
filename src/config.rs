//! # Runtime configuration.
//!
//! Two configuration structs live here:
//! 1. **[`FlowConfig`]**: settings for the step machine itself.
//! 2. **[`ScrapeConfig`]**: the directory program's inputs (departments,
//!    search terms, portal URL, user agent).

use std::sync::Arc;

/// Configuration for the flow machine.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by `Bus`).
///   Slow subscribers that lag behind more than `bus_capacity` messages
///   receive `Lagged` and skip older items.
#[derive(Clone, Debug)]
pub struct FlowConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl Default for FlowConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    fn default() -> Self {
        Self { bus_capacity: 1024 }
    }
}

/// Inputs for the directory-prospecting program.
///
/// Each run iterates the cartesian product of `terms` × `departments`: for
/// every pair, the program opens the portal, submits the search form, and
/// pages through the result set.
#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    /// Department codes used as the "where" of each search.
    pub departments: Vec<u32>,
    /// Search terms used as the "what" of each search.
    pub terms: Vec<String>,
    /// Directory portal to open before each search.
    pub portal_url: String,
    /// User agent presented to the directory.
    ///
    /// The portal serves obfuscated links to unknown browsers; emulating
    /// Chrome keeps hrefs plain.
    pub user_agent: String,
}

impl ScrapeConfig {
    /// Returns the (term, department) pairs in search order: every term is
    /// run against every department.
    pub fn pairs(&self) -> Vec<(Arc<str>, u32)> {
        let mut out = Vec::with_capacity(self.terms.len() * self.departments.len());
        for term in &self.terms {
            let term: Arc<str> = term.as_str().into();
            for &department in &self.departments {
                out.push((term.clone(), department));
            }
        }
        out
    }
}

impl Default for ScrapeConfig {
    /// Default search: one joinery term over the north-eastern departments.
    fn default() -> Self {
        Self {
            departments: vec![51, 55, 59, 60, 62, 80],
            terms: vec!["menuiserie d'agencement".to_string()],
            portal_url: "https://www.pagesjaunes.fr/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 5.1) AppleWebKit/537.1 \
                         (KHTML, like Gecko) Chrome/21.0.1180.79 Safari/537.1"
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_is_cartesian_product() {
        let cfg = ScrapeConfig {
            departments: vec![25, 52],
            terms: vec!["a".into(), "b".into()],
            ..ScrapeConfig::default()
        };
        let pairs = cfg.pairs();
        assert_eq!(pairs.len(), 4);
        assert_eq!(&*pairs[0].0, "a");
        assert_eq!(pairs[0].1, 25);
        assert_eq!(&*pairs[1].0, "a");
        assert_eq!(pairs[1].1, 52);
        assert_eq!(&*pairs[2].0, "b");
        assert_eq!(pairs[3].1, 52);
    }
}
