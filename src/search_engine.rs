//! Recognition of supported search engine result pages.

use crate::config;
use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// A supported search engine and where it keeps the user's query.
#[derive(Debug, Clone)]
pub struct SearchEngineProfile {
    pub name: &'static str,
    pattern: Regex,
    /// URL parameter holding the search text (`q` or `p`).
    pub query_param: &'static str,
}

impl SearchEngineProfile {
    /// Whether a page URL is a results page of this engine
    pub fn matches(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// The engine table, compiled once from `config::SEARCH_ENGINES`.
pub fn profiles() -> &'static [SearchEngineProfile] {
    static PROFILES: OnceLock<Vec<SearchEngineProfile>> = OnceLock::new();

    PROFILES.get_or_init(|| {
        config::SEARCH_ENGINES
            .iter()
            .filter_map(|&(name, pattern, query_param)| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(pattern) => Some(SearchEngineProfile {
                        name,
                        pattern,
                        query_param,
                    }),
                    Err(e) => {
                        log::error!("Invalid pattern for search engine {}: {}", name, e);
                        None
                    }
                }
            })
            .collect()
    })
}

/// First engine, in table order, whose pattern matches `url`.
pub fn detect(url: &str) -> Option<&'static SearchEngineProfile> {
    profiles().iter().find(|profile| profile.matches(url))
}

/// Whether `name` is the query parameter of any supported engine.
pub fn is_query_param(name: &str) -> bool {
    profiles().iter().any(|profile| profile.query_param == name)
}
