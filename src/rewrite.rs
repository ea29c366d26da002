//! Appending a search term to the query held in a results-page URL.

use regex::RegexBuilder;
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

/// Errors rewriting a URL
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("cannot build term pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Outcome of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The term is already in the query; nothing to do.
    Unchanged,
    /// Navigate to this URL.
    Navigate(Url),
}

/// Where the search query was found in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryLocation {
    /// Standard `?key=value` query string
    Search,
    /// Form-encoded pairs after `#`
    Fragment,
}

/// Current value of `query_param` and where it lives.
///
/// The query string is preferred. The fragment is only consulted when the
/// query string has no non-empty value for the parameter.
pub fn current_query(url: &Url, query_param: &str) -> (String, QueryLocation) {
    let from_search = url
        .query_pairs()
        .find(|(key, _)| key == query_param)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty());

    if let Some(query) = from_search {
        return (query, QueryLocation::Search);
    }

    let from_fragment = url
        .fragment()
        .filter(|fragment| !fragment.is_empty())
        .and_then(|fragment| {
            form_urlencoded::parse(fragment.as_bytes())
                .find(|(key, _)| key == query_param)
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty());

    match from_fragment {
        Some(query) => (query, QueryLocation::Fragment),
        None => (String::new(), QueryLocation::Search),
    }
}

/// Whether `term` appears in `query` as a whole whitespace-delimited phrase,
/// ignoring case. `cat` is not in `category pages`.
pub fn contains_term(query: &str, term: &str) -> Result<bool, regex::Error> {
    let pattern = format!(r"(^|\s){}(\s|$)", regex::escape(term));
    let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
    Ok(regex.is_match(query))
}

/// Append `term` to the search query of `current_url`.
///
/// The new query is written back where it was read from. Everything else
/// in the URL is left as it was.
pub fn build_rewritten_url(
    current_url: &str,
    query_param: &str,
    term: &str,
) -> Result<Rewrite, RewriteError> {
    let url = Url::parse(current_url)?;
    rewrite_url(&url, query_param, term)
}

/// Same as [`build_rewritten_url`] for an already parsed URL.
pub fn rewrite_url(url: &Url, query_param: &str, term: &str) -> Result<Rewrite, RewriteError> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(Rewrite::Unchanged);
    }

    let (query, location) = current_query(url, query_param);

    if contains_term(&query, term)? {
        log::debug!("Query {:?} already contains {:?}", query, term);
        return Ok(Rewrite::Unchanged);
    }

    let new_query = format!("{} {}", query, term).trim().to_string();
    let mut rewritten = url.clone();

    match location {
        QueryLocation::Search => {
            let raw = url.query().unwrap_or("");
            rewritten.set_query(Some(&replace_pair(raw, query_param, &new_query)));
        }
        QueryLocation::Fragment => {
            let raw = url.fragment().unwrap_or("");
            rewritten.set_fragment(Some(&replace_pair(raw, query_param, &new_query)));
        }
    }

    log::debug!("Rewrote {} -> {}", url, rewritten);
    Ok(Rewrite::Navigate(rewritten))
}

/// Set `key=value` in a raw form-encoded string.
///
/// The first pair named `key` is replaced and later ones dropped; the pair
/// is appended when missing. Other pairs keep their original encoding.
fn replace_pair(raw: &str, key: &str, value: &str) -> String {
    let encoded = form_urlencoded::Serializer::new(String::new())
        .append_pair(key, value)
        .finish();

    let mut segments: Vec<&str> = Vec::new();
    let mut replaced = false;

    for segment in raw.split('&').filter(|segment| !segment.is_empty()) {
        let is_key = form_urlencoded::parse(segment.as_bytes())
            .next()
            .is_some_and(|(name, _)| name == key);

        if !is_key {
            segments.push(segment);
        } else if !replaced {
            segments.push(&encoded);
            replaced = true;
        }
    }

    if !replaced {
        segments.push(&encoded);
    }

    segments.join("&")
}
