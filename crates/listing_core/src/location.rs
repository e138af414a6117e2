use std::fmt;

use thiserror::Error;
use url::Url;

/// Query parameter carrying the free-text search.
pub const SEARCH_PARAM: &str = "search";
/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("invalid location {raw:?}: {source}")]
    Invalid {
        raw: String,
        #[source]
        source: url::ParseError,
    },
}

/// An absolute URL describing what the listing shows.
///
/// Relative hrefs are always resolved against the page's current location, so
/// every value shares the page origin it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigableLocation(Url);

impl NavigableLocation {
    pub fn parse(raw: &str) -> Result<Self, LocationError> {
        Url::parse(raw)
            .map(Self)
            .map_err(|source| LocationError::Invalid {
                raw: raw.to_string(),
                source,
            })
    }

    /// Resolves `href` the way a browser resolves an anchor's `href`.
    pub fn resolve(&self, href: &str) -> Result<Self, LocationError> {
        self.0
            .join(href.trim())
            .map(Self)
            .map_err(|source| LocationError::Invalid {
                raw: href.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    /// First value of the query parameter `name`, if present.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.0
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Path plus query, the way it shows up in a request line.
    pub fn path_and_query(&self) -> String {
        match self.0.query() {
            Some(query) => format!("{}?{}", self.0.path(), query),
            None => self.0.path().to_string(),
        }
    }
}

impl fmt::Display for NavigableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<Url> for NavigableLocation {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

/// What a single user event asks the listing to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterIntent {
    Search(String),
    Category(String),
    Page(String),
}

impl FilterIntent {
    /// Turns the intent into a location relative to `current`.
    ///
    /// Only searches synthesise a new query; category and page hrefs were
    /// rendered by the server with every parameter they need and are used as-is.
    pub fn into_location(
        self,
        current: &NavigableLocation,
    ) -> Result<NavigableLocation, LocationError> {
        match self {
            FilterIntent::Search(text) => Ok(build_search_location(current, &text)),
            FilterIntent::Category(href) | FilterIntent::Page(href) => current.resolve(&href),
        }
    }
}

/// Builds the location for a search of `search_text` from `current`.
///
/// The trimmed text replaces the `search` parameter in place (or is appended);
/// empty text removes it. `page` is always dropped since a new search starts
/// over at the first page. Other parameters keep their order.
pub fn build_search_location(current: &NavigableLocation, search_text: &str) -> NavigableLocation {
    let trimmed = search_text.trim();
    let mut url = current.url().clone();

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut search_written = false;
    for (key, value) in url.query_pairs() {
        if key == PAGE_PARAM {
            continue;
        }
        if key == SEARCH_PARAM {
            if !search_written && !trimmed.is_empty() {
                pairs.push((SEARCH_PARAM.to_string(), trimmed.to_string()));
            }
            search_written = true;
            continue;
        }
        pairs.push((key.into_owned(), value.into_owned()));
    }
    if !search_written && !trimmed.is_empty() {
        pairs.push((SEARCH_PARAM.to_string(), trimmed.to_string()));
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    NavigableLocation(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(raw: &str) -> NavigableLocation {
        NavigableLocation::parse(raw).unwrap()
    }

    #[test]
    fn search_replaces_existing_value_in_place() {
        let built = build_search_location(
            &loc("https://example.com/doctors/?search=old&category=eye"),
            "new",
        );
        assert_eq!(
            built.as_str(),
            "https://example.com/doctors/?search=new&category=eye"
        );
    }

    #[test]
    fn duplicate_search_params_collapse_to_one() {
        let built = build_search_location(
            &loc("https://example.com/?search=a&search=b"),
            "c",
        );
        assert_eq!(built.as_str(), "https://example.com/?search=c");
    }

    #[test]
    fn spaces_are_form_encoded() {
        let built = build_search_location(&loc("https://example.com/"), "  dr smith ");
        assert_eq!(built.as_str(), "https://example.com/?search=dr+smith");
        assert_eq!(built.query_param(SEARCH_PARAM).as_deref(), Some("dr smith"));
    }

    #[test]
    fn fragment_survives_search() {
        let built = build_search_location(&loc("https://example.com/?page=2#list"), "x");
        assert_eq!(built.as_str(), "https://example.com/?search=x#list");
    }

    #[test]
    fn page_intent_resolves_relative_href() {
        let current = loc("https://example.com/doctors/?category=dentist");
        let next = FilterIntent::Page("?category=dentist&page=3".into())
            .into_location(&current)
            .unwrap();
        assert_eq!(next.path_and_query(), "/doctors/?category=dentist&page=3");
    }
}
