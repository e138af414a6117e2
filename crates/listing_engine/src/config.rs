use std::time::Duration;

use listing_core::DEFAULT_LOADING_OPACITY;
use scraper::Selector;
use serde::Deserialize;
use thiserror::Error;

use crate::fetch::{FetchSettings, FRAGMENT_HEADER, FRAGMENT_HEADER_VALUE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid selector for {field}: {selector:?} ({message})")]
    InvalidSelector {
        field: &'static str,
        selector: String,
        message: String,
    },
    #[error("loading opacity must be within 0.0..=1.0, got {0}")]
    Opacity(f32),
}

/// CSS selectors tying the engine to the page template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageSelectors {
    pub search_form: String,
    /// Looked up inside the search form.
    pub search_input: String,
    pub category_links: String,
    pub content: String,
    pub pagination: String,
    pub pagination_links: String,
    pub banner: String,
    pub loading_overlay: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            search_form: ".search-box form".to_string(),
            search_input: "input[name=\"search\"]".to_string(),
            category_links: ".category-filter a".to_string(),
            content: ".row".to_string(),
            pagination: ".pagination".to_string(),
            pagination_links: ".pagination a".to_string(),
            banner: ".alert-info".to_string(),
            loading_overlay: "#loadingOverlay".to_string(),
        }
    }
}

impl PageSelectors {
    pub fn compile(&self) -> Result<CompiledSelectors, ConfigError> {
        Ok(CompiledSelectors {
            search_form: compile("search_form", &self.search_form)?,
            search_input: compile("search_input", &self.search_input)?,
            category_links: compile("category_links", &self.category_links)?,
            content: compile("content", &self.content)?,
            pagination: compile("pagination", &self.pagination)?,
            pagination_links: compile("pagination_links", &self.pagination_links)?,
            banner: compile("banner", &self.banner)?,
            loading_overlay: compile("loading_overlay", &self.loading_overlay)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub search_form: Selector,
    pub search_input: Selector,
    pub category_links: Selector,
    pub content: Selector,
    pub pagination: Selector,
    pub pagination_links: Selector,
    pub banner: Selector,
    pub loading_overlay: Selector,
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|err| ConfigError::InvalidSelector {
        field,
        selector: selector.to_string(),
        message: format!("{err:?}"),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub fragment_header: String,
    pub fragment_header_value: String,
    /// Fail on non-2xx statuses, non-HTML content types and malformed text.
    pub strict_responses: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let settings = FetchSettings::default();
        Self {
            connect_timeout_ms: settings.connect_timeout.as_millis() as u64,
            request_timeout_ms: settings.request_timeout.as_millis() as u64,
            redirect_limit: settings.redirect_limit,
            max_bytes: settings.max_bytes,
            fragment_header: FRAGMENT_HEADER.to_string(),
            fragment_header_value: FRAGMENT_HEADER_VALUE.to_string(),
            strict_responses: settings.strict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub selectors: PageSelectors,
    pub debounce_ms: u64,
    pub loading_opacity: f32,
    pub fetch: FetchConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            selectors: PageSelectors::default(),
            debounce_ms: 500,
            loading_opacity: DEFAULT_LOADING_OPACITY,
            fetch: FetchConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parses a RON document; fields it does not name keep their defaults.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: SyncConfig =
            ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.loading_opacity) {
            return Err(ConfigError::Opacity(self.loading_opacity));
        }
        self.selectors.compile().map(|_| ())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.fetch.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.fetch.request_timeout_ms),
            redirect_limit: self.fetch.redirect_limit,
            max_bytes: self.fetch.max_bytes,
            fragment_header: (
                self.fetch.fragment_header.clone(),
                self.fetch.fragment_header_value.clone(),
            ),
            strict: self.fetch.strict_responses,
            ..FetchSettings::default()
        }
    }
}
