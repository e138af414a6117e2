#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use listing_core::NavigableLocation;
use listing_engine::{
    EnginePorts, FailureKind, FetchError, FetchMetadata, FetchOutput, Fetcher, LiveDocument,
    MemoryHistory, RecordingViewport, SyncConfig, SyncEngine,
};

pub const ORIGIN: &str = "https://clinic.test";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sync_logging::initialize_for_tests);
}

pub fn loc(path_and_query: &str) -> NavigableLocation {
    NavigableLocation::parse(&format!("{ORIGIN}{path_and_query}")).unwrap()
}

/// Full listing page with every anchor the engine binds to.
pub const FULL_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Doctors</title></head><body>
<div class="search-box"><form action="/doctors/" method="get"><input type="text" name="search" value=""><button type="submit">Search</button></form></div>
<div class="category-filter"><a class="btn active" href="/doctors/">All</a><a class="btn" href="/doctors/?category=dentist">Dentist</a><a class="btn" href="/doctors/?category=eye">Eye</a></div>
<div id="loadingOverlay" class="loading-overlay"></div>
<div class="alert alert-info">Showing dentists</div>
<div class="row"><div class="card">Dr. Alam</div><div class="card">Dr. Bose</div></div>
<nav aria-label="pages"><ul class="pagination"><li><a href="?category=dentist&amp;page=2">2</a></li><li><a href="?category=dentist&amp;page=3">3</a></li></ul></nav>
</body></html>"#;

/// Same page, filtered down to a single page of results.
pub const SINGLE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Doctors</title></head><body>
<div class="search-box"><form action="/doctors/" method="get"><input type="text" name="search" value=""></form></div>
<div class="category-filter"><a class="btn" href="/doctors/">All</a><a class="btn active" href="/doctors/?category=dentist">Dentist</a></div>
<div id="loadingOverlay"></div>
<div class="row"><div class="card">Dr. Alam</div></div>
</body></html>"#;

#[derive(Clone)]
pub struct Route {
    pub delay: Duration,
    pub response: Result<Vec<u8>, FetchError>,
}

/// Serves canned bodies keyed by path and query, after a per-route delay.
#[derive(Default)]
pub struct FakeFetcher {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, path_and_query: &str, delay_ms: u64, body: &str) -> Self {
        self.raw_route(path_and_query, delay_ms, body.as_bytes())
    }

    /// Like `route`, for bodies that are not valid UTF-8.
    pub fn raw_route(self, path_and_query: &str, delay_ms: u64, body: &[u8]) -> Self {
        self.routes.lock().unwrap().insert(
            path_and_query.to_string(),
            Route {
                delay: Duration::from_millis(delay_ms),
                response: Ok(body.to_vec()),
            },
        );
        self
    }

    pub fn failing_route(self, path_and_query: &str, delay_ms: u64, kind: FailureKind) -> Self {
        self.routes.lock().unwrap().insert(
            path_and_query.to_string(),
            Route {
                delay: Duration::from_millis(delay_ms),
                response: Err(FetchError {
                    kind,
                    message: "injected failure".to_string(),
                }),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, location: &NavigableLocation) -> Result<FetchOutput, FetchError> {
        let key = location.path_and_query();
        self.requests.lock().unwrap().push(key.clone());
        let route = self.routes.lock().unwrap().get(&key).cloned();
        let Some(route) = route else {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: format!("no route for {key}"),
            });
        };
        tokio::time::sleep(route.delay).await;
        let body = route.response?;
        Ok(FetchOutput {
            metadata: FetchMetadata {
                requested_url: location.to_string(),
                final_url: location.to_string(),
                status: 200,
                redirect_count: 0,
                content_type: Some("text/html; charset=utf-8".to_string()),
                byte_len: body.len() as u64,
            },
            body,
        })
    }
}

pub struct Harness {
    pub engine: SyncEngine,
    pub fetcher: Arc<FakeFetcher>,
    pub history: Rc<MemoryHistory>,
    pub viewport: Rc<RecordingViewport>,
}

impl Harness {
    pub fn new(page: &str, path_and_query: &str, fetcher: FakeFetcher) -> Self {
        Self::with_config(&SyncConfig::default(), page, path_and_query, fetcher)
    }

    pub fn with_config(
        config: &SyncConfig,
        page: &str,
        path_and_query: &str,
        fetcher: FakeFetcher,
    ) -> Self {
        init_logging();
        let location = loc(path_and_query);
        let fetcher = Arc::new(fetcher);
        let history = Rc::new(MemoryHistory::new(&location));
        let viewport = Rc::new(RecordingViewport::default());
        let engine = SyncEngine::new(
            config,
            LiveDocument::parse(page),
            location,
            EnginePorts {
                fetcher: fetcher.clone(),
                history: history.clone(),
                viewport: viewport.clone(),
            },
        )
        .unwrap();
        Self {
            engine,
            fetcher,
            history,
            viewport,
        }
    }

    pub fn content_html(&self) -> String {
        let selectors = SyncConfig::default().selectors.compile().unwrap();
        self.engine
            .with_document(|document| document.inner_html_of(&selectors.content))
            .unwrap_or_default()
    }

    pub fn has(&self, selector: &str) -> bool {
        let selector = scraper::Selector::parse(selector).unwrap();
        self.engine
            .with_document(|document| document.select_first(&selector).is_some())
    }

    pub fn text(&self, selector: &str) -> Option<String> {
        let selector = scraper::Selector::parse(selector).unwrap();
        self.engine.with_document(|document| {
            document
                .select_first(&selector)
                .and_then(|node| document.text_of(node))
        })
    }
}
