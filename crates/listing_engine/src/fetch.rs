use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use futures_util::StreamExt;
use listing_core::NavigableLocation;
use reqwest::header::CONTENT_TYPE;
use sync_logging::sync_debug;

use crate::{FailureKind, FetchError, FetchMetadata, FetchOutput};

/// Header telling the origin that the request comes from the page itself and
/// a partial render is acceptable.
pub const FRAGMENT_HEADER: &str = "X-Requested-With";
pub const FRAGMENT_HEADER_VALUE: &str = "XMLHttpRequest";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    pub fragment_header: (String, String),
    /// Treat non-2xx statuses and non-HTML content types as failures.
    /// Off by default: like the page script, any answer gets patched in.
    pub strict: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
            fragment_header: (
                FRAGMENT_HEADER.to_string(),
                FRAGMENT_HEADER_VALUE.to_string(),
            ),
            strict: false,
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, location: &NavigableLocation) -> Result<FetchOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self, redirect_counter: Arc<AtomicUsize>) -> Result<reqwest::Client, FetchError> {
        let redirect_limit = self.settings.redirect_limit;
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            let count = attempt.previous().len();
            redirect_counter.store(count, Ordering::Relaxed);
            if count >= redirect_limit {
                attempt.error("redirect limit exceeded")
            } else {
                attempt.follow()
            }
        });

        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(policy)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    /// Rejects responses before reading the body. The size cap always
    /// applies; status and content type only in strict mode.
    fn screen(&self, response: &reqwest::Response) -> Result<Option<String>, FetchError> {
        let status = response.status();
        if self.settings.strict && !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(declared) = response.content_length() {
            if declared > self.settings.max_bytes {
                return Err(self.too_large(declared));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        match content_type.as_deref() {
            Some(declared) if self.settings.strict && !self.accepts(declared) => {
                Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: declared.to_string(),
                    },
                    "listing responses must be html",
                ))
            }
            _ => Ok(content_type),
        }
    }

    fn accepts(&self, content_type: &str) -> bool {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(essence))
    }

    /// Reads the body, giving up as soon as it grows past the cap.
    async fn read_capped(&self, response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();
        let mut chunks = response.bytes_stream();
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let grown = (body.len() + chunk.len()) as u64;
            if grown > self.settings.max_bytes {
                return Err(self.too_large(grown));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }

    fn too_large(&self, actual: u64) -> FetchError {
        FetchError::new(
            FailureKind::TooLarge {
                max_bytes: self.settings.max_bytes,
                actual: Some(actual),
            },
            "response too large",
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, location: &NavigableLocation) -> Result<FetchOutput, FetchError> {
        let url = location.url().clone();
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {}", url.scheme()),
            ));
        }
        let redirects = Arc::new(AtomicUsize::new(0));
        let client = self.build_client(Arc::clone(&redirects))?;
        let (header_name, header_value) = &self.settings.fragment_header;

        let response = client
            .get(url)
            .header(header_name.as_str(), header_value.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = self.screen(&response)?;
        let body = self.read_capped(response).await?;

        let redirect_count = redirects.load(Ordering::Relaxed);
        sync_debug!(
            "{} answered {} with {} bytes after {} redirects",
            final_url,
            status,
            body.len(),
            redirect_count
        );
        Ok(FetchOutput {
            metadata: FetchMetadata {
                requested_url: location.to_string(),
                final_url,
                status,
                redirect_count,
                content_type,
                byte_len: body.len() as u64,
            },
            body,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
