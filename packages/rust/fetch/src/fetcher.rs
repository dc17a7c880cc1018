//! HTTP document fetching.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use distill_shared::{DistillError, FetchConfig, FetchError, Result};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// A retrieved document: raw body plus the charset the server announced.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Final URL after redirects.
    pub url: Url,
    pub body: Vec<u8>,
    /// `charset` parameter of the `Content-Type` header, if any.
    pub charset: Option<String>,
}

/// Retrieves raw documents. Implementations report failures as a closed
/// [`FetchError`] instead of logging them.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = std::result::Result<Fetched, FetchError>> + Send;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and User-Agent.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DistillError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> std::result::Result<Fetched, FetchError> {
        debug!("fetching document");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Other {
                url: url.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let final_url = response.url().clone();
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, &e))?;

        debug!(bytes = body.len(), charset = ?charset, "document fetched");

        Ok(Fetched {
            url: final_url,
            body: body.to_vec(),
            charset,
        })
    }
}

/// Map a transport error onto the closed failure kinds.
fn classify_error(url: &Url, err: &reqwest::Error) -> FetchError {
    let url = url.to_string();
    if err.is_timeout() {
        FetchError::Timeout { url }
    } else if err.is_connect() {
        FetchError::ConnectionFailure { url }
    } else {
        FetchError::Other {
            url,
            message: err.to_string(),
        }
    }
}

/// Extract the `charset` parameter from a `Content-Type` value.
pub fn charset_from_content_type(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (key, val) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let val = val.trim().trim_matches('"').trim();
        (!val.is_empty()).then(|| val.to_string())
    })
}
