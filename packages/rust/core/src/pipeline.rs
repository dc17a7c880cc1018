//! End-to-end pipeline: address → path → fetch → extract → write.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

use distill_extract::Extractor;
use distill_fetch::{Fetcher, url_to_path, write_text};
use distill_shared::{DistillError, Result};

/// What to do with extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Write to the mapped path.
    #[default]
    Write,
    /// Keep the text in the result only (e.g. for printing to stdout).
    Collect,
}

/// Configuration for `process_url` / `process_urls`.
#[derive(Debug, Clone, Default)]
pub struct ProcessConfig {
    /// Root directory the mapped paths are joined onto. `None` = relative.
    pub root: Option<PathBuf>,
    pub mode: OutputMode,
}

/// How a successfully processed address ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Text was written to `path`.
    Written,
    /// Text was extracted but not written (`OutputMode::Collect`).
    Collected,
    /// Nothing was retained; no file was written.
    Empty,
}

/// Result of processing one address.
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub url: String,
    /// Mapped output path; `None` in `OutputMode::Collect`.
    pub path: Option<PathBuf>,
    pub text: String,
    pub outcome: Outcome,
}

/// An address that could not be processed.
#[derive(Debug)]
pub struct Failure {
    pub url: String,
    pub error: DistillError,
}

/// Result of `process_urls`.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Successful results, in input order.
    pub results: Vec<ProcessResult>,
    /// Failed addresses, in input order.
    pub failures: Vec<Failure>,
    pub elapsed: Duration,
}

impl BatchResult {
    /// Number of addresses whose text was written.
    pub fn written(&self) -> usize {
        self.count(Outcome::Written)
    }

    /// Number of addresses that produced no text.
    pub fn empty(&self) -> usize {
        self.count(Outcome::Empty)
    }

    fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called once before any address is processed.
    fn started(&self, total: usize);
    /// Called as each address finishes, successfully or not.
    fn document_done(&self, url: &str, current: usize, total: usize);
    /// Called when the batch completes.
    fn done(&self, result: &BatchResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _total: usize) {}
    fn document_done(&self, _url: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BatchResult) {}
}

/// Process a single address.
///
/// 1. Parse the address and, in `Write` mode, map it to its output path
///    (both fail before any network access)
/// 2. Fetch the document
/// 3. Extract the main text
/// 4. Write it, unless it is empty or the mode is `Collect`
#[instrument(skip_all, fields(url = %address))]
pub async fn process_url<F: Fetcher>(
    address: &str,
    fetcher: &F,
    extractor: &Extractor,
    config: &ProcessConfig,
) -> Result<ProcessResult> {
    let url = Url::parse(address.trim())
        .map_err(|e| DistillError::parse(format!("invalid URL '{address}': {e}")))?;
    let path = match config.mode {
        OutputMode::Write => Some(url_to_path(&url, config.root.as_deref())?),
        OutputMode::Collect => None,
    };

    let fetched = fetcher.fetch(&url).await?;
    debug!(bytes = fetched.body.len(), "extracting");

    let text = extractor.extract_bytes(&fetched.body, fetched.charset.as_deref());

    let outcome = match &path {
        _ if text.is_empty() => {
            info!("no content retained, nothing written");
            Outcome::Empty
        }
        Some(path) => {
            write_text(path, &text)?;
            Outcome::Written
        }
        None => Outcome::Collected,
    };

    Ok(ProcessResult {
        url: url.to_string(),
        path,
        text,
        outcome,
    })
}

/// Process a batch of addresses with at most `concurrency` in flight.
///
/// Failures do not stop the batch; they are logged and collected.
#[instrument(skip_all, fields(count = addresses.len(), concurrency = concurrency))]
pub async fn process_urls<F>(
    addresses: &[String],
    fetcher: F,
    extractor: Arc<Extractor>,
    config: &ProcessConfig,
    concurrency: usize,
    progress: &dyn ProgressReporter,
) -> BatchResult
where
    F: Fetcher + 'static,
{
    let start = Instant::now();
    let total = addresses.len();
    progress.started(total);

    let fetcher = Arc::new(fetcher);
    let config = Arc::new(config.clone());
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let handles: Vec<_> = addresses
        .iter()
        .map(|address| {
            let address = address.clone();
            let fetcher = fetcher.clone();
            let extractor = extractor.clone();
            let config = config.clone();
            let sem = semaphore.clone();

            tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                process_url(&address, fetcher.as_ref(), &extractor, &config).await
            })
        })
        .collect();

    let mut result = BatchResult::default();

    for (i, (address, handle)) in addresses.iter().zip(handles).enumerate() {
        match handle.await {
            Ok(Ok(processed)) => result.results.push(processed),
            Ok(Err(error)) => {
                warn!(url = %address, %error, "failed to process address");
                result.failures.push(Failure {
                    url: address.clone(),
                    error,
                });
            }
            Err(e) => {
                warn!(url = %address, error = %e, "processing task failed");
                result.failures.push(Failure {
                    url: address.clone(),
                    error: DistillError::task(e.to_string()),
                });
            }
        }
        progress.document_done(address, i + 1, total);
    }

    result.elapsed = start.elapsed();
    progress.done(&result);

    info!(
        written = result.written(),
        empty = result.empty(),
        failed = result.failures.len(),
        elapsed_ms = result.elapsed.as_millis(),
        "batch complete"
    );

    result
}
