//! Pipeline orchestration for distill.
//!
//! Ties fetching, extraction, path mapping and writing together into
//! per-address and batch workflows (e.g., `process_url`, `process_urls`).

pub mod pipeline;

pub use pipeline::{
    BatchResult, Failure, Outcome, OutputMode, ProcessConfig, ProcessResult, ProgressReporter,
    SilentProgress, process_url, process_urls,
};
