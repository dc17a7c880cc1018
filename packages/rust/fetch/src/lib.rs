//! Collaborators around the extraction core: fetching documents over HTTP,
//! mapping addresses to output paths, and writing text to disk.
//!
//! This crate provides:
//! - [`Fetcher`] / [`HttpFetcher`]: retrieve a document or a typed [`FetchError`]
//! - [`url_to_path`]: derive a storage path from an address
//! - [`write_text`]: persist text, creating missing directories

pub mod fetcher;
pub mod path;
pub mod writer;

pub use distill_shared::FetchError;
pub use fetcher::{Fetched, Fetcher, HttpFetcher, charset_from_content_type};
pub use path::url_to_path;
pub use writer::write_text;
