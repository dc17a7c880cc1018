//! Shared error model and configuration for distill.
//!
//! This crate is the foundation depended on by all other distill crates.
//! It provides:
//! - [`DistillError`] and [`FetchError`]: the unified error types
//! - Configuration ([`AppConfig`], runtime config values, config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ClassificationConfig, ClassificationSection, CleaningConfig, CleaningSection,
    DefaultsConfig, FetchConfig, FetchSection, config_dir, config_file_path, expand_home,
    init_config, load_config, load_config_from,
};
pub use error::{DistillError, FetchError, Result};
