//! Application configuration for distill.
//!
//! User config lives at `~/.distill/distill.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DistillError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "distill.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".distill";

// ---------------------------------------------------------------------------
// Config structs (matching distill.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP fetching.
    #[serde(default)]
    pub fetch: FetchSection,

    /// Markup cleaning and paragraph boundaries.
    #[serde(default)]
    pub cleaning: CleaningSection,

    /// Paragraph classification thresholds.
    #[serde(default)]
    pub classification: ClassificationSection,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Encoding used when the server does not announce one.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Root directory for output files when `--main-dir` is given.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Maximum width of a formatted output line, in characters.
    #[serde(default = "default_max_line_width")]
    pub max_line_width: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            output_dir: default_output_dir(),
            max_line_width: default_max_line_width(),
        }
    }
}

fn default_encoding() -> String {
    "utf-8".into()
}
fn default_output_dir() -> String {
    "~/distill-output".into()
}
fn default_max_line_width() -> usize {
    80
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSection {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum number of documents processed at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0".into()
}
fn default_concurrency() -> usize {
    4
}

/// `[cleaning]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningSection {
    /// Elements removed together with their whole subtree before traversal.
    #[serde(default = "default_kill_tags")]
    pub kill_tags: Vec<String>,

    /// Remove HTML comments.
    #[serde(default = "default_true")]
    pub remove_comments: bool,

    /// Remove elements hidden via `hidden`, `aria-hidden` or inline style.
    #[serde(default = "default_true")]
    pub remove_hidden: bool,

    /// Elements that start a new paragraph.
    #[serde(default = "default_block_tags")]
    pub block_tags: Vec<String>,
}

impl Default for CleaningSection {
    fn default() -> Self {
        Self {
            kill_tags: default_kill_tags(),
            remove_comments: true,
            remove_hidden: true,
            block_tags: default_block_tags(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_kill_tags() -> Vec<String> {
    [
        "head", "script", "style", "noscript", "template", "iframe", "frame", "frameset",
        "object", "embed", "applet", "svg", "canvas", "map", "audio", "video",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_block_tags() -> Vec<String> {
    [
        "body", "address", "article", "aside", "blockquote", "caption", "center", "col",
        "colgroup", "dd", "details", "div", "dl", "dt", "fieldset", "figcaption", "figure",
        "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "legend", "li",
        "main", "nav", "ol", "optgroup", "option", "p", "pre", "section", "summary", "table",
        "td", "textarea", "tfoot", "th", "thead", "tr", "ul",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// `[classification]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationSection {
    /// Built-in stoplist language (e.g. `English`).
    #[serde(default = "default_language")]
    pub language: String,

    /// Load the stoplist from this file instead of the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoplist_file: Option<String>,

    #[serde(default = "default_length_low")]
    pub length_low: usize,

    #[serde(default = "default_length_high")]
    pub length_high: usize,

    #[serde(default = "default_stopwords_low")]
    pub stopwords_low: f64,

    #[serde(default = "default_stopwords_high")]
    pub stopwords_high: f64,

    #[serde(default = "default_max_link_density")]
    pub max_link_density: f64,

    /// Treat headings as short paragraphs regardless of their content.
    #[serde(default)]
    pub no_headings: bool,

    /// Maximum distance, in paragraphs, between a kept heading and content.
    #[serde(default = "default_max_heading_distance")]
    pub max_heading_distance: usize,
}

impl Default for ClassificationSection {
    fn default() -> Self {
        Self {
            language: default_language(),
            stoplist_file: None,
            length_low: default_length_low(),
            length_high: default_length_high(),
            stopwords_low: default_stopwords_low(),
            stopwords_high: default_stopwords_high(),
            max_link_density: default_max_link_density(),
            no_headings: false,
            max_heading_distance: default_max_heading_distance(),
        }
    }
}

fn default_language() -> String {
    "English".into()
}
fn default_length_low() -> usize {
    70
}
fn default_length_high() -> usize {
    200
}
fn default_stopwords_low() -> f64 {
    0.30
}
fn default_stopwords_high() -> f64 {
    0.32
}
fn default_max_link_density() -> f64 {
    0.2
}
fn default_max_heading_distance() -> usize {
    5
}

impl AppConfig {
    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        let c = &self.classification;

        for (name, value) in [
            ("stopwords_low", c.stopwords_low),
            ("stopwords_high", c.stopwords_high),
            ("max_link_density", c.max_link_density),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DistillError::config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if c.stopwords_low > c.stopwords_high {
            return Err(DistillError::config(
                "stopwords_low must not exceed stopwords_high",
            ));
        }
        if c.length_low > c.length_high {
            return Err(DistillError::config(
                "length_low must not exceed length_high",
            ));
        }
        if self.defaults.max_line_width == 0 {
            return Err(DistillError::config("max_line_width must be positive"));
        }
        if self.fetch.concurrency == 0 {
            return Err(DistillError::config("concurrency must be positive"));
        }
        if encoding_rs::Encoding::for_label(self.defaults.encoding.as_bytes()).is_none() {
            return Err(DistillError::config(format!(
                "unknown encoding '{}'",
                self.defaults.encoding
            )));
        }

        Ok(())
    }

    /// Output root for `--main-dir`, with a leading `~` expanded.
    pub fn output_dir(&self) -> PathBuf {
        expand_home(&self.defaults.output_dir)
    }
}

// ---------------------------------------------------------------------------
// Runtime config values (built once from AppConfig, then only borrowed)
// ---------------------------------------------------------------------------

/// Thresholds for paragraph classification and output formatting.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationConfig {
    pub length_low: usize,
    pub length_high: usize,
    pub stopwords_low: f64,
    pub stopwords_high: f64,
    pub max_link_density: f64,
    pub no_headings: bool,
    pub max_heading_distance: usize,
    pub max_line_width: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ClassificationConfig {
    fn from(config: &AppConfig) -> Self {
        let c = &config.classification;
        Self {
            length_low: c.length_low,
            length_high: c.length_high,
            stopwords_low: c.stopwords_low,
            stopwords_high: c.stopwords_high,
            max_link_density: c.max_link_density,
            no_headings: c.no_headings,
            max_heading_distance: c.max_heading_distance,
            max_line_width: config.defaults.max_line_width,
        }
    }
}

/// Markup cleaning rules and paragraph boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct CleaningConfig {
    /// Fallback encoding label for byte input.
    pub encoding: String,
    pub kill_tags: Vec<String>,
    pub remove_comments: bool,
    pub remove_hidden: bool,
    pub block_tags: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for CleaningConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            encoding: config.defaults.encoding.clone(),
            kill_tags: lowercase_all(&config.cleaning.kill_tags),
            remove_comments: config.cleaning.remove_comments,
            remove_hidden: config.cleaning.remove_hidden,
            block_tags: lowercase_all(&config.cleaning.block_tags),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.fetch.timeout_secs,
            user_agent: config.fetch.user_agent.clone(),
            concurrency: config.fetch.concurrency,
        }
    }
}

fn lowercase_all(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| t.trim().to_ascii_lowercase()).collect()
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ if path == "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.distill/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DistillError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.distill/distill.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DistillError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        DistillError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;

    tracing::debug!(?path, "loaded config file");
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DistillError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DistillError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DistillError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_link_density"));
        assert!(toml_str.contains("English"));
        assert!(!toml_str.contains("stoplist_file"));
    }

    #[test]
    fn default_config_is_valid() {
        AppConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let toml_str = r#"
[classification]
language = "Russian"
length_low = 50

[defaults]
max_line_width = 100
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.classification.language, "Russian");
        assert_eq!(config.classification.length_low, 50);
        assert_eq!(config.classification.length_high, 200);
        assert_eq!(config.defaults.encoding, "utf-8");
        assert!(config.cleaning.block_tags.iter().any(|t| t == "p"));

        let classification = ClassificationConfig::from(&config);
        assert_eq!(classification.max_line_width, 100);
        assert_eq!(classification.length_low, 50);
    }

    #[test]
    fn rejects_inverted_stopword_thresholds() {
        let mut config = AppConfig::default();
        config.classification.stopwords_low = 0.5;
        config.classification.stopwords_high = 0.4;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("stopwords_low"));
    }

    #[test]
    fn rejects_density_out_of_range() {
        let mut config = AppConfig::default();
        config.classification.max_link_density = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unknown_encoding() {
        let mut config = AppConfig::default();
        config.defaults.encoding = "not-a-charset".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not-a-charset"));

        config.defaults.encoding = "windows-1251".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn cleaning_config_lowercases_tags() {
        let mut config = AppConfig::default();
        config.cleaning.kill_tags = vec!["SCRIPT".into(), " Style ".into()];
        let cleaning = CleaningConfig::from(&config);
        assert_eq!(cleaning.kill_tags, vec!["script", "style"]);
    }

    #[test]
    fn load_config_from_invalid_file_fails() {
        let dir = std::env::temp_dir().join(format!("distill-config-{}", Uuid::now_v7()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join("bad.toml");
        std::fs::write(&path, "[defaults]\nmax_line_width = 0\n").expect("write");

        let result = load_config_from(&path);
        assert!(result.is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(expand_home("relative/dir"), PathBuf::from("relative/dir"));
    }
}
