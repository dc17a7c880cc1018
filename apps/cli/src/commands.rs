//! CLI command definitions, routing, and tracing setup.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use distill_core::{
    BatchResult, Outcome, OutputMode, ProcessConfig, ProgressReporter, process_urls,
};
use distill_extract::{Extractor, available_languages};
use distill_fetch::HttpFetcher;
use distill_shared::{
    AppConfig, DistillError, FetchConfig, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// distill: keep the prose, drop the boilerplate.
#[derive(Parser)]
#[command(
    name = "distill",
    version,
    about = "Extract the main text of web pages, dropping navigation, ads and other boilerplate.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.distill/distill.toml.
    #[arg(long, env = "DISTILL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Stopword language (overrides the config file).
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Output line width (overrides the config file).
    #[arg(long, global = true)]
    pub width: Option<usize>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch pages and save their main text.
    Fetch {
        /// Page addresses (http or https).
        #[arg(required = true)]
        urls: Vec<String>,

        /// Write under the configured output_dir.
        #[arg(long)]
        main_dir: bool,

        /// Write under this directory (wins over --main-dir).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the text instead of writing files.
        #[arg(long)]
        stdout: bool,

        /// Maximum number of pages fetched at once.
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// Extract the main text of a local HTML file ("-" reads stdin).
    File {
        path: String,

        /// Encoding of the file (defaults to the configured encoding).
        #[arg(short, long)]
        encoding: Option<String>,

        /// Print the classified paragraphs as JSON instead of text.
        #[arg(long)]
        paragraphs: bool,
    },

    /// List the built-in stopword languages.
    Languages,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout is
/// reserved for extracted text.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "distill=info",
        1 => "distill=debug",
        _ => "distill=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fetch {
            ref urls,
            main_dir,
            ref out,
            stdout,
            concurrency,
        } => {
            let mut config = resolve_config(&cli)?;
            if let Some(n) = concurrency {
                config.fetch.concurrency = n;
                config.validate()?;
            }
            cmd_fetch(&config, urls, main_dir, out.as_deref(), stdout).await
        }
        Command::File {
            ref path,
            ref encoding,
            paragraphs,
        } => {
            let mut config = resolve_config(&cli)?;
            if let Some(label) = encoding {
                config.defaults.encoding = label.clone();
                config.validate()?;
            }
            cmd_file(&config, path, paragraphs)
        }
        Command::Languages => cmd_languages(),
        Command::Config { ref action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&resolve_config(&cli)?),
        },
    }
}

/// Load the config file (or defaults) and apply per-run overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    if let Some(language) = &cli.language {
        config.classification.language = language.clone();
        config.classification.stoplist_file = None;
    }
    if let Some(width) = cli.width {
        config.defaults.max_line_width = width;
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_fetch(
    config: &AppConfig,
    urls: &[String],
    main_dir: bool,
    out: Option<&Path>,
    stdout: bool,
) -> Result<()> {
    let root = match (out, main_dir) {
        (Some(dir), _) => Some(dir.to_path_buf()),
        (None, true) => Some(config.output_dir()),
        (None, false) => None,
    };

    let process_config = ProcessConfig {
        root,
        mode: if stdout {
            OutputMode::Collect
        } else {
            OutputMode::Write
        },
    };

    // Stoplist problems surface here, before any request is made.
    let extractor = Arc::new(Extractor::from_app_config(config)?);
    let fetch_config = FetchConfig::from(config);
    let fetcher = HttpFetcher::new(&fetch_config)?;

    info!(
        count = urls.len(),
        language = %config.classification.language,
        "fetching pages"
    );

    let reporter = CliProgress::new();
    let batch = process_urls(
        urls,
        fetcher,
        extractor,
        &process_config,
        fetch_config.concurrency,
        &reporter,
    )
    .await;

    if stdout {
        let texts: Vec<&str> = batch
            .results
            .iter()
            .map(|r| r.text.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        println!("{}", texts.join("\n\n"));
    } else {
        for result in &batch.results {
            if let (Outcome::Written, Some(path)) = (result.outcome, &result.path) {
                println!("  {} -> {}", result.url, path.display());
            }
        }
        println!();
        println!("  Written: {}", batch.written());
        println!("  Empty:   {}", batch.empty());
        println!("  Failed:  {}", batch.failures.len());
        println!("  Time:    {:.1}s", batch.elapsed.as_secs_f64());
    }

    if batch.results.is_empty() && !batch.failures.is_empty() {
        return Err(eyre!("all {} address(es) failed", batch.failures.len()));
    }

    Ok(())
}

fn cmd_file(config: &AppConfig, path: &str, paragraphs: bool) -> Result<()> {
    let bytes = read_input(path)?;
    let extractor = Extractor::from_app_config(config)?;

    if paragraphs {
        let html = extractor.decode(&bytes, None);
        let paragraphs = extractor.paragraphs(&html);
        println!("{}", serde_json::to_string_pretty(&paragraphs)?);
        return Ok(());
    }

    let text = extractor.extract_bytes(&bytes, None);
    if text.is_empty() {
        warn!(path, "no content retained");
    } else {
        println!("{text}");
    }

    Ok(())
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &str) -> Result<Vec<u8>> {
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| DistillError::io("<stdin>", e))?;
        return Ok(buf);
    }

    Ok(std::fs::read(path).map_err(|e| DistillError::io(path, e))?)
}

fn cmd_languages() -> Result<()> {
    for language in available_languages() {
        println!("{language}");
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner (drawn on stderr).
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, total: usize) {
        self.spinner.set_message(format!("Fetching {total} page(s)"));
    }

    fn document_done(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {url}"));
    }

    fn done(&self, _result: &BatchResult) {
        self.spinner.finish_and_clear();
    }
}
