//! propref - resolve property cross-references from the command line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use quarto_propref::{PropRefOptions, PropRefParser, PropRefSettings, PropValue, UpLevelMode};
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "propref")]
#[command(version)]
#[command(about = "Resolve @{ key } references inside a JSON, YAML or TOML file", long_about = None)]
struct Cli {
    /// JSON, YAML or TOML file (format from extension)
    input: PathBuf,

    /// Resolve only this key instead of the whole tree
    #[arg(short = 'k', long)]
    key: Option<String>,

    /// Implicit root prefix for relative keys
    #[arg(long)]
    key_base: Option<String>,

    /// Path separator
    #[arg(long)]
    separator: Option<String>,

    /// Up-level token
    #[arg(long = "up-level")]
    up_level: Option<String>,

    /// How up-level tokens count levels
    #[arg(long, value_enum)]
    up_level_mode: Option<UpLevelArg>,

    /// TOML, JSON or YAML file with resolver settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Always splice references as text
    #[arg(long)]
    no_preserve_types: bool,

    /// Compact JSON output
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum UpLevelArg {
    Sibling,
    Parent,
}

impl From<UpLevelArg> for UpLevelMode {
    fn from(arg: UpLevelArg) -> Self {
        match arg {
            UpLevelArg::Sibling => UpLevelMode::Sibling,
            UpLevelArg::Parent => UpLevelMode::Parent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            Some("toml") => Ok(Format::Toml),
            _ => bail!(
                "Cannot infer format of '{}' (expected .json, .yaml, .yml or .toml)",
                path.display()
            ),
        }
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = Format::from_path(path)?;
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    let parsed = match format {
        Format::Json => serde_json::from_str(&source).map_err(anyhow::Error::from),
        Format::Yaml => serde_yaml::from_str(&source).map_err(anyhow::Error::from),
        Format::Toml => toml::from_str(&source).map_err(anyhow::Error::from),
    };
    parsed.with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn build_options(cli: &Cli) -> Result<PropRefOptions> {
    let mut options = PropRefOptions::default();

    if let Some(path) = &cli.settings {
        let settings: PropRefSettings = read_file(path)?;
        tracing::debug!(?settings, "Loaded resolver settings");
        options = options.merge_settings(settings);
    }

    // Command-line flags override the settings file.
    if let Some(key_base) = &cli.key_base {
        options = options.with_key_base(key_base.as_str());
    }
    if let Some(separator) = &cli.separator {
        options = options.with_separator(separator.as_str());
    }
    if let Some(token) = &cli.up_level {
        options = options.with_up_level_token(token.as_str());
    }
    if let Some(mode) = cli.up_level_mode {
        options = options.with_up_level_mode(mode.into());
    }
    if cli.no_preserve_types {
        options = options.with_preserve_data_type(false);
    }

    Ok(options)
}

fn run(cli: &Cli) -> Result<String> {
    let tree: PropValue = read_file(&cli.input)?;
    let options = build_options(cli)?;
    let parser = PropRefParser::new(tree, options).context("Invalid resolver options")?;

    let resolved = match &cli.key {
        Some(key) => parser
            .get(key)
            .with_context(|| format!("Failed to resolve key '{}'", key))?,
        None => parser
            .parse()
            .with_context(|| format!("Failed to resolve '{}'", cli.input.display()))?,
    };
    tracing::info!(input = %cli.input.display(), "Resolved property references");

    let output = if cli.compact {
        serde_json::to_string(&resolved)?
    } else {
        serde_json::to_string_pretty(&resolved)?
    };
    Ok(output)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "propref=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = run(&cli)?;
    println!("{}", output);
    Ok(())
}
