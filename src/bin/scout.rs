//! `scout` command-line tool.
//!
//! ```text
//! echo '{"company": "Root", "job_title": "AI Engineer", "domain": "root.io"}' | scout search
//! scout init-config
//! ```
//!
//! Reports go to stdout as JSON; logs go to stderr.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use scout::ScoutConfig;

#[derive(Debug, Parser)]
#[command(version, about = "Find people to reach out to at a target company")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one search and print the report as JSON.
    Search {
        /// Configuration file. Defaults to ~/.config/scout/config.toml.
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
        /// Search context JSON. Reads stdin when omitted.
        #[arg(long, short = 'i', value_name = "FILE")]
        input: Option<PathBuf>,
        /// Emit compact JSON on one line.
        #[arg(long)]
        compact: bool,
    },
    /// Write the default configuration file.
    InitConfig {
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the report only.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scout=info,scout_search=info")),
        )
        .init();

    match Args::parse().command {
        Command::Search {
            config,
            input,
            compact,
        } => search(config, input, compact).await,
        Command::InitConfig { config, force } => init_config(config, force),
    }
}

async fn search(config: Option<PathBuf>, input: Option<PathBuf>, compact: bool) -> anyhow::Result<()> {
    let config_path = config.unwrap_or_else(ScoutConfig::default_config_path);
    let config = ScoutConfig::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let raw = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading search context from stdin")?;
            buf
        }
    };

    let report = scout::run_search(&config, &raw).await?;
    tracing::info!(
        people = report.people.len(),
        terminal = ?report.diagnostics.terminal_state,
        elapsed_ms = report.diagnostics.elapsed_ms,
        "search finished"
    );

    let json = if compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{json}");
    Ok(())
}

fn init_config(config: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = config.unwrap_or_else(ScoutConfig::default_config_path);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    ScoutConfig::default().save_to_file(&path)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
