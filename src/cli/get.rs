//! `quote get`: resolves the run plan and retrieves the quotes.

use crate::config::{Config, GetArgs};
use crate::quote::http::{build_client, DEFAULT_TIMEOUT};
use crate::quote::tor::tor_check;
use crate::quote::{get_quotes, GetRequest, SourceIsins, SourceRegistry};
use crate::storage::{persist, JsonLinesStore};
use crate::taskengine::Mode;

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone, Args)]
pub struct GetCommand {
    /// Config file (default is $HOME/.quote.json).
    #[arg(short, long, env = "QUOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Isins to get the quotes of.
    #[arg(short, long, value_delimiter = ',')]
    pub isins: Vec<String>,

    /// Sources to get the quotes from, optionally with their workers (e.g. `fondidocit/4`).
    #[arg(short, long, value_delimiter = ',')]
    pub sources: Vec<String>,

    /// Default number of workers of each source.
    #[arg(short, long)]
    pub workers: Option<i64>,

    /// Default proxy URL, or name of a configured proxy.
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// File the quotes are appended to, one JSON record per line.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Result mode: "1" first success or last error, "U" all errors until
    /// first success, "A" all.
    #[arg(short, long, default_value = "1")]
    pub mode: Mode,

    /// Show what would be retrieved without making any request.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Fail unless the requests go through the Tor network.
    #[arg(long)]
    pub tor: bool,

    /// Give up on the requests still pending after this many seconds; they
    /// are reported as timed out.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,
}

impl GetCommand {
    pub fn to_get_args(&self) -> GetArgs {
        GetArgs {
            database: self.database.clone(),
            workers: self.workers,
            proxy: self.proxy.clone(),
            sources: self.sources.clone(),
            isins: self.isins.clone(),
        }
    }
}

/// What a run would do, printed by `--dry-run`.
#[derive(Debug, Serialize)]
pub struct DryRun<'a> {
    pub mode: String,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub database: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    pub tor: bool,
    pub sources: &'a [SourceIsins],
}

/// Loads the config and merges the arguments into it.
pub fn plan(args: &GetCommand, registry: &SourceRegistry) -> Result<Config> {
    let (config, _) = Config::load(args.config.as_deref())?;
    Ok(config.resolve(&args.to_get_args(), &registry.names())?)
}

pub async fn execute(args: GetCommand, registry: &SourceRegistry) -> Result<()> {
    let config = plan(&args, registry)?;
    let sources = config.source_isins();

    if args.dry_run {
        let dry_run = DryRun {
            mode: args.mode.to_string(),
            database: &config.database,
            timeout: args.timeout,
            tor: args.tor,
            sources: &sources,
        };
        println!("{}", serde_json::to_string_pretty(&dry_run)?);
        return Ok(());
    }

    if sources.is_empty() {
        bail!("no isins to retrieve: pass them with --isins or list them in the config file");
    }

    if args.tor {
        let client = build_client(Some(&config.proxy), DEFAULT_TIMEOUT)?;
        let status = tor_check(&client).await?;
        if !status.using_tor {
            bail!("Tor network not available: {}", status.message);
        }
    }

    let token = CancellationToken::new();
    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling pending requests");
            interrupt.cancel();
        }
    });

    let request = GetRequest {
        sources,
        mode: args.mode,
        timeout: args.timeout.map(Duration::from_secs),
    };

    let run_id = Uuid::new_v4();
    tracing::info!("Starting run {}", run_id);

    let outcomes = get_quotes(registry, &request, &token).await?;

    if !config.database.is_empty() {
        let store = JsonLinesStore::new(&config.database);
        persist(&store, run_id, &outcomes);
    }

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
