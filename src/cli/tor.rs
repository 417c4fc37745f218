//! `quote tor`: checks the proxy configured for the quote requests.

use crate::config::{Config, GetArgs};
use crate::quote::http::{build_client, DEFAULT_TIMEOUT};
use crate::quote::tor::tor_check;

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TorCommand {
    /// Config file (default is $HOME/.quote.json).
    #[arg(short, long, env = "QUOTE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Proxy URL or name of a configured proxy to test.
    #[arg(short, long)]
    pub proxy: Option<String>,
}

/// The proxy `get` would use by default: the argument, else the config
/// file's, resolved through the named proxies.
pub fn resolve_proxy(args: &TorCommand) -> Result<(String, Option<PathBuf>)> {
    let (mut config, path) = Config::load(args.config.as_deref())?;
    config.merge_args(&GetArgs {
        proxy: args.proxy.clone(),
        ..Default::default()
    })?;
    Ok((config.proxy, path))
}

pub async fn execute(args: TorCommand) -> Result<()> {
    let (proxy, path) = resolve_proxy(&args)?;

    match &path {
        Some(p) => println!("Using configuration file {:?}", p.display().to_string()),
        None => println!("Using no configuration file"),
    }
    println!("Checking Tor connection with proxy {:?}", proxy);

    let client = build_client(Some(&proxy), DEFAULT_TIMEOUT)?;
    let status = tor_check(&client).await?;
    println!("{}", status.message);

    Ok(())
}
