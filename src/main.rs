use clap::Parser;
use quote_scraper::cli::{self, Cli, Commands};
use quote_scraper::quote::SourceRegistry;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = SourceRegistry::builtin();

    let result = match cli.command {
        Commands::Get(args) => cli::get::execute(args, &registry).await,
        Commands::Sources => {
            cli::sources::execute(&registry);
            Ok(())
        }
        Commands::Tor(args) => cli::tor::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
