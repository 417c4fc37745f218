//! Configuration Module
//!
//! Loads the optional JSON config file and merges the command line arguments
//! of `get` into it, producing the (source, isins) plan of a run.
//!
//! ## Responsibilities
//! - **Loading**: `$HOME/.quote.json` by default, or the file given with `-c`.
//! - **Merging**: Arguments win over the file; passed isins and sources
//!   replace the configured ones.
//! - **Validation**: Unknown sources, isins without sources, non-positive
//!   workers and invalid proxies are rejected before any request is made.
//!
//! ## Submodules
//! - **`types`**: File layout, resolved config and arguments.
//! - **`resolve`**: Loading, merging and validation.
//! - **`error`**: `ConfigError`.

pub mod error;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use resolve::{default_path, parse_arg_source};
pub use types::{Config, ConfigFile, GetArgs, IsinItem, ProxyItem, SourceItem, DEFAULT_WORKERS};

#[cfg(test)]
mod tests;
