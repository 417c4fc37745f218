//! Concurrent Multi-Source Quote Retriever Library
//!
//! Retrieves the prices of financial instruments, identified by ISIN, from
//! several public sources at once. Sources race on every ISIN and a
//! completion mode decides which of their answers are reported.
//!
//! ## Architecture Modules
//! The crate is composed of five loosely coupled subsystems:
//!
//! - **`taskengine`**: The generic concurrent dispatch engine. Runs tasks
//!   shared by several worker pools, orders each pool's tasks so every task
//!   starts early, and resolves each task with one of three completion modes.
//! - **`quote`**: The quote sources (HTML scrapers and JSON APIs), their
//!   registry, and the mapping of sources to workers and ISINs to tasks.
//! - **`storage`**: Persistence of the outcomes of a run as quote records.
//! - **`config`**: The JSON config file and its merge with the arguments.
//! - **`cli`**: The `quote` command line (`get`, `sources`, `tor`).

pub mod cli;
pub mod config;
pub mod quote;
pub mod storage;
pub mod taskengine;
