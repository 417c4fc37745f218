//! Quote Storage Module
//!
//! Persists the outcomes of retrieval runs so that the price history of every
//! (isin, source) pair can be inspected later.
//!
//! ## Core Concepts
//! - **Records**: `QuoteRecord` holds either a price or the error of a source.
//!   Cancelled attempts are never recorded.
//! - **Sinks**: Anything implementing `QuoteSink` can receive the records of a run.
//! - **Best effort**: `persist` logs sink failures instead of failing the run.
//!
//! ## Submodules
//! - **`types`**: `QuoteRecord` and its conversion from outcomes.
//! - **`sink`**: The `QuoteSink` trait and `persist`.
//! - **`memory`**: `MemoryStore`, a concurrent in-memory store.
//! - **`file`**: `JsonLinesStore`, an append-only JSON-lines file.

pub mod file;
pub mod memory;
pub mod sink;
pub mod types;

pub use file::JsonLinesStore;
pub use memory::MemoryStore;
pub use sink::{persist, QuoteSink};
pub use types::QuoteRecord;

#[cfg(test)]
mod tests;
