//! Source Registry
//!
//! Maps source names (e.g., "fondidocit") to constructors of their
//! `QuoteGetter`. A getter is built per run because each source may use its
//! own HTTP client (and therefore its own proxy).

use super::getter::QuoteGetter;
use super::scraper::ScraperGetter;
use super::sources::{Cryptonatorcom, Fondidocit};

use dashmap::DashMap;
use std::sync::Arc;

/// Builds the getter of a source from its name and HTTP client.
pub type GetterCtor = Arc<dyn Fn(&str, reqwest::Client) -> Arc<dyn QuoteGetter> + Send + Sync>;

/// Currency the cryptocurrency prices are quoted in.
pub const CRYPTO_CURRENCY: &str = "EUR";

pub struct SourceRegistry {
    ctors: DashMap<String, GetterCtor>,
}

impl SourceRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self { ctors: DashMap::new() }
    }

    /// Registry of every source shipped with the crate.
    pub fn builtin() -> Self {
        let registry = Self::new();
        registry.register("fondidocit", |name, client| {
            Arc::new(ScraperGetter::new(Fondidocit::new(name), client)) as Arc<dyn QuoteGetter>
        });
        registry.register("cryptonatorcom", |name, client| {
            Arc::new(Cryptonatorcom::new(name, client, CRYPTO_CURRENCY)) as Arc<dyn QuoteGetter>
        });
        registry
    }

    /// Registers `ctor` under `name`, replacing any previous constructor.
    pub fn register<F>(&self, name: &str, ctor: F)
    where
        F: Fn(&str, reqwest::Client) -> Arc<dyn QuoteGetter> + Send + Sync + 'static,
    {
        self.ctors.insert(name.to_string(), Arc::new(ctor));
        tracing::debug!("Registered quote source: {}", name);
    }

    /// Sorted names of the registered sources.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ctors.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ctors.contains_key(name)
    }

    /// Builds the getter of `name`, or `None` when the source is unknown.
    pub fn build(&self, name: &str, client: reqwest::Client) -> Option<Arc<dyn QuoteGetter>> {
        let ctor = self.ctors.get(name)?.value().clone();
        Some(ctor(name, client))
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
