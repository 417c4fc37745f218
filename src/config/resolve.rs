//! Config Resolution
//!
//! ## Pipeline
//! 1. **Load**: read the JSON file into maps keyed by proxy, source and isin.
//! 2. **Merge**: apply the command line arguments (`merge_args`).
//! 3. **Complete**: make every available source known (`add_all_sources`).
//! 4. **Check**: drop what is disabled, apply defaults, resolve proxy names
//!    and reject what cannot run (`check_and_simplify`).
//! 5. **Plan**: group the isins by source (`source_isins`).

use super::error::ConfigError;
use super::types::*;
use crate::quote::SourceIsins;
use crate::taskengine::MAX_INSTANCES;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

/// `$HOME/.quote.json`, when the home directory is known.
pub fn default_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE))
}

/// Splits a `-s` argument (`name`, `name/4`, `name:4`, `name#4`) into the
/// source name and its workers, zero when not given. A given worker count
/// must be positive.
pub fn parse_arg_source(source_workers: &str) -> Result<(String, i64), ConfigError> {
    let invalid = || ConfigError::InvalidArgSource(source_workers.to_string());

    let Some(idx) = source_workers.find(SOURCE_WORKERS_SEPARATORS) else {
        return Ok((source_workers.trim().to_string(), 0));
    };
    if idx == 0 || idx == source_workers.len() - 1 {
        return Err(invalid());
    }

    let source = source_workers[..idx].trim();
    let workers = source_workers[idx + 1..].trim().parse::<i64>().map_err(|_| invalid())?;
    if source.is_empty() || workers <= 0 {
        return Err(invalid());
    }
    Ok((source.to_string(), workers))
}

impl Config {
    /// Builds the config from the file layout, rejecting entries without key.
    pub fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let mut proxies = BTreeMap::new();
        for item in file.proxies {
            if item.proxy.is_empty() {
                return Err(ConfigError::MissingKey {
                    section: "proxies",
                    key: "proxy",
                });
            }
            proxies.insert(item.proxy, item.url);
        }

        let mut sources = BTreeMap::new();
        for item in file.sources {
            if item.source.is_empty() {
                return Err(ConfigError::MissingKey {
                    section: "sources",
                    key: "source",
                });
            }
            sources.insert(item.source.clone(), item);
        }

        let mut isins = BTreeMap::new();
        for item in file.isins {
            if item.isin.is_empty() {
                return Err(ConfigError::MissingKey {
                    section: "isins",
                    key: "isin",
                });
            }
            isins.insert(item.isin.clone(), item);
        }

        Ok(Self {
            database: file.database,
            workers: file.workers,
            proxy: file.proxy,
            proxies,
            sources,
            isins,
        })
    }

    /// Parses the JSON config; `path` only labels the errors.
    pub fn from_json(json: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_file(file)
    }

    /// Loads `path`, or the default file when it exists. Without any file
    /// the config is empty and everything comes from the arguments.
    pub fn load(path: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_path().filter(|p| p.is_file()) {
                Some(p) => p,
                None => {
                    tracing::debug!("No config file found, using arguments only");
                    return Ok((Self::default(), None));
                }
            },
        };

        let json = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_json(&json, &path)?;

        tracing::info!("Using configuration file {}", path.display());
        Ok((config, Some(path)))
    }

    /// Overrides the config values with the passed arguments.
    ///
    /// Passed isins are the only ones retrieved, even when disabled in the
    /// config. Passed sources are the only ones used, by every isin: the
    /// per-isin source lists of the config are replaced.
    pub fn merge_args(&mut self, args: &GetArgs) -> Result<(), ConfigError> {
        if let Some(workers) = args.workers {
            if workers <= 0 {
                return Err(ConfigError::WorkersNotPositive(workers));
            }
            self.workers = workers;
        }

        if let Some(proxy) = &args.proxy {
            self.proxy = proxy.clone();
        }
        if let Some(url) = self.proxies.get(&self.proxy) {
            self.proxy = url.clone();
        }

        if let Some(database) = &args.database {
            self.database = database.clone();
        }

        if !args.isins.is_empty() {
            for item in self.isins.values_mut() {
                item.disabled = true;
            }
            for isin in &args.isins {
                self.isins
                    .entry(isin.clone())
                    .and_modify(|item| item.disabled = false)
                    .or_insert_with(|| IsinItem {
                        isin: isin.clone(),
                        ..Default::default()
                    });
            }
        }

        if !args.sources.is_empty() {
            for item in self.sources.values_mut() {
                item.disabled = true;
            }

            let mut names = Vec::with_capacity(args.sources.len());
            for arg in &args.sources {
                let (source, workers) = parse_arg_source(arg)?;
                let item = self.sources.entry(source.clone()).or_insert_with(|| SourceItem {
                    source: source.clone(),
                    ..Default::default()
                });
                item.disabled = false;
                if workers != 0 {
                    item.workers = workers;
                }
                names.push(source);
            }

            for item in self.isins.values_mut() {
                item.sources = names.clone();
            }
        }

        Ok(())
    }

    /// Makes every available source known, inserting the missing ones with
    /// the given `disabled` value.
    pub fn add_all_sources(&mut self, all_sources: &[String], disabled: bool) {
        for name in all_sources {
            self.sources.entry(name.clone()).or_insert_with(|| SourceItem {
                source: name.clone(),
                disabled,
                ..Default::default()
            });
        }
    }

    /// Keeps only the enabled isins and the sources they use, applies the
    /// default workers and proxy of every source and validates the result.
    pub fn check_and_simplify(&mut self, all_sources: &[String]) -> Result<(), ConfigError> {
        if self.workers == 0 {
            self.workers = DEFAULT_WORKERS;
        }

        self.isins.retain(|_, item| !item.disabled);

        // Whether at least one isin uses every enabled source.
        let mut uses_all_sources = false;
        let mut referenced: BTreeSet<String> = BTreeSet::new();

        for (isin, item) in self.isins.iter_mut() {
            if item.sources.is_empty() {
                uses_all_sources = true;
                continue;
            }

            let mut enabled = Vec::with_capacity(item.sources.len());
            for name in &item.sources {
                let source = self
                    .sources
                    .get(name)
                    .ok_or_else(|| ConfigError::SourceNotAvailable(name.clone()))?;
                if !source.disabled && !enabled.contains(name) {
                    enabled.push(name.clone());
                    referenced.insert(name.clone());
                }
            }
            if enabled.is_empty() {
                return Err(ConfigError::IsinWithoutSources(isin.clone()));
            }
            item.sources = enabled;
        }

        if uses_all_sources {
            self.sources.retain(|_, item| !item.disabled);
            let enabled: Vec<String> = self.sources.keys().cloned().collect();
            for item in self.isins.values_mut() {
                if item.sources.is_empty() {
                    item.sources = enabled.clone();
                }
            }
        } else {
            self.sources.retain(|name, _| referenced.contains(name));
        }

        let available: HashSet<&str> = all_sources.iter().map(String::as_str).collect();

        for item in self.sources.values_mut() {
            if !available.contains(item.source.as_str()) {
                return Err(ConfigError::SourceNotAvailable(item.source.clone()));
            }

            if item.workers < 0 {
                return Err(ConfigError::SourceWorkersNotPositive {
                    source_name: item.source.clone(),
                    workers: item.workers,
                });
            }
            if item.workers == 0 {
                if self.workers < 0 {
                    return Err(ConfigError::WorkersNotPositive(self.workers));
                }
                item.workers = self.workers;
            }
            if item.workers > MAX_INSTANCES as i64 {
                return Err(ConfigError::TooManyWorkers {
                    source_name: item.source.clone(),
                    workers: item.workers,
                });
            }

            if item.proxy.is_empty() {
                item.proxy = self.proxy.clone();
            }
            if let Some(url) = self.proxies.get(&item.proxy) {
                item.proxy = url.clone();
            }
            if !item.proxy.is_empty() && reqwest::Proxy::all(item.proxy.as_str()).is_err() {
                return Err(ConfigError::InvalidProxy(item.proxy.clone()));
            }
        }

        Ok(())
    }

    /// Full pipeline: merge `args`, add the available sources and validate.
    pub fn resolve(mut self, args: &GetArgs, all_sources: &[String]) -> Result<Self, ConfigError> {
        self.merge_args(args)?;
        self.add_all_sources(all_sources, !args.sources.is_empty());
        self.check_and_simplify(all_sources)?;
        Ok(self)
    }

    /// The isins of every source, sorted by source name then isin. Sources
    /// left without isins are omitted.
    pub fn source_isins(&self) -> Vec<SourceIsins> {
        let mut by_source: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for item in self.isins.values() {
            for source in &item.sources {
                by_source.entry(source.as_str()).or_default().push(item.isin.clone());
            }
        }

        self.sources
            .values()
            .filter_map(|item| {
                let isins = by_source.remove(item.source.as_str())?;
                Some(SourceIsins {
                    source: item.source.clone(),
                    proxy: (!item.proxy.is_empty()).then(|| item.proxy.clone()),
                    workers: item.workers.max(1) as usize,
                    isins,
                })
            })
            .collect()
    }
}
