use std::path::PathBuf;

use crate::taskengine::MAX_INSTANCES;

/// Errors raised while loading, merging or validating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {section}: missing {key:?} key")]
    MissingKey { section: &'static str, key: &'static str },

    #[error("invalid source in args: {0:?}")]
    InvalidArgSource(String),

    #[error("workers must be greater than zero (found {0})")]
    WorkersNotPositive(i64),

    #[error("workers must be greater than zero (source {source_name:?} has workers={workers})")]
    SourceWorkersNotPositive { source_name: String, workers: i64 },

    #[error("workers must be at most {max} (source {source_name:?} has workers={workers})", max = MAX_INSTANCES)]
    TooManyWorkers { source_name: String, workers: i64 },

    #[error("required source {0:?} is not available")]
    SourceNotAvailable(String),

    #[error("isin {0:?} without enabled sources")]
    IsinWithoutSources(String),

    #[error("invalid proxy: {0}")]
    InvalidProxy(String),
}
