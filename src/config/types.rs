use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workers of a source when neither the source nor the config set them.
pub const DEFAULT_WORKERS: i64 = 1;

/// Characters separating a source name from its workers in `-s` arguments.
pub const SOURCE_WORKERS_SEPARATORS: &[char] = &['/', ':', '#'];

/// Name of the config file looked up in the home directory.
pub const DEFAULT_CONFIG_FILE: &str = ".quote.json";

/// A named proxy, referenced by name from the `proxy` fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProxyItem {
    #[serde(default)]
    pub proxy: String,
    /// Empty means "no proxy".
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceItem {
    #[serde(default)]
    pub source: String,
    /// Zero means "use the global workers".
    #[serde(default, skip_serializing_if = "is_zero")]
    pub workers: i64,
    /// Proxy URL or name of a `proxies` entry; empty means "use the global proxy".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub proxy: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IsinItem {
    #[serde(default)]
    pub isin: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,
    /// Sources allowed for the isin; empty means every enabled source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// Layout of the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub database: String,
    pub workers: i64,
    pub proxy: String,
    pub proxies: Vec<ProxyItem>,
    pub sources: Vec<SourceItem>,
    pub isins: Vec<IsinItem>,
}

/// Configuration of a `get` run: the file contents, then the command line
/// arguments merged on top.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub workers: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proxy: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub proxies: BTreeMap<String, String>,
    pub sources: BTreeMap<String, SourceItem>,
    pub isins: BTreeMap<String, IsinItem>,
}

/// Command line arguments of `get` that override the config file.
/// `None` means "not passed".
#[derive(Debug, Clone, Default)]
pub struct GetArgs {
    pub database: Option<String>,
    pub workers: Option<i64>,
    pub proxy: Option<String>,
    /// `name` or `name/workers` items.
    pub sources: Vec<String>,
    pub isins: Vec<String>,
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

fn is_false(b: &bool) -> bool {
    !*b
}
