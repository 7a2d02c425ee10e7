//! Configuration for an extraction run. The layering (defaults, config files, command-line
//! overrides) lives in the `typedb` binary; this is the deserialized result.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// What to do when a root type is discovered whose type name matches an already-known root.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep every root, duplicates included.
    #[default]
    Keep,
    /// Discard a new root (and its subtree) if an earlier root has the same type name.
    ByTypeName,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path to the AST snapshot to extract from.
    pub input: PathBuf,

    /// Path the type database is written to.
    pub output: PathBuf,

    /// Root type deduplication policy.
    #[serde(default)]
    pub dedup: DedupPolicy,

    /// Whether `#define`s are also collected from the token streams of included files.
    #[serde(default = "scan_included_files_default")]
    pub scan_included_files: bool,

    /// `tracing` filter directive used unless `--verbose` is given.
    #[serde(default = "log_filter_default")]
    pub log_filter: String,

    /// Keys that were not recognized; reported as warnings by the binary.
    #[serde(flatten)]
    pub unknown: HashMap<String, Value>,
}

fn scan_included_files_default() -> bool {
    true
}

fn log_filter_default() -> String {
    "info".into()
}

impl Config {
    /// Returns a mock config for testing.
    pub fn mock() -> Config {
        Config {
            input: PathBuf::from("snapshot.json"),
            output: PathBuf::from("type_db.bin"),
            dedup: DedupPolicy::Keep,
            scan_included_files: true,
            log_filter: log_filter_default(),
            unknown: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_unknown_keys() {
        let config: Config = serde_json::from_str(
            r#"{"input": "a.json", "output": "b.bin", "colour": "blue"}"#,
        )
        .unwrap();
        assert_eq!(config.dedup, DedupPolicy::Keep);
        assert!(config.scan_included_files);
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.unknown.keys().collect::<Vec<_>>(), ["colour"]);
    }

    #[test]
    fn dedup_policy_names() {
        let config: Config = serde_json::from_str(
            r#"{"input": "a.json", "output": "b.bin", "dedup": "by_type_name"}"#,
        )
        .unwrap();
        assert_eq!(config.dedup, DedupPolicy::ByTypeName);
    }
}
