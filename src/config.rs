//! Environment-backed defaults.
//!
//! A `.env` file in the working directory is loaded first (if present); real
//! environment variables win over it. CLI flags win over both.

use std::path::PathBuf;

/// Default log file looked up when neither `--file` nor `EPI_DATA_FILE` is set.
pub const DEFAULT_DATA_FILE: &str = "covid19_tests.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub output_dir: PathBuf,
    /// `EnvFilter` directive, when set.
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            output_dir: PathBuf::from("."),
            log_filter: None,
        }
    }
}

impl Settings {
    /// Load `.env` and read `EPI_DATA_FILE`, `EPI_OUTPUT_DIR` and `EPI_LOG`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            data_file: get("EPI_DATA_FILE").map(PathBuf::from).unwrap_or(defaults.data_file),
            output_dir: get("EPI_OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            log_filter: get("EPI_LOG"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
        assert_eq!(Settings::default().data_file, PathBuf::from("covid19_tests.txt"));
    }

    #[test]
    fn variables_override_defaults() {
        let s = Settings::from_lookup(lookup(&[
            ("EPI_DATA_FILE", "data/log.txt"),
            ("EPI_OUTPUT_DIR", "out"),
            ("EPI_LOG", "debug"),
        ]));
        assert_eq!(s.data_file, PathBuf::from("data/log.txt"));
        assert_eq!(s.output_dir, PathBuf::from("out"));
        assert_eq!(s.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let s = Settings::from_lookup(lookup(&[("EPI_DATA_FILE", "  "), ("EPI_LOG", "")]));
        assert_eq!(s.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(s.log_filter, None);
    }
}
