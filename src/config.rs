//! Crate-wide settings: defaults, overridable from the environment.
use crate::processing_log::{disable_processing_log, enable_processing_log, ProcessingLogGuard};
use log::warn;
use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_MAX_CHART_ENTITIES: usize = 10;
pub const DEFAULT_DOWNLOAD_BUFFER: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Record processing logs by default (`PROCESSING_LOG`).
    pub processing_log: bool,
    /// Entities kept by the chart helper when none are given (`CATALOG_MAX_CHART_ENTITIES`).
    pub max_chart_entities: usize,
    /// Read buffer for downloads, in bytes (`CATALOG_DOWNLOAD_BUFFER`).
    pub download_buffer_size: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            processing_log: false,
            max_chart_entities: DEFAULT_MAX_CHART_ENTITIES,
            download_buffer_size: DEFAULT_DOWNLOAD_BUFFER,
        }
    }
}

impl CatalogConfig {
    /// Defaults with any environment overrides applied. Unparseable values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup("PROCESSING_LOG") {
            match parse_flag(&value) {
                Some(flag) => config.processing_log = flag,
                None => warn!("PROCESSING_LOG={:?} is not a boolean, ignoring", value),
            }
        }
        if let Some(n) = parse_positive(&lookup, "CATALOG_MAX_CHART_ENTITIES") {
            config.max_chart_entities = n;
        }
        if let Some(n) = parse_positive(&lookup, "CATALOG_DOWNLOAD_BUFFER") {
            config.download_buffer_size = n;
        }
        config
    }

    /// Opens a processing-log scope matching `processing_log`. Logging stays in
    /// that state until the guard is dropped.
    pub fn processing_log_scope(&self) -> ProcessingLogGuard {
        if self.processing_log {
            enable_processing_log()
        } else {
            disable_processing_log()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_positive(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let value = lookup(key)?;
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!("{}={:?} is not a positive integer, ignoring", key, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing_log::is_processing_log_enabled;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> CatalogConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        CatalogConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config, CatalogConfig::default());
        assert!(!config.processing_log);
    }

    #[rstest]
    #[case("1", true)]
    #[case("TRUE", true)]
    #[case("off", false)]
    #[case("maybe", false)]
    fn test_processing_log_flag(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(config_from(&[("PROCESSING_LOG", value)]).processing_log, expected);
    }

    #[test]
    fn test_numeric_overrides() {
        let config = config_from(&[("CATALOG_MAX_CHART_ENTITIES", "3"), ("CATALOG_DOWNLOAD_BUFFER", "0")]);
        assert_eq!(config.max_chart_entities, 3);
        assert_eq!(config.download_buffer_size, DEFAULT_DOWNLOAD_BUFFER);
    }

    #[test]
    fn test_processing_log_scope() {
        let config = CatalogConfig { processing_log: true, ..Default::default() };
        {
            let _guard = config.processing_log_scope();
            assert!(is_processing_log_enabled());
        }
        assert!(!is_processing_log_enabled());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CatalogConfig = serde_json::from_str(r#"{"max_chart_entities": 5}"#).unwrap();
        assert_eq!(config.max_chart_entities, 5);
        assert_eq!(config.download_buffer_size, DEFAULT_DOWNLOAD_BUFFER);
    }
}
