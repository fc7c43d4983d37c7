//! Process configuration read from the environment.
//!
//! The library has no configuration file: everything arrives through two
//! environment variables exported by whoever sets up the preload.

/// Hostname mappings, `host:ip` items separated by commas or whitespace.
pub const MAPPINGS_VAR: &str = "OVERRIDEHOSTS";

/// `tracing` filter directive. Logging stays off when unset.
pub const LOG_VAR: &str = "OVERRIDEHOSTS_LOG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Raw mapping string, parsed by [`MappingTable::parse`](crate::dns::MappingTable::parse).
    pub mappings: Option<String>,
    /// Filter for the stderr log subscriber.
    pub log_filter: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| {
            std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            mappings: non_empty(MAPPINGS_VAR),
            log_filter: non_empty(LOG_VAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_both_vars() {
        let config = Config::from_lookup(lookup_from(&[
            (MAPPINGS_VAR, "db:10.0.0.10"),
            (LOG_VAR, "overridehosts=trace"),
        ]));
        assert_eq!(config.mappings.as_deref(), Some("db:10.0.0.10"));
        assert_eq!(config.log_filter.as_deref(), Some("overridehosts=trace"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = Config::from_lookup(lookup_from(&[(MAPPINGS_VAR, ""), (LOG_VAR, "")]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_vars() {
        let config = Config::from_lookup(|_| None);
        assert!(config.mappings.is_none());
        assert!(config.log_filter.is_none());
    }
}
