//! Converter configuration.

use anyhow::{Context, Result};
use dpacct_event::{CodecConfig, DEFAULT_MAX_DEPTH};

/// Converter configuration (env-driven, flags override).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Deepest nesting accepted on decode. The converter reads untrusted
    /// files, so it always applies a cap.
    pub max_depth: usize,

    /// Reject integers supplied for float fields.
    pub strict_numbers: bool,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_depth: Option<usize>,
    pub strict_numbers: bool,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_numbers: false,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_depth: usize = lookup("DPACCT_MAX_DEPTH")
            .map(|v| v.parse())
            .transpose()
            .context("DPACCT_MAX_DEPTH must be a non-negative integer.")?
            .unwrap_or(DEFAULT_MAX_DEPTH);

        let strict_numbers = lookup("DPACCT_STRICT_NUMBERS")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let log_level = lookup("DPACCT_LOG_LEVEL").unwrap_or_else(|| "warn".to_string());

        Ok(Self {
            max_depth,
            strict_numbers,
            log_level,
        })
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        if overrides.strict_numbers {
            self.strict_numbers = true;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
        self
    }

    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig::default()
            .with_max_depth(self.max_depth)
            .with_strict_numbers(self.strict_numbers)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.codec_config(),
            CodecConfig::default().with_max_depth(DEFAULT_MAX_DEPTH)
        );
    }

    #[rstest]
    #[case::one("1", true)]
    #[case::lower("true", true)]
    #[case::upper("TRUE", true)]
    #[case::zero("0", false)]
    #[case::other("yes", false)]
    fn test_strict_numbers_values(#[case] value: &str, #[case] expected: bool) {
        let config = Config::from_lookup(lookup(&[("DPACCT_STRICT_NUMBERS", value)])).unwrap();
        assert_eq!(config.strict_numbers, expected);
        assert_eq!(config.codec_config().strict_numbers, expected);
    }

    #[test]
    fn test_reads_env() {
        let config = Config::from_lookup(lookup(&[
            ("DPACCT_MAX_DEPTH", "8"),
            ("DPACCT_STRICT_NUMBERS", "TRUE"),
            ("DPACCT_LOG_LEVEL", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.strict_numbers);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_bad_depth() {
        let err = Config::from_lookup(lookup(&[("DPACCT_MAX_DEPTH", "deep")])).unwrap_err();
        assert!(err.to_string().contains("DPACCT_MAX_DEPTH"));
    }

    #[test]
    fn test_flags_override_env() {
        let config = Config::from_lookup(lookup(&[("DPACCT_MAX_DEPTH", "8")]))
            .unwrap()
            .with_overrides(Overrides {
                max_depth: Some(3),
                strict_numbers: true,
                log_level: None,
            });
        assert_eq!(config.max_depth, 3);
        assert!(config.strict_numbers);
        assert_eq!(config.log_level, "warn");
    }
}
