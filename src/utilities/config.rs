//! Configuration processing utilities.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;

/// Process a configuration map, merging defaults with overrides.
///
/// # Arguments
/// * `config` - The configuration map to process.
/// * `defaults` - Default values to fill in for missing keys.
///
/// # Returns
/// A merged configuration map.
pub fn process_config(
    config: &HashMap<String, Value>,
    defaults: &HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut result = defaults.clone();
    for (key, value) in config {
        result.insert(key.clone(), value.clone());
    }
    result
}

/// Harness settings read from the environment.
///
/// # Environment Variables
///
/// - `SOLID_SCENARIO_DIR`: scenarios run by a bare `run` (default: `scenarios`)
/// - `SOLID_CAPABILITY_DIR`: extra capability YAML directory (optional)
/// - `SOLID_NARRATE`: print narration for every dispatch event (default: true)
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub scenario_dir: PathBuf,
    pub capability_dir: Option<PathBuf>,
    pub narrate: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            scenario_dir: PathBuf::from("scenarios"),
            capability_dir: None,
            narrate: true,
        }
    }
}

impl HarnessConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            scenario_dir: lookup("SOLID_SCENARIO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scenario_dir),
            capability_dir: lookup("SOLID_CAPABILITY_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            narrate: lookup("SOLID_NARRATE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.narrate),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_process_config_overrides_defaults() {
        let mut defaults = HashMap::new();
        defaults.insert("smtp_server".to_string(), json!("localhost"));
        defaults.insert("port".to_string(), json!(25));
        let mut config = HashMap::new();
        config.insert("smtp_server".to_string(), json!("smtp.gmail.com"));

        let merged = process_config(&config, &defaults);
        assert_eq!(merged["smtp_server"], json!("smtp.gmail.com"));
        assert_eq!(merged["port"], json!(25));
    }

    #[test]
    fn test_harness_config_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("SOLID_SCENARIO_DIR", "/tmp/scen"),
            ("SOLID_NARRATE", "off"),
        ]
        .into_iter()
        .collect();
        let cfg = HarnessConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.scenario_dir, PathBuf::from("/tmp/scen"));
        assert_eq!(cfg.capability_dir, None);
        assert!(!cfg.narrate);
    }

    #[test]
    fn test_harness_config_defaults() {
        let cfg = HarnessConfig::from_lookup(|_| None);
        assert_eq!(cfg, HarnessConfig::default());
    }
}
