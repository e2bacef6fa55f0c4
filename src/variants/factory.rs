//! VariantCatalog: constructs variants by kind from configuration maps.
//!
//! The catalog is what keeps the dispatch path closed for modification: a new
//! kind of variant only needs a new `VariantFactory` registered here.

use std::collections::HashMap;

use serde_json::Value;

use super::variant::{Variant, VariantError};
use crate::utilities::config::process_config;

/// Configuration map handed to a factory (merged over its defaults).
pub type VariantConfig = HashMap<String, Value>;

/// Factory for creating variant instances of one kind
pub trait VariantFactory: Send + Sync {
    /// Kind identifier used in scenario files (e.g., "email_notifier")
    fn kind(&self) -> &str;

    /// Default configuration values for this kind
    fn defaults(&self) -> VariantConfig {
        VariantConfig::new()
    }

    /// Create a new variant from a fully merged configuration
    fn create(&self, label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError>;
}

/// Registered factories indexed by kind.
#[derive(Default)]
pub struct VariantCatalog {
    factories: HashMap<String, Box<dyn VariantFactory>>,
}

impl VariantCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with all built-in factories registered.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for factory in super::builtin::factories() {
            catalog.register_factory(factory);
        }
        catalog
    }

    /// Register a factory. A factory with the same kind is replaced.
    pub fn register_factory(&mut self, factory: Box<dyn VariantFactory>) {
        let kind = factory.kind().to_string();
        if self.factories.insert(kind.clone(), factory).is_some() {
            log::debug!("Replaced variant factory for kind '{}'", kind);
        }
    }

    /// Build a variant of `kind`, merging `config` over the factory defaults.
    pub fn create(
        &self,
        kind: &str,
        label: &str,
        config: &VariantConfig,
    ) -> Result<Box<dyn Variant>, VariantError> {
        let factory = self.factories.get(kind).ok_or_else(|| {
            VariantError::InvalidConfig(format!("No variant factory registered for kind: {}", kind))
        })?;
        let merged = process_config(config, &factory.defaults());
        factory.create(label, &merged)
    }

    /// All registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }
}

/// Read a required string setting.
pub fn config_str(config: &VariantConfig, key: &str) -> Result<String, VariantError> {
    config
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| VariantError::InvalidConfig(format!("'{}' must be a string", key)))
}

/// Read a required strictly positive number.
pub fn config_positive(config: &VariantConfig, key: &str) -> Result<f64, VariantError> {
    match config.get(key).and_then(|v| v.as_f64()) {
        Some(n) if n > 0.0 && n.is_finite() => Ok(n),
        Some(n) => Err(VariantError::InvalidConfig(format!(
            "'{}' must be positive, got {}",
            key, n
        ))),
        None => Err(VariantError::InvalidConfig(format!("'{}' is required", key))),
    }
}
