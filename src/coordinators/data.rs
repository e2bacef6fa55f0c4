//! DataService: record persistence over any `store` variant.

use serde_json::{json, Value};

use crate::capabilities::builtin::STORE;
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone)]
pub struct DataService<'r> {
    registry: &'r CapabilityRegistry,
    store: Binding,
}

impl<'r> DataService<'r> {
    pub fn new(registry: &'r CapabilityRegistry, store: Binding) -> Result<Self, DispatchError> {
        store.expect_capability(STORE)?;
        Ok(Self { registry, store })
    }

    /// Save `record` under its `id` field and read it back.
    ///
    /// Returns the record as the store now holds it, or `None` when the store
    /// refused the write. Nothing is read back after a refused write.
    pub fn process_data(&self, record: &Value) -> Result<Option<Value>, DispatchError> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| DispatchError::ArgumentMismatch {
                method: "put".to_string(),
                reason: "record has no string 'id' field".to_string(),
            })?;

        let saved = self
            .registry
            .call(&self.store, "put", &[json!(id), record.clone()])?;
        if saved.value != Value::Bool(true) {
            log::warn!(
                "Store '{}' refused record '{}'",
                self.store.variant_label(),
                id
            );
            return Ok(None);
        }
        let stored = self.registry.call(&self.store, "get", &[json!(id)])?;
        log::debug!(
            "Record '{}' verified in '{}'",
            id,
            self.store.variant_label()
        );
        Ok(Some(stored.value))
    }

    /// Load a record, `None` when absent.
    pub fn load(&self, id: &str) -> Result<Option<Value>, DispatchError> {
        let loaded = self.registry.call(&self.store, "get", &[json!(id)])?;
        Ok(match loaded.value {
            Value::Null => None,
            value => Some(value),
        })
    }

    /// Remove a record. Succeeds whether or not it existed.
    pub fn cleanup(&self, id: &str) -> Result<bool, DispatchError> {
        let deleted = self.registry.call(&self.store, "delete", &[json!(id)])?;
        Ok(deleted.value.as_bool().unwrap_or(false))
    }

    pub fn backend(&self) -> Result<String, DispatchError> {
        let backend = self.registry.call(&self.store, "backend", &[])?;
        Ok(backend.value.as_str().unwrap_or_default().to_string())
    }
}
