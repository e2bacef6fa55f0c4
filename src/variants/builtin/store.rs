//! Store variants for the `store` capability.
//!
//! All backends keep their records in an in-memory map owned by the variant;
//! the backend only changes how keys are located and how the store describes
//! itself.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::variants::factory::{config_str, VariantConfig};
use crate::variants::variant::{
    arg_str, arg_value, unknown_method, MethodDescriptor, Variant, VariantError,
};

/// Where a [`MemoryStore`] pretends to keep its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Database { connection_string: String },
    File { base_path: String },
    Cloud { provider: String },
}

impl StoreBackend {
    pub fn database(connection_string: &str) -> Self {
        Self::Database {
            connection_string: connection_string.to_string(),
        }
    }

    pub fn file(base_path: &str) -> Self {
        Self::File {
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    pub fn cloud(provider: &str) -> Self {
        Self::Cloud {
            provider: provider.to_string(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Database { .. } => "Database".to_string(),
            Self::File { .. } => "File System".to_string(),
            Self::Cloud { provider } => format!("Cloud ({})", provider),
        }
    }

    /// Storage location of a record key.
    pub fn locate(&self, key: &str) -> String {
        match self {
            Self::File { base_path } => format!("{}/{}.json", base_path, key),
            _ => key.to_string(),
        }
    }
}

/// Keyed record storage over one backend.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    label: String,
    backend: StoreBackend,
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new(label: &str, backend: StoreBackend) -> Self {
        Self {
            label: label.to_string(),
            backend,
            entries: BTreeMap::new(),
        }
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    /// Stored locations, sorted.
    pub fn locations(&self) -> Vec<&str> {
        self.entries.keys().map(|k| k.as_str()).collect()
    }

    pub(super) fn database(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let conn = config_str(config, "connection_string")?;
        Ok(Box::new(Self::new(label, StoreBackend::database(&conn))))
    }

    pub(super) fn file(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let base_path = config_str(config, "base_path")?;
        Ok(Box::new(Self::new(label, StoreBackend::file(&base_path))))
    }

    pub(super) fn cloud(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        let provider = config_str(config, "provider")?;
        Ok(Box::new(Self::new(label, StoreBackend::cloud(&provider))))
    }
}

impl Variant for MemoryStore {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("put", 2, "Store a record under a key"),
            MethodDescriptor::new("get", 1, "Load a record, null when absent"),
            MethodDescriptor::new("delete", 1, "Remove a record"),
            MethodDescriptor::new("backend", 0, "Describe the storage backend"),
            MethodDescriptor::new("locations", 0, "Stored record locations"),
        ]
    }

    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError> {
        match method {
            "put" => {
                let location = self.backend.locate(arg_str(args, 0, "key")?);
                let value = arg_value(args, 1, "value")?.clone();
                log::info!("[{}] saving {}", self.backend.describe(), location);
                self.entries.insert(location, value);
                Ok(json!(true))
            }
            "get" => {
                let location = self.backend.locate(arg_str(args, 0, "key")?);
                log::info!("[{}] loading {}", self.backend.describe(), location);
                Ok(self.entries.get(&location).cloned().unwrap_or(Value::Null))
            }
            "delete" => {
                let location = self.backend.locate(arg_str(args, 0, "key")?);
                log::info!("[{}] deleting {}", self.backend.describe(), location);
                self.entries.remove(&location);
                Ok(json!(true))
            }
            "backend" => Ok(json!(self.backend.describe())),
            "locations" => Ok(json!(self.locations())),
            _ => Err(unknown_method(&self.label, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_delete() {
        let mut store = MemoryStore::new("db", StoreBackend::database("mysql://localhost"));
        let record = json!({"id": "user_001", "name": "Ana"});
        assert_eq!(
            store.call("put", &[json!("user_001"), record.clone()]).unwrap(),
            json!(true)
        );
        assert_eq!(store.call("get", &[json!("user_001")]).unwrap(), record);
        assert_eq!(store.call("delete", &[json!("user_001")]).unwrap(), json!(true));
        assert_eq!(store.call("get", &[json!("user_001")]).unwrap(), Value::Null);
        // deleting an absent key still succeeds
        assert_eq!(store.call("delete", &[json!("user_001")]).unwrap(), json!(true));
    }

    #[test]
    fn test_file_backend_locates_json_files() {
        let mut store = MemoryStore::new("files", StoreBackend::file("/data/files/"));
        store.call("put", &[json!("p1"), json!(1)]).unwrap();
        assert_eq!(store.locations(), vec!["/data/files/p1.json"]);
        assert_eq!(store.call("backend", &[]).unwrap(), json!("File System"));
    }

    #[test]
    fn test_cloud_describe() {
        assert_eq!(StoreBackend::cloud("AWS S3").describe(), "Cloud (AWS S3)");
    }
}
