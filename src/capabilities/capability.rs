//! Capability definition: a named, closed operation contract.
//!
//! A capability declares an ordered list of method signatures that every
//! variant claiming it must implement. Capabilities are declared once, either
//! programmatically or from YAML, and are never mutated afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

static CAPABILITY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*(:[a-z][a-z0-9_]*)?$").unwrap());

/// An abstract operation contract.
///
/// Example YAML:
/// ```yaml
/// capability:
///   name: "notify"
///   description: "Deliver a message to a recipient"
///   tags: ["messaging"]
///   methods:
///     - name: "send"
///       params:
///         - { name: "message", kind: "string" }
///         - { name: "recipient", kind: "string" }
///       returns: "bool"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Unique name, optionally namespaced: "notify" or "office:printer"
    pub name: String,

    /// Human-readable description of the contract
    #[serde(default)]
    pub description: String,

    /// Searchable tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Ordered method signatures every variant must satisfy
    pub methods: Vec<MethodSignature>,
}

/// One method of a capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,

    #[serde(default)]
    pub params: Vec<ParamSpec>,

    #[serde(default)]
    pub returns: ValueKind,
}

/// A positional parameter of a method signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,

    #[serde(default)]
    pub kind: ValueKind,
}

/// Coarse JSON value kinds used for parameter and return contracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    #[default]
    Any,
    Null,
    Bool,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// The most specific kind of a concrete value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::Integer,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether `value` satisfies this kind. `Number` accepts integers.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, ValueKind::of(value)) {
            (Self::Any, _) => true,
            (Self::Number, Self::Integer) => true,
            (expected, actual) => *expected == actual,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(s)
    }
}

/// Structural description of a value: object field names and their shapes,
/// array element shape, or a scalar kind.
///
/// Two results have the same shape when they expose the same field set with
/// the same kinds, regardless of the actual values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Scalar(ValueKind),
    Array(Option<Box<ValueShape>>),
    Object(BTreeMap<String, ValueShape>),
}

impl ValueShape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                let first = items.first().map(ValueShape::of);
                // Heterogeneous arrays have no single element shape.
                let uniform = items.iter().all(|v| Some(ValueShape::of(v)) == first);
                Self::Array(if uniform { first.map(Box::new) } else { None })
            }
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), ValueShape::of(v)))
                    .collect(),
            ),
            // Integer and float results of the same contract share a shape.
            Value::Number(_) => Self::Scalar(ValueKind::Number),
            other => Self::Scalar(ValueKind::of(other)),
        }
    }
}

impl MethodSignature {
    /// Create a signature from `(name, kind)` parameter pairs.
    pub fn new(name: &str, params: &[(&str, ValueKind)], returns: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            params: params
                .iter()
                .map(|(n, k)| ParamSpec {
                    name: n.to_string(),
                    kind: *k,
                })
                .collect(),
            returns,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Compact rendering used in error messages: `send/2`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.name, self.arity())
    }
}

impl Capability {
    pub fn new(name: &str, methods: Vec<MethodSignature>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            tags: Vec::new(),
            methods,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Parse a capability from a YAML string with a top-level `capability:` key.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let wrapper: CapabilityWrapper = serde_yaml::from_str(yaml)?;
        Ok(wrapper.capability)
    }

    /// Check the structural invariants of the definition.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if !CAPABILITY_NAME.is_match(&self.name) {
            return Err(format!(
                "name '{}' must match {}",
                self.name,
                CAPABILITY_NAME.as_str()
            ));
        }
        if self.methods.is_empty() {
            return Err("at least one method is required".to_string());
        }
        let mut seen = HashSet::new();
        for method in &self.methods {
            if method.name.trim().is_empty() {
                return Err("method names must not be empty".to_string());
            }
            if !seen.insert(method.name.as_str()) {
                return Err(format!("method '{}' is declared twice", method.name));
            }
        }
        Ok(())
    }

    /// Look up a method signature by name.
    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    /// Namespace part of the name ("office" from "office:printer").
    pub fn namespace(&self) -> Option<&str> {
        self.name.split_once(':').map(|(ns, _)| ns)
    }
}

/// YAML wrapper (a capability is nested under `capability:`)
#[derive(Debug, Deserialize)]
struct CapabilityWrapper {
    capability: Capability,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_capability_yaml() {
        let yaml = r#"
capability:
  name: "notify"
  description: "Deliver a message to a recipient"
  tags: ["messaging"]
  methods:
    - name: "send"
      params:
        - { name: "message", kind: "string" }
        - { name: "recipient", kind: "string" }
      returns: "bool"
    - name: "channel"
      returns: "string"
"#;

        let cap = Capability::from_yaml(yaml).unwrap();
        assert_eq!(cap.name, "notify");
        assert_eq!(cap.method_names(), vec!["send", "channel"]);
        assert_eq!(cap.method("send").unwrap().arity(), 2);
        assert_eq!(cap.method("send").unwrap().returns, ValueKind::Bool);
        assert_eq!(cap.method("channel").unwrap().params.len(), 0);
        assert!(cap.validate().is_ok());
    }

    #[test]
    fn test_param_kind_defaults_to_any() {
        let yaml = r#"
capability:
  name: "store"
  methods:
    - name: "put"
      params:
        - { name: "key", kind: "string" }
        - { name: "value" }
"#;
        let cap = Capability::from_yaml(yaml).unwrap();
        let put = cap.method("put").unwrap();
        assert_eq!(put.params[1].kind, ValueKind::Any);
        assert_eq!(put.returns, ValueKind::Any);
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let sig = MethodSignature::new("run", &[], ValueKind::Null);
        assert!(Capability::new("Bad Name", vec![sig.clone()]).validate().is_err());
        assert!(Capability::new("", vec![sig.clone()]).validate().is_err());
        assert!(Capability::new("office:printer", vec![sig.clone()]).validate().is_ok());
        assert!(Capability::new("empty", vec![]).validate().is_err());
        assert!(Capability::new("twice", vec![sig.clone(), sig]).validate().is_err());
    }

    #[test]
    fn test_value_kind_accepts() {
        assert!(ValueKind::Number.accepts(&json!(3)));
        assert!(ValueKind::Number.accepts(&json!(3.5)));
        assert!(!ValueKind::Integer.accepts(&json!(3.5)));
        assert!(ValueKind::Any.accepts(&json!(null)));
        assert!(!ValueKind::String.accepts(&json!(true)));
    }

    #[test]
    fn test_value_shape_ignores_values() {
        let a = json!({"id": "a", "size": 1, "tags": ["x"]});
        let b = json!({"id": "b", "size": 2.5, "tags": ["y", "z"]});
        let c = json!({"id": "c", "tags": []});
        assert_eq!(ValueShape::of(&a), ValueShape::of(&b));
        assert_ne!(ValueShape::of(&a), ValueShape::of(&c));
    }

    #[test]
    fn test_namespace() {
        let sig = MethodSignature::new("run", &[], ValueKind::Null);
        assert_eq!(
            Capability::new("office:printer", vec![sig.clone()]).namespace(),
            Some("office")
        );
        assert_eq!(Capability::new("notify", vec![sig]).namespace(), None);
    }
}
