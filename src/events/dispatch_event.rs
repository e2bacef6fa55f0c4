//! Dispatch events: the explicit record of everything the registry does.
//!
//! Registry operations never print. They emit a [`DispatchEvent`] to every
//! registered listener, and narration or auditing is built on top of that.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// One registry event with a unique id, UTC timestamp and a per-registry
/// emission sequence number.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchEvent {
    /// Unique event identifier (UUID v4).
    pub event_id: String,

    /// UTC timestamp of event creation.
    pub timestamp: DateTime<Utc>,

    /// Monotonically increasing within one registry, starting at 1.
    pub sequence: u64,

    #[serde(flatten)]
    pub kind: DispatchEventKind,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEventKind {
    CapabilityDeclared {
        capability: String,
        methods: Vec<String>,
    },
    VariantRegistered {
        variant: String,
        capabilities: Vec<String>,
    },
    RegistrationRejected {
        variant: String,
        code: String,
        message: String,
    },
    InvocationCompleted {
        variant: String,
        capability: String,
        method: String,
        result: Value,
    },
    InvocationFailed {
        variant: String,
        capability: String,
        method: String,
        code: String,
        message: String,
    },
}

impl DispatchEvent {
    /// Create an event with a fresh UUID v4 and the current UTC time.
    pub fn new(sequence: u64, kind: DispatchEventKind) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            sequence,
            kind,
        }
    }

    /// Event type discriminator string (e.g. `"invocation_completed"`).
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            DispatchEventKind::CapabilityDeclared { .. } => "capability_declared",
            DispatchEventKind::VariantRegistered { .. } => "variant_registered",
            DispatchEventKind::RegistrationRejected { .. } => "registration_rejected",
            DispatchEventKind::InvocationCompleted { .. } => "invocation_completed",
            DispatchEventKind::InvocationFailed { .. } => "invocation_failed",
        }
    }

    /// Whether the event records a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            DispatchEventKind::RegistrationRejected { .. } | DispatchEventKind::InvocationFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_serializes_flat_with_type_tag() {
        let event = DispatchEvent::new(
            7,
            DispatchEventKind::InvocationCompleted {
                variant: "echo".to_string(),
                capability: "notify".to_string(),
                method: "send".to_string(),
                result: json!(true),
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("invocation_completed"));
        assert_eq!(value["sequence"], json!(7));
        assert_eq!(value["variant"], json!("echo"));
        assert_eq!(value["result"], json!(true));
        assert_eq!(event.event_type(), "invocation_completed");
        assert!(!event.is_failure());
    }

    #[test]
    fn test_event_ids_are_unique() {
        let kind = DispatchEventKind::CapabilityDeclared {
            capability: "notify".to_string(),
            methods: vec!["send".to_string()],
        };
        let a = DispatchEvent::new(1, kind.clone());
        let b = DispatchEvent::new(2, kind);
        assert_ne!(a.event_id, b.event_id);
    }
}
