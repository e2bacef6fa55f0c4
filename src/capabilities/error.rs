//! Dispatch errors.
//!
//! Every failure is a non-transient wiring or contract error surfaced directly
//! to the caller. Nothing here is retried.

use thiserror::Error;

use crate::variants::VariantError;

/// Errors raised by the capability registry and coordinators.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A capability with this name is already declared.
    #[error("Capability already declared: {name}")]
    DuplicateCapability { name: String },

    /// The capability definition breaks a structural invariant.
    #[error("Invalid capability '{name}': {reason}")]
    InvalidCapability { name: String, reason: String },

    /// A variant with this label is already registered.
    #[error("Variant already registered: {label}")]
    DuplicateVariant { label: String },

    /// The variant does not expose every method of a claimed capability.
    #[error("Variant '{variant}' does not fully implement '{capability}': missing {}", .missing.join(", "))]
    IncompleteImplementation {
        variant: String,
        capability: String,
        missing: Vec<String>,
    },

    /// The handle or name does not refer to a capability of this registry.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// The handle or label does not refer to a variant of this registry.
    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    /// The variant exists but never claimed the capability.
    #[error("Variant '{variant}' does not claim capability '{capability}'")]
    CapabilityNotClaimed { variant: String, capability: String },

    /// The method is not part of the capability's declared surface.
    #[error("Operation '{method}' is not part of capability '{capability}'")]
    UnsupportedOperation { capability: String, method: String },

    /// Arguments do not match the declared signature.
    #[error("Arguments for '{method}' do not match its signature: {reason}")]
    ArgumentMismatch { method: String, reason: String },

    /// The variant's method body failed.
    #[error("Variant '{variant}' failed in '{method}': {source}")]
    VariantExecution {
        variant: String,
        method: String,
        #[source]
        source: VariantError,
    },

    /// The variant returned a value outside the declared return contract.
    #[error("Variant '{variant}' broke the contract of '{method}': expected {expected}, got {actual}")]
    ContractViolation {
        variant: String,
        method: String,
        expected: String,
        actual: String,
    },

    /// A coordinator was handed a binding for a different capability.
    #[error("Expected a binding for '{expected}', got '{actual}'")]
    CapabilityMismatch { expected: String, actual: String },

    /// YAML parsing of a capability definition failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Reading a capability definition failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatchError {
    /// Every value `code()` can return.
    pub const CODES: &'static [&'static str] = &[
        "duplicate_capability",
        "invalid_capability",
        "duplicate_variant",
        "incomplete_implementation",
        "unknown_capability",
        "unknown_variant",
        "capability_not_claimed",
        "unsupported_operation",
        "argument_mismatch",
        "variant_execution",
        "contract_violation",
        "capability_mismatch",
        "yaml",
        "io",
    ];

    /// Stable snake_case identifier, used by scenario expectations.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateCapability { .. } => "duplicate_capability",
            Self::InvalidCapability { .. } => "invalid_capability",
            Self::DuplicateVariant { .. } => "duplicate_variant",
            Self::IncompleteImplementation { .. } => "incomplete_implementation",
            Self::UnknownCapability(_) => "unknown_capability",
            Self::UnknownVariant(_) => "unknown_variant",
            Self::CapabilityNotClaimed { .. } => "capability_not_claimed",
            Self::UnsupportedOperation { .. } => "unsupported_operation",
            Self::ArgumentMismatch { .. } => "argument_mismatch",
            Self::VariantExecution { .. } => "variant_execution",
            Self::ContractViolation { .. } => "contract_violation",
            Self::CapabilityMismatch { .. } => "capability_mismatch",
            Self::Yaml(_) => "yaml",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_implementation_message_lists_missing() {
        let err = DispatchError::IncompleteImplementation {
            variant: "simple".to_string(),
            capability: "scanner".to_string(),
            missing: vec!["scan_document/0".to_string(), "scan_to_email/1".to_string()],
        };
        assert_eq!(err.code(), "incomplete_implementation");
        assert_eq!(
            err.to_string(),
            "Variant 'simple' does not fully implement 'scanner': missing scan_document/0, scan_to_email/1"
        );
    }

    #[test]
    fn test_codes_are_listed() {
        let samples = [
            DispatchError::DuplicateVariant {
                label: "a".to_string(),
            },
            DispatchError::UnknownCapability("x".to_string()),
            DispatchError::CapabilityMismatch {
                expected: "store".to_string(),
                actual: "notify".to_string(),
            },
            DispatchError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        ];
        for err in samples {
            assert!(DispatchError::CODES.contains(&err.code()), "{}", err.code());
        }
        assert_eq!(DispatchError::CODES.len(), 14);
    }

    #[test]
    fn test_variant_execution_keeps_source() {
        use std::error::Error as _;
        let err = DispatchError::VariantExecution {
            variant: "sms".to_string(),
            method: "send".to_string(),
            source: VariantError::InvalidArgument("recipient is empty".to_string()),
        };
        assert_eq!(err.code(), "variant_execution");
        assert!(err.source().is_some());
    }
}
