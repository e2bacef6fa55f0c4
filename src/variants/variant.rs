//! Variant trait: the contract for concrete capability implementations.

use serde_json::Value;

/// A concrete fulfiller of one or more capabilities.
///
/// Variants are stateful (a store owns its map, a notifier its outbox) and
/// are only ever reached through the registry's `invoke`, which restricts
/// calls to the surface of a claimed capability.
pub trait Variant: Send {
    /// Identity label, unique per registry (e.g., "email", "db-main")
    fn label(&self) -> &str;

    /// The methods this variant exposes.
    ///
    /// Registration compares this list against every claimed capability, so
    /// a variant must never advertise a method it cannot execute.
    fn methods(&self) -> Vec<MethodDescriptor>;

    /// Execute one method with positional arguments.
    ///
    /// Arguments have already been checked against the capability signature
    /// when this is reached through the registry.
    fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, VariantError>;
}

/// A method exposed by a variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub arity: usize,
    pub description: String,
}

impl MethodDescriptor {
    pub fn new(name: &str, arity: usize, description: &str) -> Self {
        Self {
            name: name.to_string(),
            arity,
            description: description.to_string(),
        }
    }
}

/// Variant error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VariantError {
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl VariantError {
    /// Every value `code()` can return.
    pub const CODES: &'static [&'static str] = &[
        "not_supported",
        "invalid_argument",
        "execution_failed",
        "invalid_config",
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotSupported(_) => "not_supported",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::ExecutionFailed(_) => "execution_failed",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Fetch a string argument at `index`.
pub fn arg_str<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a str, VariantError> {
    args.get(index)
        .and_then(|v| v.as_str())
        .ok_or_else(|| VariantError::InvalidArgument(format!("'{}' must be a string", name)))
}

/// Fetch any argument at `index`.
pub fn arg_value<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value, VariantError> {
    args.get(index)
        .ok_or_else(|| VariantError::InvalidArgument(format!("'{}' is required", name)))
}

/// Error for a method name the variant does not know.
pub fn unknown_method(label: &str, method: &str) -> VariantError {
    VariantError::NotSupported(format!("{} has no method '{}'", label, method))
}
