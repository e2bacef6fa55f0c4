//! Variants: concrete implementations dispatched through the registry.

pub mod builtin;
pub mod factory;
pub mod variant;

pub use factory::{config_positive, config_str, VariantCatalog, VariantConfig, VariantFactory};
pub use variant::{arg_str, arg_value, unknown_method, MethodDescriptor, Variant, VariantError};
