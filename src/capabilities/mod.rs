//! # Capability Registry
//!
//! A capability is a named operation contract: an ordered list of method
//! signatures. Variants register against the capabilities they fully
//! implement, and callers reach them only through `invoke`, which restricts
//! every call to the claimed capability's surface.
//!
//! ## Dispatch Flow
//!
//! 1. `CapabilityRegistry::declare_capability("notify", [...])` returns a `CapabilityHandle`
//! 2. `register_variant(EmailNotifier, &[notify])` checks completeness and returns a `VariantHandle`
//! 3. `invoke(email, notify, "send", &[message, recipient])` checks the signature,
//!    calls the variant and checks the declared return kind
//! 4. Coordinators hold `Binding`s and never see the concrete variant type

pub mod builtin;
pub mod capability;
pub mod error;
pub mod registry;

pub use capability::{Capability, MethodSignature, ParamSpec, ValueKind, ValueShape};
pub use error::DispatchError;
pub use registry::{
    Binding, CapabilityHandle, CapabilityRegistry, Invocation, ProbeOutcome, ProbeReport,
    VariantHandle,
};
