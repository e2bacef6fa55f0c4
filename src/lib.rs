//! # solid-dispatch
//!
//! Capability-based strategy dispatch.
//!
//! Capabilities are named operation contracts; variants are concrete
//! implementations registered against the capabilities they fully implement;
//! coordinators depend only on capabilities and reach variants through the
//! [`CapabilityRegistry`]. Adding a variant never requires changing a
//! coordinator or the dispatch path.
//!
//! ```text
//!  declare_capability ──► register_variant ──► invoke / bind + call
//!         │                      │                      │
//!   CapabilityHandle       VariantHandle          Invocation
//! ```
//!
//! The crate also ships a catalogue of built-in capabilities and variants
//! (notifications, stores, shapes, office devices, birds, payments,
//! discounts, report formats and loggers), coordinators over them,
//! and a YAML scenario runner used by the `solid-harness` binary.

pub mod capabilities;
pub mod cli;
pub mod coordinators;
pub mod events;
pub mod scenario;
pub mod utilities;
pub mod variants;

pub use capabilities::{
    Binding, Capability, CapabilityHandle, CapabilityRegistry, DispatchError, Invocation,
    MethodSignature, ProbeReport, ValueKind, ValueShape, VariantHandle,
};
pub use coordinators::{
    Application, AreaCalculator, BirdCare, DataService, NotificationService, OfficeManager,
    PaymentService, PriceCalculator, ReportService,
};
pub use events::{DispatchEvent, DispatchListener, EventLog, NarrationListener};
pub use scenario::{ScenarioDef, ScenarioReport, ScenarioRunner};
pub use variants::{MethodDescriptor, Variant, VariantCatalog, VariantError, VariantFactory};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
