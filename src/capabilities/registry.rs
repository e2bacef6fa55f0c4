//! Capability Registry: declarations, variant registrations and dispatch.
//!
//! The registry only grows: capabilities are declared, variants are
//! registered against them, and then any number of `invoke` calls are routed
//! to whichever variant the caller names. Dispatch never branches on a
//! variant's concrete type; it only consults the capability's declared
//! method set.
//!
//! ```text
//! declare_capability("notify", [send/2, channel/0])
//!   → register_variant(EchoNotifier, [notify])    (completeness checked here)
//!     → invoke(echo, notify, "send", ["hi", "bob"])
//!         → signature check → Variant::call → return contract check
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;

use super::builtin;
use super::capability::{Capability, MethodSignature, ValueKind, ValueShape};
use super::error::DispatchError;
use crate::events::{DispatchEvent, DispatchEventKind, DispatchListener};
use crate::variants::Variant;

static REGISTRY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque reference to a declared capability.
///
/// Handles are scoped to the registry that minted them; using one with a
/// different registry fails with `UnknownCapability`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityHandle {
    registry: u64,
    index: usize,
}

/// Opaque reference to a registered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariantHandle {
    registry: u64,
    index: usize,
}

/// A validated (variant, capability) pair.
///
/// This is what coordinators hold: it names the capability it speaks for and
/// nothing about the concrete type behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    variant: VariantHandle,
    capability: CapabilityHandle,
    variant_label: String,
    capability_name: String,
}

impl Binding {
    pub fn variant(&self) -> VariantHandle {
        self.variant
    }

    pub fn capability(&self) -> CapabilityHandle {
        self.capability
    }

    pub fn variant_label(&self) -> &str {
        &self.variant_label
    }

    pub fn capability_name(&self) -> &str {
        &self.capability_name
    }

    /// Fail with `CapabilityMismatch` unless this binding speaks for `expected`.
    pub fn expect_capability(&self, expected: &str) -> Result<(), DispatchError> {
        if self.capability_name == expected {
            Ok(())
        } else {
            Err(DispatchError::CapabilityMismatch {
                expected: expected.to_string(),
                actual: self.capability_name.clone(),
            })
        }
    }
}

/// The result of a successful `invoke`.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub variant: String,
    pub capability: String,
    pub method: String,
    pub value: Value,
}

impl Invocation {
    pub fn shape(&self) -> ValueShape {
        ValueShape::of(&self.value)
    }
}

/// Per-variant outcome of a substitutability probe.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub variant: String,
    /// The result shape, or the error code and message.
    pub result: Result<ValueShape, (String, String)>,
}

/// Every variant of one capability called through the same path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub capability: String,
    pub method: String,
    pub outcomes: Vec<ProbeOutcome>,
}

impl ProbeReport {
    /// True when at least one variant answered, all succeeded, and all
    /// results share one shape.
    pub fn is_substitutable(&self) -> bool {
        let mut shapes = self.outcomes.iter().map(|o| o.result.as_ref().ok());
        match shapes.next() {
            Some(Some(first)) => shapes.all(|s| s == Some(first)),
            _ => false,
        }
    }

    /// Variants whose outcome differs from the first variant's.
    pub fn divergent(&self) -> Vec<&str> {
        let first = match self.outcomes.first() {
            Some(o) => &o.result,
            None => return Vec::new(),
        };
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err() || o.result != *first)
            .map(|o| o.variant.as_str())
            .collect()
    }
}

/// A registered variant and the capabilities it claimed.
struct VariantEntry {
    label: String,
    claims: Vec<CapabilityHandle>,
    cell: Mutex<Box<dyn Variant>>,
}

/// Holds declared capabilities and the variants registered against them.
pub struct CapabilityRegistry {
    id: u64,
    capabilities: Vec<Capability>,
    capability_index: HashMap<String, usize>,
    variants: Vec<VariantEntry>,
    variant_index: HashMap<String, usize>,
    listeners: Vec<Arc<dyn DispatchListener>>,
    sequence: AtomicU64,
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("id", &self.id)
            .field("capabilities", &self.capability_index.keys().collect::<Vec<_>>())
            .field("variants", &self.variant_index.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            id: REGISTRY_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            capabilities: Vec::new(),
            capability_index: HashMap::new(),
            variants: Vec::new(),
            variant_index: HashMap::new(),
            listeners: Vec::new(),
            sequence: AtomicU64::new(1),
        }
    }

    /// Create a registry with the built-in capabilities declared.
    pub fn with_builtins() -> Result<Self, DispatchError> {
        let mut registry = Self::new();
        registry.declare_builtin_capabilities()?;
        Ok(registry)
    }

    /// Attach a listener that receives every subsequent event.
    pub fn add_listener(&mut self, listener: Arc<dyn DispatchListener>) {
        self.listeners.push(listener);
    }

    // -----------------------------------------------------------------------
    // Declaration
    // -----------------------------------------------------------------------

    /// Declare a capability from a name and its method signatures.
    pub fn declare_capability(
        &mut self,
        name: &str,
        methods: Vec<MethodSignature>,
    ) -> Result<CapabilityHandle, DispatchError> {
        self.declare(Capability::new(name, methods))
    }

    /// Declare a fully described capability.
    pub fn declare(&mut self, capability: Capability) -> Result<CapabilityHandle, DispatchError> {
        if self.capability_index.contains_key(&capability.name) {
            log::warn!("Rejected duplicate capability '{}'", capability.name);
            return Err(DispatchError::DuplicateCapability {
                name: capability.name,
            });
        }
        capability
            .validate()
            .map_err(|reason| DispatchError::InvalidCapability {
                name: capability.name.clone(),
                reason,
            })?;

        let index = self.capabilities.len();
        log::debug!(
            "Declared capability '{}' with {} method(s)",
            capability.name,
            capability.methods.len()
        );
        let methods = capability.methods.iter().map(|m| m.key()).collect();
        self.capability_index.insert(capability.name.clone(), index);
        let name = capability.name.clone();
        self.capabilities.push(capability);
        self.emit(DispatchEventKind::CapabilityDeclared {
            capability: name,
            methods,
        });

        Ok(CapabilityHandle {
            registry: self.id,
            index,
        })
    }

    /// Declare every built-in capability (notify, store, shape, office
    /// devices, birds, commerce and reporting).
    pub fn declare_builtin_capabilities(&mut self) -> Result<Vec<CapabilityHandle>, DispatchError> {
        let mut handles = Vec::new();
        for (_, yaml) in builtin::DEFINITIONS {
            for capability in parse_definitions(yaml)? {
                handles.push(self.declare(capability)?);
            }
        }
        Ok(handles)
    }

    /// Declare capabilities from a YAML file.
    /// The file can contain a single `capability:` or a `capabilities:` list.
    ///
    /// The file is declared as a whole or not at all.
    pub fn register_from_file(&mut self, path: &Path) -> Result<usize, DispatchError> {
        let content = std::fs::read_to_string(path)?;
        let definitions = parse_definitions(&content)?;
        self.check_batch(&definitions)?;
        let count = definitions.len();
        for capability in definitions {
            self.declare(capability)?;
        }
        Ok(count)
    }

    fn check_batch(&self, definitions: &[Capability]) -> Result<(), DispatchError> {
        let mut names = HashSet::new();
        for capability in definitions {
            if self.capability_index.contains_key(&capability.name)
                || !names.insert(capability.name.as_str())
            {
                return Err(DispatchError::DuplicateCapability {
                    name: capability.name.clone(),
                });
            }
            capability
                .validate()
                .map_err(|reason| DispatchError::InvalidCapability {
                    name: capability.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// Declare capabilities from all YAML files in a directory (recursive).
    ///
    /// Files that fail to parse or declare are logged and skipped.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, DispatchError> {
        let mut count = 0;
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                count += self.load_directory(&path)?;
            } else if path
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
            {
                match self.register_from_file(&path) {
                    Ok(n) => count += n,
                    Err(e) => {
                        log::warn!("Failed to load capability from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Register a variant against the capabilities it claims.
    pub fn register_variant<V: Variant + 'static>(
        &mut self,
        variant: V,
        capabilities: &[CapabilityHandle],
    ) -> Result<VariantHandle, DispatchError> {
        self.register_boxed(Box::new(variant), capabilities)
    }

    /// Register an already boxed variant (e.g. one built by a `VariantCatalog`).
    ///
    /// Fails with `IncompleteImplementation` when the variant does not expose
    /// every method (name and arity) of every claimed capability. Nothing is
    /// registered on failure.
    pub fn register_boxed(
        &mut self,
        variant: Box<dyn Variant>,
        capabilities: &[CapabilityHandle],
    ) -> Result<VariantHandle, DispatchError> {
        let label = variant.label().to_string();
        match self.check_registration(variant.as_ref(), capabilities) {
            Ok(claims) => {
                let index = self.variants.len();
                let names: Vec<String> = claims
                    .iter()
                    .map(|h| self.capabilities[h.index].name.clone())
                    .collect();
                log::debug!("Registered variant '{}' for [{}]", label, names.join(", "));
                self.variant_index.insert(label.clone(), index);
                self.variants.push(VariantEntry {
                    label: label.clone(),
                    claims,
                    cell: Mutex::new(variant),
                });
                self.emit(DispatchEventKind::VariantRegistered {
                    variant: label,
                    capabilities: names,
                });
                Ok(VariantHandle {
                    registry: self.id,
                    index,
                })
            }
            Err(err) => {
                log::warn!("Rejected variant '{}': {}", label, err);
                self.emit(DispatchEventKind::RegistrationRejected {
                    variant: label,
                    code: err.code().to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn check_registration(
        &self,
        variant: &dyn Variant,
        capabilities: &[CapabilityHandle],
    ) -> Result<Vec<CapabilityHandle>, DispatchError> {
        let label = variant.label();
        if self.variant_index.contains_key(label) {
            return Err(DispatchError::DuplicateVariant {
                label: label.to_string(),
            });
        }

        let exposed = variant.methods();
        let mut claims: Vec<CapabilityHandle> = Vec::new();
        for handle in capabilities {
            let capability = self.resolve_capability(*handle)?;
            if claims.contains(handle) {
                continue;
            }
            let missing: Vec<String> = capability
                .methods
                .iter()
                .filter(|sig| {
                    !exposed
                        .iter()
                        .any(|d| d.name == sig.name && d.arity == sig.arity())
                })
                .map(|sig| sig.key())
                .collect();
            if !missing.is_empty() {
                return Err(DispatchError::IncompleteImplementation {
                    variant: label.to_string(),
                    capability: capability.name.clone(),
                    missing,
                });
            }
            claims.push(*handle);
        }
        Ok(claims)
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Route a call to a variant, restricted to the surface of `capability`.
    ///
    /// Returns only after the variant's effect is observable.
    pub fn invoke(
        &self,
        variant: VariantHandle,
        capability: CapabilityHandle,
        method: &str,
        args: &[Value],
    ) -> Result<Invocation, DispatchError> {
        let entry = self.resolve_variant(variant)?;
        let cap = self.resolve_capability(capability)?;

        match self.dispatch(entry, capability, cap, method, args) {
            Ok(value) => {
                log::debug!("{}.{} via '{}' succeeded", cap.name, method, entry.label);
                self.emit(DispatchEventKind::InvocationCompleted {
                    variant: entry.label.clone(),
                    capability: cap.name.clone(),
                    method: method.to_string(),
                    result: value.clone(),
                });
                Ok(Invocation {
                    variant: entry.label.clone(),
                    capability: cap.name.clone(),
                    method: method.to_string(),
                    value,
                })
            }
            Err(err) => {
                log::warn!("{}.{} via '{}' failed: {}", cap.name, method, entry.label, err);
                self.emit(DispatchEventKind::InvocationFailed {
                    variant: entry.label.clone(),
                    capability: cap.name.clone(),
                    method: method.to_string(),
                    code: err.code().to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn dispatch(
        &self,
        entry: &VariantEntry,
        handle: CapabilityHandle,
        capability: &Capability,
        method: &str,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        if !entry.claims.contains(&handle) {
            return Err(DispatchError::CapabilityNotClaimed {
                variant: entry.label.clone(),
                capability: capability.name.clone(),
            });
        }
        let signature =
            capability
                .method(method)
                .ok_or_else(|| DispatchError::UnsupportedOperation {
                    capability: capability.name.clone(),
                    method: method.to_string(),
                })?;
        check_arguments(signature, args)?;

        let value = {
            let mut variant = entry.cell.lock();
            variant
                .call(method, args)
                .map_err(|source| DispatchError::VariantExecution {
                    variant: entry.label.clone(),
                    method: method.to_string(),
                    source,
                })?
        };

        if !signature.returns.accepts(&value) {
            return Err(DispatchError::ContractViolation {
                variant: entry.label.clone(),
                method: method.to_string(),
                expected: signature.returns.to_string(),
                actual: ValueKind::of(&value).to_string(),
            });
        }
        Ok(value)
    }

    /// Validate a (variant, capability) pair once for repeated calls.
    pub fn bind(
        &self,
        variant: VariantHandle,
        capability: CapabilityHandle,
    ) -> Result<Binding, DispatchError> {
        let entry = self.resolve_variant(variant)?;
        let cap = self.resolve_capability(capability)?;
        if !entry.claims.contains(&capability) {
            return Err(DispatchError::CapabilityNotClaimed {
                variant: entry.label.clone(),
                capability: cap.name.clone(),
            });
        }
        Ok(Binding {
            variant,
            capability,
            variant_label: entry.label.clone(),
            capability_name: cap.name.clone(),
        })
    }

    /// Bind by variant label and capability name.
    pub fn bind_by_name(&self, label: &str, capability: &str) -> Result<Binding, DispatchError> {
        let variant = self.variant_handle(label)?;
        let capability = self.capability_handle(capability)?;
        self.bind(variant, capability)
    }

    /// Invoke through a binding.
    pub fn call(
        &self,
        binding: &Binding,
        method: &str,
        args: &[Value],
    ) -> Result<Invocation, DispatchError> {
        self.invoke(binding.variant, binding.capability, method, args)
    }

    /// Call `method` on every variant registered against `capability`, in
    /// registration order, and report each result shape.
    pub fn probe(
        &self,
        capability: CapabilityHandle,
        method: &str,
        args: &[Value],
    ) -> Result<ProbeReport, DispatchError> {
        let cap = self.resolve_capability(capability)?;
        if cap.method(method).is_none() {
            return Err(DispatchError::UnsupportedOperation {
                capability: cap.name.clone(),
                method: method.to_string(),
            });
        }

        let outcomes = self
            .variants_of(capability)
            .into_iter()
            .map(|variant| {
                let label = self.variants[variant.index].label.clone();
                let result = self
                    .invoke(variant, capability, method, args)
                    .map(|inv| inv.shape())
                    .map_err(|e| (e.code().to_string(), e.to_string()));
                ProbeOutcome {
                    variant: label,
                    result,
                }
            })
            .collect();

        Ok(ProbeReport {
            capability: cap.name.clone(),
            method: method.to_string(),
            outcomes,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get a capability definition by handle.
    pub fn capability(&self, handle: CapabilityHandle) -> Result<&Capability, DispatchError> {
        self.resolve_capability(handle)
    }

    /// Look up a capability handle by name.
    pub fn capability_handle(&self, name: &str) -> Result<CapabilityHandle, DispatchError> {
        self.capability_index
            .get(name)
            .map(|&index| CapabilityHandle {
                registry: self.id,
                index,
            })
            .ok_or_else(|| DispatchError::UnknownCapability(name.to_string()))
    }

    /// Look up a variant handle by label.
    pub fn variant_handle(&self, label: &str) -> Result<VariantHandle, DispatchError> {
        self.variant_index
            .get(label)
            .map(|&index| VariantHandle {
                registry: self.id,
                index,
            })
            .ok_or_else(|| DispatchError::UnknownVariant(label.to_string()))
    }

    /// Label of a registered variant.
    pub fn variant_label(&self, handle: VariantHandle) -> Result<&str, DispatchError> {
        self.resolve_variant(handle).map(|e| e.label.as_str())
    }

    /// Variants registered against a capability, in registration order.
    pub fn variants_of(&self, capability: CapabilityHandle) -> Vec<VariantHandle> {
        self.variants
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.claims.contains(&capability))
            .map(|(index, _)| VariantHandle {
                registry: self.id,
                index,
            })
            .collect()
    }

    /// Capabilities a variant claimed.
    pub fn capabilities_of(&self, variant: VariantHandle) -> Result<Vec<&Capability>, DispatchError> {
        let entry = self.resolve_variant(variant)?;
        Ok(entry
            .claims
            .iter()
            .map(|h| &self.capabilities[h.index])
            .collect())
    }

    /// List all declared capabilities in declaration order.
    pub fn list_capabilities(&self) -> Vec<&Capability> {
        self.capabilities.iter().collect()
    }

    /// List all variant labels in registration order.
    pub fn list_variants(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.label.as_str()).collect()
    }

    /// Search capabilities by tag.
    pub fn search_by_tag(&self, tag: &str) -> Vec<&Capability> {
        self.capabilities
            .iter()
            .filter(|c| c.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Get the total number of declared capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Check if no capability is declared.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn resolve_capability(&self, handle: CapabilityHandle) -> Result<&Capability, DispatchError> {
        if handle.registry != self.id {
            return Err(DispatchError::UnknownCapability(format!(
                "handle from registry #{}",
                handle.registry
            )));
        }
        self.capabilities
            .get(handle.index)
            .ok_or_else(|| DispatchError::UnknownCapability(format!("#{}", handle.index)))
    }

    fn resolve_variant(&self, handle: VariantHandle) -> Result<&VariantEntry, DispatchError> {
        if handle.registry != self.id {
            return Err(DispatchError::UnknownVariant(format!(
                "handle from registry #{}",
                handle.registry
            )));
        }
        self.variants
            .get(handle.index)
            .ok_or_else(|| DispatchError::UnknownVariant(format!("#{}", handle.index)))
    }

    fn emit(&self, kind: DispatchEventKind) {
        if self.listeners.is_empty() {
            return;
        }
        let event = DispatchEvent::new(self.sequence.fetch_add(1, Ordering::Relaxed), kind);
        for listener in &self.listeners {
            listener.on_event(&event);
        }
    }
}

fn check_arguments(signature: &MethodSignature, args: &[Value]) -> Result<(), DispatchError> {
    if args.len() != signature.arity() {
        return Err(DispatchError::ArgumentMismatch {
            method: signature.name.clone(),
            reason: format!(
                "expected {} argument(s), got {}",
                signature.arity(),
                args.len()
            ),
        });
    }
    for (param, arg) in signature.params.iter().zip(args) {
        if !param.kind.accepts(arg) {
            return Err(DispatchError::ArgumentMismatch {
                method: signature.name.clone(),
                reason: format!(
                    "'{}' expects {}, got {}",
                    param.name,
                    param.kind,
                    ValueKind::of(arg)
                ),
            });
        }
    }
    Ok(())
}

/// Wrapper for YAML list of capabilities
#[derive(Debug, Deserialize)]
struct CapabilityListWrapper {
    capabilities: Vec<Capability>,
}

/// Parse a YAML document holding either `capability:` or `capabilities:`.
pub fn parse_definitions(yaml: &str) -> Result<Vec<Capability>, serde_yaml::Error> {
    if let Ok(capability) = Capability::from_yaml(yaml) {
        return Ok(vec![capability]);
    }
    let list: CapabilityListWrapper = serde_yaml::from_str(yaml)?;
    Ok(list.capabilities)
}
