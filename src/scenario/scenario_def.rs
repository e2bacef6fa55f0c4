//! Scenario definition types: the YAML schema for dispatch walkthroughs.
//!
//! A scenario is pure data: which capabilities to declare, which variants to
//! build and register, and which calls to make, each with the outcome it
//! expects. The [`super::runner::ScenarioRunner`] executes it.
//!
//! # Example YAML
//!
//! ```yaml
//! scenario:
//!   name: "notifications"
//!   description: "One service, every channel"
//!   steps:
//!     - register: { label: "email", kind: "email_notifier", claims: ["notify"] }
//!     - invoke:
//!         variant: "email"
//!         capability: "notify"
//!         method: "send"
//!         args: ["Your order shipped", "ana@example.com"]
//!     - probe: { capability: "notify", method: "channel" }
//!       expect: "ok"
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ScenarioError;
use crate::capabilities::{Capability, DispatchError};
use crate::variants::VariantError;

// ============================================================================
// Top-level wrapper
// ============================================================================

/// A complete scenario loaded from YAML, wrapped in a `scenario:` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub scenario: ScenarioInner,
}

impl ScenarioDef {
    /// Parse a `ScenarioDef` from a YAML string and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        let def: Self = serde_yaml::from_str(yaml)?;
        def.validate()?;
        Ok(def)
    }

    /// Parse a `ScenarioDef` from a YAML file on disk.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Every step must carry exactly one action.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.scenario.name.trim().is_empty() {
            return Err(ScenarioError::Validation(
                "scenario name must not be empty".to_string(),
            ));
        }
        for (i, step) in self.scenario.steps.iter().enumerate() {
            let actions = [
                step.declare.is_some(),
                step.register.is_some(),
                step.invoke.is_some(),
                step.probe.is_some(),
            ]
            .iter()
            .filter(|set| **set)
            .count();
            if actions != 1 {
                return Err(ScenarioError::Validation(format!(
                    "step {} must have exactly one of declare, register, invoke or probe (found {})",
                    i + 1,
                    actions
                )));
            }
            if !step.expect.is_known() {
                return Err(ScenarioError::Validation(format!(
                    "step {}: unknown expectation '{}'",
                    i + 1,
                    step.expect
                )));
            }
            if step.expect == Expectation::Substitutable && step.probe.is_none() {
                return Err(ScenarioError::Validation(format!(
                    "step {}: 'substitutable' can only be expected from a probe",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}

/// The scenario payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInner {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Declare the bundled capabilities before the first step.
    #[serde(default = "default_true")]
    pub builtin_capabilities: bool,

    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Steps
// ============================================================================

/// One scenario step. Exactly one action field is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declare: Option<Capability>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<RegisterStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke: Option<InvokeStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeStep>,

    #[serde(default)]
    pub expect: Expectation,
}

/// A borrowed view of a step's single action.
#[derive(Debug, Clone, Copy)]
pub enum StepAction<'a> {
    Declare(&'a Capability),
    Register(&'a RegisterStep),
    Invoke(&'a InvokeStep),
    Probe(&'a ProbeStep),
}

impl Step {
    /// The step's action, `None` if the step has not been validated.
    pub fn action(&self) -> Option<StepAction<'_>> {
        if let Some(c) = &self.declare {
            Some(StepAction::Declare(c))
        } else if let Some(r) = &self.register {
            Some(StepAction::Register(r))
        } else if let Some(i) = &self.invoke {
            Some(StepAction::Invoke(i))
        } else {
            self.probe.as_ref().map(StepAction::Probe)
        }
    }
}

impl fmt::Display for StepAction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare(c) => write!(f, "declare {}", c.name),
            Self::Register(r) => write!(
                f,
                "register {} ({}) as [{}]",
                r.label,
                r.kind,
                r.claims.join(", ")
            ),
            Self::Invoke(i) => write!(f, "invoke {}.{} on {}", i.capability, i.method, i.variant),
            Self::Probe(p) => write!(f, "probe {}.{}", p.capability, p.method),
        }
    }
}

/// Build a variant from the catalog and register it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterStep {
    pub label: String,

    /// Catalog kind (e.g. `"email_notifier"`).
    pub kind: String,

    /// Capability names the variant claims.
    #[serde(default)]
    pub claims: Vec<String>,

    /// Merged over the kind's defaults.
    #[serde(default)]
    pub config: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeStep {
    pub variant: String,
    pub capability: String,
    pub method: String,

    #[serde(default)]
    pub args: Vec<Value>,

    /// When set, the result must equal this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeStep {
    pub capability: String,
    pub method: String,

    #[serde(default)]
    pub args: Vec<Value>,
}

// ============================================================================
// Expectations
// ============================================================================

/// What a step is expected to produce.
///
/// Written in YAML as `"ok"`, `"substitutable"` or an error code such as
/// `"incomplete_implementation"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Expectation {
    #[default]
    Ok,
    Substitutable,
    Error(String),
}

impl Expectation {
    /// Outcome codes produced by the runner itself.
    pub const RUNNER_CODES: &'static [&'static str] = &["not_substitutable", "unexpected_result"];

    /// Whether a step could ever produce this outcome.
    pub fn is_known(&self) -> bool {
        match self {
            Self::Ok | Self::Substitutable => true,
            Self::Error(code) => {
                let code = code.as_str();
                DispatchError::CODES.contains(&code)
                    || VariantError::CODES.contains(&code)
                    || Self::RUNNER_CODES.contains(&code)
            }
        }
    }
}

impl From<String> for Expectation {
    fn from(value: String) -> Self {
        match value.trim() {
            "ok" => Self::Ok,
            "substitutable" => Self::Substitutable,
            code => Self::Error(code.to_string()),
        }
    }
}

impl From<Expectation> for String {
    fn from(value: Expectation) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Substitutable => write!(f, "substitutable"),
            Self::Error(code) => write!(f, "{}", code),
        }
    }
}
