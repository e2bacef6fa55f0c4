//! Scenario runner: executes a [`ScenarioDef`] against a fresh registry.
//!
//! Every run starts from an empty [`CapabilityRegistry`] so scenarios never
//! see each other's variants. A failing step is recorded and the run moves
//! on; only a malformed scenario stops it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};

use super::error::ScenarioError;
use super::scenario_def::{Expectation, InvokeStep, ProbeStep, RegisterStep, ScenarioDef, StepAction};
use crate::capabilities::{Capability, CapabilityHandle, CapabilityRegistry, DispatchError};
use crate::events::DispatchListener;
use crate::variants::{VariantCatalog, VariantError};

// ============================================================================
// Outcomes
// ============================================================================

/// Error code and message of a failed step.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub code: String,
    pub message: String,
}

impl Failure {
    fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl From<DispatchError> for Failure {
    fn from(err: DispatchError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

impl From<VariantError> for Failure {
    fn from(err: VariantError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

/// What a step actually produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// The action succeeded. Holds the invocation result, or the declared or
    /// registered name.
    Completed(Value),
    /// A probe ran; lists the variants whose outcome diverged.
    Probed {
        substitutable: bool,
        divergent: Vec<String>,
    },
    Failed(Failure),
}

impl Observed {
    /// Short code comparable with an [`Expectation`].
    pub fn code(&self) -> &str {
        match self {
            Self::Completed(_) => "ok",
            Self::Probed {
                substitutable: true,
                ..
            } => "substitutable",
            Self::Probed { .. } => "not_substitutable",
            Self::Failed(failure) => &failure.code,
        }
    }

    fn satisfies(&self, expected: &Expectation) -> bool {
        match (expected, self) {
            (Expectation::Ok, Self::Completed(_) | Self::Probed { .. }) => true,
            (Expectation::Substitutable, Self::Probed { substitutable, .. }) => *substitutable,
            (Expectation::Error(code), observed) => observed.code() == code,
            _ => false,
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(value) => write!(f, "ok: {}", value),
            Self::Probed {
                substitutable: true,
                ..
            } => write!(f, "substitutable"),
            Self::Probed { divergent, .. } => {
                write!(f, "not substitutable, divergent: {}", divergent.join(", "))
            }
            Self::Failed(failure) => write!(f, "{}: {}", failure.code, failure.message),
        }
    }
}

/// The result of one step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// 1-based step number.
    pub index: usize,
    pub action: String,
    pub expected: Expectation,
    pub observed: Observed,
    pub passed: bool,
}

/// The result of a whole scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub name: String,
    pub description: String,
    pub outcomes: Vec<StepOutcome>,
}

impl ScenarioReport {
    /// True when every step produced its expected outcome.
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failures(&self) -> Vec<&StepOutcome> {
        self.outcomes.iter().filter(|o| !o.passed).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} steps as expected",
            self.name,
            self.passed_count(),
            self.outcomes.len()
        )
    }
}

// ============================================================================
// ScenarioRunner
// ============================================================================

/// Runs scenarios with a variant catalog and a set of listeners.
pub struct ScenarioRunner {
    catalog: VariantCatalog,
    listeners: Vec<Arc<dyn DispatchListener>>,
    capability_dir: Option<PathBuf>,
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioRunner {
    /// Create a runner with every built-in variant kind available.
    pub fn new() -> Self {
        Self::with_catalog(VariantCatalog::with_builtins())
    }

    pub fn with_catalog(catalog: VariantCatalog) -> Self {
        Self {
            catalog,
            listeners: Vec::new(),
            capability_dir: None,
        }
    }

    /// Also declare every capability file under `dir` before each run.
    pub fn with_capability_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.capability_dir = Some(dir.into());
        self
    }

    /// Attach a listener to the registry of every subsequent run.
    pub fn add_listener(&mut self, listener: Arc<dyn DispatchListener>) {
        self.listeners.push(listener);
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut VariantCatalog {
        &mut self.catalog
    }

    /// Load and run a scenario file.
    pub fn run_file(&self, path: &Path) -> Result<ScenarioReport, ScenarioError> {
        let def = ScenarioDef::from_yaml_file(path)?;
        self.run(&def)
    }

    /// Parse and run a scenario from a YAML string.
    pub fn run_yaml(&self, yaml: &str) -> Result<ScenarioReport, ScenarioError> {
        let def = ScenarioDef::from_yaml(yaml)?;
        self.run(&def)
    }

    /// Run every step of `def` in order.
    pub fn run(&self, def: &ScenarioDef) -> Result<ScenarioReport, ScenarioError> {
        def.validate()?;
        let mut registry = self.prepare(def)?;
        log::info!(
            "Running scenario '{}' ({} steps)",
            def.scenario.name,
            def.scenario.steps.len()
        );

        let mut outcomes = Vec::with_capacity(def.scenario.steps.len());
        for (i, step) in def.scenario.steps.iter().enumerate() {
            let action = step.action().ok_or_else(|| {
                ScenarioError::Validation(format!("step {} has no action", i + 1))
            })?;
            let observed = match self.execute(&mut registry, action) {
                Ok(observed) => observed,
                Err(failure) => Observed::Failed(failure),
            };
            let passed = observed.satisfies(&step.expect);
            if passed {
                log::debug!("Step {} '{}': {}", i + 1, action, observed);
            } else {
                log::warn!(
                    "Step {} '{}': expected {}, got {}",
                    i + 1,
                    action,
                    step.expect,
                    observed
                );
            }
            outcomes.push(StepOutcome {
                index: i + 1,
                action: action.to_string(),
                expected: step.expect.clone(),
                observed,
                passed,
            });
        }

        let report = ScenarioReport {
            name: def.scenario.name.clone(),
            description: def.scenario.description.clone(),
            outcomes,
        };
        log::info!("{}", report.summary());
        Ok(report)
    }

    fn prepare(&self, def: &ScenarioDef) -> Result<CapabilityRegistry, ScenarioError> {
        let mut registry = CapabilityRegistry::new();
        for listener in &self.listeners {
            registry.add_listener(Arc::clone(listener));
        }
        if def.scenario.builtin_capabilities {
            registry.declare_builtin_capabilities()?;
        }
        if let Some(dir) = &self.capability_dir {
            let count = registry.load_directory(dir)?;
            log::debug!("Loaded {} capabilities from {}", count, dir.display());
        }
        Ok(registry)
    }

    fn execute(
        &self,
        registry: &mut CapabilityRegistry,
        action: StepAction<'_>,
    ) -> Result<Observed, Failure> {
        match action {
            StepAction::Declare(capability) => declare(registry, capability),
            StepAction::Register(step) => self.register(registry, step),
            StepAction::Invoke(step) => invoke(registry, step),
            StepAction::Probe(step) => probe(registry, step),
        }
    }

    fn register(
        &self,
        registry: &mut CapabilityRegistry,
        step: &RegisterStep,
    ) -> Result<Observed, Failure> {
        let claims = step
            .claims
            .iter()
            .map(|name| registry.capability_handle(name))
            .collect::<Result<Vec<CapabilityHandle>, _>>()?;
        let variant = self.catalog.create(&step.kind, &step.label, &step.config)?;
        registry.register_boxed(variant, &claims)?;
        Ok(Observed::Completed(json!(step.label)))
    }
}

fn declare(registry: &mut CapabilityRegistry, capability: &Capability) -> Result<Observed, Failure> {
    registry.declare(capability.clone())?;
    Ok(Observed::Completed(json!(capability.name)))
}

fn invoke(registry: &CapabilityRegistry, step: &InvokeStep) -> Result<Observed, Failure> {
    let variant = registry.variant_handle(&step.variant)?;
    let capability = registry.capability_handle(&step.capability)?;
    let invocation = registry.invoke(variant, capability, &step.method, &step.args)?;
    if let Some(expected) = &step.returns {
        if !values_match(expected, &invocation.value) {
            return Err(Failure::new(
                "unexpected_result",
                format!("expected {}, got {}", expected, invocation.value),
            ));
        }
    }
    Ok(Observed::Completed(invocation.value))
}

fn probe(registry: &CapabilityRegistry, step: &ProbeStep) -> Result<Observed, Failure> {
    let capability = registry.capability_handle(&step.capability)?;
    let report = registry.probe(capability, &step.method, &step.args)?;
    Ok(Observed::Probed {
        substitutable: report.is_substitutable(),
        divergent: report.divergent().into_iter().map(str::to_string).collect(),
    })
}

/// JSON equality where numbers compare by value (`15` matches `15.0`).
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() <= 1e-9 * a.abs().max(1.0),
            _ => a == b,
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_match(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, x)| b.get(k).map_or(false, |y| values_match(x, y)))
        }
        _ => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    #[test]
    fn test_run_records_every_step() {
        let yaml = r#"
scenario:
  name: "mixed"
  steps:
    - register: { label: "echo", kind: "echo_notifier", claims: ["notify"] }
    - invoke:
        variant: "echo"
        capability: "notify"
        method: "send"
        args: ["hi", "bob"]
        returns: true
    - invoke: { variant: "echo", capability: "notify", method: "shout" }
      expect: "unsupported_operation"
    - invoke: { variant: "echo", capability: "notify", method: "channel" }
      expect: "variant_execution"
"#;
        let report = ScenarioRunner::new().run_yaml(yaml).unwrap();
        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.passed_count(), 3);
        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 4);
        assert_eq!(failures[0].observed.code(), "ok");
        assert!(!report.passed());
    }

    #[test]
    fn test_unknown_kind_is_a_step_failure() {
        let yaml = r#"
scenario:
  name: "bad-kind"
  steps:
    - register: { label: "t", kind: "teleporter", claims: ["notify"] }
      expect: "invalid_config"
    - register: { label: "e", kind: "echo_notifier", claims: ["telepathy"] }
      expect: "unknown_capability"
"#;
        let report = ScenarioRunner::new().run_yaml(yaml).unwrap();
        assert!(report.passed(), "{:?}", report.failures());
    }

    #[test]
    fn test_runs_are_isolated() {
        let yaml = r#"
scenario:
  name: "isolated"
  steps:
    - register: { label: "echo", kind: "echo_notifier", claims: ["notify"] }
"#;
        let runner = ScenarioRunner::new();
        assert!(runner.run_yaml(yaml).unwrap().passed());
        // a second run does not see the first run's variant
        assert!(runner.run_yaml(yaml).unwrap().passed());
    }

    #[test]
    fn test_listeners_receive_events() {
        let log = Arc::new(EventLog::new());
        let mut runner = ScenarioRunner::new();
        runner.add_listener(log.clone());
        let yaml = r#"
scenario:
  name: "events"
  builtin_capabilities: false
  steps:
    - declare:
        name: "audit"
        methods:
          - name: "send"
            params: [{ name: "message", kind: "string" }, { name: "recipient", kind: "string" }]
            returns: "bool"
    - register: { label: "echo", kind: "echo_notifier", claims: ["audit"] }
    - invoke: { variant: "echo", capability: "audit", method: "send", args: ["x", "y"] }
"#;
        assert!(runner.run_yaml(yaml).unwrap().passed());
        assert_eq!(
            log.event_types(),
            vec!["capability_declared", "variant_registered", "invocation_completed"]
        );
    }

    #[test]
    fn test_capability_dir_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ping.yaml"),
            r#"
capability:
  name: "ping"
  methods:
    - name: "channel"
      returns: "string"
"#,
        )
        .unwrap();
        let runner = ScenarioRunner::new().with_capability_dir(dir.path());
        let yaml = r#"
scenario:
  name: "dir"
  steps:
    - register: { label: "echo", kind: "echo_notifier", claims: ["ping"] }
    - invoke: { variant: "echo", capability: "ping", method: "channel", returns: "Echo" }
"#;
        let report = runner.run_yaml(yaml).unwrap();
        assert!(report.passed(), "{:?}", report.failures());
    }

    #[test]
    fn test_not_substitutable_probe() {
        let yaml = r#"
scenario:
  name: "diverging"
  steps:
    - declare:
        name: "history"
        methods:
          - name: "outbox"
            returns: "array"
    - register: { label: "echo", kind: "echo_notifier", claims: ["notify", "history"] }
    - register: { label: "mail", kind: "email_notifier", claims: ["notify", "history"] }
    - invoke: { variant: "echo", capability: "notify", method: "send", args: ["hi", "bob"] }
    - probe: { capability: "history", method: "outbox" }
      expect: "not_substitutable"
"#;
        let report = ScenarioRunner::new().run_yaml(yaml).unwrap();
        assert!(report.passed(), "{:?}", report.failures());
        match &report.outcomes[4].observed {
            Observed::Probed { divergent, .. } => assert_eq!(divergent, &vec!["mail".to_string()]),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_scenario_is_an_error() {
        assert!(ScenarioRunner::new().run_yaml("scenario: [1, 2]").is_err());
    }

    #[test]
    fn test_values_match_numbers_by_value() {
        assert!(values_match(&json!(15), &json!(15.0)));
        assert!(values_match(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2.0]})));
        assert!(!values_match(&json!(1), &json!("1")));
    }
}
