//! Scenario system: YAML walkthroughs of capability dispatch.
//!
//! A scenario declares capabilities, registers variants built from the
//! [`VariantCatalog`](crate::variants::VariantCatalog), then invokes and
//! probes them, stating the outcome each step should have. The runner
//! reports what actually happened without stopping on failures.
//!
//! # Architecture
//!
//! ```text
//!  scenario YAML ──► ScenarioDef ──► ScenarioRunner ──► ScenarioReport
//!                                        │
//!                                        ▼
//!                              fresh CapabilityRegistry
//!                              (+ listeners, builtins)
//! ```

pub mod error;
pub mod runner;
pub mod scenario_def;

pub use error::ScenarioError;
pub use runner::{Failure, Observed, ScenarioReport, ScenarioRunner, StepOutcome};
pub use scenario_def::{Expectation, InvokeStep, ProbeStep, RegisterStep, ScenarioDef, Step, StepAction};

/// Scenarios shipped with the crate, by file name.
pub const BUNDLED: &[(&str, &str)] = &[
    ("notifications.yaml", include_str!("../../scenarios/notifications.yaml")),
    ("persistence.yaml", include_str!("../../scenarios/persistence.yaml")),
    ("shapes.yaml", include_str!("../../scenarios/shapes.yaml")),
    ("office.yaml", include_str!("../../scenarios/office.yaml")),
    ("birds.yaml", include_str!("../../scenarios/birds.yaml")),
    ("commerce.yaml", include_str!("../../scenarios/commerce.yaml")),
    ("reporting.yaml", include_str!("../../scenarios/reporting.yaml")),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scenarios_pass() {
        let runner = ScenarioRunner::new();
        for (file, yaml) in BUNDLED {
            let report = runner
                .run_yaml(yaml)
                .unwrap_or_else(|e| panic!("{} failed to load: {}", file, e));
            assert!(!report.outcomes.is_empty(), "{} has no steps", file);
            assert!(report.passed(), "{}: {:#?}", file, report.failures());
        }
    }
}
