//! AreaCalculator: works with any `shape` variant.

use crate::capabilities::builtin::SHAPE;
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

#[derive(Debug, Clone, Copy)]
pub struct AreaCalculator<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> AreaCalculator<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn area(&self, shape: &Binding) -> Result<f64, DispatchError> {
        self.number(shape, "area")
    }

    pub fn perimeter(&self, shape: &Binding) -> Result<f64, DispatchError> {
        self.number(shape, "perimeter")
    }

    /// One line summary, e.g. `Circle: area 50.27, perimeter 25.13`.
    pub fn describe(&self, shape: &Binding) -> Result<String, DispatchError> {
        shape.expect_capability(SHAPE)?;
        let kind = self.registry.call(shape, "kind", &[])?;
        Ok(format!(
            "{}: area {:.2}, perimeter {:.2}",
            kind.value.as_str().unwrap_or_default(),
            self.area(shape)?,
            self.perimeter(shape)?
        ))
    }

    /// Sum of the areas; fails on the first binding that fails.
    pub fn total_area(&self, shapes: &[Binding]) -> Result<f64, DispatchError> {
        shapes.iter().map(|s| self.area(s)).sum()
    }

    fn number(&self, shape: &Binding, method: &str) -> Result<f64, DispatchError> {
        shape.expect_capability(SHAPE)?;
        let invocation = self.registry.call(shape, method, &[])?;
        invocation
            .value
            .as_f64()
            .ok_or_else(|| DispatchError::ContractViolation {
                variant: invocation.variant.clone(),
                method: method.to_string(),
                expected: "number".to_string(),
                actual: invocation.value.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::builtin::NOTIFY;
    use crate::variants::builtin::{Circle, EchoNotifier, Rectangle, Triangle};

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::with_builtins().unwrap();
        let shape = registry.capability_handle(SHAPE).unwrap();
        let notify = registry.capability_handle(NOTIFY).unwrap();
        registry
            .register_variant(Rectangle::new("rect", 5.0, 3.0).unwrap(), &[shape])
            .unwrap();
        registry
            .register_variant(Circle::new("circle", 4.0).unwrap(), &[shape])
            .unwrap();
        registry
            .register_variant(Triangle::new("tri", 6.0, 4.0, 5.0, 5.0).unwrap(), &[shape])
            .unwrap();
        registry
            .register_variant(EchoNotifier::new("echo"), &[notify])
            .unwrap();
        registry
    }

    fn bind(registry: &CapabilityRegistry, label: &str) -> Binding {
        registry.bind_by_name(label, SHAPE).unwrap()
    }

    #[test]
    fn test_total_area() {
        let registry = registry();
        let calculator = AreaCalculator::new(&registry);
        let shapes: Vec<Binding> = ["rect", "circle", "tri"]
            .iter()
            .map(|l| bind(&registry, l))
            .collect();
        let total = calculator.total_area(&shapes).unwrap();
        assert!((total - (15.0 + 16.0 * std::f64::consts::PI + 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_describe() {
        let registry = registry();
        let calculator = AreaCalculator::new(&registry);
        assert_eq!(
            calculator.describe(&bind(&registry, "rect")).unwrap(),
            "Rectangle: area 15.00, perimeter 16.00"
        );
    }

    #[test]
    fn test_rejects_non_shape_binding() {
        let registry = registry();
        let calculator = AreaCalculator::new(&registry);
        let echo = registry.bind_by_name("echo", NOTIFY).unwrap();
        assert_eq!(calculator.area(&echo).unwrap_err().code(), "capability_mismatch");
    }
}
