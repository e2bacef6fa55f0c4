//! Shape variants for the `shape` capability.
//!
//! Adding a figure means adding a type with `area`, `perimeter` and `kind`;
//! nothing that computes areas needs to change.

use std::f64::consts::PI;

use serde_json::{json, Value};

use crate::variants::factory::{config_positive, VariantConfig};
use crate::variants::variant::{unknown_method, MethodDescriptor, Variant, VariantError};

fn shape_methods() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::new("area", 0, "Surface area"),
        MethodDescriptor::new("perimeter", 0, "Length of the boundary"),
        MethodDescriptor::new("kind", 0, "Name of the figure"),
    ]
}

macro_rules! impl_shape_variant {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Variant for $ty {
                fn label(&self) -> &str {
                    &self.label
                }

                fn methods(&self) -> Vec<MethodDescriptor> {
                    shape_methods()
                }

                fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, VariantError> {
                    match method {
                        "area" => Ok(json!(self.area())),
                        "perimeter" => Ok(json!(self.perimeter())),
                        "kind" => Ok(json!(stringify!($ty))),
                        _ => Err(unknown_method(&self.label, method)),
                    }
                }
            }
        )*
    };
}

/// A dimension must be finite and strictly positive.
fn dimension(name: &str, value: f64) -> Result<f64, VariantError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(VariantError::InvalidConfig(format!(
            "'{}' must be positive, got {}",
            name, value
        )))
    }
}

/// Area and perimeter must stay representable as JSON numbers.
fn measurable(label: &str, area: f64, perimeter: f64) -> Result<(), VariantError> {
    if area.is_finite() && perimeter.is_finite() {
        Ok(())
    } else {
        Err(VariantError::InvalidConfig(format!(
            "'{}' is too large: area {} and perimeter {} overflow",
            label, area, perimeter
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    label: String,
    width: f64,
    height: f64,
}

impl Rectangle {
    pub fn new(label: &str, width: f64, height: f64) -> Result<Self, VariantError> {
        let rectangle = Self {
            label: label.to_string(),
            width: dimension("width", width)?,
            height: dimension("height", height)?,
        };
        measurable(label, rectangle.area(), rectangle.perimeter())?;
        Ok(rectangle)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width + self.height)
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(
            label,
            config_positive(config, "width")?,
            config_positive(config, "height")?,
        )?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    label: String,
    radius: f64,
}

impl Circle {
    pub fn new(label: &str, radius: f64) -> Result<Self, VariantError> {
        let circle = Self {
            label: label.to_string(),
            radius: dimension("radius", radius)?,
        };
        measurable(label, circle.area(), circle.perimeter())?;
        Ok(circle)
    }

    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * PI * self.radius
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, config_positive(config, "radius")?)?))
    }
}

/// Triangle given by its base, height and the two remaining sides.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    label: String,
    base: f64,
    height: f64,
    side_a: f64,
    side_b: f64,
}

impl Triangle {
    pub fn new(
        label: &str,
        base: f64,
        height: f64,
        side_a: f64,
        side_b: f64,
    ) -> Result<Self, VariantError> {
        let base = dimension("base", base)?;
        let side_a = dimension("side_a", side_a)?;
        let side_b = dimension("side_b", side_b)?;
        if side_a + side_b <= base || base + side_a <= side_b || base + side_b <= side_a {
            return Err(VariantError::InvalidConfig(format!(
                "sides {}, {}, {} do not form a triangle",
                base, side_a, side_b
            )));
        }
        let triangle = Self {
            label: label.to_string(),
            base,
            height: dimension("height", height)?,
            side_a,
            side_b,
        };
        measurable(label, triangle.area(), triangle.perimeter())?;
        Ok(triangle)
    }

    pub fn area(&self) -> f64 {
        self.base * self.height / 2.0
    }

    pub fn perimeter(&self) -> f64 {
        self.base + self.side_a + self.side_b
    }

    pub(super) fn build(label: &str, config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(
            label,
            config_positive(config, "base")?,
            config_positive(config, "height")?,
            config_positive(config, "side_a")?,
            config_positive(config, "side_b")?,
        )?))
    }
}

impl_shape_variant!(Rectangle, Circle, Triangle);
