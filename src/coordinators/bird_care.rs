//! BirdCare: looks after birds through the capabilities they claimed.
//!
//! Feeding works for any `bird`; exercise asks for the movement capability
//! it needs, so a penguin is never sent flying.

use crate::capabilities::builtin::{BIRD, FLYABLE, RUNNING, SWIMMABLE};
use crate::capabilities::{Binding, CapabilityRegistry, DispatchError};

/// What one exercise session produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub activity: String,
    /// km/h
    pub speed: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BirdCare<'r> {
    registry: &'r CapabilityRegistry,
}

impl<'r> BirdCare<'r> {
    pub fn new(registry: &'r CapabilityRegistry) -> Self {
        Self { registry }
    }

    pub fn feed(&self, bird: &Binding) -> Result<String, DispatchError> {
        self.text(bird, BIRD, "eat")
    }

    pub fn put_to_sleep(&self, bird: &Binding) -> Result<String, DispatchError> {
        self.text(bird, BIRD, "sleep")
    }

    pub fn exercise_flying(&self, bird: &Binding) -> Result<Exercise, DispatchError> {
        self.exercise(bird, FLYABLE, "fly", "flight_speed")
    }

    pub fn exercise_swimming(&self, bird: &Binding) -> Result<Exercise, DispatchError> {
        self.exercise(bird, SWIMMABLE, "swim", "swim_speed")
    }

    pub fn exercise_running(&self, bird: &Binding) -> Result<Exercise, DispatchError> {
        self.exercise(bird, RUNNING, "run", "running_speed")
    }

    fn text(&self, bird: &Binding, capability: &str, method: &str) -> Result<String, DispatchError> {
        bird.expect_capability(capability)?;
        let invocation = self.registry.call(bird, method, &[])?;
        Ok(invocation.value.as_str().unwrap_or_default().to_string())
    }

    fn exercise(
        &self,
        bird: &Binding,
        capability: &str,
        action: &str,
        speed: &str,
    ) -> Result<Exercise, DispatchError> {
        let activity = self.text(bird, capability, action)?;
        let speed = self.registry.call(bird, speed, &[])?;
        log::debug!("{} at {} km/h", activity, speed.value);
        Ok(Exercise {
            activity,
            speed: speed.value.as_f64().unwrap_or_default(),
        })
    }
}
