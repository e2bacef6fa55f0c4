//! Bird variants for the `bird`, `flyable`, `swimmable` and `running`
//! capabilities.
//!
//! A bird exposes a movement only when its species has one. A penguin has no
//! `fly` method at all, so claiming `flyable` fails at registration.

use serde_json::{json, Value};

use crate::variants::factory::VariantConfig;
use crate::variants::variant::{unknown_method, MethodDescriptor, Variant, VariantError};

/// One way of getting around: top speed in km/h and how it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Movement {
    pub speed: u32,
    pub style: &'static str,
}

impl Movement {
    const fn new(speed: u32, style: &'static str) -> Self {
        Self { speed, style }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Eagle,
    Penguin,
    Duck,
    Ostrich,
}

impl Species {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eagle => "Eagle",
            Self::Penguin => "Penguin",
            Self::Duck => "Duck",
            Self::Ostrich => "Ostrich",
        }
    }

    fn sound(&self) -> &'static str {
        match self {
            Self::Eagle => "Screech!",
            Self::Penguin => "Squawk!",
            Self::Duck => "Quack quack!",
            Self::Ostrich => "Boom!",
        }
    }

    pub fn flight(&self) -> Option<Movement> {
        match self {
            Self::Eagle => Some(Movement::new(80, "soars high in the sky")),
            Self::Duck => Some(Movement::new(65, "flies over the lake")),
            Self::Penguin | Self::Ostrich => None,
        }
    }

    pub fn swimming(&self) -> Option<Movement> {
        match self {
            Self::Penguin => Some(Movement::new(35, "swims gracefully underwater")),
            Self::Duck => Some(Movement::new(8, "paddles across the pond")),
            Self::Eagle | Self::Ostrich => None,
        }
    }

    pub fn running(&self) -> Option<Movement> {
        match self {
            Self::Penguin => Some(Movement::new(5, "waddles clumsily on land")),
            Self::Ostrich => Some(Movement::new(70, "sprints across the savanna")),
            Self::Eagle | Self::Duck => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bird {
    label: String,
    species: Species,
    meals: u32,
}

impl Bird {
    pub fn new(label: &str, species: Species) -> Self {
        Self {
            label: label.to_string(),
            species,
            meals: 0,
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub(super) fn eagle(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, Species::Eagle)))
    }

    pub(super) fn penguin(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, Species::Penguin)))
    }

    pub(super) fn duck(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, Species::Duck)))
    }

    pub(super) fn ostrich(label: &str, _config: &VariantConfig) -> Result<Box<dyn Variant>, VariantError> {
        Ok(Box::new(Self::new(label, Species::Ostrich)))
    }

    fn movements(&self) -> [(&'static str, &'static str, Option<Movement>); 3] {
        [
            ("fly", "flight_speed", self.species.flight()),
            ("swim", "swim_speed", self.species.swimming()),
            ("run", "running_speed", self.species.running()),
        ]
    }

    fn moving(&self, method: &str) -> Option<Value> {
        self.movements()
            .into_iter()
            .find_map(|(action, speed, movement)| {
                let movement = movement?;
                if method == action {
                    log::info!("{} {}", self.species.name(), movement.style);
                    Some(json!(format!("{} {}", self.species.name(), movement.style)))
                } else if method == speed {
                    Some(json!(movement.speed))
                } else {
                    None
                }
            })
    }
}

impl Variant for Bird {
    fn label(&self) -> &str {
        &self.label
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        let mut methods = vec![
            MethodDescriptor::new("make_sound", 0, "The bird's call"),
            MethodDescriptor::new("eat", 0, "Feed the bird"),
            MethodDescriptor::new("sleep", 0, "Put the bird to sleep"),
        ];
        for (action, speed, movement) in self.movements() {
            if movement.is_some() {
                methods.push(MethodDescriptor::new(action, 0, "Move"));
                methods.push(MethodDescriptor::new(speed, 0, "Top speed in km/h"));
            }
        }
        methods
    }

    fn call(&mut self, method: &str, _args: &[Value]) -> Result<Value, VariantError> {
        let name = self.species.name();
        match method {
            "make_sound" => Ok(json!(format!("{} says: {}", name, self.species.sound()))),
            "eat" => {
                self.meals += 1;
                Ok(json!(format!("{} is eating (meal {})", name, self.meals)))
            }
            "sleep" => Ok(json!(format!("{} is sleeping", name))),
            _ => self
                .moving(method)
                .ok_or_else(|| unknown_method(&self.label, method)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method_names(bird: &Bird) -> Vec<String> {
        bird.methods().into_iter().map(|m| m.name).collect()
    }

    #[test]
    fn test_penguin_has_no_flight() {
        let mut penguin = Bird::new("pingu", Species::Penguin);
        let names = method_names(&penguin);
        assert!(!names.contains(&"fly".to_string()));
        assert!(names.contains(&"swim".to_string()));
        assert!(names.contains(&"running_speed".to_string()));
        assert!(matches!(
            penguin.call("fly", &[]),
            Err(VariantError::NotSupported(_))
        ));
    }

    #[test]
    fn test_duck_flies_and_swims() {
        let mut duck = Bird::new("donald", Species::Duck);
        assert_eq!(duck.call("flight_speed", &[]).unwrap(), json!(65));
        assert_eq!(duck.call("swim_speed", &[]).unwrap(), json!(8));
        assert_eq!(
            duck.call("swim", &[]).unwrap(),
            json!("Duck paddles across the pond")
        );
        assert!(duck.call("run", &[]).is_err());
    }

    #[test]
    fn test_meals_are_counted() {
        let mut ostrich = Bird::new("ozzy", Species::Ostrich);
        ostrich.call("eat", &[]).unwrap();
        assert_eq!(
            ostrich.call("eat", &[]).unwrap(),
            json!("Ostrich is eating (meal 2)")
        );
        assert_eq!(ostrich.call("make_sound", &[]).unwrap(), json!("Ostrich says: Boom!"));
    }
}
