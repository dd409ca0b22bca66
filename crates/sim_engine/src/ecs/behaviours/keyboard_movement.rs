//! Arrow-key movement

use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::parse_record;
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::input::KeyCode;

fn default_speed() -> f32 {
    0.1
}

#[derive(Debug, Deserialize)]
struct KeyboardMovementData {
    name: String,
    #[serde(default = "default_speed")]
    speed: f32,
}

/// Moves the owner by `speed` per update along each held arrow key
#[derive(Debug)]
pub struct KeyboardMovementBehaviour {
    base: ExtensionBase,
    /// Distance per update
    pub speed: f32,
}

impl KeyboardMovementBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "keyboard-movement";

    /// Build from a `keyboard-movement` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: KeyboardMovementData = parse_record(Self::TYPE, record)?;
        Ok(Self {
            base: ExtensionBase::new(data.name),
            speed: data.speed,
        })
    }
}

impl Extension for KeyboardMovementBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn update(&mut self, _delta_ms: f32, ctx: &mut SimContext<'_>) {
        let input = ctx.input;
        let Some(transform) = self.owner().and_then(|owner| ctx.scene.transform_mut(owner)) else {
            return;
        };

        // Screen space: up is negative y
        if input.is_key_down(KeyCode::Left) {
            transform.position.x -= self.speed;
        }
        if input.is_key_down(KeyCode::Right) {
            transform.position.x += self.speed;
        }
        if input.is_key_down(KeyCode::Up) {
            transform.position.y -= self.speed;
        }
        if input.is_key_down(KeyCode::Down) {
            transform.position.y += self.speed;
        }
    }
}

impl Behaviour for KeyboardMovementBehaviour {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_speed() {
        let movement =
            KeyboardMovementBehaviour::from_record(&json!({ "type": "keyboard-movement", "name": "m" }))
                .unwrap();
        assert_eq!(movement.speed, 0.1);
    }
}
