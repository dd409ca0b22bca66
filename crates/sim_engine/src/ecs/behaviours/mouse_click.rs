//! Clickable rectangle anchored at the owner

use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::parse_record;
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::events::{codes, Message};
use crate::foundation::math::{Vec2, Vec3};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MouseClickData {
    name: String,
    width: f32,
    height: f32,
    message_code: String,
}

/// Posts `message_code` when the mouse is released over the owner
///
/// The hit area spans `width x height` from the owner's world position; the
/// right edge is exclusive, the bottom edge inclusive. Hidden owners ignore
/// clicks.
#[derive(Debug)]
pub struct MouseClickBehaviour {
    base: ExtensionBase,
    width: f32,
    height: f32,
    message_code: String,
}

impl MouseClickBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "mouse-click";

    /// Build from a `mouse-click` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: MouseClickData = parse_record(Self::TYPE, record)?;
        Ok(Self {
            base: ExtensionBase::new(data.name),
            width: data.width,
            height: data.height,
            message_code: data.message_code,
        })
    }

    /// Whether `point` hits the area anchored at `anchor`
    pub fn hit(&self, anchor: Vec3, point: Vec2) -> bool {
        point.x >= anchor.x
            && point.x < anchor.x + self.width
            && point.y >= anchor.y
            && point.y <= anchor.y + self.height
    }
}

impl Extension for MouseClickBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![codes::MOUSE_UP.to_string()]
    }

    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        if message.code != codes::MOUSE_UP {
            return;
        }
        let (Some(owner), Some(mouse)) = (self.owner(), message.mouse()) else {
            return;
        };
        if !ctx.scene.is_visible(owner) {
            return;
        }
        let Some(anchor) = ctx.scene.world_position(owner) else {
            return;
        };

        if self.hit(anchor, mouse.position) {
            ctx.send(self.message_code.clone(), None);
        }
    }
}

impl Behaviour for MouseClickBehaviour {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_edges() {
        let click = MouseClickBehaviour::from_record(&json!({
            "type": "mouse-click",
            "name": "playButton",
            "width": 104,
            "height": 58,
            "messageCode": "GAME_RESET"
        }))
        .unwrap();
        let anchor = Vec3::new(100.0, 200.0, 0.0);

        assert!(click.hit(anchor, Vec2::new(100.0, 200.0)));
        assert!(click.hit(anchor, Vec2::new(150.0, 258.0)));
        assert!(!click.hit(anchor, Vec2::new(204.0, 220.0)));
        assert!(!click.hit(anchor, Vec2::new(150.0, 199.0)));
    }

    #[test]
    fn test_message_code_is_required() {
        let err = MouseClickBehaviour::from_record(&json!({
            "type": "mouse-click",
            "name": "b",
            "width": 1,
            "height": 1
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }
}
