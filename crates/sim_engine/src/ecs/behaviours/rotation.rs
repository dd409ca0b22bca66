//! Constant spin

use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::{parse_record, Vec3Record};
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::foundation::math::Vec3;

#[derive(Debug, Deserialize)]
struct RotationData {
    name: String,
    #[serde(default)]
    rotation: Vec3Record,
}

/// Adds a fixed Euler increment to the owner's rotation on every update
///
/// The increment is per tick, not per second.
#[derive(Debug)]
pub struct RotationBehaviour {
    base: ExtensionBase,
    rotation: Vec3,
}

impl RotationBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "rotation";

    /// Create a rotation behaviour
    pub fn new(name: impl Into<String>, rotation: Vec3) -> Self {
        Self {
            base: ExtensionBase::new(name),
            rotation,
        }
    }

    /// Build from a `rotation` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: RotationData = parse_record(Self::TYPE, record)?;
        Ok(Self::new(data.name, data.rotation.to_vec3()))
    }

    /// Per-update increment
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }
}

impl Extension for RotationBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn update(&mut self, _delta_ms: f32, ctx: &mut SimContext<'_>) {
        if let Some(transform) = self.owner().and_then(|owner| ctx.scene.transform_mut(owner)) {
            transform.rotation += self.rotation;
        }
    }
}

impl Behaviour for RotationBehaviour {}
