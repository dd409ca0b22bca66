//! Static textured quad

use serde::Deserialize;
use serde_json::Value;

use crate::ecs::record::{parse_record, Vec3Record};
use crate::ecs::{Component, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::render::{DrawCommand, RenderContext, Uniform, MODEL_UNIFORM};

pub(crate) fn default_size() -> f32 {
    100.0
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpriteData {
    #[serde(default)]
    name: String,
    material_name: String,
    #[serde(default = "default_size")]
    width: f32,
    #[serde(default = "default_size")]
    height: f32,
    #[serde(default)]
    origin: Vec3Record,
}

/// Quad geometry shared by the sprite components
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    /// Material to draw with
    pub material: String,
    /// Width in world units
    pub width: f32,
    /// Height in world units
    pub height: f32,
    /// Normalised pivot
    pub origin: Vec3,
}

impl Quad {
    /// Bind `world` as the model matrix and draw the quad with the given UVs
    pub fn draw(&self, world: &Mat4, uv_min: Vec2, uv_max: Vec2, rc: &mut dyn RenderContext) {
        rc.set_uniform(MODEL_UNIFORM, Uniform::Mat4(*world));
        rc.draw(DrawCommand::Sprite {
            material: self.material.clone(),
            width: self.width,
            height: self.height,
            origin: self.origin,
            uv_min,
            uv_max,
        });
    }
}

/// Sprite drawn at the owner's world matrix
#[derive(Debug)]
pub struct SpriteComponent {
    base: ExtensionBase,
    quad: Quad,
}

impl SpriteComponent {
    /// Registry type tag
    pub const TYPE: &'static str = "sprite";

    /// Create a sprite of the given size
    pub fn new(name: impl Into<String>, material: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            base: ExtensionBase::new(name),
            quad: Quad {
                material: material.into(),
                width,
                height,
                origin: Vec3::zeros(),
            },
        }
    }

    /// Build from a `sprite` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: SpriteData = parse_record(Self::TYPE, record)?;
        let mut sprite = Self::new(data.name, data.material_name, data.width, data.height);
        sprite.quad.origin = data.origin.to_vec3();
        Ok(sprite)
    }

    /// Quad geometry
    pub fn quad(&self) -> &Quad {
        &self.quad
    }
}

impl Extension for SpriteComponent {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }
}

impl Component for SpriteComponent {
    fn render(&self, world: &Mat4, rc: &mut dyn RenderContext) {
        self.quad.draw(world, Vec2::zeros(), Vec2::new(1.0, 1.0), rc);
    }
}
