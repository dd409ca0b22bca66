//! Frame-animated sprite
//!
//! Frames are cut from the texture as a grid of `frame_width x frame_height`
//! cells, left to right then top to bottom. The grid needs the texture size,
//! so UVs are computed once the image asset is available: either already
//! loaded at `load`/`update` time, or when `ASSET_LOADED::<material>` arrives.

use serde::Deserialize;
use serde_json::Value;

use crate::assets::AssetProvider;
use crate::context::SimContext;
use crate::ecs::record::{parse_record, Vec3Record};
use crate::ecs::{Component, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::events::{codes, Message};
use crate::foundation::math::{Mat4, Vec2};
use crate::render::RenderContext;

use super::sprite::{default_size, Quad};

fn default_frame_time() -> f32 {
    333.0
}

fn default_auto_play() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnimatedSpriteData {
    #[serde(default)]
    name: String,
    material_name: String,
    #[serde(default = "default_size")]
    width: f32,
    #[serde(default = "default_size")]
    height: f32,
    #[serde(default)]
    origin: Vec3Record,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    frame_sequence: Vec<usize>,
    #[serde(default = "default_frame_time")]
    frame_time: f32,
    #[serde(default = "default_auto_play")]
    auto_play: bool,
}

/// Texture coordinates of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUv {
    /// Top-left
    pub min: Vec2,
    /// Bottom-right
    pub max: Vec2,
}

/// Sprite cycling through a sequence of frames
#[derive(Debug)]
pub struct AnimatedSpriteComponent {
    base: ExtensionBase,
    quad: Quad,
    frame_width: u32,
    frame_height: u32,
    frame_count: u32,
    frame_sequence: Vec<usize>,
    frame_time: f32,
    frame_uvs: Vec<FrameUv>,
    current_frame: usize,
    current_time: f32,
    playing: bool,
}

impl AnimatedSpriteComponent {
    /// Registry type tag
    pub const TYPE: &'static str = "animated-sprite";

    /// Build from an `animated-sprite` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: AnimatedSpriteData = parse_record(Self::TYPE, record)?;

        if data.frame_width == 0 || data.frame_height == 0 {
            return Err(EngineError::configuration(Self::TYPE, "frame size must be non-zero"));
        }
        if data.frame_count == 0 {
            return Err(EngineError::configuration(Self::TYPE, "frameCount must be at least 1"));
        }
        if data.frame_sequence.is_empty() {
            return Err(EngineError::configuration(Self::TYPE, "frameSequence is empty"));
        }
        if let Some(cell) = data
            .frame_sequence
            .iter()
            .find(|cell| **cell >= data.frame_count as usize)
        {
            return Err(EngineError::configuration(
                Self::TYPE,
                format!("frameSequence entry {cell} exceeds frameCount {}", data.frame_count),
            ));
        }

        Ok(Self {
            base: ExtensionBase::new(data.name),
            quad: Quad {
                material: data.material_name,
                width: data.width,
                height: data.height,
                origin: data.origin.to_vec3(),
            },
            frame_width: data.frame_width,
            frame_height: data.frame_height,
            frame_count: data.frame_count,
            frame_sequence: data.frame_sequence,
            frame_time: data.frame_time,
            frame_uvs: Vec::new(),
            current_frame: 0,
            current_time: 0.0,
            playing: data.auto_play,
        })
    }

    /// Resume the animation
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Freeze on the current frame
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether frames are advancing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Jump to a position in the frame sequence
    pub fn set_frame(&mut self, frame: usize) -> Result<(), EngineError> {
        if frame >= self.frame_count as usize {
            return Err(EngineError::FrameOutOfRange {
                frame,
                count: self.frame_count,
            });
        }
        self.current_frame = frame;
        Ok(())
    }

    /// Position in the frame sequence
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Whether the frame grid has been computed
    pub fn has_uvs(&self) -> bool {
        !self.frame_uvs.is_empty()
    }

    /// UVs of the frame currently shown (the whole texture until the grid is known)
    pub fn current_uv(&self) -> FrameUv {
        self.frame_sequence
            .get(self.current_frame)
            .and_then(|cell| self.frame_uvs.get(*cell))
            .copied()
            .unwrap_or(FrameUv {
                min: Vec2::zeros(),
                max: Vec2::new(1.0, 1.0),
            })
    }

    fn setup_from_assets(&mut self, assets: &dyn AssetProvider) {
        if self.has_uvs() || !assets.is_loaded(&self.quad.material) {
            return;
        }
        if let Some((width, height)) = assets.get(&self.quad.material).and_then(|a| a.image_size()) {
            self.calculate_uvs(width, height);
        }
    }

    fn calculate_uvs(&mut self, texture_width: u32, texture_height: u32) {
        let columns = (texture_width / self.frame_width).max(1);
        let (tw, th) = (texture_width as f32, texture_height as f32);
        let (fw, fh) = (self.frame_width as f32, self.frame_height as f32);

        self.frame_uvs = (0..self.frame_count)
            .map(|i| {
                let (column, row) = ((i % columns) as f32, (i / columns) as f32);
                FrameUv {
                    min: Vec2::new(column * fw / tw, row * fh / th),
                    max: Vec2::new((column + 1.0) * fw / tw, (row + 1.0) * fh / th),
                }
            })
            .collect();
    }
}

impl Extension for AnimatedSpriteComponent {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![codes::asset_loaded(&self.quad.material)]
    }

    fn update(&mut self, delta_ms: f32, ctx: &mut SimContext<'_>) {
        if !self.has_uvs() {
            self.setup_from_assets(ctx.assets);
            return;
        }
        if !self.playing {
            return;
        }

        self.current_time += delta_ms;
        if self.current_time > self.frame_time {
            self.current_time = 0.0;
            self.current_frame += 1;
            if self.current_frame >= self.frame_sequence.len() {
                self.current_frame = 0;
            }
        }
    }

    fn on_message(&mut self, message: &Message, _ctx: &mut SimContext<'_>) {
        if message.code != codes::asset_loaded(&self.quad.material) {
            return;
        }
        if let Some((width, height)) = message.asset().and_then(|asset| asset.image_size()) {
            self.calculate_uvs(width, height);
        }
    }
}

impl Component for AnimatedSpriteComponent {
    fn load(&mut self, ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        self.setup_from_assets(ctx.assets);
        Ok(())
    }

    fn render(&self, world: &Mat4, rc: &mut dyn RenderContext) {
        let uv = self.current_uv();
        self.quad.draw(world, uv.min, uv.max, rc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn bird() -> AnimatedSpriteComponent {
        AnimatedSpriteComponent::from_record(&json!({
            "type": "animated-sprite",
            "name": "birdSprite",
            "materialName": "bird",
            "width": 17,
            "height": 12,
            "frameWidth": 17,
            "frameHeight": 12,
            "frameCount": 4,
            "frameSequence": [0, 1, 2, 1]
        }))
        .unwrap()
    }

    #[test]
    fn test_grid_wraps_to_next_row() {
        let mut sprite = bird();
        // Two columns, two rows
        sprite.calculate_uvs(34, 24);

        assert_eq!(sprite.frame_uvs.len(), 4);
        assert_relative_eq!(sprite.frame_uvs[1].min, Vec2::new(0.5, 0.0));
        assert_relative_eq!(sprite.frame_uvs[2].min, Vec2::new(0.0, 0.5));
        assert_relative_eq!(sprite.frame_uvs[3].max, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_set_frame_range() {
        let mut sprite = bird();
        assert!(sprite.set_frame(3).is_ok());
        assert_eq!(sprite.current_frame(), 3);
        assert!(matches!(
            sprite.set_frame(4),
            Err(EngineError::FrameOutOfRange { frame: 4, count: 4 })
        ));
    }

    #[test]
    fn test_invalid_sequences_are_rejected() {
        let err = AnimatedSpriteComponent::from_record(&json!({
            "type": "animated-sprite",
            "materialName": "bird",
            "frameWidth": 17,
            "frameHeight": 12,
            "frameCount": 2,
            "frameSequence": [0, 2]
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));

        let err = AnimatedSpriteComponent::from_record(&json!({
            "type": "animated-sprite",
            "materialName": "bird",
            "frameWidth": 17,
            "frameHeight": 12,
            "frameCount": 2
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
    }

    #[test]
    fn test_uvs_default_to_whole_texture() {
        let sprite = bird();
        assert!(!sprite.has_uvs());
        assert_eq!(sprite.current_uv().max, Vec2::new(1.0, 1.0));
        assert_eq!(sprite.subscriptions(), vec!["ASSET_LOADED::bird".to_string()]);
    }
}
