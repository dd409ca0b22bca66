//! Draw commands and an in-memory recorder
//!
//! The renderer side is a passive sink:
//! - it receives pre-computed matrices (no transform logic)
//! - it receives material and font names (no asset management)
//! - it only draws (no lifecycle, input or timing)

use std::collections::HashMap;

use crate::foundation::math::{Mat4, Vec2, Vec3};

use super::{RenderContext, MODEL_UNIFORM};

/// Uniform value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    /// 4x4 matrix
    Mat4(Mat4),
    /// RGBA or any 4-vector
    Vec4([f32; 4]),
    /// Single float
    Float(f32),
    /// Single integer
    Int(i32),
}

/// Backend-agnostic draw request
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad
    Sprite {
        /// Material to draw with
        material: String,
        /// Quad width in world units
        width: f32,
        /// Quad height in world units
        height: f32,
        /// Normalised pivot (0,0 is the top-left corner)
        origin: Vec3,
        /// Top-left texture coordinate
        uv_min: Vec2,
        /// Bottom-right texture coordinate
        uv_max: Vec2,
    },
    /// Bitmap-font text run
    Text {
        /// Font asset name
        font: String,
        /// Text to draw
        text: String,
        /// Normalised pivot
        origin: Vec3,
    },
}

/// A submitted draw with the model matrix bound at the time
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    /// Value of `u_model` when the draw was submitted
    pub model: Option<Mat4>,
    /// The draw itself
    pub command: DrawCommand,
}

/// Render context that records everything it receives
#[derive(Debug, Default)]
pub struct CommandRecorder {
    uniforms: HashMap<String, Uniform>,
    draws: Vec<RecordedDraw>,
}

impl CommandRecorder {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws in submission order
    pub fn draws(&self) -> &[RecordedDraw] {
        &self.draws
    }

    /// Last value bound to `name`
    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    /// Forget all draws and uniforms (start of a new frame)
    pub fn clear(&mut self) {
        self.uniforms.clear();
        self.draws.clear();
    }
}

impl RenderContext for CommandRecorder {
    fn set_uniform(&mut self, name: &str, value: Uniform) {
        self.uniforms.insert(name.to_string(), value);
    }

    fn draw(&mut self, command: DrawCommand) {
        let model = match self.uniforms.get(MODEL_UNIFORM) {
            Some(Uniform::Mat4(matrix)) => Some(*matrix),
            _ => None,
        };
        self.draws.push(RecordedDraw { model, command });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_captures_bound_model() {
        let mut recorder = CommandRecorder::new();
        let model = Mat4::new_translation(&Vec3::new(1.0, 2.0, 0.0));

        recorder.set_uniform(MODEL_UNIFORM, Uniform::Mat4(model));
        recorder.draw(DrawCommand::Text {
            font: "banana".to_string(),
            text: "3".to_string(),
            origin: Vec3::zeros(),
        });

        assert_eq!(recorder.draws().len(), 1);
        assert_eq!(recorder.draws()[0].model, Some(model));

        recorder.clear();
        assert!(recorder.draws().is_empty());
        assert!(recorder.uniform(MODEL_UNIFORM).is_none());
    }
}
