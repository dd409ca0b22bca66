//! Bitmap-font text driven by `<name>:SetText` messages

use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::{parse_record, Vec3Record};
use crate::ecs::{Component, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::events::{codes, Message};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::{DrawCommand, RenderContext, Uniform, MODEL_UNIFORM};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BitmapTextData {
    #[serde(default)]
    name: String,
    font_name: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    origin: Vec3Record,
}

/// Text run drawn at the owner's world matrix
#[derive(Debug)]
pub struct BitmapTextComponent {
    base: ExtensionBase,
    font: String,
    text: String,
    origin: Vec3,
}

impl BitmapTextComponent {
    /// Registry type tag
    pub const TYPE: &'static str = "bitmap-text";

    /// Create a text component
    pub fn new(name: impl Into<String>, font: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            base: ExtensionBase::new(name),
            font: font.into(),
            text: text.into(),
            origin: Vec3::zeros(),
        }
    }

    /// Build from a `bitmap-text` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: BitmapTextData = parse_record(Self::TYPE, record)?;
        let mut text = Self::new(data.name, data.font_name, data.text);
        text.origin = data.origin.to_vec3();
        Ok(text)
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Extension for BitmapTextComponent {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![codes::set_text(self.name())]
    }

    fn on_message(&mut self, message: &Message, _ctx: &mut SimContext<'_>) {
        if message.code == codes::set_text(self.name()) {
            self.text = message
                .payload
                .as_ref()
                .and_then(|payload| payload.to_text())
                .unwrap_or_default();
        }
    }
}

impl Component for BitmapTextComponent {
    fn render(&self, world: &Mat4, rc: &mut dyn RenderContext) {
        rc.set_uniform(MODEL_UNIFORM, Uniform::Mat4(*world));
        rc.draw(DrawCommand::Text {
            font: self.font.clone(),
            text: self.text.clone(),
            origin: self.origin,
        });
    }
}
