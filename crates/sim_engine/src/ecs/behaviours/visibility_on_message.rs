//! Show or hide the owner on a message

use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::parse_record;
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::events::Message;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisibilityOnMessageData {
    #[serde(default)]
    name: String,
    message_code: String,
    visible: bool,
}

/// Sets the owner's visibility when `message_code` arrives
#[derive(Debug)]
pub struct VisibilityOnMessageBehaviour {
    base: ExtensionBase,
    message_code: String,
    visible: bool,
}

impl VisibilityOnMessageBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "visibility-on-message";

    /// Build from a `visibility-on-message` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: VisibilityOnMessageData = parse_record(Self::TYPE, record)?;
        Ok(Self {
            base: ExtensionBase::new(data.name),
            message_code: data.message_code,
            visible: data.visible,
        })
    }
}

impl Extension for VisibilityOnMessageBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![self.message_code.clone()]
    }

    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        if message.code == self.message_code {
            if let Some(owner) = self.owner() {
                ctx.scene.set_visible(owner, self.visible);
            }
        }
    }
}

impl Behaviour for VisibilityOnMessageBehaviour {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_visible_is_required() {
        let err = VisibilityOnMessageBehaviour::from_record(&json!({
            "type": "visibility-on-message",
            "messageCode": "SPLASH_HIDE"
        }))
        .unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));

        let behaviour = VisibilityOnMessageBehaviour::from_record(&json!({
            "messageCode": "SPLASH_HIDE",
            "visible": false
        }))
        .unwrap();
        assert_eq!(behaviour.subscriptions(), vec!["SPLASH_HIDE".to_string()]);
    }
}
