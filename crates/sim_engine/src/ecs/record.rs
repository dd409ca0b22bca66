//! Helpers for parsing declarative JSON records

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::EngineError;
use crate::foundation::math::{Vec2, Vec3};

/// Deserialize `record` into a typed data struct
///
/// Missing or mistyped fields become [`EngineError::Configuration`] tagged
/// with `context` (usually the extension type tag).
pub fn parse_record<T: DeserializeOwned>(context: &str, record: &Value) -> Result<T, EngineError> {
    T::deserialize(record).map_err(|e| EngineError::configuration(context, e.to_string()))
}

/// Read the `type` tag of a record
pub fn record_type(record: &Value) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}

/// Partial 2D vector; absent axes keep the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec2Record {
    /// X component
    pub x: Option<f32>,
    /// Y component
    pub y: Option<f32>,
}

impl Vec2Record {
    /// Overlay the present axes on `base`
    pub fn apply(self, base: Vec2) -> Vec2 {
        Vec2::new(self.x.unwrap_or(base.x), self.y.unwrap_or(base.y))
    }

    /// Present axes over zero
    pub fn to_vec2(self) -> Vec2 {
        self.apply(Vec2::zeros())
    }
}

/// Partial 3D vector; absent axes keep the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec3Record {
    /// X component
    pub x: Option<f32>,
    /// Y component
    pub y: Option<f32>,
    /// Z component
    pub z: Option<f32>,
}

impl Vec3Record {
    /// Overlay the present axes on `base`
    pub fn apply(self, base: Vec3) -> Vec3 {
        Vec3::new(
            self.x.unwrap_or(base.x),
            self.y.unwrap_or(base.y),
            self.z.unwrap_or(base.z),
        )
    }

    /// Present axes over zero
    pub fn to_vec3(self) -> Vec3 {
        self.apply(Vec3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Probe {
        frame_count: u32,
        #[serde(default)]
        origin: Vec3Record,
    }

    #[test]
    fn test_missing_field_is_configuration_error() {
        let err = parse_record::<Probe>("probe", &json!({ "type": "probe" })).unwrap_err();
        match err {
            EngineError::Configuration { context, message } => {
                assert_eq!(context, "probe");
                assert!(message.contains("frameCount"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_partial_vectors_keep_defaults() {
        let probe: Probe =
            parse_record("probe", &json!({ "frameCount": 2, "origin": { "y": 0.5 } })).unwrap();
        assert_eq!(probe.frame_count, 2);
        assert_eq!(probe.origin.apply(Vec3::new(1.0, 1.0, 1.0)), Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(record_type(&json!({ "type": "sprite" })), Some("sprite"));
    }
}
