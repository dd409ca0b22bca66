//! Configuration system

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Order in which pending NORMAL deliveries leave the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueOrder {
    /// Oldest pending delivery first
    #[default]
    Fifo,
    /// Most recently queued delivery first
    Lifo,
}

/// Message bus tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum NORMAL deliveries per drain
    pub messages_per_update: usize,

    /// Maximum nesting of synchronous HIGH deliveries before they are queued
    pub max_dispatch_depth: u32,

    /// Pending queue discipline
    pub queue_order: QueueOrder,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            messages_per_update: 10,
            max_dispatch_depth: 16,
            queue_order: QueueOrder::Fifo,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Message bus settings
    pub bus: BusConfig,

    /// When set, `Engine::run` ticks with this delta instead of wall-clock time
    pub fixed_delta_ms: Option<f32>,

    /// Default `env_logger` filter used by hosts that initialise logging
    pub log_filter: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            fixed_delta_ms: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.bus.messages_per_update, 10);
        assert_eq!(config.bus.queue_order, QueueOrder::Fifo);
        assert!(config.fixed_delta_ms.is_none());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            fixed_delta_ms = 16.0

            [bus]
            queue_order = "lifo"
            "#,
        )
        .unwrap();

        assert_eq!(config.fixed_delta_ms, Some(16.0));
        assert_eq!(config.bus.queue_order, QueueOrder::Lifo);
        assert_eq!(config.bus.messages_per_update, 10);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_ron_config() {
        let config: EngineConfig =
            ron::from_str("(bus: (messages_per_update: 3), log_filter: \"debug\")").unwrap();
        assert_eq!(config.bus.messages_per_update, 3);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_)) | Err(ConfigError::UnsupportedFormat(_))));
    }
}
