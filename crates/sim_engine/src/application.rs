//! Application trait and lifecycle management

use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine through [`Engine::run`].
pub trait Application {
    /// Initialize the application
    ///
    /// Called once before the first frame. Register zones, hand over assets
    /// and add host listeners here.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called every frame before the engine ticks.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_ms` - Frame time in milliseconds
    fn update(&mut self, engine: &mut Engine, delta_ms: f32) -> Result<(), AppError>;

    /// Render the application
    ///
    /// Called after the engine has ticked. Hosts with a render context call
    /// [`Engine::render`] here.
    fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the main loop exits.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),

    /// Asset loading error
    #[error("Asset error: {0}")]
    Asset(String),
}
