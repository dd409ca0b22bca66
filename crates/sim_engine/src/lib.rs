//! # Sim Engine
//!
//! Runtime core for data-driven 2D simulations.
//!
//! ## Features
//!
//! - **Transform graph**: arena of entities with hierarchical world matrices
//! - **Extensions**: components and behaviours built from JSON records
//! - **Message bus**: string-coded publish/subscribe with HIGH and NORMAL delivery
//! - **Collision detection**: persistent contacts with entry/update/exit
//! - **Zones**: declarative scene files loaded, swapped and torn down as a unit
//!
//! Rendering, audio, asset decoding and device input stay with the host and
//! are reached through small traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sim_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.register_zone(0, "zones/level.json");
//!         engine.change_zone(0)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, _engine: &mut Engine, _delta_ms: f32) -> Result<(), AppError> {
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new(EngineConfig::default());
//!     engine.run(&mut MyApp, Some(600))?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::cast_precision_loss,
    clippy::must_use_candidate
)]

pub mod assets;
pub mod audio;
pub mod config;
pub mod context;
pub mod ecs;
pub mod events;
pub mod foundation;
pub mod input;
pub mod physics;
pub mod render;
pub mod scene;

mod application;
mod engine;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{Asset, AssetManager, AssetProvider},
        audio::{AudioPlayer, NullAudio, RecordingAudio},
        config::{BusConfig, Config, EngineConfig, QueueOrder},
        context::SimContext,
        ecs::{
            Behaviour, BuiltExtension, Component, Extension, ExtensionBase, ExtensionKind,
            ExtensionRef, ExtensionRegistry,
        },
        events::{codes, HandlerId, ListenerId, Message, MessageHandler, Payload, Priority, Sender},
        foundation::math::{Mat4, Transform, Vec2, Vec3},
        input::{KeyCode, MouseButton, MouseContext},
        render::{CommandRecorder, DrawCommand, RenderContext, Uniform},
        scene::{EntityId, Scene, Zone, ZoneState},
        AppError, Application, Engine, EngineError,
    };
}
