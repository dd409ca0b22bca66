//! # Rendering contract
//!
//! The core never talks to a GPU. Components bind their model matrix as the
//! `u_model` uniform and submit backend-agnostic [`DrawCommand`]s through a
//! [`RenderContext`] supplied by the host. [`CommandRecorder`] is an in-memory
//! context for headless hosts and tests.

pub mod commands;

pub use commands::{CommandRecorder, DrawCommand, RecordedDraw, Uniform};

/// Name of the model matrix uniform bound before every draw
pub const MODEL_UNIFORM: &str = "u_model";

/// Host-side rendering sink
pub trait RenderContext {
    /// Bind a named uniform for the following draws
    fn set_uniform(&mut self, name: &str, value: Uniform);

    /// Submit a draw using the currently bound uniforms
    fn draw(&mut self, command: DrawCommand);
}
