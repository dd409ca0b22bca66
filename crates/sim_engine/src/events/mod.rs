//! Publish/subscribe messaging
//!
//! Messages are addressed by a string code. HIGH priority messages reach every
//! subscriber before `post` returns; NORMAL messages are queued as one
//! `(message, handler)` pair per subscriber and delivered by a bounded drain at
//! the start of each tick. Delivery itself goes through
//! [`SimContext`](crate::context::SimContext), which owns the borrows needed to
//! hand a handler mutable access to the rest of the simulation.

pub mod bus;
pub mod message;

pub use bus::{HandlerId, ListenerId, MessageBus, MessageHandler};
pub use message::{ContactData, Message, Payload, Priority, Sender};

/// Message codes used by the engine and the built-in extensions
pub mod codes {
    /// Prefix of the per-asset load notification, followed by the asset name
    pub const ASSET_LOADED_PREFIX: &str = "ASSET_LOADED::";

    /// Posted with a `MouseContext` payload when a mouse button is pressed
    pub const MOUSE_DOWN: &str = "MOUSE_DOWN";
    /// Posted with a `MouseContext` payload when a mouse button is released
    pub const MOUSE_UP: &str = "MOUSE_UP";

    /// Two colliders started touching
    pub const COLLISION_ENTRY: &str = "COLLISION_ENTRY";
    /// Two colliders stopped touching
    pub const COLLISION_EXIT: &str = "COLLISION_EXIT";

    /// Game reached its idle state
    pub const GAME_READY: &str = "GAME_READY";
    /// Player started a run
    pub const GAME_START: &str = "GAME_START";
    /// Run reset requested
    pub const GAME_RESET: &str = "GAME_RESET";
    /// Show in-game UI
    pub const GAME_SHOW: &str = "GAME_SHOW";
    /// Hide in-game UI
    pub const GAME_HIDE: &str = "GAME_HIDE";
    /// Show splash screen
    pub const SPLASH_SHOW: &str = "SPLASH_SHOW";
    /// Hide splash screen
    pub const SPLASH_HIDE: &str = "SPLASH_HIDE";
    /// Show tutorial overlay
    pub const TUTORIAL_SHOW: &str = "TUTORIAL_SHOW";
    /// Hide tutorial overlay
    pub const TUTORIAL_HIDE: &str = "TUTORIAL_HIDE";
    /// Show reset button
    pub const RESET_SHOW: &str = "RESET_SHOW";
    /// Hide reset button
    pub const RESET_HIDE: &str = "RESET_HIDE";
    /// Player hit an obstacle or the ground
    pub const PLAYER_DIED: &str = "PLAYER_DIED";
    /// Player state restored for a new run
    pub const PLAYER_RESET: &str = "PLAYER_RESET";

    /// `ASSET_LOADED::<name>`
    pub fn asset_loaded(asset_name: &str) -> String {
        format!("{ASSET_LOADED_PREFIX}{asset_name}")
    }

    /// `<target>:SetText`
    pub fn set_text(target: &str) -> String {
        format!("{target}:SetText")
    }
}
