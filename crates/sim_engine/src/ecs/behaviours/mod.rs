//! Built-in behaviours
//!
//! Registered under their `TYPE` tags by
//! [`ExtensionRegistry::with_builtins`](super::ExtensionRegistry::with_builtins).

pub mod keyboard_movement;
pub mod mouse_click;
pub mod player;
pub mod rotation;
pub mod scroll;
pub mod visibility_on_message;

pub use keyboard_movement::KeyboardMovementBehaviour;
pub use mouse_click::MouseClickBehaviour;
pub use player::PlayerBehaviour;
pub use rotation::RotationBehaviour;
pub use scroll::ScrollBehaviour;
pub use visibility_on_message::VisibilityOnMessageBehaviour;
