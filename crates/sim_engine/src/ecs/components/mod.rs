//! Built-in components
//!
//! Each component parses its own record with serde and is registered under
//! its `TYPE` tag by [`ExtensionRegistry::with_builtins`](super::ExtensionRegistry::with_builtins).

pub mod animated_sprite;
pub mod bitmap_text;
pub mod collision;
pub mod sprite;

pub use animated_sprite::{AnimatedSpriteComponent, FrameUv};
pub use bitmap_text::BitmapTextComponent;
pub use collision::CollisionComponent;
pub use sprite::{Quad, SpriteComponent};
