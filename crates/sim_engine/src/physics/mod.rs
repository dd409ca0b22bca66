//! Physics module for collision detection
//!
//! Detection only: contacts are reported through callbacks on the collision
//! components and through `COLLISION_ENTRY`/`COLLISION_EXIT` messages. There is
//! no collision response.

pub mod collision;
pub mod collision_system;

pub use collision::{Circle2D, Rectangle2D, Shape2D, ShapeError, ShapeRecord};
pub use collision_system::{CollisionDetector, CollisionPair, CollisionReport, ContactRecord};
