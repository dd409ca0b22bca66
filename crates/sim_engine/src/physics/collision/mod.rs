//! Collision geometry
//!
//! - [`shape`] - 2D shapes, their pairwise intersection rules and the
//!   declarative shape record

pub mod shape;

pub use shape::{Circle2D, Rectangle2D, Shape2D, ShapeError, ShapeRecord};
