//! 2D collision shapes
//!
//! Shapes live in screen space (y down). Their position is kept at the owner's
//! world position plus the shape offset by the owning collision component.

use std::fmt::Debug;

use serde::Deserialize;
use thiserror::Error;

use crate::ecs::record::Vec2Record;
use crate::foundation::any::AsAny;
use crate::foundation::math::Vec2;

/// Shape test failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// No intersection rule exists for this pair of shape types
    #[error("No intersection rule between '{0}' and '{1}'")]
    UnsupportedPair(&'static str, &'static str),
}

/// A collision shape
pub trait Shape2D: Debug + AsAny {
    /// Shape type label
    fn kind(&self) -> &'static str;

    /// Current position (owner world position plus offset)
    fn position(&self) -> Vec2;

    /// Move the shape
    fn set_position(&mut self, position: Vec2);

    /// Offset from the owner's world position
    fn offset(&self) -> Vec2;

    /// Overlap test; unknown pairings are an error, never a silent miss
    fn intersects(&self, other: &dyn Shape2D) -> Result<bool, ShapeError>;

    /// Whether `point` lies inside the shape (edges included)
    fn point_in_shape(&self, point: Vec2) -> bool;
}

/// Circle around its position
#[derive(Debug, Clone, PartialEq)]
pub struct Circle2D {
    /// Centre
    pub position: Vec2,
    /// Offset from the owner
    pub offset: Vec2,
    /// Radius
    pub radius: f32,
}

impl Circle2D {
    /// Circle at the origin
    pub fn new(radius: f32) -> Self {
        Self {
            position: Vec2::zeros(),
            offset: Vec2::zeros(),
            radius,
        }
    }

    /// Builder pattern: set the offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

impl Shape2D for Circle2D {
    fn kind(&self) -> &'static str {
        "circle"
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn offset(&self) -> Vec2 {
        self.offset
    }

    fn intersects(&self, other: &dyn Shape2D) -> Result<bool, ShapeError> {
        if let Some(circle) = other.as_any().downcast_ref::<Circle2D>() {
            let reach = self.radius + circle.radius;
            return Ok((self.position - circle.position).norm_squared() <= reach * reach);
        }
        if let Some(rectangle) = other.as_any().downcast_ref::<Rectangle2D>() {
            return Ok(rectangle.overlaps_circle(self));
        }
        Err(ShapeError::UnsupportedPair(self.kind(), other.kind()))
    }

    fn point_in_shape(&self, point: Vec2) -> bool {
        (point - self.position).norm_squared() <= self.radius * self.radius
    }
}

/// Axis-aligned rectangle
///
/// `origin` is a normalised pivot: the top-left corner sits at
/// `position - origin * (width, height)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle2D {
    /// Pivot position
    pub position: Vec2,
    /// Offset from the owner
    pub offset: Vec2,
    /// Normalised pivot
    pub origin: Vec2,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rectangle2D {
    /// Rectangle with its top-left corner at the origin
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            position: Vec2::zeros(),
            offset: Vec2::zeros(),
            origin: Vec2::zeros(),
            width,
            height,
        }
    }

    /// Builder pattern: set the offset
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// Builder pattern: set the pivot
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Top-left corner
    pub fn min(&self) -> Vec2 {
        Vec2::new(
            self.position.x - self.origin.x * self.width,
            self.position.y - self.origin.y * self.height,
        )
    }

    /// Bottom-right corner
    pub fn max(&self) -> Vec2 {
        self.min() + Vec2::new(self.width, self.height)
    }

    fn overlaps_circle(&self, circle: &Circle2D) -> bool {
        let (min, max) = (self.min(), self.max());
        let closest = Vec2::new(
            circle.position.x.clamp(min.x, max.x),
            circle.position.y.clamp(min.y, max.y),
        );
        (circle.position - closest).norm_squared() <= circle.radius * circle.radius
    }
}

impl Shape2D for Rectangle2D {
    fn kind(&self) -> &'static str {
        "rectangle"
    }

    fn position(&self) -> Vec2 {
        self.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn offset(&self) -> Vec2 {
        self.offset
    }

    fn intersects(&self, other: &dyn Shape2D) -> Result<bool, ShapeError> {
        if let Some(rectangle) = other.as_any().downcast_ref::<Rectangle2D>() {
            let (a_min, a_max) = (self.min(), self.max());
            let (b_min, b_max) = (rectangle.min(), rectangle.max());
            return Ok(a_min.x <= b_max.x
                && a_max.x >= b_min.x
                && a_min.y <= b_max.y
                && a_max.y >= b_min.y);
        }
        if let Some(circle) = other.as_any().downcast_ref::<Circle2D>() {
            return Ok(self.overlaps_circle(circle));
        }
        Err(ShapeError::UnsupportedPair(self.kind(), other.kind()))
    }

    fn point_in_shape(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// Declarative shape record
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ShapeRecord {
    /// `{ "type": "circle", "radius": .. }`
    #[serde(alias = "Circle")]
    Circle {
        /// Radius
        radius: f32,
        /// Offset from the owner
        #[serde(default)]
        offset: Vec2Record,
    },
    /// `{ "type": "rectangle", "width": .., "height": .. }`
    #[serde(alias = "Rectangle")]
    Rectangle {
        /// Width
        width: f32,
        /// Height
        height: f32,
        /// Offset from the owner
        #[serde(default)]
        offset: Vec2Record,
        /// Normalised pivot
        #[serde(default)]
        origin: Vec2Record,
    },
}

impl ShapeRecord {
    /// Instantiate the described shape
    pub fn build(&self) -> Box<dyn Shape2D> {
        match self {
            Self::Circle { radius, offset } => {
                Box::new(Circle2D::new(*radius).with_offset(offset.to_vec2()))
            }
            Self::Rectangle {
                width,
                height,
                offset,
                origin,
            } => Box::new(
                Rectangle2D::new(*width, *height)
                    .with_offset(offset.to_vec2())
                    .with_origin(origin.to_vec2()),
            ),
        }
    }
}
