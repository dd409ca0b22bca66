//! Collision component
//!
//! Owns a 2D shape kept at the owner's world position plus the shape offset,
//! and the set of colliders it currently touches. Registration with the
//! detector happens after the load pass.

use log::trace;
use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::parse_record;
use crate::ecs::{Component, Extension, ExtensionBase, ExtensionRef};
use crate::engine::EngineError;
use crate::foundation::math::Vec2;
use crate::physics::{Shape2D, ShapeRecord};

fn default_static() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollisionData {
    #[serde(default)]
    name: String,
    #[serde(rename = "static", default = "default_static")]
    is_static: bool,
    shape: ShapeRecord,
}

/// Collider attached to an entity
#[derive(Debug)]
pub struct CollisionComponent {
    base: ExtensionBase,
    shape: Box<dyn Shape2D>,
    is_static: bool,
    contacts: Vec<ExtensionRef>,
}

impl CollisionComponent {
    /// Registry type tag
    pub const TYPE: &'static str = "collision";

    /// Create a collider
    pub fn new(name: impl Into<String>, shape: Box<dyn Shape2D>, is_static: bool) -> Self {
        Self {
            base: ExtensionBase::new(name),
            shape,
            is_static,
            contacts: Vec::new(),
        }
    }

    /// Build from a `collision` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: CollisionData = parse_record(Self::TYPE, record)?;
        Ok(Self::new(data.name, data.shape.build(), data.is_static))
    }

    /// Collision shape
    pub fn shape(&self) -> &dyn Shape2D {
        self.shape.as_ref()
    }

    /// Static colliders are never tested against each other
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Colliders currently touching this one
    pub fn contacts(&self) -> &[ExtensionRef] {
        &self.contacts
    }

    /// A contact started
    pub fn on_collision_entry(&mut self, other: ExtensionRef) {
        trace!("'{}' entered contact with {other:?}", self.base.name);
        if !self.contacts.contains(&other) {
            self.contacts.push(other);
        }
    }

    /// A contact persisted through another tick
    pub fn on_collision_update(&mut self, _other: ExtensionRef) {}

    /// A contact ended
    pub fn on_collision_exit(&mut self, other: ExtensionRef) {
        trace!("'{}' left contact with {other:?}", self.base.name);
        self.contacts.retain(|c| *c != other);
    }

    fn sync_position(&mut self, ctx: &SimContext<'_>) {
        let Some(world) = self.owner().and_then(|owner| ctx.scene.world_position(owner)) else {
            return;
        };
        let position = Vec2::new(world.x, world.y) + self.shape.offset();
        self.shape.set_position(position);
    }
}

impl Extension for CollisionComponent {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn update(&mut self, _delta_ms: f32, ctx: &mut SimContext<'_>) {
        self.sync_position(ctx);
    }
}

impl Component for CollisionComponent {
    fn load(&mut self, ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        self.sync_position(ctx);
        Ok(())
    }

    fn as_collider(&self) -> Option<&CollisionComponent> {
        Some(self)
    }

    fn as_collider_mut(&mut self) -> Option<&mut CollisionComponent> {
        Some(self)
    }
}
