//! Component and behaviour capability traits

use crate::context::SimContext;
use crate::engine::EngineError;
use crate::foundation::math::Mat4;
use crate::render::RenderContext;

use super::components::CollisionComponent;
use super::Extension;

/// Extension that is loaded, updated and drawn with its owner
pub trait Component: Extension {
    /// One-off setup after the zone tree is built
    fn load(&mut self, _ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// Draw using the owner's world matrix
    fn render(&self, _world: &Mat4, _rc: &mut dyn RenderContext) {}

    /// Collider view, for components the collision detector tracks
    fn as_collider(&self) -> Option<&CollisionComponent> {
        None
    }

    /// Mutable collider view
    fn as_collider_mut(&mut self) -> Option<&mut CollisionComponent> {
        None
    }
}

/// Extension that drives its owner through per-tick logic
pub trait Behaviour: Extension {
    /// Called once after the whole tree has loaded, before the first update
    ///
    /// Named sibling lookups happen here; a missing target is a resolution error.
    fn update_ready(&mut self, _ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        Ok(())
    }
}
