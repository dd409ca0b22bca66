//! Pre-order passes over the transform graph

use crate::context::SimContext;
use crate::ecs::ExtensionRef;
use crate::engine::EngineError;
use crate::events::HandlerId;
use crate::render::RenderContext;

use super::{EntityId, Scene};

/// Update pass
///
/// Refreshes the node's matrices from its parent's world matrix, then runs
/// the node's components, then its behaviours, then recurses into children.
pub fn update_tree(ctx: &mut SimContext<'_>, entity: EntityId, delta_ms: f32) {
    ctx.scene.refresh_matrices(entity);

    for extension in ctx.scene.component_refs(entity) {
        if let Ok(mut component) = ctx.scene.take_component(extension) {
            ctx.run_as(HandlerId::Extension(extension), |ctx| component.update(delta_ms, ctx));
            ctx.scene.restore_component(extension, component);
        }
    }

    for extension in ctx.scene.behaviour_refs(entity) {
        if let Ok(mut behaviour) = ctx.scene.take_behaviour(extension) {
            ctx.run_as(HandlerId::Extension(extension), |ctx| behaviour.update(delta_ms, ctx));
            ctx.scene.restore_behaviour(extension, behaviour);
        }
    }

    for child in ctx.scene.children(entity).to_vec() {
        update_tree(ctx, child, delta_ms);
    }
}

/// Load pass over components
///
/// Returns the collider-bearing components in visit order so the caller can
/// register them with the collision detector.
pub fn load_tree(
    ctx: &mut SimContext<'_>,
    entity: EntityId,
) -> Result<Vec<ExtensionRef>, EngineError> {
    let mut colliders = Vec::new();
    for id in ctx.scene.subtree(entity) {
        ctx.scene.refresh_matrices(id);
        for extension in ctx.scene.component_refs(id) {
            if load_one(ctx, extension)? {
                colliders.push(extension);
            }
        }
    }
    Ok(colliders)
}

/// Load a single component attached after its zone was loaded
///
/// Returns whether it is a collider.
pub fn load_component(ctx: &mut SimContext<'_>, extension: ExtensionRef) -> Result<bool, EngineError> {
    ctx.scene.refresh_matrices(extension.entity);
    load_one(ctx, extension)
}

fn load_one(ctx: &mut SimContext<'_>, extension: ExtensionRef) -> Result<bool, EngineError> {
    let Ok(mut component) = ctx.scene.take_component(extension) else {
        return Ok(false);
    };
    let result = ctx.run_as(HandlerId::Extension(extension), |ctx| component.load(ctx));
    let is_collider = component.as_collider().is_some();
    ctx.scene.restore_component(extension, component);
    result.map(|()| is_collider)
}

/// Ready pass over behaviours, run once after `load_tree`
pub fn update_ready_tree(ctx: &mut SimContext<'_>, entity: EntityId) -> Result<(), EngineError> {
    for id in ctx.scene.subtree(entity) {
        for extension in ctx.scene.behaviour_refs(id) {
            ready_behaviour(ctx, extension)?;
        }
    }
    Ok(())
}

/// Run `update_ready` for one behaviour
pub fn ready_behaviour(ctx: &mut SimContext<'_>, extension: ExtensionRef) -> Result<(), EngineError> {
    let Ok(mut behaviour) = ctx.scene.take_behaviour(extension) else {
        return Ok(());
    };
    let result = ctx.run_as(HandlerId::Extension(extension), |ctx| behaviour.update_ready(ctx));
    ctx.scene.restore_behaviour(extension, behaviour);
    result
}

/// Render pass
///
/// An invisible node skips its own components; its children are still visited.
pub fn render_tree(scene: &Scene, entity: EntityId, rc: &mut dyn RenderContext) {
    let Some(node) = scene.node(entity) else {
        return;
    };

    if node.is_visible() {
        let world = node.world_matrix();
        for component in node.components.iter().flatten() {
            component.render(world, rc);
        }
    }

    for child in node.children() {
        render_tree(scene, *child, rc);
    }
}
