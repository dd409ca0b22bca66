//! Transform graph arena
//!
//! Nodes live in a `SlotMap`; edges are plain keys. The arena owns a permanent
//! root that every zone hangs off.

use log::{debug, warn};
use slotmap::SlotMap;
use thiserror::Error;

use super::entity::{EntityId, EntityNode};
use crate::ecs::components::CollisionComponent;
use crate::ecs::{Behaviour, Component, ExtensionKind, ExtensionRef};
use crate::events::bus::TakeError;
use crate::foundation::math::{Mat4, Transform, Vec3};

/// Errors raised by graph edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The key does not name a live node
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// A node cannot be its own child
    #[error("Entity {0:?} cannot be attached to itself")]
    SelfAttach(EntityId),

    /// Reparenting is not supported
    #[error("Entity {child:?} already has parent {parent:?}")]
    AlreadyParented {
        /// Node being attached
        child: EntityId,
        /// Its current parent
        parent: EntityId,
    },

    /// The child is an ancestor of the prospective parent
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    Cycle {
        /// Prospective parent
        parent: EntityId,
        /// Node being attached
        child: EntityId,
    },

    /// The scene root cannot be removed
    #[error("The scene root cannot be removed")]
    PermanentRoot,

    /// An extension can only be owned by one entity
    #[error("Extension '{0}' is already owned by another entity")]
    AlreadyOwned(String),
}

/// Arena of entity nodes
pub struct Scene {
    nodes: SlotMap<EntityId, EntityNode>,
    root: EntityId,
    next_id: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create a scene holding only the permanent root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(EntityNode::new(0, "root".to_string()));
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    /// Permanent root
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Create a detached node
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(EntityNode::new(id, name.into()))
    }

    /// Whether `entity` names a live node
    pub fn contains(&self, entity: EntityId) -> bool {
        self.nodes.contains_key(entity)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root is left
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Borrow a node
    pub fn node(&self, entity: EntityId) -> Option<&EntityNode> {
        self.nodes.get(entity)
    }

    /// Borrow a node mutably
    pub fn node_mut(&mut self, entity: EntityId) -> Option<&mut EntityNode> {
        self.nodes.get_mut(entity)
    }

    /// Display name
    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.nodes.get(entity).map(EntityNode::name)
    }

    /// Parent of `entity`
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.nodes.get(entity).and_then(EntityNode::parent)
    }

    /// Children of `entity` (empty for unknown keys)
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.nodes.get(entity).map_or(&[][..], EntityNode::children)
    }

    /// Local transform
    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.nodes.get(entity).map(|node| &node.transform)
    }

    /// Local transform, mutable
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.nodes.get_mut(entity).map(|node| &mut node.transform)
    }

    /// World matrix as of the last update
    pub fn world_matrix(&self, entity: EntityId) -> Option<&Mat4> {
        self.nodes.get(entity).map(EntityNode::world_matrix)
    }

    /// Translation column of the world matrix
    pub fn world_position(&self, entity: EntityId) -> Option<Vec3> {
        self.nodes.get(entity).map(EntityNode::world_position)
    }

    /// Whether the node's own components render
    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.nodes.get(entity).is_some_and(EntityNode::is_visible)
    }

    /// Toggle rendering of the node's own components
    pub fn set_visible(&mut self, entity: EntityId, visible: bool) -> bool {
        match self.nodes.get_mut(entity) {
            Some(node) => {
                node.set_visible(visible);
                true
            }
            None => false,
        }
    }

    /// Zone the node belongs to
    pub fn zone_id(&self, entity: EntityId) -> Option<u32> {
        self.nodes.get(entity).and_then(EntityNode::zone_id)
    }

    /// Tag `entity` and its descendants with `zone_id`
    pub fn set_zone(&mut self, entity: EntityId, zone_id: Option<u32>) {
        for id in self.subtree(entity) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.zone_id = zone_id;
            }
        }
    }

    /// Attach `child` under `parent`
    ///
    /// The child inherits the parent's zone. Reparenting is refused, as is any
    /// edge that would close a cycle.
    pub fn attach_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        let Some(child_node) = self.nodes.get(child) else {
            return Err(SceneError::UnknownEntity(child));
        };
        if parent == child {
            return Err(SceneError::SelfAttach(child));
        }
        if let Some(existing) = child_node.parent {
            return Err(SceneError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        let zone_id = self.zone_id(parent);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        if zone_id.is_some() {
            self.set_zone(child, zone_id);
        }
        Ok(())
    }

    /// Whether `ancestor` lies on the parent chain of `entity`
    pub fn is_ancestor(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut current = self.parent(entity);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Unlink `child` from its parent
    pub fn detach(&mut self, child: EntityId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        true
    }

    /// `entity` and its descendants, pre-order
    pub fn subtree(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack = vec![entity];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Detach and drop `entity` with all its descendants
    ///
    /// Returns the number of removed nodes.
    pub fn remove_subtree(&mut self, entity: EntityId) -> Result<usize, SceneError> {
        if entity == self.root {
            return Err(SceneError::PermanentRoot);
        }
        if !self.contains(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }

        self.detach(entity);
        let ids = self.subtree(entity);
        for id in &ids {
            self.nodes.remove(*id);
        }
        debug!("Removed {} node(s) rooted at {entity:?}", ids.len());
        Ok(ids.len())
    }

    /// First node named `name` in a pre-order walk from `root`
    pub fn find_entity_by_name(&self, root: EntityId, name: &str) -> Option<EntityId> {
        self.subtree(root)
            .into_iter()
            .find(|id| self.name(*id) == Some(name))
    }

    /// First component named `name` in a pre-order walk from `root`
    pub fn find_component_by_name(&self, root: EntityId, name: &str) -> Option<ExtensionRef> {
        self.subtree(root).into_iter().find_map(|id| {
            let node = self.nodes.get(id)?;
            node.components
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|c| c.name() == name))
                .map(|index| ExtensionRef::component(id, index))
        })
    }

    /// First behaviour named `name` in a pre-order walk from `root`
    pub fn find_behaviour_by_name(&self, root: EntityId, name: &str) -> Option<ExtensionRef> {
        self.subtree(root).into_iter().find_map(|id| {
            let node = self.nodes.get(id)?;
            node.behaviours
                .iter()
                .position(|slot| slot.as_ref().is_some_and(|b| b.name() == name))
                .map(|index| ExtensionRef::behaviour(id, index))
        })
    }

    /// Attach a component; binds its owner
    pub fn add_component(
        &mut self,
        entity: EntityId,
        mut component: Box<dyn Component>,
    ) -> Result<ExtensionRef, SceneError> {
        let node = self
            .nodes
            .get_mut(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        if component.owner().is_some_and(|owner| owner != entity) {
            return Err(SceneError::AlreadyOwned(component.name().to_string()));
        }
        component.set_owner(entity);
        node.components.push(Some(component));
        Ok(ExtensionRef::component(entity, node.components.len() - 1))
    }

    /// Attach a behaviour; binds its owner
    pub fn add_behaviour(
        &mut self,
        entity: EntityId,
        mut behaviour: Box<dyn Behaviour>,
    ) -> Result<ExtensionRef, SceneError> {
        let node = self
            .nodes
            .get_mut(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        if behaviour.owner().is_some_and(|owner| owner != entity) {
            return Err(SceneError::AlreadyOwned(behaviour.name().to_string()));
        }
        behaviour.set_owner(entity);
        node.behaviours.push(Some(behaviour));
        Ok(ExtensionRef::behaviour(entity, node.behaviours.len() - 1))
    }

    /// Addresses of the components of `entity`, in attachment order
    pub fn component_refs(&self, entity: EntityId) -> Vec<ExtensionRef> {
        let count = self.nodes.get(entity).map_or(0, EntityNode::component_count);
        (0..count).map(|index| ExtensionRef::component(entity, index)).collect()
    }

    /// Addresses of the behaviours of `entity`, in attachment order
    pub fn behaviour_refs(&self, entity: EntityId) -> Vec<ExtensionRef> {
        let count = self.nodes.get(entity).map_or(0, EntityNode::behaviour_count);
        (0..count).map(|index| ExtensionRef::behaviour(entity, index)).collect()
    }

    /// Components then behaviours of `entity`
    pub fn extension_refs(&self, entity: EntityId) -> Vec<ExtensionRef> {
        let mut refs = self.component_refs(entity);
        refs.extend(self.behaviour_refs(entity));
        refs
    }

    /// Borrow a component as a trait object
    pub fn get_component(&self, extension: ExtensionRef) -> Option<&dyn Component> {
        if extension.kind != ExtensionKind::Component {
            return None;
        }
        self.nodes
            .get(extension.entity)?
            .components
            .get(extension.index)?
            .as_deref()
    }

    /// Borrow a behaviour as a trait object
    pub fn get_behaviour(&self, extension: ExtensionRef) -> Option<&dyn Behaviour> {
        if extension.kind != ExtensionKind::Behaviour {
            return None;
        }
        self.nodes
            .get(extension.entity)?
            .behaviours
            .get(extension.index)?
            .as_deref()
    }

    /// Borrow a component as its concrete type
    pub fn component<T: Component>(&self, extension: ExtensionRef) -> Option<&T> {
        self.get_component(extension)?.as_any().downcast_ref::<T>()
    }

    /// Borrow a component mutably as its concrete type
    pub fn component_mut<T: Component>(&mut self, extension: ExtensionRef) -> Option<&mut T> {
        if extension.kind != ExtensionKind::Component {
            return None;
        }
        self.nodes
            .get_mut(extension.entity)?
            .components
            .get_mut(extension.index)?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Borrow a behaviour as its concrete type
    pub fn behaviour<T: Behaviour>(&self, extension: ExtensionRef) -> Option<&T> {
        self.get_behaviour(extension)?.as_any().downcast_ref::<T>()
    }

    /// Borrow a behaviour mutably as its concrete type
    pub fn behaviour_mut<T: Behaviour>(&mut self, extension: ExtensionRef) -> Option<&mut T> {
        if extension.kind != ExtensionKind::Behaviour {
            return None;
        }
        self.nodes
            .get_mut(extension.entity)?
            .behaviours
            .get_mut(extension.index)?
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Collider view of a component
    pub fn collider(&self, extension: ExtensionRef) -> Option<&CollisionComponent> {
        self.get_component(extension)?.as_collider()
    }

    /// Mutable collider view of a component
    pub fn collider_mut(&mut self, extension: ExtensionRef) -> Option<&mut CollisionComponent> {
        if extension.kind != ExtensionKind::Component {
            return None;
        }
        self.nodes
            .get_mut(extension.entity)?
            .components
            .get_mut(extension.index)?
            .as_deref_mut()?
            .as_collider_mut()
    }

    /// Whether the extension slot exists but is currently taken
    pub fn is_busy(&self, extension: ExtensionRef) -> bool {
        let Some(node) = self.nodes.get(extension.entity) else {
            return false;
        };
        match extension.kind {
            ExtensionKind::Component => matches!(node.components.get(extension.index), Some(None)),
            ExtensionKind::Behaviour => matches!(node.behaviours.get(extension.index), Some(None)),
        }
    }

    pub(crate) fn take_component(
        &mut self,
        extension: ExtensionRef,
    ) -> Result<Box<dyn Component>, TakeError> {
        if extension.kind != ExtensionKind::Component {
            return Err(TakeError::Missing);
        }
        let slot = self
            .nodes
            .get_mut(extension.entity)
            .and_then(|node| node.components.get_mut(extension.index))
            .ok_or(TakeError::Missing)?;
        slot.take().ok_or(TakeError::Busy)
    }

    pub(crate) fn restore_component(&mut self, extension: ExtensionRef, component: Box<dyn Component>) {
        match self
            .nodes
            .get_mut(extension.entity)
            .and_then(|node| node.components.get_mut(extension.index))
        {
            Some(slot) => *slot = Some(component),
            None => warn!(
                "Dropping component '{}': its entity was removed while it ran",
                component.name()
            ),
        }
    }

    pub(crate) fn take_behaviour(
        &mut self,
        extension: ExtensionRef,
    ) -> Result<Box<dyn Behaviour>, TakeError> {
        if extension.kind != ExtensionKind::Behaviour {
            return Err(TakeError::Missing);
        }
        let slot = self
            .nodes
            .get_mut(extension.entity)
            .and_then(|node| node.behaviours.get_mut(extension.index))
            .ok_or(TakeError::Missing)?;
        slot.take().ok_or(TakeError::Busy)
    }

    pub(crate) fn restore_behaviour(&mut self, extension: ExtensionRef, behaviour: Box<dyn Behaviour>) {
        match self
            .nodes
            .get_mut(extension.entity)
            .and_then(|node| node.behaviours.get_mut(extension.index))
        {
            Some(slot) => *slot = Some(behaviour),
            None => warn!(
                "Dropping behaviour '{}': its entity was removed while it ran",
                behaviour.name()
            ),
        }
    }

    /// Recompute local and world matrices of one node from its parent's world
    pub(crate) fn refresh_matrices(&mut self, entity: EntityId) {
        let parent_world = self
            .parent(entity)
            .and_then(|parent| self.nodes.get(parent))
            .map(|node| *node.world_matrix());
        if let Some(node) = self.nodes.get_mut(entity) {
            node.refresh_matrices(parent_world.as_ref());
        }
    }
}
