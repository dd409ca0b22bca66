//! Scene node storage

use slotmap::new_key_type;

use crate::ecs::{Behaviour, Component};
use crate::foundation::math::{translation_of, Mat4, Transform, Vec3};

new_key_type! {
    /// Arena key of a scene node
    pub struct EntityId;
}

/// A node of the transform graph
///
/// Parent and children are plain arena keys; the [`Scene`](super::Scene)
/// owns every node. Extensions sit in `Option` slots so a running extension
/// can be moved out while it gets mutable access to the rest of the scene.
pub struct EntityNode {
    id: u64,
    name: String,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) zone_id: Option<u32>,

    /// Local position, rotation and scale
    pub transform: Transform,
    local_matrix: Mat4,
    world_matrix: Mat4,

    pub(crate) components: Vec<Option<Box<dyn Component>>>,
    pub(crate) behaviours: Vec<Option<Box<dyn Behaviour>>>,
    visible: bool,
}

impl EntityNode {
    pub(crate) fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            parent: None,
            children: Vec::new(),
            zone_id: None,
            transform: Transform::identity(),
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            components: Vec::new(),
            behaviours: Vec::new(),
            visible: true,
        }
    }

    /// Numeric id, unique within the owning scene
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent node, if attached
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Children in attachment order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Zone this node belongs to
    pub fn zone_id(&self) -> Option<u32> {
        self.zone_id
    }

    /// Local matrix computed during the last update
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    /// World matrix computed during the last update
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Translation column of the world matrix
    pub fn world_position(&self) -> Vec3 {
        translation_of(&self.world_matrix)
    }

    /// Whether this node's own components render
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of attached behaviours
    pub fn behaviour_count(&self) -> usize {
        self.behaviours.len()
    }

    pub(crate) fn refresh_matrices(&mut self, parent_world: Option<&Mat4>) {
        self.local_matrix = self.transform.to_matrix();
        self.world_matrix = match parent_world {
            Some(parent) => parent * self.local_matrix,
            None => self.local_matrix,
        };
    }
}

impl std::fmt::Debug for EntityNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("zone_id", &self.zone_id)
            .field("transform", &self.transform)
            .field("components", &self.components.len())
            .field("behaviours", &self.behaviours.len())
            .field("visible", &self.visible)
            .finish()
    }
}
