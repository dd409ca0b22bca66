//! Zones and the declarative scene builder

use log::{debug, error, warn};
use serde::Deserialize;
use serde_json::Value;

use super::{EntityId, Scene};
use crate::ecs::record::{parse_record, Vec3Record};
use crate::ecs::{BuiltExtension, ExtensionKind, ExtensionRef, ExtensionRegistry};
use crate::engine::EngineError;
use crate::foundation::math::Transform;

/// Lifecycle of a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneState {
    /// Built but not loaded yet
    Uninitialized,
    /// Load and ready passes are running
    Loading,
    /// Ticking and rendering
    Updating,
}

/// A loaded scene subtree with its own root
#[derive(Debug, Clone)]
pub struct Zone {
    id: u32,
    name: String,
    description: String,
    root: EntityId,
    state: ZoneState,
}

impl Zone {
    /// Wrap a built subtree
    pub fn new(id: u32, name: String, description: String, root: EntityId) -> Self {
        Self {
            id,
            name,
            description,
            root,
            state: ZoneState::Uninitialized,
        }
    }

    /// Zone id
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Zone name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Root node of the zone's subtree
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Lifecycle state
    pub fn state(&self) -> ZoneState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ZoneState) {
        debug!("Zone '{}' {:?} -> {:?}", self.name, self.state, state);
        self.state = state;
    }
}

/// Top level of a zone record
#[derive(Debug, Deserialize)]
pub struct ZoneRecord {
    /// Zone id
    pub id: u32,
    /// Zone name
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: String,
    /// Top-level object records
    pub objects: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TransformRecord {
    position: Vec3Record,
    rotation: Vec3Record,
    scale: Vec3Record,
}

impl TransformRecord {
    fn to_transform(&self) -> Transform {
        let base = Transform::identity();
        Transform {
            position: self.position.apply(base.position),
            rotation: self.rotation.apply(base.rotation),
            scale: self.scale.apply(base.scale),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ObjectRecord {
    name: String,
    transform: Option<TransformRecord>,
    components: Vec<Value>,
    behaviours: Vec<Value>,
    children: Vec<Value>,
}

/// Output of a successful build
#[derive(Debug)]
pub struct BuiltZone {
    /// The zone, still `Uninitialized`
    pub zone: Zone,
    /// Every extension attached while building, in attachment order
    pub extensions: Vec<ExtensionRef>,
}

/// Build a zone subtree from its record and hang it under the scene root
///
/// Each object is fully built (extensions, then children) before it is
/// attached to its parent. On any failure every node created so far is
/// removed again and the error is returned.
pub fn build_zone(
    scene: &mut Scene,
    registry: &ExtensionRegistry,
    record: &Value,
) -> Result<BuiltZone, EngineError> {
    let zone_record: ZoneRecord = parse_record("zone", record)?;

    let root = scene.create_entity(format!("zone:{}", zone_record.name));
    scene.set_zone(root, Some(zone_record.id));

    let mut builder = ZoneBuilder {
        scene,
        registry,
        created: vec![root],
        extensions: Vec::new(),
    };

    match builder.build_objects(root, &zone_record.objects) {
        Ok(()) => {
            let extensions = std::mem::take(&mut builder.extensions);
            let scene_root = builder.scene.root();
            builder.scene.attach_child(scene_root, root)?;
            Ok(BuiltZone {
                zone: Zone::new(zone_record.id, zone_record.name, zone_record.description, root),
                extensions,
            })
        }
        Err(e) => {
            error!("Zone '{}' failed to build: {e}", zone_record.name);
            builder.discard();
            Err(e)
        }
    }
}

struct ZoneBuilder<'a> {
    scene: &'a mut Scene,
    registry: &'a ExtensionRegistry,
    created: Vec<EntityId>,
    extensions: Vec<ExtensionRef>,
}

impl ZoneBuilder<'_> {
    fn build_objects(&mut self, parent: EntityId, records: &[Value]) -> Result<(), EngineError> {
        for record in records {
            let child = self.build_object(record)?;
            self.scene.attach_child(parent, child)?;
        }
        Ok(())
    }

    fn build_object(&mut self, record: &Value) -> Result<EntityId, EngineError> {
        let object: ObjectRecord = parse_record("object", record)?;

        let entity = self.scene.create_entity(object.name.clone());
        self.created.push(entity);

        if let Some(transform) = &object.transform {
            if let Some(slot) = self.scene.transform_mut(entity) {
                *slot = transform.to_transform();
            }
        }

        for data in &object.components {
            self.attach(entity, ExtensionKind::Component, data)?;
        }
        for data in &object.behaviours {
            self.attach(entity, ExtensionKind::Behaviour, data)?;
        }

        self.build_objects(entity, &object.children)?;
        Ok(entity)
    }

    fn attach(&mut self, entity: EntityId, kind: ExtensionKind, data: &Value) -> Result<(), EngineError> {
        let extension = match self.registry.construct(kind, data)? {
            BuiltExtension::Component(component) => self.scene.add_component(entity, component)?,
            BuiltExtension::Behaviour(behaviour) => self.scene.add_behaviour(entity, behaviour)?,
        };
        self.extensions.push(extension);
        Ok(())
    }

    fn discard(&mut self) {
        for entity in self.created.drain(..) {
            if self.scene.contains(entity) {
                // Unattached nodes are their own subtree roots
                if let Err(e) = self.scene.remove_subtree(entity) {
                    warn!("Could not discard partially built entity {entity:?}: {e}");
                }
            }
        }
        self.extensions.clear();
    }
}
