//! Scene management
//!
//! The transform graph is an arena of [`EntityNode`]s keyed by [`EntityId`].
//! Each node carries a local transform, a world matrix derived from its
//! parent's, and its attached extensions. Zones are subtrees hung under the
//! scene's permanent root.

mod entity;
mod scene_graph;
pub mod traversal;
pub mod zone;

pub use entity::{EntityId, EntityNode};
pub use scene_graph::{Scene, SceneError};
pub use traversal::{
    load_component, load_tree, ready_behaviour, render_tree, update_ready_tree, update_tree,
};
pub use zone::{build_zone, BuiltZone, Zone, ZoneRecord, ZoneState};
