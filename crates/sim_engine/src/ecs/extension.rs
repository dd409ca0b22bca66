//! Shared extension record and capability trait

use log::warn;

use crate::context::SimContext;
use crate::events::Message;
use crate::foundation::any::AsAny;
use crate::scene::EntityId;

use super::{Behaviour, Component};

/// Which attachment list an extension lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExtensionKind {
    /// Loaded, updated and rendered
    Component,
    /// Updated, with a one-off `update_ready` after load
    Behaviour,
}

impl ExtensionKind {
    /// Lowercase label used in logs and errors
    pub fn label(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Behaviour => "behaviour",
        }
    }
}

/// Stable address of an attached extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtensionRef {
    /// Owning entity
    pub entity: EntityId,
    /// Component or behaviour list
    pub kind: ExtensionKind,
    /// Position in that list (attachment order)
    pub index: usize,
}

impl ExtensionRef {
    /// Address of the `index`-th component of `entity`
    pub fn component(entity: EntityId, index: usize) -> Self {
        Self {
            entity,
            kind: ExtensionKind::Component,
            index,
        }
    }

    /// Address of the `index`-th behaviour of `entity`
    pub fn behaviour(entity: EntityId, index: usize) -> Self {
        Self {
            entity,
            kind: ExtensionKind::Behaviour,
            index,
        }
    }
}

/// Data every extension carries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionBase {
    /// Display name, used for lookups by sibling extensions
    pub name: String,
    owner: Option<EntityId>,
}

impl ExtensionBase {
    /// Unbound record with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
        }
    }

    /// Entity this extension is attached to
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    /// Bind the owner; refused with a warning once already bound
    pub fn bind(&mut self, owner: EntityId) -> bool {
        if let Some(existing) = self.owner {
            warn!(
                "Extension '{}' is already owned by {existing:?}; ignoring rebind to {owner:?}",
                self.name
            );
            return false;
        }
        self.owner = Some(owner);
        true
    }
}

/// Capabilities shared by components and behaviours
pub trait Extension: AsAny {
    /// Shared record
    fn base(&self) -> &ExtensionBase;

    /// Shared record, mutable
    fn base_mut(&mut self) -> &mut ExtensionBase;

    /// Display name
    fn name(&self) -> &str {
        &self.base().name
    }

    /// Owning entity, once attached
    fn owner(&self) -> Option<EntityId> {
        self.base().owner()
    }

    /// Bind the owning entity (only the first call has an effect)
    fn set_owner(&mut self, owner: EntityId) -> bool {
        self.base_mut().bind(owner)
    }

    /// Message codes to subscribe when the extension is attached
    fn subscriptions(&self) -> Vec<String> {
        Vec::new()
    }

    /// Per-tick update; `delta_ms` is the frame time in milliseconds
    fn update(&mut self, _delta_ms: f32, _ctx: &mut SimContext<'_>) {}

    /// Handle a delivered message
    fn on_message(&mut self, _message: &Message, _ctx: &mut SimContext<'_>) {}
}

/// Output of the extension registry
pub enum BuiltExtension {
    /// A freshly built component
    Component(Box<dyn Component>),
    /// A freshly built behaviour
    Behaviour(Box<dyn Behaviour>),
}

impl BuiltExtension {
    /// Which list the extension belongs to
    pub fn kind(&self) -> ExtensionKind {
        match self {
            Self::Component(_) => ExtensionKind::Component,
            Self::Behaviour(_) => ExtensionKind::Behaviour,
        }
    }

    /// Display name of the wrapped extension
    pub fn name(&self) -> &str {
        match self {
            Self::Component(component) => component.name(),
            Self::Behaviour(behaviour) => behaviour.name(),
        }
    }

    /// Unwrap a component
    pub fn into_component(self) -> Option<Box<dyn Component>> {
        match self {
            Self::Component(component) => Some(component),
            Self::Behaviour(_) => None,
        }
    }

    /// Unwrap a behaviour
    pub fn into_behaviour(self) -> Option<Box<dyn Behaviour>> {
        match self {
            Self::Behaviour(behaviour) => Some(behaviour),
            Self::Component(_) => None,
        }
    }
}

impl std::fmt::Debug for BuiltExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuiltExtension::{:?}({:?})", self.kind(), self.name())
    }
}
