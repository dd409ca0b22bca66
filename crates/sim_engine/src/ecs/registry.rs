//! Type-tag keyed extension factories

use std::collections::HashMap;

use log::debug;
use serde_json::Value;

use super::behaviours::{
    KeyboardMovementBehaviour, MouseClickBehaviour, PlayerBehaviour, RotationBehaviour,
    ScrollBehaviour, VisibilityOnMessageBehaviour,
};
use super::components::{
    AnimatedSpriteComponent, BitmapTextComponent, CollisionComponent, SpriteComponent,
};
use super::record::record_type;
use super::{Behaviour, BuiltExtension, Component, ExtensionKind};
use crate::engine::EngineError;

/// Factory turning a declarative record into an extension
pub type ExtensionBuilder = Box<dyn Fn(&Value) -> Result<BuiltExtension, EngineError>>;

/// Registry of extension builders
///
/// Builders are keyed by kind and type tag; registering the same key again
/// replaces the previous builder.
#[derive(Default)]
pub struct ExtensionRegistry {
    builders: HashMap<(ExtensionKind, String), ExtensionBuilder>,
}

impl ExtensionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in component and behaviour
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_component(SpriteComponent::TYPE, |record| {
            Ok(Box::new(SpriteComponent::from_record(record)?))
        });
        registry.register_component(AnimatedSpriteComponent::TYPE, |record| {
            Ok(Box::new(AnimatedSpriteComponent::from_record(record)?))
        });
        registry.register_component(CollisionComponent::TYPE, |record| {
            Ok(Box::new(CollisionComponent::from_record(record)?))
        });
        registry.register_component(BitmapTextComponent::TYPE, |record| {
            Ok(Box::new(BitmapTextComponent::from_record(record)?))
        });

        registry.register_behaviour(RotationBehaviour::TYPE, |record| {
            Ok(Box::new(RotationBehaviour::from_record(record)?))
        });
        registry.register_behaviour(KeyboardMovementBehaviour::TYPE, |record| {
            Ok(Box::new(KeyboardMovementBehaviour::from_record(record)?))
        });
        registry.register_behaviour(ScrollBehaviour::TYPE, |record| {
            Ok(Box::new(ScrollBehaviour::from_record(record)?))
        });
        registry.register_behaviour(MouseClickBehaviour::TYPE, |record| {
            Ok(Box::new(MouseClickBehaviour::from_record(record)?))
        });
        registry.register_behaviour(VisibilityOnMessageBehaviour::TYPE, |record| {
            Ok(Box::new(VisibilityOnMessageBehaviour::from_record(record)?))
        });
        registry.register_behaviour(PlayerBehaviour::TYPE, |record| {
            Ok(Box::new(PlayerBehaviour::from_record(record)?))
        });

        registry
    }

    /// Register a raw builder for `(kind, tag)`
    pub fn register(&mut self, kind: ExtensionKind, tag: &str, builder: ExtensionBuilder) {
        if self.builders.insert((kind, tag.to_string()), builder).is_some() {
            debug!("Replaced {} builder '{tag}'", kind.label());
        } else {
            debug!("Registered {} builder '{tag}'", kind.label());
        }
    }

    /// Register a component builder
    pub fn register_component<F>(&mut self, tag: &str, builder: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Component>, EngineError> + 'static,
    {
        self.register(
            ExtensionKind::Component,
            tag,
            Box::new(move |record| builder(record).map(BuiltExtension::Component)),
        );
    }

    /// Register a behaviour builder
    pub fn register_behaviour<F>(&mut self, tag: &str, builder: F)
    where
        F: Fn(&Value) -> Result<Box<dyn Behaviour>, EngineError> + 'static,
    {
        self.register(
            ExtensionKind::Behaviour,
            tag,
            Box::new(move |record| builder(record).map(BuiltExtension::Behaviour)),
        );
    }

    /// Whether a builder exists for `(kind, tag)`
    pub fn contains(&self, kind: ExtensionKind, tag: &str) -> bool {
        self.builders.contains_key(&(kind, tag.to_string()))
    }

    /// Build an extension of `kind` from its record
    ///
    /// The record's `type` field selects the builder.
    pub fn construct(&self, kind: ExtensionKind, record: &Value) -> Result<BuiltExtension, EngineError> {
        let tag = record_type(record)
            .ok_or_else(|| EngineError::configuration(kind.label(), "record has no 'type' field"))?;

        let builder = self.builders.get(&(kind, tag.to_string())).ok_or_else(|| {
            EngineError::configuration(kind.label(), format!("unregistered type '{tag}'"))
        })?;

        builder(record)
    }
}
