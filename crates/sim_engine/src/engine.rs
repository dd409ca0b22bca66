//! Core engine implementation
//!
//! The engine owns every subsystem (scene, bus, collision detector, registry,
//! input, assets, audio) and the zone lifecycle. There is no global state:
//! several engines can live side by side.

use std::collections::HashMap;

use log::{debug, error, info};
use serde_json::Value;
use thiserror::Error;

use crate::application::{AppError, Application};
use crate::assets::{Asset, AssetManager, AssetProvider};
use crate::audio::{AudioPlayer, NullAudio};
use crate::config::{ConfigError, EngineConfig};
use crate::context::SimContext;
use crate::ecs::{Behaviour, Component, ExtensionKind, ExtensionRef, ExtensionRegistry};
use crate::events::{codes, HandlerId, ListenerId, Message, MessageBus, MessageHandler, Payload, Sender};
use crate::foundation::time::Timer;
use crate::input::{InputManager, KeyCode, MouseButton};
use crate::physics::{CollisionDetector, CollisionReport, ShapeError};
use crate::render::RenderContext;
use crate::scene::{
    build_zone, load_component, load_tree, ready_behaviour, render_tree, update_ready_tree,
    update_tree, EntityId, Scene, SceneError, Zone, ZoneState,
};

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A declarative record is missing a required field or holds a bad value
    #[error("Invalid {context} record: {message}")]
    Configuration {
        /// Type tag or record kind being parsed
        context: String,
        /// What was wrong
        message: String,
    },

    /// A named sibling an extension depends on could not be found
    #[error("'{extension}' could not resolve '{target}'")]
    Resolution {
        /// Extension doing the lookup
        extension: String,
        /// Name it looked for
        target: String,
    },

    /// Transform graph edit failed
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Collision test failed
    #[error("Collision error: {0}")]
    Shape(#[from] ShapeError),

    /// Engine configuration file could not be read
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Animation frame outside the sprite's frame count
    #[error("Frame {frame} is out of range (frame count {count})")]
    FrameOutOfRange {
        /// Requested frame
        frame: usize,
        /// Frames available
        count: u32,
    },

    /// `change_zone` was called with an id nobody registered
    #[error("Zone {0} is not registered")]
    ZoneNotRegistered(u32),

    /// A zone asset is not a JSON document
    #[error("Zone asset '{0}' is not a JSON document")]
    InvalidZoneAsset(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::Configuration`]
    pub fn configuration(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Main engine struct
///
/// The engine coordinates all subsystems and manages the main loop.
pub struct Engine {
    scene: Scene,
    bus: MessageBus,
    collisions: CollisionDetector,
    registry: ExtensionRegistry,
    input: InputManager,
    assets: AssetManager,
    audio: Box<dyn AudioPlayer>,

    /// Zone id to zone asset name
    zones: HashMap<u32, String>,
    active_zone: Option<Zone>,
    pending_zone: Option<u32>,

    config: EngineConfig,
    timer: Timer,
    running: bool,
}

impl Engine {
    /// Create an engine with the built-in extensions and silent audio
    pub fn new(config: EngineConfig) -> Self {
        info!("Initializing engine...");
        Self {
            scene: Scene::new(),
            bus: MessageBus::new(config.bus.clone()),
            collisions: CollisionDetector::new(),
            registry: ExtensionRegistry::with_builtins(),
            input: InputManager::new(),
            assets: AssetManager::new(),
            audio: Box::new(NullAudio),
            zones: HashMap::new(),
            active_zone: None,
            pending_zone: None,
            config,
            timer: Timer::new(),
            running: false,
        }
    }

    /// Builder pattern: route sounds to `audio`
    pub fn with_audio(mut self, audio: Box<dyn AudioPlayer>) -> Self {
        self.audio = audio;
        self
    }

    fn parts(&mut self) -> (SimContext<'_>, &mut CollisionDetector) {
        let ctx = SimContext::new(
            &mut self.scene,
            &mut self.bus,
            &self.input,
            &self.assets,
            self.audio.as_mut(),
        );
        (ctx, &mut self.collisions)
    }

    fn updating_root(&self) -> Option<EntityId> {
        self.active_zone
            .as_ref()
            .filter(|zone| zone.state() == ZoneState::Updating)
            .map(Zone::root)
    }

    /// Advance the simulation by one frame
    ///
    /// Drains pending messages, updates the active zone's tree, runs collision
    /// detection, then loads a pending zone whose asset has arrived.
    pub fn tick(&mut self, delta_ms: f32) -> Result<CollisionReport, EngineError> {
        let cap = self.config.bus.messages_per_update;
        let root = self.updating_root();

        let (mut ctx, collisions) = self.parts();
        ctx.drain(cap);
        let report = match root {
            Some(root) => {
                update_tree(&mut ctx, root, delta_ms);
                collisions.update(delta_ms, &mut ctx)?
            }
            None => CollisionReport::default(),
        };

        self.load_pending_zone()?;
        Ok(report)
    }

    /// Draw the active zone
    pub fn render(&self, rc: &mut dyn RenderContext) {
        if let Some(root) = self.updating_root() {
            render_tree(&self.scene, root, rc);
        }
    }

    /// Build, load and activate a zone from its declarative record
    ///
    /// Any active zone is unloaded first. On failure everything built for the
    /// new zone is torn down again and no zone is active.
    pub fn load_zone(&mut self, record: &Value) -> Result<u32, EngineError> {
        self.unload_zone()?;

        let built = build_zone(&mut self.scene, &self.registry, record)?;
        let mut zone = built.zone;
        zone.set_state(ZoneState::Loading);
        info!("Loading zone {} '{}'", zone.id(), zone.name());

        for extension in &built.extensions {
            self.subscribe_extension(*extension);
        }

        if let Err(e) = self.activate(zone.root()) {
            error!("Zone {} '{}' failed to load: {e}", zone.id(), zone.name());
            self.teardown(zone.root())?;
            return Err(e);
        }

        zone.set_state(ZoneState::Updating);
        info!("Zone {} '{}' is running", zone.id(), zone.name());
        let id = zone.id();
        self.active_zone = Some(zone);
        Ok(id)
    }

    fn activate(&mut self, root: EntityId) -> Result<(), EngineError> {
        let (mut ctx, collisions) = self.parts();
        for collider in load_tree(&mut ctx, root)? {
            collisions.register(collider);
        }
        update_ready_tree(&mut ctx, root)
    }

    /// Tear down the active zone, if any
    pub fn unload_zone(&mut self) -> Result<(), EngineError> {
        if let Some(zone) = self.active_zone.take() {
            info!("Unloading zone {} '{}'", zone.id(), zone.name());
            self.teardown(zone.root())?;
        }
        Ok(())
    }

    /// Map a zone id to the name of its JSON asset
    pub fn register_zone(&mut self, id: u32, asset_name: impl Into<String>) {
        let asset_name = asset_name.into();
        debug!("Registered zone {id} as '{asset_name}'");
        self.zones.insert(id, asset_name);
    }

    /// Switch to a registered zone
    ///
    /// Loads immediately when the zone asset is present; otherwise the zone is
    /// loaded on the first tick after the asset arrives.
    pub fn change_zone(&mut self, id: u32) -> Result<(), EngineError> {
        let asset_name = self
            .zones
            .get(&id)
            .cloned()
            .ok_or(EngineError::ZoneNotRegistered(id))?;

        self.unload_zone()?;
        if self.assets.is_loaded(&asset_name) {
            self.pending_zone = None;
            self.load_zone_asset(&asset_name)?;
        } else {
            info!("Zone {id} waits for asset '{asset_name}'");
            self.pending_zone = Some(id);
        }
        Ok(())
    }

    fn load_pending_zone(&mut self) -> Result<(), EngineError> {
        let Some(id) = self.pending_zone else {
            return Ok(());
        };
        let Some(asset_name) = self.zones.get(&id).cloned() else {
            self.pending_zone = None;
            return Err(EngineError::ZoneNotRegistered(id));
        };
        if self.assets.is_loaded(&asset_name) {
            self.pending_zone = None;
            self.load_zone_asset(&asset_name)?;
        }
        Ok(())
    }

    fn load_zone_asset(&mut self, asset_name: &str) -> Result<u32, EngineError> {
        let asset = self
            .assets
            .get(asset_name)
            .ok_or_else(|| EngineError::InvalidZoneAsset(asset_name.to_string()))?;
        let record = asset
            .as_json()
            .ok_or_else(|| EngineError::InvalidZoneAsset(asset_name.to_string()))?;
        self.load_zone(record)
    }

    /// Remove `entity` and its subtree
    ///
    /// Every extension in the subtree is unsubscribed and its collider
    /// unregistered before the nodes are dropped. Returns the number of
    /// removed nodes.
    pub fn destroy_entity(&mut self, entity: EntityId) -> Result<usize, EngineError> {
        if self.active_zone.as_ref().is_some_and(|zone| zone.root() == entity) {
            self.active_zone = None;
        }
        self.teardown(entity)
    }

    fn teardown(&mut self, entity: EntityId) -> Result<usize, EngineError> {
        let extensions: Vec<ExtensionRef> = self
            .scene
            .subtree(entity)
            .into_iter()
            .flat_map(|id| self.scene.extension_refs(id))
            .collect();

        // Dying extensions must not hear about the contacts ending below
        for extension in &extensions {
            self.bus.unsubscribe_all(HandlerId::Extension(*extension));
        }

        let (mut ctx, collisions) = self.parts();
        for extension in extensions {
            if collisions.is_registered(extension) {
                collisions.unregister(extension, &mut ctx);
            }
        }
        Ok(self.scene.remove_subtree(entity)?)
    }

    fn subscribe_extension(&mut self, extension: ExtensionRef) {
        let codes = match extension.kind {
            ExtensionKind::Component => self.scene.get_component(extension).map(|c| c.subscriptions()),
            ExtensionKind::Behaviour => self.scene.get_behaviour(extension).map(|b| b.subscriptions()),
        };
        for code in codes.unwrap_or_default() {
            self.bus.subscribe(&code, HandlerId::Extension(extension));
        }
    }

    /// Create a detached entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.scene.create_entity(name)
    }

    /// Attach `child` under `parent`
    pub fn attach_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        Ok(self.scene.attach_child(parent, child)?)
    }

    /// Attach a component to a live entity
    ///
    /// Subscribes its message codes and runs its `load` step, as a zone load
    /// would. A collider is registered with the detector once loaded. If
    /// `load` fails the component stays attached but is never registered.
    pub fn add_component(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<ExtensionRef, EngineError> {
        let extension = self.scene.add_component(entity, component)?;
        self.subscribe_extension(extension);

        let (mut ctx, collisions) = self.parts();
        if load_component(&mut ctx, extension)? {
            collisions.register(extension);
        }
        Ok(extension)
    }

    /// Attach a behaviour to a live entity
    ///
    /// Subscribes its message codes and runs its `update_ready` step, so
    /// message-driven behaviours and sibling lookups work as in a zone load.
    pub fn add_behaviour(
        &mut self,
        entity: EntityId,
        behaviour: Box<dyn Behaviour>,
    ) -> Result<ExtensionRef, EngineError> {
        let extension = self.scene.add_behaviour(entity, behaviour)?;
        self.subscribe_extension(extension);

        let (mut ctx, _) = self.parts();
        ready_behaviour(&mut ctx, extension)?;
        Ok(extension)
    }

    /// Publish a message from the host
    pub fn post(&mut self, message: Message) {
        let (mut ctx, _) = self.parts();
        ctx.post(message);
    }

    /// Register a host listener for `code`
    pub fn add_listener(&mut self, code: &str, handler: Box<dyn MessageHandler>) -> ListenerId {
        let id = self.bus.add_listener(handler);
        self.bus.subscribe(code, HandlerId::Listener(id));
        id
    }

    /// Subscribe an existing listener to another code
    pub fn subscribe_listener(&mut self, code: &str, id: ListenerId) -> bool {
        self.bus.subscribe(code, HandlerId::Listener(id))
    }

    /// Drop a host listener and all its subscriptions
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe_all(HandlerId::Listener(id));
        self.bus.remove_listener(id)
    }

    /// Deliver at most `cap` pending NORMAL deliveries
    pub fn drain_messages(&mut self, cap: usize) -> usize {
        let (mut ctx, _) = self.parts();
        ctx.drain(cap)
    }

    /// Record a key transition
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        self.input.handle_key_input(key, pressed);
    }

    /// Record a mouse button transition and post `MOUSE_DOWN`/`MOUSE_UP`
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.input.handle_mouse_button(button, pressed);
        let code = if pressed { codes::MOUSE_DOWN } else { codes::MOUSE_UP };
        let message =
            Message::new(code, Sender::Input).with_payload(self.input.mouse_context());
        self.post(message);
    }

    /// Record the pointer position
    pub fn handle_mouse_move(&mut self, x: f32, y: f32) {
        self.input.handle_mouse_move(x, y);
    }

    /// Store a decoded asset and announce `ASSET_LOADED::<name>`
    pub fn on_asset_loaded(&mut self, name: &str, asset: Asset) {
        let asset = self.assets.insert(name, asset);
        let message = Message::new(codes::asset_loaded(name), Sender::Assets).with_payload(
            Payload::Asset {
                name: name.to_string(),
                asset,
            },
        );
        self.post(message);
    }

    /// Run the main loop with the given application
    ///
    /// Stops when the application calls [`Engine::quit`] or after
    /// `max_frames` frames.
    pub fn run<A: Application>(&mut self, app: &mut A, max_frames: Option<u64>) -> Result<(), AppError> {
        app.initialize(self)?;
        info!("Starting main loop...");

        self.running = true;
        let mut frames = 0;
        while self.running && max_frames.map_or(true, |max| frames < max) {
            self.timer.update();
            let delta_ms = self.config.fixed_delta_ms.unwrap_or_else(|| self.timer.delta_ms());

            app.update(self, delta_ms)?;
            self.tick(delta_ms)?;
            app.render(self)?;
            frames += 1;
        }

        app.cleanup(self);
        info!("Engine shutdown complete after {frames} frame(s)");
        Ok(())
    }

    /// Request main loop shutdown
    pub fn quit(&mut self) {
        info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Transform graph
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Transform graph, mutable
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Message bus
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// Collision detector
    pub fn collisions(&self) -> &CollisionDetector {
        &self.collisions
    }

    /// Extension registry, for registering custom extension types
    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.registry
    }

    /// Input state
    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Loaded assets
    pub fn assets(&self) -> &AssetManager {
        &self.assets
    }

    /// Active zone
    pub fn active_zone(&self) -> Option<&Zone> {
        self.active_zone.as_ref()
    }

    /// Zone waiting for its asset
    pub fn pending_zone(&self) -> Option<u32> {
        self.pending_zone
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
