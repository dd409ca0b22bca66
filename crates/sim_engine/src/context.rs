//! Per-call simulation context
//!
//! A `SimContext` bundles mutable access to the scene and the bus together
//! with the read-only collaborators (input, assets) and the audio sink. It is
//! handed to every extension call and to every message delivery, and it is the
//! only place where messages are actually dispatched.

use std::rc::Rc;

use log::{debug, trace, warn};

use crate::assets::AssetProvider;
use crate::audio::AudioPlayer;
use crate::ecs::ExtensionKind;
use crate::events::bus::TakeError;
use crate::events::{HandlerId, Message, MessageBus, Payload, Priority, Sender};
use crate::input::InputManager;
use crate::scene::Scene;

/// Simulation state reachable from a running extension or listener
pub struct SimContext<'a> {
    /// Transform graph
    pub scene: &'a mut Scene,
    /// Subscriptions and pending deliveries
    pub bus: &'a mut MessageBus,
    /// Current key and pointer state
    pub input: &'a InputManager,
    /// Loaded assets
    pub assets: &'a dyn AssetProvider,
    /// Sound sink
    pub audio: &'a mut dyn AudioPlayer,
    current: Option<HandlerId>,
    depth: u32,
}

impl<'a> SimContext<'a> {
    /// Assemble a context at the top of the dispatch stack
    pub fn new(
        scene: &'a mut Scene,
        bus: &'a mut MessageBus,
        input: &'a InputManager,
        assets: &'a dyn AssetProvider,
        audio: &'a mut dyn AudioPlayer,
    ) -> Self {
        Self {
            scene,
            bus,
            input,
            assets,
            audio,
            current: None,
            depth: 0,
        }
    }

    /// Handler currently executing, if any
    pub fn current(&self) -> Option<HandlerId> {
        self.current
    }

    /// Nesting level of synchronous deliveries
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Sender value for messages posted by the current handler
    pub fn sender(&self) -> Sender {
        match self.current {
            Some(HandlerId::Extension(extension)) => Sender::Extension(extension),
            _ => Sender::Host,
        }
    }

    /// Run `f` with `handler` marked as the current handler
    pub fn run_as<R>(&mut self, handler: HandlerId, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.current.replace(handler);
        let result = f(self);
        self.current = previous;
        result
    }

    /// Subscribe the current handler to `code`
    pub fn subscribe(&mut self, code: &str) -> bool {
        match self.current {
            Some(handler) => self.bus.subscribe(code, handler),
            None => {
                warn!("subscribe('{code}') called outside of a handler");
                false
            }
        }
    }

    /// Unsubscribe the current handler from `code`
    pub fn unsubscribe(&mut self, code: &str) -> bool {
        match self.current {
            Some(handler) => self.bus.unsubscribe(code, handler),
            None => {
                warn!("unsubscribe('{code}') called outside of a handler");
                false
            }
        }
    }

    /// Post a NORMAL message from the current handler
    pub fn send(&mut self, code: impl Into<String>, payload: Option<Payload>) {
        let mut message = Message::new(code, self.sender());
        message.payload = payload;
        self.post(message);
    }

    /// Post a HIGH message from the current handler
    pub fn send_priority(&mut self, code: impl Into<String>, payload: Option<Payload>) {
        let mut message = Message::new(code, self.sender()).high();
        message.payload = payload;
        self.post(message);
    }

    /// Play a named sound through the audio collaborator
    pub fn play_sound(&mut self, name: &str) {
        self.audio.play_sound(name);
    }

    /// Publish a message
    ///
    /// HIGH messages are delivered to every subscriber before this returns.
    /// NORMAL messages queue one delivery per subscriber.
    ///
    /// A HIGH delivery cannot reach a subscriber that is executing further up
    /// the stack, which includes the extension that is posting. Such a
    /// delivery, like one nested deeper than the configured limit, is queued
    /// as a pending pair and arrives with the next drain, usually on a later
    /// tick.
    pub fn post(&mut self, message: Message) {
        let subscribers = self.bus.subscribers(&message.code);
        if subscribers.is_empty() {
            trace!("'{}' has no subscribers", message.code);
            return;
        }

        match message.priority {
            Priority::Normal => {
                let shared = Rc::new(message);
                for handler in subscribers {
                    self.bus.enqueue(Rc::clone(&shared), handler);
                }
            }
            Priority::High => {
                trace!("Dispatching '{}' to {} handler(s)", message.code, subscribers.len());
                let max_depth = self.bus.config().max_dispatch_depth;
                let mut deferred: Option<Rc<Message>> = None;

                for handler in subscribers {
                    // An earlier handler may have unsubscribed this one
                    if !self.bus.is_subscribed(&message.code, handler) {
                        continue;
                    }

                    let outcome = if self.depth >= max_depth {
                        Err(TakeError::Busy)
                    } else {
                        self.dispatch(&message, handler)
                    };

                    match outcome {
                        Ok(()) => {}
                        Err(TakeError::Busy) => {
                            let shared = deferred.get_or_insert_with(|| Rc::new(message.clone()));
                            self.bus.enqueue(Rc::clone(shared), handler);
                        }
                        Err(TakeError::Missing) => {
                            debug!("Skipping '{}' for vanished handler {handler:?}", message.code);
                        }
                    }
                }
            }
        }
    }

    /// Deliver at most `cap` pending deliveries; returns how many were taken
    pub(crate) fn drain(&mut self, cap: usize) -> usize {
        let mut taken = 0;
        while taken < cap {
            let Some((message, handler)) = self.bus.pop_pending() else {
                break;
            };
            match self.dispatch(&message, handler) {
                Ok(()) => {}
                Err(TakeError::Busy) => {
                    self.bus.requeue((message, handler));
                    break;
                }
                Err(TakeError::Missing) => {
                    debug!("Skipping '{}' for vanished handler {handler:?}", message.code);
                }
            }
            taken += 1;
        }
        taken
    }

    fn dispatch(&mut self, message: &Message, handler: HandlerId) -> Result<(), TakeError> {
        match handler {
            HandlerId::Extension(extension) => match extension.kind {
                ExtensionKind::Component => {
                    let mut component = self.scene.take_component(extension)?;
                    self.nested(handler, |ctx| component.on_message(message, ctx));
                    self.scene.restore_component(extension, component);
                }
                ExtensionKind::Behaviour => {
                    let mut behaviour = self.scene.take_behaviour(extension)?;
                    self.nested(handler, |ctx| behaviour.on_message(message, ctx));
                    self.scene.restore_behaviour(extension, behaviour);
                }
            },
            HandlerId::Listener(id) => {
                let mut listener = self.bus.take_listener(id)?;
                self.nested(handler, |ctx| listener.on_message(message, ctx));
                self.bus.restore_listener(id, listener);
            }
        }
        Ok(())
    }

    fn nested(&mut self, handler: HandlerId, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        self.run_as(handler, f);
        self.depth -= 1;
    }
}
