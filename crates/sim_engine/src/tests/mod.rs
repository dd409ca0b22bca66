//! Cross-module scenarios
//!
//! - [`transforms`] - world matrix composition through the update pass
//! - [`messaging`] - subscription, priority delivery and bounded drain
//! - [`collisions`] - contact lifecycle driven by engine ticks
//! - [`zones`] - zone loading, switching and teardown
//! - [`extensions`] - built-in behaviours and components inside a running zone

mod collisions;
mod extensions;
mod messaging;

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::assets::AssetManager;
use crate::audio::RecordingAudio;
use crate::context::SimContext;
use crate::events::{Message, MessageBus, MessageHandler};
use crate::input::InputManager;
use crate::scene::Scene;

/// Shared log of strings written by test handlers
pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

struct FnListener<F>(F);

impl<F> MessageHandler for FnListener<F>
where
    F: FnMut(&Message, &mut SimContext<'_>),
{
    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        (self.0)(message, ctx);
    }
}

/// Box a closure as a host listener
pub(crate) fn listener<F>(f: F) -> Box<dyn MessageHandler>
where
    F: FnMut(&Message, &mut SimContext<'_>) + 'static,
{
    Box::new(FnListener(f))
}

/// Listener appending every received code to `log`
pub(crate) fn code_logger(log: &Log) -> Box<dyn MessageHandler> {
    let log = Rc::clone(log);
    listener(move |message, _| log.borrow_mut().push(message.code.clone()))
}

/// Standalone subsystems for driving traversals without an engine
#[derive(Default)]
pub(crate) struct Harness {
    pub scene: Scene,
    pub bus: MessageBus,
    pub input: InputManager,
    pub assets: AssetManager,
    pub audio: RecordingAudio,
}

impl Harness {
    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext::new(
            &mut self.scene,
            &mut self.bus,
            &self.input,
            &self.assets,
            &mut self.audio,
        )
    }
}

/// Zone record with the given objects
pub(crate) fn zone(id: u32, name: &str, objects: Value) -> Value {
    json!({ "id": id, "name": name, "objects": objects })
}

/// Collision component record with a circle shape
pub(crate) fn circle_collider(name: &str, radius: f32, is_static: bool) -> Value {
    json!({
        "type": "collision",
        "name": name,
        "static": is_static,
        "shape": { "type": "circle", "radius": radius }
    })
}
