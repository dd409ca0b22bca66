//! Message-controlled scrolling with wrap-around
//!
//! Used for endlessly scrolling ground and obstacles: the owner moves by
//! `velocity` (units per second) while scrolling and jumps back to
//! `resetPosition` once it has passed `minPosition` on both axes. With both
//! `minResetY` and `maxResetY` given the reset height is randomised.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::record::{parse_record, Vec2Record};
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::engine::EngineError;
use crate::events::Message;
use crate::foundation::math::Vec2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrollData {
    name: String,
    velocity: Vec2Record,
    min_position: Vec2Record,
    reset_position: Vec2Record,
    start_message: Option<String>,
    stop_message: Option<String>,
    reset_message: Option<String>,
    min_reset_y: Option<f32>,
    max_reset_y: Option<f32>,
}

/// Scrolls the owner between start and stop messages
#[derive(Debug)]
pub struct ScrollBehaviour {
    base: ExtensionBase,
    velocity: Vec2,
    min_position: Vec2,
    reset_position: Vec2,
    start_message: Option<String>,
    stop_message: Option<String>,
    reset_message: Option<String>,
    reset_y_range: Option<(f32, f32)>,
    scrolling: bool,
    initial_position: Vec2,
    rng: StdRng,
}

impl ScrollBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "scroll";

    /// Build from a `scroll` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: ScrollData = parse_record(Self::TYPE, record)?;

        let reset_y_range = match (data.min_reset_y, data.max_reset_y) {
            (Some(min), Some(max)) if min <= max => Some((min, max)),
            (Some(min), Some(max)) => Some((max, min)),
            _ => None,
        };

        Ok(Self {
            base: ExtensionBase::new(data.name),
            velocity: data.velocity.to_vec2(),
            min_position: data.min_position.to_vec2(),
            reset_position: data.reset_position.to_vec2(),
            start_message: data.start_message,
            stop_message: data.stop_message,
            reset_message: data.reset_message,
            reset_y_range,
            scrolling: false,
            initial_position: Vec2::zeros(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Builder pattern: deterministic reset heights
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Whether the owner is currently moving
    pub fn is_scrolling(&self) -> bool {
        self.scrolling
    }

    fn reset_target(&mut self) -> Vec2 {
        match self.reset_y_range {
            Some((min, max)) => Vec2::new(self.reset_position.x, self.rng.gen_range(min..=max)),
            None => self.reset_position,
        }
    }
}

impl Extension for ScrollBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn update(&mut self, delta_ms: f32, ctx: &mut SimContext<'_>) {
        let Some(owner) = self.owner() else {
            return;
        };
        let Some(transform) = ctx.scene.transform_mut(owner) else {
            return;
        };

        if self.scrolling {
            let step = self.velocity * (delta_ms / 1000.0);
            transform.position.x += step.x;
            transform.position.y += step.y;
        }

        if transform.position.x <= self.min_position.x && transform.position.y <= self.min_position.y {
            let reset = self.reset_target();
            transform.position.x = reset.x;
            transform.position.y = reset.y;
        }
    }

    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        let code = Some(message.code.as_str());
        if code == self.start_message.as_deref() {
            self.scrolling = true;
        }
        if code == self.stop_message.as_deref() {
            self.scrolling = false;
        }
        if code == self.reset_message.as_deref() {
            let initial = self.initial_position;
            if let Some(transform) = self.owner().and_then(|owner| ctx.scene.transform_mut(owner)) {
                transform.position.x = initial.x;
                transform.position.y = initial.y;
            }
        }
    }
}

impl Behaviour for ScrollBehaviour {
    fn update_ready(&mut self, ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        for code in [&self.start_message, &self.stop_message, &self.reset_message]
            .into_iter()
            .flatten()
        {
            ctx.subscribe(code);
        }

        if let Some(transform) = self.owner().and_then(|owner| ctx.scene.transform(owner)) {
            self.initial_position = Vec2::new(transform.position.x, transform.position.y);
        }
        debug!("Scroll '{}' ready at {:?}", self.name(), self.initial_position);
        Ok(())
    }
}
