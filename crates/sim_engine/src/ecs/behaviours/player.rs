//! Flapping player
//!
//! Integrates gravity into a vertical velocity, tilts the owner with the
//! direction of travel and drives the game flow messages: it reacts to input,
//! contacts and the `GAME_*` lifecycle codes, and announces deaths, scores and
//! which UI layers should be visible.

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::context::SimContext;
use crate::ecs::components::AnimatedSpriteComponent;
use crate::ecs::record::{parse_record, Vec2Record};
use crate::ecs::{Behaviour, Extension, ExtensionBase, ExtensionRef};
use crate::engine::EngineError;
use crate::events::{codes, Message, Payload};
use crate::foundation::math::{utils::deg_to_rad, Vec2, Vec3};

const MAX_FALL_SPEED: f32 = 400.0;
const FLAP_VELOCITY: f32 = -280.0;
const FALLING_SPEED: f32 = 220.0;
const NOSE_UP_DEG_PER_SEC: f32 = 600.0;
const NOSE_DOWN_DEG_PER_SEC: f32 = 480.0;
const MIN_TILT_DEG: f32 = -20.0;
const MAX_TILT_DEG: f32 = 90.0;

fn default_ceiling() -> f32 {
    -13.0
}

fn default_obstacles() -> Vec<String> {
    [
        "pipe1Collision_end",
        "pipe1Collision_middle_top",
        "pipe1Collision_endneg",
        "pipe1Collision_middle_bottom",
    ]
    .iter()
    .map(|name| (*name).to_string())
    .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerData {
    name: String,
    #[serde(default)]
    acceleration: Vec2Record,
    player_collision_component: String,
    ground_collision_component: String,
    animated_sprite_name: String,
    score_collision_component: String,
    #[serde(default = "default_obstacles")]
    obstacle_collision_components: Vec<String>,
    #[serde(default = "default_ceiling", rename = "ceilingY")]
    ceiling_y: f32,
}

/// The player-controlled bird
#[derive(Debug)]
pub struct PlayerBehaviour {
    base: ExtensionBase,
    gravity: Vec2,
    acceleration: Vec2,
    velocity: Vec2,
    ceiling_y: f32,
    player_collider: String,
    ground_collider: String,
    score_collider: String,
    obstacle_colliders: Vec<String>,
    sprite_name: String,
    sprite: Option<ExtensionRef>,
    initial_position: Vec3,
    alive: bool,
    playing: bool,
    score: u32,
    high_score: u32,
}

impl PlayerBehaviour {
    /// Registry type tag
    pub const TYPE: &'static str = "player";

    /// Build from a `player` record
    pub fn from_record(record: &Value) -> Result<Self, EngineError> {
        let data: PlayerData = parse_record(Self::TYPE, record)?;
        let gravity = data.acceleration.apply(Vec2::new(0.0, 920.0));

        Ok(Self {
            base: ExtensionBase::new(data.name),
            gravity,
            acceleration: gravity,
            velocity: Vec2::zeros(),
            ceiling_y: data.ceiling_y,
            player_collider: data.player_collision_component,
            ground_collider: data.ground_collision_component,
            score_collider: data.score_collision_component,
            obstacle_colliders: data.obstacle_collision_components,
            sprite_name: data.animated_sprite_name,
            sprite: None,
            initial_position: Vec3::zeros(),
            alive: true,
            playing: false,
            score: 0,
            high_score: 0,
        })
    }

    /// Current score
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Best score since the zone was loaded
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// False once the player has hit something
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// True between `GAME_START` and the next reset
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current velocity in units per second
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn is_falling(&self) -> bool {
        self.velocity.y > FALLING_SPEED
    }

    fn should_not_flap(&self) -> bool {
        !self.playing || self.is_falling() || !self.alive
    }

    fn sprite_mut<'s>(&self, ctx: &'s mut SimContext<'_>) -> Option<&'s mut AnimatedSpriteComponent> {
        self.sprite
            .and_then(|sprite| ctx.scene.component_mut::<AnimatedSpriteComponent>(sprite))
    }

    fn flap(&mut self, ctx: &mut SimContext<'_>) {
        if self.alive && self.playing {
            self.velocity.y = FLAP_VELOCITY;
            ctx.play_sound("flap");
        }
    }

    fn die(&mut self, ctx: &mut SimContext<'_>) {
        if self.alive {
            self.alive = false;
            info!("Player died with score {}", self.score);
            ctx.send(codes::PLAYER_DIED, None);
            ctx.play_sound("dead");
        }
    }

    fn decelerate(&mut self) {
        self.acceleration.y = 0.0;
        self.velocity.y = 0.0;
    }

    fn set_score(&mut self, score: u32, ctx: &mut SimContext<'_>) {
        self.score = score;
        ctx.send(codes::set_text("counterText"), Some(Payload::from(score)));
        ctx.send(codes::set_text("scoreText"), Some(Payload::from(score)));

        if score > self.high_score {
            self.high_score = score;
            ctx.send(codes::set_text("bestText"), Some(Payload::from(score)));
        }
    }

    fn reset(&mut self, ctx: &mut SimContext<'_>) {
        self.alive = true;
        self.playing = false;
        if let Some(transform) = self.owner().and_then(|owner| ctx.scene.transform_mut(owner)) {
            transform.position = self.initial_position;
            transform.rotation.z = 0.0;
        }
        self.set_score(0, ctx);

        self.velocity = Vec2::zeros();
        self.acceleration = self.gravity;
        if let Some(sprite) = self.sprite_mut(ctx) {
            sprite.play();
        }
    }

    fn start(&mut self, ctx: &mut SimContext<'_>) {
        self.playing = true;
        self.alive = true;
        ctx.send(codes::PLAYER_RESET, None);
    }

    fn on_contact(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        let Some(contact) = message.contact() else {
            return;
        };
        if !contact.involves(&self.player_collider) {
            return;
        }

        if contact.involves(&self.ground_collider) {
            self.die(ctx);
            self.decelerate();
        } else if contact.involves_any(&self.obstacle_colliders) {
            self.die(ctx);
        } else if contact.involves(&self.score_collider) {
            self.set_score(self.score + 1, ctx);
            ctx.play_sound("ting");
        }
    }
}

impl Extension for PlayerBehaviour {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        [
            codes::MOUSE_DOWN,
            codes::COLLISION_ENTRY,
            codes::GAME_READY,
            codes::GAME_RESET,
            codes::GAME_START,
            codes::PLAYER_DIED,
        ]
        .iter()
        .map(|code| (*code).to_string())
        .collect()
    }

    fn update(&mut self, delta_ms: f32, ctx: &mut SimContext<'_>) {
        let seconds = delta_ms / 1000.0;
        if self.playing {
            self.velocity += self.acceleration * seconds;
        }
        if self.velocity.y > MAX_FALL_SPEED {
            self.velocity.y = MAX_FALL_SPEED;
        }

        let Some(owner) = self.owner() else {
            return;
        };
        if let Some(transform) = ctx.scene.transform_mut(owner) {
            if transform.position.y < self.ceiling_y {
                transform.position.y = self.ceiling_y;
                self.velocity.y = 0.0;
            }

            transform.position.x += self.velocity.x * seconds;
            transform.position.y += self.velocity.y * seconds;

            if self.velocity.y < 0.0 {
                transform.rotation.z -= deg_to_rad(NOSE_UP_DEG_PER_SEC * seconds);
                transform.rotation.z = transform.rotation.z.max(deg_to_rad(MIN_TILT_DEG));
            }

            if self.is_falling() || !self.alive {
                transform.rotation.z += deg_to_rad(NOSE_DOWN_DEG_PER_SEC * seconds);
                transform.rotation.z = transform.rotation.z.min(deg_to_rad(MAX_TILT_DEG));
            }
        }

        let should_not_flap = self.should_not_flap();
        if let Some(sprite) = self.sprite_mut(ctx) {
            if should_not_flap {
                sprite.stop();
            } else if !sprite.is_playing() {
                sprite.play();
            }
        }
    }

    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>) {
        match message.code.as_str() {
            codes::MOUSE_DOWN => self.flap(ctx),
            codes::COLLISION_ENTRY => self.on_contact(message, ctx),
            codes::GAME_RESET => {
                for code in [codes::GAME_HIDE, codes::RESET_HIDE, codes::SPLASH_HIDE, codes::TUTORIAL_SHOW] {
                    ctx.send(code, None);
                }
                self.reset(ctx);
            }
            codes::GAME_START => {
                for code in [codes::GAME_SHOW, codes::RESET_HIDE, codes::SPLASH_HIDE, codes::TUTORIAL_HIDE] {
                    ctx.send(code, None);
                }
                self.start(ctx);
            }
            codes::GAME_READY => {
                for code in [codes::RESET_HIDE, codes::TUTORIAL_HIDE, codes::GAME_HIDE, codes::SPLASH_SHOW] {
                    ctx.send(code, None);
                }
            }
            codes::PLAYER_DIED => ctx.send(codes::RESET_SHOW, None),
            _ => {}
        }
    }
}

impl Behaviour for PlayerBehaviour {
    fn update_ready(&mut self, ctx: &mut SimContext<'_>) -> Result<(), EngineError> {
        let resolution_error = || EngineError::Resolution {
            extension: self.name().to_string(),
            target: self.sprite_name.clone(),
        };

        let owner = self.owner().ok_or_else(resolution_error)?;
        let sprite = ctx
            .scene
            .find_component_by_name(owner, &self.sprite_name)
            .ok_or_else(resolution_error)?;
        ctx.scene
            .component_mut::<AnimatedSpriteComponent>(sprite)
            .ok_or_else(resolution_error)?
            .set_frame(0)?;

        if let Some(transform) = ctx.scene.transform(owner) {
            self.initial_position = transform.position;
        }
        debug!("Player '{}' resolved sprite '{}'", self.name(), self.sprite_name);
        self.sprite = Some(sprite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "type": "player",
            "name": "player",
            "playerCollisionComponent": "birdCollision",
            "groundCollisionComponent": "groundCollision",
            "animatedSpriteName": "birdSprite",
            "scoreCollisionComponent": "scoreCollision"
        })
    }

    #[test]
    fn test_defaults() {
        let player = PlayerBehaviour::from_record(&record()).unwrap();
        assert_eq!(player.acceleration, Vec2::new(0.0, 920.0));
        assert_eq!(player.ceiling_y, -13.0);
        assert_eq!(player.obstacle_colliders.len(), 4);
        assert!(player.is_alive());
        assert!(!player.is_playing());
        assert_eq!(player.subscriptions().len(), 6);
    }

    #[test]
    fn test_each_collider_name_is_required() {
        for field in [
            "playerCollisionComponent",
            "groundCollisionComponent",
            "animatedSpriteName",
            "scoreCollisionComponent",
        ] {
            let mut record = record();
            record.as_object_mut().unwrap().remove(field);
            let err = PlayerBehaviour::from_record(&record).unwrap_err();
            assert!(matches!(err, EngineError::Configuration { .. }), "{field}");
        }
    }

    #[test]
    fn test_falling_stops_flapping() {
        let mut player = PlayerBehaviour::from_record(&record()).unwrap();
        player.playing = true;
        assert!(!player.should_not_flap());
        player.velocity.y = 230.0;
        assert!(player.is_falling());
        assert!(player.should_not_flap());
    }
}
