//! Headless zone demo
//!
//! Loads `zones/level.json` through the engine's zone switching, hands over
//! the image metadata a renderer would normally provide, and then plays the
//! level with scripted mouse input. Draw commands are recorded instead of
//! rendered, and sounds are logged.
//!
//! Usage: `zone_app [frames]`

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sim_engine::ecs::behaviours::PlayerBehaviour;
use sim_engine::foundation::logging;
use sim_engine::prelude::*;

const LEVEL_ID: u32 = 1;
const LEVEL_ASSET: &str = "zones/level.json";
const CONFIG_FILE: &str = "zone_app.toml";
const DEFAULT_FRAMES: u64 = 1200;

/// Image sizes the renderer would report after decoding
const IMAGES: &[(&str, u32, u32)] = &[
    ("bg", 144, 256),
    ("pipe", 26, 160),
    ("ground", 168, 56),
    ("bird", 51, 12),
    ("tutorial", 144, 256),
    ("reset", 104, 58),
];

#[derive(Debug, Default)]
struct Stats {
    deaths: u32,
    score: u32,
    best: u32,
}

/// Host listener tracking scores and deaths
struct ScoreBoard {
    stats: Rc<RefCell<Stats>>,
}

impl MessageHandler for ScoreBoard {
    fn on_message(&mut self, message: &Message, _ctx: &mut SimContext<'_>) {
        let mut stats = self.stats.borrow_mut();
        if message.code == codes::PLAYER_DIED {
            stats.deaths += 1;
            log::info!("Bird down with {} point(s)", stats.score);
        } else if let Some(score) = message.number() {
            // Scores are small non-negative integers
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let score = score as u32;
            stats.score = score;
            stats.best = stats.best.max(score);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Booting,
    Splash,
    Tutorial,
    Flying,
    Dead { since: u64 },
}

struct ZoneDemo {
    level_dir: &'static str,
    stats: Rc<RefCell<Stats>>,
    audio: RecordingAudio,
    recorder: CommandRecorder,
    rng: StdRng,
    phase: Phase,
    frame: u64,
    next_flap: u64,
}

impl ZoneDemo {
    fn new(audio: RecordingAudio) -> Self {
        Self {
            level_dir: env!("CARGO_MANIFEST_DIR"),
            stats: Rc::new(RefCell::new(Stats::default())),
            audio,
            recorder: CommandRecorder::new(),
            rng: StdRng::seed_from_u64(7),
            phase: Phase::Booting,
            frame: 0,
            next_flap: 0,
        }
    }

    fn click(engine: &mut Engine, x: f32, y: f32) {
        engine.handle_mouse_move(x, y);
        engine.handle_mouse_button(MouseButton::Left, true);
        engine.handle_mouse_button(MouseButton::Left, false);
    }

    fn player_alive(engine: &Engine) -> bool {
        engine
            .active_zone()
            .and_then(|zone| engine.scene().find_behaviour_by_name(zone.root(), "player"))
            .and_then(|player| engine.scene().behaviour::<PlayerBehaviour>(player))
            .is_some_and(|player| player.is_alive())
    }
}

impl Application for ZoneDemo {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        log::info!("Initializing zone demo...");

        let id = engine.add_listener(
            codes::PLAYER_DIED,
            Box::new(ScoreBoard {
                stats: Rc::clone(&self.stats),
            }),
        );
        engine.subscribe_listener(&codes::set_text("scoreText"), id);

        engine.register_zone(LEVEL_ID, LEVEL_ASSET);
        engine.change_zone(LEVEL_ID)?;

        for (name, width, height) in IMAGES {
            engine.on_asset_loaded(
                name,
                Asset::Image {
                    width: *width,
                    height: *height,
                },
            );
        }

        let path = Path::new(self.level_dir).join(LEVEL_ASSET);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| AppError::Asset(format!("{}: {e}", path.display())))?;
        let level: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| AppError::Asset(format!("{LEVEL_ASSET}: {e}")))?;
        engine.on_asset_loaded(LEVEL_ASSET, Asset::Json(level));

        log::info!("Zone demo initialized");
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_ms: f32) -> Result<(), AppError> {
        self.frame += 1;

        match self.phase {
            Phase::Booting => {
                if engine.active_zone().is_some() {
                    engine.post(Message::new(codes::GAME_READY, Sender::Host).high());
                    self.phase = Phase::Splash;
                }
            }
            Phase::Splash => {
                if self.frame % 30 == 0 {
                    engine.post(Message::new(codes::GAME_RESET, Sender::Host).high());
                    self.phase = Phase::Tutorial;
                }
            }
            Phase::Tutorial => {
                if self.frame % 20 == 0 {
                    Self::click(engine, 72.0, 128.0);
                    self.phase = Phase::Flying;
                    self.next_flap = self.frame + 2;
                }
            }
            Phase::Flying => {
                if !Self::player_alive(engine) {
                    self.phase = Phase::Dead { since: self.frame };
                } else if self.frame >= self.next_flap {
                    Self::click(engine, 72.0, 128.0);
                    self.next_flap = self.frame + self.rng.gen_range(18..32);
                }
            }
            Phase::Dead { since } => {
                if self.frame - since >= 60 {
                    Self::click(engine, 60.0, 110.0);
                    self.phase = Phase::Tutorial;
                }
            }
        }

        Ok(())
    }

    fn render(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        self.recorder.clear();
        engine.render(&mut self.recorder);
        if self.frame % 120 == 0 {
            log::debug!("Frame {}: {} draw(s)", self.frame, self.recorder.draws().len());
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let stats = self.stats.borrow();
        log::info!(
            "Zone demo finished after {} frame(s): {} death(s), best score {}",
            self.frame,
            stats.deaths,
            stats.best
        );
        log::info!("Sounds played: {}", self.audio.played().len());
        if let Err(e) = engine.unload_zone() {
            log::error!("Failed to unload zone: {e}");
        }
    }
}

fn load_config() -> EngineConfig {
    let mut config = if Path::new(CONFIG_FILE).exists() {
        EngineConfig::load_from_file(CONFIG_FILE).unwrap_or_else(|e| {
            eprintln!("Ignoring {CONFIG_FILE}: {e}");
            EngineConfig::default()
        })
    } else {
        EngineConfig::default()
    };
    config.fixed_delta_ms.get_or_insert(1000.0 / 60.0);
    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config();
    logging::init_with_filter(&config.log_filter);

    let frames = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let audio = RecordingAudio::new();
    let mut engine = Engine::new(config).with_audio(Box::new(audio.clone()));
    let mut app = ZoneDemo::new(audio);

    engine.run(&mut app, Some(frames))?;
    Ok(())
}
