use approx::assert_relative_eq;
use serde_json::{json, Value};

use super::{circle_collider, code_logger, new_log, zone};
use crate::assets::Asset;
use crate::audio::RecordingAudio;
use crate::ecs::behaviours::{PlayerBehaviour, ScrollBehaviour};
use crate::ecs::components::{AnimatedSpriteComponent, BitmapTextComponent};
use crate::events::{codes, Message, Payload, Sender};
use crate::foundation::math::Vec2;
use crate::input::{KeyCode, MouseButton};
use crate::render::{CommandRecorder, DrawCommand};
use crate::scene::EntityId;
use crate::Engine;

fn bird_sprite() -> Value {
    json!({
        "type": "animated-sprite",
        "name": "birdSprite",
        "materialName": "bird",
        "width": 17,
        "height": 12,
        "frameWidth": 17,
        "frameHeight": 12,
        "frameCount": 4,
        "frameSequence": [0, 1, 2, 1]
    })
}

fn find(engine: &Engine, name: &str) -> EntityId {
    let root = engine.active_zone().unwrap().root();
    engine.scene().find_entity_by_name(root, name).unwrap()
}

fn button_engine() -> Engine {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "menu",
        json!([{
            "name": "button",
            "transform": { "position": { "x": 100.0, "y": 50.0 } },
            "behaviours": [{
                "type": "mouse-click",
                "name": "click",
                "width": 40,
                "height": 20,
                "messageCode": "CLICKED"
            }]
        }]),
    );
    engine.load_zone(&record).unwrap();
    engine.tick(16.0).unwrap();
    engine
}

fn click(engine: &mut Engine, x: f32, y: f32) {
    engine.handle_mouse_move(x, y);
    engine.handle_mouse_button(MouseButton::Left, true);
    engine.handle_mouse_button(MouseButton::Left, false);
    engine.tick(16.0).unwrap();
}

#[test]
fn test_mouse_click_inside_area_sends_code() {
    let mut engine = button_engine();
    let log = new_log();
    engine.add_listener("CLICKED", code_logger(&log));

    click(&mut engine, 110.0, 70.0);
    assert_eq!(*log.borrow(), vec!["CLICKED".to_string()]);

    click(&mut engine, 140.0, 60.0);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_hidden_button_ignores_clicks() {
    let mut engine = button_engine();
    let log = new_log();
    engine.add_listener("CLICKED", code_logger(&log));

    let button = find(&engine, "button");
    engine.scene_mut().set_visible(button, false);
    click(&mut engine, 110.0, 60.0);

    assert!(log.borrow().is_empty());
}

#[test]
fn test_visibility_message_hides_sprite_from_render() {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "hud",
        json!([{
            "name": "logo",
            "transform": { "position": { "x": 30.0, "y": 40.0 } },
            "components": [{ "type": "sprite", "name": "logoSprite", "materialName": "logo", "width": 96, "height": 22 }],
            "behaviours": [
                { "type": "visibility-on-message", "messageCode": codes::GAME_HIDE, "visible": false },
                { "type": "visibility-on-message", "messageCode": codes::GAME_SHOW, "visible": true }
            ]
        }]),
    );
    engine.load_zone(&record).unwrap();
    engine.tick(16.0).unwrap();

    let mut recorder = CommandRecorder::new();
    engine.render(&mut recorder);
    assert_eq!(recorder.draws().len(), 1);
    let draw = &recorder.draws()[0];
    assert!(matches!(&draw.command, DrawCommand::Sprite { material, .. } if material == "logo"));
    let model = draw.model.unwrap();
    assert_relative_eq!(model[(0, 3)], 30.0);
    assert_relative_eq!(model[(1, 3)], 40.0);

    engine.post(Message::new(codes::GAME_HIDE, Sender::Host));
    engine.tick(16.0).unwrap();
    recorder.clear();
    engine.render(&mut recorder);
    assert!(recorder.draws().is_empty());

    engine.post(Message::new(codes::GAME_SHOW, Sender::Host).high());
    engine.render(&mut recorder);
    assert_eq!(recorder.draws().len(), 1);
}

#[test]
fn test_set_text_formats_numbers() {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "hud",
        json!([{
            "name": "counter",
            "components": [{ "type": "bitmap-text", "name": "counterText", "fontName": "banana", "text": "0" }]
        }]),
    );
    engine.load_zone(&record).unwrap();
    let root = engine.active_zone().unwrap().root();
    let text = engine.scene().find_component_by_name(root, "counterText").unwrap();

    engine.post(
        Message::new(codes::set_text("counterText"), Sender::Host).with_payload(Payload::from(3_u32)),
    );
    engine.tick(16.0).unwrap();
    assert_eq!(engine.scene().component::<BitmapTextComponent>(text).unwrap().text(), "3");

    let mut recorder = CommandRecorder::new();
    engine.render(&mut recorder);
    assert!(matches!(
        &recorder.draws()[0].command,
        DrawCommand::Text { font, text, .. } if font == "banana" && text == "3"
    ));

    engine.post(Message::new(codes::set_text("counterText"), Sender::Host).high());
    assert_eq!(engine.scene().component::<BitmapTextComponent>(text).unwrap().text(), "");
}

#[test]
fn test_keyboard_movement_follows_held_keys() {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "free",
        json!([{
            "name": "mover",
            "behaviours": [{ "type": "keyboard-movement", "name": "keys", "speed": 2.0 }]
        }]),
    );
    engine.load_zone(&record).unwrap();
    let mover = find(&engine, "mover");

    engine.handle_key(KeyCode::Right, true);
    engine.handle_key(KeyCode::Up, true);
    engine.tick(16.0).unwrap();
    engine.tick(16.0).unwrap();
    engine.handle_key(KeyCode::Up, false);
    engine.tick(16.0).unwrap();

    let position = engine.scene().transform(mover).unwrap().position;
    assert_relative_eq!(position.x, 6.0);
    assert_relative_eq!(position.y, -4.0);
}

#[test]
fn test_animated_sprite_waits_for_texture() {
    let mut engine = Engine::default();
    let record = zone(1, "sky", json!([{ "name": "bird", "components": [bird_sprite()] }]));
    engine.load_zone(&record).unwrap();
    let root = engine.active_zone().unwrap().root();
    let sprite = engine.scene().find_component_by_name(root, "birdSprite").unwrap();
    assert_eq!(engine.bus().subscribers("ASSET_LOADED::bird").len(), 1);

    engine.tick(16.0).unwrap();
    let animated = engine.scene().component::<AnimatedSpriteComponent>(sprite).unwrap();
    assert!(!animated.has_uvs());
    assert_eq!(animated.current_frame(), 0);

    engine.on_asset_loaded("bird", Asset::Image { width: 34, height: 24 });
    engine.tick(16.0).unwrap();
    engine.tick(334.0).unwrap();

    let animated = engine.scene().component::<AnimatedSpriteComponent>(sprite).unwrap();
    assert!(animated.has_uvs());
    assert_eq!(animated.current_frame(), 1);
    assert_relative_eq!(animated.current_uv().min, Vec2::new(0.5, 0.0));
}

#[test]
fn test_animated_sprite_uses_preloaded_texture() {
    let mut engine = Engine::default();
    engine.on_asset_loaded("bird", Asset::Image { width: 17, height: 48 });
    let record = zone(1, "sky", json!([{ "name": "bird", "components": [bird_sprite()] }]));
    engine.load_zone(&record).unwrap();

    let root = engine.active_zone().unwrap().root();
    let sprite = engine.scene().find_component_by_name(root, "birdSprite").unwrap();
    let animated = engine.scene().component::<AnimatedSpriteComponent>(sprite).unwrap();
    assert!(animated.has_uvs());
}

fn flappy_zone() -> Value {
    zone(
        1,
        "flappy",
        json!([
            {
                "name": "bird",
                "transform": { "position": { "x": 50.0, "y": 0.0 } },
                "components": [bird_sprite(), circle_collider("birdCollision", 6.0, false)],
                "behaviours": [{
                    "type": "player",
                    "name": "player",
                    "playerCollisionComponent": "birdCollision",
                    "groundCollisionComponent": "groundCollision",
                    "animatedSpriteName": "birdSprite",
                    "scoreCollisionComponent": "scoreCollision"
                }]
            },
            {
                "name": "ground",
                "transform": { "position": { "x": 0.0, "y": 100.0 } },
                "components": [{
                    "type": "collision",
                    "name": "groundCollision",
                    "shape": { "type": "rectangle", "width": 300.0, "height": 20.0 }
                }]
            }
        ]),
    )
}

fn player(engine: &Engine) -> &PlayerBehaviour {
    let root = engine.active_zone().unwrap().root();
    let player = engine.scene().find_behaviour_by_name(root, "player").unwrap();
    engine.scene().behaviour::<PlayerBehaviour>(player).unwrap()
}

#[test]
fn test_player_flaps_then_falls_to_the_ground() {
    let audio = RecordingAudio::new();
    let mut engine = Engine::default().with_audio(Box::new(audio.clone()));
    engine.load_zone(&flappy_zone()).unwrap();
    let log = new_log();
    let id = engine.add_listener(codes::PLAYER_DIED, code_logger(&log));
    engine.subscribe_listener(codes::RESET_SHOW, id);

    engine.handle_mouse_button(MouseButton::Left, true);
    engine.tick(16.0).unwrap();
    assert_relative_eq!(player(&engine).velocity().y, 0.0);

    engine.post(Message::new(codes::GAME_START, Sender::Host).high());
    assert!(player(&engine).is_playing());

    engine.handle_mouse_button(MouseButton::Left, true);
    engine.tick(16.0).unwrap();
    assert!(player(&engine).velocity().y < 0.0);
    assert_eq!(audio.played(), vec!["flap".to_string()]);

    let mut ticks = 0;
    while player(&engine).is_alive() {
        engine.tick(16.0).unwrap();
        ticks += 1;
        assert!(ticks < 500, "player never reached the ground");
    }
    engine.tick(16.0).unwrap();

    assert_eq!(audio.played(), vec!["flap".to_string(), "dead".to_string()]);
    assert_relative_eq!(player(&engine).velocity().y, 0.0);
    assert_eq!(
        *log.borrow(),
        vec![codes::PLAYER_DIED.to_string(), codes::RESET_SHOW.to_string()]
    );

    let bird = find(&engine, "bird");
    assert!(engine.scene().transform(bird).unwrap().rotation.z > 0.0);
}

#[test]
fn test_game_reset_restores_player() {
    let mut engine = Engine::default();
    engine.load_zone(&flappy_zone()).unwrap();
    let bird = find(&engine, "bird");

    engine.post(Message::new(codes::GAME_START, Sender::Host).high());
    for _ in 0..10 {
        engine.tick(16.0).unwrap();
    }
    assert!(engine.scene().transform(bird).unwrap().position.y > 0.0);

    engine.post(Message::new(codes::GAME_RESET, Sender::Host).high());

    let position = engine.scene().transform(bird).unwrap().position;
    assert_relative_eq!(position.y, 0.0);
    assert_relative_eq!(position.x, 50.0);
    assert!(!player(&engine).is_playing());
    assert!(player(&engine).is_alive());
    assert_eq!(player(&engine).score(), 0);
}

#[test]
fn test_behaviour_added_at_runtime_is_made_ready() {
    let mut engine = Engine::default();
    engine.load_zone(&zone(1, "late", json!([{ "name": "ground" }]))).unwrap();
    let root = engine.active_zone().unwrap().root();
    let ground = engine.scene().find_entity_by_name(root, "ground").unwrap();

    let scroll = ScrollBehaviour::from_record(&json!({
        "type": "scroll",
        "name": "groundScroll",
        "velocity": { "x": -100 },
        "minPosition": { "x": -1000, "y": -1000 },
        "resetPosition": { "x": 0 },
        "startMessage": "GO",
        "resetMessage": "BACK"
    }))
    .unwrap();
    engine.add_behaviour(ground, Box::new(scroll)).unwrap();
    assert_eq!(engine.bus().subscribers("GO").len(), 1);

    engine.post(Message::new("GO", Sender::Host).high());
    engine.tick(100.0).unwrap();
    assert_relative_eq!(engine.scene().transform(ground).unwrap().position.x, -10.0);

    engine.post(Message::new("BACK", Sender::Host).high());
    assert_relative_eq!(engine.scene().transform(ground).unwrap().position.x, 0.0);
}
