use std::rc::Rc;

use serde_json::json;

use super::{circle_collider, listener, new_log, zone};
use crate::ecs::components::CollisionComponent;
use crate::events::codes;
use crate::foundation::math::Vec2;
use crate::physics::{Shape2D, ShapeError};
use crate::{Engine, EngineError};

fn two_circles(a_static: bool, b_static: bool) -> serde_json::Value {
    zone(
        1,
        "arena",
        json!([
            {
                "name": "a",
                "components": [circle_collider("a", 5.0, a_static)]
            },
            {
                "name": "b",
                "transform": { "position": { "x": 20.0 } },
                "components": [circle_collider("b", 5.0, b_static)]
            }
        ]),
    )
}

#[test]
fn test_contact_lifecycle_tick_numbers() {
    let mut engine = Engine::default();
    engine.load_zone(&two_circles(true, false)).unwrap();

    let log = new_log();
    let sink = Rc::clone(&log);
    let id = engine.add_listener(
        codes::COLLISION_ENTRY,
        listener(move |message, _| {
            let contact = message.contact().expect("contact payload");
            sink.borrow_mut()
                .push(format!("{}:{}+{}", message.code, contact.a_name, contact.b_name));
        }),
    );
    engine.subscribe_listener(codes::COLLISION_EXIT, id);

    let root = engine.active_zone().unwrap().root();
    let b = engine.scene().find_entity_by_name(root, "b").unwrap();
    let a_collider = engine.scene().find_component_by_name(root, "a").unwrap();
    assert_eq!(engine.collisions().colliders().len(), 2);

    let mut entered = Vec::new();
    let mut updated = Vec::new();
    let mut exited = Vec::new();
    for tick in 1..=40_u32 {
        engine.scene_mut().transform_mut(b).unwrap().position.x = 20.0 - tick as f32;
        let report = engine.tick(16.0).unwrap();
        if !report.entered.is_empty() {
            entered.push(tick);
        }
        if !report.updated.is_empty() {
            updated.push(tick);
        }
        if !report.exited.is_empty() {
            exited.push(tick);
        }

        let touching = (10..=30).contains(&tick);
        assert_eq!(engine.collisions().contacts().len(), usize::from(touching), "tick {tick}");
        assert_eq!(
            engine.scene().collider(a_collider).unwrap().contacts().len(),
            usize::from(touching),
            "tick {tick}"
        );
    }

    assert_eq!(entered, vec![10]);
    assert_eq!(updated, (11..=30).collect::<Vec<_>>());
    assert_eq!(exited, vec![31]);
    assert_eq!(
        *log.borrow(),
        vec!["COLLISION_ENTRY:a+b".to_string(), "COLLISION_EXIT:a+b".to_string()]
    );
}

#[test]
fn test_static_pairs_are_never_tested() {
    let mut engine = Engine::default();
    let mut record = two_circles(true, true);
    record["objects"][1]["transform"]["position"]["x"] = json!(0.0);
    engine.load_zone(&record).unwrap();

    let report = engine.tick(16.0).unwrap();
    assert!(report.is_empty());
    assert!(engine.collisions().contacts().is_empty());
}

#[test]
fn test_contact_timestamp_is_detector_time() {
    let mut engine = Engine::default();
    let mut record = two_circles(true, false);
    record["objects"][1]["transform"]["position"]["x"] = json!(3.0);
    engine.load_zone(&record).unwrap();

    engine.tick(16.0).unwrap();
    engine.tick(20.0).unwrap();

    let contact = &engine.collisions().contacts()[0];
    assert!((contact.time - 36.0).abs() < f64::EPSILON);
}

#[test]
fn test_collision_record_without_shape_fails_zone_load() {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "broken",
        json!([{ "name": "a", "components": [{ "type": "collision", "name": "c" }] }]),
    );

    let err = engine.load_zone(&record).unwrap_err();
    assert!(matches!(err, EngineError::Configuration { .. }), "{err:?}");
    assert_eq!(engine.scene().len(), 1);
    assert!(engine.collisions().colliders().is_empty());
    assert!(engine.active_zone().is_none());
}

#[derive(Debug)]
struct Triangle {
    position: Vec2,
}

impl Shape2D for Triangle {
    fn kind(&self) -> &'static str {
        "triangle"
    }
    fn position(&self) -> Vec2 {
        self.position
    }
    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
    fn offset(&self) -> Vec2 {
        Vec2::zeros()
    }
    fn intersects(&self, other: &dyn Shape2D) -> Result<bool, ShapeError> {
        Err(ShapeError::UnsupportedPair(self.kind(), other.kind()))
    }
    fn point_in_shape(&self, _point: Vec2) -> bool {
        false
    }
}

#[test]
fn test_unsupported_pair_fails_the_tick() {
    let mut engine = Engine::default();
    let record = zone(
        1,
        "mixed",
        json!([{ "name": "ball", "components": [circle_collider("ball", 5.0, false)] }]),
    );
    engine.load_zone(&record).unwrap();

    let root = engine.active_zone().unwrap().root();
    let odd = engine.create_entity("odd");
    engine.attach_child(root, odd).unwrap();
    let triangle = Triangle {
        position: Vec2::zeros(),
    };
    engine
        .add_component(odd, Box::new(CollisionComponent::new("odd", Box::new(triangle), true)))
        .unwrap();

    let err = engine.tick(16.0).unwrap_err();
    assert!(
        matches!(err, EngineError::Shape(ShapeError::UnsupportedPair("circle", "triangle"))),
        "{err:?}"
    );
}

#[test]
fn test_destroying_a_touching_entity_ends_the_contact() {
    let mut engine = Engine::default();
    let mut record = two_circles(true, false);
    record["objects"][1]["transform"]["position"]["x"] = json!(3.0);
    engine.load_zone(&record).unwrap();

    let log = new_log();
    let sink = Rc::clone(&log);
    engine.add_listener(
        codes::COLLISION_EXIT,
        listener(move |message, _| {
            let contact = message.contact().expect("contact payload");
            sink.borrow_mut()
                .push(format!("{}:{}+{}", message.code, contact.a_name, contact.b_name));
        }),
    );

    engine.tick(16.0).unwrap();
    let root = engine.active_zone().unwrap().root();
    let a_collider = engine.scene().find_component_by_name(root, "a").unwrap();
    let b = engine.scene().find_entity_by_name(root, "b").unwrap();
    assert_eq!(engine.scene().collider(a_collider).unwrap().contacts().len(), 1);

    assert_eq!(engine.destroy_entity(b).unwrap(), 1);
    assert!(engine.scene().collider(a_collider).unwrap().contacts().is_empty());
    assert!(engine.collisions().contacts().is_empty());
    assert_eq!(engine.collisions().colliders(), &[a_collider]);
    assert_eq!(*log.borrow(), vec!["COLLISION_EXIT:a+b".to_string()]);

    engine.tick(16.0).unwrap();
    engine.tick(16.0).unwrap();
    assert_eq!(log.borrow().len(), 1);
}
