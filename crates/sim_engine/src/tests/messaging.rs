use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;

use super::{code_logger, listener, new_log, zone};
use crate::config::{BusConfig, EngineConfig, QueueOrder};
use crate::context::SimContext;
use crate::ecs::{Behaviour, Extension, ExtensionBase};
use crate::events::{HandlerId, ListenerId, Message, Payload, Sender};
use crate::Engine;

fn engine_with(queue_order: QueueOrder) -> Engine {
    Engine::new(EngineConfig {
        bus: BusConfig {
            queue_order,
            ..BusConfig::default()
        },
        ..EngineConfig::default()
    })
}

fn numbered(log: &super::Log) -> Box<dyn crate::events::MessageHandler> {
    let log = Rc::clone(log);
    listener(move |message, _| {
        let number = message.number().unwrap_or(-1.0);
        log.borrow_mut().push(number.to_string());
    })
}

#[test]
fn test_duplicate_subscription_delivers_once() {
    let mut engine = Engine::default();
    let log = new_log();
    let id = engine.add_listener("PING", code_logger(&log));

    assert!(!engine.subscribe_listener("PING", id));
    assert_eq!(engine.bus().subscribers("PING"), vec![HandlerId::Listener(id)]);

    engine.post(Message::new("PING", Sender::Host));
    assert_eq!(engine.drain_messages(10), 1);
    assert_eq!(*log.borrow(), vec!["PING".to_string()]);

    engine.post(Message::new("PING", Sender::Host).high());
    assert_eq!(log.borrow().len(), 2);
    assert_eq!(engine.bus().pending_len(), 0);
}

#[test]
fn test_normal_messages_wait_for_drain() {
    let mut engine = Engine::default();
    let log = new_log();
    engine.add_listener("PING", code_logger(&log));

    engine.post(Message::new("PING", Sender::Host));
    assert!(log.borrow().is_empty());
    assert_eq!(engine.bus().pending_len(), 1);

    engine.drain_messages(10);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_high_message_is_delivered_before_post_returns() {
    let mut engine = Engine::default();
    let log = new_log();

    let outer = Rc::clone(&log);
    engine.add_listener(
        "STEP",
        listener(move |_, ctx| {
            outer.borrow_mut().push("step:start".to_string());
            ctx.send_priority("URGENT", None);
            outer.borrow_mut().push("step:end".to_string());
        }),
    );
    let inner = Rc::clone(&log);
    engine.add_listener(
        "URGENT",
        listener(move |message, _| inner.borrow_mut().push(format!("urgent:{:?}", message.priority))),
    );

    engine.post(Message::new("STEP", Sender::Host));
    engine.drain_messages(10);

    assert_eq!(
        *log.borrow(),
        vec!["step:start".to_string(), "urgent:High".to_string(), "step:end".to_string()]
    );
    assert_eq!(engine.bus().pending_len(), 0);
}

#[test]
fn test_message_without_subscribers_is_dropped() {
    let mut engine = Engine::default();
    engine.post(Message::new("NOBODY", Sender::Host));
    engine.post(Message::new("NOBODY", Sender::Host).high());
    assert_eq!(engine.bus().pending_len(), 0);
}

#[test]
fn test_drain_is_bounded_fifo() {
    let mut engine = engine_with(QueueOrder::Fifo);
    let log = new_log();
    engine.add_listener("N", numbered(&log));

    for i in 0..25_u32 {
        engine.post(Message::new("N", Sender::Host).with_payload(i));
    }

    assert_eq!(engine.drain_messages(10), 10);
    assert_eq!(engine.bus().pending_len(), 15);
    let expected: Vec<String> = (0..10).map(|i: u32| i.to_string()).collect();
    assert_eq!(*log.borrow(), expected);

    assert_eq!(engine.drain_messages(10), 10);
    assert_eq!(engine.drain_messages(10), 5);
    assert_eq!(engine.drain_messages(10), 0);
    assert_eq!(log.borrow().len(), 25);
}

#[test]
fn test_drain_is_bounded_lifo() {
    let mut engine = engine_with(QueueOrder::Lifo);
    let log = new_log();
    engine.add_listener("N", numbered(&log));

    for i in 0..25_u32 {
        engine.post(Message::new("N", Sender::Host).with_payload(i));
    }

    assert_eq!(engine.drain_messages(10), 10);
    let expected: Vec<String> = (15..25).rev().map(|i: u32| i.to_string()).collect();
    assert_eq!(*log.borrow(), expected);
    assert_eq!(engine.bus().pending_len(), 15);
}

#[test]
fn test_tick_drains_configured_amount() {
    let mut engine = Engine::default();
    let log = new_log();
    engine.add_listener("N", numbered(&log));

    for i in 0..12_u32 {
        engine.post(Message::new("N", Sender::Host).with_payload(Payload::from(i)));
    }

    engine.tick(16.0).unwrap();
    assert_eq!(log.borrow().len(), 10);
    engine.tick(16.0).unwrap();
    assert_eq!(log.borrow().len(), 12);
}

#[test]
fn test_reentrant_high_post_is_queued() {
    let mut engine = Engine::default();
    let calls = Rc::new(Cell::new(0));

    let counter = Rc::clone(&calls);
    engine.add_listener(
        "ECHO",
        listener(move |_, ctx| {
            counter.set(counter.get() + 1);
            if counter.get() == 1 {
                ctx.send_priority("ECHO", None);
            }
        }),
    );

    engine.post(Message::new("ECHO", Sender::Host).high());
    assert_eq!(calls.get(), 1);
    assert_eq!(engine.bus().pending_len(), 1);

    engine.drain_messages(10);
    assert_eq!(calls.get(), 2);
    assert_eq!(engine.bus().pending_len(), 0);
}

/// Posts a HIGH message to its own code on the first update
#[derive(Debug)]
struct SelfPoster {
    base: ExtensionBase,
    posted: bool,
    received: Rc<Cell<u32>>,
}

impl Extension for SelfPoster {
    fn base(&self) -> &ExtensionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ExtensionBase {
        &mut self.base
    }

    fn subscriptions(&self) -> Vec<String> {
        vec!["PULSE".to_string()]
    }

    fn update(&mut self, _delta_ms: f32, ctx: &mut SimContext<'_>) {
        if !self.posted {
            self.posted = true;
            ctx.send_priority("PULSE", None);
        }
    }

    fn on_message(&mut self, _message: &Message, _ctx: &mut SimContext<'_>) {
        self.received.set(self.received.get() + 1);
    }
}

impl Behaviour for SelfPoster {}

#[test]
fn test_high_post_to_running_extension_waits_for_next_drain() {
    let mut engine = Engine::default();
    engine.load_zone(&zone(1, "pulse", json!([{ "name": "pulser" }]))).unwrap();
    let root = engine.active_zone().unwrap().root();
    let pulser = engine.scene().find_entity_by_name(root, "pulser").unwrap();

    let received = Rc::new(Cell::new(0));
    let poster = SelfPoster {
        base: ExtensionBase::new("poster"),
        posted: false,
        received: Rc::clone(&received),
    };
    engine.add_behaviour(pulser, Box::new(poster)).unwrap();
    let log = new_log();
    engine.add_listener("PULSE", code_logger(&log));

    engine.tick(16.0).unwrap();
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(received.get(), 0);
    assert_eq!(engine.bus().pending_len(), 1);

    engine.tick(16.0).unwrap();
    assert_eq!(received.get(), 1);
    assert_eq!(engine.bus().pending_len(), 0);
}

#[test]
fn test_unsubscribe_inside_handler_skips_later_subscriber() {
    let mut engine = Engine::default();
    let log = new_log();
    let target: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));

    let victim = Rc::clone(&target);
    engine.add_listener(
        "GO",
        listener(move |_, ctx| {
            if let Some(id) = victim.get() {
                ctx.bus.unsubscribe("GO", HandlerId::Listener(id));
            }
        }),
    );
    let logger = engine.add_listener("GO", code_logger(&log));
    target.set(Some(logger));

    engine.post(Message::new("GO", Sender::Host).high());
    assert!(log.borrow().is_empty());
    assert!(!engine.bus().is_subscribed("GO", HandlerId::Listener(logger)));
}

#[test]
fn test_removed_listener_is_skipped() {
    let mut engine = Engine::default();
    let log = new_log();
    let id = engine.add_listener("PING", code_logger(&log));

    engine.post(Message::new("PING", Sender::Host));
    assert!(engine.remove_listener(id));
    assert_eq!(engine.bus().pending_len(), 0);
    engine.drain_messages(10);
    assert!(log.borrow().is_empty());
}
