//! Pairwise collision detection with persistent contacts
//!
//! Every tick the detector tests each unordered pair of registered colliders
//! (skipping static-static pairs) and keeps one contact record per touching
//! pair. A pair that starts touching produces an entry, a pair that keeps
//! touching an update, and a record that was not refreshed this tick an exit.

use log::{debug, warn};

use crate::context::SimContext;
use crate::ecs::{Extension, ExtensionRef};
use crate::engine::EngineError;
use crate::events::{codes, ContactData, Message, Payload, Sender};

/// Unordered collider pair, stored smaller ref first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPair {
    /// Smaller ref
    pub a: ExtensionRef,
    /// Larger ref
    pub b: ExtensionRef,
}

impl CollisionPair {
    /// Create a normalised pair
    pub fn new(first: ExtensionRef, second: ExtensionRef) -> Self {
        if first <= second {
            Self { a: first, b: second }
        } else {
            Self { a: second, b: first }
        }
    }

    /// Whether `collider` is one side of the pair
    pub fn contains(&self, collider: ExtensionRef) -> bool {
        self.a == collider || self.b == collider
    }
}

/// Persistent contact between two colliders
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    /// The colliders in contact
    pub pair: CollisionPair,
    /// Detector time (accumulated ms) when the pair was last seen touching
    pub time: f64,
    frame: u64,
}

/// What changed during one detector tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollisionReport {
    /// Pairs that started touching
    pub entered: Vec<CollisionPair>,
    /// Pairs still touching
    pub updated: Vec<CollisionPair>,
    /// Pairs that stopped touching
    pub exited: Vec<CollisionPair>,
}

impl CollisionReport {
    /// True when nothing happened
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.updated.is_empty() && self.exited.is_empty()
    }
}

/// Collision detector
#[derive(Debug, Default)]
pub struct CollisionDetector {
    colliders: Vec<ExtensionRef>,
    contacts: Vec<ContactRecord>,
    elapsed: f64,
    frame: u64,
}

impl CollisionDetector {
    /// Create an empty detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a collision component; duplicates are refused with a warning
    pub fn register(&mut self, collider: ExtensionRef) -> bool {
        if self.colliders.contains(&collider) {
            warn!("Collider {collider:?} is already registered");
            return false;
        }
        debug!("Registered collider {collider:?}");
        self.colliders.push(collider);
        true
    }

    /// Stop tracking a collision component
    ///
    /// Live contacts involving `collider` end here: both sides get
    /// `on_collision_exit` and a HIGH `COLLISION_EXIT` is posted per contact.
    /// The collider's node must still be in the scene.
    pub fn unregister(&mut self, collider: ExtensionRef, ctx: &mut SimContext<'_>) -> bool {
        let Some(index) = self.colliders.iter().position(|c| *c == collider) else {
            warn!("Cannot unregister unknown collider {collider:?}");
            return false;
        };
        self.colliders.remove(index);

        let (ended, live): (Vec<_>, Vec<_>) =
            self.contacts.drain(..).partition(|record| record.pair.contains(collider));
        self.contacts = live;
        for record in ended {
            notify(ctx, record.pair, Contact::Exit);
            announce(ctx, codes::COLLISION_EXIT, record.pair, record.time);
        }

        debug!("Unregistered collider {collider:?}");
        true
    }

    /// Whether `collider` is tracked
    pub fn is_registered(&self, collider: ExtensionRef) -> bool {
        self.colliders.contains(&collider)
    }

    /// Tracked colliders in registration order
    pub fn colliders(&self) -> &[ExtensionRef] {
        &self.colliders
    }

    /// Live contact records
    pub fn contacts(&self) -> &[ContactRecord] {
        &self.contacts
    }

    /// Accumulated detector time in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed
    }

    /// Drop every collider and contact
    pub fn clear(&mut self) {
        self.colliders.clear();
        self.contacts.clear();
    }

    /// Run one detection tick
    ///
    /// Entry and exit are announced with HIGH priority, so subscribers see them
    /// before this returns.
    pub fn update(
        &mut self,
        delta_ms: f32,
        ctx: &mut SimContext<'_>,
    ) -> Result<CollisionReport, EngineError> {
        self.elapsed += f64::from(delta_ms);
        self.frame += 1;

        let touching = self.touching_pairs(ctx)?;
        let mut report = CollisionReport::default();

        for pair in touching {
            if let Some(record) = self.contacts.iter_mut().find(|record| record.pair == pair) {
                record.time = self.elapsed;
                record.frame = self.frame;
                notify(ctx, pair, Contact::Update);
                report.updated.push(pair);
            } else {
                self.contacts.push(ContactRecord {
                    pair,
                    time: self.elapsed,
                    frame: self.frame,
                });
                notify(ctx, pair, Contact::Entry);
                announce(ctx, codes::COLLISION_ENTRY, pair, self.elapsed);
                report.entered.push(pair);
            }
        }

        let frame = self.frame;
        let (stale, live): (Vec<_>, Vec<_>) =
            self.contacts.drain(..).partition(|record| record.frame != frame);
        self.contacts = live;

        for record in stale {
            notify(ctx, record.pair, Contact::Exit);
            announce(ctx, codes::COLLISION_EXIT, record.pair, record.time);
            report.exited.push(record.pair);
        }

        Ok(report)
    }

    fn touching_pairs(&self, ctx: &SimContext<'_>) -> Result<Vec<CollisionPair>, EngineError> {
        let mut touching = Vec::new();
        for (i, first) in self.colliders.iter().enumerate() {
            let Some(a) = ctx.scene.collider(*first) else {
                continue;
            };
            for second in &self.colliders[i + 1..] {
                let Some(b) = ctx.scene.collider(*second) else {
                    continue;
                };
                if a.is_static() && b.is_static() {
                    continue;
                }
                if a.shape().intersects(b.shape())? {
                    touching.push(CollisionPair::new(*first, *second));
                }
            }
        }
        Ok(touching)
    }
}

#[derive(Clone, Copy)]
enum Contact {
    Entry,
    Update,
    Exit,
}

fn notify(ctx: &mut SimContext<'_>, pair: CollisionPair, contact: Contact) {
    for (this, other) in [(pair.a, pair.b), (pair.b, pair.a)] {
        if let Some(collider) = ctx.scene.collider_mut(this) {
            match contact {
                Contact::Entry => collider.on_collision_entry(other),
                Contact::Update => collider.on_collision_update(other),
                Contact::Exit => collider.on_collision_exit(other),
            }
        }
    }
}

fn announce(ctx: &mut SimContext<'_>, code: &str, pair: CollisionPair, time: f64) {
    let contact = ContactData {
        a: pair.a,
        b: pair.b,
        a_name: collider_name(ctx, pair.a),
        b_name: collider_name(ctx, pair.b),
        time,
    };
    ctx.post(
        Message::new(code, Sender::CollisionDetector)
            .with_payload(Payload::Contact(contact))
            .high(),
    );
}

fn collider_name(ctx: &SimContext<'_>, collider: ExtensionRef) -> String {
    ctx.scene
        .collider(collider)
        .map(|c| c.name().to_string())
        .unwrap_or_default()
}
