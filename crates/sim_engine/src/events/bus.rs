//! Subscription table and pending delivery queue

use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, trace, warn};
use slotmap::{new_key_type, SlotMap};

use super::message::Message;
use crate::config::{BusConfig, QueueOrder};
use crate::context::SimContext;
use crate::ecs::ExtensionRef;

new_key_type! {
    /// Key of a host listener owned by the bus
    pub struct ListenerId;
}

/// Anything the bus can deliver to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerId {
    /// A component or behaviour living in the scene
    Extension(ExtensionRef),
    /// A host listener registered through the engine
    Listener(ListenerId),
}

impl From<ExtensionRef> for HandlerId {
    fn from(extension: ExtensionRef) -> Self {
        Self::Extension(extension)
    }
}

/// Host-side message receiver
pub trait MessageHandler {
    /// Handle a delivered message
    fn on_message(&mut self, message: &Message, ctx: &mut SimContext<'_>);
}

/// Why a handler could not be taken out for delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeError {
    /// The handler no longer exists
    Missing,
    /// The handler is currently executing further up the stack
    Busy,
}

/// Pending `(message, handler)` pair
pub type PendingDelivery = (Rc<Message>, HandlerId);

/// Message bus state
///
/// Owns the subscription table, the NORMAL-priority queue and the host
/// listeners. Dispatch lives in `SimContext`, which can reach the scene.
pub struct MessageBus {
    subscriptions: HashMap<String, Vec<HandlerId>>,
    pending: VecDeque<PendingDelivery>,
    listeners: SlotMap<ListenerId, Option<Box<dyn MessageHandler>>>,
    config: BusConfig,
}

impl MessageBus {
    /// Create an empty bus
    pub fn new(config: BusConfig) -> Self {
        Self {
            subscriptions: HashMap::new(),
            pending: VecDeque::new(),
            listeners: SlotMap::with_key(),
            config,
        }
    }

    /// Bus settings
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Subscribe `handler` to `code`
    ///
    /// Returns false (and warns) when the handler is already subscribed.
    pub fn subscribe(&mut self, code: &str, handler: HandlerId) -> bool {
        let handlers = self.subscriptions.entry(code.to_string()).or_default();
        if handlers.contains(&handler) {
            warn!("Handler {handler:?} is already subscribed to '{code}'");
            return false;
        }

        debug!("Subscribed {handler:?} to '{code}'");
        handlers.push(handler);
        true
    }

    /// Remove `handler` from `code`
    ///
    /// Returns false (and warns) when there was no such subscription.
    pub fn unsubscribe(&mut self, code: &str, handler: HandlerId) -> bool {
        let Some(handlers) = self.subscriptions.get_mut(code) else {
            warn!("Cannot unsubscribe {handler:?}: nothing is subscribed to '{code}'");
            return false;
        };

        let Some(index) = handlers.iter().position(|h| *h == handler) else {
            warn!("Cannot unsubscribe {handler:?}: not subscribed to '{code}'");
            return false;
        };

        handlers.remove(index);
        if handlers.is_empty() {
            self.subscriptions.remove(code);
        }
        debug!("Unsubscribed {handler:?} from '{code}'");
        true
    }

    /// Drop every subscription and pending delivery of `handler`
    pub fn unsubscribe_all(&mut self, handler: HandlerId) {
        self.subscriptions.retain(|_, handlers| {
            handlers.retain(|h| *h != handler);
            !handlers.is_empty()
        });
        self.pending.retain(|(_, h)| *h != handler);
    }

    /// Current subscribers of `code`, in subscription order
    pub fn subscribers(&self, code: &str) -> Vec<HandlerId> {
        self.subscriptions.get(code).cloned().unwrap_or_default()
    }

    /// Whether `handler` is subscribed to `code`
    pub fn is_subscribed(&self, code: &str, handler: HandlerId) -> bool {
        self.subscriptions
            .get(code)
            .is_some_and(|handlers| handlers.contains(&handler))
    }

    /// Number of distinct codes with at least one subscriber
    pub fn code_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Queue one pending delivery
    pub fn enqueue(&mut self, message: Rc<Message>, handler: HandlerId) {
        trace!("Queued '{}' for {handler:?}", message.code);
        self.pending.push_back((message, handler));
    }

    /// Take the next pending delivery according to the configured order
    pub fn pop_pending(&mut self) -> Option<PendingDelivery> {
        match self.config.queue_order {
            QueueOrder::Fifo => self.pending.pop_front(),
            QueueOrder::Lifo => self.pending.pop_back(),
        }
    }

    /// Put a delivery back so it is the next one popped
    pub fn requeue(&mut self, delivery: PendingDelivery) {
        match self.config.queue_order {
            QueueOrder::Fifo => self.pending.push_front(delivery),
            QueueOrder::Lifo => self.pending.push_back(delivery),
        }
    }

    /// Number of pending deliveries
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Register a host listener; subscribe it with [`HandlerId::Listener`]
    pub fn add_listener(&mut self, handler: Box<dyn MessageHandler>) -> ListenerId {
        self.listeners.insert(Some(handler))
    }

    /// Remove a host listener together with its subscriptions
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        if self.listeners.remove(id).is_none() {
            warn!("Cannot remove unknown listener {id:?}");
            return false;
        }
        self.unsubscribe_all(HandlerId::Listener(id));
        true
    }

    pub(crate) fn take_listener(
        &mut self,
        id: ListenerId,
    ) -> Result<Box<dyn MessageHandler>, TakeError> {
        match self.listeners.get_mut(id) {
            None => Err(TakeError::Missing),
            Some(slot) => slot.take().ok_or(TakeError::Busy),
        }
    }

    pub(crate) fn restore_listener(&mut self, id: ListenerId, handler: Box<dyn MessageHandler>) {
        if let Some(slot) = self.listeners.get_mut(id) {
            *slot = Some(handler);
        }
    }

    /// Whether listener `id` is currently handling a message
    pub fn listener_busy(&self, id: ListenerId) -> bool {
        matches!(self.listeners.get(id), Some(None))
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}
