//! Message value types

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::assets::Asset;
use crate::ecs::ExtensionRef;
use crate::input::MouseContext;

/// Delivery priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    /// Delivered synchronously, before `post` returns
    High,
    /// Queued and delivered by the per-tick drain
    #[default]
    Normal,
}

/// Originator of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    /// A component or behaviour
    Extension(ExtensionRef),
    /// The collision detector
    CollisionDetector,
    /// Input translation
    Input,
    /// Asset notifications
    Assets,
    /// Host code or a host listener
    Host,
}

/// Contact between two colliders
#[derive(Debug, Clone, PartialEq)]
pub struct ContactData {
    /// First collider (the smaller ref of the pair)
    pub a: ExtensionRef,
    /// Second collider
    pub b: ExtensionRef,
    /// Name of the first collision component
    pub a_name: String,
    /// Name of the second collision component
    pub b_name: String,
    /// Detector time (accumulated ms) of the last intersecting tick
    pub time: f64,
}

impl ContactData {
    /// True when either side carries `name`
    pub fn involves(&self, name: &str) -> bool {
        self.a_name == name || self.b_name == name
    }

    /// True when either side's name is in `names`
    pub fn involves_any(&self, names: &[String]) -> bool {
        names.iter().any(|name| self.involves(name))
    }
}

/// Message payload
#[derive(Clone)]
pub enum Payload {
    /// Plain number (scores, counters)
    Number(f64),
    /// Plain text
    Text(String),
    /// Pointer state at the time of a mouse event
    Mouse(MouseContext),
    /// Collision contact
    Contact(ContactData),
    /// A freshly loaded asset
    Asset {
        /// Asset name
        name: String,
        /// Asset data
        asset: Rc<Asset>,
    },
    /// Opaque host data
    Custom(Rc<dyn Any>),
}

impl Payload {
    /// Textual form used by text-displaying handlers
    ///
    /// Whole numbers print without a fractional part (`3.0` becomes `"3"`).
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Number(value) => Some(value.to_string()),
            Self::Text(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Mouse(context) => f.debug_tuple("Mouse").field(context).finish(),
            Self::Contact(contact) => f.debug_tuple("Contact").field(contact).finish(),
            Self::Asset { name, asset } => f
                .debug_struct("Asset")
                .field("name", name)
                .field("asset", asset)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<u32> for Payload {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<MouseContext> for Payload {
    fn from(value: MouseContext) -> Self {
        Self::Mouse(value)
    }
}

impl From<ContactData> for Payload {
    fn from(value: ContactData) -> Self {
        Self::Contact(value)
    }
}

/// A message travelling through the bus
#[derive(Debug, Clone)]
pub struct Message {
    /// Routing code
    pub code: String,
    /// Who posted it
    pub sender: Sender,
    /// Optional data
    pub payload: Option<Payload>,
    /// Delivery priority
    pub priority: Priority,
}

impl Message {
    /// Create a NORMAL message without payload
    pub fn new(code: impl Into<String>, sender: Sender) -> Self {
        Self {
            code: code.into(),
            sender,
            payload: None,
            priority: Priority::Normal,
        }
    }

    /// Builder pattern: attach a payload
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Builder pattern: set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder pattern: HIGH priority
    pub fn high(self) -> Self {
        self.with_priority(Priority::High)
    }

    /// Mouse payload, if any
    pub fn mouse(&self) -> Option<&MouseContext> {
        match &self.payload {
            Some(Payload::Mouse(context)) => Some(context),
            _ => None,
        }
    }

    /// Contact payload, if any
    pub fn contact(&self) -> Option<&ContactData> {
        match &self.payload {
            Some(Payload::Contact(contact)) => Some(contact),
            _ => None,
        }
    }

    /// Asset payload, if any
    pub fn asset(&self) -> Option<&Asset> {
        match &self.payload {
            Some(Payload::Asset { asset, .. }) => Some(asset.as_ref()),
            _ => None,
        }
    }

    /// Numeric payload, if any
    pub fn number(&self) -> Option<f64> {
        match &self.payload {
            Some(Payload::Number(value)) => Some(*value),
            _ => None,
        }
    }
}
