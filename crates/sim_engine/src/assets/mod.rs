//! Asset management system
//!
//! Fetching and decoding happen outside the core. Hosts hand finished assets
//! to the engine, which stores them here and announces them on the bus.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;
use serde_json::Value;

/// A decoded asset
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// Image metadata (pixels stay with the renderer)
    Image {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Parsed JSON document (zone files)
    Json(Value),
    /// Plain text
    Text(String),
}

impl Asset {
    /// Image dimensions, if this is an image
    pub fn image_size(&self) -> Option<(u32, u32)> {
        match self {
            Self::Image { width, height } => Some((*width, *height)),
            _ => None,
        }
    }

    /// JSON document, if this is one
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Read access to loaded assets
pub trait AssetProvider {
    /// Whether `name` has been loaded
    fn is_loaded(&self, name: &str) -> bool;

    /// The asset stored under `name`
    fn get(&self, name: &str) -> Option<Rc<Asset>>;
}

/// In-memory asset store
#[derive(Debug, Default)]
pub struct AssetManager {
    assets: HashMap<String, Rc<Asset>>,
}

impl AssetManager {
    /// Create an empty asset manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an asset, replacing any previous one with the same name
    pub fn insert(&mut self, name: impl Into<String>, asset: Asset) -> Rc<Asset> {
        let name = name.into();
        let asset = Rc::new(asset);
        debug!("Asset '{name}' stored");
        self.assets.insert(name, Rc::clone(&asset));
        asset
    }

    /// Drop an asset
    pub fn remove(&mut self, name: &str) -> Option<Rc<Asset>> {
        self.assets.remove(name)
    }

    /// Number of stored assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetProvider for AssetManager {
    fn is_loaded(&self, name: &str) -> bool {
        self.assets.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Rc<Asset>> {
        self.assets.get(name).cloned()
    }
}
