//! Extension framework
//!
//! Entities gain data and logic through two kinds of extensions: components
//! (loaded, updated, rendered) and behaviours (updated, plus a one-off
//! `update_ready`). Both are built from declarative JSON records by the
//! [`ExtensionRegistry`].

pub mod behaviours;
pub mod component;
pub mod components;
pub mod extension;
pub mod record;
pub mod registry;

pub use component::{Behaviour, Component};
pub use extension::{BuiltExtension, Extension, ExtensionBase, ExtensionKind, ExtensionRef};
pub use registry::ExtensionRegistry;
