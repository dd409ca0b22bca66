//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and the hierarchical `Transform`
//! - Time management for the run loop
//! - Logging utilities
//! - Typed downcasting for trait objects

pub mod any;
pub mod logging;
pub mod math;
pub mod time;
