//! # Domain
//!
//! Plain data shared by every crate: configuration, well-known names and the
//! slice registry. Only `serde` is allowed here.

pub mod config;
pub mod constants;
pub mod registry;
