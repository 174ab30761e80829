//! Storegate Shared Types
//!
//! This crate contains the tenant types and the propagation contract shared
//! between the gateway and downstream services (renderers, theme loader,
//! dashboard).

pub mod error;
pub mod types;

pub use error::*;
pub use types::*;
