//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ItemType, OperatorId};
