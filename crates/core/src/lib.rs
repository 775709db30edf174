//! `stockcast-core`: shared building blocks.
//!
//! This crate contains **pure** primitives (no infrastructure or numerical concerns).

pub mod error;
pub mod id;
pub mod validate;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::ItemId;
pub use value_object::ValueObject;
