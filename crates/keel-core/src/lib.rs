//! # keel-core
//!
//! Core types shared by every Keel crate: the error type, the closed set of
//! network profile names, and the opaque wrapper for credential material.

pub mod error;
pub mod secret;
pub mod types;

pub use error::{KeelError, Result};
pub use secret::Secret;
pub use types::ProfileName;
