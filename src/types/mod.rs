//! Shared types for docport

pub mod error;

pub use error::{GatewayError, Result};
