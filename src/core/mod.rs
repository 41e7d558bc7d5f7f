//! Core types and constants for cloud anchor coordination

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
