//! # advsound-core
//!
//! Core types, configuration, and error handling shared by the advsound
//! backends and the sound controller.

pub mod config;
pub mod error;
pub mod types;

pub use config::ControllerConfig;
pub use error::{Error, Result};
pub use types::*;
