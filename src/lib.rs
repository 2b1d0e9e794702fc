//! Motion analysis engine
//!
//! Turns a stream of 33-point body pose landmarks into exercise metrics:
//! repetition counts, movement phase, a 0-100 form score and exercise
//! specific measures. A companion verifier checks that each sampled frame
//! visually matches a reference face captured at enrollment.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use config::{EngineConfig, FaceVerifierConfig};
pub use error::{EngineError, Result};
