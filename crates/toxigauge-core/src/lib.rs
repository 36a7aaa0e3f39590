//! toxigauge Core
//!
//! Core types and utilities shared across toxigauge components.
//!
//! This crate provides:
//! - The fixed list of toxicity categories and their display metadata
//! - Value types for the encode -> infer -> activate pipeline
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Category, EncodedSequence, ProbabilityVector, ScoreVector, ToxicityLabel};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        Category, EncodedSequence, ProbabilityVector, ScoreVector, ToxicityLabel,
    };
}
