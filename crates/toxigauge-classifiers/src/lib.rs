//! toxigauge Classifiers
//!
//! Multi-label toxic comment classification.
//!
//! A request flows through three stages:
//! - [`tokenizer::TextEncoder`] turns raw text into a fixed-length id sequence
//! - an [`inference::InferenceBackend`] produces one raw score per category
//! - [`predict`] applies the sigmoid and derives the binary label
//!
//! [`ToxicCommentClassifier`] wires the stages together; [`CnnGruModel`] is
//! the Candle backend for the pretrained CNN + GRU model.

pub mod classifier;
pub mod cnn_gru;
pub mod config;
pub mod inference;
pub mod model_loader;
pub mod predict;
pub mod tokenizer;
pub mod vocab;

pub use classifier::{Classification, Gauge, ToxicCommentClassifier};
pub use cnn_gru::{CnnGruConfig, CnnGruModel};
pub use config::{validate_threshold, ClassifierConfig, DeviceSpec, ModelSourceSpec};
pub use inference::InferenceBackend;
pub use model_loader::{load_vocabulary, DeviceType, LoadedModel, ModelConfig, ModelSource};
pub use predict::GaugeColor;
pub use tokenizer::TextEncoder;
pub use vocab::Vocabulary;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::{Classification, ToxicCommentClassifier};
    pub use crate::config::ClassifierConfig;
    pub use crate::inference::InferenceBackend;
    pub use crate::tokenizer::TextEncoder;
    pub use crate::vocab::Vocabulary;
    pub use toxigauge_core::prelude::*;
}
