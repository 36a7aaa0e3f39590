//! End-to-end toxic comment classifier
//!
//! Composes the text encoder, an inference backend and the post-processing
//! step. Holds only immutable state, so a single instance serves every
//! request.

use crate::config::{validate_threshold, ClassifierConfig};
use crate::inference::InferenceBackend;
use crate::model_loader::LoadedModel;
use crate::predict::{self, GaugeColor, DEFAULT_THRESHOLD};
use crate::tokenizer::TextEncoder;
use serde::Serialize;
use std::time::Instant;
use toxigauge_core::{
    Category, EncodedSequence, Error, ProbabilityVector, Result, ScoreVector, ToxicityLabel,
};

/// Result of classifying one text
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    /// Binary label from the "toxic" probability
    pub label: ToxicityLabel,

    /// Per-category probabilities in `[0, 1]`
    pub probabilities: ProbabilityVector,

    /// Threshold the label was derived with
    pub threshold: f32,

    /// Name of the backend that produced the scores
    pub model: String,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl Classification {
    /// Probability of the "toxic" category
    pub fn toxic_probability(&self) -> f32 {
        self.probabilities.toxic()
    }

    pub fn is_toxic(&self) -> bool {
        self.label.is_toxic()
    }

    /// Probabilities on a 0-100 scale
    pub fn percentages(&self) -> Vec<f32> {
        predict::to_percentages(&self.probabilities)
    }

    /// One gauge per category, with values masked by the threshold
    pub fn gauges(&self) -> Vec<Gauge> {
        predict::gauge_values(&self.probabilities, self.threshold)
            .into_iter()
            .zip(Category::ALL)
            .map(|(value, category)| Gauge {
                category,
                value,
                color: predict::gauge_color(value),
            })
            .collect()
    }
}

/// Display value of a single category
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gauge {
    pub category: Category,
    /// Value on a 0-100 scale
    pub value: f32,
    pub color: GaugeColor,
}

/// Toxic comment classifier over any [`InferenceBackend`]
pub struct ToxicCommentClassifier {
    encoder: TextEncoder,
    backend: Box<dyn InferenceBackend>,
    threshold: f32,
}

impl ToxicCommentClassifier {
    /// Create a classifier with the default threshold
    pub fn new(encoder: TextEncoder, backend: Box<dyn InferenceBackend>) -> Self {
        Self {
            encoder,
            backend,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Load the model described by `config`
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;

        let (model, vocabulary) = LoadedModel::load(config.to_model_config())?.into_parts();
        let encoder = TextEncoder::with_max_len(vocabulary, config.max_len)?;

        Self::new(encoder, Box::new(model)).with_threshold(config.threshold)
    }

    /// Set the default threshold
    pub fn with_threshold(mut self, threshold: f32) -> Result<Self> {
        self.threshold = validate_threshold(threshold)?;
        Ok(self)
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn encoder(&self) -> &TextEncoder {
        &self.encoder
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Encode `text` without running the model
    pub fn encode(&self, text: &str) -> EncodedSequence {
        self.encoder.encode(text)
    }

    /// Raw scores for `text`
    pub fn scores(&self, text: &str) -> Result<ScoreVector> {
        let encoded = self.encoder.encode(text);
        let scores = self.backend.infer(&encoded)?;

        if scores.len() != Category::COUNT {
            return Err(Error::inference(format!(
                "backend {} returned {} scores, expected {}",
                self.backend.name(),
                scores.len(),
                Category::COUNT
            )));
        }

        Ok(scores)
    }

    /// Per-category probabilities for `text`
    pub fn probabilities(&self, text: &str) -> Result<ProbabilityVector> {
        Ok(predict::activate(&self.scores(text)?))
    }

    /// Classify with the configured threshold
    pub fn classify(&self, text: &str) -> Result<Classification> {
        self.classify_with_threshold(text, self.threshold)
    }

    /// Classify with an explicit threshold in `[0, 1]`
    pub fn classify_with_threshold(&self, text: &str, threshold: f32) -> Result<Classification> {
        let threshold = validate_threshold(threshold)?;
        let start = Instant::now();

        let probabilities = self.probabilities(text)?;
        let label = predict::label(probabilities.toxic(), threshold);
        let latency_us = start.elapsed().as_micros() as u64;

        tracing::debug!(
            model = self.backend.name(),
            toxic = probabilities.toxic(),
            threshold,
            %label,
            latency_us,
            "Classified text"
        );

        Ok(Classification {
            label,
            probabilities,
            threshold,
            model: self.backend.name().to_string(),
            latency_us,
        })
    }
}
