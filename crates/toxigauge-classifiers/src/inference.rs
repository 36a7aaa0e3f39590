//! Inference backend trait

use std::sync::Arc;
use toxigauge_core::{Category, EncodedSequence, Result, ScoreVector};

/// Anything that turns an encoded sequence into raw per-category scores.
///
/// Implementations return pre-activation scores; the sigmoid is applied by
/// the caller.
pub trait InferenceBackend: Send + Sync {
    /// Run the model on a single `1 x max_len` row
    fn infer(&self, input: &EncodedSequence) -> Result<ScoreVector>;

    /// Backend name, used in logs and results
    fn name(&self) -> &str;

    /// Number of scores returned per input
    fn num_categories(&self) -> usize {
        Category::COUNT
    }
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for Box<T> {
    fn infer(&self, input: &EncodedSequence) -> Result<ScoreVector> {
        (**self).infer(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_categories(&self) -> usize {
        (**self).num_categories()
    }
}

impl<T: InferenceBackend + ?Sized> InferenceBackend for Arc<T> {
    fn infer(&self, input: &EncodedSequence) -> Result<ScoreVector> {
        (**self).infer(input)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn num_categories(&self) -> usize {
        (**self).num_categories()
    }
}
