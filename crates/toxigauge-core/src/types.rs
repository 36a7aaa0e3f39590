//! Core types for toxigauge

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six toxicity categories the model scores.
///
/// The declaration order is the model's output order: index `i` of a
/// [`ScoreVector`] or [`ProbabilityVector`] belongs to `Category::ALL[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Toxic,
    SevereToxic,
    Obscene,
    Threat,
    Insult,
    IdentityHate,
}

impl Category {
    /// All categories in model output order
    pub const ALL: [Category; 6] = [
        Category::Toxic,
        Category::SevereToxic,
        Category::Obscene,
        Category::Threat,
        Category::Insult,
        Category::IdentityHate,
    ];

    /// Number of categories
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this category in the model output
    pub fn index(self) -> usize {
        self as usize
    }

    /// Machine-readable key, matching the serde representation
    pub fn key(self) -> &'static str {
        match self {
            Self::Toxic => "toxic",
            Self::SevereToxic => "severe_toxic",
            Self::Obscene => "obscene",
            Self::Threat => "threat",
            Self::Insult => "insult",
            Self::IdentityHate => "identity_hate",
        }
    }

    /// Human-readable name used as gauge title
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Toxic => "Toxic",
            Self::SevereToxic => "Severe Toxic",
            Self::Obscene => "Obscene",
            Self::Threat => "Threat",
            Self::Insult => "Insult",
            Self::IdentityHate => "Identity Hate",
        }
    }

    /// Short explanation of what the category covers
    pub fn description(self) -> &'static str {
        match self {
            Self::Toxic => "General toxic or rude comments that are likely to be offensive.",
            Self::SevereToxic => "Extremely aggressive, hateful, or threatening comments.",
            Self::Obscene => "Contains offensive language, profanity, or vulgar words.",
            Self::Threat => "Direct threats of violence or harm towards individuals or groups.",
            Self::Insult => "Personal attacks, name-calling, or derogatory remarks.",
            Self::IdentityHate => {
                "Hate speech targeting specific identity groups (race, gender, religion, etc.)."
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fixed-length sequence of vocabulary ids fed to the model as one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSequence {
    ids: Vec<u32>,
}

impl EncodedSequence {
    /// Wrap already encoded ids
    pub fn new(ids: Vec<u32>) -> Self {
        Self { ids }
    }

    /// The encoded ids
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Sequence length (the configured maximum length)
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Shape of the row tensor handed to the inference collaborator
    pub fn shape(&self) -> (usize, usize) {
        (1, self.ids.len())
    }

    pub fn into_inner(self) -> Vec<u32> {
        self.ids
    }
}

/// Raw, pre-activation scores, one per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector {
    scores: Vec<f32>,
}

impl ScoreVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Per-category independent probabilities in `[0, 1]`.
///
/// Categories are not mutually exclusive, so the values do not sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector {
    probabilities: Vec<f32>,
}

impl ProbabilityVector {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self { probabilities }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.probabilities
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Probability of a single category, if the vector covers it
    pub fn get(&self, category: Category) -> Option<f32> {
        self.probabilities.get(category.index()).copied()
    }

    /// Probability of the first ("toxic") category, 0.0 for an empty vector
    pub fn toxic(&self) -> f32 {
        self.get(Category::Toxic).unwrap_or(0.0)
    }

    /// Pairs of category and probability in output order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f32)> + '_ {
        Category::ALL
            .into_iter()
            .zip(self.probabilities.iter().copied())
    }
}

/// Binary outcome derived from the "toxic" probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToxicityLabel {
    #[serde(rename = "TOXIC")]
    Toxic,
    #[serde(rename = "NOT TOXIC")]
    NotToxic,
}

impl ToxicityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toxic => "TOXIC",
            Self::NotToxic => "NOT TOXIC",
        }
    }

    pub fn is_toxic(self) -> bool {
        matches!(self, Self::Toxic)
    }
}

impl fmt::Display for ToxicityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_order() {
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
        assert_eq!(Category::COUNT, 6);
        assert_eq!(Category::ALL[0], Category::Toxic);
    }

    #[test]
    fn test_category_serde_matches_key() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.key()));
        }
    }

    #[test]
    fn test_probability_vector_lookup() {
        let probs = ProbabilityVector::new(vec![0.9, 0.1, 0.2, 0.3, 0.4, 0.5]);
        assert_eq!(probs.toxic(), 0.9);
        assert_eq!(probs.get(Category::IdentityHate), Some(0.5));

        let pairs: Vec<_> = probs.iter().collect();
        assert_eq!(pairs.len(), 6);
        assert_eq!(pairs[3], (Category::Threat, 0.3));
    }

    #[test]
    fn test_empty_probability_vector() {
        let probs = ProbabilityVector::new(Vec::new());
        assert_eq!(probs.toxic(), 0.0);
        assert!(probs.get(Category::Insult).is_none());
    }

    #[test]
    fn test_label_display_and_serde() {
        assert_eq!(ToxicityLabel::Toxic.to_string(), "TOXIC");
        assert_eq!(ToxicityLabel::NotToxic.to_string(), "NOT TOXIC");
        assert_eq!(
            serde_json::to_string(&ToxicityLabel::NotToxic).unwrap(),
            "\"NOT TOXIC\""
        );
        assert!(ToxicityLabel::Toxic.is_toxic());
        assert!(!ToxicityLabel::NotToxic.is_toxic());
    }

    #[test]
    fn test_encoded_sequence_shape() {
        let seq = EncodedSequence::new(vec![4, 7, 0, 0]);
        assert_eq!(seq.shape(), (1, 4));
        assert_eq!(seq.ids(), &[4, 7, 0, 0]);
    }
}
