//! Post-processing of raw model scores
//!
//! Categories are independent (multi-label), so each raw score goes through
//! its own sigmoid rather than a softmax across categories.

use serde::{Deserialize, Serialize};
use toxigauge_core::{Category, ProbabilityVector, ScoreVector, ToxicityLabel};

/// Default decision threshold for the "toxic" probability
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Percentage above which a gauge is drawn as alarming
const GAUGE_ALERT_PERCENT: f32 = 50.0;

/// Smallest probability [`sigmoid`] returns
pub const MIN_PROBABILITY: f32 = f32::MIN_POSITIVE;

/// Largest probability [`sigmoid`] returns, the last f32 below 1
pub const MAX_PROBABILITY: f32 = 1.0 - f32::EPSILON / 2.0;

/// Logistic sigmoid.
///
/// In f32 the raw formula rounds to exactly 1.0 above x of about 17 and to
/// 0.0 below about -88, so the result is clamped to
/// [`MIN_PROBABILITY`]..=[`MAX_PROBABILITY`] and stays inside (0, 1) for
/// every finite input.
pub fn sigmoid(x: f32) -> f32 {
    (1.0 / (1.0 + (-x).exp())).clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// Apply the sigmoid to every raw score
pub fn activate(scores: &ScoreVector) -> ProbabilityVector {
    ProbabilityVector::new(scores.as_slice().iter().copied().map(sigmoid).collect())
}

/// Binary label from the "toxic" probability.
///
/// Strictly greater than the threshold is toxic; equality is not.
pub fn label(toxic_probability: f32, threshold: f32) -> ToxicityLabel {
    if toxic_probability > threshold {
        ToxicityLabel::Toxic
    } else {
        ToxicityLabel::NotToxic
    }
}

/// Probabilities on a 0-100 scale
pub fn to_percentages(probabilities: &ProbabilityVector) -> Vec<f32> {
    probabilities.as_slice().iter().map(|p| p * 100.0).collect()
}

/// Values shown on the gauges, on a 0-100 scale.
///
/// When the "toxic" probability is below the threshold the text is not
/// considered toxic at all, so every other category is reported as zero.
pub fn gauge_values(probabilities: &ProbabilityVector, threshold: f32) -> Vec<f32> {
    let toxic = probabilities.toxic();
    probabilities
        .as_slice()
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if toxic < threshold && i != Category::Toxic.index() {
                0.0
            } else {
                p * 100.0
            }
        })
        .collect()
}

/// Gauge colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GaugeColor {
    Red,
    Green,
}

/// Red above 50%, green otherwise
pub fn gauge_color(percentage: f32) -> GaugeColor {
    if percentage > GAUGE_ALERT_PERCENT {
        GaugeColor::Red
    } else {
        GaugeColor::Green
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_zero() {
        assert_eq!(sigmoid(0.0), 0.5);
    }

    #[test]
    fn test_sigmoid_symmetry() {
        for x in [0.1f32, 1.0, 2.5, 7.0] {
            assert!((sigmoid(x) + sigmoid(-x) - 1.0).abs() < 1e-6);
        }
        assert!(sigmoid(4.0) > 0.98);
        assert!(sigmoid(-4.0) < 0.02);
    }

    #[test]
    fn test_sigmoid_saturation_clamped() {
        assert!(MAX_PROBABILITY < 1.0);
        assert_eq!(sigmoid(20.0), MAX_PROBABILITY);
        assert_eq!(sigmoid(f32::MAX), MAX_PROBABILITY);
        assert_eq!(sigmoid(-100.0), MIN_PROBABILITY);
        assert_eq!(sigmoid(f32::MIN), MIN_PROBABILITY);
        assert!(sigmoid(-100.0) > 0.0);

        // A saturated score still labels as toxic at the largest threshold.
        assert_eq!(label(sigmoid(50.0), 0.999), ToxicityLabel::Toxic);
        assert_eq!(label(sigmoid(50.0), 1.0), ToxicityLabel::NotToxic);
    }

    #[test]
    fn test_zero_scores() {
        let probs = activate(&ScoreVector::new(vec![0.0; 6]));
        assert_eq!(probs.as_slice(), &[0.5; 6]);
        assert_eq!(to_percentages(&probs), vec![50.0; 6]);
        assert_eq!(label(probs.toxic(), 0.5), ToxicityLabel::NotToxic);
    }

    #[test]
    fn test_label_threshold() {
        assert_eq!(label(0.9, 0.5), ToxicityLabel::Toxic);
        assert_eq!(label(0.5, 0.5), ToxicityLabel::NotToxic);
        assert_eq!(label(0.1, 0.0), ToxicityLabel::Toxic);
        assert_eq!(label(1.0, 1.0), ToxicityLabel::NotToxic);
    }

    #[test]
    fn test_gauge_values_below_threshold() {
        let probs = ProbabilityVector::new(vec![0.3, 0.2, 0.5, 0.6, 0.8, 0.99]);
        let values = gauge_values(&probs, 0.5);
        assert!((values[0] - 30.0).abs() < 1e-4);
        assert!(values[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_gauge_values_above_threshold() {
        let probs = ProbabilityVector::new(vec![0.75, 0.25, 0.5, 0.5, 0.5, 0.5]);
        let values = gauge_values(&probs, 0.5);
        assert_eq!(values, vec![75.0, 25.0, 50.0, 50.0, 50.0, 50.0]);

        // At the threshold the other categories stay visible.
        let probs = ProbabilityVector::new(vec![0.5, 0.25, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(gauge_values(&probs, 0.5)[1], 25.0);
    }

    #[test]
    fn test_gauge_color() {
        assert_eq!(gauge_color(50.0), GaugeColor::Green);
        assert_eq!(gauge_color(50.1), GaugeColor::Red);
        assert_eq!(gauge_color(0.0), GaugeColor::Green);
    }
}
