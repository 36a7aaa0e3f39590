//! Terminal rendering of classification results

use serde::Serialize;
use toxigauge_classifiers::{Classification, GaugeColor};
use toxigauge_core::{Category, ToxicityLabel};

/// Width of a gauge bar in characters
const BAR_WIDTH: usize = 30;

/// One line summary, e.g. `The text has been classified as TOXIC (probability 91.2%)`
pub fn render_summary(result: &Classification) -> String {
    format!(
        "The text has been classified as {} (probability {:.1}%)",
        result.label,
        result.toxic_probability() * 100.0
    )
}

/// Text gauges, one per category
pub fn render_gauges(result: &Classification) -> String {
    let name_width = Category::ALL
        .iter()
        .map(|c| c.display_name().len())
        .max()
        .unwrap_or(0);

    result
        .gauges()
        .iter()
        .map(|gauge| {
            format!(
                "{:<width$}  {}  {:>5.1}%  {}",
                gauge.category.display_name(),
                bar(gauge.value),
                gauge.value,
                color_marker(gauge.color),
                width = name_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary, threshold and gauges
pub fn render_report(result: &Classification) -> String {
    format!(
        "{}\nThreshold: {:.2}\n\n{}",
        render_summary(result),
        result.threshold,
        render_gauges(result)
    )
}

/// Category help text
pub fn render_categories() -> String {
    Category::ALL
        .iter()
        .map(|c| format!("- {}: {}", c.display_name(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bar(percent: f32) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f32).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn color_marker(color: GaugeColor) -> &'static str {
    match color {
        GaugeColor::Red => "red",
        GaugeColor::Green => "green",
    }
}

/// JSON view of a classification
#[derive(Debug, Serialize)]
pub struct Report {
    pub label: ToxicityLabel,
    pub threshold: f32,
    pub categories: Vec<CategoryReport>,
    pub model: String,
    pub latency_us: u64,
}

#[derive(Debug, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub name: &'static str,
    /// Probability on a 0-100 scale
    pub probability: f32,
    /// Gauge value after threshold masking, 0-100
    pub gauge: f32,
    pub color: GaugeColor,
}

impl Report {
    pub fn new(result: &Classification) -> Self {
        let categories = result
            .gauges()
            .into_iter()
            .zip(result.percentages())
            .map(|(gauge, probability)| CategoryReport {
                category: gauge.category,
                name: gauge.category.display_name(),
                probability,
                gauge: gauge.value,
                color: gauge.color,
            })
            .collect();

        Self {
            label: result.label,
            threshold: result.threshold,
            categories,
            model: result.model.clone(),
            latency_us: result.latency_us,
        }
    }
}
