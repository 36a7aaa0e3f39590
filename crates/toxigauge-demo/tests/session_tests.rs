//! CLI session tests with a scripted inference backend

use std::io::Cursor;
use std::sync::Arc;
use toxigauge_classifiers::{InferenceBackend, TextEncoder, ToxicCommentClassifier, Vocabulary};
use toxigauge_core::{EncodedSequence, Error, Result, ScoreVector};
use toxigauge_demo::render::{render_gauges, render_summary};
use toxigauge_demo::session::{read_text, run_interactive, write_classification};

/// Scores text as toxic when it contains the word "idiot" (id 3)
struct KeywordBackend;

impl InferenceBackend for KeywordBackend {
    fn infer(&self, input: &EncodedSequence) -> Result<ScoreVector> {
        if input.ids().contains(&3) {
            Ok(ScoreVector::new(vec![3.0, -1.0, 2.0, -3.0, 1.0, -2.0]))
        } else {
            Ok(ScoreVector::new(vec![-3.0, -3.0, -3.0, 3.0, -3.0, -3.0]))
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

struct BrokenBackend;

impl InferenceBackend for BrokenBackend {
    fn infer(&self, _input: &EncodedSequence) -> Result<ScoreVector> {
        Err(Error::inference("model not loaded"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

fn classifier(backend: Box<dyn InferenceBackend>) -> ToxicCommentClassifier {
    let vocab =
        Vocabulary::from_json(r#"{"<PAD>": 0, "<UNK>": 1, "you": 2, "idiot": 3}"#).unwrap();
    let encoder = TextEncoder::with_max_len(Arc::new(vocab), 16).unwrap();
    ToxicCommentClassifier::new(encoder, backend)
}

#[test]
fn test_summary_line() {
    let result = classifier(Box::new(KeywordBackend))
        .classify("You IDIOT!")
        .unwrap();
    assert_eq!(
        render_summary(&result),
        "The text has been classified as TOXIC (probability 95.3%)"
    );
}

#[test]
fn test_gauges_masked_when_not_toxic() {
    let result = classifier(Box::new(KeywordBackend))
        .classify("hello there")
        .unwrap();
    let gauges = render_gauges(&result);
    let lines: Vec<_> = gauges.lines().collect();

    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("Toxic"));
    // Threat scored high but the text is not toxic, so its gauge is empty.
    assert!(lines[3].contains("  0.0%"));
    assert!(lines.iter().all(|l| l.ends_with("green")));
}

#[test]
fn test_interactive_json_lines() {
    let classifier = classifier(Box::new(KeywordBackend));
    let input = Cursor::new("you idiot\n\n   \nhave a nice day\n");
    let mut output = Vec::new();

    let count = run_interactive(&classifier, input, &mut output, true).unwrap();
    assert_eq!(count, 2);

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["label"], "TOXIC");
    assert_eq!(lines[0]["categories"][0]["category"], "toxic");
    assert_eq!(lines[0]["categories"][0]["color"], "red");
    assert_eq!(lines[1]["label"], "NOT TOXIC");
    assert_eq!(lines[1]["categories"][3]["gauge"], 0.0);
}

#[test]
fn test_interactive_text_reports() {
    let classifier = classifier(Box::new(KeywordBackend));
    let mut output = Vec::new();

    run_interactive(&classifier, Cursor::new("idiot\nyou\n"), &mut output, false).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert_eq!(text.matches("The text has been classified as").count(), 2);
    assert!(text.contains("Threshold: 0.50"));
}

#[test]
fn test_interactive_threshold_command() {
    let classifier = classifier(Box::new(KeywordBackend));
    // The keyword backend gives "idiot" a toxic probability of about 0.953.
    let input = Cursor::new("idiot\n:threshold 0.97\nidiot\n:threshold 0.2\nidiot\n");
    let mut output = Vec::new();

    let count = run_interactive(&classifier, input, &mut output, true).unwrap();
    assert_eq!(count, 3);

    let text = String::from_utf8(output).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["label"], "TOXIC");
    assert_eq!(lines[1]["label"], "NOT TOXIC");
    assert_eq!(lines[1]["threshold"].as_f64().unwrap() as f32, 0.97);
    assert_eq!(lines[2]["label"], "TOXIC");
    assert_eq!(lines[2]["threshold"].as_f64().unwrap() as f32, 0.2);
}

#[test]
fn test_interactive_invalid_threshold_kept() {
    let classifier = classifier(Box::new(KeywordBackend));
    let input = Cursor::new(":threshold 2\n:threshold\nidiot\n");
    let mut output = Vec::new();

    let count = run_interactive(&classifier, input, &mut output, false).unwrap();
    assert_eq!(count, 1);

    let text = String::from_utf8(output).unwrap();
    assert!(!text.contains("Threshold set to"));
    assert!(text.contains("Threshold: 0.50"));
    assert!(text.contains("classified as TOXIC"));
}

#[test]
fn test_interactive_threshold_confirmed_in_text_mode() {
    let classifier = classifier(Box::new(KeywordBackend));
    let mut output = Vec::new();

    run_interactive(&classifier, Cursor::new(":threshold 0.75\nyou\n"), &mut output, false)
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("Threshold set to 0.75\n"));
    assert!(text.contains("Threshold: 0.75"));
}

#[test]
fn test_interactive_propagates_failure() {
    let classifier = classifier(Box::new(BrokenBackend));
    let mut output = Vec::new();

    let err = run_interactive(&classifier, Cursor::new("hello\n"), &mut output, false)
        .unwrap_err();
    assert!(err.to_string().contains("model not loaded"));
    assert!(output.is_empty());
}

#[test]
fn test_write_classification_text() {
    let result = classifier(Box::new(KeywordBackend)).classify("").unwrap();
    let mut output = Vec::new();
    write_classification(&result, false, &mut output).unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("The text has been classified as NOT TOXIC"));
}

#[test]
fn test_read_text_prefers_argument() {
    let text = read_text(Some("given".to_string()), Cursor::new("ignored")).unwrap();
    assert_eq!(text, "given");

    let text = read_text(None, Cursor::new("from stdin\n")).unwrap();
    assert_eq!(text, "from stdin\n");
}
