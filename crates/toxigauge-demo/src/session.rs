//! Request loop and output helpers shared by the CLI commands

use crate::render::{render_report, Report};
use std::io::{BufRead, Read, Write};
use toxigauge_classifiers::{validate_threshold, Classification, ToxicCommentClassifier};

/// Line command that changes the threshold for the rest of a session
pub const THRESHOLD_COMMAND: &str = ":threshold";

/// Text from the command line, or all of `input` when none was given
pub fn read_text<R: Read>(text: Option<String>, mut input: R) -> anyhow::Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            input.read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write one classification, as a report or a single JSON line
pub fn write_classification<W: Write>(
    result: &Classification,
    json: bool,
    output: &mut W,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *output, &Report::new(result))?;
        writeln!(output)?;
    } else {
        writeln!(output, "{}", render_report(result))?;
    }
    Ok(())
}

/// Parse the argument of a `:threshold` line, e.g. `0.7`
pub fn parse_threshold(arg: &str) -> anyhow::Result<f32> {
    let value: f32 = arg
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid threshold {:?}: {}", arg.trim(), e))?;
    Ok(validate_threshold(value)?)
}

/// Classify every non-blank line of `input` until EOF.
///
/// A line `:threshold <value>` changes the threshold used for the following
/// lines; an invalid value is reported and the previous threshold kept.
/// Returns the number of lines classified. A failing inference call stops
/// the loop and is returned to the caller.
pub fn run_interactive<R: BufRead, W: Write>(
    classifier: &ToxicCommentClassifier,
    input: R,
    output: &mut W,
    json: bool,
) -> anyhow::Result<usize> {
    let mut count = 0;
    let mut threshold = classifier.threshold();

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(arg) = threshold_argument(trimmed) {
            match parse_threshold(arg) {
                Ok(value) => {
                    threshold = value;
                    tracing::info!(threshold, "Threshold changed");
                    if !json {
                        writeln!(output, "Threshold set to {:.2}", threshold)?;
                    }
                }
                Err(e) => tracing::warn!(error = %e, threshold, "Keeping current threshold"),
            }
            continue;
        }

        let result = classifier.classify_with_threshold(&line, threshold)?;
        if !json && count > 0 {
            writeln!(output)?;
        }
        write_classification(&result, json, output)?;
        output.flush()?;
        count += 1;
    }

    tracing::debug!(count, "Input exhausted");
    Ok(count)
}

fn threshold_argument(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(THRESHOLD_COMMAND)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}
