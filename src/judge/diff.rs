//! Output comparison

use crate::{constants::DIFF_PREVIEW_CHARS, utils::truncate_chars};

/// Compare program output against the expected output
///
/// Both sides are trimmed before comparison. Returns `None` when they match,
/// otherwise a one-line summary of the first difference.
pub fn compare_output(actual: &str, expected: &str) -> Option<String> {
    let actual = actual.trim();
    let expected = expected.trim();

    if actual == expected {
        return None;
    }

    Some(diff_summary(actual, expected))
}

/// Describe how two (already trimmed) outputs differ
pub fn diff_summary(actual: &str, expected: &str) -> String {
    let actual_lines: Vec<&str> = actual.split('\n').collect();
    let expected_lines: Vec<&str> = expected.split('\n').collect();

    if actual_lines.len() != expected_lines.len() {
        return format!(
            "Output has {} lines but expected {} lines",
            actual_lines.len(),
            expected_lines.len()
        );
    }

    actual_lines
        .iter()
        .zip(&expected_lines)
        .position(|(a, e)| a != e)
        .map(|i| {
            format!(
                "Line {}: got '{}' but expected '{}'",
                i + 1,
                truncate_chars(actual_lines[i], DIFF_PREVIEW_CHARS),
                truncate_chars(expected_lines[i], DIFF_PREVIEW_CHARS)
            )
        })
        .unwrap_or_else(|| "Output mismatch (format issue)".to_string())
}
