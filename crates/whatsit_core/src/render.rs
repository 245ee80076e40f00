//! User-facing text.

use crate::upload::ClassificationResult;

pub const TITLE: &str = "Is it a cat, Kanye or Pikachu?";
pub const DROP_PROMPT: &str = "Drag 'n' drop an image here, or click to select (Max. 5MB)";
pub const DROP_ACTIVE_PROMPT: &str = "Drop the file here";
pub const IN_PROGRESS_MESSAGE: &str = "Hold your horses...";
pub const FAILURE_MESSAGE: &str = "Oops, something went wrong! Try another image perhaps";

/// The sentence shown for a result, or `None` when there is none yet.
pub fn format_result(result: Option<&ClassificationResult>) -> Option<String> {
    result.map(|r| match r {
        ClassificationResult::Success { label, score } => format_success(label, *score),
        ClassificationResult::Failure => FAILURE_MESSAGE.to_string(),
    })
}

pub fn format_success(label: &str, score: f64) -> String {
    format!("I am {:.2}% sure that's {label}", score * 100.0)
}
