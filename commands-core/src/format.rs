// commands-core/src/format.rs

//! Turns an [`ExecutionResult`] into labeled text segments.

use crate::executor::ExecutionResult;
use serde::Serialize;

/// Which stream a segment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SegmentLabel {
    #[serde(rename = "3ERROR")]
    Error,
    #[serde(rename = "3STDOUT")]
    Stdout,
    #[serde(rename = "3STDERR")]
    Stderr,
}

impl SegmentLabel {
    /// Display name hosts have historically sorted and rendered by.
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentLabel::Error => "3ERROR",
            SegmentLabel::Stdout => "3STDOUT",
            SegmentLabel::Stderr => "3STDERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    pub label: SegmentLabel,
    pub text: String,
}

impl TextSegment {
    pub fn new(label: SegmentLabel, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// Emits ERROR, STDOUT, STDERR in that order, skipping any that are empty.
pub fn format_segments(result: &ExecutionResult) -> Vec<TextSegment> {
    let error = result.error.as_deref().unwrap_or_default();
    [
        (SegmentLabel::Error, error),
        (SegmentLabel::Stdout, result.stdout.as_str()),
        (SegmentLabel::Stderr, result.stderr.as_str()),
    ]
    .into_iter()
    .filter(|(_, text)| !text.is_empty())
    .map(|(label, text)| TextSegment::new(label, text))
    .collect()
}
