use std::ops::Range;

use crate::pronunciation::EvaluationMode;

/// Label used when the reference text yields nothing to score.
pub const PLACEHOLDER_LABEL: &str = "?";

/// Half-open span of reference frames attributed to one character or word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// Splits the reference frame axis into one segment per label of `text`.
pub fn build_segments(text: &str, mode: EvaluationMode, frame_count: usize) -> Vec<Segment> {
    let labels = segment_labels(text, mode);
    partition_frames(frame_count, labels.len())
        .into_iter()
        .zip(labels)
        .map(|((start, end), label)| Segment { label, start, end })
        .collect()
}

pub fn segment_labels(text: &str, mode: EvaluationMode) -> Vec<String> {
    match mode {
        EvaluationMode::Word => character_labels(text),
        EvaluationMode::Sentence => word_labels(text),
    }
}

/// Non-whitespace characters in order.
pub fn character_labels(text: &str) -> Vec<String> {
    let letters: Vec<String> = text
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(String::from)
        .collect();
    if !letters.is_empty() {
        return letters;
    }
    let fallback: Vec<String> = text.trim().chars().map(String::from).collect();
    or_placeholder(fallback)
}

/// Space-delimited tokens after folding line breaks into spaces.
pub fn word_labels(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", " ").replace(['\r', '\n'], " ");
    let words: Vec<String> = normalized
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect();
    if !words.is_empty() {
        return words;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        or_placeholder(Vec::new())
    } else {
        vec![trimmed.to_string()]
    }
}

fn or_placeholder(labels: Vec<String>) -> Vec<String> {
    if labels.is_empty() {
        vec![PLACEHOLDER_LABEL.to_string()]
    } else {
        labels
    }
}

/// Evenly spaced integer boundaries `floor(k * frames / labels)`. An empty
/// interval is widened to one frame by advancing its end only; the following
/// interval keeps its own start.
pub fn partition_frames(frame_count: usize, label_count: usize) -> Vec<(usize, usize)> {
    let label_count = label_count.max(1);
    let boundary = |k: usize| (k as u128 * frame_count as u128 / label_count as u128) as usize;
    (0..label_count)
        .map(|k| {
            let start = boundary(k);
            let end = boundary(k + 1);
            if end > start {
                (start, end)
            } else {
                (start, start + 1)
            }
        })
        .collect()
}
