use serde::{Deserialize, Serialize};

use crate::pronunciation::EvaluationMode;

/// Support behind a single segment score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    /// Mean aligned distance, or the global mean when `support` is zero.
    pub avg_diff: f32,
    /// Number of path pairs that landed in the segment.
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterScore {
    pub symbol: String,
    pub score: f32,
    pub frame_start: usize,
    pub frame_end: usize,
    pub metrics: SegmentMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    pub score: f32,
    pub frame_start: usize,
    pub frame_end: usize,
    pub metrics: SegmentMetrics,
}

/// Informational alignment figures, not part of any score.
///
/// `normalized_score` is the overall score over 100; `articulation_score`
/// decays the mean path distance with the articulation scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentDiagnostics {
    pub dtw_distance: f32,
    pub avg_diff: f32,
    pub path_length: usize,
    pub reference_frames: usize,
    pub user_frames: usize,
    pub duration_ratio: f32,
    pub energy_ratio: f32,
    pub normalized_score: f32,
    pub articulation_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEvaluationResult {
    pub character_scores: Vec<CharacterScore>,
    pub mfcc_score: f32,
    pub energy_score: f32,
    pub pitch_score: f32,
    pub composite_score: f32,
    pub overall_score: f32,
    pub diagnostics: AlignmentDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceEvaluationResult {
    pub word_scores: Vec<WordScore>,
    pub pronunciation_score: f32,
    pub fluency_score: f32,
    pub word_total_score: f32,
    pub overall_score: f32,
    pub diagnostics: AlignmentDiagnostics,
}

/// Engine output, tagged with the mode it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "UPPERCASE")]
pub enum EvaluationResult {
    Word(WordEvaluationResult),
    Sentence(SentenceEvaluationResult),
}

impl EvaluationResult {
    pub fn mode(&self) -> EvaluationMode {
        match self {
            EvaluationResult::Word(_) => EvaluationMode::Word,
            EvaluationResult::Sentence(_) => EvaluationMode::Sentence,
        }
    }

    pub fn overall_score(&self) -> f32 {
        match self {
            EvaluationResult::Word(word) => word.overall_score,
            EvaluationResult::Sentence(sentence) => sentence.overall_score,
        }
    }

    pub fn diagnostics(&self) -> &AlignmentDiagnostics {
        match self {
            EvaluationResult::Word(word) => &word.diagnostics,
            EvaluationResult::Sentence(sentence) => &sentence.diagnostics,
        }
    }

    pub fn as_word(&self) -> Option<&WordEvaluationResult> {
        match self {
            EvaluationResult::Word(word) => Some(word),
            EvaluationResult::Sentence(_) => None,
        }
    }

    pub fn as_sentence(&self) -> Option<&SentenceEvaluationResult> {
        match self {
            EvaluationResult::Sentence(sentence) => Some(sentence),
            EvaluationResult::Word(_) => None,
        }
    }

    /// Every emitted score, segment scores first.
    pub fn scores(&self) -> Vec<f32> {
        match self {
            EvaluationResult::Word(word) => word
                .character_scores
                .iter()
                .map(|c| c.score)
                .chain([
                    word.mfcc_score,
                    word.energy_score,
                    word.pitch_score,
                    word.composite_score,
                    word.overall_score,
                ])
                .collect(),
            EvaluationResult::Sentence(sentence) => sentence
                .word_scores
                .iter()
                .map(|w| w.score)
                .chain([
                    sentence.pronunciation_score,
                    sentence.fluency_score,
                    sentence.word_total_score,
                    sentence.overall_score,
                ])
                .collect(),
        }
    }
}

/// Speech recognition outcome produced outside the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub text: String,
    pub language: Option<String>,
    /// Estimated recognition confidence in [0, 1].
    pub confidence: Option<f32>,
}

/// Transport payload: an engine result plus an optional transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub transcript: Option<TranscriptResult>,
}

impl EvaluationResponse {
    pub fn with_transcript(mut self, transcript: Option<TranscriptResult>) -> Self {
        self.transcript = transcript;
        self
    }
}

impl From<EvaluationResult> for EvaluationResponse {
    fn from(result: EvaluationResult) -> Self {
        Self {
            result,
            transcript: None,
        }
    }
}
