//! Pronunciation scoring: compares a learner's recording with a reference
//! recording of the same text and reports per-character or per-word scores.

pub mod audio;
pub mod config;
pub mod pronunciation;
pub mod transcription;

pub use pronunciation::{
    AudioEvaluator, EvaluationError, EvaluationMode, EvaluationResponse, EvaluationResult,
    PcmTrack,
};
