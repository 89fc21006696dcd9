//! Best-effort speech recognition attached to evaluation responses.
//!
//! Recognition never influences scores. A missing model or a failed decode
//! degrades to an absent transcript instead of failing the evaluation.

use anyhow::Result;
use tracing::warn;

use crate::config::AppConfig;
use crate::pronunciation::{PcmTrack, TranscriptResult};

#[cfg(feature = "whisper")]
mod whisper;

#[cfg(feature = "whisper")]
pub use whisper::WhisperRecognizer;

/// Sample rate the recognizer models expect.
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16_000;

pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(&self, track: &PcmTrack) -> Result<Option<TranscriptResult>>;
}

/// Recognizer used when transcription is switched off or unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRecognizer;

impl SpeechRecognizer for DisabledRecognizer {
    fn transcribe(&self, _track: &PcmTrack) -> Result<Option<TranscriptResult>> {
        Ok(None)
    }
}

/// Picks the recognizer the configuration allows, falling back to
/// [`DisabledRecognizer`] when the model cannot be loaded.
pub fn recognizer_from_config(config: &AppConfig) -> Box<dyn SpeechRecognizer> {
    if config.whisper_disabled {
        return Box::new(DisabledRecognizer);
    }

    #[cfg(feature = "whisper")]
    {
        if let Some(model) = &config.whisper_model {
            match WhisperRecognizer::load(model, config.language.clone()) {
                Ok(recognizer) => return Box::new(recognizer),
                Err(err) => warn!(error = %err, "speech recognizer unavailable"),
            }
        } else {
            warn!("no whisper model configured; transcription disabled");
        }
    }

    #[cfg(not(feature = "whisper"))]
    warn!("built without the `whisper` feature; transcription disabled");

    Box::new(DisabledRecognizer)
}

/// Log probability assumed for a segment that carries no tokens.
pub const EMPTY_SEGMENT_LOG_PROB: f32 = -9.0;

/// Collapses per-segment average log probabilities into one confidence:
/// the exponential of their mean, clamped to `[0, 1]`.
pub fn confidence_from_log_probs(segment_log_probs: &[f32]) -> Option<f32> {
    if segment_log_probs.is_empty() {
        return None;
    }
    let mean = segment_log_probs.iter().sum::<f32>() / segment_log_probs.len() as f32;
    let confidence = mean.exp();
    confidence.is_finite().then(|| confidence.clamp(0.0, 1.0))
}

/// Runs `recognizer`, logging and swallowing any failure.
pub fn transcribe_best_effort(
    recognizer: &dyn SpeechRecognizer,
    track: &PcmTrack,
) -> Option<TranscriptResult> {
    match recognizer.transcribe(track) {
        Ok(transcript) => transcript,
        Err(err) => {
            warn!(error = %err, "transcription failed; continuing without transcript");
            None
        }
    }
}
