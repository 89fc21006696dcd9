use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{
    confidence_from_log_probs, SpeechRecognizer, EMPTY_SEGMENT_LOG_PROB, RECOGNIZER_SAMPLE_RATE,
};
use crate::audio::resample::resample_linear;
use crate::pronunciation::{PcmTrack, TranscriptResult};

/// Whisper.cpp recognizer. The context is loaded once and shared; each call
/// creates its own decoding state.
pub struct WhisperRecognizer {
    context: WhisperContext,
    language: Option<String>,
}

impl WhisperRecognizer {
    pub fn load(model_path: &Path, language: Option<String>) -> Result<Self> {
        let model = model_path
            .to_str()
            .with_context(|| format!("model path {} is not valid UTF-8", model_path.display()))?;
        let context = WhisperContext::new_with_params(model, WhisperContextParameters::default())
            .with_context(|| format!("failed to load whisper model {model}"))?;
        Ok(Self { context, language })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(&self, track: &PcmTrack) -> Result<Option<TranscriptResult>> {
        let samples = resample_linear(&track.samples, track.sample_rate, RECOGNIZER_SAMPLE_RATE)?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(self.language.as_deref().unwrap_or("auto")));
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .context
            .create_state()
            .context("failed to create whisper state")?;
        state
            .full(params, &samples)
            .context("whisper decoding failed")?;

        let mut text = String::new();
        let mut segment_log_probs = Vec::new();
        for segment in state.as_iter() {
            let piece = segment.to_str().context("failed to read segment text")?;
            text.push_str(piece);

            let log_probs: Vec<f32> = (0..segment.n_tokens())
                .filter_map(|t| segment.get_token(t))
                .map(|token| token.token_data().plog)
                .collect();
            segment_log_probs.push(if log_probs.is_empty() {
                EMPTY_SEGMENT_LOG_PROB
            } else {
                log_probs.iter().sum::<f32>() / log_probs.len() as f32
            });
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            debug!("recognizer produced no text");
            return Ok(None);
        }

        let language = match &self.language {
            Some(language) => Some(language.clone()),
            None => whisper_rs::get_lang_str(state.full_lang_id_from_state()).map(str::to_string),
        };
        let confidence = confidence_from_log_probs(&segment_log_probs);
        debug!(
            chars = text.len(),
            segments = segment_log_probs.len(),
            language = language.as_deref().unwrap_or("unknown"),
            confidence = confidence.unwrap_or(0.0),
            "transcribed user audio"
        );

        Ok(Some(TranscriptResult {
            text,
            language,
            confidence,
        }))
    }
}
