pub mod alignment;
pub mod engine;
pub mod features;
pub mod metrics;
pub mod prosody;
pub mod result;

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use alignment::{AlignmentPath, AudioAligner, Segment, SegmentDistances};
pub use engine::AudioEvaluator;
pub use features::{FeatureConfig, FeatureExtractor};
pub use metrics::{MetricCalculator, ScoringConfig, SentenceWeights, WordWeights};
pub use prosody::{PauseConfig, PauseEstimator, PitchConfig, PitchEstimator};
pub use result::{
    AlignmentDiagnostics, CharacterScore, EvaluationResponse, EvaluationResult, SegmentMetrics,
    SentenceEvaluationResult, TranscriptResult, WordEvaluationResult, WordScore,
};

/// Convenient alias for results returned by pronunciation modules.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Failures surfaced by the scoring engine. All of them are caller misuse
/// detectable at the boundary; numeric guards inside the pipeline never error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("{track} audio is empty and cannot be evaluated")]
    EmptyAudio { track: &'static str },
    #[error("sample rate must be positive, got {0}")]
    InvalidSampleRate(u32),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown evaluation mode \"{0}\", expected WORD or SENTENCE")]
    InvalidMode(String),
    #[error("feature extraction failed: {0}")]
    Feature(String),
}

impl EvaluationError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Decoded mono PCM audio ready for scoring.
#[derive(Debug, Clone, Default)]
pub struct PcmTrack {
    /// Samples normalised to [-1.0, 1.0].
    pub samples: Arc<[f32]>,
    pub sample_rate: u32,
    pub duration: Duration,
    pub rms: f32,
}

impl PcmTrack {
    /// Builds a track, deriving duration and RMS energy from the samples.
    pub fn from_samples(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        let samples = samples.into();
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(samples.len() as f64 / sample_rate as f64)
        };
        let rms = root_mean_square(&samples);
        Self {
            samples,
            sample_rate,
            duration,
            rms,
        }
    }

    /// Builds a track from values already computed by an upstream loader.
    pub fn from_parts(
        samples: impl Into<Arc<[f32]>>,
        sample_rate: u32,
        duration: Duration,
        rms: f32,
    ) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
            duration,
            rms,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Root-mean-square amplitude; zero for an empty slice.
pub fn root_mean_square(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}

/// Normalised spectral features, one row per analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    frames: Array2<f32>,
}

impl FeatureMatrix {
    /// Wraps a `(frame_count, coefficient_count)` array.
    pub fn from_frames(frames: Array2<f32>) -> Self {
        Self { frames }
    }

    pub fn empty(coefficients: usize) -> Self {
        Self {
            frames: Array2::zeros((0, coefficients)),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.nrows()
    }

    pub fn coefficient_count(&self) -> usize {
        self.frames.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Coefficient vector of a single frame.
    pub fn frame(&self, index: usize) -> ArrayView1<'_, f32> {
        self.frames.row(index)
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.frames
    }
}

/// Granularity of the evaluation: per character or per word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvaluationMode {
    Word,
    Sentence,
}

impl Display for EvaluationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationMode::Word => write!(f, "WORD"),
            EvaluationMode::Sentence => write!(f, "SENTENCE"),
        }
    }
}

impl FromStr for EvaluationMode {
    type Err = EvaluationError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "WORD" => Ok(EvaluationMode::Word),
            "SENTENCE" => Ok(EvaluationMode::Sentence),
            _ => Err(EvaluationError::InvalidMode(raw.to_string())),
        }
    }
}
