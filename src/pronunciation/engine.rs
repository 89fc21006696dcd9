use tracing::{debug, info, warn};

use super::alignment::{aggregate_distances, build_segments, AudioAligner};
use super::features::{FeatureConfig, FeatureExtractor};
use super::metrics::{MetricCalculator, ScoringConfig, SentenceSignals, WordSignals};
use super::prosody::{
    duration_ratio, energy_ratio, PauseEstimator, PitchConfig, PitchEstimator,
    PyinPitchEstimator, SilenceRatioEstimator,
};
use super::{
    AlignmentDiagnostics, EvaluationError, EvaluationMode, EvaluationResult, PcmTrack, Result,
};

/// Compares a learner's recording against a reference recording of the same text.
///
/// The evaluator holds only configuration, so a single instance can serve
/// concurrent calls from many threads.
pub struct AudioEvaluator {
    extractor: FeatureExtractor,
    aligner: AudioAligner,
    metrics: MetricCalculator,
    pitch: PitchSource,
    pause: Box<dyn PauseEstimator>,
}

/// The built-in tracker follows the feature frame size; a caller-supplied
/// estimator is left alone.
enum PitchSource {
    Pyin(PyinPitchEstimator),
    Custom(Box<dyn PitchEstimator>),
}

impl PitchSource {
    fn estimator(&self) -> &dyn PitchEstimator {
        match self {
            PitchSource::Pyin(pyin) => pyin,
            PitchSource::Custom(custom) => custom.as_ref(),
        }
    }
}

impl Default for AudioEvaluator {
    fn default() -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            aligner: AudioAligner::new(),
            metrics: MetricCalculator::new(),
            pitch: PitchSource::Pyin(PyinPitchEstimator::new()),
            pause: Box::new(SilenceRatioEstimator::new()),
        }
    }
}

impl AudioEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconfigures feature extraction. The built-in pitch tracker adopts
    /// `n_fft` as its frame length.
    pub fn with_features(mut self, config: FeatureConfig) -> Result<Self> {
        self.extractor = FeatureExtractor::with_config(config)?;
        if let PitchSource::Pyin(pyin) = &self.pitch {
            let pitch = PitchConfig {
                frame_length: config.n_fft,
                ..*pyin.config()
            };
            self.pitch = PitchSource::Pyin(PyinPitchEstimator::with_config(pitch)?);
        }
        Ok(self)
    }

    pub fn with_scoring(mut self, config: ScoringConfig) -> Result<Self> {
        self.metrics = MetricCalculator::with_config(config)?;
        Ok(self)
    }

    pub fn with_pitch_estimator(mut self, estimator: impl PitchEstimator + 'static) -> Self {
        self.pitch = PitchSource::Custom(Box::new(estimator));
        self
    }

    pub fn with_pause_estimator(mut self, estimator: impl PauseEstimator + 'static) -> Self {
        self.pause = Box::new(estimator);
        self
    }

    pub fn scoring(&self) -> &ScoringConfig {
        self.metrics.config()
    }

    /// Configuration of the built-in pitch tracker, `None` once replaced.
    pub fn pitch_config(&self) -> Option<&PitchConfig> {
        match &self.pitch {
            PitchSource::Pyin(pyin) => Some(pyin.config()),
            PitchSource::Custom(_) => None,
        }
    }

    /// Scores `user` against `reference` for the given text.
    ///
    /// Only empty tracks are rejected; any text, including an empty one,
    /// produces a result.
    pub fn evaluate(
        &self,
        text: &str,
        reference: &PcmTrack,
        user: &PcmTrack,
        mode: EvaluationMode,
    ) -> Result<EvaluationResult> {
        ensure_track(reference, "reference")?;
        ensure_track(user, "user")?;

        let reference_features = self.extractor.extract(reference)?;
        let user_features = self.extractor.extract(user)?;
        let path = self.aligner.align(&reference_features, &user_features);
        let segments = build_segments(text, mode, reference_features.frame_count());
        let distances = aggregate_distances(&path, &reference_features, &user_features, &segments);
        debug!(
            %mode,
            segments = segments.len(),
            avg_diff = distances.avg_diff,
            "aggregated segment distances"
        );

        let cap = self.metrics.config().word.energy_ratio_cap;
        let diagnostics = AlignmentDiagnostics {
            dtw_distance: distances.dtw_distance,
            avg_diff: distances.avg_diff,
            path_length: path.len(),
            reference_frames: reference_features.frame_count(),
            user_frames: user_features.frame_count(),
            duration_ratio: duration_ratio(reference, user),
            energy_ratio: energy_ratio(reference, user, cap),
            ..AlignmentDiagnostics::default()
        };

        let result = match mode {
            EvaluationMode::Word => {
                let pitch = self.pitch.estimator();
                let reference_pitch = pitch.estimate_pitch(reference);
                let user_pitch = pitch.estimate_pitch(user);
                if reference_pitch.is_none() || user_pitch.is_none() {
                    warn!(
                        reference_voiced = reference_pitch.is_some(),
                        user_voiced = user_pitch.is_some(),
                        "pitch undefined; using neutral pitch score"
                    );
                }
                EvaluationResult::Word(self.metrics.score_word(
                    WordSignals {
                        segments: &segments,
                        distances: &distances,
                        energy_ratio: diagnostics.energy_ratio,
                        reference_pitch,
                        user_pitch,
                    },
                    diagnostics,
                ))
            }
            EvaluationMode::Sentence => {
                let reference_pause_ratio = self.pause.pause_ratio(reference);
                let user_pause_ratio = self.pause.pause_ratio(user);
                debug!(reference_pause_ratio, user_pause_ratio, "estimated pause ratios");
                EvaluationResult::Sentence(self.metrics.score_sentence(
                    SentenceSignals {
                        segments: &segments,
                        distances: &distances,
                        reference_pause_ratio,
                        user_pause_ratio,
                        duration_ratio: diagnostics.duration_ratio,
                    },
                    diagnostics,
                ))
            }
        };

        info!(
            %mode,
            overall_score = result.overall_score(),
            path_length = diagnostics.path_length,
            "evaluation complete"
        );
        Ok(result)
    }
}

fn ensure_track(track: &PcmTrack, name: &'static str) -> Result<()> {
    if track.sample_rate == 0 {
        return Err(EvaluationError::InvalidSampleRate(0));
    }
    if track.is_empty() {
        return Err(EvaluationError::EmptyAudio { track: name });
    }
    Ok(())
}
