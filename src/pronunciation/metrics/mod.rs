mod weights;

pub use weights::{ScoringConfig, SentenceWeights, WordWeights};

use crate::pronunciation::alignment::{Segment, SegmentDistances};
use crate::pronunciation::{
    AlignmentDiagnostics, CharacterScore, Result, SegmentMetrics, SentenceEvaluationResult,
    WordEvaluationResult, WordScore,
};

const MIN_SCALE: f32 = 1e-6;

/// Maps a distance-like value onto (0, 100] with exponential decay.
/// Smaller values score higher; `scale` sets the sensitivity.
pub fn exponential_score(value: f32, scale: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    let score = 100.0 * (-value / scale.max(MIN_SCALE)).exp();
    score.clamp(0.0, 100.0)
}

/// Word-mode signals gathered by the engine.
#[derive(Debug, Clone, Copy)]
pub struct WordSignals<'a> {
    pub segments: &'a [Segment],
    pub distances: &'a SegmentDistances,
    pub energy_ratio: f32,
    pub reference_pitch: Option<f32>,
    pub user_pitch: Option<f32>,
}

/// Sentence-mode signals gathered by the engine.
#[derive(Debug, Clone, Copy)]
pub struct SentenceSignals<'a> {
    pub segments: &'a [Segment],
    pub distances: &'a SegmentDistances,
    pub reference_pause_ratio: f32,
    pub user_pause_ratio: f32,
    pub duration_ratio: f32,
}

/// Turns aggregated distances and prosodic ratios into bounded scores.
#[derive(Debug, Clone, Default)]
pub struct MetricCalculator {
    config: ScoringConfig,
}

impl MetricCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score of one segment; unvisited segments fall back to the global mean.
    pub fn segment_score(&self, distances: &SegmentDistances, index: usize) -> (f32, SegmentMetrics) {
        let (avg_diff, support) = match distances.segment_mean(index) {
            Some(mean) => (mean, distances.support(index)),
            None => (distances.avg_diff, 0),
        };
        let score = exponential_score(avg_diff, self.config.segment_scale);
        (score, SegmentMetrics { avg_diff, support })
    }

    pub fn mfcc_score(&self, avg_diff: f32) -> f32 {
        exponential_score(avg_diff, self.config.word.mfcc_scale)
    }

    /// Penalises deviation of the (already capped) energy ratio from 1.
    pub fn energy_score(&self, energy_ratio: f32) -> f32 {
        let word = &self.config.word;
        let clamped = energy_ratio.clamp(0.0, word.energy_penalty_clamp);
        let penalty = (1.0 - clamped).abs() * word.energy_penalty_factor;
        exponential_score(penalty, word.energy_scale)
    }

    pub fn pitch_score(&self, reference: Option<f32>, user: Option<f32>) -> f32 {
        let word = &self.config.word;
        match (reference, user) {
            (Some(reference), Some(user))
                if reference.is_finite() && user.is_finite() && reference > 0.0 =>
            {
                let diff_ratio = (reference - user).abs() / reference;
                exponential_score(diff_ratio * word.pitch_diff_factor, word.pitch_scale)
            }
            _ => word.neutral_pitch_score,
        }
    }

    pub fn composite_score(&self, mfcc: f32, energy: f32, pitch: f32) -> f32 {
        let word = &self.config.word;
        let blended = word.mfcc_weight * mfcc + word.energy_weight * energy + word.pitch_weight * pitch;
        blended.clamp(0.0, 100.0)
    }

    pub fn pronunciation_score(&self, avg_diff: f32) -> f32 {
        exponential_score(avg_diff, self.config.sentence.pronunciation_scale)
    }

    pub fn fluency_score(&self, reference_pause: f32, user_pause: f32, duration_ratio: f32) -> f32 {
        let sentence = &self.config.sentence;
        let pause_penalty = (reference_pause - user_pause).abs() * sentence.pause_penalty_factor;
        let tempo = duration_ratio.clamp(0.0, sentence.tempo_ratio_clamp);
        let tempo_penalty = (1.0 - tempo).abs() * sentence.tempo_penalty_factor;
        exponential_score(pause_penalty + tempo_penalty, sentence.fluency_scale)
    }

    pub fn sentence_overall(&self, pronunciation: f32, fluency: f32) -> f32 {
        let sentence = &self.config.sentence;
        let blended =
            sentence.pronunciation_weight * pronunciation + sentence.fluency_weight * fluency;
        blended.clamp(0.0, 100.0)
    }

    pub fn articulation_score(&self, avg_diff: f32) -> f32 {
        exponential_score(avg_diff, self.config.articulation_scale)
    }

    /// Fills the score-derived diagnostics once the overall score is known.
    fn finish_diagnostics(
        &self,
        diagnostics: AlignmentDiagnostics,
        overall_score: f32,
    ) -> AlignmentDiagnostics {
        AlignmentDiagnostics {
            normalized_score: overall_score / 100.0,
            articulation_score: self.articulation_score(diagnostics.avg_diff),
            ..diagnostics
        }
    }

    pub fn score_word(
        &self,
        signals: WordSignals<'_>,
        diagnostics: AlignmentDiagnostics,
    ) -> WordEvaluationResult {
        let character_scores: Vec<CharacterScore> = signals
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let (score, metrics) = self.segment_score(signals.distances, index);
                CharacterScore {
                    symbol: segment.label.clone(),
                    score,
                    frame_start: segment.start,
                    frame_end: segment.end,
                    metrics,
                }
            })
            .collect();

        let mfcc_score = self.mfcc_score(signals.distances.avg_diff);
        let energy_score = self.energy_score(signals.energy_ratio);
        let pitch_score = self.pitch_score(signals.reference_pitch, signals.user_pitch);
        let composite_score = self.composite_score(mfcc_score, energy_score, pitch_score);
        let overall_score =
            mean(character_scores.iter().map(|c| c.score)).unwrap_or(composite_score);

        WordEvaluationResult {
            character_scores,
            mfcc_score,
            energy_score,
            pitch_score,
            composite_score,
            overall_score,
            diagnostics: self.finish_diagnostics(diagnostics, overall_score),
        }
    }

    pub fn score_sentence(
        &self,
        signals: SentenceSignals<'_>,
        diagnostics: AlignmentDiagnostics,
    ) -> SentenceEvaluationResult {
        let word_scores: Vec<WordScore> = signals
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| {
                let (score, metrics) = self.segment_score(signals.distances, index);
                WordScore {
                    word: segment.label.clone(),
                    score,
                    frame_start: segment.start,
                    frame_end: segment.end,
                    metrics,
                }
            })
            .collect();

        let pronunciation_score = self.pronunciation_score(signals.distances.avg_diff);
        let fluency_score = self.fluency_score(
            signals.reference_pause_ratio,
            signals.user_pause_ratio,
            signals.duration_ratio,
        );
        let word_total_score =
            mean(word_scores.iter().map(|w| w.score)).unwrap_or(pronunciation_score);
        let overall_score = self.sentence_overall(pronunciation_score, fluency_score);

        SentenceEvaluationResult {
            word_scores,
            pronunciation_score,
            fluency_score,
            word_total_score,
            overall_score,
            diagnostics: self.finish_diagnostics(diagnostics, overall_score),
        }
    }
}

fn mean<I>(values: I) -> Option<f32>
where
    I: Iterator<Item = f32>,
{
    let (total, count) = values.fold((0.0_f64, 0_usize), |(total, count), value| {
        (total + value as f64, count + 1)
    });
    (count > 0).then(|| ((total / count as f64) as f32).clamp(0.0, 100.0))
}
