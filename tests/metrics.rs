mod common;

use approx::assert_relative_eq;
use common::{syllables, track};
use spoken_evaluate::pronunciation::metrics::{exponential_score, MetricCalculator};
use spoken_evaluate::pronunciation::{AudioEvaluator, EvaluationMode, ScoringConfig};

#[test]
fn exponential_score_decreases_with_distance() {
    let mut previous = exponential_score(0.0, 1.0);
    for step in 1..50 {
        let score = exponential_score(step as f32 * 0.1, 1.0);
        assert!(score < previous);
        previous = score;
    }
}

#[test]
fn sharper_segment_scale_lowers_segment_scores() {
    let reference = track(syllables(&[(180.0, 0.2), (260.0, 0.2)], 0.5));
    let user = track(syllables(&[(300.0, 0.2), (150.0, 0.2)], 0.5));

    let lenient = AudioEvaluator::new()
        .evaluate("ab", &reference, &user, EvaluationMode::Word)
        .unwrap();
    let strict = AudioEvaluator::new()
        .with_scoring(ScoringConfig {
            segment_scale: 0.25,
            ..ScoringConfig::default()
        })
        .unwrap()
        .evaluate("ab", &reference, &user, EvaluationMode::Word)
        .unwrap();

    let lenient = lenient.as_word().unwrap();
    let strict = strict.as_word().unwrap();
    for (l, s) in lenient.character_scores.iter().zip(&strict.character_scores) {
        assert!(s.score <= l.score);
        assert_eq!(l.metrics, s.metrics);
    }
    // Composite is independent of the segment scale.
    assert_eq!(lenient.composite_score, strict.composite_score);
}

#[test]
fn invalid_scoring_is_rejected_up_front() {
    let mut config = ScoringConfig::default();
    config.word.pitch_weight = -1.0;
    assert!(AudioEvaluator::new().with_scoring(config).is_err());
    assert!(MetricCalculator::with_config(config).is_err());
}

#[test]
fn sentence_overall_respects_custom_weights() {
    let metrics = MetricCalculator::with_config(ScoringConfig {
        sentence: spoken_evaluate::pronunciation::SentenceWeights {
            pronunciation_weight: 0.5,
            fluency_weight: 0.5,
            ..Default::default()
        },
        ..ScoringConfig::default()
    })
    .unwrap();
    assert_relative_eq!(metrics.sentence_overall(80.0, 40.0), 60.0, epsilon = 1e-4);
}
