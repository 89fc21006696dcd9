mod common;

use std::sync::Arc;
use std::thread;

use approx::assert_relative_eq;
use common::{noise, sine, syllables, track};
use spoken_evaluate::pronunciation::metrics::exponential_score;
use spoken_evaluate::pronunciation::{
    AudioEvaluator, EvaluationError, EvaluationMode, EvaluationResult, PcmTrack,
};

fn cat() -> PcmTrack {
    track(syllables(&[(180.0, 0.2), (260.0, 0.2), (200.0, 0.2)], 0.5))
}

fn assert_bounded(result: &EvaluationResult) {
    for score in result.scores() {
        assert!(
            (0.0..=100.0).contains(&score),
            "score {score} escaped [0, 100]"
        );
    }
}

#[test]
fn identical_word_recordings_score_near_perfect() {
    let reference = cat();
    let result = AudioEvaluator::new()
        .evaluate("cat", &reference, &reference, EvaluationMode::Word)
        .expect("evaluation succeeds");
    let word = result.as_word().expect("word result");

    let symbols: Vec<&str> = word
        .character_scores
        .iter()
        .map(|c| c.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["c", "a", "t"]);
    for character in &word.character_scores {
        assert!(character.score > 95.0, "{} scored {}", character.symbol, character.score);
    }
    assert!(word.mfcc_score > 95.0);
    assert_eq!(word.energy_score, 100.0);
    assert_eq!(word.pitch_score, 100.0);
    assert!(word.composite_score > 99.0);
    assert!(word.overall_score > 95.0);
    assert_relative_eq!(word.diagnostics.energy_ratio, 1.0);
    assert_relative_eq!(word.diagnostics.duration_ratio, 1.0);
    assert_bounded(&result);
}

#[test]
fn one_second_identical_tone_scores_cat_perfectly() {
    let tone = track(sine(220.0, 1.0, 0.5));
    assert_eq!(tone.len(), 16_000);

    let result = AudioEvaluator::new()
        .evaluate("cat", &tone, &tone, EvaluationMode::Word)
        .expect("evaluation succeeds");
    let word = result.as_word().expect("word result");

    assert_eq!(word.character_scores.len(), 3);
    for character in &word.character_scores {
        assert_relative_eq!(character.score, 100.0, epsilon = 0.5);
    }
    assert_relative_eq!(word.diagnostics.avg_diff, 0.0, epsilon = 1e-2);
    assert_relative_eq!(word.mfcc_score, 100.0, epsilon = 0.5);
    assert_eq!(word.energy_score, 100.0);
    assert_eq!(word.pitch_score, 100.0);
    assert_relative_eq!(word.composite_score, 100.0, epsilon = 0.5);
    assert_relative_eq!(word.overall_score, 100.0, epsilon = 0.5);
    assert_relative_eq!(word.diagnostics.normalized_score, 1.0, epsilon = 5e-3);
    assert_relative_eq!(word.diagnostics.articulation_score, 100.0, epsilon = 0.5);
}

#[test]
fn identical_sentence_recordings_keep_full_pronunciation() {
    let tone = track(sine(220.0, 1.0, 0.5));
    let result = AudioEvaluator::new()
        .evaluate("the quick fox", &tone, &tone, EvaluationMode::Sentence)
        .expect("evaluation succeeds");
    let sentence = result.as_sentence().expect("sentence result");

    assert_relative_eq!(sentence.diagnostics.avg_diff, 0.0, epsilon = 1e-2);
    assert_relative_eq!(sentence.pronunciation_score, 100.0, epsilon = 0.5);
    assert_eq!(sentence.fluency_score, 100.0);
    assert_relative_eq!(sentence.overall_score, 100.0, epsilon = 0.5);
    assert_relative_eq!(
        sentence.diagnostics.normalized_score,
        sentence.overall_score / 100.0,
        epsilon = 1e-6
    );
}

#[test]
fn slow_sentence_keeps_pronunciation_but_loses_fluency() {
    let reference = track(syllables(&[(170.0, 0.25), (240.0, 0.25), (300.0, 0.25)], 0.5));
    let user = track(syllables(&[(170.0, 0.5), (240.0, 0.5), (300.0, 0.5)], 0.5));

    let result = AudioEvaluator::new()
        .evaluate("the quick fox", &reference, &user, EvaluationMode::Sentence)
        .expect("evaluation succeeds");
    let sentence = result.as_sentence().expect("sentence result");

    let words: Vec<&str> = sentence.word_scores.iter().map(|w| w.word.as_str()).collect();
    assert_eq!(words, vec!["the", "quick", "fox"]);
    assert_relative_eq!(sentence.diagnostics.duration_ratio, 2.0, epsilon = 1e-3);
    // No pauses in either track, so only the tempo penalty remains: |1 - 2| * 5.
    assert_relative_eq!(
        sentence.fluency_score,
        exponential_score(5.0, 2.5),
        epsilon = 1e-2
    );
    assert!(sentence.fluency_score < 50.0);
    assert!(
        sentence.pronunciation_score > 70.0,
        "pronunciation {}",
        sentence.pronunciation_score
    );
    assert!(sentence.pronunciation_score > sentence.fluency_score);
    assert_bounded(&result);
}

#[test]
fn evaluation_is_deterministic() {
    let reference = cat();
    let user = track(noise(0.5, 0.3, 7));
    let evaluator = AudioEvaluator::new();
    for mode in [EvaluationMode::Word, EvaluationMode::Sentence] {
        let first = evaluator.evaluate("cat", &reference, &user, mode).unwrap();
        let second = evaluator.evaluate("cat", &reference, &user, mode).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn scores_stay_bounded_for_mismatched_audio() {
    let evaluator = AudioEvaluator::new();
    let reference = cat();
    let cases = [
        track(noise(0.3, 0.9, 1)),
        track(noise(1.2, 0.001, 2)),
        track(vec![0.0; 4_000]),
        track(syllables(&[(400.0, 0.05)], 1.0)),
    ];
    for user in &cases {
        for mode in [EvaluationMode::Word, EvaluationMode::Sentence] {
            let result = evaluator
                .evaluate("hello world", &reference, user, mode)
                .unwrap();
            assert_bounded(&result);
        }
    }
}

#[test]
fn segments_cover_reference_frames() {
    let reference = cat();
    let user = track(noise(0.4, 0.2, 3));
    let result = AudioEvaluator::new()
        .evaluate("hello", &reference, &user, EvaluationMode::Word)
        .unwrap();
    let word = result.as_word().unwrap();
    assert_eq!(word.character_scores.len(), 5);
    assert_eq!(word.character_scores[0].frame_start, 0);
    assert_eq!(
        word.character_scores.last().unwrap().frame_end,
        word.diagnostics.reference_frames
    );
    for pair in word.character_scores.windows(2) {
        assert_eq!(pair[0].frame_end, pair[1].frame_start);
    }
}

#[test]
fn blank_text_yields_single_placeholder_segment() {
    let reference = cat();
    let evaluator = AudioEvaluator::new();

    let word = evaluator
        .evaluate("", &reference, &reference, EvaluationMode::Word)
        .unwrap();
    let characters = &word.as_word().unwrap().character_scores;
    assert_eq!(characters.len(), 1);
    assert_eq!(characters[0].symbol, "?");

    let sentence = evaluator
        .evaluate("   ", &reference, &reference, EvaluationMode::Sentence)
        .unwrap();
    let words = &sentence.as_sentence().unwrap().word_scores;
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word, "?");
    assert_eq!(words[0].frame_end, sentence.diagnostics().reference_frames);
}

#[test]
fn energy_ratio_is_capped() {
    let reference = track(syllables(&[(200.0, 0.3)], 0.01));
    let user = track(syllables(&[(200.0, 0.3)], 0.5));
    let result = AudioEvaluator::new()
        .evaluate("a", &reference, &user, EvaluationMode::Word)
        .unwrap();
    let word = result.as_word().unwrap();
    assert_eq!(word.diagnostics.energy_ratio, 10.0);
    assert_relative_eq!(
        word.energy_score,
        exponential_score(20.0, 2.0),
        epsilon = 1e-3
    );
}

#[test]
fn empty_audio_is_rejected() {
    let empty = PcmTrack::from_samples(Vec::new(), 16_000);
    let err = AudioEvaluator::new()
        .evaluate("cat", &cat(), &empty, EvaluationMode::Sentence)
        .unwrap_err();
    assert_eq!(err, EvaluationError::EmptyAudio { track: "user" });
}

#[test]
fn concurrent_calls_match_sequential_results() {
    let evaluator = Arc::new(AudioEvaluator::new());
    let reference = cat();
    let user = track(syllables(&[(190.0, 0.25), (250.0, 0.2), (210.0, 0.2)], 0.4));
    let expected = evaluator
        .evaluate("cat", &reference, &user, EvaluationMode::Word)
        .unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let evaluator = Arc::clone(&evaluator);
            let reference = reference.clone();
            let user = user.clone();
            thread::spawn(move || {
                evaluator
                    .evaluate("cat", &reference, &user, EvaluationMode::Word)
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
