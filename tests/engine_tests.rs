//! Scenario and property tests for the adaptive practice rules.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use mathtutor_backend_rust::engine::{bands, level, mastery, verdict};

proptest! {
    #[test]
    fn division_identity_holds_for_every_level(lvl in 1i32..=10, seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let band = bands::band_for_level(lvl);
        let p = bands::draw_params(lvl, &mut rng);

        prop_assert_eq!(p.dividend, p.divisor * p.quotient + p.remainder);
        prop_assert!(p.remainder >= 0 && p.remainder < p.divisor);
        prop_assert!(p.divisor >= band.divisor_min && p.divisor <= band.divisor_max);
        prop_assert!(p.quotient >= band.quotient_min && p.quotient <= band.quotient_max);
        if !band.allow_remainder {
            prop_assert_eq!(p.remainder, 0);
        }
    }

    #[test]
    fn mastery_percentage_matches_rounded_ratio(correct in 0i64..=500, extra in 0i64..=500) {
        let attempted = correct + extra;
        prop_assume!(attempted > 0);
        let expected = (correct as f64 / attempted as f64 * 100.0 * 100.0).round() / 100.0;
        prop_assert_eq!(mastery::mastery_percentage(correct, attempted), expected);
    }
}

#[test]
fn mastery_review_flag_tracks_the_threshold() {
    // 3/5 = 60% is not weak; one more miss drops to 50% and flags review;
    // two wins lift it back to 62.5% and clear the flag.
    let (a, c, pct, review) = mastery::apply_attempt(4, 3, false);
    assert_eq!((a, c), (5, 3));
    assert_eq!(pct, 60.0);
    assert!(!review);

    let (a, c, pct, review) = mastery::apply_attempt(5, 3, false);
    assert_eq!((a, c), (6, 3));
    assert_eq!(pct, 50.0);
    assert!(review);

    let (a, c, pct, review) = mastery::apply_attempt(6, 3, true);
    assert_eq!((a, c), (7, 4));
    assert_eq!(pct, 57.14);
    assert!(review);

    let (a, c, pct, review) = mastery::apply_attempt(7, 4, true);
    assert_eq!((a, c), (8, 5));
    assert_eq!(pct, 62.5);
    assert!(!review);
}

#[test]
fn level_changes_by_exactly_one_and_clamps() {
    for lvl in 1..=10 {
        let promoted = level::next_level(lvl, Some(90.0), 5, 50);
        assert!(promoted == (lvl + 1).min(10));

        let demoted = level::next_level(lvl, Some(20.0), 0, 50);
        assert!(demoted == (lvl - 1).max(1));

        let held = level::next_level(lvl, Some(60.0), 5, 50);
        assert_eq!(held, lvl);
    }
}

#[test]
fn offer_video_keeps_reoffering_until_correct() {
    for attempts in 1..3 {
        assert!(!verdict::offer_video(attempts, false));
    }
    for attempts in 3..8 {
        assert!(verdict::offer_video(attempts, false));
    }
    // The instant a correct answer lands, the offer disappears.
    assert!(!verdict::offer_video(8, true));
}

#[test]
fn fifty_syntheses_stay_unique_in_a_wide_band() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut seen: HashSet<String> = HashSet::new();
    for _ in 0..50 {
        let p = bands::draw_unique(10, &mut rng, |sig| seen.contains(sig));
        let sig = bands::signature(p.dividend, p.divisor);
        assert!(seen.insert(sig), "level-10 band repeated a signature");
    }
}

#[test]
fn narrow_band_degrades_to_accepting_a_duplicate() {
    // Band 1 has 4 × 9 = 36 distinct pairs, fewer than the retry budget, so
    // an exhausted history must still produce a question.
    let mut rng = StdRng::seed_from_u64(1);
    let mut seen: HashSet<String> = HashSet::new();
    let mut accepted_duplicate = false;
    for _ in 0..60 {
        let p = bands::draw_unique(1, &mut rng, |sig| seen.contains(sig));
        let sig = bands::signature(p.dividend, p.divisor);
        if !seen.insert(sig) {
            accepted_duplicate = true;
        }
    }
    assert!(accepted_duplicate);
}

#[test]
fn answer_comparison_is_exact_string_after_trim() {
    assert!(verdict::is_exact_match("8 ", 8));
    assert!(!verdict::is_exact_match("08", 8));
}

/// Five correct answers from a fresh user on a level 1-2 topic. The
/// promotion must fire on the first qualifying submission (the 3rd), not at
/// the end of the batch.
#[test]
fn five_correct_answers_promote_at_the_third() {
    struct Topic {
        level_min: i32,
        level_max: i32,
    }
    let topic = Topic {
        level_min: 1,
        level_max: 2,
    };

    let mut lvl = 1;
    let mut total_attempted = 0i64;
    let mut total_correct = 0i64;
    let mut streak = 0i64;
    let mut best_streak = 0i64;
    let mut topic_attempted = 0i64;
    let mut topic_correct = 0i64;
    let mut first_promotion_at = None;

    for submission in 1..=5 {
        let (a, c, pct, _) = mastery::apply_attempt(topic_attempted, topic_correct, true);
        topic_attempted = a;
        topic_correct = c;

        total_attempted += 1;
        total_correct += 1;
        streak += 1;
        best_streak = best_streak.max(streak);

        // Topics without attempts are excluded; with one topic in range the
        // average is its own percentage, and out-of-range topics leave the
        // level unchanged.
        let avg = (lvl >= topic.level_min && lvl <= topic.level_max).then_some(pct);
        let next = level::next_level(lvl, avg, streak, total_attempted);
        if next != lvl && first_promotion_at.is_none() {
            first_promotion_at = Some(submission);
        }
        lvl = next;
    }

    assert_eq!(first_promotion_at, Some(3));
    assert_eq!(total_attempted, 5);
    assert_eq!(total_correct, 5);
    assert_eq!(streak, 5);
    assert_eq!(best_streak, 5);
    // Promoted 1 -> 2 on the 3rd answer and 2 -> 3 on the 4th; at level 3 the
    // topic is out of range so the 5th answer holds the level.
    assert_eq!(lvl, 3);
}

/// The 56 ÷ 8 ladder: three wrong submissions escalate retry -> hint ->
/// reveal, with the video offered exactly from the third attempt on.
#[test]
fn three_wrong_attempts_escalate_and_reveal() {
    let correct_answer = 56 / 8;
    let submissions = ["9", "6", "10"];
    let mut attempts = 0i64;

    let expected_offers = [false, false, true];
    let expected_stages = [
        verdict::FeedbackStage::Retry,
        verdict::FeedbackStage::Hint,
        verdict::FeedbackStage::Reveal,
    ];

    for (i, submission) in submissions.iter().enumerate() {
        let is_correct = verdict::is_exact_match(submission, correct_answer);
        assert!(!is_correct);
        attempts += 1;

        assert_eq!(verdict::offer_video(attempts, is_correct), expected_offers[i]);
        assert_eq!(verdict::feedback_stage(attempts, is_correct), expected_stages[i]);
    }

    // The third response reveals the correct answer; a correct follow-up
    // clears the offer.
    assert_eq!(correct_answer, 7);
    assert!(verdict::is_exact_match("7", correct_answer));
    assert!(!verdict::offer_video(attempts + 1, true));
}
