pub const NEEDS_REVIEW_BELOW: f64 = 60.0;

/// All-time accuracy ratio as a percentage, rounded to 2 decimal places.
pub fn mastery_percentage(questions_correct: i64, questions_attempted: i64) -> f64 {
    if questions_attempted <= 0 {
        return 0.0;
    }
    let raw = questions_correct as f64 / questions_attempted as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

pub fn needs_review(mastery_percentage: f64) -> bool {
    mastery_percentage < NEEDS_REVIEW_BELOW
}

/// Counter update for one validated answer: returns the new
/// (attempted, correct, percentage, needs_review) tuple.
pub fn apply_attempt(
    questions_attempted: i64,
    questions_correct: i64,
    is_correct: bool,
) -> (i64, i64, f64, bool) {
    let attempted = questions_attempted + 1;
    let correct = questions_correct + if is_correct { 1 } else { 0 };
    let percentage = mastery_percentage(correct, attempted);
    (attempted, correct, percentage, needs_review(percentage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        assert_eq!(mastery_percentage(1, 3), 33.33);
        assert_eq!(mastery_percentage(2, 3), 66.67);
        assert_eq!(mastery_percentage(1, 1), 100.0);
        assert_eq!(mastery_percentage(0, 4), 0.0);
    }

    #[test]
    fn test_zero_attempts_is_zero() {
        assert_eq!(mastery_percentage(0, 0), 0.0);
    }

    #[test]
    fn test_needs_review_boundary() {
        assert!(needs_review(59.99));
        assert!(!needs_review(60.0));
        assert!(!needs_review(100.0));
    }

    #[test]
    fn test_first_attempt_sets_extremes() {
        assert_eq!(apply_attempt(0, 0, true), (1, 1, 100.0, false));
        assert_eq!(apply_attempt(0, 0, false), (1, 0, 0.0, true));
    }

    #[test]
    fn test_review_flag_flips_across_threshold() {
        // 2/4 = 50% needs review; a 3rd and 4th correct push it to 66.67%.
        let (a, c, pct, review) = apply_attempt(3, 2, false);
        assert_eq!((a, c), (4, 2));
        assert_eq!(pct, 50.0);
        assert!(review);

        let (a, c, pct, review) = apply_attempt(5, 3, true);
        assert_eq!((a, c), (6, 4));
        assert_eq!(pct, 66.67);
        assert!(!review);
    }
}
