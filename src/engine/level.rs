pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 10;

pub const PROMOTION_MASTERY: f64 = 80.0;
pub const PROMOTION_STREAK: i64 = 3;
pub const DEMOTION_MASTERY: f64 = 40.0;
pub const DEMOTION_MIN_ATTEMPTED: i64 = 5;

pub fn clamp_level(level: i32) -> i32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// The only place a level transition is decided. `avg_mastery` is the mean
/// mastery percentage over the user's attempted topics at the current level;
/// `None` when no topic at this level has any attempts, which leaves the
/// level unchanged. Promotion is checked before demotion.
pub fn next_level(
    current: i32,
    avg_mastery: Option<f64>,
    current_streak: i64,
    total_attempted: i64,
) -> i32 {
    let current = clamp_level(current);
    let Some(avg) = avg_mastery else {
        return current;
    };

    if avg >= PROMOTION_MASTERY && current_streak >= PROMOTION_STREAK {
        (current + 1).min(MAX_LEVEL)
    } else if avg < DEMOTION_MASTERY && total_attempted >= DEMOTION_MIN_ATTEMPTED {
        (current - 1).max(MIN_LEVEL)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotes_on_mastery_and_streak() {
        assert_eq!(next_level(4, Some(80.0), 3, 10), 5);
        assert_eq!(next_level(4, Some(95.5), 7, 10), 5);
    }

    #[test]
    fn test_promotion_needs_both_conditions() {
        assert_eq!(next_level(4, Some(85.0), 2, 10), 4);
        assert_eq!(next_level(4, Some(79.99), 5, 10), 4);
    }

    #[test]
    fn test_demotes_on_low_mastery_with_history() {
        assert_eq!(next_level(4, Some(39.99), 0, 5), 3);
        assert_eq!(next_level(4, Some(10.0), 0, 100), 3);
    }

    #[test]
    fn test_demotion_needs_enough_attempts() {
        assert_eq!(next_level(4, Some(10.0), 0, 4), 4);
    }

    #[test]
    fn test_middle_band_unchanged() {
        assert_eq!(next_level(4, Some(60.0), 10, 100), 4);
        assert_eq!(next_level(4, Some(40.0), 0, 100), 4);
    }

    #[test]
    fn test_no_mastery_rows_leaves_level() {
        assert_eq!(next_level(4, None, 10, 100), 4);
    }

    #[test]
    fn test_clamped_at_bounds() {
        assert_eq!(next_level(10, Some(100.0), 10, 10), 10);
        assert_eq!(next_level(1, Some(0.0), 0, 100), 1);
    }

    #[test]
    fn test_promotion_checked_before_demotion() {
        // Degenerate input satisfying neither threshold pair cleanly:
        // high mastery with long streak wins even with many attempts.
        assert_eq!(next_level(5, Some(80.0), 3, 1000), 6);
    }
}
