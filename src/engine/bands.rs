use rand::Rng;

/// Operand distribution for a pair of adjacent levels. Divisor and quotient
/// ranges widen with the band; remainders only appear from band 3 upward.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub level_min: i32,
    pub level_max: i32,
    pub divisor_min: i64,
    pub divisor_max: i64,
    pub quotient_min: i64,
    pub quotient_max: i64,
    pub allow_remainder: bool,
}

pub const BANDS: [Band; 5] = [
    Band {
        level_min: 1,
        level_max: 2,
        divisor_min: 2,
        divisor_max: 5,
        quotient_min: 1,
        quotient_max: 9,
        allow_remainder: false,
    },
    Band {
        level_min: 3,
        level_max: 4,
        divisor_min: 2,
        divisor_max: 9,
        quotient_min: 2,
        quotient_max: 12,
        allow_remainder: false,
    },
    Band {
        level_min: 5,
        level_max: 6,
        divisor_min: 3,
        divisor_max: 12,
        quotient_min: 5,
        quotient_max: 20,
        allow_remainder: true,
    },
    Band {
        level_min: 7,
        level_max: 8,
        divisor_min: 6,
        divisor_max: 25,
        quotient_min: 10,
        quotient_max: 50,
        allow_remainder: true,
    },
    Band {
        level_min: 9,
        level_max: 10,
        divisor_min: 12,
        divisor_max: 99,
        quotient_min: 20,
        quotient_max: 99,
        allow_remainder: true,
    },
];

/// Redraw budget when a freshly drawn pair collides with the user's history.
/// After the budget is spent the last draw is accepted even if it collides,
/// so a level whose operand space is smaller than the history never loops.
pub const MAX_DEDUP_RETRIES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivisionParams {
    pub dividend: i64,
    pub divisor: i64,
    pub quotient: i64,
    pub remainder: i64,
}

pub fn band_for_level(level: i32) -> &'static Band {
    let level = level.clamp(1, 10);
    BANDS
        .iter()
        .find(|b| level >= b.level_min && level <= b.level_max)
        .unwrap_or(&BANDS[0])
}

pub fn draw_params(level: i32, rng: &mut impl Rng) -> DivisionParams {
    let band = band_for_level(level);
    let divisor = rng.random_range(band.divisor_min..=band.divisor_max);
    let quotient = rng.random_range(band.quotient_min..=band.quotient_max);
    let remainder = if band.allow_remainder {
        rng.random_range(0..divisor)
    } else {
        0
    };

    DivisionParams {
        dividend: divisor * quotient + remainder,
        divisor,
        quotient,
        remainder,
    }
}

/// Canonical key for an operand pair, used to avoid re-serving the same
/// problem to the same user.
pub fn signature(dividend: i64, divisor: i64) -> String {
    format!("{dividend}÷{divisor}")
}

/// Draw a pair whose signature `is_taken` rejects, redrawing at most
/// [`MAX_DEDUP_RETRIES`] times before accepting a possible duplicate.
pub fn draw_unique(
    level: i32,
    rng: &mut impl Rng,
    mut is_taken: impl FnMut(&str) -> bool,
) -> DivisionParams {
    let mut params = draw_params(level, rng);
    for _ in 0..MAX_DEDUP_RETRIES {
        if !is_taken(&signature(params.dividend, params.divisor)) {
            return params;
        }
        params = draw_params(level, rng);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_bands_cover_all_levels() {
        for level in 1..=10 {
            let band = band_for_level(level);
            assert!(level >= band.level_min && level <= band.level_max);
        }
    }

    #[test]
    fn test_out_of_range_levels_clamp() {
        assert_eq!(band_for_level(0).level_min, 1);
        assert_eq!(band_for_level(-3).level_min, 1);
        assert_eq!(band_for_level(42).level_max, 10);
    }

    #[test]
    fn test_draw_respects_division_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        for level in 1..=10 {
            for _ in 0..200 {
                let p = draw_params(level, &mut rng);
                assert_eq!(p.dividend, p.divisor * p.quotient + p.remainder);
                assert!(p.remainder >= 0 && p.remainder < p.divisor);
            }
        }
    }

    #[test]
    fn test_draw_respects_band_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for level in 1..=10 {
            let band = band_for_level(level);
            for _ in 0..200 {
                let p = draw_params(level, &mut rng);
                assert!(p.divisor >= band.divisor_min && p.divisor <= band.divisor_max);
                assert!(p.quotient >= band.quotient_min && p.quotient <= band.quotient_max);
                if !band.allow_remainder {
                    assert_eq!(p.remainder, 0);
                }
            }
        }
    }

    #[test]
    fn test_draw_unique_avoids_history() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen: HashSet<String> = HashSet::new();
        for _ in 0..50 {
            let p = draw_unique(9, &mut rng, |sig| seen.contains(sig));
            let sig = signature(p.dividend, p.divisor);
            assert!(!seen.contains(&sig), "duplicate signature {sig}");
            seen.insert(sig);
        }
    }

    #[test]
    fn test_draw_unique_accepts_duplicate_after_budget() {
        let mut rng = StdRng::seed_from_u64(5);
        // Everything is taken: the draw must still terminate and return a pair.
        let p = draw_unique(1, &mut rng, |_| true);
        assert!(p.divisor >= 2 && p.divisor <= 5);
    }

    #[test]
    fn test_signature_format() {
        assert_eq!(signature(56, 8), "56÷8");
    }
}
