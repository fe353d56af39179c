use super::normalize::{SCALE_MAX, SCALE_MIN};

/// Decimal places kept on published scores.
pub const SCORE_DECIMALS: i32 = 6;

fn clamp_scale(value: f64) -> f64 {
    if value.is_nan() {
        SCALE_MIN
    } else {
        value.clamp(SCALE_MIN, SCALE_MAX)
    }
}

/// Round half away from zero to [`SCORE_DECIMALS`] places.
pub fn round6(value: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Linear blend of normalized performance and usage, clamped to `[0, 100]`.
///
/// `share` is the performance weight; usage gets `1 - share`. No rounding.
pub fn blend(performance: f64, usage: f64, share: f64) -> f64 {
    clamp_scale(share * performance + (1.0 - share) * usage)
}

/// Apply the level strength multiplier and re-clamp.
pub fn apply_level_weight(composite: f64, level_weight: f64) -> f64 {
    clamp_scale(composite * level_weight)
}

/// Blend, weight by level, then round once.
pub fn composite_score(performance: f64, usage: f64, share: f64, level_weight: f64) -> f64 {
    round6(apply_level_weight(blend(performance, usage, share), level_weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_midpoint_pairs() {
        assert_eq!(blend(40.0, 50.0, 0.5), 45.0);
        assert_eq!(blend(60.0, 50.0, 0.5), 55.0);
    }

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend(80.0, 20.0, 1.0), 80.0);
        assert_eq!(blend(80.0, 20.0, 0.0), 20.0);
    }

    #[test]
    fn test_level_weight_clamps() {
        assert_eq!(apply_level_weight(90.0, 2.0), 100.0);
        assert_eq!(apply_level_weight(90.0, -1.0), 0.0);
        assert_eq!(apply_level_weight(90.0, f64::NAN), 0.0);
        assert_eq!(apply_level_weight(50.0, 0.5), 25.0);
    }

    #[test]
    fn test_round6() {
        assert_eq!(round6(12.345_678_9), 12.345_679);
        assert_eq!(round6(100.0), 100.0);
        assert_eq!(round6(0.000_000_4), 0.0);
    }

    #[test]
    fn test_composite_rounds_once() {
        // 0.5 * 61.2345674 + 0.5 * 40 = 50.6172837
        let score = composite_score(61.234_567_4, 40.0, 0.5, 1.0);
        assert_eq!(score, 50.617_284);
    }
}
