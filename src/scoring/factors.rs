use serde::Serialize;

use super::config::{AgeFitParams, AgePenaltyParams, OpportunityParams, ScoringConfig};
use crate::level::TierLabel;
use crate::record::Record;

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn apply_floor(value: f64, floor: Option<f64>) -> f64 {
    match floor {
        Some(floor) => value.max(floor),
        None => value,
    }
}

/// Exponential decay past the cutoff age, in `[0, 1]`.
///
/// A missing age is never penalized.
pub fn age_multiplier(age: Option<f64>, params: &AgePenaltyParams) -> f64 {
    let Some(age) = age.filter(|a| a.is_finite()) else {
        return 1.0;
    };
    if age <= params.cutoff_age {
        return 1.0;
    }
    let years_past = age - params.cutoff_age;
    let decay = (-params.rate * years_past.powf(params.exponent)).exp();
    clamp_unit(apply_floor(decay, params.floor))
}

/// Boost for players young for their level, penalty for old ones.
///
/// Neutral inside `expected ± deviation`. Outside the band the effect ramps
/// linearly over one more deviation and then saturates at
/// `1 + younger_boost` or `1 - older_penalty`. Never negative.
pub fn age_fit_multiplier(age: Option<f64>, params: Option<&AgeFitParams>) -> f64 {
    let (Some(age), Some(params)) = (age.filter(|a| a.is_finite()), params) else {
        return 1.0;
    };
    let dev = params.deviation;
    let diff = age - params.expected_age;

    if diff < -dev {
        let shortfall = (params.expected_age - dev) - age;
        let ramp = (shortfall / dev).min(1.0);
        (1.0 + params.younger_boost * ramp).max(0.0)
    } else if diff > dev {
        let excess = age - (params.expected_age + dev);
        let ramp = (excess / dev).min(1.0);
        (1.0 - params.older_penalty * ramp).max(0.0)
    } else {
        1.0
    }
}

/// Small-sample discount, in `[0, 1]`.
///
/// Missing at-bats are not penalized; zero at-bats give exactly 0 unless a
/// floor lifts it.
pub fn opportunity_multiplier(at_bats: Option<f64>, params: &OpportunityParams) -> f64 {
    let Some(ab) = at_bats.filter(|v| v.is_finite()) else {
        return 1.0;
    };
    if params.min_ab <= 0.0 || ab >= params.min_ab {
        return 1.0;
    }
    let raw = if ab <= 0.0 {
        0.0
    } else {
        (ab / params.min_ab).powf(params.exponent)
    };
    clamp_unit(apply_floor(raw, params.floor))
}

/// Gaussian proximity of age to the level's expected age, in `[0, 1]`.
///
/// This feeds the usage score and is deliberately symmetric, unlike
/// [`age_fit_multiplier`].
pub fn age_proximity(age: Option<f64>, params: Option<&AgeFitParams>) -> f64 {
    let (Some(age), Some(params)) = (age.filter(|a| a.is_finite()), params) else {
        return 1.0;
    };
    let delta = age - params.expected_age;
    (-(delta * delta) / (2.0 * params.deviation * params.deviation)).exp()
}

/// Per-record adjustment multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Adjustments {
    pub age: f64,
    pub age_fit: f64,
    pub opportunity: f64,
    /// `age * age_fit * opportunity`, clamped to `[0, 1]`.
    pub combined: f64,
}

impl Default for Adjustments {
    fn default() -> Self {
        Self {
            age: 1.0,
            age_fit: 1.0,
            opportunity: 1.0,
            combined: 1.0,
        }
    }
}

pub fn compute_adjustments(
    record: &Record,
    tier: Option<&TierLabel>,
    config: &ScoringConfig,
) -> Adjustments {
    let age = record.age();
    let fit_params = config.age_fit_for(tier);

    let age_mult = age_multiplier(age, &config.age_penalty_for(tier));
    let fit_mult = age_fit_multiplier(age, fit_params.as_ref());
    let opp_mult = opportunity_multiplier(
        record.line.at_bats_reported(),
        &config.opportunity_for(tier),
    );

    Adjustments {
        age: age_mult,
        age_fit: fit_mult,
        opportunity: opp_mult,
        combined: clamp_unit(age_mult * fit_mult * opp_mult),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age_params() -> AgePenaltyParams {
        AgePenaltyParams::default()
    }

    fn fit_params() -> AgeFitParams {
        AgeFitParams {
            expected_age: 24.0,
            deviation: 3.0,
            younger_boost: 0.2,
            older_penalty: 0.3,
        }
    }

    fn opp_params(floor: Option<f64>) -> OpportunityParams {
        OpportunityParams {
            min_ab: 200.0,
            exponent: 1.0,
            floor,
        }
    }

    #[test]
    fn test_age_at_or_below_cutoff_is_neutral() {
        for age in [18.0, 25.0, 32.9, 33.0] {
            assert_eq!(age_multiplier(Some(age), &age_params()), 1.0);
        }
    }

    #[test]
    fn test_age_decay_past_cutoff() {
        // One year past: exp(-0.5 * 1^1.25)
        let mult = age_multiplier(Some(34.0), &age_params());
        assert!((mult - (-0.5f64).exp()).abs() < 1e-12);
        assert!(age_multiplier(Some(38.0), &age_params()) < mult);
    }

    #[test]
    fn test_age_decay_floor() {
        let params = AgePenaltyParams {
            floor: Some(0.4),
            ..AgePenaltyParams::default()
        };
        assert_eq!(age_multiplier(Some(45.0), &params), 0.4);
    }

    #[test]
    fn test_missing_age_is_neutral() {
        assert_eq!(age_multiplier(None, &age_params()), 1.0);
        assert_eq!(age_multiplier(Some(f64::NAN), &age_params()), 1.0);
        assert_eq!(age_fit_multiplier(None, Some(&fit_params())), 1.0);
        assert_eq!(age_proximity(None, Some(&fit_params())), 1.0);
    }

    #[test]
    fn test_age_fit_inside_band_is_neutral() {
        for age in [21.0, 22.5, 24.0, 26.9, 27.0] {
            assert_eq!(age_fit_multiplier(Some(age), Some(&fit_params())), 1.0);
        }
    }

    #[test]
    fn test_age_fit_younger_ramp_saturates() {
        // Band starts at 21; half a deviation below -> half the boost
        let half = age_fit_multiplier(Some(19.5), Some(&fit_params()));
        assert!((half - 1.1).abs() < 1e-12);
        let full = age_fit_multiplier(Some(18.0), Some(&fit_params()));
        assert!((full - 1.2).abs() < 1e-12);
        assert_eq!(age_fit_multiplier(Some(15.0), Some(&fit_params())), full);
    }

    #[test]
    fn test_age_fit_older_ramp_floors_at_zero() {
        let full = age_fit_multiplier(Some(30.0), Some(&fit_params()));
        assert!((full - 0.7).abs() < 1e-12);

        let harsh = AgeFitParams {
            older_penalty: 2.5,
            ..fit_params()
        };
        assert_eq!(age_fit_multiplier(Some(35.0), Some(&harsh)), 0.0);
    }

    #[test]
    fn test_age_fit_without_config_is_neutral() {
        assert_eq!(age_fit_multiplier(Some(40.0), None), 1.0);
        assert_eq!(age_proximity(Some(40.0), None), 1.0);
    }

    #[test]
    fn test_opportunity_at_threshold_is_neutral() {
        assert_eq!(opportunity_multiplier(Some(200.0), &opp_params(None)), 1.0);
        assert_eq!(opportunity_multiplier(Some(550.0), &opp_params(None)), 1.0);
    }

    #[test]
    fn test_opportunity_zero_at_bats() {
        assert_eq!(opportunity_multiplier(Some(0.0), &opp_params(None)), 0.0);
        assert_eq!(opportunity_multiplier(Some(0.0), &opp_params(Some(0.25))), 0.25);
    }

    #[test]
    fn test_opportunity_partial_sample() {
        assert_eq!(opportunity_multiplier(Some(50.0), &opp_params(None)), 0.25);
        let squared = OpportunityParams {
            exponent: 2.0,
            ..opp_params(None)
        };
        assert_eq!(opportunity_multiplier(Some(100.0), &squared), 0.25);
    }

    #[test]
    fn test_opportunity_missing_is_neutral() {
        assert_eq!(opportunity_multiplier(None, &opp_params(None)), 1.0);
    }

    #[test]
    fn test_opportunity_disabled_threshold() {
        let disabled = OpportunityParams {
            min_ab: 0.0,
            ..opp_params(None)
        };
        assert_eq!(opportunity_multiplier(Some(0.0), &disabled), 1.0);
    }

    #[test]
    fn test_age_proximity_shape() {
        assert_eq!(age_proximity(Some(24.0), Some(&fit_params())), 1.0);
        let one_dev = age_proximity(Some(27.0), Some(&fit_params()));
        assert!((one_dev - (-0.5f64).exp()).abs() < 1e-12);
        assert_eq!(
            age_proximity(Some(21.0), Some(&fit_params())),
            one_dev
        );
    }

    #[test]
    fn test_combined_is_clamped() {
        let mut config = ScoringConfig::empty();
        config.age_to_level = Some(crate::scoring::TierTable::from([(
            "default".to_string(),
            crate::scoring::AgeToLevelConfig {
                age: Some(24.0),
                deviation: Some(2.0),
                younger_boost: Some(0.5),
                older_penalty: Some(0.0),
            },
        )]));
        let record = Record {
            age: Some(18.0),
            line: crate::record::BattingLine {
                at_bats: Some(400.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let adj = compute_adjustments(&record, None, &config);
        assert_eq!(adj.age_fit, 1.5);
        assert_eq!(adj.combined, 1.0);
    }

    #[test]
    fn test_floors_combine_as_product() {
        let mut config = ScoringConfig::empty();
        config.age_penalty = Some(crate::scoring::TierTable::from([(
            "default".to_string(),
            crate::scoring::AgePenaltyConfig {
                min_multiplier: Some(0.5),
                ..Default::default()
            },
        )]));
        config.at_bat_penalty = Some(crate::scoring::TierTable::from([(
            "default".to_string(),
            crate::scoring::AtBatPenaltyConfig {
                min_multiplier: Some(0.5),
                ..Default::default()
            },
        )]));
        let record = Record {
            age: Some(60.0),
            line: crate::record::BattingLine {
                at_bats: Some(0.0),
                ..Default::default()
            },
            ..Default::default()
        };
        let adj = compute_adjustments(&record, None, &config);
        assert_eq!(adj.age, 0.5);
        assert_eq!(adj.opportunity, 0.5);
        assert_eq!(adj.combined, 0.25);
    }
}
