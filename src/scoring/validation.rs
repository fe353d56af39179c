use std::collections::BTreeMap;

use super::config::{
    non_negative, positive, unit_interval, ScoringConfig, TierTable, DEFAULT_KEY,
};
use crate::level::{canonicalize, Tier};

fn check_finite(errors: &mut Vec<String>, path: &str, value: Option<f64>) {
    if let Some(v) = value {
        if !v.is_finite() {
            errors.push(format!("{}: must be a finite number, got {}", path, v));
        }
    }
}

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Blend ratio
    if let Some(share) = config.performance_share {
        if !share.is_finite() || !(0.0..=1.0).contains(&share) {
            errors.push(format!(
                "scoring.performance_share: must be between 0 and 1, got {}",
                share
            ));
        }
    }

    if let Some(ref weights) = config.performance_weights {
        for (stat, weight) in weights {
            check_finite(
                &mut errors,
                &format!("scoring.performance_weights.{}", stat.label()),
                Some(*weight),
            );
        }
    }

    if let Some(ref usage) = config.usage_weights {
        check_finite(&mut errors, "scoring.usage_weights.defensive_position", usage.defensive_position);
        check_finite(&mut errors, "scoring.usage_weights.handedness", usage.handedness);
        check_finite(&mut errors, "scoring.usage_weights.age_to_level", usage.age_to_level);
        check_finite(&mut errors, "scoring.usage_weights.plate_appearances", usage.plate_appearances);
    }

    if let Some(ref factors) = config.positional_factors {
        for (position, factor) in factors {
            check_finite(
                &mut errors,
                &format!("scoring.positional_factors.{}", position),
                Some(*factor),
            );
        }
    }

    if let Some(ref factors) = config.handedness_factors {
        for (bats, factor) in factors {
            check_finite(
                &mut errors,
                &format!("scoring.handedness_factors.{}", bats),
                Some(*factor),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Warn about keys that do not name a known level and about keys that
/// resolve to the same level (only the first in sorted order is used).
fn lint_keys<T>(warnings: &mut Vec<String>, section: &str, table: &TierTable<T>) {
    let mut seen: BTreeMap<Tier, &str> = BTreeMap::new();
    for key in table.keys() {
        if key.eq_ignore_ascii_case(DEFAULT_KEY) {
            continue;
        }
        match canonicalize(key) {
            Some(tier) => {
                if let Some(first) = seen.get(&tier) {
                    warnings.push(format!(
                        "scoring.{}.{}: same level as '{}' ({}), ignored",
                        section, key, first, tier
                    ));
                } else {
                    seen.insert(tier, key);
                }
            }
            None => warnings.push(format!(
                "scoring.{}.{}: not a known level ({}), only matches records labelled '{}'",
                section,
                key,
                Tier::ALL.map(|t| t.as_str()).join(", "),
                key
            )),
        }
    }
}

fn lint_value(
    warnings: &mut Vec<String>,
    path: String,
    value: Option<f64>,
    valid: impl Fn(f64) -> bool,
    expected: &str,
) {
    if let Some(v) = value {
        if !v.is_finite() || !valid(v) {
            warnings.push(format!("{}: {} expected, got {}; using default", path, expected, v));
        }
    }
}

/// Non-fatal problems in the per-level tables. Each of these silently
/// degrades to a default at scoring time.
pub fn lint_scoring(config: &ScoringConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(ref table) = config.age_penalty {
        lint_keys(&mut warnings, "age_penalty", table);
        for (key, cfg) in table {
            let path = |field: &str| format!("scoring.age_penalty.{}.{}", key, field);
            lint_value(&mut warnings, path("cutoff_age"), cfg.cutoff_age, |_| true, "a number");
            lint_value(&mut warnings, path("rate"), cfg.rate, non_negative, "a non-negative number");
            lint_value(&mut warnings, path("exponent"), cfg.exponent, positive, "a positive number");
            lint_value(
                &mut warnings,
                path("min_multiplier"),
                cfg.min_multiplier,
                unit_interval,
                "a value in [0, 1]",
            );
        }
    }

    if let Some(ref table) = config.age_to_level {
        lint_keys(&mut warnings, "age_to_level", table);
        for (key, cfg) in table {
            let path = |field: &str| format!("scoring.age_to_level.{}.{}", key, field);
            lint_value(&mut warnings, path("age"), cfg.age, positive, "a positive age");
            lint_value(&mut warnings, path("deviation"), cfg.deviation, positive, "a positive number");
            lint_value(&mut warnings, path("younger_boost"), cfg.younger_boost, non_negative, "a non-negative number");
            lint_value(&mut warnings, path("older_penalty"), cfg.older_penalty, non_negative, "a non-negative number");
            if cfg.age.is_none() {
                warnings.push(format!(
                    "scoring.age_to_level.{}: no expected age, entry has no effect",
                    key
                ));
            }
        }
    }

    if let Some(ref table) = config.at_bat_penalty {
        lint_keys(&mut warnings, "at_bat_penalty", table);
        for (key, cfg) in table {
            let path = |field: &str| format!("scoring.at_bat_penalty.{}.{}", key, field);
            lint_value(&mut warnings, path("min_ab"), cfg.min_ab, non_negative, "a non-negative count");
            lint_value(&mut warnings, path("exponent"), cfg.exponent, positive, "a positive number");
            lint_value(
                &mut warnings,
                path("min_multiplier"),
                cfg.min_multiplier,
                unit_interval,
                "a value in [0, 1]",
            );
        }
    }

    if let Some(ref table) = config.level_weights {
        lint_keys(&mut warnings, "level_weights", table);
        for (key, weight) in table {
            lint_value(
                &mut warnings,
                format!("scoring.level_weights.{}", key),
                Some(*weight),
                non_negative,
                "a non-negative number",
            );
        }
    }

    warnings
}
