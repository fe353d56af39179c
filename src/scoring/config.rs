use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::level::TierLabel;
use crate::record::{Handedness, Position};

/// Key of the fallback entry in every per-level table.
pub const DEFAULT_KEY: &str = "default";

pub const DEFAULT_PERFORMANCE_SHARE: f64 = 0.7;
pub const DEFAULT_CUTOFF_AGE: f64 = 33.0;
pub const DEFAULT_AGE_RATE: f64 = 0.5;
pub const DEFAULT_AGE_EXPONENT: f64 = 1.25;
pub const DEFAULT_MIN_AB: f64 = 200.0;
pub const DEFAULT_AB_EXPONENT: f64 = 1.0;
pub const DEFAULT_LEVEL_WEIGHT: f64 = 1.0;

/// Per-level table keyed by any level spelling plus `"default"`.
pub type TierTable<T> = BTreeMap<String, T>;

/// Statistic that can carry a performance weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stat {
    #[serde(rename = "R")]
    Runs,
    #[serde(rename = "H")]
    Hits,
    #[serde(rename = "2B")]
    Doubles,
    #[serde(rename = "3B")]
    Triples,
    #[serde(rename = "HR")]
    HomeRuns,
    #[serde(rename = "RBI")]
    Rbi,
    #[serde(rename = "BB")]
    Walks,
    #[serde(rename = "K", alias = "SO")]
    Strikeouts,
    #[serde(rename = "SB")]
    Steals,
    #[serde(rename = "CS")]
    CaughtStealing,
    #[serde(rename = "AVG")]
    HitRate,
    #[serde(rename = "OBP")]
    OnBaseRate,
    #[serde(rename = "SLG")]
    PowerRate,
}

impl Stat {
    pub fn label(&self) -> &'static str {
        match self {
            Stat::Runs => "R",
            Stat::Hits => "H",
            Stat::Doubles => "2B",
            Stat::Triples => "3B",
            Stat::HomeRuns => "HR",
            Stat::Rbi => "RBI",
            Stat::Walks => "BB",
            Stat::Strikeouts => "K",
            Stat::Steals => "SB",
            Stat::CaughtStealing => "CS",
            Stat::HitRate => "AVG",
            Stat::OnBaseRate => "OBP",
            Stat::PowerRate => "SLG",
        }
    }
}

/// How raw scores are rescaled onto the 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    /// One population: every record in the run.
    #[default]
    Global,
    /// One population per level.
    PerLevel,
}

/// Scoring configuration.
///
/// Every field is optional. Absent fields resolve to documented defaults,
/// so an empty file (`{}`) is a valid configuration.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   performance_share: 0.7
///   normalization: per_level
///   performance_weights: { OBP: 4.0, SLG: 3.5, K: -2.0 }
///   age_penalty:
///     default: { cutoff_age: 33, rate: 0.5, exponent: 1.25 }
///     MLB: { cutoff_age: 34 }
///   at_bat_penalty:
///     default: { min_ab: 200 }
///     Rookie: { min_ab: 80, min_multiplier: 0.2 }
///   level_weights: { MLB: 1.0, AAA: 0.9, default: 0.5 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Blend ratio of performance vs usage in the composite (default: 0.7)
    #[serde(default, alias = "performance_weighting_percent")]
    pub performance_share: Option<f64>,

    /// Global or per-level normalization (default: global)
    #[serde(default)]
    pub normalization: Option<NormalizationMode>,

    /// Pre-multiply raw scores by the combined adjustment (default: true)
    #[serde(default)]
    pub apply_adjustments: Option<bool>,

    /// Statistic -> weight for the performance score
    #[serde(default)]
    pub performance_weights: Option<BTreeMap<Stat, f64>>,

    /// Component weights for the usage score
    #[serde(default)]
    pub usage_weights: Option<UsageWeights>,

    /// Position -> usage factor; unlisted positions are neutral (1.0)
    #[serde(default)]
    pub positional_factors: Option<BTreeMap<Position, f64>>,

    /// Handedness -> usage factor; unlisted hands are neutral (1.0)
    #[serde(default)]
    pub handedness_factors: Option<BTreeMap<Handedness, f64>>,

    #[serde(default)]
    pub age_penalty: Option<TierTable<AgePenaltyConfig>>,

    #[serde(default)]
    pub age_to_level: Option<TierTable<AgeToLevelConfig>>,

    #[serde(default)]
    pub at_bat_penalty: Option<TierTable<AtBatPenaltyConfig>>,

    /// Level strength multipliers applied to the composite
    #[serde(default)]
    pub level_weights: Option<TierTable<f64>>,
}

/// Usage score component weights. A zero weight disables the component.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UsageWeights {
    #[serde(default)]
    pub defensive_position: Option<f64>,
    #[serde(default)]
    pub handedness: Option<f64>,
    #[serde(default)]
    pub age_to_level: Option<f64>,
    #[serde(default)]
    pub plate_appearances: Option<f64>,
}

/// Exponential decay for players past a level's cutoff age.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgePenaltyConfig {
    #[serde(default)]
    pub cutoff_age: Option<f64>,
    #[serde(default, alias = "penalty_rate")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub exponent: Option<f64>,
    #[serde(default, alias = "min_mult")]
    pub min_multiplier: Option<f64>,
}

/// Expected age at a level and the boost/penalty for deviating from it.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AgeToLevelConfig {
    /// Expected age at this level
    #[serde(default, alias = "expected_age", alias = "expected")]
    pub age: Option<f64>,
    #[serde(default)]
    pub deviation: Option<f64>,
    #[serde(default)]
    pub younger_boost: Option<f64>,
    #[serde(default)]
    pub older_penalty: Option<f64>,
}

/// Small-sample discount below a minimum number of at-bats.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AtBatPenaltyConfig {
    #[serde(default, alias = "threshold")]
    pub min_ab: Option<f64>,
    #[serde(default)]
    pub exponent: Option<f64>,
    #[serde(default, alias = "min_mult")]
    pub min_multiplier: Option<f64>,
}

/// Resolved age-decay parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgePenaltyParams {
    pub cutoff_age: f64,
    pub rate: f64,
    pub exponent: f64,
    pub floor: Option<f64>,
}

impl Default for AgePenaltyParams {
    fn default() -> Self {
        Self {
            cutoff_age: DEFAULT_CUTOFF_AGE,
            rate: DEFAULT_AGE_RATE,
            exponent: DEFAULT_AGE_EXPONENT,
            floor: None,
        }
    }
}

/// Resolved age-to-level parameters. Only exists when the level has a
/// usable expected age and a positive deviation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeFitParams {
    pub expected_age: f64,
    pub deviation: f64,
    pub younger_boost: f64,
    pub older_penalty: f64,
}

/// Resolved at-bat penalty parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpportunityParams {
    pub min_ab: f64,
    pub exponent: f64,
    pub floor: Option<f64>,
}

impl Default for OpportunityParams {
    fn default() -> Self {
        Self {
            min_ab: DEFAULT_MIN_AB,
            exponent: DEFAULT_AB_EXPONENT,
            floor: None,
        }
    }
}

/// Resolved usage component weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageWeightParams {
    pub defensive_position: f64,
    pub handedness: f64,
    pub age_to_level: f64,
    pub plate_appearances: f64,
}

impl Default for UsageWeightParams {
    fn default() -> Self {
        Self {
            defensive_position: 1.0,
            handedness: 0.125,
            age_to_level: 1.0,
            // Raw PA is in the hundreds; keep it on the scale of the unit factors.
            plate_appearances: 0.01,
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Finite and inside the value's domain; anything else reads as absent.
fn valid(value: Option<f64>, in_domain: impl Fn(f64) -> bool) -> Option<f64> {
    finite(value).filter(|v| in_domain(*v))
}

pub(crate) fn non_negative(v: f64) -> bool {
    v >= 0.0
}

pub(crate) fn positive(v: f64) -> bool {
    v > 0.0
}

pub(crate) fn unit_interval(v: f64) -> bool {
    (0.0..=1.0).contains(&v)
}

/// Entry for `tier`, falling back to the `"default"` entry.
///
/// Keys are compared after level normalization, so `"A+"` and `"high-a"`
/// address the same entry; the first matching key in sorted order wins.
pub fn lookup_tier<'a, T>(table: &'a TierTable<T>, tier: Option<&TierLabel>) -> Option<&'a T> {
    if let Some(tier) = tier {
        let hit = table
            .iter()
            .filter(|(key, _)| !key.eq_ignore_ascii_case(DEFAULT_KEY))
            .find(|(key, _)| tier.matches_key(key));
        if let Some((_, value)) = hit {
            return Some(value);
        }
    }
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(DEFAULT_KEY))
        .map(|(_, value)| value)
}

pub fn default_performance_weights() -> BTreeMap<Stat, f64> {
    BTreeMap::from([
        (Stat::Runs, 1.0),
        (Stat::HomeRuns, 1.4),
        (Stat::Rbi, 1.2),
        (Stat::Steals, 1.5),
        (Stat::HitRate, 3.0),
        (Stat::OnBaseRate, 4.0),
        (Stat::PowerRate, 3.5),
        (Stat::Strikeouts, -2.0),
        (Stat::Walks, 1.0),
    ])
}

pub fn default_positional_factors() -> BTreeMap<Position, f64> {
    BTreeMap::from([
        (Position::Catcher, 2.0),
        (Position::FirstBase, 0.75),
        (Position::SecondBase, 1.25),
        (Position::ThirdBase, 1.0),
        (Position::Shortstop, 1.5),
        (Position::LeftField, 1.0),
        (Position::CenterField, 1.5),
        (Position::RightField, 1.0),
        (Position::Outfield, 1.0),
        (Position::DesignatedHitter, 0.5),
    ])
}

pub fn default_handedness_factors() -> BTreeMap<Handedness, f64> {
    BTreeMap::from([
        (Handedness::Left, 1.0),
        (Handedness::Right, 0.85),
        (Handedness::Switch, 1.25),
    ])
}

fn default_age_to_level() -> TierTable<AgeToLevelConfig> {
    [
        ("Rookie", 19.0, 2.0),
        ("A", 21.0, 2.5),
        ("A+", 22.5, 2.5),
        ("AA", 24.0, 3.0),
        ("AAA", 27.0, 3.5),
        ("MLB", 29.5, 3.75),
    ]
    .into_iter()
    .map(|(level, age, deviation)| {
        (
            level.to_string(),
            AgeToLevelConfig {
                age: Some(age),
                deviation: Some(deviation),
                younger_boost: Some(0.15),
                older_penalty: Some(0.15),
            },
        )
    })
    .collect()
}

fn default_level_weights() -> TierTable<f64> {
    [
        ("MLB", 1.0),
        ("AAA", 0.9),
        ("AA", 0.8),
        ("A+", 0.7),
        ("A", 0.6),
        ("Rookie", 0.5),
        (DEFAULT_KEY, 1.0),
    ]
    .into_iter()
    .map(|(level, weight)| (level.to_string(), weight))
    .collect()
}

impl Default for ScoringConfig {
    /// Starter configuration written by `init` and used when no config file
    /// exists.
    fn default() -> Self {
        Self {
            performance_share: Some(DEFAULT_PERFORMANCE_SHARE),
            normalization: Some(NormalizationMode::Global),
            apply_adjustments: Some(true),
            performance_weights: Some(default_performance_weights()),
            usage_weights: Some(UsageWeights {
                defensive_position: Some(1.0),
                handedness: Some(0.125),
                age_to_level: Some(1.0),
                plate_appearances: Some(0.01),
            }),
            positional_factors: Some(default_positional_factors()),
            handedness_factors: Some(default_handedness_factors()),
            age_penalty: Some(TierTable::from([(
                DEFAULT_KEY.to_string(),
                AgePenaltyConfig {
                    cutoff_age: Some(DEFAULT_CUTOFF_AGE),
                    rate: Some(DEFAULT_AGE_RATE),
                    exponent: Some(DEFAULT_AGE_EXPONENT),
                    min_multiplier: None,
                },
            )])),
            age_to_level: Some(default_age_to_level()),
            at_bat_penalty: Some(TierTable::from([(
                DEFAULT_KEY.to_string(),
                AtBatPenaltyConfig {
                    min_ab: Some(DEFAULT_MIN_AB),
                    exponent: Some(DEFAULT_AB_EXPONENT),
                    min_multiplier: None,
                },
            )])),
            level_weights: Some(default_level_weights()),
        }
    }
}

impl ScoringConfig {
    /// A configuration with every field absent.
    pub fn empty() -> Self {
        Self {
            performance_share: None,
            normalization: None,
            apply_adjustments: None,
            performance_weights: None,
            usage_weights: None,
            positional_factors: None,
            handedness_factors: None,
            age_penalty: None,
            age_to_level: None,
            at_bat_penalty: None,
            level_weights: None,
        }
    }

    /// Fill every absent field from `base`. Present fields, including whole
    /// per-level tables, are kept as written.
    pub fn or_else(self, base: ScoringConfig) -> Self {
        Self {
            performance_share: self.performance_share.or(base.performance_share),
            normalization: self.normalization.or(base.normalization),
            apply_adjustments: self.apply_adjustments.or(base.apply_adjustments),
            performance_weights: self.performance_weights.or(base.performance_weights),
            usage_weights: self.usage_weights.or(base.usage_weights),
            positional_factors: self.positional_factors.or(base.positional_factors),
            handedness_factors: self.handedness_factors.or(base.handedness_factors),
            age_penalty: self.age_penalty.or(base.age_penalty),
            age_to_level: self.age_to_level.or(base.age_to_level),
            at_bat_penalty: self.at_bat_penalty.or(base.at_bat_penalty),
            level_weights: self.level_weights.or(base.level_weights),
        }
    }

    pub fn performance_share(&self) -> f64 {
        finite(self.performance_share).unwrap_or(DEFAULT_PERFORMANCE_SHARE)
    }

    pub fn normalization(&self) -> NormalizationMode {
        self.normalization.unwrap_or_default()
    }

    pub fn apply_adjustments(&self) -> bool {
        self.apply_adjustments.unwrap_or(true)
    }

    pub fn performance_weights(&self) -> BTreeMap<Stat, f64> {
        match &self.performance_weights {
            Some(weights) => weights
                .iter()
                .filter(|(_, w)| w.is_finite())
                .map(|(stat, w)| (*stat, *w))
                .collect(),
            None => default_performance_weights(),
        }
    }

    pub fn usage_weights(&self) -> UsageWeightParams {
        let defaults = UsageWeightParams::default();
        let Some(weights) = &self.usage_weights else {
            return defaults;
        };
        UsageWeightParams {
            defensive_position: finite(weights.defensive_position)
                .unwrap_or(defaults.defensive_position),
            handedness: finite(weights.handedness).unwrap_or(defaults.handedness),
            age_to_level: finite(weights.age_to_level).unwrap_or(defaults.age_to_level),
            plate_appearances: finite(weights.plate_appearances)
                .unwrap_or(defaults.plate_appearances),
        }
    }

    /// Usage factor for a position; unknown or unlisted positions are neutral.
    pub fn positional_factor(&self, position: Option<Position>) -> f64 {
        let Some(position) = position else {
            return 1.0;
        };
        let factor = match &self.positional_factors {
            Some(table) => table.get(&position).copied(),
            None => default_positional_factors().get(&position).copied(),
        };
        finite(factor).unwrap_or(1.0)
    }

    /// Usage factor for a batting side; unknown or unlisted sides are neutral.
    pub fn handedness_factor(&self, bats: Option<Handedness>) -> f64 {
        let Some(bats) = bats else {
            return 1.0;
        };
        let factor = match &self.handedness_factors {
            Some(table) => table.get(&bats).copied(),
            None => default_handedness_factors().get(&bats).copied(),
        };
        finite(factor).unwrap_or(1.0)
    }

    /// Age-decay parameters for a level (cutoff 33, rate 0.5, exponent 1.25,
    /// no floor when absent or out of range).
    pub fn age_penalty_for(&self, tier: Option<&TierLabel>) -> AgePenaltyParams {
        let defaults = AgePenaltyParams::default();
        let Some(cfg) = self
            .age_penalty
            .as_ref()
            .and_then(|table| lookup_tier(table, tier))
        else {
            return defaults;
        };
        AgePenaltyParams {
            cutoff_age: finite(cfg.cutoff_age).unwrap_or(defaults.cutoff_age),
            rate: valid(cfg.rate, non_negative).unwrap_or(defaults.rate),
            exponent: valid(cfg.exponent, positive).unwrap_or(defaults.exponent),
            floor: valid(cfg.min_multiplier, unit_interval),
        }
    }

    /// Age-to-level parameters, or `None` when the level has no usable entry
    /// (an expected age or deviation that is missing or not positive).
    pub fn age_fit_for(&self, tier: Option<&TierLabel>) -> Option<AgeFitParams> {
        let cfg = self
            .age_to_level
            .as_ref()
            .and_then(|table| lookup_tier(table, tier))?;
        let expected_age = valid(cfg.age, positive)?;
        let deviation = valid(cfg.deviation, positive)?;
        Some(AgeFitParams {
            expected_age,
            deviation,
            younger_boost: valid(cfg.younger_boost, non_negative).unwrap_or(0.0),
            older_penalty: valid(cfg.older_penalty, non_negative).unwrap_or(0.0),
        })
    }

    /// At-bat penalty parameters for a level (200 AB, exponent 1.0, no floor
    /// when absent or out of range). A threshold of 0 disables the penalty.
    pub fn opportunity_for(&self, tier: Option<&TierLabel>) -> OpportunityParams {
        let defaults = OpportunityParams::default();
        let Some(cfg) = self
            .at_bat_penalty
            .as_ref()
            .and_then(|table| lookup_tier(table, tier))
        else {
            return defaults;
        };
        OpportunityParams {
            min_ab: valid(cfg.min_ab, non_negative).unwrap_or(defaults.min_ab),
            exponent: valid(cfg.exponent, positive).unwrap_or(defaults.exponent),
            floor: valid(cfg.min_multiplier, unit_interval),
        }
    }

    /// Level strength multiplier (1.0 when absent or negative).
    pub fn level_weight_for(&self, tier: Option<&TierLabel>) -> f64 {
        let weight = self
            .level_weights
            .as_ref()
            .and_then(|table| lookup_tier(table, tier))
            .copied();
        valid(weight, non_negative).unwrap_or(DEFAULT_LEVEL_WEIGHT)
    }
}
