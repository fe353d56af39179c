use serde::Serialize;
use std::collections::BTreeMap;

use super::config::{ScoringConfig, Stat, UsageWeightParams};
use super::factors::{age_proximity, Adjustments};
use crate::level::TierLabel;
use crate::record::rates::safe_div;
use crate::record::{BattingLine, RateStats, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    pub label: String,     // e.g. "OBP", "Position", "Age-to-level"
    pub input: f64,        // Value the weight was applied to
    pub weight: f64,
    pub contribution: f64, // input * weight
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub performance: Vec<FactorContribution>,
    pub usage: Vec<FactorContribution>,
}

/// Unbounded raw scores for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawScores {
    pub performance: f64,
    pub usage: f64,
    /// Multiplier applied to both scores (1.0 when adjustments are off).
    pub multiplier: f64,
    pub breakdown: ScoreBreakdown,
}

/// Weighted performance and usage scoring with weights resolved once per run.
#[derive(Debug, Clone)]
pub struct Scorer<'a> {
    config: &'a ScoringConfig,
    performance_weights: BTreeMap<Stat, f64>,
    usage_weights: UsageWeightParams,
}

/// Value a statistic contributes before weighting: rates as-is, counts per
/// plate appearance.
pub fn stat_input(stat: Stat, line: &BattingLine, rates: &RateStats) -> f64 {
    let per_pa = |count: f64| safe_div(count, line.pa());
    match stat {
        Stat::HitRate => rates.hit_rate,
        Stat::OnBaseRate => rates.on_base_rate,
        Stat::PowerRate => rates.power_rate,
        Stat::Runs => per_pa(line.r()),
        Stat::Hits => per_pa(line.h()),
        Stat::Doubles => per_pa(line.doubles()),
        Stat::Triples => per_pa(line.triples()),
        Stat::HomeRuns => per_pa(line.hr()),
        Stat::Rbi => per_pa(line.rbi()),
        Stat::Walks => per_pa(line.bb()),
        Stat::Strikeouts => per_pa(line.so()),
        Stat::Steals => per_pa(line.sb()),
        Stat::CaughtStealing => per_pa(line.cs()),
    }
}

fn contribution(label: &str, input: f64, weight: f64) -> FactorContribution {
    FactorContribution {
        label: label.to_string(),
        input,
        weight,
        contribution: input * weight,
    }
}

fn total(contributions: &[FactorContribution]) -> f64 {
    contributions.iter().fold(0.0, |acc, c| acc + c.contribution)
}

impl<'a> Scorer<'a> {
    pub fn new(config: &'a ScoringConfig) -> Self {
        Self {
            config,
            performance_weights: config.performance_weights(),
            usage_weights: config.usage_weights(),
        }
    }

    pub fn performance_breakdown(
        &self,
        line: &BattingLine,
        rates: &RateStats,
    ) -> Vec<FactorContribution> {
        self.performance_weights
            .iter()
            .map(|(stat, weight)| contribution(stat.label(), stat_input(*stat, line, rates), *weight))
            .collect()
    }

    /// Components with a zero weight are skipped entirely.
    pub fn usage_breakdown(
        &self,
        record: &Record,
        tier: Option<&TierLabel>,
    ) -> Vec<FactorContribution> {
        let weights = &self.usage_weights;
        let mut parts = Vec::new();

        if weights.defensive_position != 0.0 {
            parts.push(contribution(
                "Position",
                self.config.positional_factor(record.position),
                weights.defensive_position,
            ));
        }
        if weights.handedness != 0.0 {
            parts.push(contribution(
                "Handedness",
                self.config.handedness_factor(record.bats),
                weights.handedness,
            ));
        }
        if weights.age_to_level != 0.0 {
            let params = self.config.age_fit_for(tier);
            parts.push(contribution(
                "Age-to-level",
                age_proximity(record.age(), params.as_ref()),
                weights.age_to_level,
            ));
        }
        if weights.plate_appearances != 0.0 {
            parts.push(contribution(
                "Plate appearances",
                record.line.pa(),
                weights.plate_appearances,
            ));
        }
        parts
    }

    pub fn score_performance(&self, line: &BattingLine, rates: &RateStats) -> f64 {
        total(&self.performance_breakdown(line, rates))
    }

    pub fn score_usage(&self, record: &Record, tier: Option<&TierLabel>) -> f64 {
        total(&self.usage_breakdown(record, tier))
    }

    /// Raw performance and usage, pre-multiplied by the combined adjustment
    /// when the config enables it.
    pub fn score(
        &self,
        record: &Record,
        tier: Option<&TierLabel>,
        rates: &RateStats,
        adjustments: &Adjustments,
    ) -> RawScores {
        let performance = self.performance_breakdown(&record.line, rates);
        let usage = self.usage_breakdown(record, tier);

        let multiplier = if self.config.apply_adjustments() {
            adjustments.combined
        } else {
            1.0
        };

        RawScores {
            performance: total(&performance) * multiplier,
            usage: total(&usage) * multiplier,
            multiplier,
            breakdown: ScoreBreakdown { performance, usage },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Tier;
    use crate::record::{derive_rates, Handedness, Position};
    use crate::scoring::{AgeToLevelConfig, TierTable, UsageWeights};

    fn sample_record() -> Record {
        Record {
            name: Some("Masyn Winn".to_string()),
            bats: Some(Handedness::Right),
            position: Some(Position::Shortstop),
            age: Some(22.0),
            level: Some("AAA".to_string()),
            source: Some("memphis-aaa.csv".to_string()),
            line: BattingLine {
                plate_appearances: Some(100.0),
                at_bats: Some(90.0),
                hits: Some(27.0),
                doubles: Some(6.0),
                triples: Some(1.0),
                home_runs: Some(3.0),
                runs: Some(15.0),
                rbi: Some(12.0),
                walks: Some(8.0),
                strikeouts: Some(20.0),
                steals: Some(5.0),
                caught_stealing: Some(1.0),
            },
        }
    }

    fn config_with(weights: &[(Stat, f64)]) -> ScoringConfig {
        let mut config = ScoringConfig::empty();
        config.performance_weights = Some(weights.iter().copied().collect());
        config
    }

    #[test]
    fn test_counts_are_taken_per_plate_appearance() {
        let record = sample_record();
        let rates = derive_rates(&record.line);
        let config = config_with(&[(Stat::HomeRuns, 10.0), (Stat::Strikeouts, -1.0)]);
        let scorer = Scorer::new(&config);

        // 10 * 3/100 - 20/100
        let score = scorer.score_performance(&record.line, &rates);
        assert!((score - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_rate_stats_contribute_directly() {
        let record = sample_record();
        let rates = derive_rates(&record.line);
        let config = config_with(&[(Stat::HitRate, 1.0)]);
        let scorer = Scorer::new(&config);

        assert_eq!(scorer.score_performance(&record.line, &rates), 0.3);
    }

    #[test]
    fn test_zero_plate_appearances_gives_zero_counts() {
        let mut record = sample_record();
        record.line.plate_appearances = Some(0.0);
        let rates = derive_rates(&record.line);
        let config = config_with(&[(Stat::Runs, 5.0), (Stat::OnBaseRate, 1.0)]);
        let scorer = Scorer::new(&config);

        assert_eq!(scorer.score_performance(&record.line, &rates), 0.0);
    }

    #[test]
    fn test_usage_components_gated_by_weight() {
        let record = sample_record();
        let mut config = ScoringConfig::empty();
        config.usage_weights = Some(UsageWeights {
            defensive_position: Some(1.0),
            handedness: Some(0.0),
            age_to_level: Some(0.0),
            plate_appearances: Some(0.0),
        });
        let scorer = Scorer::new(&config);
        let parts = scorer.usage_breakdown(&record, None);

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].label, "Position");
        assert_eq!(scorer.score_usage(&record, None), 1.5);
    }

    #[test]
    fn test_usage_all_components() {
        let record = sample_record();
        let mut config = ScoringConfig::empty();
        config.usage_weights = Some(UsageWeights {
            defensive_position: Some(1.0),
            handedness: Some(1.0),
            age_to_level: Some(2.0),
            plate_appearances: Some(0.01),
        });
        config.age_to_level = Some(TierTable::from([(
            "AAA".to_string(),
            AgeToLevelConfig {
                age: Some(22.0),
                deviation: Some(3.0),
                ..Default::default()
            },
        )]));
        let scorer = Scorer::new(&config);
        let tier = TierLabel::Canonical(Tier::Aaa);

        // 1.5 (SS) + 0.85 (R) + 2 * 1.0 (exact age) + 0.01 * 100
        let usage = scorer.score_usage(&record, Some(&tier));
        assert!((usage - 5.35).abs() < 1e-12);
    }

    #[test]
    fn test_adjustments_pre_multiply_both_scores() {
        let record = sample_record();
        let rates = derive_rates(&record.line);
        let config = config_with(&[(Stat::HitRate, 1.0)]);
        let scorer = Scorer::new(&config);
        let adjustments = Adjustments {
            age: 1.0,
            age_fit: 1.0,
            opportunity: 0.5,
            combined: 0.5,
        };

        let raw = scorer.score(&record, None, &rates, &adjustments);
        assert_eq!(raw.multiplier, 0.5);
        assert_eq!(raw.performance, 0.15);
        let unadjusted = scorer.score_usage(&record, None);
        assert_eq!(raw.usage, unadjusted * 0.5);
    }

    #[test]
    fn test_adjustments_can_be_disabled() {
        let record = sample_record();
        let rates = derive_rates(&record.line);
        let mut config = config_with(&[(Stat::HitRate, 1.0)]);
        config.apply_adjustments = Some(false);
        let scorer = Scorer::new(&config);
        let adjustments = Adjustments {
            combined: 0.1,
            ..Adjustments::default()
        };

        let raw = scorer.score(&record, None, &rates, &adjustments);
        assert_eq!(raw.multiplier, 1.0);
        assert_eq!(raw.performance, 0.3);
    }

    #[test]
    fn test_breakdown_follows_stat_order() {
        let record = sample_record();
        let rates = derive_rates(&record.line);
        let config = ScoringConfig::empty();
        let scorer = Scorer::new(&config);
        let labels: Vec<_> = scorer
            .performance_breakdown(&record.line, &rates)
            .into_iter()
            .map(|c| c.label)
            .collect();

        assert_eq!(
            labels,
            vec!["R", "HR", "RBI", "BB", "K", "SB", "AVG", "OBP", "SLG"]
        );
    }
}
