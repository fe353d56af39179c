pub mod dedup;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::ScoreError;
use crate::level::{infer_tier, TierLabel};
use crate::record::{derive_rates, RateStats, Record};
use crate::scoring::composite::{apply_level_weight, blend, round6};
use crate::scoring::{
    compute_adjustments, lint_scoring, normalize, normalize_grouped, validate_scoring,
    Adjustments, NormalizationMode, ScoreBreakdown, Scorer, ScoringConfig,
};

pub use dedup::{dedup_by, dedup_records};

/// A record with every derived field of a scoring run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: Record,
    pub tier: Option<TierLabel>,
    pub rates: RateStats,
    pub adjustments: Adjustments,
    pub level_weight: f64,
    /// Raw scores, after the adjustment multiplier when enabled.
    pub performance_raw: f64,
    pub usage_raw: f64,
    /// Normalized scores on the 0-100 scale.
    pub performance: f64,
    pub usage: f64,
    pub composite: f64,
    pub breakdown: ScoreBreakdown,
}

impl ScoredRecord {
    pub fn name(&self) -> &str {
        self.record.name.as_deref().unwrap_or("")
    }
}

/// Level of a record: the explicit label wins, otherwise inferred from the
/// provenance tag.
pub fn assign_tier(record: &Record) -> Option<TierLabel> {
    record
        .level
        .as_deref()
        .and_then(TierLabel::parse)
        .or_else(|| record.source.as_deref().and_then(infer_tier))
}

/// Records whose assigned level matches `level`.
pub fn filter_level(records: Vec<Record>, level: &TierLabel) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| assign_tier(r).as_ref() == Some(level))
        .collect()
}

/// Sort by composite descending, then by name for stable ties.
pub fn sort_ranked(records: &mut [ScoredRecord]) {
    records.sort_by(|a, b| {
        let score_cmp = b.composite.total_cmp(&a.composite);
        if score_cmp != Ordering::Equal {
            return score_cmp;
        }
        a.name().cmp(b.name())
    });
}

/// Scoring run over a population with a validated configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ScoringConfig,
}

impl Pipeline {
    /// Validate `config` and log non-fatal lint warnings.
    pub fn new(config: ScoringConfig) -> Result<Self, ScoreError> {
        validate_scoring(&config).map_err(ScoreError::InvalidConfig)?;
        for warning in lint_scoring(&config) {
            warn!("{}", warning);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every record without deduplicating. Output order matches input.
    pub fn score_all(&self, records: Vec<Record>) -> Result<Vec<ScoredRecord>, ScoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        if records.iter().all(|r| r.line.is_empty()) {
            return Err(ScoreError::MissingInputs {
                records: records.len(),
            });
        }

        let scorer = Scorer::new(&self.config);
        let mut scored: Vec<ScoredRecord> = records
            .into_iter()
            .map(|record| {
                let tier = assign_tier(&record);
                let rates = derive_rates(&record.line);
                let adjustments = compute_adjustments(&record, tier.as_ref(), &self.config);
                let raw = scorer.score(&record, tier.as_ref(), &rates, &adjustments);
                let level_weight = self.config.level_weight_for(tier.as_ref());
                if record.line.is_empty() {
                    debug!(player = record.name.as_deref().unwrap_or(""), "no statistics, scoring as zeros");
                }
                ScoredRecord {
                    record,
                    tier,
                    rates,
                    adjustments,
                    level_weight,
                    performance_raw: raw.performance,
                    usage_raw: raw.usage,
                    performance: 0.0,
                    usage: 0.0,
                    composite: 0.0,
                    breakdown: raw.breakdown,
                }
            })
            .collect();

        self.log_tier_counts(&scored);
        self.normalize_scores(&mut scored);

        let share = self.config.performance_share();
        for r in &mut scored {
            let composite = apply_level_weight(blend(r.performance, r.usage, share), r.level_weight);
            r.performance = round6(r.performance);
            r.usage = round6(r.usage);
            r.composite = round6(composite);
        }

        Ok(scored)
    }

    /// Score, then keep one record per player.
    pub fn run(&self, records: Vec<Record>) -> Result<Vec<ScoredRecord>, ScoreError> {
        let scored = self.score_all(records)?;
        let before = scored.len();
        let deduped = dedup_records(scored);
        info!(
            records = deduped.len(),
            removed = before - deduped.len(),
            "Deduplicated players"
        );
        Ok(deduped)
    }

    fn normalize_scores(&self, scored: &mut [ScoredRecord]) {
        let performance: Vec<f64> = scored.iter().map(|r| r.performance_raw).collect();
        let usage: Vec<f64> = scored.iter().map(|r| r.usage_raw).collect();

        let (performance, usage) = match self.config.normalization() {
            NormalizationMode::Global => (normalize(&performance), normalize(&usage)),
            NormalizationMode::PerLevel => {
                let keys: Vec<Option<TierLabel>> = scored.iter().map(|r| r.tier.clone()).collect();
                (
                    normalize_grouped(&performance, &keys),
                    normalize_grouped(&usage, &keys),
                )
            }
        };

        for ((r, p), u) in scored.iter_mut().zip(performance).zip(usage) {
            r.performance = p;
            r.usage = u;
        }
    }

    fn log_tier_counts(&self, scored: &[ScoredRecord]) {
        let mut counts: BTreeMap<Option<&TierLabel>, usize> = BTreeMap::new();
        for r in scored {
            *counts.entry(r.tier.as_ref()).or_default() += 1;
        }
        for (tier, count) in counts {
            let tier = tier.map(|t| t.as_str()).unwrap_or("(none)");
            debug!(tier, count, "Records by level");
        }
        info!(
            records = scored.len(),
            mode = ?self.config.normalization(),
            "Scored population"
        );
    }
}

/// Score, dedup and sort `records` in one call.
pub fn rank(records: Vec<Record>, config: &ScoringConfig) -> Result<Vec<ScoredRecord>, ScoreError> {
    let mut ranked = Pipeline::new(config.clone())?.run(records)?;
    sort_ranked(&mut ranked);
    Ok(ranked)
}
