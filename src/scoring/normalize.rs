use std::collections::BTreeMap;

/// Centre of the output scale; degenerate populations map here.
pub const MIDPOINT: f64 = 50.0;
/// Output points per standard deviation.
pub const SPREAD: f64 = 10.0;
pub const SCALE_MIN: f64 = 0.0;
pub const SCALE_MAX: f64 = 100.0;

/// Magnitudes outside this band are rescaled before computing moments so
/// sums and squares stay finite.
const SAFE_MAGNITUDE_MAX: f64 = 1e100;
const SAFE_MAGNITUDE_MIN: f64 = 1e-100;

/// Mean and population standard deviation of a score population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Moments over the finite values, or `None` when the population cannot be
/// spread out: fewer than two finite values, all values equal, or zero
/// deviation.
pub fn population_stats(values: &[f64]) -> Option<PopulationStats> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let first = *finite.first()?;
    if finite.len() < 2 || finite.iter().all(|v| *v == first) {
        return None;
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return None;
    }
    Some(PopulationStats { mean, std_dev })
}

/// Power-of-two exponent that brings the largest magnitude into `[1, 2)`,
/// or `None` when it is already inside the safe band.
fn safe_exponent(values: &[f64]) -> Option<i32> {
    let max_abs = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max_abs > SAFE_MAGNITUDE_MAX || (max_abs > 0.0 && max_abs < SAFE_MAGNITUDE_MIN) {
        Some(-(max_abs.log2().floor() as i32))
    } else {
        None
    }
}

/// `v * 2^exp` in two steps; a single factor over- or underflows for
/// subnormal and near-overflow inputs.
fn scale_pow2(v: f64, exp: i32) -> f64 {
    let half = exp / 2;
    v * 2f64.powi(half) * 2f64.powi(exp - half)
}

/// Map `z` onto the bounded display scale.
pub fn scale_z(z: f64) -> f64 {
    if z.is_nan() {
        return MIDPOINT;
    }
    (MIDPOINT + SPREAD * z).clamp(SCALE_MIN, SCALE_MAX)
}

/// Rescale a population to `50 + 10z`, clamped to `[0, 100]`.
///
/// Degenerate populations map every member to exactly 50. Non-finite values
/// are left out of the moments and map to 50.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let scaled: Vec<f64> = match safe_exponent(values) {
        Some(exp) => values.iter().map(|v| scale_pow2(*v, exp)).collect(),
        None => values.to_vec(),
    };

    let Some(stats) = population_stats(&scaled) else {
        return vec![MIDPOINT; values.len()];
    };

    scaled
        .iter()
        .map(|v| {
            if v.is_finite() {
                scale_z((v - stats.mean) / stats.std_dev)
            } else {
                MIDPOINT
            }
        })
        .collect()
}

/// Normalize each group independently. `keys[i]` is the group of
/// `values[i]`; groups are processed in key order and results are written
/// back to the original positions.
pub fn normalize_grouped<K: Ord>(values: &[f64], keys: &[K]) -> Vec<f64> {
    debug_assert_eq!(values.len(), keys.len());

    let mut groups: BTreeMap<&K, Vec<usize>> = BTreeMap::new();
    for (idx, key) in keys.iter().enumerate().take(values.len()) {
        groups.entry(key).or_default().push(idx);
    }

    let mut out = vec![MIDPOINT; values.len()];
    for indices in groups.values() {
        let members: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
        for (&i, scaled) in indices.iter().zip(normalize(&members)) {
            out[i] = scaled;
        }
    }
    out
}
