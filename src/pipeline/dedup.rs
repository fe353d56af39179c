use std::collections::HashMap;

use super::ScoredRecord;

/// Keep one item per identity key: the one with the most at-bats.
///
/// Ties keep the first encountered. Items without a key always survive.
/// Survivors stay in their original relative order.
pub fn dedup_by<T, K, A>(items: Vec<T>, key: K, at_bats: A) -> Vec<T>
where
    K: Fn(&T) -> Option<String>,
    A: Fn(&T) -> f64,
{
    let mut best: HashMap<String, (usize, f64)> = HashMap::new();
    let mut keep = vec![true; items.len()];

    for (idx, item) in items.iter().enumerate() {
        let Some(k) = key(item) else {
            continue;
        };
        let ab = at_bats(item);
        match best.get_mut(&k) {
            Some((best_idx, best_ab)) => {
                if ab > *best_ab {
                    keep[*best_idx] = false;
                    *best_idx = idx;
                    *best_ab = ab;
                } else {
                    keep[idx] = false;
                }
            }
            None => {
                best.insert(k, (idx, ab));
            }
        }
    }

    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, kept)| kept.then_some(item))
        .collect()
}

fn reported_at_bats(record: &ScoredRecord) -> f64 {
    record.record.line.at_bats_reported().unwrap_or(0.0)
}

/// Collapse scored records by player identity.
pub fn dedup_records(records: Vec<ScoredRecord>) -> Vec<ScoredRecord> {
    dedup_by(records, |r| r.record.identity_key(), reported_at_bats)
}
