//! Merging a new upload into rows already stored for a profile.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tally_core::{Kind, RawRow, sanitize_row};
use tracing::debug;

/// Same date and kind, different amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub date: String,
    pub kind: Kind,
    pub old_amount: f64,
    pub new_amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    Merged {
        rows: Vec<RawRow>,
        added: usize,
        total: usize,
    },
    /// Nothing was merged
    Conflicts(Vec<Conflict>),
}

type Key = (String, Kind);

/// Date, kind and the bit pattern of the sanitized amount
type StoredKey = (String, Kind, u64);

/// Invalid rows on either side are ignored. Within one side the last amount
/// for a key wins.
fn amounts_by_key(rows: &[RawRow]) -> (Vec<Key>, HashMap<Key, f64>) {
    let mut order = Vec::new();
    let mut amounts = HashMap::new();
    for entry in rows.iter().filter_map(sanitize_row) {
        let key = (entry.date, entry.kind);
        if amounts.insert(key.clone(), entry.amount).is_none() {
            order.push(key);
        }
    }
    (order, amounts)
}

pub fn merge_rows(existing: &[RawRow], incoming: &[RawRow]) -> MergeOutcome {
    let (_, old) = amounts_by_key(existing);
    let (order, new) = amounts_by_key(incoming);

    let conflicts: Vec<Conflict> = order
        .iter()
        .filter_map(|key| {
            let old_amount = *old.get(key)?;
            let new_amount = *new.get(key)?;
            (old_amount != new_amount).then(|| Conflict {
                date: key.0.clone(),
                kind: key.1,
                old_amount,
                new_amount,
            })
        })
        .collect();
    if !conflicts.is_empty() {
        debug!(conflicts = conflicts.len(), "merge aborted");
        return MergeOutcome::Conflicts(conflicts);
    }

    // only rows already stored are skipped; repeats inside the upload are kept
    let stored: HashSet<StoredKey> = existing
        .iter()
        .filter_map(sanitize_row)
        .map(|e| (e.date, e.kind, e.amount.to_bits()))
        .collect();

    let mut rows = existing.to_vec();
    let mut added = 0;
    for row in incoming {
        let Some(entry) = sanitize_row(row) else { continue };
        if !stored.contains(&(entry.date, entry.kind, entry.amount.to_bits())) {
            rows.push(row.clone());
            added += 1;
        }
    }

    debug!(added, total = rows.len(), "merged upload");
    MergeOutcome::Merged {
        total: rows.len(),
        rows,
        added,
    }
}
