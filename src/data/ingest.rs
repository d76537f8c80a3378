//! Trimming of the raw review dump into a dense-enough interaction log.
//!
//! The similarity engine trusts its input to be trimmed already and never
//! re-checks these thresholds.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Write};

use crate::{
    error::AppResult,
    models::{ItemId, ReviewRecord, UserId},
};

use super::store::read_records;

/// Minimum activity required to keep users and games
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimThresholds {
    /// Distinct games a user must have reviewed
    pub min_games_per_user: usize,
    /// Reviews a game must have after user filtering
    pub min_item_ratings: usize,
}

impl Default for TrimThresholds {
    fn default() -> Self {
        Self {
            min_games_per_user: 10,
            min_item_ratings: 100,
        }
    }
}

/// Applies the three filters in order:
/// 1. users with a single review are dropped,
/// 2. users with fewer than `min_games_per_user` distinct games are dropped,
/// 3. games with fewer than `min_item_ratings` remaining reviews are dropped.
///
/// Game filtering runs last, so a kept user may end up below the per-user
/// threshold. That matches the upstream pipeline and is left alone.
pub fn trim_reviews(records: Vec<ReviewRecord>, thresholds: TrimThresholds) -> Vec<ReviewRecord> {
    let initial = records.len();

    let mut review_counts: HashMap<UserId, usize> = HashMap::new();
    for record in &records {
        *review_counts.entry(record.user_id).or_insert(0) += 1;
    }
    let records: Vec<ReviewRecord> = records
        .into_iter()
        .filter(|r| review_counts.get(&r.user_id).copied().unwrap_or(0) > 1)
        .collect();

    let mut games_per_user: HashMap<UserId, HashSet<ItemId>> = HashMap::new();
    for record in &records {
        games_per_user
            .entry(record.user_id)
            .or_default()
            .insert(record.app_id);
    }
    let records: Vec<ReviewRecord> = records
        .into_iter()
        .filter(|r| {
            games_per_user
                .get(&r.user_id)
                .map_or(0, HashSet::len)
                >= thresholds.min_games_per_user
        })
        .collect();
    let after_users = records.len();

    let mut ratings_per_item: HashMap<ItemId, usize> = HashMap::new();
    for record in &records {
        *ratings_per_item.entry(record.app_id).or_insert(0) += 1;
    }
    let records: Vec<ReviewRecord> = records
        .into_iter()
        .filter(|r| {
            ratings_per_item.get(&r.app_id).copied().unwrap_or(0) >= thresholds.min_item_ratings
        })
        .collect();

    tracing::info!(
        initial,
        after_user_filter = after_users,
        kept = records.len(),
        min_games_per_user = thresholds.min_games_per_user,
        min_item_ratings = thresholds.min_item_ratings,
        "Review log trimmed"
    );

    records
}

/// Reads a raw review table, trims it and writes the four-column result.
/// Returns the number of rows written.
pub fn trim_csv<R: Read, W: Write>(
    input: R,
    output: W,
    thresholds: TrimThresholds,
) -> AppResult<usize> {
    let records = trim_reviews(read_records(input)?, thresholds);

    let mut writer = csv::Writer::from_writer(output);
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(records.len())
}
