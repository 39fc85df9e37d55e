//! The boundary contract with the acquisition layer: a venue snapshot of per-entrant pool
//! money, already parsed from upstream data. Any collaborator able to supply this shape is
//! acceptable; nothing here knows about venues, pages or selectors.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pool::{Pool, PoolError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntrantPools {
    pub runner: String,
    /// Unparsable cells are persisted as nulls upstream.
    #[serde(default)]
    pub win_pool: Option<f64>,
    #[serde(default)]
    pub show_pool: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub retrieved_at: DateTime<Utc>,
    pub track: String,
    pub race_number: u32,
    pub entries: Vec<EntrantPools>,
}
impl RaceSnapshot {
    /// Win-pool weights for sampling. Entrants with no parsed win money are omitted; they
    /// cannot be weighted.
    pub fn win_pool(&self) -> Result<Pool, PoolError> {
        Pool::new(
            self.entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .win_pool
                        .map(|amount| (entry.runner.clone(), amount))
                })
                .collect(),
        )
    }

    /// Show-pool money for payout estimation. A missing amount counts as nothing staked.
    pub fn show_pool(&self) -> Result<Pool, PoolError> {
        Pool::new(
            self.entries
                .iter()
                .map(|entry| (entry.runner.clone(), entry.show_pool.unwrap_or(0.0)))
                .collect(),
        )
    }
}

/// Reads a single JSON-encoded snapshot.
pub fn read_from_file(path: impl AsRef<Path>) -> anyhow::Result<RaceSnapshot> {
    let file = File::open(path)?;
    let snapshot = serde_json::from_reader(file)?;
    Ok(snapshot)
}

/// Reads every snapshot from a line-delimited JSON file, as appended to by the acquisition
/// layer.
pub fn read_jsonl(path: impl AsRef<Path>) -> anyhow::Result<Vec<RaceSnapshot>> {
    let file = File::open(path)?;
    let mut snapshots = vec![];
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        snapshots.push(serde_json::from_str(&line)?);
    }
    Ok(snapshots)
}
