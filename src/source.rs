//! Raw battle documents and the fetch/cache collaborator seam.
//!
//! Fetching and DOM scraping are external collaborators: by the time a
//! battle reaches this pipeline it has been reduced to a [`RawBattle`]
//! document (structured JSON payload plus the pre-extracted per-side
//! participant rows of the rendered page). [`BattleSource`] is the seam those
//! collaborators sit behind; [`FsBattleSource`] serves the on-disk cache of
//! already-fetched documents, one JSON file per battle reference.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawBattle {
    /// Battle identifier from the report source.
    pub battle_id: String,
    pub br_link: String,
    /// Base date of the battle, minute precision; the free-text timing below
    /// refines the start/end hours.
    pub datetime: DateTime<Utc>,
    /// Free-text duration string, e.g. `"Battle duration: 1h 5m, from 19:00
    /// to 20:05 ET"` or `"Single killmail at 19:42"`.
    pub timing_text: String,
    pub system: RawSystem,
    pub totals: RawTotals,
    pub sides: Vec<RawSide>,
    /// Opaque original payload, carried through onto the battle record.
    #[serde(default)]
    pub raw_json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSystem {
    pub name: String,
    pub id: String,
    pub region: Option<String>,
    pub constellation: Option<String>,
    /// Wormhole class id, absent for known space.
    pub wh_class_id: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawTotals {
    pub total_pilots: u32,
    /// ISK lost across both sides, in billions.
    pub total_lost: f64,
    pub kms_count: u32,
    pub total_ships: Option<u32>,
    pub total_ship_types: Option<u32>,
    pub total_allys: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawSide {
    /// Side letter from the report header ("A", "B", ...).
    pub side: String,
    pub pilot_count: u32,
    /// ISK text as rendered, e.g. `"12.5b"`.
    #[serde(default)]
    pub isk_lost_text: Option<String>,
    #[serde(default)]
    pub ships_lost: u32,
    pub participants: Vec<RawParticipant>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawParticipant {
    pub ship_name: String,
    #[serde(default)]
    pub ship_image: Option<String>,
    /// Absent for rows whose pilot cell is a placeholder.
    #[serde(default)]
    pub pilot_name: Option<String>,
    #[serde(default)]
    pub pilot_link: Option<String>,
    #[serde(default)]
    pub pod_link: Option<String>,
    pub corp_name: String,
    #[serde(default)]
    pub corp_image: Option<String>,
    #[serde(default)]
    pub alliance_name: Option<String>,
    #[serde(default)]
    pub alliance_image: Option<String>,
    /// Loss value text as rendered, e.g. `"1.2b"`; absent when the row is
    /// not a killmail.
    #[serde(default)]
    pub loss_value_text: Option<String>,
    /// Multiplicity marker, e.g. `"x3 lost"`.
    #[serde(default)]
    pub multiple_text: Option<String>,
    #[serde(default)]
    pub killmail_link: Option<String>,
}

/// The excluded fetch/cache collaborator, reduced to a synchronous load.
pub trait BattleSource {
    fn load(&self, reference: &str) -> Result<RawBattle, Error>;
}

/// Serves pre-fetched battle documents from a cache directory.
pub struct FsBattleSource {
    cache_dir: PathBuf,
}

impl FsBattleSource {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Cache key for a battle reference URL: saved reports key on their
    /// report id, related-kill pages on the last two path segments joined.
    pub fn cached_key(reference: &str) -> String {
        let segments: Vec<&str> = reference.trim_end_matches('/').split('/').collect();
        let last = segments.last().copied().unwrap_or_default();
        let second_to_last = segments
            .len()
            .checked_sub(2)
            .and_then(|i| segments.get(i))
            .copied()
            .unwrap_or_default();

        if reference.contains("composition") || second_to_last == "br" {
            last.split('?').next().unwrap_or_default().to_string()
        } else {
            format!("{second_to_last}_{last}")
        }
    }

    pub fn cache_path(&self, reference: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.json", Self::cached_key(reference)))
    }
}

impl BattleSource for FsBattleSource {
    fn load(&self, reference: &str) -> Result<RawBattle, Error> {
        let raw = std::fs::read_to_string(self.cache_path(reference))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Converts rendered ISK text to billions: `"12.5b"` -> 12.5, `"450m"` ->
/// 0.45, `"3.1k"` -> ~0.0000031. Unparseable text degrades to zero with a
/// warning rather than failing the battle.
pub fn convert_isk(text: &str) -> f64 {
    let text = text.trim();
    let parsed = if let Some(value) = text.strip_suffix('k') {
        value.parse::<f64>().map(|v| v / 1000.0 / 1000.0)
    } else if let Some(value) = text.strip_suffix('m') {
        value.parse::<f64>().map(|v| v / 1000.0)
    } else if let Some(value) = text.strip_suffix('b') {
        value.parse::<f64>()
    } else {
        text.parse::<f64>()
    };

    match parsed {
        Ok(value) => value,
        Err(_) => {
            warn!("Unparseable ISK value {text:?}, treating as 0");
            0.0
        }
    }
}

/// Parses a multiplicity marker like `"x3 lost"`; plain rows count once.
pub fn convert_multiple(text: Option<&str>) -> u32 {
    match text {
        Some(text) => text
            .replace("lost", "")
            .replace('x', "")
            .trim()
            .parse()
            .unwrap_or(1),
        None => 1,
    }
}

/// Killboard mirror links for the kill pages the report links out to.
pub fn convert_to_zkill(url: &str) -> String {
    url.replace("kb.evetools.org", "zkillboard.com")
}

/// Reads the static list of battle reference URLs, one per line, skipping
/// blanks and `#` comments.
pub fn read_reference_list(path: impl AsRef<Path>) -> Result<Vec<String>, Error> {
    let raw = std::fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
