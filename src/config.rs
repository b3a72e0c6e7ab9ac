//! Allegiance configuration for the Hawks/Coalition war.
//!
//! The curated "whose who" document is an external input: it records which
//! corporations and alliances are known or suspected to fight for each
//! coalition, which are bystanders, and the hand-maintained time-bounded
//! side-switch intervals. It is loaded once at startup and passed by
//! reference into the resolver and attribution components; there is no
//! ambient global copy. The document's correctness is not validated here.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error::config::ConfigError;
use crate::teams::Team;

/// One time-bounded override of an entity's faction.
///
/// Intervals for a given entity must not overlap; the resolver's first-match
/// lookup assumes this and does not validate it.
#[derive(Clone, Debug, Deserialize)]
pub struct SideSwitch {
    pub side: Team,
    #[serde(default = "beginning_of_time")]
    pub start: DateTime<Utc>,
    #[serde(default = "end_of_time")]
    pub end: DateTime<Utc>,
}

impl SideSwitch {
    /// Returns the allegiance if `at` falls inside the interval, start
    /// inclusive and end exclusive. `None` otherwise.
    pub fn allegiance(&self, at: DateTime<Utc>) -> Option<Team> {
        if self.start <= at && at < self.end {
            return Some(self.side);
        }
        None
    }
}

fn beginning_of_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap()
}

fn end_of_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2999, 12, 31, 0, 0, 0).unwrap()
}

/// Known / suspected membership lists for one coalition, plus the systems it
/// is understood to hold.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FactionLists {
    #[serde(rename = "Known", default)]
    pub known: Vec<String>,
    #[serde(rename = "Null", default)]
    pub null: Vec<String>,
    #[serde(rename = "Suspected", default)]
    pub suspected: Vec<String>,
    #[serde(rename = "Systems", default)]
    pub systems: Vec<String>,
}

/// The curated allegiance document.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WhoseWho {
    /// Corps seen in battles but not part of the war.
    #[serde(rename = "Not Involved", default)]
    pub not_involved: Vec<String>,
    /// NPC starter corps, treated the same as not involved.
    #[serde(rename = "Starter Corps", default)]
    pub starter_corps: Vec<String>,
    /// Abandoned-structure owners with no stake in the war.
    #[serde(rename = "Just Trash", default)]
    pub just_station_trash: Vec<String>,
    #[serde(rename = "Hawks", default)]
    pub hawks: FactionLists,
    #[serde(rename = "Coalition", default)]
    pub coalition: FactionLists,
    /// Opportunistic groups fighting both sides.
    #[serde(rename = "Third Party", default)]
    pub third_party: Vec<String>,
    /// Entities known to have changed allegiance; details in `side_switches`.
    #[serde(rename = "Switcher", default)]
    pub switchers: Vec<String>,
    #[serde(rename = "Side Switches", default)]
    pub side_switches: BTreeMap<String, Vec<SideSwitch>>,
}

impl WhoseWho {
    /// Loads the allegiance document from a JSON file. Malformed documents
    /// are fatal: there is no reasonable default for the war's roster.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::UnreadableDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::MalformedDocument(e.to_string()))
    }

    pub fn all_hawks(&self) -> Vec<&str> {
        self.hawks
            .known
            .iter()
            .chain(&self.hawks.null)
            .chain(&self.hawks.suspected)
            .map(String::as_str)
            .collect()
    }

    pub fn all_coalition(&self) -> Vec<&str> {
        self.coalition
            .known
            .iter()
            .chain(&self.coalition.null)
            .chain(&self.coalition.suspected)
            .map(String::as_str)
            .collect()
    }

    pub fn all_not_involved(&self) -> Vec<&str> {
        self.not_involved
            .iter()
            .chain(&self.starter_corps)
            .map(String::as_str)
            .collect()
    }

    pub fn all_known(&self) -> Vec<&str> {
        self.all_hawks()
            .into_iter()
            .chain(self.all_coalition())
            .chain(self.not_involved.iter().map(String::as_str))
            .chain(self.third_party.iter().map(String::as_str))
            .chain(self.just_station_trash.iter().map(String::as_str))
            .collect()
    }
}

/// Static-data lookups sourced from the EVE SDE: per-system weather effects
/// and wormhole statics, keyed by system id and system name respectively.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SdeData {
    #[serde(default)]
    pub system_weather: BTreeMap<String, String>,
    #[serde(default)]
    pub jspace_statics: BTreeMap<String, Vec<String>>,
}

impl SdeData {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::UnreadableDocument {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| ConfigError::MalformedDocument(e.to_string()))
    }

    pub fn weather_for(&self, system_id: &str) -> Option<&str> {
        self.system_weather.get(system_id).map(String::as_str)
    }

    pub fn statics_for(&self, system_name: &str) -> Vec<String> {
        self.jspace_statics
            .get(system_name)
            .cloned()
            .unwrap_or_default()
    }
}
