//! Battle records produced by the parser.
//!
//! A [`Battle`] is immutable once constructed and is inserted into the
//! database exactly once, keyed by its identifier. Team side labels are set
//! a single time at parse time by team attribution and never re-evaluated.

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

use crate::model::eve::StructureType;
use crate::teams::Team;

/// One combat encounter, as reported by a battle report page.
#[derive(Clone, Debug, Serialize)]
pub struct Battle {
    pub battle_identifier: String,
    pub br_link: String,
    pub time_data: BattleTime,
    /// Name of the system the battle took place in; the full entity lives in
    /// the registry.
    pub system: String,
    pub teams: Vec<TeamReport>,
    pub totals: BattleTotals,
    /// Raw source payload, retained opaque for downstream re-derivation.
    pub raw_json: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BattleTime {
    pub started: DateTime<Utc>,
    #[serde(serialize_with = "serialize_duration")]
    pub duration: Duration,
    pub ended: DateTime<Utc>,
}

impl BattleTime {
    /// Date key used to group battles per day in downstream reports.
    pub fn start_key(&self) -> String {
        self.started.format("%Y-%m-%d").to_string()
    }
}

/// Humanizes a duration as `"2h 15m"` / `"45m"` / `"0"`.
fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let mut seconds = duration.num_seconds();
    let mut hours = String::new();
    if seconds > 3600 {
        hours = format!("{}h", seconds / 3600);
        seconds %= 3600;
    }
    let mins = seconds / 60;

    if seconds == 0 || (mins == 0 && hours.is_empty()) {
        return serializer.serialize_str("0");
    }
    serializer.serialize_str(format!("{hours} {mins}m").trim())
}

/// Loss totals for one battle side.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct TeamResults {
    pub isk_lost: f64,
    pub ships_lost: u32,
    pub total_pilots: u32,
}

impl TeamResults {
    pub fn increase(&mut self, loss_value: f64) {
        self.total_pilots += 1;
        if loss_value > 0.0 {
            self.isk_lost += loss_value;
            self.ships_lost += 1;
        }
    }
}

/// Totals across both sides of a battle.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct BattleTotals {
    pub pilots: u32,
    pub isk_lost: f64,
    pub killmails: u32,
    pub ships_lost: u32,
    pub ships: Option<u32>,
    pub ship_types: Option<u32>,
    pub groups: Option<u32>,
}

/// One participant row on a battle side, reduced to registry keys.
#[derive(Clone, Debug, Serialize)]
pub struct ParticipantEntry {
    pub pilot: Option<String>,
    pub ship: String,
    pub corp: String,
    pub alliance: Option<String>,
}

/// A structure's appearance on a battle side, either its own kill/sighting
/// entry or a gunner entry for the pilot manning it.
#[derive(Clone, Debug, Serialize)]
pub struct StructureEntry {
    pub name: String,
    pub id_num: String,
    pub image_link: Option<String>,
    pub structure_type: StructureType,
    /// Key into the cross-battle structure history map; gunner entries carry
    /// no history id.
    pub structure_history_id: Option<String>,
    pub destroyed_here: bool,
    pub loss_value: f64,
    pub is_gunner_entry: bool,
    pub gunner_name: Option<String>,
    pub gunner_corp: Option<String>,
    pub gunner_alliance: Option<String>,
    pub multiple_killed: u32,
}

/// One side of a battle. The `team` label is final once attribution has run.
#[derive(Clone, Debug, Serialize)]
pub struct TeamReport {
    /// Side letter from the report ("A", "B", ...).
    pub br_side: String,
    pub team: Team,
    /// Set when the side's classification rested on suspected lists only.
    pub suspect: bool,
    pub participants: Vec<ParticipantEntry>,
    pub structures: Vec<StructureEntry>,
    pub km_links: Vec<String>,
    pub pilots_podded: Vec<String>,
    pub structure_history_ids: Vec<String>,
    pub totals: TeamResults,
    pub structure_destroyed: bool,
}

impl TeamReport {
    pub fn new(br_side: impl Into<String>, totals: TeamResults) -> Self {
        Self {
            br_side: br_side.into(),
            team: Team::Unknown,
            suspect: false,
            participants: Vec::new(),
            structures: Vec::new(),
            km_links: Vec::new(),
            pilots_podded: Vec::new(),
            structure_history_ids: Vec::new(),
            totals,
            structure_destroyed: false,
        }
    }

    pub fn pilots(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter_map(|p| p.pilot.as_deref())
            .collect()
    }

    pub fn corps(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.corp.as_str()).collect()
    }

    pub fn alliances(&self) -> Vec<&str> {
        self.participants
            .iter()
            .filter_map(|p| p.alliance.as_deref())
            .collect()
    }

    pub fn ships(&self) -> Vec<&str> {
        self.participants.iter().map(|p| p.ship.as_str()).collect()
    }

    pub fn structure_names(&self) -> Vec<&str> {
        self.structures.iter().map(|s| s.name.as_str()).collect()
    }
}
