//! EVE Online entity models tracked across battles.
//!
//! Each entity category is keyed by exact name within the registry and only
//! ever mutated additively: counters increment, `seen_in` sets union, nothing
//! is deleted.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Per-system, per-structure-type sighting counters kept on corps and
/// alliances: `s` sightings, `d` destructions, `g` gunner entries.
pub type StructureSummary = BTreeMap<String, BTreeMap<String, StructureCounts>>;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct StructureCounts {
    pub sighted: u32,
    pub destroyed: u32,
    pub gunner: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pilot {
    pub name: String,
    pub image_link: Option<String>,
    pub id_num: String,
    pub seen_in: BTreeSet<String>,
    pub corp: Option<String>,
    pub alliance: Option<String>,
    pub zkill_link: Option<String>,
    /// Battles in which this pilot lost a pod.
    pub podded_in: BTreeSet<String>,
    /// Ship name -> number of appearances flying it.
    pub ships: BTreeMap<String, u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ship {
    pub name: String,
    pub image_link: Option<String>,
    pub id_num: String,
    pub seen_in: BTreeSet<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Corp {
    pub name: String,
    pub image_link: Option<String>,
    pub id_num: String,
    pub seen_in: BTreeSet<String>,
    pub alliance: Option<String>,
    /// Pilot name -> number of appearances under this corp.
    pub members: BTreeMap<String, u32>,
    /// Ship name -> number of appearances fielded by this corp.
    pub ships: BTreeMap<String, u32>,
    /// Battle id -> pilots this corp fielded in that battle.
    pub pilots_per_battle: BTreeMap<String, u32>,
    pub structures: StructureSummary,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alliance {
    pub name: String,
    pub image_link: Option<String>,
    pub id_num: String,
    pub seen_in: BTreeSet<String>,
    pub corps: BTreeSet<String>,
    /// Corp name -> number of appearances under this alliance.
    pub members: BTreeMap<String, u32>,
    pub structures: StructureSummary,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct System {
    pub name: String,
    pub image_link: Option<String>,
    pub id_num: String,
    pub seen_in: BTreeSet<String>,
    pub region: Option<String>,
    pub constellation: Option<String>,
    pub weather: Option<Weather>,
    /// Wormhole class number, 0 for known space.
    pub j_class_number: u32,
    /// Static wormhole connections, e.g. `["C3", "HS"]`.
    pub statics: Vec<String>,
}

/// Wormhole system weather effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Pulsar,
    #[serde(rename = "Black Hole")]
    BlackHole,
    #[serde(rename = "Cataclysmic Variable")]
    CataclysmicVariable,
    Magnetar,
    #[serde(rename = "Red Giant")]
    RedGiant,
    #[serde(rename = "Wolf-Rayet Star")]
    WolfRayet,
    Vanilla,
}

impl Weather {
    /// Maps SDE weather names to the enum, defaulting to `Vanilla` for
    /// unrecognized or absent values.
    pub fn from_sde(value: Option<&str>) -> Self {
        match value {
            Some("Pulsar") => Self::Pulsar,
            Some("Black Hole") => Self::BlackHole,
            Some("Cataclysmic Variable") => Self::CataclysmicVariable,
            Some("Magnetar") => Self::Magnetar,
            Some("Red Giant") => Self::RedGiant,
            Some("Wolf-Rayet Star") => Self::WolfRayet,
            _ => Self::Vanilla,
        }
    }
}

/// Deployable structure types recognized in participant rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    Astrahus,
    Fortizar,
    Keepstar,
    Athanor,
    Tatara,
    Raitaru,
    Azbel,
    Sotiyo,
    #[serde(rename = "Control Tower")]
    ControlTower,
    #[serde(rename = "Customs Office")]
    CustomsOffice,
    Unknown,
}

impl StructureType {
    /// Exact structure type names; control towers and customs offices come in
    /// faction-prefixed variants and are matched by substring instead.
    pub fn from_exact_name(name: &str) -> Option<Self> {
        match name {
            "Astrahus" => Some(Self::Astrahus),
            "Fortizar" => Some(Self::Fortizar),
            "Keepstar" => Some(Self::Keepstar),
            "Athanor" => Some(Self::Athanor),
            "Tatara" => Some(Self::Tatara),
            "Raitaru" => Some(Self::Raitaru),
            "Azbel" => Some(Self::Azbel),
            "Sotiyo" => Some(Self::Sotiyo),
            _ => None,
        }
    }

    /// Large structures run three defense timers (shield, armor, hull);
    /// everything else runs two.
    pub fn is_large(self) -> bool {
        matches!(
            self,
            Self::Fortizar | Self::Keepstar | Self::Sotiyo | Self::Tatara
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Astrahus => "Astrahus",
            Self::Fortizar => "Fortizar",
            Self::Keepstar => "Keepstar",
            Self::Athanor => "Athanor",
            Self::Tatara => "Tatara",
            Self::Raitaru => "Raitaru",
            Self::Azbel => "Azbel",
            Self::Sotiyo => "Sotiyo",
            Self::ControlTower => "Control Tower",
            Self::CustomsOffice => "Customs Office",
            Self::Unknown => "Unknown",
        }
    }
}
