//! The process-wide aggregate root and entity registry.
//!
//! [`AllData`] owns the five deduplicated entity maps plus every parsed
//! battle and structure history. It is created once per run, threaded mutably
//! through each battle parse, and read-only for downstream reporting. Nothing
//! is ever removed from it.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::config::WhoseWho;
use crate::error::config::ConfigError;
use crate::model::battle::Battle;
use crate::model::eve::{Alliance, Corp, Pilot, Ship, System};
use crate::model::structure::StructureHistory;
use crate::teams::Team;

/// Entity categories tracked by the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Alliance,
    Corp,
    Pilot,
    Ship,
    System,
}

impl Category {
    /// Normalizes a category name: case-insensitive, trailing "s" stripped.
    /// Anything outside the five known categories is a configuration error.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let lowered = raw.to_lowercase();
        let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
        match singular {
            "alliance" => Ok(Self::Alliance),
            "corp" => Ok(Self::Corp),
            "pilot" => Ok(Self::Pilot),
            "ship" => Ok(Self::Ship),
            "system" => Ok(Self::System),
            _ => Err(ConfigError::InvalidCategory(raw.to_string())),
        }
    }
}

/// Read-only view over an entity of any category.
#[derive(Clone, Copy, Debug)]
pub enum EntityView<'a> {
    Alliance(&'a Alliance),
    Corp(&'a Corp),
    Pilot(&'a Pilot),
    Ship(&'a Ship),
    System(&'a System),
}

impl EntityView<'_> {
    pub fn name(&self) -> &str {
        match self {
            Self::Alliance(a) => &a.name,
            Self::Corp(c) => &c.name,
            Self::Pilot(p) => &p.name,
            Self::Ship(s) => &s.name,
            Self::System(s) => &s.name,
        }
    }

    pub fn id_num(&self) -> &str {
        match self {
            Self::Alliance(a) => &a.id_num,
            Self::Corp(c) => &c.id_num,
            Self::Pilot(p) => &p.id_num,
            Self::Ship(s) => &s.id_num,
            Self::System(s) => &s.id_num,
        }
    }
}

/// One row of the derived per-system structure ownership view.
#[derive(Clone, Debug, Serialize)]
pub struct SystemOwner {
    pub system: String,
    pub structure_type: String,
    pub team: Team,
    pub corp: String,
    pub alliance: Option<String>,
    pub dates: Vec<String>,
}

/// The running database for one aggregation run.
#[derive(Clone, Debug)]
pub struct AllData {
    pub alliances: BTreeMap<String, Alliance>,
    pub corps: BTreeMap<String, Corp>,
    pub pilots: BTreeMap<String, Pilot>,
    pub ships: BTreeMap<String, Ship>,
    pub systems: BTreeMap<String, System>,
    pub battles: BTreeMap<String, Battle>,
    pub structures: BTreeMap<String, StructureHistory>,
    /// Earliest battle start seen so far.
    pub start_date: DateTime<Utc>,
    /// Latest battle end seen so far.
    pub end_date: DateTime<Utc>,
}

impl Default for AllData {
    fn default() -> Self {
        Self {
            alliances: BTreeMap::new(),
            corps: BTreeMap::new(),
            pilots: BTreeMap::new(),
            ships: BTreeMap::new(),
            systems: BTreeMap::new(),
            battles: BTreeMap::new(),
            structures: BTreeMap::new(),
            start_date: Utc.with_ymd_and_hms(2999, 12, 31, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap(),
        }
    }
}

impl AllData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entity of the given name exists in the category.
    pub fn has(&self, name: &str, category: &str) -> Result<bool, ConfigError> {
        Ok(self.find(name, category)?.is_some())
    }

    /// Exact-name lookup within one category.
    pub fn find(&self, name: &str, category: &str) -> Result<Option<EntityView<'_>>, ConfigError> {
        Ok(match Category::parse(category)? {
            Category::Alliance => self.alliances.get(name).map(EntityView::Alliance),
            Category::Corp => self.corps.get(name).map(EntityView::Corp),
            Category::Pilot => self.pilots.get(name).map(EntityView::Pilot),
            Category::Ship => self.ships.get(name).map(EntityView::Ship),
            Category::System => self.systems.get(name).map(EntityView::System),
        })
    }

    /// Registers a ship on first encounter; adds are idempotent, a second
    /// add of the same name returns the existing entity unchanged.
    pub fn add_ship(&mut self, name: &str, image_link: Option<&str>) -> &mut Ship {
        if self.ships.contains_key(name) {
            warn!("{name} already found in all_data.ships");
        }
        self.ships
            .entry(name.to_string())
            .or_insert_with(|| Ship {
                name: name.to_string(),
                image_link: image_link.map(str::to_string),
                id_num: id_from_link(image_link),
                seen_in: Default::default(),
            })
    }

    pub fn add_pilot(&mut self, name: &str, zkill_link: Option<&str>) -> &mut Pilot {
        if self.pilots.contains_key(name) {
            warn!("{name} already found in all_data.pilots");
        }
        self.pilots
            .entry(name.to_string())
            .or_insert_with(|| Pilot {
                name: name.to_string(),
                image_link: zkill_link.map(str::to_string),
                id_num: id_from_link(zkill_link),
                seen_in: Default::default(),
                corp: None,
                alliance: None,
                zkill_link: zkill_link.map(str::to_string),
                podded_in: Default::default(),
                ships: Default::default(),
            })
    }

    pub fn add_corp(
        &mut self,
        name: &str,
        image_link: Option<&str>,
        alliance: Option<&str>,
    ) -> &mut Corp {
        if self.corps.contains_key(name) {
            warn!("{name} already found in all_data.corps");
        }
        self.corps
            .entry(name.to_string())
            .or_insert_with(|| Corp {
                name: name.to_string(),
                image_link: image_link.map(str::to_string),
                id_num: id_from_link(image_link),
                seen_in: Default::default(),
                alliance: alliance.map(str::to_string),
                members: Default::default(),
                ships: Default::default(),
                pilots_per_battle: Default::default(),
                structures: Default::default(),
            })
    }

    pub fn add_alliance(&mut self, name: &str, image_link: Option<&str>) -> &mut Alliance {
        if self.alliances.contains_key(name) {
            warn!("{name} already found in all_data.alliances");
        }
        self.alliances
            .entry(name.to_string())
            .or_insert_with(|| Alliance {
                name: name.to_string(),
                image_link: image_link.map(str::to_string),
                id_num: id_from_link(image_link),
                seen_in: Default::default(),
                corps: Default::default(),
                members: Default::default(),
                structures: Default::default(),
            })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_system(
        &mut self,
        name: &str,
        id_num: &str,
        region: Option<&str>,
        constellation: Option<&str>,
        weather: crate::model::eve::Weather,
        j_class_number: u32,
        statics: Vec<String>,
    ) -> &mut System {
        if self.systems.contains_key(name) {
            warn!("{name} already found in all_data.systems");
        }
        self.systems
            .entry(name.to_string())
            .or_insert_with(|| System {
                name: name.to_string(),
                image_link: None,
                id_num: id_num.to_string(),
                seen_in: Default::default(),
                region: region.map(str::to_string),
                constellation: constellation.map(str::to_string),
                weather: Some(weather),
                j_class_number,
                statics,
            })
    }

    /// Derived per-system structure ownership view for reporting. The curated
    /// per-faction systems lists override the recorded owner for systems a
    /// coalition is understood to hold outright.
    pub fn station_owners(&self, whose_who: &WhoseWho) -> BTreeMap<String, Vec<SystemOwner>> {
        let mut output: BTreeMap<String, Vec<SystemOwner>> = BTreeMap::new();
        for structure in self.structures.values() {
            let mut team = structure.team;
            if whose_who.hawks.systems.contains(&structure.system) {
                team = Team::Hawks;
            }
            if whose_who.coalition.systems.contains(&structure.system) {
                team = Team::Coalition;
            }
            output
                .entry(structure.system.clone())
                .or_default()
                .push(SystemOwner {
                    system: structure.system.clone(),
                    structure_type: structure.structure_type.label().to_string(),
                    team,
                    corp: structure.corp.clone(),
                    alliance: structure.alliance.clone(),
                    dates: structure
                        .dates
                        .iter()
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .collect(),
                });
        }
        output
    }

    /// Dumps the full database as a derived JSON view. Exports are never
    /// round-tripped back in; the in-memory state is the source of truth.
    pub fn export(&self) -> serde_json::Value {
        json!({
            "alliances": self.alliances,
            "corps": self.corps,
            "pilots": self.pilots,
            "ships": self.ships,
            "systems": self.systems,
            "battles": self.battles,
            "structures": self.structures,
        })
    }
}

/// Best-effort entity id extraction from the trailing numeric path segment of
/// an image URL. Falls back to the sentinel `"0"` with a warning when no
/// digit segment is present; callers accept the lossy id rather than failing
/// the battle over a cosmetic URL change.
pub fn id_from_link(link: Option<&str>) -> String {
    if let Some(link) = link {
        for segment in link.trim_end_matches('/').rsplit('/') {
            let digits: String = segment.chars().take_while(|c| c.is_ascii_digit()).collect();
            if !digits.is_empty() {
                return digits;
            }
        }
    }

    warn!("No id number could be derived from image link {link:?}, using 0");
    "0".to_string()
}
