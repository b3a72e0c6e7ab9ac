//! Faction labels and the allegiance resolver.
//!
//! Classification works off the curated [`WhoseWho`] document: static known /
//! suspected lists, with time-bounded side-switch intervals taking precedence
//! for the handful of entities that changed allegiance mid-war.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WhoseWho;

/// Faction classification attached to a battle side or a structure owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Hawks,
    Coalition,
    #[serde(rename = "Third Party")]
    ThirdParty,
    Neutral,
    #[serde(rename = "Not Involved")]
    NotInvolved,
    Unknown,
}

impl Team {
    pub fn label(self) -> &'static str {
        match self {
            Self::Hawks => "Hawks",
            Self::Coalition => "Coalition",
            Self::ThirdParty => "Third Party",
            Self::Neutral => "Neutral",
            Self::NotInvolved => "Not Involved",
            Self::Unknown => "Unknown",
        }
    }
}

impl WhoseWho {
    /// Classifies a name against the curated known lists, in fixed priority
    /// order: Hawks, Coalition, not involved, third party. Returns
    /// `Team::Unknown` when the name appears in none of them.
    pub fn known_team(&self, name: &str) -> Team {
        let name = name.to_string();
        if self.hawks.known.contains(&name) || self.hawks.null.contains(&name) {
            Team::Hawks
        } else if self.coalition.known.contains(&name) || self.coalition.null.contains(&name) {
            Team::Coalition
        } else if self.not_involved.contains(&name) || self.starter_corps.contains(&name) {
            Team::NotInvolved
        } else if self.third_party.contains(&name) {
            Team::ThirdParty
        } else {
            Team::Unknown
        }
    }

    /// Classifies a name checking the suspected lists first, falling back to
    /// [`WhoseWho::known_team`] when no suspicion is recorded.
    pub fn suspected_team(&self, name: &str) -> Team {
        let owned = name.to_string();
        if self.hawks.suspected.contains(&owned) {
            Team::Hawks
        } else if self.coalition.suspected.contains(&owned) {
            Team::Coalition
        } else {
            self.known_team(name)
        }
    }

    /// Resolves a side-switching entity's faction at a point in time.
    ///
    /// Returns the side of the first interval containing `date` (start
    /// inclusive, end exclusive), or `None` when the entity has no switch
    /// history or the date falls outside every interval. The sentinel cap on
    /// an entity's final interval is exclusive like any other end.
    pub fn which_team_for_switchers(&self, name: &str, date: DateTime<Utc>) -> Option<Team> {
        let switch_dates = self.side_switches.get(name)?;

        switch_dates.iter().find_map(|s| s.allegiance(date))
    }

    pub fn is_switcher(&self, name: &str) -> bool {
        self.switchers.iter().any(|s| s == name) || self.side_switches.contains_key(name)
    }
}
