//! Cross-battle structure identity and decay-timer estimation.
//!
//! Structures survive multiple encounters before dying, so sightings from
//! separate battle reports are folded into one [`StructureHistory`] record.
//! When a sighting carries no confirmed destruction it is a timer reference:
//! the remaining defense-layer timers are estimated from fixed reinforcement
//! offsets. Estimates are advisory. When the observed layer is ambiguous,
//! several overlapping guesses are attached and downstream consumers are
//! expected to present them as a set of possibilities.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Serialize, Serializer};

use crate::model::eve::StructureType;
use crate::teams::Team;

/// Defense layer a timer event was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HpLayer {
    Shield,
    Armor,
    Hull,
}

/// A deployable structure's accumulated sighting history, keyed by the
/// composite id `system-shiptype-corp-alliance`.
#[derive(Clone, Debug, Serialize)]
pub struct StructureHistory {
    pub id_number: String,
    pub name: Option<String>,
    pub structure_type: StructureType,
    pub is_large: bool,
    pub system: String,
    /// Owning faction, fixed at first sighting. Structures are rarely handed
    /// over; conflicting later sightings are more likely parsing noise than a
    /// real transfer, so the owner is never revised.
    pub team: Team,
    pub alliance: Option<String>,
    pub corp: String,
    pub dates: Vec<DateTime<Utc>>,
    pub value: f64,
    pub zkill_link: Option<String>,
    /// Highest "xN lost" multiplicity seen in any single sighting.
    pub multiple_in_system: u32,
    pub shield_attacked_on: Option<DateTime<Utc>>,
    pub armor_attacked_on: Option<DateTime<Utc>>,
    pub hull_attacked_on: Option<DateTime<Utc>>,
    pub estimated_timers: Vec<StructureTimer>,
    pub br_ids: BTreeSet<String>,
}

impl StructureHistory {
    /// Large structures die on the hull timer, everything else on armor.
    pub fn destroyed_on(&self) -> Option<DateTime<Utc>> {
        if self.is_large {
            self.hull_attacked_on
        } else {
            self.armor_attacked_on
        }
    }
}

/// One estimated reinforcement schedule for a structure.
///
/// Exactly one layer carries the directly observed time; the other layers
/// get windows computed from fixed offsets (medium structures reinforce
/// 2.5-3 days between layers, large structures 1-1.5 days shield to armor
/// and a further 2-3 days armor to hull).
#[derive(Clone, Debug, Default, Serialize)]
pub struct StructureTimer {
    pub believed_to_be: Option<String>,
    pub hull_attacked_on: Option<DateTime<Utc>>,
    pub armor_attacked_on: Option<DateTime<Utc>>,
    pub shield_attacked_on: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_range")]
    pub hull_attacked_within_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    #[serde(serialize_with = "serialize_range")]
    pub armor_attacked_within_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    #[serde(serialize_with = "serialize_range")]
    pub shield_attacked_within_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

fn serialize_range<S: Serializer>(
    range: &Option<(DateTime<Utc>, DateTime<Utc>)>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match range {
        Some((from, to)) => {
            serializer.serialize_str(&format!("{} - {}", from.to_rfc3339(), to.to_rfc3339()))
        }
        None => serializer.serialize_none(),
    }
}

impl StructureTimer {
    /// Builds the estimated schedule assuming the observed event hit the
    /// given layer of a medium (`medium = true`) or large structure.
    pub fn estimate(medium: bool, observed: DateTime<Utc>, layer: HpLayer) -> Self {
        let mut timer = Self::default();

        if medium {
            match layer {
                HpLayer::Shield => {
                    timer.believed_to_be = Some("medium - shield".to_string());
                    timer.shield_attacked_on = Some(observed);
                    timer.armor_attacked_within_range = Some((
                        observed + Duration::days(2) + Duration::hours(12),
                        observed + Duration::days(3),
                    ));
                }
                // Medium structures have no hull timer: armor and hull fall together.
                HpLayer::Armor | HpLayer::Hull => {
                    timer.believed_to_be = Some("medium - armor/hull".to_string());
                    timer.hull_attacked_on = Some(observed);
                    timer.armor_attacked_on = Some(observed);
                    timer.shield_attacked_within_range = Some((
                        observed - Duration::days(2) - Duration::hours(12),
                        observed - Duration::days(3),
                    ));
                }
            }
        } else {
            match layer {
                HpLayer::Shield => {
                    timer.believed_to_be = Some("large - shield".to_string());
                    timer.shield_attacked_on = Some(observed);
                    let armor = (
                        observed + Duration::days(1),
                        observed + Duration::days(1) + Duration::hours(12),
                    );
                    timer.armor_attacked_within_range = Some(armor);
                    timer.hull_attacked_within_range = Some((
                        armor.0 + Duration::days(2) + Duration::hours(1),
                        armor.1 + Duration::days(3),
                    ));
                }
                HpLayer::Armor => {
                    timer.believed_to_be = Some("large - armor".to_string());
                    timer.shield_attacked_within_range = Some((
                        observed - Duration::days(1),
                        observed - Duration::days(1) - Duration::hours(12),
                    ));
                    timer.armor_attacked_on = Some(observed);
                    timer.hull_attacked_within_range = Some((
                        observed + Duration::days(2) + Duration::hours(12),
                        observed + Duration::days(3),
                    ));
                }
                HpLayer::Hull => {
                    timer.believed_to_be = Some("large - hull".to_string());
                    timer.hull_attacked_on = Some(observed);
                    let armor = (
                        observed - Duration::days(2) - Duration::hours(12),
                        observed - Duration::days(3),
                    );
                    timer.armor_attacked_within_range = Some(armor);
                    timer.shield_attacked_within_range = Some((
                        armor.0 - Duration::days(1),
                        armor.1 - Duration::days(1) - Duration::hours(12),
                    ));
                }
            }
        }

        timer
    }
}

/// Produces the set of estimated schedules for one sighting.
///
/// A confirmed destruction pins the hull layer. A bare timer reference fans
/// out over the layers it could plausibly have been: large structures get an
/// armor and a shield guess, unknown types every guess, and medium types a
/// shield guess only.
pub fn estimate_timers(
    structure_type: StructureType,
    loss_value: f64,
    observed: DateTime<Utc>,
) -> Vec<StructureTimer> {
    let large = structure_type.is_large();

    if loss_value > 0.0 {
        return vec![StructureTimer::estimate(!large, observed, HpLayer::Hull)];
    }

    if large {
        vec![
            StructureTimer::estimate(false, observed, HpLayer::Armor),
            StructureTimer::estimate(false, observed, HpLayer::Shield),
        ]
    } else if structure_type == StructureType::Unknown {
        vec![
            StructureTimer::estimate(true, observed, HpLayer::Shield),
            StructureTimer::estimate(false, observed, HpLayer::Hull),
            StructureTimer::estimate(false, observed, HpLayer::Armor),
            StructureTimer::estimate(false, observed, HpLayer::Shield),
        ]
    } else {
        vec![StructureTimer::estimate(true, observed, HpLayer::Shield)]
    }
}
