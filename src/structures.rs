//! Structure event tracking across battles.
//!
//! Participant rows whose ship is actually a deployable structure are folded
//! into cross-battle [`StructureHistory`] records. A row for a pilot manning
//! the structure's guns is a gunner entry: it bumps per-entity gunner
//! counters but never creates or updates a history record.

use chrono::{DateTime, Utc};

use crate::model::eve::{StructureCounts, StructureSummary, StructureType};
use crate::model::structure::{estimate_timers, StructureHistory};
use crate::registry::AllData;
use crate::teams::Team;

/// Whether a participant's "ship" name denotes a structure: an exact
/// structure type name, or the control-tower / customs-office variants that
/// carry a faction prefix.
pub fn is_structure(name: &str) -> bool {
    StructureType::from_exact_name(name).is_some()
        || name.contains("Control Tower")
        || name.contains("Customs Office")
}

pub fn structure_type(name: &str) -> StructureType {
    if let Some(exact) = StructureType::from_exact_name(name) {
        return exact;
    }
    if name.contains("Control Tower") {
        StructureType::ControlTower
    } else if name.contains("Customs Office") {
        StructureType::CustomsOffice
    } else {
        StructureType::Unknown
    }
}

/// Composite cross-battle identity of a structure. The same type owned by
/// the same corp in the same system is the same structure; an unallied owner
/// contributes a zero alliance segment.
pub fn structure_history_id(
    system_id: &str,
    ship_id: &str,
    corp_id: &str,
    alliance_id: Option<&str>,
) -> String {
    format!(
        "{system_id}-{ship_id}-{corp_id}-{}",
        alliance_id.unwrap_or("0")
    )
}

/// One non-gunner structure sighting, ready to be folded into the history map.
#[derive(Clone, Debug)]
pub struct StructureSighting<'a> {
    pub history_id: String,
    pub structure_type: StructureType,
    pub system: &'a str,
    /// Owner as attributed from the corp/alliance on this sighting. Only
    /// consulted when the sighting creates the record.
    pub team: Team,
    pub alliance: Option<&'a str>,
    pub corp: &'a str,
    pub zkill_link: Option<&'a str>,
    pub date: DateTime<Utc>,
    pub loss_value: f64,
    pub multiple_lost: u32,
}

/// Looks up or creates the structure's history record and accumulates this
/// sighting: the date list and battle id set grow, the multiplicity keeps
/// its running max. The owning team, destruction value, and estimated timers
/// are fixed by the first sighting and never revised.
pub fn note_structure_event(
    all_data: &mut AllData,
    sighting: StructureSighting<'_>,
    battle_id: &str,
) -> String {
    let history_id = sighting.history_id.clone();

    let structure = all_data
        .structures
        .entry(history_id.clone())
        .or_insert_with(|| new_history(&sighting));

    structure.br_ids.insert(battle_id.to_string());
    if sighting.multiple_lost > structure.multiple_in_system {
        structure.multiple_in_system = sighting.multiple_lost;
    }
    structure.dates.push(sighting.date);

    history_id
}

fn new_history(sighting: &StructureSighting<'_>) -> StructureHistory {
    let is_large = sighting.structure_type.is_large();
    let destroyed = sighting.loss_value > 0.0;

    let mut history = StructureHistory {
        id_number: sighting.history_id.clone(),
        name: None,
        structure_type: sighting.structure_type,
        is_large,
        system: sighting.system.to_string(),
        team: sighting.team,
        alliance: sighting.alliance.map(str::to_string),
        corp: sighting.corp.to_string(),
        dates: Vec::new(),
        value: sighting.loss_value,
        zkill_link: sighting.zkill_link.map(str::to_string),
        multiple_in_system: sighting.multiple_lost,
        shield_attacked_on: None,
        armor_attacked_on: None,
        hull_attacked_on: None,
        estimated_timers: estimate_timers(
            sighting.structure_type,
            sighting.loss_value,
            sighting.date,
        ),
        br_ids: Default::default(),
    };

    if destroyed {
        if is_large {
            history.hull_attacked_on = Some(sighting.date);
        } else {
            history.armor_attacked_on = Some(sighting.date);
        }
    }

    history
}

/// Bumps the per-system, per-type counters a corp or alliance keeps about
/// its structures.
pub fn record_structure_counts(
    summary: &mut StructureSummary,
    system: &str,
    structure_type: StructureType,
    is_gunner: bool,
    destroyed: bool,
) {
    let counts: &mut StructureCounts = summary
        .entry(system.to_string())
        .or_default()
        .entry(structure_type.label().to_string())
        .or_default();

    if is_gunner {
        counts.gunner += 1;
    } else {
        counts.sighted += 1;
    }
    if destroyed {
        counts.destroyed += 1;
    }
}
