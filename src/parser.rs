//! Battle parser: turns one raw battle document into an immutable
//! [`Battle`] record merged into the running database.
//!
//! Parsing is strictly sequential and stateful: whether a name counts as
//! "new" depends on what earlier battles already registered, so two parses of
//! the same document against differently pre-populated databases are not
//! guaranteed byte-identical. That is a property of the registry, not a bug.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Timelike, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::attribution::{check_side_factions, classify_participant, SideVote};
use crate::config::{SdeData, WhoseWho};
use crate::error::{parse::ParseError, Error};
use crate::model::battle::{
    Battle, BattleTime, BattleTotals, ParticipantEntry, StructureEntry, TeamReport, TeamResults,
};
use crate::model::eve::Weather;
use crate::registry::AllData;
use crate::source::{convert_isk, convert_multiple, convert_to_zkill, RawBattle, RawParticipant};
use crate::structures::{
    is_structure, note_structure_event, record_structure_counts, structure_history_id,
    structure_type, StructureSighting,
};

static DURATION_AND_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((Battle |)(D|d)uration: )((?P<hour>\d{0,2}h)|0|)( |)(?P<minutes>\d{0,2}m|)(,|) from (?P<start_hour>\d{2}):(?P<start_minute>\d{2}) to (?P<end_hour>\d{2}):(?P<end_minute>\d{2}) ET$",
    )
    .unwrap()
});

static SINGLE_KM_DURATION_AND_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Single killmail at (?P<start_hour>\d{2}):(?P<start_minute>\d{2})$").unwrap()
});

/// Parses the free-text battle timing against the two fixed grammars. The
/// single-killmail grammar applies when the marker phrase is present; either
/// way a failed match is fatal for this battle, no date means no timeline
/// placement.
pub fn parse_battle_time(timing_text: &str, base: DateTime<Utc>) -> Result<BattleTime, ParseError> {
    let unparseable = || ParseError::UnparseableTiming(timing_text.to_string());

    let (start_hour, start_minute, end_hour, end_minute, duration) =
        if timing_text.contains("Single killmail") {
            let caps = SINGLE_KM_DURATION_AND_TIME
                .captures(timing_text)
                .ok_or_else(unparseable)?;
            let start_hour: u32 = caps["start_hour"].parse().map_err(|_| unparseable())?;
            let start_minute: u32 = caps["start_minute"].parse().map_err(|_| unparseable())?;
            (start_hour, start_minute, start_hour, start_minute, Duration::zero())
        } else {
            let caps = DURATION_AND_TIME
                .captures(timing_text)
                .ok_or_else(unparseable)?;
            let hours: i64 = caps
                .name("hour")
                .map(|m| m.as_str().trim_end_matches('h'))
                .filter(|s| !s.is_empty())
                .map_or(Ok(0), str::parse)
                .map_err(|_| unparseable())?;
            let minutes: i64 = caps
                .name("minutes")
                .map(|m| m.as_str().trim_end_matches('m').trim())
                .filter(|s| !s.is_empty())
                .map_or(Ok(0), str::parse)
                .map_err(|_| unparseable())?;
            (
                caps["start_hour"].parse().map_err(|_| unparseable())?,
                caps["start_minute"].parse().map_err(|_| unparseable())?,
                caps["end_hour"].parse().map_err(|_| unparseable())?,
                caps["end_minute"].parse().map_err(|_| unparseable())?,
                Duration::hours(hours) + Duration::minutes(minutes),
            )
        };

    let started = base
        .with_hour(start_hour)
        .and_then(|d| d.with_minute(start_minute))
        .ok_or_else(unparseable)?;
    let ended = base
        .with_hour(end_hour)
        .and_then(|d| d.with_minute(end_minute))
        .ok_or_else(unparseable)?;

    Ok(BattleTime {
        started,
        duration,
        ended,
    })
}

/// Parses one raw battle document into the database.
///
/// Resolves or creates every referenced entity, runs team attribution per
/// side, folds structure sightings into their histories, and inserts the
/// finished battle keyed by its identifier. Re-parsing an identifier already
/// present is a no-op.
pub fn parse_battle(
    raw: &RawBattle,
    database: &mut AllData,
    whose_who: &WhoseWho,
    sde: &SdeData,
) -> Result<(), Error> {
    let battle_id = raw.battle_id.clone();
    if database.battles.contains_key(&battle_id) {
        warn!("Battle {battle_id} already parsed, skipping");
        return Ok(());
    }
    if raw.sides.is_empty() {
        return Err(ParseError::NoSides(battle_id).into());
    }

    let time_data = parse_battle_time(&raw.timing_text, raw.datetime)?;
    if time_data.started < database.start_date {
        database.start_date = time_data.started;
    }
    if time_data.ended > database.end_date {
        database.end_date = time_data.ended;
    }

    let system_name = resolve_system(raw, database, sde, &battle_id);

    let mut totals = BattleTotals {
        pilots: raw.totals.total_pilots,
        isk_lost: raw.totals.total_lost,
        killmails: raw.totals.kms_count,
        ships_lost: 0,
        ships: raw.totals.total_ships,
        ship_types: raw.totals.total_ship_types,
        groups: raw.totals.total_allys,
    };

    let mut teams = Vec::with_capacity(raw.sides.len());
    for side in &raw.sides {
        let side_totals = TeamResults {
            isk_lost: side.isk_lost_text.as_deref().map(convert_isk).unwrap_or(0.0),
            ships_lost: side.ships_lost,
            total_pilots: side.pilot_count,
        };
        let mut report = TeamReport::new(side.side.clone(), side_totals);
        let mut vote = SideVote::new();

        for participant in &side.participants {
            parse_participant(
                participant,
                database,
                whose_who,
                &mut report,
                &mut vote,
                &system_name,
                &battle_id,
                time_data.started,
            );
        }

        let (team, suspect) = vote.resolve(&side.side, &battle_id);
        report.team = team;
        report.suspect = suspect;
        totals.ships_lost += report.totals.ships_lost;
        teams.push(report);
    }

    let battle = Battle {
        battle_identifier: battle_id.clone(),
        br_link: raw.br_link.clone(),
        time_data,
        system: system_name,
        teams,
        totals,
        raw_json: raw.raw_json.clone(),
    };
    check_side_factions(&battle);

    info!(
        "Parsed battle {battle_id} in {} with {} sides",
        battle.system,
        battle.teams.len()
    );
    database.battles.insert(battle_id, battle);
    Ok(())
}

/// Resolves or creates the System entity and records provenance.
fn resolve_system(raw: &RawBattle, database: &mut AllData, sde: &SdeData, battle_id: &str) -> String {
    let raw_system = &raw.system;
    if !database.systems.contains_key(&raw_system.name) {
        let weather = Weather::from_sde(sde.weather_for(&raw_system.id));
        let statics = sde.statics_for(&raw_system.name);
        database.add_system(
            &raw_system.name,
            &raw_system.id,
            raw_system.region.as_deref(),
            raw_system.constellation.as_deref(),
            weather,
            raw_system.wh_class_id.unwrap_or(0),
            statics,
        );
    }

    let system = database
        .systems
        .get_mut(&raw_system.name)
        .expect("system registered above");
    system.seen_in.insert(battle_id.to_string());
    system.name.clone()
}

#[allow(clippy::too_many_arguments)]
fn parse_participant(
    participant: &RawParticipant,
    database: &mut AllData,
    whose_who: &WhoseWho,
    report: &mut TeamReport,
    vote: &mut SideVote,
    system_name: &str,
    battle_id: &str,
    battle_date: DateTime<Utc>,
) {
    let ship_name = participant.ship_name.as_str();
    let corp_name = participant.corp_name.as_str();
    let alliance_name = participant.alliance_name.as_deref();

    // Placeholder pilot cells (non-breaking space) mean the row has no pilot.
    let pilot_name = participant
        .pilot_name
        .as_deref()
        .filter(|name| !name.contains('\u{a0}'));

    let loss_value = participant
        .loss_value_text
        .as_deref()
        .map(convert_isk)
        .unwrap_or(0.0);
    let multiple_killed = if loss_value > 0.0 {
        convert_multiple(participant.multiple_text.as_deref())
    } else {
        1
    };

    let ship_id = {
        if !database.ships.contains_key(ship_name) {
            database.add_ship(ship_name, participant.ship_image.as_deref());
        }
        let ship = database.ships.get_mut(ship_name).expect("ship registered above");
        ship.seen_in.insert(battle_id.to_string());
        ship.id_num.clone()
    };

    if let Some(km_link) = participant.killmail_link.as_deref() {
        if km_link.contains("/kill/") {
            report.km_links.push(convert_to_zkill(km_link));
        }
    }

    let mut pilot_id = None;
    let mut pilot_link = None;
    if let Some(name) = pilot_name {
        let zkill = participant.pilot_link.as_deref().map(convert_to_zkill);
        if !database.pilots.contains_key(name) {
            database.add_pilot(name, zkill.as_deref());
        }
        let pilot = database.pilots.get_mut(name).expect("pilot registered above");
        pilot.corp = Some(corp_name.to_string());
        pilot.alliance = alliance_name.map(str::to_string);
        pilot.seen_in.insert(battle_id.to_string());
        *pilot.ships.entry(ship_name.to_string()).or_insert(0) += 1;
        pilot_id = Some(pilot.id_num.clone());
        pilot_link = pilot.zkill_link.clone();

        if let Some(pod_link) = participant.pod_link.as_deref() {
            pilot.podded_in.insert(battle_id.to_string());
            report.pilots_podded.push(name.to_string());
            report.km_links.push(convert_to_zkill(pod_link));
        }
    }

    let mut alliance_id = None;
    if let Some(name) = alliance_name {
        if !database.alliances.contains_key(name) {
            database.add_alliance(name, participant.alliance_image.as_deref());
        }
        let alliance = database
            .alliances
            .get_mut(name)
            .expect("alliance registered above");
        alliance.corps.insert(corp_name.to_string());
        alliance.seen_in.insert(battle_id.to_string());
        *alliance.members.entry(corp_name.to_string()).or_insert(0) += 1;
        alliance_id = Some(alliance.id_num.clone());
    }

    let corp_id = {
        if !database.corps.contains_key(corp_name) {
            database.add_corp(corp_name, participant.corp_image.as_deref(), alliance_name);
        }
        let corp = database.corps.get_mut(corp_name).expect("corp registered above");
        corp.seen_in.insert(battle_id.to_string());
        *corp.ships.entry(ship_name.to_string()).or_insert(0) += 1;
        if let Some(name) = pilot_name {
            *corp.members.entry(name.to_string()).or_insert(0) += 1;
            *corp
                .pilots_per_battle
                .entry(battle_id.to_string())
                .or_insert(0) += 1;
        }
        corp.id_num.clone()
    };

    vote.record(classify_participant(
        whose_who,
        alliance_name,
        corp_name,
        battle_date,
    ));

    report.participants.push(ParticipantEntry {
        pilot: pilot_name.map(str::to_string),
        ship: ship_name.to_string(),
        corp: corp_name.to_string(),
        alliance: alliance_name.map(str::to_string),
    });

    if is_structure(ship_name) {
        let owner = whose_who.known_team(alliance_name.unwrap_or(corp_name));
        vote.record_structure_owner(owner);

        let is_gunner = pilot_name.is_some_and(|name| name != ship_name);
        let kind = structure_type(ship_name);

        let mut history_id = None;
        if !is_gunner {
            let system_id = database
                .systems
                .get(system_name)
                .map(|s| s.id_num.clone())
                .unwrap_or_else(|| "0".to_string());
            let sighting = StructureSighting {
                history_id: structure_history_id(
                    &system_id,
                    &ship_id,
                    &corp_id,
                    alliance_id.as_deref(),
                ),
                structure_type: kind,
                system: system_name,
                team: owner,
                alliance: alliance_name,
                corp: corp_name,
                zkill_link: pilot_link.as_deref(),
                date: battle_date,
                loss_value,
                multiple_lost: multiple_killed,
            };
            let id = note_structure_event(database, sighting, battle_id);
            report.structure_history_ids.push(id.clone());
            history_id = Some(id);
        }

        report.structures.push(StructureEntry {
            name: if is_gunner {
                pilot_name.unwrap_or(ship_name).to_string()
            } else {
                ship_name.to_string()
            },
            id_num: if is_gunner {
                pilot_id.clone().unwrap_or_else(|| "0".to_string())
            } else {
                ship_id.clone()
            },
            image_link: participant.ship_image.clone(),
            structure_type: kind,
            structure_history_id: history_id,
            destroyed_here: loss_value > 0.0,
            loss_value,
            is_gunner_entry: is_gunner,
            gunner_name: is_gunner.then(|| pilot_name.unwrap_or_default().to_string()),
            gunner_corp: is_gunner.then(|| corp_name.to_string()),
            gunner_alliance: is_gunner.then(|| alliance_name.unwrap_or_default().to_string()),
            multiple_killed,
        });
        if loss_value > 0.0 {
            report.structure_destroyed = true;
        }

        let destroyed = loss_value > 0.0;
        if let Some(corp) = database.corps.get_mut(corp_name) {
            record_structure_counts(&mut corp.structures, system_name, kind, is_gunner, destroyed);
        }
        if let Some(name) = alliance_name {
            if let Some(alliance) = database.alliances.get_mut(name) {
                record_structure_counts(
                    &mut alliance.structures,
                    system_name,
                    kind,
                    is_gunner,
                    destroyed,
                );
            }
        }
    }
}
