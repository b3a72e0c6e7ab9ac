//! Shared fixtures for pipeline integration tests.

use chrono::{DateTime, TimeZone, Utc};

use brintel::config::{FactionLists, SideSwitch, WhoseWho};
use brintel::source::{RawBattle, RawParticipant, RawSide, RawSystem, RawTotals};
use brintel::teams::Team;

pub fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, d, 0, 0, 0).unwrap()
}

/// A small curated allegiance document covering both coalitions, a suspected
/// corp, a bystander, and one side-switcher.
pub fn war_config() -> WhoseWho {
    let mut whose_who = WhoseWho {
        hawks: FactionLists {
            known: vec!["Hawk Corp".to_string(), "Hawk Alliance".to_string()],
            suspected: vec!["Shifty Corp".to_string()],
            ..Default::default()
        },
        coalition: FactionLists {
            known: vec![
                "Coalition Corp".to_string(),
                "Coalition Alliance".to_string(),
            ],
            ..Default::default()
        },
        not_involved: vec!["Bystander Corp".to_string()],
        third_party: vec!["Opportunist Corp".to_string()],
        ..Default::default()
    };
    whose_who.switchers.push("Turncoat Corp".to_string());
    whose_who.side_switches.insert(
        "Turncoat Corp".to_string(),
        vec![
            SideSwitch {
                side: Team::Hawks,
                start: day(1),
                end: day(10),
            },
            SideSwitch {
                side: Team::Coalition,
                start: day(10),
                end: Utc.with_ymd_and_hms(2999, 12, 31, 0, 0, 0).unwrap(),
            },
        ],
    );
    whose_who
}

pub fn participant(
    pilot: &str,
    ship: &str,
    corp: &str,
    alliance: Option<&str>,
) -> RawParticipant {
    RawParticipant {
        ship_name: ship.to_string(),
        ship_image: Some(format!("https://img.evetools.org/types/1{}/icon", ship.len())),
        pilot_name: Some(pilot.to_string()),
        pilot_link: Some(format!("https://kb.evetools.org/character/9{}/", pilot.len())),
        corp_name: corp.to_string(),
        corp_image: Some(format!("https://img.evetools.org/corps/2{}/logo", corp.len())),
        alliance_name: alliance.map(str::to_string),
        alliance_image: alliance
            .map(|a| format!("https://img.evetools.org/alliances/3{}/logo", a.len())),
        ..Default::default()
    }
}

/// Marks the participant row as a confirmed loss worth `value_text` ISK.
pub fn destroyed(mut row: RawParticipant, value_text: &str) -> RawParticipant {
    row.loss_value_text = Some(value_text.to_string());
    row.killmail_link = Some("https://kb.evetools.org/kill/116900001/".to_string());
    row
}

pub fn side(letter: &str, participants: Vec<RawParticipant>) -> RawSide {
    RawSide {
        side: letter.to_string(),
        pilot_count: participants.len() as u32,
        isk_lost_text: Some("1.2b".to_string()),
        ships_lost: participants
            .iter()
            .filter(|p| p.loss_value_text.is_some())
            .count() as u32,
        participants,
    }
}

pub fn raw_battle(id: &str, on: DateTime<Utc>, sides: Vec<RawSide>) -> RawBattle {
    RawBattle {
        battle_id: id.to_string(),
        br_link: format!("https://br.evetools.org/br/{id}"),
        datetime: on,
        timing_text: "Battle duration: 1h 5m, from 19:00 to 20:05 ET".to_string(),
        system: RawSystem {
            name: "J123456".to_string(),
            id: "31002464".to_string(),
            region: Some("D-R00023".to_string()),
            constellation: None,
            wh_class_id: Some(5),
        },
        totals: RawTotals {
            total_pilots: sides.iter().map(|s| s.pilot_count).sum(),
            total_lost: 2.4,
            kms_count: 3,
            ..Default::default()
        },
        sides,
        raw_json: None,
    }
}
