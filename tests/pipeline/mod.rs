//! End-to-end pipeline scenarios: parse raw battle documents into the
//! database and check attribution, provenance, and structure accumulation.

use brintel::config::SdeData;
use brintel::parser::parse_battle;
use brintel::registry::AllData;
use brintel::teams::Team;

use crate::util::{day, destroyed, participant, raw_battle, side, war_config};

// Expect one Hawks side and one Coalition side when both rosters are known
#[test]
fn attributes_known_sides_without_unknowns() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side(
                "A",
                vec![
                    participant("Hawk One", "Drake", "Hawk Corp", Some("Hawk Alliance")),
                    participant("Hawk Two", "Ferox", "Hawk Corp", Some("Hawk Alliance")),
                ],
            ),
            side(
                "B",
                vec![
                    destroyed(
                        participant(
                            "Coalition One",
                            "Leshak",
                            "Coalition Corp",
                            Some("Coalition Alliance"),
                        ),
                        "1.2b",
                    ),
                    participant("Coalition Two", "Guardian", "Coalition Corp", None),
                ],
            ),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    let parsed = &database.battles["br-1"];
    let labels: Vec<Team> = parsed.teams.iter().map(|t| t.team).collect();
    assert_eq!(labels, vec![Team::Hawks, Team::Coalition]);
    assert!(parsed.teams.iter().all(|t| t.team != Team::Unknown));
    assert!(parsed.teams.iter().all(|t| !t.suspect));
}

#[test]
fn suspected_only_side_is_flagged() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side(
                "A",
                vec![participant("Sus Pilot", "Drake", "Shifty Corp", None)],
            ),
            side(
                "B",
                vec![participant(
                    "Coalition One",
                    "Leshak",
                    "Coalition Corp",
                    None,
                )],
            ),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    let parsed = &database.battles["br-1"];
    assert_eq!(parsed.teams[0].team, Team::Hawks);
    assert!(parsed.teams[0].suspect);
    assert_eq!(parsed.teams[1].team, Team::Coalition);
    assert!(!parsed.teams[1].suspect);
}

#[test]
fn switcher_side_resolves_by_battle_date() {
    let whose_who = war_config();
    let sde = SdeData::default();

    // Before the switch date the corp still fights for the Hawks
    let mut database = AllData::new();
    let before = raw_battle(
        "br-before",
        day(9),
        vec![
            side("A", vec![participant("Turncoat Pilot", "Drake", "Turncoat Corp", None)]),
            side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
        ],
    );
    parse_battle(&before, &mut database, &whose_who, &sde).unwrap();
    assert_eq!(database.battles["br-before"].teams[0].team, Team::Hawks);

    // On the switch boundary the new allegiance applies
    let mut database = AllData::new();
    let after = raw_battle(
        "br-after",
        day(10),
        vec![
            side("A", vec![participant("Turncoat Pilot", "Drake", "Turncoat Corp", None)]),
            side("B", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
        ],
    );
    parse_battle(&after, &mut database, &whose_who, &sde).unwrap();
    assert_eq!(database.battles["br-after"].teams[0].team, Team::Coalition);
}

#[test]
fn unknown_roster_side_stays_unknown() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side("A", vec![participant("Who Dis", "Drake", "Mystery Corp", None)]),
            side("B", vec![participant("Hawk One", "Ferox", "Hawk Corp", None)]),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    let parsed = &database.battles["br-1"];
    assert_eq!(parsed.teams[0].team, Team::Unknown);
    assert!(parsed.teams[0].suspect);
}

#[test]
fn seen_in_provenance_grows_across_battles() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    for (id, on) in [("br-1", day(2)), ("br-2", day(3))] {
        let battle = raw_battle(
            id,
            on,
            vec![
                side("A", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
                side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
            ],
        );
        parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();
    }

    // One entity per name, provenance unioned over both battles
    assert_eq!(database.pilots.len(), 2);
    assert_eq!(database.corps.len(), 2);
    assert_eq!(database.ships.len(), 2);
    assert_eq!(database.systems.len(), 1);

    let pilot = &database.pilots["Hawk One"];
    assert!(pilot.seen_in.contains("br-1"));
    assert!(pilot.seen_in.contains("br-2"));
    assert_eq!(pilot.ships["Drake"], 2);
    assert_eq!(database.corps["Hawk Corp"].pilots_per_battle["br-2"], 1);
    assert!(database.systems["J123456"].seen_in.contains("br-1"));
}

#[test]
fn reparsing_a_battle_is_a_no_op() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side("A", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
            side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();
    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    assert_eq!(database.battles.len(), 1);
    assert_eq!(database.pilots["Hawk One"].ships["Drake"], 1);
}

#[test]
fn timing_parse_failure_is_isolated_to_the_battle() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let mut bad = raw_battle(
        "br-bad",
        day(2),
        vec![
            side("A", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
            side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
        ],
    );
    bad.timing_text = "who knows when".to_string();

    assert!(parse_battle(&bad, &mut database, &whose_who, &sde).is_err());
    assert!(database.battles.is_empty());

    // The next battle still parses into the same database
    let good = raw_battle(
        "br-good",
        day(3),
        vec![
            side("A", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
            side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
        ],
    );
    parse_battle(&good, &mut database, &whose_who, &sde).unwrap();
    assert_eq!(database.battles.len(), 1);
}

#[test]
fn battle_window_tracks_min_and_max() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    for (id, on) in [("br-mid", day(5)), ("br-early", day(2)), ("br-late", day(20))] {
        let battle = raw_battle(
            id,
            on,
            vec![
                side("A", vec![participant("Hawk One", "Drake", "Hawk Corp", None)]),
                side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
            ],
        );
        parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();
    }

    assert_eq!(database.start_date.date_naive(), day(2).date_naive());
    assert_eq!(database.end_date.date_naive(), day(20).date_naive());
}

#[test]
fn structure_kill_overrides_side_vote_and_builds_history() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    // Defending side is mostly unknown corps, but the dying Astrahus belongs
    // to a known Hawks corp: ownership decides the side.
    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side(
                "A",
                vec![
                    participant("Who Dis", "Drake", "Mystery Corp", None),
                    destroyed(
                        participant("Astrahus", "Astrahus", "Hawk Corp", Some("Hawk Alliance")),
                        "2.1b",
                    ),
                ],
            ),
            side(
                "B",
                vec![participant("Coalition One", "Leshak", "Coalition Corp", None)],
            ),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    let parsed = &database.battles["br-1"];
    assert_eq!(parsed.teams[0].team, Team::Hawks);
    assert!(parsed.teams[0].structure_destroyed);
    assert_eq!(parsed.teams[0].structure_history_ids.len(), 1);

    let history = database
        .structures
        .get(&parsed.teams[0].structure_history_ids[0])
        .unwrap();
    assert_eq!(history.team, Team::Hawks);
    assert_eq!(history.corp, "Hawk Corp");
    assert!(history.br_ids.contains("br-1"));
    assert!(!history.is_large);
    assert_eq!(history.armor_attacked_on, Some(parsed.time_data.started));
}

#[test]
fn gunner_entry_does_not_touch_structure_history() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    // Pilot name differs from the structure name: a gunner manning the guns
    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side(
                "A",
                vec![participant("Gunner Greg", "Astrahus", "Hawk Corp", None)],
            ),
            side(
                "B",
                vec![participant("Coalition One", "Leshak", "Coalition Corp", None)],
            ),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    assert!(database.structures.is_empty());
    let parsed = &database.battles["br-1"];
    assert!(parsed.teams[0].structure_history_ids.is_empty());
    assert_eq!(parsed.teams[0].structures.len(), 1);
    assert!(parsed.teams[0].structures[0].is_gunner_entry);

    let counts = &database.corps["Hawk Corp"].structures["J123456"]["Astrahus"];
    assert_eq!(counts.gunner, 1);
    assert_eq!(counts.sighted, 0);
}

#[test]
fn repeat_structure_sightings_fold_into_one_history() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    // Same Astrahus/corp/system composite across two battles folds into a
    // single history record accumulating both sightings.
    for (id, on) in [("br-1", day(2)), ("br-2", day(6))] {
        let battle = raw_battle(
            id,
            on,
            vec![
                side(
                    "A",
                    vec![participant("Astrahus", "Astrahus", "Hawk Corp", None)],
                ),
                side(
                    "B",
                    vec![participant("Coalition One", "Leshak", "Coalition Corp", None)],
                ),
            ],
        );
        parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();
    }

    assert_eq!(database.structures.len(), 1);
    let history = database.structures.values().next().unwrap();
    assert_eq!(history.team, Team::Hawks);
    assert_eq!(history.dates.len(), 2);
    assert_eq!(history.br_ids.len(), 2);
}

#[test]
fn pod_kills_are_recorded_on_pilot_and_side() {
    let whose_who = war_config();
    let sde = SdeData::default();
    let mut database = AllData::new();

    let mut row = participant("Hawk One", "Drake", "Hawk Corp", None);
    row.pod_link = Some("https://kb.evetools.org/kill/116900002/".to_string());
    let battle = raw_battle(
        "br-1",
        day(2),
        vec![
            side("A", vec![row]),
            side("B", vec![participant("Coalition One", "Leshak", "Coalition Corp", None)]),
        ],
    );

    parse_battle(&battle, &mut database, &whose_who, &sde).unwrap();

    assert!(database.pilots["Hawk One"].podded_in.contains("br-1"));
    let parsed = &database.battles["br-1"];
    assert_eq!(parsed.teams[0].pilots_podded, vec!["Hawk One"]);
    assert!(parsed.teams[0]
        .km_links
        .iter()
        .any(|l| l.contains("zkillboard.com")));
}
