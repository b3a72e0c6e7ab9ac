//! Team attribution: deciding which coalition a battle side fought for.
//!
//! Each participant is classified through the allegiance resolver, then the
//! side takes the majority of the known classifications. Structure ownership
//! is treated as the most reliable signal and overrides the vote outright.
//! Ambiguity is never raised: an unresolvable side is labeled
//! `Team::Unknown` and flagged, leaving the uncertainty visible downstream.

use chrono::{DateTime, Utc};
use tracing::{error, warn};

use crate::config::WhoseWho;
use crate::model::battle::Battle;
use crate::teams::Team;

/// One participant's resolved faction and whether it rests on the suspected
/// lists rather than confirmed knowledge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Classification {
    pub team: Team,
    pub suspected: bool,
}

/// Classifies one participant by its alliance name, falling back to the corp
/// name for unallied corps.
///
/// Side-switchers resolve by the battle date and take precedence over the
/// static lists; a switcher outside all its intervals is treated as an
/// ordinary name. A failed known pass retries via the suspected lists and
/// marks the result suspected.
pub fn classify_participant(
    whose_who: &WhoseWho,
    alliance: Option<&str>,
    corp: &str,
    date: DateTime<Utc>,
) -> Classification {
    let name = alliance.unwrap_or(corp);

    if whose_who.is_switcher(name) {
        if let Some(team) = whose_who.which_team_for_switchers(name, date) {
            return Classification {
                team,
                suspected: false,
            };
        }
    }

    let team = whose_who.known_team(name);
    if team != Team::Unknown {
        return Classification {
            team,
            suspected: false,
        };
    }

    Classification {
        team: whose_who.suspected_team(name),
        suspected: true,
    }
}

/// Accumulates per-participant classifications for one battle side and
/// resolves them into a single faction label.
#[derive(Debug, Default)]
pub struct SideVote {
    known: Vec<Team>,
    suspected: Vec<Team>,
    structure_owner: Option<Team>,
}

impl SideVote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one participant's classification. `Unknown` results carry no
    /// information and never enter the tallies.
    pub fn record(&mut self, classification: Classification) {
        if classification.team == Team::Unknown {
            return;
        }
        if classification.suspected {
            self.suspected.push(classification.team);
        } else {
            self.known.push(classification.team);
        }
    }

    /// Records the owner of a structure destroyed or observed on this side.
    /// Any owner resolving to a known faction decides the side outright, so
    /// the first non-`Unknown` owner sticks; `Unknown` owners and later
    /// recordings carry no additional information and are dropped.
    pub fn record_structure_owner(&mut self, team: Team) {
        if team == Team::Unknown {
            return;
        }
        self.structure_owner.get_or_insert(team);
    }

    /// Resolves the side label: structure ownership wins outright, then the
    /// mode of known classifications, then the mode of suspected ones. Ties
    /// break to the first-seen faction; this is an acknowledged arbitrary
    /// tie-break, not a semantic guarantee.
    ///
    /// Returns the label and whether the side should be flagged suspect.
    pub fn resolve(&self, side: &str, battle_id: &str) -> (Team, bool) {
        if let Some(owner) = self.structure_owner {
            return (owner, false);
        }

        if let Some(team) = mode_first_seen(&self.known) {
            return (team, false);
        }
        if let Some(team) = mode_first_seen(&self.suspected) {
            return (team, true);
        }

        warn!("No known or suspected team for side {side} of battle {battle_id}");
        (Team::Unknown, true)
    }
}

/// Most frequent entry, with ties broken by insertion order.
fn mode_first_seen(teams: &[Team]) -> Option<Team> {
    let mut best: Option<(Team, usize)> = None;
    for (idx, team) in teams.iter().enumerate() {
        let count = teams.iter().filter(|t| *t == team).count();
        let earlier = teams[..idx].contains(team);
        if !earlier {
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((*team, count)),
            }
        }
    }
    best.map(|(team, _)| team)
}

/// A battle must resolve to at most one side per faction. Two sides landing
/// on the same faction is a data or classification error; it is logged as an
/// invariant violation, never silently corrected.
pub fn check_side_factions(battle: &Battle) {
    for (idx, team) in battle.teams.iter().enumerate() {
        if team.team == Team::Unknown {
            continue;
        }
        for other in battle.teams.iter().skip(idx + 1) {
            if other.team == team.team {
                error!(
                    "Battle {} resolved sides {} and {} to the same faction {}",
                    battle.battle_identifier,
                    team.br_side,
                    other.br_side,
                    team.team.label()
                );
            }
        }
    }
}
