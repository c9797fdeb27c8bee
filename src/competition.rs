//! Round-robin scheduling and standings for cups and leagues.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{Operation, TransitionError};
use crate::models::{is_bye, is_placeholder, Actor, Competition, Match};

/// Team names must be present, unique and not a reserved placeholder.
pub fn validate_roster(teams: &[String]) -> Result<(), TransitionError> {
    for (i, team) in teams.iter().enumerate() {
        if team.trim().is_empty() {
            return Err(TransitionError::malformed("team names cannot be blank"));
        }
        if is_placeholder(team) || is_bye(team) {
            return Err(TransitionError::malformed(format!(
                "`{}` is reserved and cannot be used as a team name",
                team
            )));
        }
        if teams[..i].contains(team) {
            return Err(TransitionError::malformed(format!(
                "team `{}` is entered twice",
                team
            )));
        }
    }
    Ok(())
}

/// Cleans up pre-registered cup rosters. Every key must be a participant and
/// every player name non-blank.
pub fn validate_rosters(
    teams: &[String],
    rosters: HashMap<String, Vec<String>>,
) -> Result<HashMap<String, Vec<String>>, TransitionError> {
    rosters
        .into_iter()
        .map(|(team, players)| {
            if !teams.contains(&team) {
                return Err(TransitionError::malformed(format!(
                    "roster given for `{}`, which is not taking part",
                    team
                )));
            }
            let players: Vec<String> = players.into_iter().map(|p| p.trim().to_string()).collect();
            if players.iter().any(|p| p.is_empty()) {
                return Err(TransitionError::malformed(format!(
                    "roster of `{}` contains a blank player",
                    team
                )));
            }
            Ok((team, players))
        })
        .collect()
}

/// Archived competitions stay readable but drop out of active listings.
pub fn set_archived(
    c: &mut Competition,
    archived: bool,
    actor: &Actor,
) -> Result<(), TransitionError> {
    if !actor.has_authority() {
        return Err(TransitionError::unauthorized(actor, Operation::Archive));
    }
    c.archived = archived;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub round: i32,
    pub team_a: String,
    pub team_b: String,
}

/// Circle-method schedule: every team meets every other team once. With an odd
/// number of teams one team rests each round.
pub fn round_robin(teams: &[String]) -> Result<Vec<Fixture>, TransitionError> {
    validate_roster(teams)?;
    if teams.len() < 2 {
        return Err(TransitionError::malformed(
            "a round robin needs at least two teams",
        ));
    }

    let mut circle: Vec<Option<&String>> = teams.iter().map(Some).collect();
    if circle.len() % 2 != 0 {
        circle.push(None);
    }
    let n = circle.len();
    let mut fixtures = Vec::with_capacity(teams.len() * (teams.len() - 1) / 2);
    for round in 0..n - 1 {
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (circle[i], circle[n - 1 - i]) {
                fixtures.push(Fixture {
                    round: round as i32 + 1,
                    team_a: a.clone(),
                    team_b: b.clone(),
                });
            }
        }
        // first seat stays put, everyone else rotates one seat
        circle[1..].rotate_right(1);
    }
    Ok(fixtures)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub drawn: u32,
    pub own_score: i64,
    pub opp_score: i64,
}

/// Table over finished matches, highest own score first. Match outcomes are
/// decided on map-wins; teams outside `participants` are ignored.
pub fn standings<'a>(
    participants: &[String],
    matches: impl IntoIterator<Item = &'a Match>,
) -> Vec<Standing> {
    let mut table: Vec<Standing> = participants
        .iter()
        .map(|team| Standing {
            team: team.clone(),
            ..Standing::default()
        })
        .collect();

    for m in matches.into_iter().filter(|m| m.state.is_finished()) {
        let (wins_a, wins_b) = m.map_wins();
        let total_a: i64 = m.scores_a.iter().map(|s| *s as i64).sum();
        let total_b: i64 = m.scores_b.iter().map(|s| *s as i64).sum();
        for (team, own, opp, wins, losses) in [
            (&m.team_a, total_a, total_b, wins_a, wins_b),
            (&m.team_b, total_b, total_a, wins_b, wins_a),
        ] {
            let Some(row) = table.iter_mut().find(|row| &row.team == team) else {
                continue;
            };
            row.played += 1;
            row.own_score += own;
            row.opp_score += opp;
            match wins.cmp(&losses) {
                std::cmp::Ordering::Greater => row.won += 1,
                std::cmp::Ordering::Less => row.lost += 1,
                std::cmp::Ordering::Equal => row.drawn += 1,
            }
        }
    }

    table.sort_by(|a, b| b.own_score.cmp(&a.own_score));
    table
}
