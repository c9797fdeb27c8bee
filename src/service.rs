//! Runs engine operations against a store, one transaction per operation.

use std::collections::HashMap;

use anyhow::anyhow;
use serde::Serialize;

use crate::bracket::{self, Advancement};
use crate::competition::{self, Standing};
use crate::error::{EngineError, Operation, TransitionError};
use crate::lineup;
use crate::lobby;
use crate::models::{
    Actor, Competition, CompetitionId, Match, MatchId, MatchKind, NewCompetition, NewMatch,
};
use crate::rules::{Rulebook, Ruleset};
use crate::scoring::{self, ScoreOutcome, ScoreSubmission};
use crate::state::Side;
use crate::store::{MatchStore, MatchTx};
use crate::veto;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub outcome: ScoreOutcome,
    /// Set when the result finished a bracket match.
    pub advancement: Option<Advancement>,
    pub updated: Match,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompetitionOverview {
    pub competition: Competition,
    pub matches: Vec<Match>,
}

pub struct MatchService<S> {
    store: S,
    rules: Rulebook,
}

impl<S: MatchStore> MatchService<S> {
    pub fn new(store: S, rules: Rulebook) -> MatchService<S> {
        MatchService { store, rules }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn get_match(&self, id: MatchId) -> Result<Match, EngineError> {
        let mut tx = self.store.begin().await?;
        load(&mut tx, id).await
    }

    pub async fn submit_map_selection(
        &self,
        id: MatchId,
        map_id: &str,
        actor: &Actor,
    ) -> Result<Match, EngineError> {
        let (state, m) = self
            .apply(id, |m, rules| veto::submit_map_selection(m, rules, map_id, actor))
            .await?;
        log::info!(
            "match {}: {} selected `{}`, now `{}`",
            id,
            actor.describe(),
            map_id.trim(),
            state
        );
        Ok(m)
    }

    /// Report or enter a result. A result that finishes a bracket match moves
    /// its winner on in the same transaction.
    pub async fn submit_scores(
        &self,
        id: MatchId,
        submission: ScoreSubmission,
        actor: &Actor,
    ) -> Result<ScoreReport, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut m = load(&mut tx, id).await?;
        let rules = *self.rules.get(m.kind);
        let outcome = scoring::submit_scores(&mut m, &rules, submission, actor)
            .map_err(|err| rejected(id, err))?;
        tx.save_match(&m).await?;

        let advancement = if outcome == ScoreOutcome::Committed && rules.advances_bracket {
            Some(advance_in(&mut tx, &m).await?)
        } else {
            None
        };
        tx.commit().await?;

        match outcome {
            ScoreOutcome::Conflict => {
                log::warn!("match {}: score reports disagree, staff must resolve", id)
            }
            _ => log::info!(
                "match {}: {} reported scores, outcome {:?}",
                id,
                actor.describe(),
                outcome
            ),
        }
        Ok(ScoreReport {
            outcome,
            advancement,
            updated: m,
        })
    }

    pub async fn confirm_lineup(&self, id: MatchId, actor: &Actor) -> Result<Match, EngineError> {
        let (state, m) = self
            .apply(id, |m, _| lineup::confirm_lineup(m, actor))
            .await?;
        log::info!("match {}: {} confirmed, now `{}`", id, actor.describe(), state);
        Ok(m)
    }

    pub async fn set_lineup(
        &self,
        id: MatchId,
        side: Side,
        players: Vec<String>,
        actor: &Actor,
    ) -> Result<Match, EngineError> {
        let (_, m) = self
            .apply(id, |m, _| lineup::set_lineup(m, side, players, actor))
            .await?;
        log::info!("match {}: lineup of side {:?} changed", id, side);
        Ok(m)
    }

    pub async fn check_in(
        &self,
        id: MatchId,
        confirmed_a: bool,
        confirmed_b: bool,
        actor: &Actor,
    ) -> Result<Match, EngineError> {
        let (_, m) = self
            .apply(id, |m, _| lineup::check_in(m, confirmed_a, confirmed_b, actor))
            .await?;
        Ok(m)
    }

    pub async fn set_lobby_code(
        &self,
        id: MatchId,
        code: &str,
        actor: &Actor,
    ) -> Result<Match, EngineError> {
        let (_, m) = self
            .apply(id, |m, _| lobby::set_lobby_code(m, code, actor))
            .await?;
        log::info!("match {}: lobby code updated by {}", id, actor.describe());
        Ok(m)
    }

    pub async fn set_cup_maps(
        &self,
        id: MatchId,
        maps: Vec<String>,
        actor: &Actor,
    ) -> Result<Match, EngineError> {
        let (_, m) = self
            .apply(id, |m, _| lobby::set_cup_maps(m, maps, actor))
            .await?;
        Ok(m)
    }

    /// Re-run advancement for a finished match, e.g. after staff corrected a tie.
    pub async fn advance_winner(&self, id: MatchId) -> Result<Advancement, EngineError> {
        let mut tx = self.store.begin().await?;
        let m = load(&mut tx, id).await?;
        let advancement = advance_in(&mut tx, &m).await?;
        tx.commit().await?;
        Ok(advancement)
    }

    /// Create a single-elimination bracket. Byes are settled right away.
    pub async fn create_bracket(
        &self,
        name: &str,
        teams: Vec<String>,
    ) -> Result<CompetitionOverview, EngineError> {
        let plan = bracket::plan_bracket(&teams)?;
        let mut tx = self.store.begin().await?;
        let competition = tx
            .insert_competition(NewCompetition {
                kind: MatchKind::Bracket,
                name: name.to_string(),
                participants: teams,
            })
            .await?;

        // Downstream matches go in first so every match can point at its successor.
        let mut ids: HashMap<(i32, i32), MatchId> = HashMap::new();
        let mut walkovers = Vec::new();
        for planned in plan.into_iter().rev() {
            let next_match_id = match planned.feeds {
                Some((round, index)) => Some(*ids.get(&(round, index)).ok_or_else(|| {
                    anyhow!("bracket layout has no match {} in round {}", index, round)
                })?),
                None => None,
            };
            let m = tx
                .insert_match(NewMatch {
                    competition_id: competition.id,
                    kind: MatchKind::Bracket,
                    round_number: planned.round,
                    match_index: planned.index,
                    next_match_id,
                    team_a: planned.team_a,
                    team_b: planned.team_b,
                    state: planned.state,
                })
                .await?;
            ids.insert((m.round_number, m.match_index), m.id);
            if m.state.is_finished() {
                walkovers.push(m);
            }
        }
        for walkover in walkovers.iter().rev() {
            advance_in(&mut tx, walkover).await?;
        }

        let matches = tx.competition_matches(competition.id).await?;
        tx.commit().await?;
        log::info!(
            "created bracket `{}` (id {}) with {} matches",
            competition.name,
            competition.id,
            matches.len()
        );
        Ok(CompetitionOverview {
            competition,
            matches,
        })
    }

    pub async fn create_league(
        &self,
        name: &str,
        teams: Vec<String>,
    ) -> Result<CompetitionOverview, EngineError> {
        self.create_round_robin(MatchKind::League, name, teams, HashMap::new())
            .await
    }

    /// Create a cup. Teams with a roster in `rosters` start every match with
    /// that lineup already filled in.
    pub async fn create_cup(
        &self,
        name: &str,
        teams: Vec<String>,
        rosters: HashMap<String, Vec<String>>,
    ) -> Result<CompetitionOverview, EngineError> {
        self.create_round_robin(MatchKind::Cup, name, teams, rosters)
            .await
    }

    pub async fn set_archived(
        &self,
        id: CompetitionId,
        archived: bool,
        actor: &Actor,
    ) -> Result<Competition, EngineError> {
        let mut tx = self.store.begin().await?;
        let mut competition = tx
            .load_competition(id)
            .await?
            .ok_or(EngineError::CompetitionNotFound(id))?;
        competition::set_archived(&mut competition, archived, actor).map_err(|err| {
            log::debug!("competition {}: rejected: {}", id, err);
            EngineError::Rejected(err)
        })?;
        tx.save_competition(&competition).await?;
        tx.commit().await?;
        log::info!(
            "competition {}: {} by {}",
            id,
            if archived { "archived" } else { "restored" },
            actor.describe()
        );
        Ok(competition)
    }

    pub async fn competition(&self, id: CompetitionId) -> Result<CompetitionOverview, EngineError> {
        let mut tx = self.store.begin().await?;
        let competition = tx
            .load_competition(id)
            .await?
            .ok_or(EngineError::CompetitionNotFound(id))?;
        let matches = tx.competition_matches(id).await?;
        Ok(CompetitionOverview {
            competition,
            matches,
        })
    }

    pub async fn standings(&self, id: CompetitionId) -> Result<Vec<Standing>, EngineError> {
        let overview = self.competition(id).await?;
        Ok(competition::standings(
            &overview.competition.participants,
            &overview.matches,
        ))
    }

    async fn create_round_robin(
        &self,
        kind: MatchKind,
        name: &str,
        teams: Vec<String>,
        rosters: HashMap<String, Vec<String>>,
    ) -> Result<CompetitionOverview, EngineError> {
        let fixtures = competition::round_robin(&teams)?;
        let rosters = competition::validate_rosters(&teams, rosters)?;
        let opening = self.rules.get(kind).opening_state();
        let mut tx = self.store.begin().await?;
        let competition = tx
            .insert_competition(NewCompetition {
                kind,
                name: name.to_string(),
                participants: teams,
            })
            .await?;

        let mut index = 0;
        let mut round = 0;
        for fixture in fixtures {
            if fixture.round != round {
                round = fixture.round;
                index = 0;
            }
            let mut m = tx
                .insert_match(NewMatch {
                    competition_id: competition.id,
                    kind,
                    round_number: fixture.round,
                    match_index: index,
                    next_match_id: None,
                    team_a: fixture.team_a,
                    team_b: fixture.team_b,
                    state: opening,
                })
                .await?;
            index += 1;
            let lineup_a = rosters.get(&m.team_a);
            let lineup_b = rosters.get(&m.team_b);
            if lineup_a.is_some() || lineup_b.is_some() {
                m.lineup_a = lineup_a.cloned().unwrap_or_default();
                m.lineup_b = lineup_b.cloned().unwrap_or_default();
                tx.save_match(&m).await?;
            }
        }

        let matches = tx.competition_matches(competition.id).await?;
        tx.commit().await?;
        log::info!(
            "created {} `{}` (id {}) with {} matches",
            kind,
            competition.name,
            competition.id,
            matches.len()
        );
        Ok(CompetitionOverview {
            competition,
            matches,
        })
    }

    /// Load, mutate and save one match. A rejection drops the transaction.
    async fn apply<T>(
        &self,
        id: MatchId,
        operation: impl FnOnce(&mut Match, &Ruleset) -> Result<T, TransitionError>,
    ) -> Result<(T, Match), EngineError> {
        let mut tx = self.store.begin().await?;
        let mut m = load(&mut tx, id).await?;
        let rules = *self.rules.get(m.kind);
        let out = operation(&mut m, &rules).map_err(|err| rejected(id, err))?;
        tx.save_match(&m).await?;
        tx.commit().await?;
        Ok((out, m))
    }
}

async fn load<T: MatchTx>(tx: &mut T, id: MatchId) -> Result<Match, EngineError> {
    tx.load_match(id)
        .await?
        .ok_or(EngineError::MatchNotFound(id))
}

fn rejected(id: MatchId, err: TransitionError) -> EngineError {
    log::debug!("match {}: rejected: {}", id, err);
    EngineError::Rejected(err)
}

/// Advance the winner of `finished` inside an open transaction.
async fn advance_in<T: MatchTx>(tx: &mut T, finished: &Match) -> Result<Advancement, EngineError> {
    if !finished.state.is_finished() {
        return Err(rejected(
            finished.id,
            TransitionError::invalid(Operation::Advancement, finished.state),
        ));
    }
    let Some(next_id) = finished.next_match_id else {
        return Ok(Advancement::Final);
    };
    let mut downstream = load(tx, next_id).await?;
    let advancement =
        bracket::advance_winner(finished, &mut downstream).map_err(|err| rejected(finished.id, err))?;

    match &advancement {
        Advancement::Assigned { team, ready, .. } => {
            tx.save_match(&downstream).await?;
            log::info!(
                "match {}: `{}` advances to match {}{}",
                finished.id,
                team,
                next_id,
                if *ready { ", which opens its draft" } else { "" }
            );
        }
        Advancement::Undecided => log::warn!(
            "match {}: result is level on maps and total score, nobody advances",
            finished.id
        ),
        Advancement::SlotTaken { occupant } => log::warn!(
            "match {}: slot in match {} is already held by `{}`",
            finished.id,
            next_id,
            occupant
        ),
        Advancement::Final | Advancement::AlreadyAssigned => {}
    }
    Ok(advancement)
}
