//! Score reporting and two-sided reconciliation.

use serde::{Deserialize, Serialize};

use crate::error::{Operation, TransitionError};
use crate::models::{Actor, Match, ScoreDraft};
use crate::rules::Ruleset;
use crate::state::MatchState;

/// Per-map scores for both sides, already validated and clamped. Only built
/// through [`ScoreSheet::new`] or [`ScoreSheet::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScoreSheet {
    scores_a: Vec<i32>,
    scores_b: Vec<i32>,
}

impl ScoreSheet {
    pub fn new(scores_a: Vec<i32>, scores_b: Vec<i32>) -> Result<ScoreSheet, TransitionError> {
        if scores_a.is_empty() || scores_a.len() != scores_b.len() {
            return Err(TransitionError::malformed(format!(
                "expected the same number of scores for both teams, got {} and {}",
                scores_a.len(),
                scores_b.len()
            )));
        }
        Ok(ScoreSheet {
            scores_a: scores_a.into_iter().map(|s| s.max(0)).collect(),
            scores_b: scores_b.into_iter().map(|s| s.max(0)).collect(),
        })
    }

    /// Parses form input. Blank fields count as zero; anything non-numeric
    /// rejects the whole sheet.
    pub fn parse<S: AsRef<str>>(raw_a: &[S], raw_b: &[S]) -> Result<ScoreSheet, TransitionError> {
        let scores_a = raw_a
            .iter()
            .map(|s| parse_score(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let scores_b = raw_b
            .iter()
            .map(|s| parse_score(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        ScoreSheet::new(scores_a, scores_b)
    }

    pub fn scores_a(&self) -> &[i32] {
        &self.scores_a
    }

    pub fn scores_b(&self) -> &[i32] {
        &self.scores_b
    }

    pub fn len(&self) -> usize {
        self.scores_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores_a.is_empty()
    }
}

fn parse_score(raw: &str) -> Result<i32, TransitionError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<i64>()
        .map(|score| score.clamp(0, i32::MAX as i64) as i32)
        .map_err(|_| TransitionError::malformed(format!("`{}` is not a score", raw)))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreSubmission {
    pub sheet: ScoreSheet,
    /// Players the reporting team fielded; only kept for lineup confirmation.
    pub lineup: Vec<String>,
}

impl From<ScoreSheet> for ScoreSubmission {
    fn from(sheet: ScoreSheet) -> Self {
        ScoreSubmission {
            sheet,
            lineup: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// Scores are final and the match is finished.
    Committed,
    /// One team reported, the other has yet to.
    AwaitingConfirmation,
    /// Both reports agree; lineups still need confirming.
    AwaitingLineups,
    /// Reports disagree and need an admin.
    Conflict,
}

/// Record a result.
///
/// Admins and moderators write scores directly. Teams stage a draft holding
/// their view of both sides; when both drafts exist they are compared and
/// either committed or flagged as a conflict.
pub fn submit_scores(
    m: &mut Match,
    rules: &Ruleset,
    submission: ScoreSubmission,
    actor: &Actor,
) -> Result<ScoreOutcome, TransitionError> {
    // Nobody, staff included, may settle a match before both teams are known.
    if !m.teams_known() {
        return Err(TransitionError::invalid(Operation::ScoreReport, m.state));
    }
    if actor.has_authority() {
        check_length(m, &submission.sheet)?;
        commit(m, submission.sheet);
        m.draft_a = None;
        m.draft_b = None;
        m.state = MatchState::Finished;
        return Ok(ScoreOutcome::Committed);
    }

    let side = match actor.side_in(m) {
        Some(side) if rules.team_reporting => side,
        _ => return Err(TransitionError::unauthorized(actor, Operation::ScoreReport)),
    };
    if !matches!(
        m.state,
        MatchState::ScoringPhase | MatchState::WaitingForConfirmation
    ) {
        return Err(TransitionError::invalid(Operation::ScoreReport, m.state));
    }
    check_length(m, &submission.sheet)?;

    let ScoreSubmission { sheet, lineup } = submission;
    *m.draft_mut(side) = Some(ScoreDraft {
        scores_a: sheet.scores_a,
        scores_b: sheet.scores_b,
        lineup,
    });

    let agreed = match (&m.draft_a, &m.draft_b) {
        (Some(a), Some(b)) if a.same_scores(b) => ScoreSheet {
            scores_a: a.scores_a.clone(),
            scores_b: a.scores_b.clone(),
        },
        (Some(_), Some(_)) => {
            m.state = MatchState::Conflict;
            return Ok(ScoreOutcome::Conflict);
        }
        _ => {
            m.state = MatchState::WaitingForConfirmation;
            return Ok(ScoreOutcome::AwaitingConfirmation);
        }
    };

    commit(m, agreed);
    if rules.lineup_confirmation {
        // Drafts carry the lineups until both teams confirm them.
        m.confirmed_a = false;
        m.confirmed_b = false;
        m.state = MatchState::Confirming;
        Ok(ScoreOutcome::AwaitingLineups)
    } else {
        m.draft_a = None;
        m.draft_b = None;
        m.state = MatchState::Finished;
        Ok(ScoreOutcome::Committed)
    }
}

fn check_length(m: &Match, sheet: &ScoreSheet) -> Result<(), TransitionError> {
    if sheet.is_empty() || sheet.scores_a.len() != sheet.scores_b.len() {
        return Err(TransitionError::malformed(
            "a result needs the same, non-zero number of scores for both teams",
        ));
    }
    if !m.picked_maps.is_empty() && sheet.len() != m.picked_maps.len() {
        return Err(TransitionError::malformed(format!(
            "expected {} scores per team, one per picked map, got {}",
            m.picked_maps.len(),
            sheet.len()
        )));
    }
    Ok(())
}

fn commit(m: &mut Match, sheet: ScoreSheet) {
    m.scores_a = sheet.scores_a.into_iter().map(|s| s.max(0)).collect();
    m.scores_b = sheet.scores_b.into_iter().map(|s| s.max(0)).collect();
}
