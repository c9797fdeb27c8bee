//! Lineup confirmation (leagues) and lineup/check-in management (cups).

use crate::error::{Operation, TransitionError};
use crate::models::{Actor, Match, MatchKind};
use crate::state::{MatchState, Side};

/// A team confirms the agreed result and lineups. Once both teams have
/// confirmed, the drafted lineups become final and the match is finished.
pub fn confirm_lineup(m: &mut Match, actor: &Actor) -> Result<MatchState, TransitionError> {
    if m.state != MatchState::Confirming {
        return Err(TransitionError::invalid(
            Operation::LineupConfirmation,
            m.state,
        ));
    }
    let side = actor
        .side_in(m)
        .ok_or_else(|| TransitionError::unauthorized(actor, Operation::LineupConfirmation))?;
    *m.confirmed_mut(side) = true;

    if m.confirmed_a && m.confirmed_b {
        m.lineup_a = m.draft_a.take().map(|d| d.lineup).unwrap_or_default();
        m.lineup_b = m.draft_b.take().map(|d| d.lineup).unwrap_or_default();
        m.state = MatchState::Finished;
    }
    Ok(m.state)
}

/// Replace one side's lineup. Teams may only edit their own; a change
/// withdraws that side's confirmation.
pub fn set_lineup(
    m: &mut Match,
    side: Side,
    players: Vec<String>,
    actor: &Actor,
) -> Result<(), TransitionError> {
    if m.state.is_finished() || m.state == MatchState::Confirming {
        return Err(TransitionError::invalid(Operation::LineupChange, m.state));
    }
    if !actor.acts_for(m, side) {
        return Err(TransitionError::unauthorized(actor, Operation::LineupChange));
    }
    let players: Vec<String> = players.into_iter().map(|p| p.trim().to_string()).collect();
    if players.iter().any(|p| p.is_empty()) {
        return Err(TransitionError::malformed("lineup contains a blank player"));
    }
    *m.lineup_mut(side) = players;
    *m.confirmed_mut(side) = false;
    Ok(())
}

/// Staff check-in for cup matches.
pub fn check_in(
    m: &mut Match,
    confirmed_a: bool,
    confirmed_b: bool,
    actor: &Actor,
) -> Result<(), TransitionError> {
    if m.kind != MatchKind::Cup || m.state.is_finished() {
        return Err(TransitionError::invalid(Operation::CheckIn, m.state));
    }
    if !actor.has_authority() {
        return Err(TransitionError::unauthorized(actor, Operation::CheckIn));
    }
    m.confirmed_a = confirmed_a;
    m.confirmed_b = confirmed_b;
    Ok(())
}
