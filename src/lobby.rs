//! Lobby codes and staff-assigned cup maps.

use crate::error::{Operation, TransitionError};
use crate::models::{Actor, Match, MatchKind};
use crate::state::MatchState;

/// Publish (or clear, when blank) the lobby code players join with.
///
/// Cup lobbies are opened by staff and start the match. For brackets and
/// leagues either participant may post the code.
pub fn set_lobby_code(m: &mut Match, code: &str, actor: &Actor) -> Result<(), TransitionError> {
    let allowed = match m.kind {
        MatchKind::Cup => actor.has_authority(),
        MatchKind::Bracket | MatchKind::League => {
            actor.has_authority() || actor.side_in(m).is_some()
        }
    };
    if !allowed {
        return Err(TransitionError::unauthorized(actor, Operation::LobbyCode));
    }
    if m.kind == MatchKind::Cup && m.state.is_finished() {
        return Err(TransitionError::invalid(Operation::LobbyCode, m.state));
    }

    let code = code.trim();
    m.lobby_code = if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    };
    if m.kind == MatchKind::Cup && m.lobby_code.is_some() {
        m.state = MatchState::InProgress;
    }
    Ok(())
}

/// Staff set the maps a cup match is played on.
pub fn set_cup_maps(m: &mut Match, maps: Vec<String>, actor: &Actor) -> Result<(), TransitionError> {
    if m.kind != MatchKind::Cup || m.state.is_finished() {
        return Err(TransitionError::invalid(Operation::MapAssignment, m.state));
    }
    if !actor.has_authority() {
        return Err(TransitionError::unauthorized(actor, Operation::MapAssignment));
    }
    let maps: Vec<String> = maps.into_iter().map(|map| map.trim().to_string()).collect();
    if maps.is_empty() || maps.iter().any(|map| map.is_empty()) {
        return Err(TransitionError::malformed("every map slot needs a map"));
    }
    for (i, map) in maps.iter().enumerate() {
        if maps[..i].contains(map) {
            return Err(TransitionError::malformed(format!(
                "map `{}` is listed twice",
                map
            )));
        }
    }

    m.picked_maps = maps;
    if m.state == MatchState::WaitingForReady {
        m.state = MatchState::WaitingForCode;
    }
    Ok(())
}
