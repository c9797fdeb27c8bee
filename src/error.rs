use strum::Display;
use thiserror::Error;

use crate::models::{CompetitionId, MatchId};
use crate::state::MatchState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[strum(serialize = "map selection")]
    MapSelection,
    #[strum(serialize = "score report")]
    ScoreReport,
    #[strum(serialize = "lineup confirmation")]
    LineupConfirmation,
    #[strum(serialize = "lineup change")]
    LineupChange,
    #[strum(serialize = "check-in")]
    CheckIn,
    #[strum(serialize = "lobby code")]
    LobbyCode,
    #[strum(serialize = "map assignment")]
    MapAssignment,
    #[strum(serialize = "bracket advancement")]
    Advancement,
    #[strum(serialize = "archive change")]
    Archive,
}

/// Why the engine refused a transition. The match is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{operation} is not possible while the match is `{state}`")]
    InvalidTransition {
        operation: Operation,
        state: MatchState,
    },
    #[error("map `{0}` has already been banned or picked")]
    MapUnavailable(String),
    #[error("{actor} may not perform a {operation} here")]
    Unauthorized { actor: String, operation: Operation },
    #[error("malformed input: {0}")]
    MalformedInput(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidTransition,
    Unauthorized,
    MalformedInput,
}

impl TransitionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransitionError::InvalidTransition { .. } | TransitionError::MapUnavailable(_) => {
                ErrorKind::InvalidTransition
            }
            TransitionError::Unauthorized { .. } => ErrorKind::Unauthorized,
            TransitionError::MalformedInput(_) => ErrorKind::MalformedInput,
        }
    }

    pub(crate) fn invalid(operation: Operation, state: MatchState) -> Self {
        TransitionError::InvalidTransition { operation, state }
    }

    pub(crate) fn unauthorized(actor: &crate::models::Actor, operation: Operation) -> Self {
        TransitionError::Unauthorized {
            actor: actor.describe(),
            operation,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        TransitionError::MalformedInput(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("match {0} does not exist")]
    MatchNotFound(MatchId),
    #[error("competition {0} does not exist")]
    CompetitionNotFound(CompetitionId),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl EngineError {
    pub fn rejection(&self) -> Option<&TransitionError> {
        match self {
            EngineError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}
