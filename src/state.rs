use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a match. The textual form (`ban_1_a`, `scoring_phase`, ...)
/// is what gets persisted and shown to clients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchState {
    /// Bracket match still waiting for one or both teams.
    Waiting,
    WaitingForReady,
    WaitingForCode,
    InProgress,
    #[serde(rename = "ban_1_a")]
    #[strum(serialize = "ban_1_a")]
    Ban1A,
    #[serde(rename = "ban_1_b")]
    #[strum(serialize = "ban_1_b")]
    Ban1B,
    #[serde(rename = "ban_2_a")]
    #[strum(serialize = "ban_2_a")]
    Ban2A,
    #[serde(rename = "ban_2_b")]
    #[strum(serialize = "ban_2_b")]
    Ban2B,
    PickA,
    PickB,
    ScoringPhase,
    WaitingForConfirmation,
    Conflict,
    Confirming,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Side {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftAction {
    Ban,
    Pick,
}

/// One turn of the ban/pick draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftStep {
    pub action: DraftAction,
    pub side: Side,
    /// Position of this turn within its action, starting at 1. Multiplied by the
    /// per-turn quota it gives the cumulative count needed to leave the state.
    pub turn: usize,
    pub next: MatchState,
}

pub const DRAFT_ORDER: [MatchState; 7] = [
    MatchState::Ban1A,
    MatchState::Ban1B,
    MatchState::Ban2A,
    MatchState::Ban2B,
    MatchState::PickA,
    MatchState::PickB,
    MatchState::ScoringPhase,
];

impl MatchState {
    pub fn draft_step(self) -> Option<DraftStep> {
        use DraftAction::{Ban, Pick};
        use MatchState::*;
        let (action, side, turn, next) = match self {
            Ban1A => (Ban, Side::A, 1, Ban1B),
            Ban1B => (Ban, Side::B, 2, Ban2A),
            Ban2A => (Ban, Side::A, 3, Ban2B),
            Ban2B => (Ban, Side::B, 4, PickA),
            PickA => (Pick, Side::A, 1, PickB),
            PickB => (Pick, Side::B, 2, ScoringPhase),
            Waiting | WaitingForReady | WaitingForCode | InProgress | ScoringPhase
            | WaitingForConfirmation | Conflict | Confirming | Finished => return None,
        };
        Some(DraftStep {
            action,
            side,
            turn,
            next,
        })
    }

    /// The side expected to act next, derived from the `_a`/`_b` suffix.
    pub fn acting_side(self) -> Option<Side> {
        self.draft_step().map(|step| step.side)
    }

    /// Index in the draft order, `None` outside of the draft.
    pub fn draft_position(self) -> Option<usize> {
        DRAFT_ORDER.iter().position(|s| *s == self)
    }

    pub fn is_finished(self) -> bool {
        self == MatchState::Finished
    }
}
