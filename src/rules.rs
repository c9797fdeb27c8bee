use serde::{Deserialize, Serialize};

use crate::models::MatchKind;
use crate::state::{DraftAction, DraftStep, MatchState};

/// Per-kind configuration of the match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Matches of this kind run the ban/pick draft.
    pub draft: bool,
    pub bans_per_turn: usize,
    pub picks_per_turn: usize,
    /// Teams report scores themselves; otherwise only admins and moderators can.
    pub team_reporting: bool,
    /// Agreed scores move to `confirming` until both teams confirm their lineups.
    pub lineup_confirmation: bool,
    pub advances_bracket: bool,
}

impl Ruleset {
    /// Single-elimination brackets: one ban or pick per turn.
    pub const BRACKET: Ruleset = Ruleset {
        draft: true,
        bans_per_turn: 1,
        picks_per_turn: 1,
        team_reporting: true,
        lineup_confirmation: false,
        advances_bracket: true,
    };

    /// Leagues: two bans or picks per turn.
    pub const LEAGUE: Ruleset = Ruleset {
        draft: true,
        bans_per_turn: 2,
        picks_per_turn: 2,
        team_reporting: true,
        lineup_confirmation: true,
        advances_bracket: false,
    };

    /// Cups: maps and results are entered by staff.
    pub const CUP: Ruleset = Ruleset {
        draft: false,
        bans_per_turn: 0,
        picks_per_turn: 0,
        team_reporting: false,
        lineup_confirmation: false,
        advances_bracket: false,
    };

    pub fn for_kind(kind: MatchKind) -> Ruleset {
        match kind {
            MatchKind::Bracket => Ruleset::BRACKET,
            MatchKind::Cup => Ruleset::CUP,
            MatchKind::League => Ruleset::LEAGUE,
        }
    }

    /// Cumulative number of bans (or picks) needed to leave the step's state.
    pub fn required(&self, step: &DraftStep) -> usize {
        let quota = match step.action {
            DraftAction::Ban => self.bans_per_turn,
            DraftAction::Pick => self.picks_per_turn,
        };
        quota * step.turn
    }

    /// State of a freshly created match whose teams are both known.
    pub fn opening_state(&self) -> MatchState {
        if self.draft {
            MatchState::Ban1A
        } else {
            MatchState::WaitingForReady
        }
    }
}

/// The rulesets in force, one per match kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rulebook {
    pub bracket: Ruleset,
    pub cup: Ruleset,
    pub league: Ruleset,
}

impl Default for Rulebook {
    fn default() -> Self {
        Rulebook {
            bracket: Ruleset::BRACKET,
            cup: Ruleset::CUP,
            league: Ruleset::LEAGUE,
        }
    }
}

impl Rulebook {
    pub fn get(&self, kind: MatchKind) -> &Ruleset {
        match kind {
            MatchKind::Bracket => &self.bracket,
            MatchKind::Cup => &self.cup,
            MatchKind::League => &self.league,
        }
    }
}
