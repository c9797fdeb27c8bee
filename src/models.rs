use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::state::{MatchState, Side};

pub type MatchId = i32;
pub type CompetitionId = i32;

/// Slot of a bracket match whose team is decided by an earlier match.
pub const TBD: &str = "TBD";
/// Free pass; the opposing team wins by walkover.
pub const BYE: &str = "BYE";

pub fn is_placeholder(team: &str) -> bool {
    team == TBD
}

pub fn is_bye(team: &str) -> bool {
    team == BYE
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchKind {
    Bracket,
    Cup,
    League,
}

/// A team's staged report: its view of both sides' scores plus its lineup.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreDraft {
    pub scores_a: Vec<i32>,
    pub scores_b: Vec<i32>,
    #[serde(default)]
    pub lineup: Vec<String>,
}

impl ScoreDraft {
    pub fn same_scores(&self, other: &ScoreDraft) -> bool {
        self.scores_a == other.scores_a && self.scores_b == other.scores_b
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub competition_id: CompetitionId,
    pub kind: MatchKind,
    pub round_number: i32,
    pub match_index: i32,
    pub next_match_id: Option<MatchId>,
    pub team_a: String,
    pub team_b: String,
    pub state: MatchState,
    pub lobby_code: Option<String>,
    pub banned_maps: Vec<String>,
    pub picked_maps: Vec<String>,
    pub scores_a: Vec<i32>,
    pub scores_b: Vec<i32>,
    pub draft_a: Option<ScoreDraft>,
    pub draft_b: Option<ScoreDraft>,
    pub lineup_a: Vec<String>,
    pub lineup_b: Vec<String>,
    pub confirmed_a: bool,
    pub confirmed_b: bool,
}

impl Match {
    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut String {
        match side {
            Side::A => &mut self.team_a,
            Side::B => &mut self.team_b,
        }
    }

    pub fn side_of(&self, team: &str) -> Option<Side> {
        if is_placeholder(team) || is_bye(team) {
            return None;
        }
        if self.team_a == team {
            Some(Side::A)
        } else if self.team_b == team {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Team expected to ban or pick next.
    pub fn active_team(&self) -> Option<&str> {
        self.state.acting_side().map(|side| self.team(side))
    }

    /// Both slots hold a team (or a bye) rather than `TBD`.
    pub fn teams_known(&self) -> bool {
        !is_placeholder(&self.team_a) && !is_placeholder(&self.team_b)
    }

    /// Downstream slot fed by this match: even indexes feed team A.
    pub fn feeds_side(&self) -> Side {
        if self.match_index % 2 == 0 {
            Side::A
        } else {
            Side::B
        }
    }

    pub fn draft_mut(&mut self, side: Side) -> &mut Option<ScoreDraft> {
        match side {
            Side::A => &mut self.draft_a,
            Side::B => &mut self.draft_b,
        }
    }

    pub fn lineup_mut(&mut self, side: Side) -> &mut Vec<String> {
        match side {
            Side::A => &mut self.lineup_a,
            Side::B => &mut self.lineup_b,
        }
    }

    pub fn confirmed_mut(&mut self, side: Side) -> &mut bool {
        match side {
            Side::A => &mut self.confirmed_a,
            Side::B => &mut self.confirmed_b,
        }
    }

    pub fn map_used(&self, map: &str) -> bool {
        self.banned_maps.iter().any(|m| m == map) || self.picked_maps.iter().any(|m| m == map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    pub competition_id: CompetitionId,
    pub kind: MatchKind,
    pub round_number: i32,
    pub match_index: i32,
    pub next_match_id: Option<MatchId>,
    pub team_a: String,
    pub team_b: String,
    pub state: MatchState,
}

impl NewMatch {
    pub fn into_match(self, id: MatchId) -> Match {
        Match {
            id,
            competition_id: self.competition_id,
            kind: self.kind,
            round_number: self.round_number,
            match_index: self.match_index,
            next_match_id: self.next_match_id,
            team_a: self.team_a,
            team_b: self.team_b,
            state: self.state,
            lobby_code: None,
            banned_maps: Vec::new(),
            picked_maps: Vec::new(),
            scores_a: Vec::new(),
            scores_b: Vec::new(),
            draft_a: None,
            draft_b: None,
            lineup_a: Vec::new(),
            lineup_b: Vec::new(),
            confirmed_a: false,
            confirmed_b: false,
        }
    }
}

/// A tournament bracket, cup or league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub kind: MatchKind,
    pub name: String,
    pub archived: bool,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompetition {
    pub kind: MatchKind,
    pub name: String,
    pub participants: Vec<String>,
}

/// Role of whoever is calling into the engine, resolved by the web layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub is_admin: bool,
    pub is_moderator: bool,
    pub team: Option<String>,
}

impl Actor {
    pub fn admin() -> Actor {
        Actor {
            is_admin: true,
            ..Actor::default()
        }
    }

    pub fn moderator() -> Actor {
        Actor {
            is_moderator: true,
            ..Actor::default()
        }
    }

    pub fn team(name: impl Into<String>) -> Actor {
        Actor {
            team: Some(name.into()),
            ..Actor::default()
        }
    }

    pub fn has_authority(&self) -> bool {
        self.is_admin || self.is_moderator
    }

    /// Side this actor plays for in the given match, if any.
    pub fn side_in(&self, m: &Match) -> Option<Side> {
        self.team.as_deref().and_then(|team| m.side_of(team))
    }

    /// Admins and moderators act for either side; teams only for themselves.
    pub fn acts_for(&self, m: &Match, side: Side) -> bool {
        self.has_authority() || self.side_in(m) == Some(side)
    }

    pub fn describe(&self) -> String {
        match (&self.team, self.is_admin, self.is_moderator) {
            (_, true, _) => String::from("admin"),
            (_, _, true) => String::from("moderator"),
            (Some(team), _, _) => format!("team `{}`", team),
            (None, _, _) => String::from("anonymous user"),
        }
    }
}
