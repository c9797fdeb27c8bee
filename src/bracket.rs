//! Single-elimination brackets: winners, advancement and bracket layout.

use serde::Serialize;

use crate::error::{Operation, TransitionError};
use crate::models::{is_bye, is_placeholder, Match, MatchId, BYE, TBD};
use crate::state::{MatchState, Side};

/// Maps won by each side: a strictly higher score wins the map, ties count for nobody.
pub fn map_wins(scores_a: &[i32], scores_b: &[i32]) -> (u32, u32) {
    scores_a
        .iter()
        .zip(scores_b)
        .fold((0, 0), |(a, b), (sa, sb)| {
            if sa > sb {
                (a + 1, b)
            } else if sb > sa {
                (a, b + 1)
            } else {
                (a, b)
            }
        })
}

impl Match {
    pub fn map_wins(&self) -> (u32, u32) {
        map_wins(&self.scores_a, &self.scores_b)
    }

    /// Winning side: walkover against a bye, then map-wins, then total score.
    /// `None` when both map-wins and totals are level.
    pub fn winning_side(&self) -> Option<Side> {
        if is_bye(&self.team_b) && !is_bye(&self.team_a) {
            return Some(Side::A);
        }
        if is_bye(&self.team_a) && !is_bye(&self.team_b) {
            return Some(Side::B);
        }
        let (wins_a, wins_b) = self.map_wins();
        if wins_a != wins_b {
            return Some(if wins_a > wins_b { Side::A } else { Side::B });
        }
        let total_a: i64 = self.scores_a.iter().map(|s| *s as i64).sum();
        let total_b: i64 = self.scores_b.iter().map(|s| *s as i64).sum();
        match total_a.cmp(&total_b) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.winning_side().map(|side| self.team(side))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Advancement {
    /// Nothing downstream: this was the final.
    Final,
    /// The result is a full tie, nobody advances until staff correct it.
    Undecided,
    Assigned {
        next_match_id: MatchId,
        slot: Side,
        team: String,
        /// Downstream match now has both teams and opened its draft.
        ready: bool,
    },
    /// The winner already sits in the downstream slot.
    AlreadyAssigned,
    /// The downstream slot holds another team and is left alone.
    SlotTaken { occupant: String },
}

/// Move the winner of a finished match into its downstream match.
///
/// Safe to repeat: a downstream slot that already holds a team is never
/// overwritten.
pub fn advance_winner(
    finished: &Match,
    downstream: &mut Match,
) -> Result<Advancement, TransitionError> {
    if !finished.state.is_finished() {
        return Err(TransitionError::invalid(
            Operation::Advancement,
            finished.state,
        ));
    }
    let Some(next_match_id) = finished.next_match_id else {
        return Ok(Advancement::Final);
    };
    if downstream.id != next_match_id {
        return Err(TransitionError::malformed(format!(
            "match {} feeds match {}, not {}",
            finished.id, next_match_id, downstream.id
        )));
    }
    let Some(winner) = finished.winner() else {
        return Ok(Advancement::Undecided);
    };

    let slot = finished.feeds_side();
    let occupant = downstream.team(slot);
    if occupant == winner {
        return Ok(Advancement::AlreadyAssigned);
    }
    if !is_placeholder(occupant) {
        return Ok(Advancement::SlotTaken {
            occupant: occupant.to_string(),
        });
    }

    *downstream.team_mut(slot) = winner.to_string();
    let ready = downstream.teams_known() && downstream.state == MatchState::Waiting;
    if ready {
        downstream.state = MatchState::Ban1A;
    }
    Ok(Advancement::Assigned {
        next_match_id,
        slot,
        team: winner.to_string(),
        ready,
    })
}

/// One match of a bracket that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMatch {
    pub round: i32,
    pub index: i32,
    pub team_a: String,
    pub team_b: String,
    pub state: MatchState,
    /// `(round, index)` of the match the winner moves on to.
    pub feeds: Option<(i32, i32)>,
}

/// Lay out a single-elimination bracket, seeds in the given order.
///
/// The field is padded to a power of two with byes handed to the top seeds,
/// so a bye never meets another bye. Byes are finished walkovers from the
/// start; later rounds wait on `TBD` slots.
pub fn plan_bracket(teams: &[String]) -> Result<Vec<PlannedMatch>, TransitionError> {
    crate::competition::validate_roster(teams)?;
    if teams.len() < 2 {
        return Err(TransitionError::malformed(
            "a bracket needs at least two teams",
        ));
    }

    let size = teams.len().next_power_of_two();
    let byes = size - teams.len();
    let rounds = size.trailing_zeros() as i32;
    let mut seeds = teams.iter();
    let mut plan = Vec::with_capacity(size - 1);

    for index in 0..size / 2 {
        let team_a = seeds.next().cloned().unwrap_or_else(|| BYE.to_string());
        let team_b = if index < byes {
            BYE.to_string()
        } else {
            seeds.next().cloned().unwrap_or_else(|| BYE.to_string())
        };
        let state = if is_bye(&team_b) {
            MatchState::Finished
        } else {
            MatchState::Ban1A
        };
        plan.push(PlannedMatch {
            round: 1,
            index: index as i32,
            team_a,
            team_b,
            state,
            feeds: None,
        });
    }
    for round in 2..=rounds {
        let matches = size >> round;
        for index in 0..matches {
            plan.push(PlannedMatch {
                round,
                index: index as i32,
                team_a: TBD.to_string(),
                team_b: TBD.to_string(),
                state: MatchState::Waiting,
                feeds: None,
            });
        }
    }
    for planned in plan.iter_mut() {
        if planned.round < rounds {
            planned.feeds = Some((planned.round + 1, planned.index / 2));
        }
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::bracket_match;

    fn finished(team_a: &str, team_b: &str, a: &[i32], b: &[i32]) -> Match {
        let mut m = bracket_match(team_a, team_b);
        m.state = MatchState::Finished;
        m.scores_a = a.to_vec();
        m.scores_b = b.to_vec();
        m.next_match_id = Some(7);
        m
    }

    fn waiting(id: MatchId) -> Match {
        let mut m = bracket_match(TBD, TBD);
        m.id = id;
        m.round_number = 2;
        m.state = MatchState::Waiting;
        m
    }

    #[test]
    fn map_wins_ignore_drawn_maps() {
        assert_eq!(map_wins(&[6, 4, 5], &[4, 6, 5]), (1, 1));
        assert_eq!(map_wins(&[13, 13], &[2, 11]), (2, 0));
        assert_eq!(map_wins(&[], &[]), (0, 0));
    }

    #[test]
    fn totals_break_map_win_ties() {
        assert_eq!(finished("A", "B", &[6, 4], &[4, 6]).winner(), None);
        assert_eq!(finished("A", "B", &[6, 2], &[4, 6]).winner(), Some("B"));
        assert_eq!(finished("A", "B", &[6, 5], &[5, 5]).winner(), Some("A"));
        assert_eq!(finished("A", BYE, &[], &[]).winner(), Some("A"));
    }

    #[test]
    fn winner_fills_the_slot_by_index_parity() {
        let m = finished("Alpha", "Omega", &[6, 6], &[2, 3]);
        let mut next = waiting(7);
        next.team_b = "Beta".into();
        let outcome = advance_winner(&m, &mut next).unwrap();
        assert_eq!(
            outcome,
            Advancement::Assigned {
                next_match_id: 7,
                slot: Side::A,
                team: "Alpha".into(),
                ready: true
            }
        );
        assert_eq!(next.team_a, "Alpha");
        assert_eq!(next.state, MatchState::Ban1A);

        let mut odd = finished("Gamma", "Delta", &[1], &[6]);
        odd.match_index = 1;
        let mut next = waiting(7);
        advance_winner(&odd, &mut next).unwrap();
        assert_eq!(next.team_b, "Delta");
        assert_eq!(next.team_a, TBD);
        assert_eq!(next.state, MatchState::Waiting);
    }

    #[test]
    fn advancing_twice_changes_nothing() {
        let m = finished("Alpha", "Omega", &[6, 6], &[2, 3]);
        let mut next = waiting(7);
        next.team_b = "Beta".into();
        advance_winner(&m, &mut next).unwrap();
        next.banned_maps.push("Map1".into());
        next.state = MatchState::Ban1B;
        let snapshot = next.clone();
        assert_eq!(
            advance_winner(&m, &mut next).unwrap(),
            Advancement::AlreadyAssigned
        );
        assert_eq!(next, snapshot);

        let mut corrected = m.clone();
        corrected.scores_a = vec![0, 0];
        assert_eq!(
            advance_winner(&corrected, &mut next).unwrap(),
            Advancement::SlotTaken {
                occupant: "Alpha".into()
            }
        );
        assert_eq!(next, snapshot);
    }

    #[test]
    fn finals_and_ties_do_not_advance() {
        let mut last = finished("Alpha", "Beta", &[6], &[1]);
        last.next_match_id = None;
        let mut unrelated = waiting(9);
        assert_eq!(
            advance_winner(&last, &mut unrelated).unwrap(),
            Advancement::Final
        );
        let tie = finished("Alpha", "Beta", &[6, 4], &[4, 6]);
        let mut next = waiting(7);
        assert_eq!(
            advance_winner(&tie, &mut next).unwrap(),
            Advancement::Undecided
        );
        assert_eq!(next, waiting(7));
        assert!(advance_winner(&tie, &mut waiting(8)).is_err());

        let mut open = tie.clone();
        open.state = MatchState::ScoringPhase;
        assert!(advance_winner(&open, &mut next).is_err());
    }

    #[test]
    fn plan_pads_with_byes_for_top_seeds() {
        let teams: Vec<String> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        let plan = plan_bracket(&teams).unwrap();
        assert_eq!(plan.len(), 7);
        let first: Vec<(&str, &str)> = plan
            .iter()
            .filter(|p| p.round == 1)
            .map(|p| (p.team_a.as_str(), p.team_b.as_str()))
            .collect();
        assert_eq!(first, vec![("A", BYE), ("B", BYE), ("C", "D"), ("E", "F")]);
        assert_eq!(plan[0].state, MatchState::Finished);
        assert_eq!(plan[2].state, MatchState::Ban1A);
        assert_eq!(plan[2].feeds, Some((2, 1)));
        let last = plan.last().unwrap();
        assert_eq!((last.round, last.index, last.feeds), (3, 0, None));
        assert_eq!(last.state, MatchState::Waiting);
    }

    #[test]
    fn plan_rejects_tiny_or_duplicate_fields() {
        assert!(plan_bracket(&["Solo".to_string()]).is_err());
        assert!(plan_bracket(&["A".to_string(), "A".to_string()]).is_err());
        let two = plan_bracket(&["A".to_string(), "B".to_string()]).unwrap();
        assert_eq!(two.len(), 1);
        assert_eq!(two[0].feeds, None);
    }
}
