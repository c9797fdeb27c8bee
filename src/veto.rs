//! Map ban/pick draft.

use crate::error::{Operation, TransitionError};
use crate::models::{Actor, Match};
use crate::rules::Ruleset;
use crate::state::{DraftAction, MatchState};

/// Ban or pick `map_id` for the side the current state designates.
///
/// The map is appended to the banned or picked list, and the state only moves
/// on once the cumulative count for the current turn reaches the ruleset's
/// quota. Every rejection leaves the match untouched.
pub fn submit_map_selection(
    m: &mut Match,
    rules: &Ruleset,
    map_id: &str,
    actor: &Actor,
) -> Result<MatchState, TransitionError> {
    let step = match m.state.draft_step() {
        Some(step) if rules.draft => step,
        _ => return Err(TransitionError::invalid(Operation::MapSelection, m.state)),
    };
    let map_id = map_id.trim();
    if map_id.is_empty() {
        return Err(TransitionError::malformed("no map selected"));
    }
    if !actor.acts_for(m, step.side) {
        return Err(TransitionError::unauthorized(actor, Operation::MapSelection));
    }
    if m.map_used(map_id) {
        return Err(TransitionError::MapUnavailable(map_id.to_string()));
    }

    let selected = match step.action {
        DraftAction::Ban => &mut m.banned_maps,
        DraftAction::Pick => &mut m.picked_maps,
    };
    selected.push(map_id.to_string());
    if selected.len() >= rules.required(&step) {
        m.state = step.next;
    }
    Ok(m.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::fixtures::{bracket_match, cup_match, league_match};
    use crate::state::DRAFT_ORDER;

    fn select(m: &mut Match, rules: &Ruleset, map: &str, team: &str) -> MatchState {
        submit_map_selection(m, rules, map, &Actor::team(team)).unwrap()
    }

    #[test]
    fn single_count_draft_reaches_scoring() {
        let rules = Ruleset::BRACKET;
        let mut m = bracket_match("Alpha", "Beta");
        assert_eq!(select(&mut m, &rules, "Map1", "Alpha"), MatchState::Ban1B);
        assert_eq!(select(&mut m, &rules, "Map2", "Beta"), MatchState::Ban2A);
        assert_eq!(select(&mut m, &rules, "Map3", "Alpha"), MatchState::Ban2B);
        assert_eq!(select(&mut m, &rules, "Map4", "Beta"), MatchState::PickA);
        assert_eq!(select(&mut m, &rules, "Map5", "Alpha"), MatchState::PickB);
        assert_eq!(
            select(&mut m, &rules, "Map6", "Beta"),
            MatchState::ScoringPhase
        );
        assert_eq!(m.banned_maps, vec!["Map1", "Map2", "Map3", "Map4"]);
        assert_eq!(m.picked_maps, vec!["Map5", "Map6"]);
    }

    #[test]
    fn double_count_draft_needs_two_selections_per_turn() {
        let rules = Ruleset::LEAGUE;
        let mut m = league_match("Alpha", "Beta");
        assert_eq!(select(&mut m, &rules, "Map1", "Alpha"), MatchState::Ban1A);
        assert_eq!(select(&mut m, &rules, "Map2", "Alpha"), MatchState::Ban1B);
        assert_eq!(select(&mut m, &rules, "Map3", "Beta"), MatchState::Ban1B);
        assert_eq!(select(&mut m, &rules, "Map4", "Beta"), MatchState::Ban2A);
        for (i, team) in ["Alpha", "Alpha", "Beta", "Beta"].iter().enumerate() {
            select(&mut m, &rules, &format!("Map{}", i + 5), team);
        }
        assert_eq!(m.state, MatchState::PickA);
        for (i, team) in ["Alpha", "Alpha", "Beta", "Beta"].iter().enumerate() {
            select(&mut m, &rules, &format!("Map{}", i + 9), team);
        }
        assert_eq!(m.state, MatchState::ScoringPhase);
        assert_eq!(m.banned_maps.len(), 8);
        assert_eq!(m.picked_maps.len(), 4);
    }

    #[test]
    fn used_map_is_rejected_without_state_change() {
        let rules = Ruleset::BRACKET;
        let mut m = bracket_match("Alpha", "Beta");
        select(&mut m, &rules, "Map1", "Alpha");
        let before = m.clone();
        let err = submit_map_selection(&mut m, &rules, "Map1", &Actor::team("Beta")).unwrap_err();
        assert_eq!(err, TransitionError::MapUnavailable("Map1".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(m, before);

        for _ in 0..3 {
            let team = m.active_team().unwrap().to_string();
            let map = format!("Other{}", m.banned_maps.len());
            select(&mut m, &rules, &map, &team);
        }
        assert_eq!(m.state, MatchState::PickA);
        let before = m.clone();
        assert!(submit_map_selection(&mut m, &rules, "Map1", &Actor::team("Alpha")).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn only_the_designated_team_may_act() {
        let rules = Ruleset::BRACKET;
        let mut m = bracket_match("Alpha", "Beta");
        let err = submit_map_selection(&mut m, &rules, "Map1", &Actor::team("Beta")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err =
            submit_map_selection(&mut m, &rules, "Map1", &Actor::team("Gamma")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(m.banned_maps.is_empty());
        assert_eq!(m.state, MatchState::Ban1A);
    }

    #[test]
    fn staff_may_act_for_either_side() {
        let rules = Ruleset::BRACKET;
        let mut m = bracket_match("Alpha", "Beta");
        submit_map_selection(&mut m, &rules, "Map1", &Actor::admin()).unwrap();
        submit_map_selection(&mut m, &rules, "Map2", &Actor::moderator()).unwrap();
        assert_eq!(m.state, MatchState::Ban2A);
    }

    #[test]
    fn no_selection_after_the_draft() {
        let rules = Ruleset::BRACKET;
        let mut m = bracket_match("Alpha", "Beta");
        m.state = MatchState::ScoringPhase;
        let err = submit_map_selection(&mut m, &rules, "Map1", &Actor::admin()).unwrap_err();
        assert_eq!(
            err,
            TransitionError::invalid(Operation::MapSelection, MatchState::ScoringPhase)
        );

        let mut cup = cup_match("Alpha", "Beta");
        assert!(submit_map_selection(&mut cup, &Ruleset::CUP, "Map1", &Actor::admin()).is_err());
    }

    #[test]
    fn blank_map_is_malformed() {
        let mut m = bracket_match("Alpha", "Beta");
        let err =
            submit_map_selection(&mut m, &Ruleset::BRACKET, "  ", &Actor::admin()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn lists_stay_disjoint_and_states_monotonic() {
        // Replays a messy sequence with repeats and wrong actors.
        let rules = Ruleset::LEAGUE;
        let mut m = league_match("Alpha", "Beta");
        let maps = ["a", "b", "a", "c", "d", "b", "e", "f", "g", "h", "c", "i", "j", "k", "l"];
        let mut last = m.state.draft_position().unwrap();
        for (i, map) in maps.iter().cycle().take(60).enumerate() {
            let actor = match i % 3 {
                0 => Actor::team("Alpha"),
                1 => Actor::team("Beta"),
                _ => Actor::moderator(),
            };
            let _ = submit_map_selection(&mut m, &rules, &format!("{}{}", map, i / 20), &actor);
            for banned in &m.banned_maps {
                assert!(!m.picked_maps.contains(banned));
            }
            let pos = m.state.draft_position().unwrap();
            assert!(pos == last || pos == last + 1);
            last = pos;
        }
        assert_eq!(m.state, *DRAFT_ORDER.last().unwrap());
    }
}
