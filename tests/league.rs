use std::collections::HashMap;

use matchday::state::Side;
use matchday::{
    Actor, EngineError, ErrorKind, Match, MatchKind, MatchService, MatchState, MemoryStore,
    Rulebook, ScoreOutcome, ScoreSheet, ScoreSubmission,
};

fn service() -> MatchService<MemoryStore> {
    MatchService::new(MemoryStore::new(), Rulebook::default())
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}

fn find<'a>(matches: &'a [Match], team_a: &str, team_b: &str) -> &'a Match {
    matches
        .iter()
        .find(|m| {
            (m.team_a == team_a && m.team_b == team_b) || (m.team_a == team_b && m.team_b == team_a)
        })
        .unwrap()
}

#[tokio::test]
async fn league_draft_takes_two_maps_per_turn() {
    let service = service();
    let created = service
        .create_league("Division 1", names(&["Alpha", "Beta", "Gamma", "Delta"]))
        .await
        .unwrap();
    assert_eq!(created.competition.kind, MatchKind::League);
    assert_eq!(created.matches.len(), 6);
    assert!(created.matches.iter().all(|m| m.state == MatchState::Ban1A));

    let m = find(&created.matches, "Alpha", "Beta").clone();
    let first = m.team_a.clone();
    let second = m.team_b.clone();
    let after = service
        .submit_map_selection(m.id, "Map1", &Actor::team(&first))
        .await
        .unwrap();
    assert_eq!(after.state, MatchState::Ban1A);
    let after = service
        .submit_map_selection(m.id, "Map2", &Actor::team(&first))
        .await
        .unwrap();
    assert_eq!(after.state, MatchState::Ban1B);
    assert_eq!(after.active_team(), Some(second.as_str()));
}

#[tokio::test]
async fn league_result_needs_both_lineups() {
    let service = service();
    let created = service
        .create_league("Division 1", names(&["Alpha", "Beta", "Gamma"]))
        .await
        .unwrap();
    assert_eq!(created.matches.len(), 3);
    let m = find(&created.matches, "Alpha", "Beta").clone();

    let mut current = m.clone();
    for map in 1..=12 {
        let team = current.active_team().unwrap().to_string();
        current = service
            .submit_map_selection(m.id, &format!("Map{}", map), &Actor::team(team))
            .await
            .unwrap();
    }
    assert_eq!(current.state, MatchState::ScoringPhase);
    assert_eq!(current.banned_maps.len(), 8);
    assert_eq!(current.picked_maps.len(), 4);

    let (scores_a, scores_b) = if current.team_a == "Alpha" {
        (vec![13, 13, 7, 13], vec![4, 9, 13, 2])
    } else {
        (vec![4, 9, 13, 2], vec![13, 13, 7, 13])
    };
    let report = |lineup: &[&str]| ScoreSubmission {
        sheet: ScoreSheet::new(scores_a.clone(), scores_b.clone()).unwrap(),
        lineup: names(lineup),
    };
    service
        .submit_scores(m.id, report(&["ace", "bolt"]), &Actor::team("Alpha"))
        .await
        .unwrap();
    let agreed = service
        .submit_scores(m.id, report(&["cat", "dove"]), &Actor::team("Beta"))
        .await
        .unwrap();
    assert_eq!(agreed.outcome, ScoreOutcome::AwaitingLineups);
    assert_eq!(agreed.advancement, None);
    assert_eq!(agreed.updated.state, MatchState::Confirming);

    let err = service
        .confirm_lineup(m.id, &Actor::admin())
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    service
        .confirm_lineup(m.id, &Actor::team("Beta"))
        .await
        .unwrap();
    let done = service
        .confirm_lineup(m.id, &Actor::team("Alpha"))
        .await
        .unwrap();
    assert_eq!(done.state, MatchState::Finished);
    let alpha_lineup = if done.team_a == "Alpha" { &done.lineup_a } else { &done.lineup_b };
    assert_eq!(alpha_lineup, &names(&["ace", "bolt"]));
    assert!(done.draft_a.is_none() && done.draft_b.is_none());

    let table = service.standings(created.competition.id).await.unwrap();
    assert_eq!(table[0].team, "Alpha");
    assert_eq!((table[0].played, table[0].won, table[0].own_score), (1, 1, 46));
    let beta = table.iter().find(|s| s.team == "Beta").unwrap();
    assert_eq!((beta.played, beta.lost, beta.own_score), (1, 1, 28));
    let gamma = table.iter().find(|s| s.team == "Gamma").unwrap();
    assert_eq!(gamma.played, 0);
}

#[tokio::test]
async fn cup_matches_are_run_by_staff() {
    let service = service();
    let created = service
        .create_cup(
            "Friday Cup",
            names(&["Alpha", "Beta", "Gamma", "Delta"]),
            HashMap::new(),
        )
        .await
        .unwrap();
    assert!(created
        .matches
        .iter()
        .all(|m| m.state == MatchState::WaitingForReady));
    let m = find(&created.matches, "Alpha", "Gamma").clone();
    let admin = Actor::admin();

    let err = service
        .submit_map_selection(m.id, "Ascent", &Actor::team("Alpha"))
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::InvalidTransition));

    service.check_in(m.id, true, true, &Actor::moderator()).await.unwrap();
    let side = m.side_of("Alpha").unwrap();
    let updated = service
        .set_lineup(m.id, side, names(&["p1", "p2"]), &Actor::team("Alpha"))
        .await
        .unwrap();
    let (alpha_confirmed, other_confirmed) = match side {
        Side::A => (updated.confirmed_a, updated.confirmed_b),
        Side::B => (updated.confirmed_b, updated.confirmed_a),
    };
    assert!(!alpha_confirmed && other_confirmed);

    let ready = service
        .set_cup_maps(m.id, names(&["Ascent", "Bind"]), &admin)
        .await
        .unwrap();
    assert_eq!(ready.state, MatchState::WaitingForCode);
    let live = service.set_lobby_code(m.id, "LOBBY42", &admin).await.unwrap();
    assert_eq!(live.state, MatchState::InProgress);

    let result = ScoreSheet::new(vec![13, 13], vec![4, 6]).unwrap();

    let err = service
        .submit_scores(m.id, result.clone().into(), &Actor::team("Alpha"))
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    let report = service
        .submit_scores(m.id, result.into(), &admin)
        .await
        .unwrap();
    assert_eq!(report.outcome, ScoreOutcome::Committed);
    assert_eq!(report.advancement, None);
    assert_eq!(report.updated.state, MatchState::Finished);

    let err = service.set_lobby_code(m.id, "AGAIN", &admin).await.unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::InvalidTransition));
}

#[tokio::test]
async fn bad_rosters_and_unknown_competitions() {
    let service = service();
    let err = service
        .create_league("Broken", names(&["Alpha", "Alpha"]))
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::MalformedInput));
    assert_eq!(service.store().match_count().await, 0);

    let err = service.standings(7).await.unwrap_err();
    assert!(matches!(err, EngineError::CompetitionNotFound(7)));
}

#[tokio::test]
async fn cup_rosters_fill_every_lineup() {
    let service = service();
    let rosters = HashMap::from([
        ("Alpha".to_string(), names(&["ace", " bolt"])),
        ("Beta".to_string(), names(&["cat"])),
    ]);
    let created = service
        .create_cup("Saturday Cup", names(&["Alpha", "Beta", "Gamma"]), rosters)
        .await
        .unwrap();
    let m = find(&created.matches, "Alpha", "Beta");
    let (alpha, beta) = if m.team_a == "Alpha" {
        (&m.lineup_a, &m.lineup_b)
    } else {
        (&m.lineup_b, &m.lineup_a)
    };
    assert_eq!(alpha, &names(&["ace", "bolt"]));
    assert_eq!(beta, &names(&["cat"]));
    let m = find(&created.matches, "Beta", "Gamma");
    let gamma = if m.team_a == "Gamma" { &m.lineup_a } else { &m.lineup_b };
    assert!(gamma.is_empty());
    assert_eq!(service.get_match(m.id).await.unwrap(), *m);

    let stranger = HashMap::from([("Omega".to_string(), names(&["x"]))]);
    let err = service
        .create_cup("Broken", names(&["Alpha", "Beta"]), stranger)
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::MalformedInput));
    assert_eq!(service.store().match_count().await, 3);
}

#[tokio::test]
async fn archiving_is_left_to_staff() {
    let service = service();
    let created = service
        .create_league("Division 2", names(&["Alpha", "Beta"]))
        .await
        .unwrap();
    let id = created.competition.id;
    assert!(!created.competition.archived);

    let err = service
        .set_archived(id, true, &Actor::team("Alpha"))
        .await
        .unwrap_err();
    assert_eq!(err.rejection().map(|e| e.kind()), Some(ErrorKind::Unauthorized));
    assert!(!service.competition(id).await.unwrap().competition.archived);

    let archived = service.set_archived(id, true, &Actor::admin()).await.unwrap();
    assert!(archived.archived);
    assert!(service.competition(id).await.unwrap().competition.archived);
    service.set_archived(id, false, &Actor::moderator()).await.unwrap();
    assert!(!service.competition(id).await.unwrap().competition.archived);

    let err = service.set_archived(42, true, &Actor::admin()).await.unwrap_err();
    assert!(matches!(err, EngineError::CompetitionNotFound(42)));
}
