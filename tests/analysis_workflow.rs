use power_chess::analysis::analysis_session::{AnalysisSession, PlayOutcome};
use power_chess::analysis::analysis_store::{AnalysisStore, JsonFileStore};
use power_chess::analysis::analysis_tree::{AnalysisTree, TreeSnapshot};
use power_chess::config::SessionConfig;
use power_chess::engines::engine_trait::EngineKind;
use power_chess::game_state::chess_types::*;
use power_chess::game_state::game_state::MoveOptions;
use power_chess::game_state::turn_transition::attempt_move;
use power_chess::search::advisor_protocol::AdvisorResponse;
use power_chess::search::search_session::{MonotonicIds, SearchSession};

fn played(session: &mut AnalysisSession, from: Square, to: Square) -> power_chess::analysis::analysis_tree::NodeId {
    match session.play(from, to).expect("move should be legal") {
        PlayOutcome::Committed { node, .. } => node,
        other => panic!("expected a committed move, got {other:?}"),
    }
}

#[test]
fn variations_branch_and_promote() {
    let mut session = AnalysisSession::new(GameState::new_game(), &SessionConfig::default());
    let root = session.tree().root();

    let nf3 = played(&mut session, 6, 21);
    session.go_to(root).expect("root exists");
    let e4 = played(&mut session, 12, 28);

    assert_eq!(session.tree().children(root).expect("root exists"), &[nf3, e4]);
    session.promote_variation(e4).expect("e4 exists");
    assert_eq!(session.tree().children(root).expect("root exists"), &[e4, nf3]);
    assert_eq!(
        session.tree().node(nf3).and_then(|n| n.notation.as_deref()),
        Some("Nf3")
    );
}

#[test]
fn snapshot_json_round_trip_keeps_the_current_line() {
    let mut tree = AnalysisTree::new(GameState::new_game());
    let mut state = GameState::new_game();
    for (from, to) in [(12, 28), (52, 36), (6, 21)] {
        state = attempt_move(&state, from, to, MoveOptions::default())
            .expect("move should be legal")
            .into_state();
        let notation = state.last_move.as_ref().map(|m| m.notation.clone()).unwrap_or_default();
        tree.commit(state.clone(), &notation);
    }
    tree.undo();
    tree.undo();

    let json = serde_json::to_string(&tree.snapshot()).expect("snapshot should serialize");
    let snapshot: TreeSnapshot = serde_json::from_str(&json).expect("snapshot should parse");
    let restored = AnalysisTree::from_snapshot(snapshot).expect("snapshot should be valid");

    assert_eq!(restored.current_line(), tree.current_line());
    assert_eq!(restored.current(), tree.current());
    assert_eq!(restored, tree);
}

#[test]
fn stale_advisor_responses_are_ignored() {
    let mut advisor =
        SearchSession::with_ids(EngineKind::Greedy, 1, Box::new(MonotonicIds::starting_at(100)));
    let game = GameState::new_game();
    assert_eq!(advisor.start(&game, None).expect("advisor should start"), 100);
    assert_eq!(advisor.start(&game, None).expect("advisor should start"), 101);

    let hint_before = advisor.hint().cloned();
    let late = AdvisorResponse::Progress {
        request_id: 100,
        move_notation: "e4".to_owned(),
        depth: 1,
    };
    assert_eq!(advisor.handle_response(late), None);
    assert_eq!(advisor.hint().cloned(), hint_before);
    assert_eq!(advisor.latest_request(), Some(101));
    advisor.cancel();
}

#[test]
fn file_store_survives_a_reload() {
    let dir = std::env::temp_dir().join(format!("power_chess_workflow_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut store = JsonFileStore::new(&dir);

    let mut session = AnalysisSession::new(GameState::new_game(), &SessionConfig::default());
    played(&mut session, 12, 28);
    played(&mut session, 51, 35);
    session.save(&mut store, "local", "scandi").expect("save should work");

    let mut reopened = AnalysisSession::new(GameState::new_game(), &SessionConfig::default());
    reopened.load(&store, "local", "scandi").expect("load should work");
    assert_eq!(reopened.tree().current_line(), session.tree().current_line());
    assert_eq!(reopened.state(), session.state());
    assert_eq!(store.list("local").expect("list should work"), vec!["scandi".to_owned()]);

    let _ = std::fs::remove_dir_all(&dir);
}
