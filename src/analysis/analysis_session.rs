//! Interactive analysis session.
//!
//! Owns one `AnalysisTree`, the move options in effect, a move parked while
//! the player picks a promotion or en-passant reading, and the advisor
//! session. Any cursor change drops the parked move and cancels a running
//! hint search, since both belong to the position that was left.

use tracing::{debug, info};

use crate::analysis::analysis_store::{AnalysisDocument, AnalysisStore};
use crate::analysis::analysis_tree::{AnalysisNode, AnalysisTree, NodeId};
use crate::chess_errors::{AdvisorError, MoveRejection, PersistenceError, TreeError};
use crate::config::SessionConfig;
use crate::game_state::chess_types::*;
use crate::game_state::game_end::{agree_draw, claim_draw, resign};
use crate::game_state::game_state::MoveOptions;
use crate::game_state::turn_transition::{
    attempt_move, cancel_pending, resolve_en_passant, resolve_promotion, Transition,
};
use crate::move_generation::legal_move_generator::valid_moves;
use crate::search::search_session::{HintUpdate, SearchSession};

/// What happened to a `play` or `choose_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Committed { node: NodeId, events: Vec<GameEvent> },
    AwaitingPromotion,
    AwaitingEnPassant,
}

/// Ways to end the game at the cursor without a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    ClaimDraw,
    AgreeDraw,
    /// The side to move resigns.
    Resign,
}

pub struct AnalysisSession {
    tree: AnalysisTree,
    options: MoveOptions,
    pending: Option<GameState>,
    advisor: SearchSession,
    advisor_depth: u8,
    name: String,
    folder_id: Option<String>,
}

impl AnalysisSession {
    pub fn new(root_state: GameState, config: &SessionConfig) -> Self {
        Self::with_advisor(
            AnalysisTree::new(root_state),
            MoveOptions {
                force_power_mode: false,
                auto_draws: config.auto_draws,
            },
            SearchSession::new(config.advisor_engine, config.advisor_depth),
            config.advisor_depth,
        )
    }

    pub fn with_advisor(
        tree: AnalysisTree,
        options: MoveOptions,
        advisor: SearchSession,
        advisor_depth: u8,
    ) -> Self {
        Self {
            tree,
            options,
            pending: None,
            advisor,
            advisor_depth,
            name: "Untitled analysis".to_owned(),
            folder_id: None,
        }
    }

    #[inline]
    pub fn tree(&self) -> &AnalysisTree {
        &self.tree
    }

    #[inline]
    pub fn options(&self) -> MoveOptions {
        self.options
    }

    pub fn set_force_power_mode(&mut self, enabled: bool) {
        self.options.force_power_mode = enabled;
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The parked state while a choice is open, else the cursor's state.
    pub fn state(&self) -> &GameState {
        self.pending
            .as_ref()
            .unwrap_or_else(|| self.tree.current_state())
    }

    #[inline]
    pub fn is_awaiting_choice(&self) -> bool {
        self.pending.is_some()
    }

    /// Legal destinations of the piece on `from` for the side to move.
    /// Empty for empty squares, the opponent's pieces, finished games and
    /// while a choice is open.
    pub fn select(&self, from: Square) -> Vec<Square> {
        let state = self.state();
        if self.pending.is_some() || state.status.is_over() {
            return Vec::new();
        }
        match state.board.piece_at(from) {
            Some(piece) if piece.color == state.turn => {
                valid_moves(&state.board, from, state.en_passant_target, true)
            }
            _ => Vec::new(),
        }
    }

    pub fn play(&mut self, from: Square, to: Square) -> Result<PlayOutcome, MoveRejection> {
        if self.pending.is_some() {
            return Err(MoveRejection::AwaitingChoice);
        }
        let transition = attempt_move(self.tree.current_state(), from, to, self.options)?;
        Ok(self.accept(transition))
    }

    pub fn choose_promotion(&mut self, kind: PieceKind) -> Result<PlayOutcome, MoveRejection> {
        let parked = self.pending.as_ref().ok_or(MoveRejection::NoPendingChoice)?;
        let transition = resolve_promotion(parked, kind)?;
        Ok(self.accept(transition))
    }

    pub fn choose_en_passant(&mut self, choice: EnPassantChoice) -> Result<PlayOutcome, MoveRejection> {
        let parked = self.pending.as_ref().ok_or(MoveRejection::NoPendingChoice)?;
        let transition = resolve_en_passant(parked, choice)?;
        Ok(self.accept(transition))
    }

    /// Dismiss an open choice. Nothing is committed.
    pub fn cancel_choice(&mut self) -> Result<(), MoveRejection> {
        let parked = self.pending.as_ref().ok_or(MoveRejection::NoPendingChoice)?;
        cancel_pending(parked)?;
        self.pending = None;
        Ok(())
    }

    fn accept(&mut self, transition: Transition) -> PlayOutcome {
        match transition {
            Transition::Committed { state, events } => {
                self.pending = None;
                let notation = state
                    .last_move
                    .as_ref()
                    .map(|mv| mv.notation.clone())
                    .unwrap_or_default();
                let node = self.advance_cursor(state, &notation);
                PlayOutcome::Committed { node, events }
            }
            Transition::Pending(state) => {
                let outcome = match state.phase {
                    TurnPhase::AwaitingEnPassantChoice(_) => PlayOutcome::AwaitingEnPassant,
                    _ => PlayOutcome::AwaitingPromotion,
                };
                debug!(?outcome, "move parked for a choice");
                self.pending = Some(state);
                outcome
            }
        }
    }

    fn advance_cursor(&mut self, state: GameState, notation: &str) -> NodeId {
        self.advisor.cancel();
        self.tree.commit(state, notation)
    }

    fn left_position(&mut self) {
        self.pending = None;
        self.advisor.cancel();
    }

    /// End the game at the cursor. The result is recorded as a child node
    /// whose notation is the score ("1-0", "0-1" or "1/2-1/2").
    pub fn declare(&mut self, declaration: Declaration) -> Result<NodeId, MoveRejection> {
        if self.pending.is_some() {
            return Err(MoveRejection::AwaitingChoice);
        }
        let current = self.tree.current_state();
        let finished = match declaration {
            Declaration::ClaimDraw => claim_draw(current)?,
            Declaration::AgreeDraw => agree_draw(current)?,
            Declaration::Resign => resign(current, current.turn)?,
        };
        let result = match finished.winner {
            Some(Color::Light) => "1-0",
            Some(Color::Dark) => "0-1",
            None => "1/2-1/2",
        };
        Ok(self.advance_cursor(finished, result))
    }

    pub fn undo(&mut self) -> bool {
        self.left_position();
        self.tree.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.left_position();
        self.tree.redo()
    }

    pub fn go_to(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.tree.node(id).ok_or(TreeError::UnknownNode(id.0))?;
        self.left_position();
        self.tree.go_to(id)
    }

    pub fn go_to_start(&mut self) {
        self.left_position();
        self.tree.go_to_start();
    }

    pub fn go_to_end(&mut self) {
        self.left_position();
        self.tree.go_to_end();
    }

    pub fn promote_variation(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.tree.promote_variation(id)
    }

    pub fn set_comment(&mut self, comment: Option<String>) -> Result<(), TreeError> {
        self.tree.set_comment(self.tree.current(), comment)
    }

    /// Nodes of the line through the cursor, root first.
    pub fn current_line(&self) -> Vec<&AnalysisNode> {
        self.tree
            .current_line()
            .into_iter()
            .filter_map(|id| self.tree.node(id))
            .collect()
    }

    /// Ask the advisor about the cursor position. Returns the request id.
    pub fn request_hint(&mut self) -> Result<u64, AdvisorError> {
        let state = self.tree.current_state();
        if state.status.is_over() {
            return Err(AdvisorError::Search("the game is over".to_owned()));
        }
        self.advisor.start(state, Some(self.advisor_depth))
    }

    pub fn poll_hint(&mut self) -> Vec<HintUpdate> {
        self.advisor.poll()
    }

    #[inline]
    pub fn hint(&self) -> Option<&HintUpdate> {
        self.advisor.hint()
    }

    #[inline]
    pub fn is_thinking(&self) -> bool {
        self.advisor.is_searching()
    }

    pub fn cancel_hint(&mut self) {
        self.advisor.cancel();
    }

    /// Persist the tree. A failure leaves the session untouched.
    pub fn save(
        &self,
        store: &mut dyn AnalysisStore,
        owner_id: &str,
        analysis_id: &str,
    ) -> Result<AnalysisDocument, PersistenceError> {
        let document =
            AnalysisDocument::new(self.name.clone(), self.folder_id.clone(), self.tree.snapshot());
        let stored = store.save(owner_id, analysis_id, document)?;
        info!(owner_id, analysis_id, nodes = self.tree.len(), "analysis session saved");
        Ok(stored)
    }

    /// Replace the tree with a stored one. On failure the current tree is kept.
    pub fn load(
        &mut self,
        store: &dyn AnalysisStore,
        owner_id: &str,
        analysis_id: &str,
    ) -> Result<(), PersistenceError> {
        let document = store
            .load(owner_id, analysis_id)?
            .ok_or_else(|| PersistenceError::NotFound {
                owner_id: owner_id.to_owned(),
                analysis_id: analysis_id.to_owned(),
            })?;
        let tree = AnalysisTree::from_snapshot(document.snapshot())?;

        self.left_position();
        self.tree = tree;
        self.name = document.name;
        self.folder_id = document.folder_id;
        info!(owner_id, analysis_id, nodes = self.tree.len(), "analysis session loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analysis_store::MemoryStore;
    use crate::engines::engine_trait::EngineKind;
    use crate::game_state::board::Board;

    fn session() -> AnalysisSession {
        AnalysisSession::new(GameState::new_game(), &SessionConfig::default())
    }

    fn promotion_session() -> AnalysisSession {
        let mut board = Board::empty();
        board.set(4, Some(Piece::new(PieceKind::King, Color::Light).moved()));
        board.set(60, Some(Piece::new(PieceKind::King, Color::Dark).moved()));
        board.set(49, Some(Piece::new(PieceKind::Pawn, Color::Light).moved()));
        AnalysisSession::new(GameState::from_board(board, Color::Light), &SessionConfig::default())
    }

    #[test]
    fn select_lists_destinations_for_the_side_to_move() {
        let session = session();
        assert_eq!(session.select(12), vec![20, 28]);
        assert_eq!(session.select(6), vec![21, 23]);
        assert!(session.select(52).is_empty());
        assert!(session.select(35).is_empty());
    }

    #[test]
    fn play_commits_and_dedupes() {
        let mut session = session();
        let first = session.play(12, 28).expect("e4 should be legal");
        let PlayOutcome::Committed { node, events } = first else {
            panic!("e4 should commit");
        };
        assert_eq!(events[0], GameEvent::MoveMade { notation: "e4".to_owned() });
        assert!(session.undo());
        let again = session.play(12, 28).expect("e4 should be legal");
        assert!(matches!(again, PlayOutcome::Committed { node: n, .. } if n == node));
        assert_eq!(session.tree().len(), 2);
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut session = session();
        let before = session.tree().clone();
        assert_eq!(
            session.play(12, 36),
            Err(MoveRejection::IllegalDestination(12, 36))
        );
        assert_eq!(session.tree(), &before);
    }

    #[test]
    fn promotion_is_parked_until_chosen() {
        let mut session = promotion_session();
        assert_eq!(session.play(49, 57), Ok(PlayOutcome::AwaitingPromotion));
        assert!(session.is_awaiting_choice());
        assert_eq!(session.tree().len(), 1);
        assert!(session.select(4).is_empty());
        assert_eq!(session.play(4, 5), Err(MoveRejection::AwaitingChoice));

        let done = session.choose_promotion(PieceKind::Queen).expect("queen is valid");
        assert!(matches!(done, PlayOutcome::Committed { .. }));
        assert!(!session.is_awaiting_choice());
        assert_eq!(
            session.tree().current_node().notation.as_deref(),
            Some("b8=Q+")
        );
    }

    #[test]
    fn navigation_drops_an_open_choice() {
        let mut session = promotion_session();
        session.play(49, 57).expect("push should be legal");
        assert!(!session.undo());
        assert!(!session.is_awaiting_choice());
        assert_eq!(
            session.choose_promotion(PieceKind::Queen),
            Err(MoveRejection::NoPendingChoice)
        );

        session.play(49, 57).expect("push should be legal");
        session.cancel_choice().expect("choice should be open");
        assert_eq!(session.cancel_choice(), Err(MoveRejection::NoPendingChoice));
    }

    #[test]
    fn resignation_is_recorded_as_a_result_node() {
        let mut session = session();
        session.play(12, 28).expect("e4 should be legal");
        let node = session.declare(Declaration::Resign).expect("black may resign");
        let state = &session.tree().node(node).expect("node exists").state;
        assert_eq!(state.status, GameStatus::Resignation);
        assert_eq!(state.winner, Some(Color::Light));
        assert_eq!(
            session.tree().current_node().notation.as_deref(),
            Some("1-0")
        );
        assert_eq!(
            session.declare(Declaration::AgreeDraw),
            Err(MoveRejection::GameOver)
        );
        assert_eq!(session.declare(Declaration::ClaimDraw), Err(MoveRejection::GameOver));
    }

    #[test]
    fn claim_draw_needs_a_reason() {
        let mut session = session();
        assert_eq!(
            session.declare(Declaration::ClaimDraw),
            Err(MoveRejection::NothingToClaim)
        );
    }

    #[test]
    fn save_and_load_restore_the_line() {
        let mut store = MemoryStore::new();
        let mut session = session();
        session.rename("Open games");
        session.play(12, 28).expect("e4 should be legal");
        session.play(52, 36).expect("e5 should be legal");
        session.undo();
        session.set_comment(Some("symmetry".to_owned())).expect("cursor exists");
        let line_before = session.tree().current_line();
        session.save(&mut store, "me", "open").expect("save should work");

        let mut restored = AnalysisSession::new(GameState::new_game(), &SessionConfig::default());
        restored.load(&store, "me", "open").expect("load should work");
        assert_eq!(restored.tree().current_line(), line_before);
        assert_eq!(restored.name(), "Open games");
        assert_eq!(
            restored.tree().current_node().comment.as_deref(),
            Some("symmetry")
        );
    }

    #[test]
    fn loading_a_missing_analysis_keeps_the_tree() {
        let store = MemoryStore::new();
        let mut session = session();
        session.play(12, 28).expect("e4 should be legal");
        let before = session.tree().clone();
        assert!(matches!(
            session.load(&store, "me", "nothing"),
            Err(PersistenceError::NotFound { .. })
        ));
        assert_eq!(session.tree(), &before);
    }

    #[test]
    fn hints_are_cancelled_when_the_cursor_moves() {
        let config = SessionConfig {
            advisor_engine: EngineKind::Iterative,
            advisor_depth: 4,
            ..SessionConfig::default()
        };
        let mut session = AnalysisSession::new(GameState::new_game(), &config);
        session.request_hint().expect("advisor should start");
        assert!(session.is_thinking());
        session.play(12, 28).expect("e4 should be legal");
        assert!(!session.is_thinking());
    }
}
