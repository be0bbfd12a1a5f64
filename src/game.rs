use std::sync::Arc;

use crate::ai::search::Searcher;
use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{ConfigError, GameError};
use crate::types::{GameResult, GameView, Move, MoveRecord, Player, Position, SessionState};

/// Chooses the computer's move. Returns `None` only when `player` has no
/// legal move.
pub trait MoveSelector: Send + Sync {
    fn select_move(&self, board: &Board, player: Player) -> Option<Position>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FirstLegalMoveSelector;

impl MoveSelector for FirstLegalMoveSelector {
    fn select_move(&self, board: &Board, player: Player) -> Option<Position> {
        board.legal_moves(player).first().copied()
    }
}

/// Saved state restored by undo.
#[derive(Debug, Clone)]
struct Snapshot {
    board: Board,
    current_player: Player,
    history: Vec<MoveRecord>,
}

/// Everything that happened during one action: the move itself followed by
/// any passes it forced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub records: Vec<MoveRecord>,
    pub flipped: Vec<Position>,
    pub state: SessionState,
}

/// Computer move request detached from the session so it can run elsewhere.
pub struct ComputerTurn {
    board: Board,
    player: Player,
    selector: Arc<dyn MoveSelector>,
}

impl ComputerTurn {
    pub fn run(self) -> ComputerDecision {
        let choice = self.selector.select_move(&self.board, self.player);
        ComputerDecision {
            board: self.board,
            player: self.player,
            choice,
        }
    }
}

/// The computer's answer for the position it was asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerDecision {
    board: Board,
    player: Player,
    choice: Option<Position>,
}

impl ComputerDecision {
    pub fn choice(&self) -> Option<Position> {
        self.choice
    }
}

/// Human-versus-computer game: authoritative board, turn, record and undo stack.
pub struct GameSession {
    board: Board,
    current_player: Player,
    human: Player,
    history: Vec<MoveRecord>,
    snapshots: Vec<Snapshot>,
    flipped: Vec<Position>,
    is_game_over: bool,
    selector: Arc<dyn MoveSelector>,
}

impl GameSession {
    /// Starts a game against the alpha-beta searcher.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_selector(
            config.human,
            Arc::new(Searcher::new(config.search)),
        ))
    }

    pub fn with_selector(human: Player, selector: Arc<dyn MoveSelector>) -> Self {
        log::info!("new game: human plays {human}");
        Self::from_position(Board::new(), Player::Black, human, selector)
    }

    /// Starts from an arbitrary position with `current_player` to move.
    /// A side to move without a legal move passes straight away, and a
    /// position where neither side can move starts out ended.
    pub fn from_position(
        board: Board,
        current_player: Player,
        human: Player,
        selector: Arc<dyn MoveSelector>,
    ) -> Self {
        let mut session = Self {
            board,
            current_player,
            human,
            history: Vec::new(),
            snapshots: Vec::new(),
            flipped: Vec::new(),
            is_game_over: false,
            selector,
        };
        session.resolve_turn();
        session
    }

    /// Back to the opening position with a new seat assignment. The move
    /// selector is kept.
    pub fn reset(&mut self, human: Player) {
        log::info!("new game: human plays {human}");
        *self = Self::from_position(Board::new(), Player::Black, human, Arc::clone(&self.selector));
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn human_player(&self) -> Player {
        self.human
    }

    pub fn computer_player(&self) -> Player {
        self.human.opponent()
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn state(&self) -> SessionState {
        if self.is_game_over {
            SessionState::Ended
        } else if self.current_player == self.human {
            SessionState::AwaitingHumanMove
        } else {
            SessionState::AwaitingComputerMove
        }
    }

    /// Legal moves of the player to move; empty once the game is over.
    pub fn legal_moves(&self) -> Vec<Position> {
        if self.is_game_over {
            Vec::new()
        } else {
            self.board.legal_moves(self.current_player)
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.is_game_over && !self.snapshots.is_empty()
    }

    /// Number of placements that undo can still take back.
    pub fn undo_depth(&self) -> usize {
        self.snapshots.len()
    }

    pub fn result(&self) -> Option<GameResult> {
        self.is_game_over.then(|| {
            let (black, white) = self.board.count();
            GameResult::from_counts(black, white)
        })
    }

    pub fn view(&self) -> GameView {
        let (black_count, white_count) = self.board.count();
        GameView {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player,
            human_player: self.human,
            state: self.state(),
            black_count,
            white_count,
            legal_moves: self.legal_moves(),
            last_move: self.last_move().cloned(),
            flipped: self.flipped.clone(),
            is_game_over: self.is_game_over,
            can_undo: self.can_undo(),
            result: self.result(),
            history: self.history.clone(),
        }
    }

    /// Plays the human's stone at `(row, col)`.
    pub fn attempt_move(&mut self, row: u8, col: u8) -> Result<TurnOutcome, GameError> {
        let pos = Position::try_new(row, col)?;
        self.expect_turn(self.human)?;
        self.play(pos)
    }

    /// Runs the computer's search synchronously and applies the result.
    pub fn play_computer_turn(&mut self) -> Result<TurnOutcome, GameError> {
        let decision = self.begin_computer_turn()?.run();
        self.finish_computer_turn(decision)
    }

    /// Detaches the computer's move decision from the session. The returned
    /// task owns a board copy and may run on another thread.
    pub fn begin_computer_turn(&self) -> Result<ComputerTurn, GameError> {
        self.expect_turn(self.computer_player())?;
        Ok(ComputerTurn {
            board: self.board,
            player: self.current_player,
            selector: Arc::clone(&self.selector),
        })
    }

    /// Applies a decision produced by `begin_computer_turn`. Decisions made
    /// for a position that is no longer current are rejected.
    pub fn finish_computer_turn(
        &mut self,
        decision: ComputerDecision,
    ) -> Result<TurnOutcome, GameError> {
        self.expect_turn(self.computer_player())?;
        if decision.board != self.board || decision.player != self.current_player {
            return Err(GameError::StaleDecision);
        }

        let player = self.current_player;
        match decision.choice {
            Some(pos) => self.play(pos),
            None => match self.board.legal_moves(player).first() {
                Some(&fallback) => {
                    log::warn!("{player} selector gave up with legal moves left; playing {fallback}");
                    self.play(fallback)
                }
                None => Ok(TurnOutcome {
                    records: self.resolve_turn().into_iter().collect(),
                    flipped: Vec::new(),
                    state: self.state(),
                }),
            },
        }
    }

    /// The computer's first move when the human plays White. `None`, an empty
    /// string or `"AUTO"` lets the search decide; otherwise the notation names
    /// the opening square.
    pub fn play_computer_opening(
        &mut self,
        notation: Option<&str>,
    ) -> Result<TurnOutcome, GameError> {
        self.expect_turn(self.computer_player())?;
        if !self.history.is_empty() {
            return Err(GameError::OpeningAlreadyPlayed);
        }

        match notation
            .map(str::trim)
            .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("auto"))
        {
            None => self.play_computer_turn(),
            Some(notation) => {
                let pos: Position = notation.parse()?;
                self.play(pos)
            }
        }
    }

    /// Takes back the last placement, or the last two when it is the human's
    /// turn so that both the computer's reply and the human's move go.
    /// Returns `false` when nothing was undone.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        if self.snapshots.len() >= 2 && self.current_player == self.human {
            self.snapshots.pop();
        }
        let Some(snapshot) = self.snapshots.pop() else {
            return false;
        };

        self.board = snapshot.board;
        self.current_player = snapshot.current_player;
        self.history = snapshot.history;
        self.flipped.clear();
        log::debug!("undo: {} moves remain in history", self.history.len());
        true
    }

    fn expect_turn(&self, player: Player) -> Result<(), GameError> {
        if self.is_game_over {
            return Err(GameError::GameOver);
        }
        if self.current_player != player {
            return Err(GameError::NotYourTurn(player));
        }
        Ok(())
    }

    fn play(&mut self, pos: Position) -> Result<TurnOutcome, GameError> {
        let player = self.current_player;
        if !self.board.is_legal(pos, player) {
            return Err(GameError::IllegalMove(pos.notation()));
        }

        self.snapshots.push(Snapshot {
            board: self.board,
            current_player: player,
            history: self.history.clone(),
        });

        let flipped = self.board.flipped_by(pos, player);
        self.board.apply_flips(pos, player);
        let record = MoveRecord::new(player, Move::Place(pos));
        log::debug!("{player} plays {pos}, flipping {}", flipped.len());
        self.history.push(record.clone());
        self.flipped = flipped.clone();
        self.current_player = player.opponent();

        let mut records = vec![record];
        records.extend(self.resolve_turn());
        Ok(TurnOutcome {
            records,
            flipped,
            state: self.state(),
        })
    }

    /// Ends the game when neither player can move, otherwise skips the
    /// player to move when they have no legal move.
    fn resolve_turn(&mut self) -> Option<MoveRecord> {
        if self.board.has_legal_move(self.current_player) {
            return None;
        }
        if !self.board.has_legal_move(self.current_player.opponent()) {
            self.end_game();
            return None;
        }
        Some(self.record_pass(self.current_player))
    }

    fn record_pass(&mut self, player: Player) -> MoveRecord {
        log::info!("{player} has no legal move and passes");
        let record = MoveRecord::new(player, Move::Pass);
        self.history.push(record.clone());
        self.flipped.clear();
        self.current_player = player.opponent();
        record
    }

    fn end_game(&mut self) {
        self.is_game_over = true;
        let (black, white) = self.board.count();
        log::info!("game over: black {black} - white {white}");
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::config::SearchConfig;
    use crate::types::Cell;

    struct FixedMoveSelector {
        mv: Position,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(&self, _board: &Board, _player: Player) -> Option<Position> {
            Some(self.mv)
        }
    }

    fn pos(row: u8, col: u8) -> Position {
        Position { row, col }
    }

    fn board(rows: &str) -> Board {
        rows.parse().expect("test board must parse")
    }

    fn first_legal(human: Player) -> GameSession {
        GameSession::with_selector(human, Arc::new(FirstLegalMoveSelector))
    }

    /// Black to move: A1 leaves White without a reply, E8 then wipes White out.
    fn white_stuck_after_a1() -> Board {
        board(
            "
            .WB.....
            ........
            ........
            ........
            ........
            ........
            ........
            .....WWB
            ",
        )
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameSession::new(&GameConfig::default()).unwrap();
        let view = game.view();

        assert_eq!(view.current_player, Player::Black);
        assert_eq!(view.state, SessionState::AwaitingHumanMove);
        assert_eq!((view.black_count, view.white_count), (2, 2));
        assert!(!view.is_game_over);
        assert!(!view.can_undo);
        assert!(view.flipped.is_empty());
        assert!(view.history.is_empty());
        assert_eq!(view.legal_moves.len(), 4);
        assert_eq!(view.result, None);
    }

    #[test]
    fn zero_depth_config_is_rejected() {
        let config = GameConfig {
            search: SearchConfig {
                max_depth: 0,
                ..SearchConfig::default()
            },
            ..GameConfig::default()
        };

        assert!(matches!(GameSession::new(&config), Err(ConfigError::ZeroDepth)));
    }

    #[test]
    fn illegal_human_move_leaves_state_untouched() {
        let mut game = first_legal(Player::Black);
        let before = *game.board();

        let err = game.attempt_move(0, 0).unwrap_err();

        assert_eq!(err, GameError::IllegalMove("A1".to_string()));
        assert_eq!(*game.board(), before);
        assert!(game.history().is_empty());
        assert_eq!(game.undo_depth(), 0);
        assert_eq!(game.attempt_move(8, 0), Err(GameError::OutOfRange { row: 8, col: 0 }));
    }

    #[test]
    fn human_move_is_recorded_and_turn_passes_to_computer() {
        let mut game = first_legal(Player::Black);

        let outcome = game.attempt_move(3, 2).unwrap(); // C4

        assert_eq!(outcome.records, vec![MoveRecord::new(Player::Black, Move::Place(pos(3, 2)))]);
        assert_eq!(outcome.records[0].notation, "C4");
        assert_eq!(outcome.flipped, vec![pos(3, 3)]);
        assert_eq!(outcome.state, SessionState::AwaitingComputerMove);
        assert_eq!(game.board().count(), (4, 1));
        assert_eq!(game.undo_depth(), 1);
        assert_eq!(
            game.attempt_move(2, 2),
            Err(GameError::NotYourTurn(Player::Black))
        );
    }

    #[test]
    fn computer_turn_applies_selected_move() {
        let mut game = first_legal(Player::Black);
        game.attempt_move(2, 3).unwrap(); // D3

        let expected = game.board().legal_moves(Player::White)[0];
        let outcome = game.play_computer_turn().unwrap();

        assert_eq!(outcome.records[0].player, Player::White);
        assert_eq!(outcome.records[0].mv, Move::Place(expected));
        assert_eq!(game.state(), SessionState::AwaitingHumanMove);
        assert_eq!(game.undo_depth(), 2);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn computer_turn_is_refused_on_the_humans_turn() {
        let mut game = first_legal(Player::Black);

        assert_eq!(
            game.play_computer_turn().unwrap_err(),
            GameError::NotYourTurn(Player::White)
        );
    }

    #[test]
    fn illegal_computer_selection_is_an_error() {
        let mut game = GameSession::with_selector(
            Player::White,
            Arc::new(FixedMoveSelector { mv: pos(0, 0) }),
        );

        assert_eq!(
            game.play_computer_turn(),
            Err(GameError::IllegalMove("A1".to_string()))
        );
        assert_eq!(*game.board(), Board::new());
    }

    #[test]
    fn opponent_without_moves_is_skipped() {
        let mut game = GameSession::from_position(
            white_stuck_after_a1(),
            Player::Black,
            Player::Black,
            Arc::new(FirstLegalMoveSelector),
        );

        let outcome = game.attempt_move(0, 0).unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[1], MoveRecord::new(Player::White, Move::Pass));
        assert_eq!(outcome.records[1].notation, "PASS");
        assert_eq!(outcome.state, SessionState::AwaitingHumanMove);
        assert!(!game.is_game_over());
        assert_eq!(game.legal_moves(), vec![pos(7, 4)]);
    }

    #[test]
    fn game_ends_when_neither_side_can_move() {
        let mut game = GameSession::from_position(
            white_stuck_after_a1(),
            Player::Black,
            Player::Black,
            Arc::new(FirstLegalMoveSelector),
        );
        game.attempt_move(0, 0).unwrap();

        let outcome = game.attempt_move(7, 4).unwrap();

        assert_eq!(outcome.records, vec![MoveRecord::new(Player::Black, Move::Place(pos(7, 4)))]);
        assert_eq!(game.last_move().unwrap().notation, "E8");
        assert_eq!(outcome.state, SessionState::Ended);
        assert!(game.is_game_over());
        assert!(game.legal_moves().is_empty());
        assert_eq!(
            game.result(),
            Some(GameResult {
                winner: Some(Player::Black),
                black_count: 7,
                white_count: 0,
            })
        );
        assert_eq!(game.attempt_move(1, 0), Err(GameError::GameOver));
        assert!(!game.can_undo());
        assert!(!game.undo());
        assert_eq!(game.board().count(), (7, 0));
    }

    #[test]
    fn full_board_after_computer_move_ends_game() {
        let almost_full = board(&(".B".to_string() + &"W".repeat(6) + "\n" + &"WWWWWWWW\n".repeat(7)));
        let mut game = GameSession::from_position(
            almost_full,
            Player::White,
            Player::Black,
            Arc::new(FixedMoveSelector { mv: pos(0, 0) }),
        );

        let outcome = game.play_computer_turn().unwrap();

        assert_eq!(outcome.state, SessionState::Ended);
        assert_eq!(outcome.records.len(), 1);
        assert!(game.history().iter().all(|record| !record.is_pass()));
        assert_eq!(outcome.flipped, vec![pos(0, 1)]);
        assert_eq!(game.board().count(), (0, 64));
        assert_eq!(game.result().unwrap().winner, Some(Player::White));
    }

    #[test]
    fn stuck_computer_passes_when_the_game_starts() {
        // Black (computer) has nothing; White can take A1.
        let board = board(&(".B".to_string() + &"W".repeat(6) + "\n" + &"WWWWWWWW\n".repeat(7)));
        let game = GameSession::from_position(
            board,
            Player::Black,
            Player::White,
            Arc::new(FirstLegalMoveSelector),
        );

        assert_eq!(game.history(), &[MoveRecord::new(Player::Black, Move::Pass)]);
        assert_eq!(game.current_player(), Player::White);
        assert_eq!(game.state(), SessionState::AwaitingHumanMove);
        assert_eq!(game.legal_moves(), vec![pos(0, 0)]);
        assert_eq!(game.undo_depth(), 0);
    }

    #[test]
    fn stuck_human_passes_when_the_game_starts() {
        let board = board(&(".B".to_string() + &"W".repeat(6) + "\n" + &"WWWWWWWW\n".repeat(7)));
        let mut game = GameSession::from_position(
            board,
            Player::Black,
            Player::Black,
            Arc::new(FirstLegalMoveSelector),
        );

        assert_eq!(game.history(), &[MoveRecord::new(Player::Black, Move::Pass)]);
        assert_eq!(game.state(), SessionState::AwaitingComputerMove);

        let outcome = game.play_computer_turn().unwrap();

        assert_eq!(outcome.records, vec![MoveRecord::new(Player::White, Move::Place(pos(0, 0)))]);
        assert_eq!(outcome.state, SessionState::Ended);
        assert_eq!(game.board().count(), (0, 64));
    }

    #[test]
    fn dead_position_starts_out_ended() {
        let board = board("B.......\n........\n........\n........\n........\n........\n........\n.......B");

        for human in [Player::Black, Player::White] {
            let mut game = GameSession::from_position(
                board,
                Player::Black,
                human,
                Arc::new(FirstLegalMoveSelector),
            );

            assert_eq!(game.state(), SessionState::Ended);
            assert!(game.history().is_empty());
            assert_eq!(game.attempt_move(0, 1), Err(GameError::GameOver));
            assert_eq!(game.play_computer_turn(), Err(GameError::GameOver));
            assert!(!game.undo());
            assert_eq!(game.result(), Some(GameResult::from_counts(2, 0)));
        }
    }

    #[test]
    fn undo_takes_back_computer_reply_and_human_move() {
        let mut game = first_legal(Player::Black);
        game.attempt_move(2, 3).unwrap();
        game.play_computer_turn().unwrap();

        assert!(game.undo());

        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.current_player(), Player::Black);
        assert!(game.history().is_empty());
        assert!(!game.can_undo());
        assert!(!game.undo());
    }

    #[test]
    fn undo_on_computers_turn_removes_one_move() {
        let mut game = first_legal(Player::Black);
        game.attempt_move(2, 3).unwrap();
        game.play_computer_turn().unwrap();
        let reply = game.legal_moves()[0];
        game.attempt_move(reply.row, reply.col).unwrap();
        let before = game.undo_depth();

        assert!(game.undo());

        assert_eq!(before, 3);
        assert_eq!(game.undo_depth(), 2);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.current_player(), Player::Black);
    }

    #[test]
    fn undo_after_dictated_opening_returns_to_the_start() {
        let mut game = first_legal(Player::White);
        game.play_computer_opening(Some("D3")).unwrap();
        assert_eq!(game.board().get(pos(2, 3)), Cell::Black);
        assert_eq!(game.state(), SessionState::AwaitingHumanMove);

        assert!(game.undo());

        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.state(), SessionState::AwaitingComputerMove);
    }

    #[test]
    fn computer_opening_validates_notation_and_timing() {
        let mut game = first_legal(Player::White);

        assert!(matches!(
            game.play_computer_opening(Some("Z9")),
            Err(GameError::InvalidNotation(_))
        ));
        assert_eq!(
            game.play_computer_opening(Some("a1")),
            Err(GameError::IllegalMove("A1".to_string()))
        );

        let outcome = game.play_computer_opening(Some("auto")).unwrap();
        assert_eq!(outcome.records[0].notation, "D3");

        let reply = game.legal_moves()[0];
        game.attempt_move(reply.row, reply.col).unwrap();
        assert_eq!(
            game.play_computer_opening(None),
            Err(GameError::OpeningAlreadyPlayed)
        );
    }

    #[test]
    fn computer_opening_is_refused_when_human_moves_first() {
        let mut game = first_legal(Player::Black);

        assert_eq!(
            game.play_computer_opening(Some("D3")),
            Err(GameError::NotYourTurn(Player::White))
        );
    }

    #[test]
    fn deferred_computer_turn_runs_on_another_thread() {
        let mut game = first_legal(Player::White);
        let turn = game.begin_computer_turn().unwrap();

        let decision = thread::spawn(move || turn.run()).join().unwrap();
        assert_eq!(decision.choice(), Some(pos(2, 3)));
        let outcome = game.finish_computer_turn(decision).unwrap();

        assert_eq!(outcome.state, SessionState::AwaitingHumanMove);
        assert_eq!(game.board().get(pos(2, 3)), Cell::Black);
    }

    #[test]
    fn stale_computer_decision_is_rejected() {
        let mut game = first_legal(Player::Black);
        game.attempt_move(2, 3).unwrap();
        let decision = game.begin_computer_turn().unwrap().run();

        assert!(game.undo());
        game.attempt_move(3, 2).unwrap();

        assert_eq!(
            game.finish_computer_turn(decision),
            Err(GameError::StaleDecision)
        );
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn reset_starts_over_with_new_seats() {
        let mut game = first_legal(Player::Black);
        game.attempt_move(2, 3).unwrap();

        game.reset(Player::White);

        assert_eq!(*game.board(), Board::new());
        assert_eq!(game.human_player(), Player::White);
        assert_eq!(game.state(), SessionState::AwaitingComputerMove);
        assert_eq!(game.undo_depth(), 0);
    }

    #[test]
    fn snapshot_count_tracks_placements_only() {
        let mut game = GameSession::from_position(
            white_stuck_after_a1(),
            Player::Black,
            Player::Black,
            Arc::new(FirstLegalMoveSelector),
        );

        game.attempt_move(0, 0).unwrap();

        // One placement plus one pass: only the placement is undoable.
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.undo_depth(), 1);
    }
}
