//! Scoring and leveling on top of a [`Board`]

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::{ActivePiece, Board, Command};
use crate::config::GameConfig;
use crate::error::{EngineError, Result};
use crate::events::{BoardEvent, GameEvent, Publisher, ScoreChange, SubscriptionId};
use crate::matrix::Matrix;
use crate::scoring;
use crate::supplier::{SevenBag, ShapeSupplier};

/// Everything a display needs to redraw a game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Locked cells with the active piece drawn in
    pub matrix: Matrix,
    pub score: u64,
    pub level: u32,
    pub rows_cleared: usize,
    pub game_over: bool,
}

/// A single player's game: one board, its score and its level
///
/// The game has no clock of its own. Call [`tick`](Game::tick) on the
/// [`drop_interval`](Game::drop_interval), or hand the game to
/// [`Game::spawn`] to have a tokio task do it.
pub struct Game {
    board: Board,
    board_events: flume::Receiver<BoardEvent>,
    config: GameConfig,
    score: u64,
    level: u32,
    rows_cleared: usize,
    over: bool,
    events: Publisher<GameEvent>,
}

impl Game {
    /// Game on an empty `cols` x `rows` board with the default configuration
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Self::builder(cols, rows).build()
    }

    pub fn builder(cols: usize, rows: usize) -> GameBuilder {
        GameBuilder::new(cols, rows)
    }

    /// Gravity tick
    pub fn tick(&mut self) {
        self.with_board(Board::step);
    }

    pub fn left(&mut self) {
        self.with_board(Board::left);
    }

    pub fn right(&mut self) {
        self.with_board(Board::right);
    }

    pub fn down(&mut self) {
        self.with_board(Board::down);
    }

    pub fn rotate(&mut self) {
        self.with_board(Board::rotate);
    }

    pub fn smash(&mut self) {
        self.with_board(Board::smash);
    }

    pub fn apply(&mut self, command: Command) {
        if self.over {
            tracing::warn!("Ignoring {} command, game is over", command.as_str());
            return;
        }
        self.with_board(|board| board.apply(command));
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn rows_cleared(&self) -> usize {
        self.rows_cleared
    }

    /// Time between gravity ticks at the current level
    pub fn drop_interval(&self) -> Duration {
        self.config.drop_interval(self.level)
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            matrix: self.board.render(),
            score: self.score,
            level: self.level,
            rows_cleared: self.rows_cleared,
            game_over: self.over,
        }
    }

    /// Register a listener called for every game notification
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, flume::Receiver<GameEvent>) {
        self.events.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Run one board operation and translate what it published
    fn with_board(&mut self, op: impl FnOnce(&mut Board)) {
        if self.over {
            return;
        }
        op(&mut self.board);
        while let Ok(event) = self.board_events.try_recv() {
            self.handle(event);
        }
    }

    fn handle(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Changed(matrix) => self.events.publish(&GameEvent::BoardChanged(matrix)),
            BoardEvent::RowsCleared(count) => self.rows_removed(count),
            BoardEvent::GameOver => {
                if self.over {
                    return;
                }
                self.over = true;
                tracing::info!(
                    "Game over with score {} at level {}, {} rows cleared",
                    self.score,
                    self.level,
                    self.rows_cleared
                );
                self.events.publish(&GameEvent::GameOver {
                    final_score: self.score,
                });
            }
        }
    }

    /// Points are counted at the level in force before any level-up
    fn rows_removed(&mut self, count: usize) {
        self.events.publish(&GameEvent::RowsCleared(count));

        let gained = scoring::score_for_rows(count, self.level);
        self.score += gained;
        self.rows_cleared += count;
        self.events.publish(&GameEvent::ScoreChanged(ScoreChange {
            gained,
            total: self.score,
            display_for: self.config.score_display,
        }));

        let level = scoring::level_for(self.config.start_level, self.rows_cleared, self.config.rows_per_level);
        if level > self.level {
            self.level = level;
            tracing::info!("Level {} reached, drop interval {:?}", level, self.drop_interval());
            self.events.publish(&GameEvent::LevelChanged(level));
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("rows_cleared", &self.rows_cleared)
            .field("over", &self.over)
            .finish()
    }
}

/// Builder for [`Game`]
pub struct GameBuilder {
    cols: usize,
    rows: usize,
    config: GameConfig,
    supplier: Option<Box<dyn ShapeSupplier>>,
    matrix: Option<Matrix>,
    piece: Option<ActivePiece>,
    events: Publisher<GameEvent>,
}

impl GameBuilder {
    fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            config: GameConfig::default(),
            supplier: None,
            matrix: None,
            piece: None,
            events: Publisher::new(),
        }
    }

    /// Set the game configuration
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Source of new pieces; a 7-bag when not set
    pub fn supplier(mut self, supplier: impl ShapeSupplier + 'static) -> Self {
        self.supplier = Some(Box::new(supplier));
        self
    }

    /// Start from pre-filled locked cells. Must be `cols` x `rows`.
    pub fn initial_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Start with a piece already falling
    pub fn initial_piece(mut self, piece: ActivePiece) -> Self {
        self.piece = Some(piece);
        self
    }

    pub fn on_board_change<F>(mut self, mut listener: F) -> Self
    where
        F: FnMut(&Matrix) + Send + 'static,
    {
        self.events.subscribe(move |event| {
            if let GameEvent::BoardChanged(matrix) = event {
                listener(matrix);
            }
        });
        self
    }

    pub fn on_score_change<F>(mut self, mut listener: F) -> Self
    where
        F: FnMut(&ScoreChange) + Send + 'static,
    {
        self.events.subscribe(move |event| {
            if let GameEvent::ScoreChanged(change) = event {
                listener(change);
            }
        });
        self
    }

    pub fn on_level_change<F>(mut self, mut listener: F) -> Self
    where
        F: FnMut(u32) + Send + 'static,
    {
        self.events.subscribe(move |event| {
            if let GameEvent::LevelChanged(level) = event {
                listener(*level);
            }
        });
        self
    }

    pub fn on_rows_cleared<F>(mut self, mut listener: F) -> Self
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.events.subscribe(move |event| {
            if let GameEvent::RowsCleared(count) = event {
                listener(*count);
            }
        });
        self
    }

    pub fn on_game_over<F>(mut self, mut listener: F) -> Self
    where
        F: FnMut(u64) + Send + 'static,
    {
        self.events.subscribe(move |event| {
            if let GameEvent::GameOver { final_score } = event {
                listener(*final_score);
            }
        });
        self
    }

    pub fn build(self) -> Result<Game> {
        self.config.validate()?;
        let matrix = match self.matrix {
            Some(matrix) if matrix.cols() != self.cols || matrix.rows() != self.rows => {
                return Err(EngineError::MatrixSizeMismatch {
                    cols: self.cols,
                    rows: self.rows,
                    actual_cols: matrix.cols(),
                    actual_rows: matrix.rows(),
                });
            }
            Some(matrix) => matrix,
            None => Matrix::new(self.cols, self.rows)?,
        };
        let supplier = self
            .supplier
            .unwrap_or_else(|| Box::new(SevenBag::new()));
        let mut board = Board::assemble(matrix, self.piece, supplier)?;
        let (_, board_events) = board.subscribe_channel();

        tracing::debug!(
            "Game created on {}x{} board, start level {}",
            self.cols,
            self.rows,
            self.config.start_level
        );
        Ok(Game {
            board,
            board_events,
            level: self.config.start_level,
            config: self.config,
            score: 0,
            rows_cleared: 0,
            over: false,
            events: self.events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::matrix::tests::{matrix, picture};
    use crate::matrix::Color;
    use crate::shape::Shape;
    use std::sync::{Arc, Mutex};

    /// Vertical I dropped into column 4
    fn i_in_column_four() -> ActivePiece {
        ActivePiece::new(Shape::i(Color::CYAN), Position::new(2, 0))
    }

    fn well(rows: usize) -> Matrix {
        matrix(&vec!["####.#####"; rows])
    }

    #[test]
    fn test_single_row_clear_scores() {
        let m = matrix(&["..........", "..........", "..........", "####.#####"]);
        let mut game = Game::builder(10, 4)
            .supplier(|| Shape::o(Color::YELLOW))
            .initial_matrix(m)
            .initial_piece(i_in_column_four())
            .build()
            .unwrap();
        let (_, events) = game.subscribe_channel();

        game.smash();

        let events: Vec<GameEvent> = events.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], GameEvent::BoardChanged(_)));
        assert_eq!(events[1], GameEvent::RowsCleared(1));
        assert_eq!(
            events[2],
            GameEvent::ScoreChanged(ScoreChange {
                gained: 40,
                total: 40,
                display_for: Duration::from_secs(1),
            })
        );
        assert_eq!(game.score(), 40);
        assert_eq!(game.rows_cleared(), 1);
        assert_eq!(game.level(), 1);
        assert_eq!(
            picture(game.board().matrix()),
            vec!["..........", "....#.....", "....#.....", "....#....."]
        );
    }

    #[test]
    fn test_tetris_scores_at_level_before_level_up() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let sink = levels.clone();
        let mut game = Game::builder(10, 4)
            .config(GameConfig::new().with_rows_per_level(1).with_start_level(2))
            .supplier(|| Shape::o(Color::YELLOW))
            .initial_matrix(well(4))
            .initial_piece(i_in_column_four())
            .on_level_change(move |level| sink.lock().unwrap().push(level))
            .build()
            .unwrap();

        game.smash();

        assert_eq!(game.score(), 2400);
        assert_eq!(game.level(), 6);
        assert_eq!(*levels.lock().unwrap(), vec![6]);
        assert_eq!(game.board().matrix().occupied(), 0);
    }

    #[test]
    fn test_level_up_shortens_drop_interval() {
        let mut game = Game::builder(10, 4)
            .config(GameConfig::new().with_rows_per_level(1))
            .supplier(|| Shape::o(Color::YELLOW))
            .initial_matrix(well(4))
            .initial_piece(i_in_column_four())
            .build()
            .unwrap();
        let before = game.drop_interval();
        assert_eq!(before, Duration::from_millis(1000));

        game.tick();

        assert_eq!(game.level(), 5);
        assert_eq!(game.drop_interval(), Duration::from_millis(400));
        assert!(game.drop_interval() < before);
    }

    #[test]
    fn test_no_level_change_below_threshold() {
        let mut game = Game::builder(10, 4)
            .supplier(|| Shape::o(Color::YELLOW))
            .initial_matrix(well(4))
            .initial_piece(i_in_column_four())
            .build()
            .unwrap();
        let (_, events) = game.subscribe_channel();
        game.smash();
        assert_eq!(game.level(), 1);
        assert_eq!(game.score(), 1200);
        assert!(!events
            .try_iter()
            .any(|event| matches!(event, GameEvent::LevelChanged(_))));
    }

    #[test]
    fn test_game_over_reports_final_score_once() {
        let finals = Arc::new(Mutex::new(Vec::new()));
        let sink = finals.clone();
        let mut game = Game::builder(10, 4)
            .supplier(|| Shape::i(Color::CYAN))
            .initial_matrix(matrix(&[".....#....", "..........", "..........", ".........."]))
            .on_game_over(move |score| sink.lock().unwrap().push(score))
            .build()
            .unwrap();
        let (_, events) = game.subscribe_channel();

        game.tick();
        assert!(game.is_over());
        assert_eq!(events.try_recv().unwrap(), GameEvent::GameOver { final_score: 0 });

        game.tick();
        game.left();
        game.apply(Command::HardDrop);
        assert!(events.try_recv().is_err());
        assert_eq!(*finals.lock().unwrap(), vec![0]);
        assert!(game.snapshot().game_over);
    }

    #[test]
    fn test_board_changes_are_forwarded() {
        let changes = Arc::new(Mutex::new(0));
        let counter = changes.clone();
        let mut game = Game::builder(10, 10)
            .supplier(|| Shape::t(Color::PURPLE))
            .on_board_change(move |_| *counter.lock().unwrap() += 1)
            .build()
            .unwrap();
        game.tick();
        game.left();
        game.rotate();
        game.down();
        game.right();
        assert_eq!(*changes.lock().unwrap(), 5);
    }

    #[test]
    fn test_rows_cleared_callback() {
        let cleared = Arc::new(Mutex::new(Vec::new()));
        let sink = cleared.clone();
        let scores = Arc::new(Mutex::new(Vec::new()));
        let score_sink = scores.clone();
        let mut game = Game::builder(10, 4)
            .supplier(|| Shape::o(Color::YELLOW))
            .initial_matrix(well(4))
            .initial_piece(i_in_column_four())
            .on_rows_cleared(move |count| sink.lock().unwrap().push(count))
            .on_score_change(move |change| score_sink.lock().unwrap().push(change.total))
            .build()
            .unwrap();
        game.tick();
        assert_eq!(*cleared.lock().unwrap(), vec![4]);
        assert_eq!(*scores.lock().unwrap(), vec![1200]);
    }

    #[test]
    fn test_matrix_size_mismatch() {
        let result = Game::builder(10, 20).initial_matrix(Matrix::new(10, 10).unwrap()).build();
        assert!(matches!(
            result,
            Err(EngineError::MatrixSizeMismatch {
                cols: 10,
                rows: 20,
                actual_cols: 10,
                actual_rows: 10
            })
        ));
    }

    #[test]
    fn test_invalid_config_fails_build() {
        let result = Game::builder(10, 20)
            .config(GameConfig::new().with_rows_per_level(0))
            .build();
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
        assert!(matches!(Game::new(0, 20), Err(EngineError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_initial_piece_must_fit() {
        let result = Game::builder(10, 4)
            .initial_matrix(matrix(&["....#.....", "..........", "..........", ".........."]))
            .initial_piece(i_in_column_four())
            .build();
        assert!(matches!(result, Err(EngineError::PieceDoesNotFit { .. })));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = Game::builder(4, 3).supplier(|| Shape::o(Color::YELLOW)).build().unwrap();
        game.tick();
        let snapshot = game.snapshot();
        assert_eq!(picture(&snapshot.matrix), vec![".##.", ".##.", "...."]);
        assert_eq!(snapshot.level, 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut game = Game::builder(10, 10).supplier(|| Shape::o(Color::YELLOW)).build().unwrap();
        let (id, events) = game.subscribe_channel();
        assert!(game.unsubscribe(id));
        game.tick();
        assert!(events.try_recv().is_err());
    }
}
