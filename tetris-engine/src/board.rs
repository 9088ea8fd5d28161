//! Board state machine: movement, locking, row clearing and spawning

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::events::{BoardEvent, Publisher, SubscriptionId};
use crate::matrix::{Cell, Matrix};
use crate::shape::Shape;
use crate::supplier::{SevenBag, ShapeSupplier};

/// Player command, as delivered by whatever input transport sits in front of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
}

impl Command {
    /// Parse a controller word: `left`, `right`, `down`, `rotate` (or `tap`) or `drop`
    pub fn from_word(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Command::MoveLeft),
            "right" => Some(Command::MoveRight),
            "down" => Some(Command::MoveDown),
            "rotate" | "tap" => Some(Command::Rotate),
            "drop" | "smash" => Some(Command::HardDrop),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Command::MoveLeft => "left",
            Command::MoveRight => "right",
            Command::MoveDown => "down",
            Command::Rotate => "rotate",
            Command::HardDrop => "drop",
        }
    }
}

impl std::str::FromStr for Command {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_word(s.trim()).ok_or_else(|| EngineError::UnknownCommand(s.to_string()))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anchor of the active piece in matrix coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: isize,
    pub y: isize,
}

impl Position {
    pub fn new(x: isize, y: isize) -> Self {
        Self { x, y }
    }

    fn offset(&self, dx: isize, dy: isize) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// The falling, not yet locked piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePiece {
    pub shape: Shape,
    pub position: Position,
}

impl ActivePiece {
    pub fn new(shape: Shape, position: Position) -> Self {
        Self { shape, position }
    }

    /// Absolute matrix cells covered by the piece
    pub fn cells(&self) -> impl Iterator<Item = (isize, isize)> + '_ {
        self.shape
            .occupied_offsets()
            .into_iter()
            .map(|(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }
}

/// Matrix plus at most one active piece, fed by a next-shape supplier
///
/// Every operation either succeeds and notifies subscribers, is a silent
/// no-op (blocked move, no active piece, game already over), or ends the game.
pub struct Board {
    matrix: Matrix,
    active: Option<ActivePiece>,
    next_shape: Box<dyn ShapeSupplier>,
    game_over: bool,
    events: Publisher<BoardEvent>,
}

impl Board {
    /// Empty `cols` x `rows` board dealing shapes from a 7-bag
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        Self::with_supplier(cols, rows, SevenBag::new())
    }

    pub fn with_supplier(cols: usize, rows: usize, supplier: impl ShapeSupplier + 'static) -> Result<Self> {
        Self::from_parts(Matrix::new(cols, rows)?, None, supplier)
    }

    /// Board with a prepared matrix and optionally an active piece already falling.
    /// Fails when the piece is out of bounds or overlaps locked cells.
    pub fn from_parts(
        matrix: Matrix,
        active: Option<ActivePiece>,
        supplier: impl ShapeSupplier + 'static,
    ) -> Result<Self> {
        Self::assemble(matrix, active, Box::new(supplier))
    }

    pub(crate) fn assemble(
        matrix: Matrix,
        active: Option<ActivePiece>,
        next_shape: Box<dyn ShapeSupplier>,
    ) -> Result<Self> {
        if let Some(piece) = &active {
            if !Self::fits(&matrix, piece) {
                return Err(EngineError::PieceDoesNotFit {
                    shape: piece.shape.kind().to_string(),
                    x: piece.position.x,
                    y: piece.position.y,
                });
            }
        }
        Ok(Self {
            matrix,
            active,
            next_shape,
            game_over: false,
            events: Publisher::new(),
        })
    }

    pub fn cols(&self) -> usize {
        self.matrix.cols()
    }

    pub fn rows(&self) -> usize {
        self.matrix.rows()
    }

    /// Locked cells only
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Locked cells with the active piece drawn in, as a display shows them
    pub fn render(&self) -> Matrix {
        let mut matrix = self.matrix.clone();
        if let Some(piece) = &self.active {
            let cell = Cell::Block(piece.shape.color());
            for (x, y) in piece.cells() {
                matrix.set(x, y, cell);
            }
        }
        matrix
    }

    /// Subscribe to every board notification
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&BoardEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn subscribe_channel(&mut self) -> (SubscriptionId, flume::Receiver<BoardEvent>) {
        self.events.subscribe_channel()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn on_board_change<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&Matrix) + Send + 'static,
    {
        self.subscribe(move |event| {
            if let BoardEvent::Changed(matrix) = event {
                listener(matrix);
            }
        })
    }

    pub fn on_row_clear<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(usize) + Send + 'static,
    {
        self.subscribe(move |event| {
            if let BoardEvent::RowsCleared(count) = event {
                listener(*count);
            }
        })
    }

    pub fn on_game_over<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut() + Send + 'static,
    {
        self.subscribe(move |event| {
            if let BoardEvent::GameOver = event {
                listener();
            }
        })
    }

    /// Gravity tick. Spawns when no piece is falling, otherwise moves the
    /// piece down one row or locks it where it stands.
    pub fn step(&mut self) {
        if self.game_over {
            return;
        }
        match self.active {
            None => self.spawn(),
            Some(piece) => {
                if !self.try_move(piece, 0, 1) {
                    self.lock(piece);
                }
            }
        }
    }

    pub fn left(&mut self) {
        self.shift(-1, 0);
    }

    pub fn right(&mut self) {
        self.shift(1, 0);
    }

    /// Move down one row. Unlike [`step`](Self::step) a blocked piece is left alone.
    pub fn down(&mut self) {
        self.shift(0, 1);
    }

    /// Turn clockwise in place. Rejected outright if any turned cell is out of
    /// bounds or occupied; no kick positions are tried.
    pub fn rotate(&mut self) {
        let Some(piece) = self.active.filter(|_| !self.game_over) else {
            return;
        };
        let turned = ActivePiece::new(piece.shape.rotated(), piece.position);
        if Self::fits(&self.matrix, &turned) {
            self.active = Some(turned);
            self.notify_changed();
        }
    }

    /// Drop to the lowest reachable row and lock immediately
    pub fn smash(&mut self) {
        let Some(mut piece) = self.active.filter(|_| !self.game_over) else {
            return;
        };
        loop {
            let below = ActivePiece::new(piece.shape, piece.position.offset(0, 1));
            if !Self::fits(&self.matrix, &below) {
                break;
            }
            piece = below;
        }
        self.lock(piece);
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveLeft => self.left(),
            Command::MoveRight => self.right(),
            Command::MoveDown => self.down(),
            Command::Rotate => self.rotate(),
            Command::HardDrop => self.smash(),
        }
    }

    /// Spawn anchor: horizontally centred box, topmost block on row 0
    pub fn spawn_position(&self, shape: &Shape) -> Position {
        let x = (self.cols() as isize - shape.box_size() as isize).div_euclid(2);
        Position::new(x, -shape.top())
    }

    fn spawn(&mut self) {
        let shape = self.next_shape.next_shape();
        let piece = ActivePiece::new(shape, self.spawn_position(&shape));
        if !Self::fits(&self.matrix, &piece) {
            tracing::info!(
                "Spawned {} does not fit at ({}, {}), game over",
                shape.kind(),
                piece.position.x,
                piece.position.y
            );
            self.game_over = true;
            self.events.publish(&BoardEvent::GameOver);
            return;
        }
        tracing::debug!("Spawned {} at ({}, {})", shape.kind(), piece.position.x, piece.position.y);
        self.active = Some(piece);
        self.notify_changed();
    }

    fn shift(&mut self, dx: isize, dy: isize) {
        if self.game_over {
            return;
        }
        if let Some(piece) = self.active {
            self.try_move(piece, dx, dy);
        }
    }

    fn try_move(&mut self, piece: ActivePiece, dx: isize, dy: isize) -> bool {
        let moved = ActivePiece::new(piece.shape, piece.position.offset(dx, dy));
        if !Self::fits(&self.matrix, &moved) {
            return false;
        }
        self.active = Some(moved);
        self.notify_changed();
        true
    }

    /// Write the piece into the matrix, release it and clear full rows
    fn lock(&mut self, piece: ActivePiece) {
        let cell = Cell::Block(piece.shape.color());
        for (x, y) in piece.cells() {
            self.matrix.set(x, y, cell);
        }
        self.active = None;
        let cleared = self.matrix.clear_full_rows();
        tracing::debug!(
            "Locked {} at ({}, {}), {} rows cleared",
            piece.shape.kind(),
            piece.position.x,
            piece.position.y,
            cleared
        );
        self.notify_changed();
        if cleared > 0 {
            self.events.publish(&BoardEvent::RowsCleared(cleared));
        }
    }

    fn notify_changed(&mut self) {
        let matrix = self.render();
        self.events.publish(&BoardEvent::Changed(matrix));
    }

    fn fits(matrix: &Matrix, piece: &ActivePiece) -> bool {
        piece.cells().all(|(x, y)| matrix.is_free(x, y))
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("matrix", &self.matrix)
            .field("active", &self.active)
            .field("game_over", &self.game_over)
            .finish()
    }
}
