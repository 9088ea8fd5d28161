/// Error types for the tetris-engine library
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while building or driving a game
///
/// Blocked moves and game over are part of normal play and never show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Board width or height is zero
    #[error("Invalid board dimensions: {cols}x{rows}")]
    InvalidDimensions {
        /// Requested width
        cols: usize,
        /// Requested height
        rows: usize,
    },

    /// Initial matrix rows have different lengths
    #[error("Ragged matrix: row {row} has {len} cells, expected {expected}")]
    RaggedMatrix {
        /// Index of the offending row
        row: usize,
        /// Length of the offending row
        len: usize,
        /// Length of the first row
        expected: usize,
    },

    /// Initial matrix does not match the configured board size
    #[error("Matrix is {actual_cols}x{actual_rows}, board is {cols}x{rows}")]
    MatrixSizeMismatch {
        cols: usize,
        rows: usize,
        actual_cols: usize,
        actual_rows: usize,
    },

    /// Initial active piece is out of bounds or overlaps locked cells
    #[error("Piece {shape} does not fit at ({x}, {y})")]
    PieceDoesNotFit {
        /// Shape kind name
        shape: String,
        x: isize,
        y: isize,
    },

    /// Configuration value out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Controller word that maps to no command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Command sent to a game whose runner has already finished
    #[error("Game stopped")]
    GameStopped,

    /// Runner task panicked or was aborted
    #[error("Runner task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
