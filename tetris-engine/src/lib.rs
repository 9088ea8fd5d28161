//! # tetris-engine
//!
//! Headless falling-block game engine for party-style multiplayer games.
//!
//! ## Overview
//!
//! A [`Board`] holds a fixed-size [`Matrix`] of locked blocks and at most one
//! falling piece. It moves, rotates, drops and locks pieces, clears full rows
//! and detects game over. A [`Game`] wraps a board with scoring, levels and a
//! level-dependent drop interval, and [`Game::spawn`] runs it on a tokio task
//! that ticks on that interval while accepting player [`Command`]s.
//!
//! Rendering and input are left to the caller: subscribe to [`GameEvent`]s
//! and redraw from the matrix they carry.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tetris_engine::{Command, Game, GameEvent};
//!
//! #[tokio::main]
//! async fn main() -> tetris_engine::Result<()> {
//!     let mut game = Game::new(10, 20)?;
//!     game.subscribe(|event| {
//!         if let GameEvent::ScoreChanged(change) = event {
//!             println!("+{} points", change.gained);
//!         }
//!     });
//!
//!     let handle = game.spawn();
//!     handle.send(Command::Rotate)?;
//!     handle.cancel();
//!     let outcome = handle.finished().await?;
//!     println!("Final score: {}", outcome.snapshot.score);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod board;
pub mod config;
pub mod error;
pub mod events;
pub mod game;
pub mod matrix;
pub mod runner;
pub mod scoring;
pub mod shape;
pub mod supplier;

// Re-exports for convenience
pub use board::{ActivePiece, Board, Command, Position};
pub use config::GameConfig;
pub use error::{EngineError, Result};
pub use events::{BoardEvent, GameEvent, Publisher, ScoreChange, SubscriptionId};
pub use game::{Game, GameBuilder, GameSnapshot};
pub use matrix::{Cell, Color, Matrix};
pub use runner::{EndReason, GameCommand, GameHandle, GameOutcome};
pub use shape::{Rotation, Shape, ShapeKind};
pub use supplier::{FixedSequence, SevenBag, ShapeSupplier, Uniform};
