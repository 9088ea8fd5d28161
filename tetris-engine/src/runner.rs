//! Timer-driven game task
//!
//! [`Game::spawn`] moves a game into a tokio task that ticks it on its drop
//! interval and applies player commands as they arrive on a flume channel.
//! Ticks and commands are handled one at a time, so the game needs no locking.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::board::Command;
use crate::error::{EngineError, Result};
use crate::game::{Game, GameSnapshot};

/// Message accepted by a running game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCommand {
    Player(Command),
    Stop,
}

impl From<Command> for GameCommand {
    fn from(command: Command) -> Self {
        GameCommand::Player(command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// A spawned piece did not fit
    GameOver,
    /// Stopped by the caller, or every command sender was dropped
    Cancelled,
}

/// How a running game ended, with its final state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub reason: EndReason,
    pub snapshot: GameSnapshot,
}

/// Handle to a game running in its own task
#[derive(Debug)]
pub struct GameHandle {
    tx: flume::Sender<GameCommand>,
    task: JoinHandle<GameOutcome>,
}

impl GameHandle {
    /// Queue a player command
    pub fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(GameCommand::Player(command))
            .map_err(|_| EngineError::GameStopped)
    }

    /// Sender for an input transport. The game is cancelled once every
    /// sender, including the handle's own, is dropped.
    pub fn sender(&self) -> flume::Sender<GameCommand> {
        self.tx.clone()
    }

    /// Ask the task to stop; a no-op when it has already ended
    pub fn cancel(&self) {
        if self.tx.send(GameCommand::Stop).is_err() {
            tracing::debug!("Cancel requested for a game that already ended");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the game to end
    pub async fn finished(self) -> Result<GameOutcome> {
        Ok(self.task.await?)
    }
}

impl Game {
    /// Run the game in a tokio task. Must be called within a tokio runtime.
    pub fn spawn(self) -> GameHandle {
        let (tx, rx) = flume::unbounded();
        let task = tokio::spawn(run(self, rx));
        GameHandle { tx, task }
    }
}

async fn run(mut game: Game, commands: flume::Receiver<GameCommand>) -> GameOutcome {
    tracing::info!("Game started, drop interval {:?}", game.drop_interval());
    let mut deadline = Instant::now() + game.drop_interval();

    let reason = loop {
        if game.is_over() {
            break EndReason::GameOver;
        }
        tokio::select! {
            () = tokio::time::sleep_until(deadline) => {
                game.tick();
                deadline = next_deadline(deadline, Instant::now(), game.drop_interval());
            }
            result = commands.recv_async() => match result {
                Ok(GameCommand::Player(command)) => game.apply(command),
                Ok(GameCommand::Stop) => {
                    tracing::info!("Game received Stop command, exiting");
                    break EndReason::Cancelled;
                }
                Err(_) => {
                    tracing::info!("Game command channel closed, exiting");
                    break EndReason::Cancelled;
                }
            }
        }
    };

    let snapshot = game.snapshot();
    tracing::info!(
        "Game ended ({:?}) with score {} at level {}",
        reason,
        snapshot.score,
        snapshot.level
    );
    GameOutcome { reason, snapshot }
}

/// Next tick one interval after the last deadline. After a stall long enough
/// to miss that too, restart the cadence from `now` instead of catching up.
fn next_deadline(deadline: Instant, now: Instant, interval: Duration) -> Instant {
    let next = deadline + interval;
    if next <= now {
        tracing::warn!("Game task fell {:?} behind, skipping missed ticks", now - deadline);
        now + interval
    } else {
        next
    }
}
