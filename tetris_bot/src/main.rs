use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::time::Duration;
use tetris_engine::{
    Command, EndReason, FixedSequence, Game, GameCommand, GameConfig, GameOutcome, SevenBag,
    Shape, ShapeKind, Uniform,
};

/// tetris_bot - headless Tetris game played by a random bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Board height in cells
    #[arg(long, default_value_t = 20)]
    height: usize,

    /// Seed for pieces and bot moves (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Piece supplier: bag, uniform, or a fixed list of kinds such as "ioT"
    #[arg(long, default_value = "bag")]
    pieces: String,

    /// Level to start at
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Fixed drop interval in milliseconds instead of the level table
    #[arg(short, long)]
    tick_ms: Option<u64>,

    /// Delay between bot commands in milliseconds
    #[arg(long, default_value_t = 50)]
    think_ms: u64,

    /// Commands the bot picks from
    #[arg(long, value_delimiter = ',', default_value = "left,right,down,rotate,drop")]
    moves: Vec<Command>,

    /// Stop the game after this many seconds
    #[arg(long, default_value_t = 60)]
    max_secs: u64,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

/// Final state printed when the game ends
#[derive(Serialize, Debug)]
struct Report {
    seed: u64,
    commands_sent: u64,
    #[serde(flatten)]
    outcome: GameOutcome,
    picture: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    anyhow::ensure!(!args.moves.is_empty(), "at least one move is required");
    let seed = args.seed.unwrap_or_else(|| rand::rng().random());

    let mut config = GameConfig::new().with_start_level(args.level);
    if let Some(tick_ms) = args.tick_ms {
        config = config.with_fixed_drop_interval(Duration::from_millis(tick_ms));
    }

    let builder = Game::builder(args.width, args.height)
        .config(config)
        .on_score_change(|change| {
            tracing::info!("+{} points, total {}", change.gained, change.total)
        })
        .on_rows_cleared(|count| tracing::debug!("{} rows cleared", count))
        .on_level_change(|level| tracing::info!("Level {}", level))
        .on_game_over(|score| tracing::info!("Game over, final score {}", score));
    let builder = match args.pieces.as_str() {
        "bag" => builder.supplier(SevenBag::seeded(seed)),
        "uniform" => builder.supplier(Uniform::seeded(seed)),
        kinds => builder.supplier(FixedSequence::new(parse_kinds(kinds)?)?),
    };
    let game = builder.build().context("Failed to create game")?;

    println!("=== tetris_bot ===");
    println!("Board: {}x{}", args.width, args.height);
    println!("Seed: {}", seed);
    println!("Drop interval: {:?}", game.drop_interval());
    println!();

    let handle = game.spawn();

    // Stop the game once the time limit is reached
    let stop_sender = handle.sender();
    let max_duration = Duration::from_secs(args.max_secs);
    tokio::spawn(async move {
        tokio::time::sleep(max_duration).await;
        tracing::info!("Time limit of {:?} reached", max_duration);
        let _ = stop_sender.send(GameCommand::Stop);
    });

    let bot = tokio::spawn(play(
        handle.sender(),
        args.moves.clone(),
        Duration::from_millis(args.think_ms),
        StdRng::seed_from_u64(seed),
    ));

    let outcome = handle.finished().await?;
    // The bot returns on its first send after the game task ended
    let commands_sent = bot.await.unwrap_or_default();

    let report = Report {
        seed,
        commands_sent,
        picture: outcome
            .snapshot
            .matrix
            .to_string()
            .lines()
            .map(str::to_string)
            .collect(),
        outcome,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

/// Send a random command every `think` until the game stops accepting them.
/// Returns the number of commands sent.
async fn play(
    sender: flume::Sender<GameCommand>,
    moves: Vec<Command>,
    think: Duration,
    mut rng: StdRng,
) -> u64 {
    let mut sent = 0;
    loop {
        tokio::time::sleep(think).await;
        let command = moves[rng.random_range(0..moves.len())];
        if sender.send_async(GameCommand::Player(command)).await.is_err() {
            tracing::debug!("Game stopped accepting commands");
            return sent;
        }
        sent += 1;
    }
}

/// Parse a list of shape letters such as "IOT" into shapes with default colors
fn parse_kinds(kinds: &str) -> anyhow::Result<Vec<Shape>> {
    kinds
        .chars()
        .map(|c| -> anyhow::Result<Shape> {
            let kind = ShapeKind::ALL
                .into_iter()
                .find(|kind| kind.as_str().eq_ignore_ascii_case(&c.to_string()))
                .with_context(|| format!("Unknown piece '{}'", c))?;
            Ok(Shape::new(kind, kind.default_color()))
        })
        .collect()
}

fn print_report(report: &Report) {
    let snapshot = &report.outcome.snapshot;
    for line in &report.picture {
        println!("|{}|", line);
    }
    println!("+{}+", "-".repeat(snapshot.matrix.cols()));
    println!();
    match report.outcome.reason {
        EndReason::GameOver => println!("Game over"),
        EndReason::Cancelled => println!("Stopped"),
    }
    println!("Score: {}", snapshot.score);
    println!("Level: {}", snapshot.level);
    println!("Rows cleared: {}", snapshot.rows_cleared);
    println!("Commands sent: {}", report.commands_sent);
}
