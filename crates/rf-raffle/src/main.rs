//! RaffleForge - Terminal Draw Runner
//!
//! Usage:
//!   raffle --roster names.txt                 - Interactive draw
//!   raffle --roster names.csv --all           - Draw everyone, print the order
//!   raffle -n Ann -n Bo -n Cy --profile turbo - Inline names
//!
//! Interactive commands: `d` (or Enter) draw, `r` reset, `w` winners,
//! `e` export, `s` status, `q` quit.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use rf_draw::{
    DrawConfig, DrawEvent, DrawOutcome, DrawSession, DuplicatePolicy, LogFeedback, Participant,
    TimingProfile,
};
use rf_file::{DEFAULT_EXPORT_NAME, RosterBuilder, export_winners};

#[derive(Parser)]
#[command(name = "raffle", about = "RaffleForge draw runner")]
struct Cli {
    /// Roster file (first column of an .xlsx/.csv/.tsv, or one name per line)
    #[arg(short, long = "roster")]
    rosters: Vec<PathBuf>,

    /// Participant name (repeatable)
    #[arg(short = 'n', long = "name")]
    names: Vec<String>,

    /// Draw config (.json, .yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timing profile: normal, turbo, studio
    #[arg(short, long)]
    profile: Option<TimingProfile>,

    /// RNG seed for a reproducible draw order
    #[arg(long)]
    seed: Option<u64>,

    /// Duplicate name handling: remove-all, remove-one
    #[arg(long)]
    policy: Option<DuplicatePolicy>,

    /// Export winners on exit (.xlsx, .csv, .json)
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Draw every remaining participant, then exit
    #[arg(long)]
    all: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let roster = {
        let mut builder = RosterBuilder::new();
        for path in &cli.rosters {
            builder
                .add_file(path)
                .with_context(|| format!("Failed to load roster {}", path.display()))?;
        }
        for name in &cli.names {
            builder.add_text(name);
        }
        builder.build()
    };
    if roster.is_empty() {
        bail!("No participants: pass --roster <file> or --name <name>");
    }

    let config = load_config(&cli)?;
    log::info!(
        "Starting raffle: {} participants, timing {:?}, policy {}",
        roster.len(),
        config.timing.profile,
        config.duplicate_policy
    );

    let session = DrawSession::new(roster, config).with_feedback(std::sync::Arc::new(LogFeedback));
    let printer = tokio::spawn(print_events(session.subscribe()));

    if cli.all {
        draw_all(&session).await;
    } else {
        interactive(&session, cli.export.as_ref()).await?;
    }

    session.close();
    let winners = session.winners();
    // Closing the channel lets the printer flush and exit
    drop(session);
    if let Err(e) = printer.await {
        log::warn!("Event printer failed: {}", e);
    }

    if cli.all {
        print_winners(&winners);
    }

    if let Some(path) = &cli.export {
        if !winners.is_empty() {
            export_winners(&winners, path)
                .with_context(|| format!("Failed to export to {}", path.display()))?;
            println!("Exported {} winners to {}", winners.len(), path.display());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<DrawConfig> {
    let mut config = match &cli.config {
        Some(path) => DrawConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DrawConfig::default(),
    };

    if let Some(profile) = cli.profile {
        config = config.with_profile(profile);
    }
    if let Some(seed) = cli.seed {
        config = config.with_seed(seed);
    }
    if let Some(policy) = cli.policy {
        config = config.with_policy(policy);
    }
    config.validate()?;
    Ok(config)
}

async fn draw_all(session: &DrawSession) {
    while !matches!(session.request_draw(), DrawOutcome::Exhausted) {
        session.wait_settled().await;
    }
}

async fn interactive(session: &DrawSession, export: Option<&PathBuf>) -> Result<()> {
    println!(
        "{} participants loaded. [d]raw, [r]eset, [w]inners, [e]xport, [s]tatus, [q]uit",
        session.roster().len()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "" | "d" | "draw" => {
                session.request_draw();
            }
            "r" | "reset" => session.reset(),
            "w" | "winners" => print_winners(&session.winners()),
            "e" | "export" => {
                let path = export
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_NAME));
                match export_winners(&session.winners(), &path) {
                    Ok(()) => println!("Exported to {}", path.display()),
                    Err(e) => println!("Export failed: {}", e),
                }
            }
            "s" | "status" => println!(
                "{:?}: {} drawn, {} remaining",
                session.state(),
                session.winners().len(),
                session.remaining().len()
            ),
            "q" | "quit" | "exit" => break,
            other => println!("Unknown command: {}", other),
        }
    }
    Ok(())
}

async fn print_events(mut rx: broadcast::Receiver<DrawEvent>) {
    loop {
        match rx.recv().await {
            Ok(DrawEvent::SpinStarted {
                pool_size,
                settle_delay_ms,
            }) => {
                println!(
                    "Spinning over {} names ({:.1}s)...",
                    pool_size,
                    settle_delay_ms / 1000.0
                );
            }
            Ok(DrawEvent::Candidate { participant, .. }) => println!("  {}", participant),
            Ok(DrawEvent::WinnerRevealed {
                winner,
                draw_order,
                auto_selected,
            }) => {
                let note = if auto_selected { " (auto)" } else { "" };
                println!("Winner #{}: {}{}", draw_order, winner, note);
            }
            Ok(DrawEvent::Status { message }) => println!("{}", message),
            Ok(DrawEvent::DrawRejected) => println!("Please wait..."),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => log::debug!("Skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_winners(winners: &[Participant]) {
    if winners.is_empty() {
        println!("No winners yet");
        return;
    }
    println!("Previous winners:");
    for (i, w) in winners.iter().enumerate() {
        println!("{:>4}. {}", i + 1, w);
    }
}
