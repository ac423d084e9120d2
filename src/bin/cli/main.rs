mod app;
mod commands;
mod render;
#[cfg(feature = "tui")]
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use spaced_lib::flashcards::CardId;

#[derive(Parser)]
#[command(name = "spaced-cli", about = "Spaced-repetition pronunciation flashcards", version)]
struct Cli {
    /// Directory holding cards, history and the saved session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <data-dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the initial card list (only when no cards exist yet)
    Init {
        /// URL serving a JSON array of {word, ipa, definition, example}
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
        /// Local JSON file with the same shape
        #[arg(long)]
        file: Option<PathBuf>,
        /// Seconds to wait before giving up
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Import cards from a tab-separated notes file (word, definition, example, ipa)
    Import {
        path: PathBuf,
    },

    /// List all cards, most urgent first
    Cards,

    /// Start a new session
    Start {
        /// Number of cards (default from config)
        #[arg(long)]
        size: Option<usize>,
    },

    /// Show the next card, or complete the session when it is done
    Next,

    /// Rate a card: again|hard|good|easy, 1-4, or skip/0
    Submit {
        card_id: CardId,
        rating: String,
    },

    /// Abandon the current session without recording it
    Discard,

    /// Review in the terminal, one line per answer
    Review {
        /// Number of cards when a new session is started
        #[arg(long)]
        size: Option<usize>,
    },

    /// Card pool statistics
    Stats,

    /// Completed sessions, newest first
    History,

    /// Show one completed session
    Record {
        id: usize,
    },

    /// Answer JSON requests read line by line from stdin
    Bridge,

    /// Launch full-screen review
    #[cfg(feature = "tui")]
    Tui {
        /// Number of cards when a new session is started
        #[arg(long)]
        size: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let data_dir = cli.data_dir.as_deref();
    let config = cli.config.as_deref();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            #[cfg(feature = "tui")]
            {
                let app = app::App::new(data_dir, config)?;
                tui::run(app, None)?;
            }
            #[cfg(not(feature = "tui"))]
            {
                eprintln!("TUI not available (built without 'tui' feature). Use a subcommand.");
                eprintln!("Run with --help for usage.");
                std::process::exit(1);
            }
        }
        Some(Command::Init { url, file, timeout }) => {
            let app = app::App::new(data_dir, config)?;
            commands::init::run(app, url, file, timeout, &cli.format, use_color)?;
        }
        Some(Command::Import { path }) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::import::run(&mut app, &path, &cli.format)?;
        }
        Some(Command::Cards) => {
            let app = app::App::new(data_dir, config)?;
            commands::cards::run(&app, &cli.format, use_color)?;
        }
        Some(Command::Start { size }) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::session::run_start(&mut app, size, &cli.format)?;
        }
        Some(Command::Next) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::session::run_next(&mut app, &cli.format, use_color)?;
        }
        Some(Command::Submit { card_id, rating }) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::session::run_submit(&mut app, card_id, &rating, &cli.format)?;
        }
        Some(Command::Discard) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::session::run_discard(&mut app, &cli.format)?;
        }
        Some(Command::Review { size }) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::session::run_review(&mut app, size, use_color)?;
        }
        Some(Command::Stats) => {
            let app = app::App::new(data_dir, config)?;
            commands::history::run_stats(&app, &cli.format, use_color)?;
        }
        Some(Command::History) => {
            let app = app::App::new(data_dir, config)?;
            commands::history::run_list(&app, &cli.format, use_color)?;
        }
        Some(Command::Record { id }) => {
            let app = app::App::new(data_dir, config)?;
            commands::history::run_show(&app, id, &cli.format, use_color)?;
        }
        Some(Command::Bridge) => {
            let mut app = app::App::new(data_dir, config)?;
            commands::bridge::run(&mut app)?;
        }
        #[cfg(feature = "tui")]
        Some(Command::Tui { size }) => {
            let app = app::App::new(data_dir, config)?;
            tui::run(app, size)?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
