use clap::{Parser, Subcommand};
use timetable_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "timetable", version, about = "Timetable CLI")]
struct Cli {
    /// Evaluate as if the local time were this (YYYY-MM-DDTHH:MM)
    #[arg(long, global = true, value_parser = commands::parse_now)]
    at: Option<chrono::NaiveDateTime>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timetable entry management
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Reminder planning and delivery
    Reminders {
        #[command(subcommand)]
        action: commands::reminders::RemindersAction,
    },
    /// Today's agenda and progress
    Agenda {
        #[command(subcommand)]
        action: commands::agenda::AgendaAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr. TIMETABLE_LOG wins over the configured level.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("TIMETABLE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let now = cli.at.unwrap_or_else(commands::local_now);
    let result = match cli.command {
        Commands::Entry { action } => commands::entry::run(action, now),
        Commands::Reminders { action } => commands::reminders::run(action, now),
        Commands::Agenda { action } => commands::agenda::run(action, now),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
