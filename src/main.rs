// src/main.rs

mod calendar;
mod cli;
mod commands;
mod config;
mod db;
mod error;
mod models;
mod store;

use clap::Parser;
use cli::{Cli, Commands};
use commands::LogArgs;
use config::Config;
use error::{Result, StoolError};
use store::EntryStore;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    if let Commands::Options = cli.command {
        return commands::handle_options();
    }

    let config = Config::load()?;
    let db_path = config.db_path(cli.db.as_deref())?;
    tracing::debug!(path = %db_path.display(), slot = %config.slot_key, "opening store");
    // 只读命令在数据库打不开时仍以空数据显示
    let required = matches!(
        cli.command,
        Commands::Init | Commands::Log { .. } | Commands::Seed
    );
    let storage = db::open_storage(&db_path, required)?;
    let mut store = EntryStore::open(storage, config.slot_key.clone());

    match cli.command {
        Commands::Init => commands::handle_init(&db_path, &store),
        Commands::Log {
            shape,
            size,
            color,
            blood,
            pain,
            notes,
            edit,
            at,
        } => commands::handle_log(
            &mut store,
            LogArgs {
                shape,
                size,
                color,
                blood,
                pain,
                notes,
                edit,
                at,
            },
        ),
        Commands::List { date, all, num } => {
            commands::handle_list(&store, date, all, num, config.list_limit)
        }
        Commands::Day { date } => commands::handle_day(&store, &date),
        Commands::Calendar { month, prev, next } => {
            commands::handle_calendar(&store, month, prev, next, config.week_start)
        }
        Commands::Seed => commands::handle_seed(&mut store),
        Commands::Options => commands::handle_options(),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("STOOLLOG_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| StoolError::Config(format!("failed to initialize logging: {}", e)))
}
