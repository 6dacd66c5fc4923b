// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "stoollog - A private bowel movement logger for the command line",
    long_about = "stoollog records each visit (Bristol shape, size, color, blood and pain flags, notes) in a local database and shows them as a list or a month calendar."
)]
pub struct Cli {
    /// Use this database file instead of the configured one.
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[arg(short, long, global = true, conflicts_with = "quiet", help = "Show debug logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Only log errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates the database if needed and reports how many entries it holds.
    Init,

    /// Adds a new entry stamped with the current time.
    /// Run `stoollog options` to see the accepted shapes, sizes and colors.
    Log {
        #[arg(short, long, help = "Bristol type 1-7 or its key (defaults to 1)")]
        shape: Option<String>,

        #[arg(short = 'z', long, help = "Size: XS, S, M, L or XL")]
        size: Option<String>,

        #[arg(short, long, help = "Color hex code (e.g. #8B4513) or name")]
        color: Option<String>,

        #[arg(short, long, help = "There was blood")]
        blood: bool,

        #[arg(short, long, help = "There was pain")]
        pain: bool,

        #[arg(short, long, conflicts_with = "edit", help = "Free-text notes")]
        notes: Option<String>,

        #[arg(short, long, help = "Write notes in $EDITOR")]
        edit: bool,

        #[arg(long, value_name = "YYYY-MM-DDTHH:MM", help = "Record at this local time instead of now")]
        at: Option<String>,
    },

    /// Lists entries. By default, it shows today's entries.
    List {
        #[arg(short, long, conflicts_with = "all", help = "Show entries of a date (format: YYYY-MM-DD)")]
        date: Option<String>,

        #[arg(short, long, help = "Show entries of every day, newest day first")]
        all: bool,

        #[arg(short, long, help = "Show at most N entries")]
        num: Option<u32>,
    },

    /// Shows every entry of one day and the category the calendar uses for it.
    Day {
        #[arg(help = "The date to show (format: YYYY-MM-DD)")]
        date: String,
    },

    /// Shows a month grid with highlighted days, followed by that month's entries.
    Calendar {
        #[arg(short, long, value_name = "YYYY-MM", help = "Month to show (defaults to the current month)")]
        month: Option<String>,

        #[arg(long, value_name = "N", conflicts_with = "next", help = "Go back N months")]
        prev: Option<u32>,

        #[arg(long, value_name = "N", help = "Go forward N months")]
        next: Option<u32>,
    },

    /// Prints the shapes, sizes and colors accepted by `log`.
    Options,

    /// Fills an empty database with a few demo entries. Never touches existing data.
    Seed,
}
