//! # checkin
//!
//! A terminal habit tracker. Define tasks, check them in once a day, and
//! attach structured detail (tags plus a duration or count) when the task
//! is bound to a category.
//!
//! ## Usage
//!
//! ```bash
//! # Starter tasks (Exercise, reading, meditation)
//! checkin init
//!
//! # Check in today, with detail for a measured category
//! checkin checkin 1 --item "Core=20" --item "Shoulders & Back=10"
//!
//! # Make up yesterday (allowed up to 7 days back)
//! checkin checkin 2 --date 2026-10-18
//!
//! # Rename a task
//! checkin task edit 2 --name "Read 20 pages"
//!
//! # Month view, streak and counters
//! checkin calendar --month 2026-10
//! checkin stats
//!
//! # Categories and tags
//! checkin category add --template Reading
//! checkin category add "Push-ups" --measure count --options 10,20,50 --unit reps
//! checkin tag add 1 Yoga
//! checkin tag remove 1 Core
//! ```
//!
//! Running without arguments opens the interactive calendar.
//!
//! ## Data Storage
//!
//! Data is saved as JSON in your local data directory:
//! *   Linux: `~/.local/share/checkin/`
//! *   macOS: `~/Library/Application Support/checkin/`
//! *   Windows: `%APPDATA%\checkin\`
//!
//! You can override this by setting the `CHECKIN_DATA_DIR` environment
//! variable. Set `RUST_LOG=checkin=debug` to see what is read and written.

use std::io;

use checkin::commands::*;
use checkin::error::Result;
use checkin::models::MeasureType;
use checkin::stats::RECENT_LIMIT;
use checkin::tui::run_tui;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "checkin")]
#[command(about = "Daily habit check-ins from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the starter tasks to an empty database
    Init,
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Check a task in for today or a recent day
    Checkin {
        /// Task ID
        task: u64,
        /// Day to check in (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Tagged measure, e.g. "Core=20" (repeatable)
        #[arg(short, long = "item")]
        items: Vec<String>,
        /// Time of day (HH:MM), defaults to now
        #[arg(short, long)]
        time: Option<String>,
    },
    /// Delete a check-in
    Undo {
        /// Check-in ID
        id: u64,
    },
    /// List check-ins
    Records {
        /// Only this month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Show the check-ins of one day
    Day {
        /// Day (YYYY-MM-DD)
        date: String,
    },
    /// Show a month calendar
    Calendar {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show streak and counters
    Stats {
        /// Number of recent check-ins to list
        #[arg(short, long, default_value_t = RECENT_LIMIT)]
        recent: usize,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Manage the tags of a task's category
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
    /// Reset the database (delete all tasks, check-ins and categories)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a plain task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List tasks
    List,
    /// Rename a task or change its description
    Edit {
        id: u64,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Remove a task with its check-ins
    Remove {
        id: u64,
    },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories
    List,
    /// List category templates
    Templates,
    /// Create a category and its task
    Add {
        /// Category name (defaults to the template name)
        name: Option<String>,
        /// Start from a template
        #[arg(short = 'T', long)]
        template: Option<String>,
        /// Icon
        #[arg(short, long)]
        icon: Option<String>,
        /// Measure type (duration, count, none)
        #[arg(short, long)]
        measure: Option<MeasureType>,
        /// Measure options, comma separated
        #[arg(short, long)]
        options: Option<String>,
        /// Measure unit
        #[arg(short, long)]
        unit: Option<String>,
        /// Preset tags, comma separated
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Hide a task's category
    Hide {
        /// Task ID
        task: u64,
    },
    /// Show a hidden category again
    Show {
        /// Task ID
        task: u64,
    },
}

#[derive(Subcommand)]
enum TagCommands {
    /// List tags
    List { task: u64 },
    /// Add a custom tag
    Add { task: u64, tag: String },
    /// Hide a preset tag or delete a custom tag
    Remove { task: u64, tag: String },
    /// Show all preset tags again
    Restore { task: u64 },
    /// Hide all presets and delete all custom tags
    Clear { task: u64 },
}

fn init_tracing() {
    // Logging is opt-in via RUST_LOG; invalid filters disable it.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn run(command: Option<Commands>) -> Result<()> {
    match command {
        Some(Commands::Init) => cmd_init(false),
        Some(Commands::Task { command }) => match command {
            TaskCommands::Add { name, description } => cmd_task_add(name, description, false),
            TaskCommands::List => cmd_task_list(),
            TaskCommands::Edit { id, name, description } => cmd_task_edit(id, name, description, false),
            TaskCommands::Remove { id } => cmd_task_remove(id, false),
        },
        Some(Commands::Checkin { task, date, items, time }) => cmd_checkin(task, date, items, time, false),
        Some(Commands::Undo { id }) => cmd_undo(id, false),
        Some(Commands::Records { month, date }) => cmd_records(month, date),
        Some(Commands::Day { date }) => cmd_day(date),
        Some(Commands::Calendar { month }) => cmd_calendar(month),
        Some(Commands::Stats { recent }) => cmd_stats(recent),
        Some(Commands::Category { command }) => match command {
            CategoryCommands::List => cmd_category_list(),
            CategoryCommands::Templates => cmd_category_templates(),
            CategoryCommands::Add { name, template, icon, measure, options, unit, tags } => {
                cmd_category_add(NewCategory { name, template, icon, measure, options, unit, tags }, false)
            }
            CategoryCommands::Hide { task } => cmd_category_set_hidden(task, true, false),
            CategoryCommands::Show { task } => cmd_category_set_hidden(task, false, false),
        },
        Some(Commands::Tag { command }) => match command {
            TagCommands::List { task } => cmd_tag_list(task),
            TagCommands::Add { task, tag } => cmd_tag(task, TagAction::Add(tag), false),
            TagCommands::Remove { task, tag } => cmd_tag(task, TagAction::Remove(tag), false),
            TagCommands::Restore { task } => cmd_tag(task, TagAction::Restore, false),
            TagCommands::Clear { task } => cmd_tag(task, TagAction::Clear, false),
        },
        Some(Commands::Reset { force }) => cmd_reset(force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "checkin", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => run_tui(),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
