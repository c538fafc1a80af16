//! Minutebook CLI
//!
//! Command-line interface for minutebook - meeting records kept in a
//! JSON document and mirrored to a remote repository.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use minutebook_core::{MeetingFields, RecordStore};

mod commands;
mod editor;
mod output;

use commands::sync::SyncDirection;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "minutebook")]
#[command(about = "Minutebook - meeting records mirrored to a remote repository")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage meeting records
    Meeting {
        #[command(subcommand)]
        command: MeetingCommands,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Show or record page visits
    Hits {
        /// Record a visit instead of only showing the count
        #[arg(long)]
        record: bool,
    },
    /// Sync with the remote repository
    Sync {
        /// Limit to one direction (default: pull, then push)
        #[arg(value_enum)]
        direction: Option<SyncDirection>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show status (records, sync, storage)
    Status,
}

#[derive(Subcommand)]
enum MeetingCommands {
    /// Create a new meeting record
    #[command(alias = "add")]
    Create {
        /// Meeting title
        #[arg(short, long)]
        title: String,
        /// Meeting date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Meeting time, free-form (e.g. 14:00)
        #[arg(long, default_value = "")]
        time: String,
        /// Short summary
        #[arg(short, long, default_value = "")]
        brief: String,
        /// Full minutes text
        #[arg(short, long, default_value = "")]
        minutes: String,
        /// File to upload as the brief attachment
        #[arg(long, value_name = "PATH")]
        brief_file: Option<PathBuf>,
        /// File to upload as the minutes attachment
        #[arg(long, value_name = "PATH")]
        minutes_file: Option<PathBuf>,
    },
    /// List meetings
    #[command(alias = "ls")]
    List {
        /// Order by meeting date instead of record order
        #[arg(long)]
        by_date: bool,
    },
    /// Show one meeting in full
    Show {
        /// Meeting id
        id: u64,
    },
    /// Edit a meeting (prompts interactively when no field flags are given)
    Edit {
        /// Meeting id
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// New time
        #[arg(long)]
        time: Option<String>,
        /// New short summary
        #[arg(short, long)]
        brief: Option<String>,
        /// New minutes text
        #[arg(short, long)]
        minutes: Option<String>,
        /// Replace the brief attachment with this file
        #[arg(long, value_name = "PATH")]
        brief_file: Option<PathBuf>,
        /// Replace the minutes attachment with this file
        #[arg(long, value_name = "PATH")]
        minutes_file: Option<PathBuf>,
    },
    /// Delete a meeting (later ids shift down by one)
    #[command(alias = "rm")]
    Delete {
        /// Meeting id
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Search meetings by title, brief, or minutes
    Search {
        /// Search query
        query: String,
    },
    /// Open an attachment in the browser
    Open {
        /// Meeting id
        id: u64,
        /// Open the minutes attachment instead of the brief
        #[arg(long)]
        minutes: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Add a user or change an existing user's password
    Set {
        username: String,
        password: String,
    },
    /// List usernames
    #[command(alias = "ls")]
    List,
    /// Remove a user
    #[command(alias = "rm")]
    Remove { username: String },
    /// Verify a username/password pair
    Check {
        username: String,
        password: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, pull_on_read, remote.*)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config works without (and before) a store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), &output);
    }

    let mut store = RecordStore::open().await?;

    match cli.command {
        Commands::Meeting { command } => {
            handle_meeting_command(command, &mut store, &output).await
        }
        Commands::User { command } => handle_user_command(command, &mut store, &output).await,
        Commands::Hits { record } => {
            if record {
                commands::hits::record(&mut store, &output).await
            } else {
                commands::hits::show(&mut store, &output).await
            }
        }
        Commands::Sync { direction } => commands::sync::run(&mut store, direction, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&store, &output),
    }
}

async fn handle_meeting_command(
    command: MeetingCommands,
    store: &mut RecordStore,
    output: &Output,
) -> Result<()> {
    match command {
        MeetingCommands::Create {
            title,
            date,
            time,
            brief,
            minutes,
            brief_file,
            minutes_file,
        } => {
            let fields = MeetingFields {
                title,
                date,
                time,
                brief,
                minutes,
            };
            commands::meeting::create(store, fields, brief_file, minutes_file, output).await
        }
        MeetingCommands::List { by_date } => {
            commands::meeting::list(store, by_date, output).await
        }
        MeetingCommands::Show { id } => commands::meeting::show(store, id, output).await,
        MeetingCommands::Edit {
            id,
            title,
            date,
            time,
            brief,
            minutes,
            brief_file,
            minutes_file,
        } => {
            let overrides = commands::meeting::FieldOverrides {
                title,
                date,
                time,
                brief,
                minutes,
            };
            commands::meeting::edit(store, id, overrides, brief_file, minutes_file, output).await
        }
        MeetingCommands::Delete { id, force } => {
            commands::meeting::delete(store, id, force, output).await
        }
        MeetingCommands::Search { query } => {
            commands::meeting::search(store, query, output).await
        }
        MeetingCommands::Open { id, minutes } => {
            commands::meeting::open_attachment(store, id, minutes, output).await
        }
    }
}

async fn handle_user_command(
    command: UserCommands,
    store: &mut RecordStore,
    output: &Output,
) -> Result<()> {
    match command {
        UserCommands::Set { username, password } => {
            commands::user::set(store, username, password, output).await
        }
        UserCommands::List => commands::user::list(store, output).await,
        UserCommands::Remove { username } => {
            commands::user::remove(store, username, output).await
        }
        UserCommands::Check { username, password } => {
            commands::user::check(store, username, password, output).await
        }
    }
}

fn handle_config_command(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(output),
        Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
    }
}

/// Initialize logging to stderr
///
/// Level defaults to warnings and can be raised via RUST_LOG.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("minutebook=warn,minutebook_core=warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
