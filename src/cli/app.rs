//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{project_cmd, schedule_cmd, stats_cmd, task_cmd, timeline_cmd};
use crate::storage::{Config, Workspace};

#[derive(Parser)]
#[command(name = "taskflow")]
#[command(author, version, about = "Dependency-aware task scheduling with a zoomable timeline")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured default format, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskflow workspace
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(task_cmd::TaskCommands),

    /// Manage projects
    #[command(subcommand)]
    Project(project_cmd::ProjectCommands),

    /// Render the timeline for a date window
    Timeline {
        /// Zoom level: day, week, month (defaults to the configured zoom)
        #[arg(long, short)]
        zoom: Option<String>,

        /// Anchor date (YYYY-MM-DD, defaults to today)
        #[arg(long, short)]
        date: Option<String>,

        /// Row order: start, priority, title
        #[arg(long, default_value = "start")]
        order: String,

        /// Shift the window one step from the anchor: prev, next
        #[arg(long)]
        go: Option<String>,
    },

    /// Move a task's due date and pull every dependent along
    Reschedule {
        /// Task ID
        id: String,

        /// New due date (YYYY-MM-DD)
        due: String,

        /// Dependency levels to ripple through (defaults to the configured depth)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Search tasks by fuzzy text match
    Search {
        /// Search query
        query: String,
    },

    /// Show workspace statistics
    Stats,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_else(configured_format);
    let output = Output::new(format, cli.verbose);

    output.verbose("Taskflow CLI starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing workspace at: {}", path));
            let workspace = Workspace::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!(
                    "Created .taskflow directory at: {}",
                    workspace.taskflow_dir().display()
                ),
            );
            output.success(&format!(
                "Initialized taskflow workspace at {}",
                workspace.root().display()
            ));
        }

        Commands::Task(cmd) => task_cmd::run(cmd, &output)?,
        Commands::Project(cmd) => project_cmd::run(cmd, &output)?,

        Commands::Timeline {
            zoom,
            date,
            order,
            go,
        } => timeline_cmd::render(
            &output,
            zoom.as_deref(),
            date.as_deref(),
            &order,
            go.as_deref(),
        )?,

        Commands::Reschedule { id, due, depth } => {
            schedule_cmd::reschedule(&output, &id, &due, depth)?
        }

        Commands::Search { query } => task_cmd::search(&output, &query)?,

        Commands::Stats => stats_cmd::run(&output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}

/// Reads the default output format from global configuration
fn configured_format() -> OutputFormat {
    Config::load()
        .map(|config| config.global.default_format.into())
        .unwrap_or_default()
}
