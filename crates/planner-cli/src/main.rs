use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use planner_engine::{Edge, Ms, ResizePolicy};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "planner",
    version,
    about = "Check and edit team assignment plans",
    after_help = "EXAMPLES:\n    planner --plan plan.json check-date --member tm1 --date 2024-08-06\n    planner --plan plan.json --granularity millis resize --id a --edge end --to 23 --write"
)]
pub struct Cli {
    /// Plan document (JSON with groups, projects, items). Reads stdin when omitted.
    #[arg(long, global = true)]
    pub plan: Option<PathBuf>,

    /// Boundary type of the plan's items.
    #[arg(long, value_enum, default_value_t = Granularity::Days, global = true)]
    pub granularity: Granularity,

    /// How resizes treat the rest of the lane.
    #[arg(long, value_enum, default_value_t = PolicyArg::Cascade, global = true)]
    pub policy: PolicyArg,

    /// Write the updated plan back to --plan.
    #[arg(long, global = true)]
    pub write: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    /// Whole days, written YYYY-MM-DD.
    Days,
    /// Epoch milliseconds (RFC 3339 accepted on the command line).
    Millis,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Shift later assignments on end-edge resizes.
    Cascade,
    /// Refuse any resize that overlaps.
    Refuse,
}

impl From<PolicyArg> for ResizePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Cascade => ResizePolicy::Cascade,
            PolicyArg::Refuse => ResizePolicy::Refuse,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EdgeArg {
    #[value(alias = "left")]
    Start,
    #[value(alias = "right")]
    End,
}

impl From<EdgeArg> for Edge {
    fn from(e: EdgeArg) -> Self {
        match e {
            EdgeArg::Start => Edge::Start,
            EdgeArg::End => Edge::End,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check whether a single date falls inside a team member's assignments.
    CheckDate {
        #[arg(long)]
        member: String,
        #[arg(long)]
        date: String,
    },
    /// Check whether a range overlaps a team member's assignments.
    CheckRange {
        #[arg(long)]
        member: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Assignment to ignore (the one being edited).
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Create an assignment.
    Add {
        #[arg(long)]
        member: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },
    /// Delete an assignment by id.
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Remove the assignment covering a day, or create a one-day assignment there.
    Toggle {
        #[arg(long)]
        member: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        day: String,
    },
    /// Move an assignment to a new start, optionally in another team member's lane.
    Move {
        #[arg(long)]
        id: String,
        #[arg(long)]
        member: String,
        #[arg(long)]
        start: String,
    },
    /// Move one edge of an assignment.
    Resize {
        #[arg(long)]
        id: String,
        #[arg(long, value_enum)]
        edge: EdgeArg,
        #[arg(long)]
        to: String,
    },
    /// Report every structural problem in the plan.
    Validate,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PLANNER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "planner=debug,planner_engine=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("PLANNER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.granularity {
        Granularity::Days => commands::run::<NaiveDate>(&cli),
        Granularity::Millis => commands::run::<Ms>(&cli),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
