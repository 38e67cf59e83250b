//! Subcommand execution, generic over the plan's boundary type.
//!
//! Every subcommand prints one JSON document on stdout. Edits that the
//! engine refuses print `{"ok": false, "reason": ...}` and exit with
//! [`REJECTED`]; malformed input fails through `anyhow` instead.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use planner_engine::{
    is_date_overlapping, is_range_overlapping, AssignmentId, AssignmentStore, Plan, TeamMemberId,
    TimePoint, Toggle,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::{Cli, Command};

/// Exit status for an edit the engine refused. Clap uses 2 for usage errors.
const REJECTED: u8 = 3;

pub fn run<T>(cli: &Cli) -> Result<ExitCode>
where
    T: TimePoint + Serialize + DeserializeOwned,
{
    let plan: Plan<T> = load_plan(cli)?;
    debug!(
        groups = plan.groups.len(),
        projects = plan.projects.len(),
        items = plan.items.len(),
        "plan loaded"
    );

    match &cli.command {
        Command::CheckDate { member, date } => {
            let date = T::parse_point(date)?;
            let tm = TeamMemberId::from(member.as_str());
            let overlapping = is_date_overlapping(Some(date), Some(&plan.items[..]), Some(&tm));
            print_json(&json!({ "overlapping": overlapping }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::CheckRange {
            member,
            start,
            end,
            exclude,
        } => {
            let (start, end) = (T::parse_point(start)?, T::parse_point(end)?);
            let tm = TeamMemberId::from(member.as_str());
            let exclude = exclude.as_deref().map(AssignmentId::from);
            let overlapping = is_range_overlapping(
                Some(start),
                Some(end),
                Some(&plan.items[..]),
                Some(&tm),
                exclude.as_ref(),
            );
            print_json(&json!({ "overlapping": overlapping }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Add {
            member,
            project,
            start,
            end,
        } => {
            let (start, end) = (T::parse_point(start)?, T::parse_point(end)?);
            edit(cli, plan, |store| {
                let id = store.create(member.as_str().into(), project.as_str().into(), start, end)?;
                Ok(("id", json!(id)))
            })
        }
        Command::Remove { id } => edit(cli, plan, |store| {
            let removed = store.remove(&AssignmentId::from(id.as_str()))?;
            Ok(("removed", json!(removed.id)))
        }),
        Command::Toggle {
            member,
            project,
            day,
        } => {
            let day = T::parse_point(day)?;
            edit(cli, plan, |store| {
                match store.toggle_day(member.as_str().into(), project.as_str().into(), day)? {
                    Toggle::Created(id) => Ok(("created", json!(id))),
                    Toggle::Removed(a) => Ok(("removed", json!(a.id))),
                }
            })
        }
        Command::Move { id, member, start } => {
            let start = T::parse_point(start)?;
            edit(cli, plan, |store| {
                let moved = store.reassign(&AssignmentId::from(id.as_str()), member.as_str().into(), start)?;
                Ok(("moved", json!(moved.id)))
            })
        }
        Command::Resize { id, edge, to } => {
            let to = T::parse_point(to)?;
            edit(cli, plan, |store| {
                let outcome = store.resize(&AssignmentId::from(id.as_str()), (*edge).into(), to)?;
                Ok(("shifted", json!(outcome.shifted)))
            })
        }
        Command::Validate => match plan.validate() {
            Ok(()) => {
                print_json(&json!({ "valid": true }))?;
                Ok(ExitCode::SUCCESS)
            }
            Err(issues) => {
                print_json(&json!({ "valid": false, "issues": issues }))?;
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

/// Run one store mutation and report it.
///
/// `apply` returns the key and value describing what changed. On success the
/// full item list is printed, and written back to `--plan` under `--write`.
fn edit<T, F>(cli: &Cli, plan: Plan<T>, apply: F) -> Result<ExitCode>
where
    T: TimePoint + Serialize,
    F: FnOnce(&mut AssignmentStore<T>) -> planner_engine::error::Result<(&'static str, Value)>,
{
    if cli.write && cli.plan.is_none() {
        bail!("--write needs --plan <FILE> to write to");
    }
    let (roster, mut store) = plan.into_store(cli.policy.into());

    let (key, detail) = match apply(&mut store) {
        Ok(change) => change,
        Err(e) => match e.rejection() {
            Some(reason) => {
                print_json(&json!({
                    "ok": false,
                    "reason": reason,
                    "message": reason.to_string(),
                }))?;
                return Ok(ExitCode::from(REJECTED));
            }
            None => return Err(e.into()),
        },
    };

    let plan = Plan::from_store(roster, store);
    if cli.write {
        if let Some(path) = &cli.plan {
            fs::write(path, plan.to_json_string()? + "\n")
                .with_context(|| format!("failed to write plan to {}", path.display()))?;
            info!(path = %path.display(), items = plan.items.len(), "plan written");
        }
    }

    let mut report = Map::new();
    report.insert("ok".into(), Value::Bool(true));
    report.insert(key.into(), detail);
    report.insert("assignments".into(), serde_json::to_value(&plan.items)?);
    print_json(&Value::Object(report))?;
    Ok(ExitCode::SUCCESS)
}

/// Read the plan from `--plan`, or stdin when it is omitted. Empty input is
/// an empty plan.
fn load_plan<T>(cli: &Cli) -> Result<Plan<T>>
where
    T: TimePoint + DeserializeOwned,
{
    let raw = match &cli.plan {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read plan from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read plan from stdin")?;
            buf
        }
    };

    if raw.trim().is_empty() {
        return Ok(Plan::default());
    }
    Ok(Plan::from_json_str(&raw)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
