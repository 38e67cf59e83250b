//! Plan document: the team roster, the project list and the assignments.
//!
//! This is the caller-side JSON shape (`groups`, `projects`, `items`). The
//! overlap and cascade modules never see it; a plan is turned into an
//! [`AssignmentStore`] for editing and rebuilt from it afterwards.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ulid::Ulid;

use crate::cascade::ResizePolicy;
use crate::error::{PlannerError, Result};
use crate::lane::LaneIndex;
use crate::model::{Assignment, ProjectId, TeamMemberId, TimePoint};
use crate::store::AssignmentStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: TeamMemberId,
    #[serde(alias = "name")]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: TimePoint + Serialize",
    deserialize = "T: Deserialize<'de>"
))]
pub struct Plan<T> {
    #[serde(default)]
    pub groups: Vec<TeamMember>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub items: Vec<Assignment<T>>,
}

impl<T> Default for Plan<T> {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            projects: Vec::new(),
            items: Vec::new(),
        }
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

/// One structural problem found by [`Plan::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanIssue {
    pub kind: PlanIssueKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanIssueKind {
    DuplicateId,
    UnknownTeamMember,
    UnknownProject,
    InvertedRange,
    Overlap,
}

impl PlanIssue {
    fn new(kind: PlanIssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PlanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

fn check_name(kind: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlannerError::InvalidPlan(format!("{kind} name must not be empty")));
    }
    Ok(name.to_string())
}

impl<T: TimePoint> Plan<T> {
    /// Check the whole document and report every problem found.
    ///
    /// Checks, in order:
    /// 1. No duplicate team member, project or item ids
    /// 2. Every item has `start <= end`
    /// 3. Every item references a known team member and project
    /// 4. No two items of one team member overlap
    pub fn validate(&self) -> std::result::Result<(), Vec<PlanIssue>> {
        let mut issues = Vec::new();

        let mut member_ids = HashSet::new();
        for m in &self.groups {
            if !member_ids.insert(&m.id) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::DuplicateId,
                    format!("Duplicate team member ID: {}", m.id),
                ));
            }
        }
        let mut project_ids = HashSet::new();
        for p in &self.projects {
            if !project_ids.insert(&p.id) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::DuplicateId,
                    format!("Duplicate project ID: {}", p.id),
                ));
            }
        }
        let mut item_ids = HashSet::new();
        for item in &self.items {
            if !item_ids.insert(&item.id) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::DuplicateId,
                    format!("Duplicate assignment ID: {}", item.id),
                ));
            }
            if !item.span().is_ordered() {
                issues.push(PlanIssue::new(
                    PlanIssueKind::InvertedRange,
                    format!("Assignment '{}' ends ({}) before it starts ({})", item.id, item.end, item.start),
                ));
            }
            if !member_ids.contains(&item.team_member_id) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::UnknownTeamMember,
                    format!("Assignment '{}' references unknown team member '{}'", item.id, item.team_member_id),
                ));
            }
            if !project_ids.contains(&item.project_id) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::UnknownProject,
                    format!("Assignment '{}' references unknown project '{}'", item.id, item.project_id),
                ));
            }
        }

        let index = LaneIndex::new(&self.items);
        let mut lanes: Vec<&TeamMemberId> = index.team_members().collect();
        lanes.sort();
        for lane in lanes {
            for (a, b) in index.collisions(lane) {
                issues.push(PlanIssue::new(
                    PlanIssueKind::Overlap,
                    format!("Assignments '{}' and '{}' of team member '{}' overlap", a.id, b.id, lane),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }

    // ── Roster ──────────────────────────────────────────────────────────

    pub fn member(&self, id: &TeamMemberId) -> Option<&TeamMember> {
        self.groups.iter().find(|m| &m.id == id)
    }

    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn add_member(&mut self, title: &str) -> Result<TeamMemberId> {
        let title = check_name("team member", title)?;
        let id = TeamMemberId::new(Ulid::new().to_string());
        info!(%id, %title, "team member added");
        self.groups.push(TeamMember { id: id.clone(), title });
        Ok(id)
    }

    /// Remove a team member together with every assignment in their lane.
    pub fn remove_member(&mut self, id: &TeamMemberId) -> Result<TeamMember> {
        let pos = self
            .groups
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| PlannerError::InvalidPlan(format!("unknown team member '{id}'")))?;
        let removed = self.groups.remove(pos);
        let before = self.items.len();
        self.items.retain(|a| &a.team_member_id != id);
        debug!(%id, dropped = before - self.items.len(), "team member assignments dropped");
        info!(%id, "team member removed");
        Ok(removed)
    }

    pub fn add_project(&mut self, name: &str, color: Option<String>) -> Result<ProjectId> {
        let name = check_name("project", name)?;
        let id = ProjectId::new(Ulid::new().to_string());
        info!(%id, %name, "project added");
        self.projects.push(Project {
            id: id.clone(),
            name,
            color,
        });
        Ok(id)
    }

    /// Remove a project together with every assignment to it.
    pub fn remove_project(&mut self, id: &ProjectId) -> Result<Project> {
        let pos = self
            .projects
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| PlannerError::InvalidPlan(format!("unknown project '{id}'")))?;
        let removed = self.projects.remove(pos);
        let before = self.items.len();
        self.items.retain(|a| &a.project_id != id);
        debug!(%id, dropped = before - self.items.len(), "project assignments dropped");
        info!(%id, "project removed");
        Ok(removed)
    }

    // ── Store conversion ────────────────────────────────────────────────

    /// Split into roster and an editable store.
    pub fn into_store(self, policy: ResizePolicy) -> (Roster, AssignmentStore<T>) {
        let roster = Roster {
            groups: self.groups,
            projects: self.projects,
        };
        (roster, AssignmentStore::from_assignments(self.items, policy))
    }

    pub fn from_store<I>(roster: Roster, store: AssignmentStore<T, I>) -> Self
    where
        I: crate::store::IdSource,
    {
        Self {
            groups: roster.groups,
            projects: roster.projects,
            items: store.into_assignments(),
        }
    }
}

impl<T: TimePoint + Serialize> Plan<T> {
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PlannerError::InvalidPlan(e.to_string()))
    }
}

impl<T: TimePoint + for<'de> Deserialize<'de>> Plan<T> {
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PlannerError::InvalidPlan(e.to_string()))
    }
}

/// The non-assignment half of a plan, held while the items are in a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub groups: Vec<TeamMember>,
    pub projects: Vec<Project>,
}
