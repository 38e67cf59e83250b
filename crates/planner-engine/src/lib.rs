//! # planner-engine
//!
//! Deterministic assignment planning for team calendars and timelines.
//!
//! Team members are assigned to projects over closed date (or instant) ranges,
//! and no two assignments of one team member may share any point in time. The
//! engine decides whether a proposed range collides with a team member's lane
//! and computes the cascade of shifts that keeps the lane disjoint when an
//! assignment is resized.
//!
//! ## Modules
//!
//! - [`model`]: Assignments, identifiers and the [`TimePoint`] boundary trait
//! - [`span`]: Closed intervals
//! - [`overlap`]: Single-date and range overlap checks
//! - [`lane`]: Sorted per-team-member view for indexed overlap queries
//! - [`cascade`]: Edge resizes with cascading shifts
//! - [`store`]: Caller-owned assignment store that commits core results
//! - [`plan`]: Plan document (roster, projects, items) and validation
//! - [`error`]: Error types

pub mod cascade;
pub mod error;
pub mod lane;
pub mod model;
pub mod overlap;
pub mod plan;
pub mod span;
pub mod store;

pub use cascade::{
    resize_edge, Edge, ResizeOutcome, ResizePolicy, ResizeRequest, ValidatedResize,
};
pub use error::{PlannerError, Rejection};
pub use lane::LaneIndex;
pub use model::{Assignment, AssignmentId, Ms, ProjectId, TeamMemberId, TimePoint};
pub use overlap::{find_range_overlap, is_date_overlapping, is_range_overlapping};
pub use plan::{Plan, PlanIssue, PlanIssueKind, Project, Roster, TeamMember};
pub use span::Span;
pub use store::{AssignmentStore, IdSource, SequentialIds, Toggle, UlidIds};
