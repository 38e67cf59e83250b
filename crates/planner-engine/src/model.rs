//! Assignment records, identifiers and boundary types.
//!
//! An [`Assignment`] is generic over its boundary type so the same overlap and
//! cascade rules serve both planner variants:
//!
//! - the calendar grid, where boundaries are whole days ([`NaiveDate`])
//! - the timeline, where boundaries are epoch milliseconds ([`Ms`])
//!
//! Both variants use closed intervals: an assignment occupies its start and
//! its end.

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeDelta};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PlannerError, Result};
use crate::span::Span;

/// Unix milliseconds, the timeline boundary type.
pub type Ms = i64;

// ── Identifiers ─────────────────────────────────────────────────────────────

/// Accepts either a JSON string or a JSON integer as an identifier.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                Ok(match RawId::deserialize(deserializer)? {
                    RawId::Text(s) => Self(s),
                    RawId::Number(n) => Self(n.to_string()),
                })
            }
        }
    };
}

string_id!(
    /// Stable identifier of one assignment.
    AssignmentId
);
string_id!(
    /// Identifier of a team member, which is also the lane key.
    TeamMemberId
);
string_id!(ProjectId);

// ── Boundary types ──────────────────────────────────────────────────────────

/// A point on a planning axis.
///
/// Implementations must keep `shift_to` and `shifted` consistent:
/// `a.shifted(a.shift_to(b)?) == Some(b)`.
pub trait TimePoint: Copy + Ord + fmt::Debug + fmt::Display {
    /// Signed distance between two points.
    type Shift: Copy + fmt::Debug + PartialEq;

    /// The signed distance `later - self`, or `None` on overflow.
    fn shift_to(self, later: Self) -> Option<Self::Shift>;

    /// Translate by `by`, or `None` when the result is not representable.
    fn shifted(self, by: Self::Shift) -> Option<Self>;

    /// Field names an [`Assignment`] over this boundary type is written with.
    const FIELDS: FieldNames;

    /// Parse a point from user input.
    fn parse_point(s: &str) -> Result<Self>;
}

/// JSON field names of an assignment's lane, project and boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldNames {
    pub team_member: &'static str,
    pub project: &'static str,
    pub start: &'static str,
    pub end: &'static str,
}

impl FieldNames {
    /// Calendar grid records.
    pub const CALENDAR: Self = Self {
        team_member: "teamMemberId",
        project: "projectId",
        start: "startDate",
        end: "endDate",
    };

    /// Timeline widget items.
    pub const TIMELINE: Self = Self {
        team_member: "group",
        project: "project",
        start: "start_time",
        end: "end_time",
    };
}

impl TimePoint for NaiveDate {
    type Shift = TimeDelta;

    const FIELDS: FieldNames = FieldNames::CALENDAR;

    fn shift_to(self, later: Self) -> Option<TimeDelta> {
        Some(later.signed_duration_since(self))
    }

    fn shifted(self, by: TimeDelta) -> Option<Self> {
        self.checked_add_signed(by)
    }

    /// Accepts `YYYY-MM-DD`.
    fn parse_point(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| PlannerError::InvalidDate(format!("{s}: {e}")))
    }
}

impl TimePoint for Ms {
    type Shift = i64;

    const FIELDS: FieldNames = FieldNames::TIMELINE;

    fn shift_to(self, later: Self) -> Option<i64> {
        later.checked_sub(self)
    }

    fn shifted(self, by: i64) -> Option<Self> {
        self.checked_add(by)
    }

    /// Accepts epoch milliseconds or an RFC 3339 datetime.
    fn parse_point(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(ms) = s.parse::<i64>() {
            return Ok(ms);
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.timestamp_millis())
            .map_err(|e| PlannerError::InvalidTimestamp(format!("{s}: {e}")))
    }
}

// ── Assignment ──────────────────────────────────────────────────────────────

/// One team member's commitment to one project over a closed range.
///
/// Either shape is accepted on input: the calendar names (`teamMemberId`,
/// `projectId`, `startDate`, `endDate`) or the timeline names (`group`,
/// `project`, `start_time`, `end_time`). Output uses the names of the
/// boundary type, see [`TimePoint::FIELDS`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment<T> {
    pub id: AssignmentId,
    #[serde(alias = "group", alias = "groupId")]
    pub team_member_id: TeamMemberId,
    #[serde(alias = "project")]
    pub project_id: ProjectId,
    #[serde(rename = "startDate", alias = "start_time")]
    pub start: T,
    #[serde(rename = "endDate", alias = "end_time")]
    pub end: T,
}

impl<T: TimePoint> Assignment<T> {
    pub fn new(
        id: impl Into<AssignmentId>,
        team_member_id: impl Into<TeamMemberId>,
        project_id: impl Into<ProjectId>,
        start: T,
        end: T,
    ) -> Self {
        Self {
            id: id.into(),
            team_member_id: team_member_id.into(),
            project_id: project_id.into(),
            start,
            end,
        }
    }

    pub fn span(&self) -> Span<T> {
        Span::new(self.start, self.end)
    }

    /// Copy of this assignment occupying `span` instead.
    pub fn with_span(&self, span: Span<T>) -> Self {
        Self {
            start: span.start,
            end: span.end,
            ..self.clone()
        }
    }

    /// Canonical lane order: by start, ties broken by id.
    pub fn lane_key(&self) -> (T, &AssignmentId) {
        (self.start, &self.id)
    }
}

impl<T: TimePoint + Serialize> Serialize for Assignment<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let names = T::FIELDS;
        let mut s = serializer.serialize_struct("Assignment", 5)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field(names.team_member, &self.team_member_id)?;
        s.serialize_field(names.project, &self.project_id)?;
        s.serialize_field(names.start, &self.start)?;
        s.serialize_field(names.end, &self.end)?;
        s.end()
    }
}
