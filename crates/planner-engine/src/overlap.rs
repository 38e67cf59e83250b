//! Overlap oracle: does a date or range collide with a team member's lane?
//!
//! Every input is an explicit [`Option`]. A missing input means the caller has
//! not finished selecting yet, and the answer is "no overlap" rather than an
//! error. An empty team member id is a present value and is compared like any
//! other.
//!
//! These are linear scans over an unordered snapshot. [`crate::lane::LaneIndex`]
//! answers the same questions over a sorted per-lane view.

use crate::model::{Assignment, AssignmentId, TeamMemberId, TimePoint};
use crate::span::Span;

/// Whether `date` falls inside any assignment of `team_member_id`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use planner_engine::{is_date_overlapping, Assignment, TeamMemberId};
///
/// let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
/// let plan = [Assignment::new("1", "tm1", "proj1", d("2024-08-05"), d("2024-08-07"))];
/// let tm1 = TeamMemberId::from("tm1");
///
/// assert!(is_date_overlapping(Some(d("2024-08-06")), Some(&plan[..]), Some(&tm1)));
/// assert!(!is_date_overlapping(Some(d("2024-08-08")), Some(&plan[..]), Some(&tm1)));
/// assert!(!is_date_overlapping(None, Some(&plan[..]), Some(&tm1)));
/// ```
pub fn is_date_overlapping<T: TimePoint>(
    date: Option<T>,
    assignments: Option<&[Assignment<T>]>,
    team_member_id: Option<&TeamMemberId>,
) -> bool {
    let (Some(date), Some(assignments), Some(team_member_id)) = (date, assignments, team_member_id)
    else {
        return false;
    };
    assignments
        .iter()
        .any(|a| &a.team_member_id == team_member_id && a.span().contains(date))
}

/// Whether `[start, end]` intersects any assignment of `team_member_id`,
/// ignoring the assignment `exclude` (the one being edited).
pub fn is_range_overlapping<T: TimePoint>(
    start: Option<T>,
    end: Option<T>,
    assignments: Option<&[Assignment<T>]>,
    team_member_id: Option<&TeamMemberId>,
    exclude: Option<&AssignmentId>,
) -> bool {
    find_range_overlap(start, end, assignments, team_member_id, exclude).is_some()
}

/// The first assignment that makes [`is_range_overlapping`] true, if any.
pub fn find_range_overlap<'a, T: TimePoint>(
    start: Option<T>,
    end: Option<T>,
    assignments: Option<&'a [Assignment<T>]>,
    team_member_id: Option<&TeamMemberId>,
    exclude: Option<&AssignmentId>,
) -> Option<&'a Assignment<T>> {
    let (start, end, assignments, team_member_id) = (start?, end?, assignments?, team_member_id?);
    let candidate = Span::new(start, end);
    assignments.iter().find(|other| {
        if Some(&other.id) == exclude || &other.team_member_id != team_member_id {
            return false;
        }
        candidate.overlaps(&other.span())
    })
}
