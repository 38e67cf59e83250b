//! Resize cascade engine.
//!
//! Moves one edge of one assignment and, for end-edge resizes under
//! [`ResizePolicy::Cascade`], translates every later assignment of the same
//! lane by the same amount so that no overlap is introduced.
//!
//! # Lifecycle
//!
//! A resize goes through three stages, each a distinct type:
//!
//! - [`ResizeRequest`]: the proposal (assignment, edge, new boundary)
//! - [`ValidatedResize`]: checked against one snapshot under one policy
//! - [`ResizeOutcome`]: the complete new assignment set
//!
//! Any stage may end in a [`Rejection`] instead. The snapshot is only ever
//! borrowed, so a rejected resize leaves it exactly as it was and a successful
//! one produces a new `Vec` that the caller commits as a whole.
//!
//! # Asymmetry
//!
//! Only end-edge moves cascade. A start-edge move changes the resized
//! assignment alone and is refused if it reaches an earlier assignment.

use crate::error::Rejection;
use crate::lane::LaneIndex;
use crate::model::{Assignment, AssignmentId, TimePoint};
use crate::span::Span;

/// Which boundary of an assignment is being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// How a resize treats the rest of the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Timeline behaviour: an end-edge move shifts every assignment at or
    /// after the old end by the same delta. Resized spans must have positive
    /// length.
    #[default]
    Cascade,
    /// Calendar behaviour: nothing else moves and any overlap refuses the
    /// resize. A single-point span `[d, d]` is allowed.
    Refuse,
}

/// A proposed boundary move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest<T> {
    pub id: AssignmentId,
    pub edge: Edge,
    pub boundary: T,
}

/// A resize that passed every check against `snapshot`.
#[derive(Debug)]
pub struct ValidatedResize<'a, T: TimePoint> {
    snapshot: &'a [Assignment<T>],
    target: &'a Assignment<T>,
    span: Span<T>,
    time_shift: Option<T::Shift>,
}

/// The applied result of a resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOutcome<T: TimePoint> {
    /// Every assignment of the snapshot, in snapshot order, with the resized
    /// and shifted ones replaced.
    pub assignments: Vec<Assignment<T>>,
    /// Ids of assignments translated by the cascade.
    pub shifted: Vec<AssignmentId>,
    /// `new_end - old_end` when a cascade ran.
    pub time_shift: Option<T::Shift>,
}

impl<T: TimePoint> ResizeRequest<T> {
    pub fn new(id: impl Into<AssignmentId>, edge: Edge, boundary: T) -> Self {
        Self {
            id: id.into(),
            edge,
            boundary,
        }
    }

    /// Check the request against `snapshot` under `policy`.
    ///
    /// # Errors
    ///
    /// - [`Rejection::NotFound`] if no assignment has the requested id
    /// - [`Rejection::InvalidRange`] if, under `Cascade`, the new span would
    ///   have zero or negative length, or the shift is not representable
    /// - [`Rejection::BoundaryOrderViolation`] if, under `Refuse`, the moved
    ///   edge passes the fixed one
    /// - [`Rejection::OverlapConflict`] if the new span reaches an assignment
    ///   of the same lane that the cascade will not move
    pub fn validate<'a>(
        &self,
        snapshot: &'a [Assignment<T>],
        policy: ResizePolicy,
    ) -> Result<ValidatedResize<'a, T>, Rejection> {
        let target = snapshot
            .iter()
            .find(|a| a.id == self.id)
            .ok_or(Rejection::NotFound)?;

        let span = match self.edge {
            Edge::Start => Span::new(self.boundary, target.end),
            Edge::End => Span::new(target.start, self.boundary),
        };

        match policy {
            ResizePolicy::Cascade => {
                if span.end <= span.start {
                    return Err(Rejection::InvalidRange);
                }
            }
            ResizePolicy::Refuse => {
                let crosses = match self.edge {
                    Edge::Start => self.boundary > target.end,
                    Edge::End => self.boundary < target.start,
                };
                if crosses {
                    return Err(Rejection::BoundaryOrderViolation);
                }
            }
        }

        let cascades =
            policy == ResizePolicy::Cascade && self.edge == Edge::End && span.end != target.end;
        let time_shift = if cascades {
            Some(target.end.shift_to(span.end).ok_or(Rejection::InvalidRange)?)
        } else {
            None
        };

        let index = LaneIndex::new(snapshot);
        let blocked = index
            .overlapping(&target.team_member_id, span)
            .filter(|other| !std::ptr::eq(*other, target))
            .any(|other| !(cascades && other.start >= target.end));
        if blocked {
            return Err(Rejection::OverlapConflict);
        }

        Ok(ValidatedResize {
            snapshot,
            target,
            span,
            time_shift,
        })
    }
}

impl<'a, T: TimePoint> ValidatedResize<'a, T> {
    /// The resized assignment's new span.
    pub fn span(&self) -> Span<T> {
        self.span
    }

    pub fn time_shift(&self) -> Option<T::Shift> {
        self.time_shift
    }

    /// Build the new assignment set.
    ///
    /// # Errors
    ///
    /// - [`Rejection::InvalidRange`] if a shifted assignment leaves the axis
    /// - [`Rejection::OverlapConflict`] if the resulting lane is not pairwise
    ///   disjoint (only possible when the snapshot already overlapped)
    pub fn apply(self) -> Result<ResizeOutcome<T>, Rejection> {
        let lane = &self.target.team_member_id;
        let old_end = self.target.end;
        let mut assignments = Vec::with_capacity(self.snapshot.len());
        let mut shifted = Vec::new();

        for a in self.snapshot {
            if std::ptr::eq(a, self.target) {
                assignments.push(a.with_span(self.span));
                continue;
            }
            match self.time_shift {
                Some(shift) if &a.team_member_id == lane && a.start >= old_end => {
                    let moved = a.span().shifted_by(shift).ok_or(Rejection::InvalidRange)?;
                    assignments.push(a.with_span(moved));
                    shifted.push(a.id.clone());
                }
                _ => assignments.push(a.clone()),
            }
        }

        if LaneIndex::new(&assignments).first_collision(lane).is_some() {
            return Err(Rejection::OverlapConflict);
        }

        Ok(ResizeOutcome {
            assignments,
            shifted,
            time_shift: self.time_shift,
        })
    }
}

/// Move `edge` of assignment `id` to `boundary` and return the new set.
///
/// # Examples
///
/// ```
/// use planner_engine::{resize_edge, Assignment, AssignmentId, Edge, ResizePolicy};
///
/// let lane = vec![
///     Assignment::new("a", "g", "p", 10_i64, 20),
///     Assignment::new("b", "g", "p", 25, 30),
/// ];
/// let out = resize_edge(&AssignmentId::from("a"), Edge::End, 23, &lane, ResizePolicy::Cascade)
///     .unwrap();
/// assert_eq!((out.assignments[0].start, out.assignments[0].end), (10, 23));
/// assert_eq!((out.assignments[1].start, out.assignments[1].end), (28, 33));
/// ```
pub fn resize_edge<T: TimePoint>(
    id: &AssignmentId,
    edge: Edge,
    boundary: T,
    assignments: &[Assignment<T>],
    policy: ResizePolicy,
) -> Result<ResizeOutcome<T>, Rejection> {
    ResizeRequest::new(id.clone(), edge, boundary)
        .validate(assignments, policy)?
        .apply()
}
