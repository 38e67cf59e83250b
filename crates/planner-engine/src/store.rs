//! Caller-owned assignment store.
//!
//! The store is the single mutable owner of a plan's assignments. Every
//! mutation hands an immutable snapshot to the pure core ([`crate::overlap`],
//! [`crate::cascade`]) and commits the returned set wholesale, or nothing at
//! all when the core rejects it.

use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::cascade::{resize_edge, Edge, ResizeOutcome, ResizePolicy};
use crate::error::{Rejection, Result};
use crate::model::{Assignment, AssignmentId, ProjectId, TeamMemberId, TimePoint};
use crate::overlap::find_range_overlap;
use crate::span::Span;

/// Source of fresh assignment ids.
pub trait IdSource {
    fn next_id(&mut self) -> AssignmentId;
}

/// Lexicographically sortable ids from [`Ulid`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UlidIds;

impl IdSource for UlidIds {
    fn next_id(&mut self) -> AssignmentId {
        AssignmentId::new(Ulid::new().to_string())
    }
}

/// Sequential ids with a fixed prefix: `a1`, `a2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> AssignmentId {
        let id = AssignmentId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

/// What a calendar cell toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle<T> {
    Created(AssignmentId),
    Removed(Assignment<T>),
}

pub struct AssignmentStore<T, I = UlidIds> {
    assignments: Vec<Assignment<T>>,
    policy: ResizePolicy,
    ids: I,
}

impl<T: TimePoint> AssignmentStore<T> {
    pub fn new(policy: ResizePolicy) -> Self {
        Self::with_ids(policy, UlidIds)
    }

    pub fn from_assignments(assignments: Vec<Assignment<T>>, policy: ResizePolicy) -> Self {
        Self {
            assignments,
            policy,
            ids: UlidIds,
        }
    }
}

impl<T: TimePoint, I: IdSource> AssignmentStore<T, I> {
    pub fn with_ids(policy: ResizePolicy, ids: I) -> Self {
        Self {
            assignments: Vec::new(),
            policy,
            ids,
        }
    }

    pub fn snapshot(&self) -> &[Assignment<T>] {
        &self.assignments
    }

    pub fn get(&self, id: &AssignmentId) -> Option<&Assignment<T>> {
        self.assignments.iter().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn into_assignments(self) -> Vec<Assignment<T>> {
        self.assignments
    }

    /// Create an assignment over `[start, end]` for `team_member`.
    ///
    /// # Errors
    ///
    /// [`Rejection::InvalidRange`] if `start > end`, [`Rejection::OverlapConflict`]
    /// if the range touches another assignment of the same team member.
    pub fn create(
        &mut self,
        team_member: TeamMemberId,
        project: ProjectId,
        start: T,
        end: T,
    ) -> Result<AssignmentId> {
        if !Span::new(start, end).is_ordered() {
            warn!(%team_member, %start, %end, "refusing inverted assignment range");
            return Err(Rejection::InvalidRange.into());
        }
        if let Some(blocker) = find_range_overlap(
            Some(start),
            Some(end),
            Some(&self.assignments[..]),
            Some(&team_member),
            None,
        ) {
            warn!(
                %team_member, %start, %end, blocker = %blocker.id,
                "cannot create assignment: range already covered"
            );
            return Err(Rejection::OverlapConflict.into());
        }

        let id = self.ids.next_id();
        info!(%id, %team_member, %project, %start, %end, "assignment created");
        self.assignments
            .push(Assignment::new(id.clone(), team_member, project, start, end));
        Ok(id)
    }

    /// Remove an assignment by id.
    pub fn remove(&mut self, id: &AssignmentId) -> Result<Assignment<T>> {
        let Some(pos) = self.assignments.iter().position(|a| &a.id == id) else {
            warn!(%id, "cannot remove unknown assignment");
            return Err(Rejection::NotFound.into());
        };
        let removed = self.assignments.remove(pos);
        info!(%id, team_member = %removed.team_member_id, "assignment removed");
        Ok(removed)
    }

    /// Calendar cell click: remove the assignment covering `day`, or create a
    /// single-point assignment there.
    pub fn toggle_day(
        &mut self,
        team_member: TeamMemberId,
        project: ProjectId,
        day: T,
    ) -> Result<Toggle<T>> {
        let covering = self
            .assignments
            .iter()
            .find(|a| a.team_member_id == team_member && a.span().contains(day))
            .map(|a| a.id.clone());
        match covering {
            Some(id) => self.remove(&id).map(Toggle::Removed),
            None => self.create(team_member, project, day, day).map(Toggle::Created),
        }
    }

    /// Move one edge of `id` under the store's policy and commit the result.
    pub fn resize(&mut self, id: &AssignmentId, edge: Edge, boundary: T) -> Result<ResizeOutcome<T>> {
        match resize_edge(id, edge, boundary, &self.assignments, self.policy) {
            Ok(outcome) => {
                info!(
                    %id, ?edge, %boundary,
                    shifted = outcome.shifted.len(),
                    "assignment resized"
                );
                for moved in &outcome.shifted {
                    debug!(%id, shifted = %moved, shift = ?outcome.time_shift, "cascade shift");
                }
                self.assignments.clone_from(&outcome.assignments);
                Ok(outcome)
            }
            Err(reason) => {
                warn!(%id, ?edge, %boundary, %reason, "resize rejected");
                Err(reason.into())
            }
        }
    }

    /// Timeline item move: keep the duration, start at `new_start` in
    /// `team_member`'s lane. Same id, treated as delete plus create.
    pub fn reassign(
        &mut self,
        id: &AssignmentId,
        team_member: TeamMemberId,
        new_start: T,
    ) -> Result<&Assignment<T>> {
        let Some(pos) = self.assignments.iter().position(|a| &a.id == id) else {
            warn!(%id, "cannot move unknown assignment");
            return Err(Rejection::NotFound.into());
        };
        let current = &self.assignments[pos];
        let span = current
            .span()
            .length()
            .and_then(|len| new_start.shifted(len))
            .map(|end| Span::new(new_start, end))
            .ok_or(Rejection::InvalidRange)?;

        if let Some(blocker) = find_range_overlap(
            Some(span.start),
            Some(span.end),
            Some(&self.assignments[..]),
            Some(&team_member),
            Some(id),
        ) {
            warn!(%id, %team_member, start = %span.start, blocker = %blocker.id, "move rejected");
            return Err(Rejection::OverlapConflict.into());
        }

        let moved = Assignment {
            team_member_id: team_member,
            ..current.with_span(span)
        };
        info!(%id, team_member = %moved.team_member_id, start = %span.start, end = %span.end, "assignment moved");
        self.assignments[pos] = moved;
        Ok(&self.assignments[pos])
    }
}
