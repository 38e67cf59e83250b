//! Sorted per-lane view over an assignment snapshot.
//!
//! Groups a borrowed snapshot by team member and keeps each lane in canonical
//! order (start, then id). Range queries binary-search past every entry that
//! starts after the query ends, then filter the prefix by end. The answers are
//! identical to the linear scans in [`crate::overlap`].

use std::collections::HashMap;

use crate::model::{Assignment, AssignmentId, TeamMemberId, TimePoint};
use crate::span::Span;

pub struct LaneIndex<'a, T> {
    lanes: HashMap<&'a TeamMemberId, Vec<&'a Assignment<T>>>,
}

impl<'a, T: TimePoint> LaneIndex<'a, T> {
    pub fn new(assignments: &'a [Assignment<T>]) -> Self {
        let mut lanes: HashMap<&'a TeamMemberId, Vec<&'a Assignment<T>>> = HashMap::new();
        for a in assignments {
            lanes.entry(&a.team_member_id).or_default().push(a);
        }
        for lane in lanes.values_mut() {
            lane.sort_by(|x, y| x.lane_key().cmp(&y.lane_key()));
        }
        Self { lanes }
    }

    /// All assignments of `team_member`, in lane order.
    pub fn lane(&self, team_member: &TeamMemberId) -> &[&'a Assignment<T>] {
        self.lanes.get(team_member).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn team_members(&self) -> impl Iterator<Item = &'a TeamMemberId> + '_ {
        self.lanes.keys().copied()
    }

    /// Assignments of `team_member` whose closed span intersects `query`.
    pub fn overlapping(
        &self,
        team_member: &TeamMemberId,
        query: Span<T>,
    ) -> impl Iterator<Item = &'a Assignment<T>> + '_ {
        let lane = self.lane(team_member);
        // Everything at index >= right_bound starts after query.end.
        let right_bound = lane.partition_point(|a| a.start <= query.end);
        lane[..right_bound]
            .iter()
            .copied()
            .filter(move |a| a.end >= query.start)
    }

    pub fn is_range_overlapping(
        &self,
        team_member: &TeamMemberId,
        query: Span<T>,
        exclude: Option<&AssignmentId>,
    ) -> bool {
        self.overlapping(team_member, query)
            .any(|a| Some(&a.id) != exclude)
    }

    /// Every pair of overlapping assignments in `team_member`'s lane, in lane
    /// order of the earlier one.
    pub fn collisions(
        &self,
        team_member: &TeamMemberId,
    ) -> Vec<(&'a Assignment<T>, &'a Assignment<T>)> {
        let lane = self.lane(team_member);
        let mut pairs = Vec::new();
        for (i, &a) in lane.iter().enumerate() {
            // Later entries start no earlier than `a`, so they hit it exactly
            // while they start at or before its end.
            for &b in lane[i + 1..].iter().take_while(|b| b.start <= a.end) {
                pairs.push((a, b));
            }
        }
        pairs
    }

    /// First pair of assignments in `team_member`'s lane that overlap.
    pub fn first_collision(
        &self,
        team_member: &TeamMemberId,
    ) -> Option<(&'a Assignment<T>, &'a Assignment<T>)> {
        let lane = self.lane(team_member);
        // Sorted by start, so tracking the furthest end seen so far is enough.
        let mut reach: Option<&'a Assignment<T>> = None;
        for &a in lane {
            if let Some(prev) = reach {
                if a.start <= prev.end {
                    return Some((prev, a));
                }
            }
            if reach.is_none_or(|prev| a.end > prev.end) {
                reach = Some(a);
            }
        }
        None
    }
}
