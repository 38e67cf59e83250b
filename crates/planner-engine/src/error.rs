//! Error types for planner-engine operations.

use serde::Serialize;
use thiserror::Error;

/// Why a proposed mutation was refused.
///
/// Rejections are ordinary values: the snapshot they were computed from is
/// untouched, and the caller decides how to present the reason.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rejection {
    #[error("assignment not found")]
    NotFound,

    #[error("range would collapse or invert")]
    InvalidRange,

    #[error("moved edge crosses the opposite edge")]
    BoundaryOrderViolation,

    #[error("range overlaps another assignment of the same team member")]
    OverlapConflict,
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),
}

impl PlannerError {
    /// The rejection reason, if this error is a refused mutation.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            PlannerError::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
