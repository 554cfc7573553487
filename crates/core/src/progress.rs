//! Weekly progress report ("avance") rules.
//!
//! One report exists per (proposal, week) slot. A report is `pendiente`
//! until the student submits it (`entregado`) and is `revisado` once a tutor
//! or director grades it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

pub const MIN_WEEK: i32 = 1;
pub const MAX_WEEK: i32 = 16;
pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;
/// Minimum length of the report body when a slot is created.
pub const MIN_CONTENT_LENGTH: u64 = 20;

/* --------------------------------------------------------------------------
Report state
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "entregado")]
    Submitted,
    #[serde(rename = "revisado")]
    Reviewed,
}

impl ReportState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Submitted => "entregado",
            Self::Reviewed => "revisado",
        }
    }

    /// Submitted and reviewed reports both count as delivered.
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Submitted | Self::Reviewed)
    }
}

impl fmt::Display for ReportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "entregado" => Ok(Self::Submitted),
            "revisado" => Ok(Self::Reviewed),
            other => Err(CoreError::Internal(format!(
                "Unknown progress report state '{other}'"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Transitions
-------------------------------------------------------------------------- */

/// Whether a report that was already submitted may be submitted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResubmissionPolicy {
    /// Any report may be (re)submitted; a reviewed report goes back to
    /// `entregado` and must be graded again.
    #[default]
    Allow,
    /// Only `pendiente` reports may be submitted.
    PendingOnly,
}

impl FromStr for ResubmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "pending_only" => Ok(Self::PendingOnly),
            other => Err(format!("expected 'allow' or 'pending_only', got '{other}'")),
        }
    }
}

pub fn check_submit(current: ReportState, policy: ResubmissionPolicy) -> Result<(), CoreError> {
    match (policy, current) {
        (ResubmissionPolicy::Allow, _) | (ResubmissionPolicy::PendingOnly, ReportState::Pending) => {
            Ok(())
        }
        (ResubmissionPolicy::PendingOnly, state) => Err(CoreError::Forbidden(format!(
            "El avance ya fue entregado (estado actual: {state})"
        ))),
    }
}

/// A report can only be graded right after submission.
pub fn check_grade(current: ReportState) -> Result<(), CoreError> {
    if current != ReportState::Submitted {
        return Err(CoreError::Forbidden(
            "El avance debe estar entregado para ser calificado".into(),
        ));
    }
    Ok(())
}

/// A pending report whose due date has passed.
pub fn is_overdue(state: ReportState, due_date: Timestamp, now: Timestamp) -> bool {
    state == ReportState::Pending && due_date < now
}

/* --------------------------------------------------------------------------
Progress summary
-------------------------------------------------------------------------- */

/// Aggregate completion of a proposal's weekly reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    /// Percentage of delivered reports, rounded half-up.
    #[serde(rename = "progreso")]
    pub progress: i64,
    #[serde(rename = "avancesEntregados")]
    pub submitted_count: i64,
    #[serde(rename = "totalAvances")]
    pub total: i64,
}

pub fn compute_progress<I>(states: I) -> ProgressSummary
where
    I: IntoIterator<Item = ReportState>,
{
    let (submitted_count, total) = states
        .into_iter()
        .fold((0i64, 0i64), |(done, all), s| {
            (done + i64::from(s.is_delivered()), all + 1)
        });

    if total == 0 {
        return ProgressSummary {
            progress: 0,
            submitted_count: 0,
            total: 0,
        };
    }

    // Integer form of round(100 * done / all) for non-negative values.
    let progress = (200 * submitted_count + total) / (2 * total);

    ProgressSummary {
        progress,
        submitted_count,
        total,
    }
}
