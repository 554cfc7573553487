//! Prerequisite checklist ("semáforo") rules.
//!
//! Each (student, prerequisite) pair moves through a two-step confirmation:
//! the student self-reports completion, then a director validates it. The
//! student is eligible to start the thesis once every tracked pair is
//! validated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Validation state
-------------------------------------------------------------------------- */

/// Confirmation state of a student's prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "completado")]
    Completed,
    #[serde(rename = "validado")]
    Validated,
}

impl ValidationState {
    /// Database / wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Completed => "completado",
            Self::Validated => "validado",
        }
    }
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "completado" => Ok(Self::Completed),
            "validado" => Ok(Self::Validated),
            other => Err(CoreError::Internal(format!(
                "Unknown prerequisite validation state '{other}'"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Transitions
-------------------------------------------------------------------------- */

/// Whether a self-report may (re)stamp the row.
///
/// A validated prerequisite is never pushed back to `completado`; repeated
/// reports before validation only refresh the marked-at timestamp.
pub fn can_mark(current: Option<ValidationState>) -> bool {
    !matches!(current, Some(ValidationState::Validated))
}

/// Check that a director may validate a prerequisite in `current` state.
///
/// Only a self-reported (`completado`) row may be validated: validating a
/// pending row skips the student's confirmation and validating twice is a
/// no-op the caller must be told about.
pub fn check_validate(current: ValidationState) -> Result<(), CoreError> {
    match current {
        ValidationState::Completed => Ok(()),
        ValidationState::Validated => Err(CoreError::Forbidden(
            "El prerequisito ya fue validado".into(),
        )),
        ValidationState::Pending => Err(CoreError::Forbidden(
            "El prerequisito debe estar marcado como completado".into(),
        )),
    }
}

/* --------------------------------------------------------------------------
Eligibility
-------------------------------------------------------------------------- */

/// How a student with no tracked prerequisites is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EligibilityPolicy {
    /// "All of none": an empty checklist counts as fully validated.
    #[default]
    EmptyIsEligible,
    /// A student must have at least one validated row.
    EmptyIsIneligible,
}

impl FromStr for EligibilityPolicy {
    type Err = String;

    /// Parses the boolean `EMPTY_PREREQUISITES_ELIGIBLE` setting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Self::EmptyIsEligible),
            "false" | "0" | "no" => Ok(Self::EmptyIsIneligible),
            other => Err(format!("expected a boolean, got '{other}'")),
        }
    }
}

/// Derive the semaphore: green iff every tracked row is validated.
pub fn is_eligible<I>(states: I, policy: EligibilityPolicy) -> bool
where
    I: IntoIterator<Item = ValidationState>,
{
    let mut seen = false;
    for state in states {
        seen = true;
        if state != ValidationState::Validated {
            return false;
        }
    }
    seen || policy == EligibilityPolicy::EmptyIsEligible
}

/* --------------------------------------------------------------------------
Reference data rules
-------------------------------------------------------------------------- */

/// Maximum length for a prerequisite name.
pub const MAX_NAME_LENGTH: u64 = 150;
