//! Proposal lifecycle rules: idea quota, decision states, observation ownership.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// A student may pitch at most this many `idea` proposals.
pub const MAX_IDEAS_PER_STUDENT: i64 = 3;

/// Minimum length of a committee observation.
pub const MIN_OBSERVATION_LENGTH: u64 = 10;

pub const MIN_TOPIC_LENGTH: u64 = 10;
pub const MAX_TOPIC_LENGTH: u64 = 255;
/// Minimum length for objectives, problem statement and scope.
pub const MIN_DESCRIPTIVE_LENGTH: u64 = 20;
pub const MAX_RESEARCH_AREA_LENGTH: u64 = 100;
pub const MAX_ATTACHMENT_LENGTH: u64 = 255;

/* --------------------------------------------------------------------------
Proposal type
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProposalType {
    /// One of up to three early topic pitches.
    #[default]
    #[serde(rename = "idea")]
    Idea,
    /// The formal proposal.
    #[serde(rename = "anteproyecto")]
    Draft,
}

impl ProposalType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idea => "idea",
            Self::Draft => "anteproyecto",
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idea" => Ok(Self::Idea),
            "anteproyecto" => Ok(Self::Draft),
            other => Err(CoreError::Validation(format!(
                "Invalid proposal type '{other}'. Must be one of: idea, anteproyecto"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Proposal state
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "aprobada")]
    Approved,
    #[serde(rename = "rechazada")]
    Rejected,
}

impl ProposalState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Approved => "aprobada",
            Self::Rejected => "rechazada",
        }
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "aprobada" => Ok(Self::Approved),
            "rechazada" => Ok(Self::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid proposal state '{other}'. Must be one of: pendiente, aprobada, rechazada"
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Rules
-------------------------------------------------------------------------- */

/// Enforce the idea quota before inserting a new proposal.
///
/// `existing_ideas` is the number of `idea` proposals the student already
/// holds. `anteproyecto` submissions are unlimited.
pub fn check_idea_quota(kind: ProposalType, existing_ideas: i64) -> Result<(), CoreError> {
    if kind == ProposalType::Idea && existing_ideas >= MAX_IDEAS_PER_STUDENT {
        return Err(CoreError::Forbidden(format!(
            "Ya has registrado {MAX_IDEAS_PER_STUDENT} ideas de propuesta"
        )));
    }
    Ok(())
}

/// The idea number is only kept for `idea` proposals.
pub fn effective_idea_number(kind: ProposalType, idea_number: Option<i32>) -> Option<i32> {
    match kind {
        ProposalType::Idea => idea_number,
        ProposalType::Draft => None,
    }
}

/// A director decision may only set `aprobada` or `rechazada`.
///
/// There is no guard on the current state: a rejected proposal may be
/// approved later and vice versa.
pub fn check_decision(target: ProposalState) -> Result<(), CoreError> {
    match target {
        ProposalState::Approved | ProposalState::Rejected => Ok(()),
        ProposalState::Pending => Err(CoreError::Validation(
            "El estado debe ser 'aprobada' o 'rechazada'".into(),
        )),
    }
}

/// The comment attached to a decision, if any.
///
/// An empty comment is the same as no comment. Any other text is logged as
/// given; the observation length minimum does not apply to decisions.
pub fn decision_comment(comment: Option<&str>) -> Option<&str> {
    comment.filter(|c| !c.is_empty())
}

/// Only the author of an observation may delete it, whatever their role.
pub fn check_observation_owner(
    author_id: crate::types::DbId,
    caller_id: crate::types::DbId,
) -> Result<(), CoreError> {
    if author_id != caller_id {
        return Err(CoreError::Forbidden(
            "No puedes eliminar observaciones de otros usuarios".into(),
        ));
    }
    Ok(())
}
