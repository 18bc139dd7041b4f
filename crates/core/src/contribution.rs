//! Contribution records, their closed set of types, and status rules.
//!
//! A contribution is a proposed change to one of the demographic entity
//! tables. It starts `pending`, is moved to `approved` or `rejected` by a
//! moderator, and may be returned from `approved` to `pending` when merging
//! its payload fails.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityKind, WriteMode};
use crate::error::CoreError;
use crate::types::{ContributionId, EntityRow, Timestamp};

/// The kind of change a contribution proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionType {
    NewRegion,
    UpdateRegion,
    NewCountry,
    UpdateCountry,
    NewEthnicity,
    UpdateEthnicity,
    NewPresence,
    UpdatePresence,
}

impl ContributionType {
    /// Every accepted contribution type, in declaration order.
    pub const ALL: [ContributionType; 8] = [
        ContributionType::NewRegion,
        ContributionType::UpdateRegion,
        ContributionType::NewCountry,
        ContributionType::UpdateCountry,
        ContributionType::NewEthnicity,
        ContributionType::UpdateEthnicity,
        ContributionType::NewPresence,
        ContributionType::UpdatePresence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContributionType::NewRegion => "new_region",
            ContributionType::UpdateRegion => "update_region",
            ContributionType::NewCountry => "new_country",
            ContributionType::UpdateCountry => "update_country",
            ContributionType::NewEthnicity => "new_ethnicity",
            ContributionType::UpdateEthnicity => "update_ethnicity",
            ContributionType::NewPresence => "new_presence",
            ContributionType::UpdatePresence => "update_presence",
        }
    }

    /// The entity table this type writes to and whether it inserts or updates.
    pub fn target(self) -> (EntityKind, WriteMode) {
        match self {
            ContributionType::NewRegion => (EntityKind::Region, WriteMode::Insert),
            ContributionType::UpdateRegion => (EntityKind::Region, WriteMode::Update),
            ContributionType::NewCountry => (EntityKind::Country, WriteMode::Insert),
            ContributionType::UpdateCountry => (EntityKind::Country, WriteMode::Update),
            ContributionType::NewEthnicity => (EntityKind::EthnicGroup, WriteMode::Insert),
            ContributionType::UpdateEthnicity => (EntityKind::EthnicGroup, WriteMode::Update),
            ContributionType::NewPresence => (EntityKind::Presence, WriteMode::Insert),
            ContributionType::UpdatePresence => (EntityKind::Presence, WriteMode::Update),
        }
    }

    /// Comma-separated list of accepted tags, for error messages.
    pub fn accepted_values() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownContributionType(s.to_string()))
    }
}

/// Moderation status of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContributionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ContributionStatus::Pending => "pending",
            ContributionStatus::Approved => "approved",
            ContributionStatus::Rejected => "rejected",
        }
    }

    /// Whether the status machine allows moving from `self` to `next`.
    ///
    /// `approved -> pending` is only ever taken as the compensating step after
    /// a failed merge. `rejected` is terminal.
    pub fn can_transition_to(self, next: ContributionStatus) -> bool {
        matches!(
            (self, next),
            (ContributionStatus::Pending, ContributionStatus::Approved)
                | (ContributionStatus::Pending, ContributionStatus::Rejected)
                | (ContributionStatus::Approved, ContributionStatus::Pending)
        )
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContributionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContributionStatus::Pending),
            "approved" => Ok(ContributionStatus::Approved),
            "rejected" => Ok(ContributionStatus::Rejected),
            other => Err(CoreError::Validation(format!(
                "Invalid status '{other}'. Must be one of: pending, approved, rejected"
            ))),
        }
    }
}

/// A stored contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    #[serde(rename = "type")]
    pub contribution_type: ContributionType,
    pub proposed_payload: EntityRow,
    pub contributor_email: Option<String>,
    pub contributor_name: Option<String>,
    pub notes: Option<String>,
    pub status: ContributionStatus,
    pub moderator_notes: Option<String>,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A validated submission, ready to be stored as `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContribution {
    pub contribution_type: ContributionType,
    pub proposed_payload: EntityRow,
    pub contributor_email: Option<String>,
    pub contributor_name: Option<String>,
    pub notes: Option<String>,
}
