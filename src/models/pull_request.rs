//! Pull request model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Lifecycle state of a pull request. `Open` is initial, `Merged` terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

impl PullRequestStatus {
    /// Value stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        }
    }
}

impl std::str::FromStr for PullRequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPEN" => Ok(Self::Open),
            "MERGED" => Ok(Self::Merged),
            other => Err(AppError::internal(format!(
                "unknown pull request status: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one of the two reviewer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPosition {
    First,
    Second,
}

impl SlotPosition {
    /// Column holding this slot.
    pub fn column(&self) -> &'static str {
        match self {
            Self::First => "reviewer1_id",
            Self::Second => "reviewer2_id",
        }
    }
}

/// The two positional reviewer slots of a pull request.
///
/// Filled slots always hold distinct users at assignment time; reassignment
/// may later produce a duplicate (see `ReassignPolicy`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerSlots {
    pub reviewer1: Option<Uuid>,
    pub reviewer2: Option<Uuid>,
}

impl ReviewerSlots {
    /// Fill slots in order from a sampled list; anything past two is ignored.
    pub fn from_picks(picks: &[Uuid]) -> Self {
        Self {
            reviewer1: picks.first().copied(),
            reviewer2: picks.get(1).copied(),
        }
    }

    /// The slot holding `user`, checking slot 1 before slot 2.
    pub fn position_of(&self, user: Uuid) -> Option<SlotPosition> {
        if self.reviewer1 == Some(user) {
            Some(SlotPosition::First)
        } else if self.reviewer2 == Some(user) {
            Some(SlotPosition::Second)
        } else {
            None
        }
    }

    pub fn contains(&self, user: Uuid) -> bool {
        self.position_of(user).is_some()
    }

    /// Filled slots in positional order.
    pub fn assigned(&self) -> Vec<Uuid> {
        self.reviewer1.into_iter().chain(self.reviewer2).collect()
    }

    pub fn filled(&self) -> usize {
        self.assigned().len()
    }
}

/// A pull request with its reviewer assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequest {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub status: PullRequestStatus,
    pub reviewers: ReviewerSlots,
    /// Fewer than two reviewers were found at creation. Never recomputed.
    pub need_more_reviewers: bool,
    pub created_at: DateTime<Utc>,
    /// Set once, by the first successful merge.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    pub fn is_merged(&self) -> bool {
        self.status == PullRequestStatus::Merged
    }
}

/// Short form used when listing a reviewer's pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestSummary {
    pub id: Uuid,
    pub title: String,
    pub author_id: Uuid,
    pub status: PullRequestStatus,
}

/// Result of swapping a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reassignment {
    pub pull_request: PullRequest,
    pub replaced_by: Uuid,
}
