//! Data models for the application.
//!
//! These models represent the core entities stored in the relational store
//! and returned from the service operations.

pub mod pull_request;
pub mod stats;
pub mod team;

// Re-exports for convenient access
pub use pull_request::{
    PullRequest, PullRequestStatus, PullRequestSummary, Reassignment, ReviewerSlots,
    SlotPosition,
};
pub use stats::Stats;
pub use team::{Team, TeamMember, User};
