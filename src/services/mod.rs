//! Business logic on top of the store.
//!
//! Functions in the submodules take a `&mut SqliteConnection` that belongs to
//! an open transaction; [`ReviewService`] owns the transaction scopes.

pub mod assignment;
pub mod directory;
pub mod lifecycle;
pub mod reassignment;
pub mod review_service;
pub mod stats;

pub use assignment::{ReviewerSampler, SeededSampler, ThreadRngSampler};
pub use reassignment::ReassignPolicy;
pub use review_service::ReviewService;
