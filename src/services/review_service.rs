//! Entry point for the eight core operations.
//!
//! Each method opens exactly one transaction scope through [`Store`] and
//! delegates to the matching service function with the scoped connection.

use std::sync::Arc;
use uuid::Uuid;

use crate::db::Store;
use crate::error::AppError;
use crate::models::{PullRequest, PullRequestSummary, Reassignment, Stats, Team, User};
use crate::services::assignment::{ReviewerSampler, ThreadRngSampler};
use crate::services::reassignment::ReassignPolicy;
use crate::services::{directory, lifecycle, reassignment, stats};

#[derive(Clone)]
pub struct ReviewService {
    store: Store,
    sampler: Arc<dyn ReviewerSampler>,
    policy: ReassignPolicy,
}

impl std::fmt::Debug for ReviewService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewService")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ReviewService {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            sampler: Arc::new(ThreadRngSampler),
            policy: ReassignPolicy::default(),
        }
    }

    pub fn with_sampler(mut self, sampler: Arc<dyn ReviewerSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_policy(mut self, policy: ReassignPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn create_pull_request(
        &self,
        id: Uuid,
        author_id: Uuid,
        title: String,
    ) -> Result<PullRequest, AppError> {
        let sampler = Arc::clone(&self.sampler);
        self.store
            .with_transaction("create_pull_request", move |conn| {
                Box::pin(async move {
                    lifecycle::create_pull_request(conn, sampler.as_ref(), id, author_id, &title)
                        .await
                })
            })
            .await
    }

    pub async fn merge_pull_request(&self, id: Uuid) -> Result<PullRequest, AppError> {
        self.store
            .with_transaction("merge_pull_request", move |conn| {
                Box::pin(async move { lifecycle::merge_pull_request(conn, id).await })
            })
            .await
    }

    pub async fn reassign_reviewer(
        &self,
        pr_id: Uuid,
        old_user_id: Uuid,
    ) -> Result<Reassignment, AppError> {
        let sampler = Arc::clone(&self.sampler);
        let policy = self.policy;
        self.store
            .with_transaction("reassign_reviewer", move |conn| {
                Box::pin(async move {
                    reassignment::reassign_reviewer(
                        conn,
                        sampler.as_ref(),
                        policy,
                        pr_id,
                        old_user_id,
                    )
                    .await
                })
            })
            .await
    }

    pub async fn get_reviews_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PullRequestSummary>, AppError> {
        self.store
            .with_transaction("get_reviews_for_user", move |conn| {
                Box::pin(async move { stats::get_reviews_for_user(conn, user_id).await })
            })
            .await
    }

    pub async fn get_stats(&self) -> Result<Stats, AppError> {
        self.store
            .with_transaction("get_stats", |conn| {
                Box::pin(async move { stats::get_stats(conn).await })
            })
            .await
    }

    pub async fn upsert_team(&self, team: Team) -> Result<(), AppError> {
        self.store
            .with_transaction("upsert_team", move |conn| {
                Box::pin(async move { directory::upsert_team(conn, &team).await })
            })
            .await
    }

    pub async fn get_team(&self, name: String) -> Result<Team, AppError> {
        self.store
            .with_transaction("get_team", move |conn| {
                Box::pin(async move { directory::get_team(conn, &name).await })
            })
            .await
    }

    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<User, AppError> {
        self.store
            .with_transaction("set_user_active", move |conn| {
                Box::pin(async move { directory::set_user_active(conn, user_id, is_active).await })
            })
            .await
    }
}
