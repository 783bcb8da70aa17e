//! Transaction scope for core operations.
//!
//! Every core operation runs inside exactly one [`Store::with_transaction`]
//! call. The closure receives the transaction's connection; all reads that
//! feed a write decision must go through it.

use futures::future::BoxFuture;
use sqlx::SqliteConnection;
use std::time::Duration;

use crate::db::pool::DbPool;
use crate::error::AppError;

/// Default bound on a single operation's transaction scope.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the relational store.
#[derive(Debug, Clone)]
pub struct Store {
    pool: DbPool,
    operation_timeout: Duration,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self::with_timeout(pool, DEFAULT_OPERATION_TIMEOUT)
    }

    pub fn with_timeout(pool: DbPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Run `op` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// Scopes on other connections queue behind the busy timeout instead of
    /// failing. Commits when `op` returns `Ok`. When `op` returns `Err` the
    /// transaction is rolled back and the error is returned unchanged. If the
    /// scope outlives the operation timeout, or the returned future is
    /// dropped, the `sqlx::Transaction` guard rolls back on drop.
    pub async fn with_transaction<T, F>(&self, operation: &str, op: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
    {
        match tokio::time::timeout(self.operation_timeout, self.run_scoped(operation, op)).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!(
                    "[store] {} exceeded {:?}, transaction rolled back",
                    operation,
                    self.operation_timeout
                );
                Err(AppError::timeout(operation))
            }
        }
    }

    async fn run_scoped<T, F>(&self, operation: &str, op: F) -> Result<T, AppError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, Result<T, AppError>> + Send,
    {
        // Take the write lock up front; a deferred transaction that reads
        // first cannot upgrade while another writer holds the lock.
        let mut tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| AppError::database_with_op(e.to_string(), operation))?;

        match op(&mut *tx).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| AppError::database_with_op(e.to_string(), operation))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    log::error!("[store] {} rollback failed: {}", operation, rollback_err);
                }
                log::debug!("[store] {} rolled back: {}", operation, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn count_teams(pool: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM teams")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn insert_team(conn: &mut SqliteConnection, name: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO teams (id, name, created_at) VALUES (?, ?, ?)")
            .bind(uuid::Uuid::new_v4())
            .bind(name)
            .bind(chrono::Utc::now())
            .execute(conn)
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_commits_on_success() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        let store = Store::new(pool.clone());

        let value = store
            .with_transaction("insert", |conn| {
                Box::pin(async move {
                    insert_team(conn, "alpha").await?;
                    Ok(42)
                })
            })
            .await
            .unwrap();

        assert_eq!(value, 42);
        assert_eq!(count_teams(&pool).await, 1);
    }

    #[tokio::test]
    async fn test_rolls_back_and_propagates_error_unchanged() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        let store = Store::new(pool.clone());

        let result: Result<(), AppError> = store
            .with_transaction("insert_then_fail", |conn| {
                Box::pin(async move {
                    insert_team(conn, "alpha").await?;
                    Err(AppError::not_assigned("forced"))
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::NotAssigned { .. })));
        assert_eq!(count_teams(&pool).await, 0, "write must be rolled back");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_read_then_write_scopes_queue() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        let store = Store::new(pool.clone());

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .with_transaction("read_then_insert", move |conn| {
                            Box::pin(async move {
                                let _seen: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teams")
                                    .fetch_one(&mut *conn)
                                    .await?;
                                insert_team(conn, &format!("team-{}", i)).await
                            })
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert_eq!(count_teams(&pool).await, 20);
    }

    #[tokio::test]
    async fn test_timeout_rolls_back() {
        let dir = tempdir().unwrap();
        let pool = crate::db::initialize(&dir.path().join("test.db")).await.unwrap();
        let store = Store::with_timeout(pool.clone(), Duration::from_millis(50));

        let result: Result<(), AppError> = store
            .with_transaction("slow_insert", |conn| {
                Box::pin(async move {
                    insert_team(conn, "alpha").await?;
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Ok(())
                })
            })
            .await;

        assert!(matches!(result, Err(AppError::Timeout { .. })));
        assert_eq!(count_teams(&pool).await, 0, "timed out scope must not commit");
    }
}
