//! Database layer for the relational store.
//!
//! This module handles all database operations including:
//! - Connection pool management with WAL mode
//! - Schema migrations
//! - The transaction scope every core operation runs in
//! - Query helpers for teams, users and pull requests

pub mod pool;
pub mod pull_requests;
pub mod store;
pub mod teams;

pub use store::Store;

use std::path::Path;
use thiserror::Error;

/// Database-related errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Embedded migrations, applied in order.
const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_initial_schema",
    include_str!("migrations/0001_initial_schema.sql"),
)];

/// Initialize the database: create the file if needed and run migrations.
///
/// # Arguments
/// * `db_path` - Path to the SQLite database file
///
/// # Returns
/// A connection pool configured with WAL mode
pub async fn initialize(db_path: &Path) -> Result<pool::DbPool, DbError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            DbError::Migration(format!("Failed to create database directory: {}", e))
        })?;
    }

    let pool = pool::create_pool(db_path).await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run all pending database migrations.
///
/// Each migration is applied together with its `_migrations` record in one
/// transaction, so a failed migration leaves no half-created schema behind.
async fn run_migrations(pool: &pool::DbPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    for (name, migration_sql) in MIGRATIONS {
        let mut tx = pool.begin().await?;

        let applied: Option<(i64,)> = sqlx::query_as("SELECT id FROM _migrations WHERE name = ?")
            .bind(*name)
            .fetch_optional(&mut *tx)
            .await?;

        if applied.is_some() {
            continue;
        }

        for statement in parse_sql_statements(migration_sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::Migration(format!("{}: {}", name, e)))?;
        }

        sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
            .bind(*name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        log::info!("[db] Applied migration {}", name);
    }

    Ok(())
}

/// Parse SQL statements from a migration file.
///
/// This handles:
/// - Comments (lines starting with --)
/// - Semicolons inside parentheses (e.g., `strftime('%s', 'now')`)
/// - Multi-line statements
fn parse_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current_statement = String::new();
    let mut paren_depth: i32 = 0;

    for line in sql.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("--") {
            continue;
        }

        let line_without_comment = match line.find("--") {
            Some(idx) => &line[..idx],
            None => line,
        };

        for ch in line_without_comment.chars() {
            match ch {
                '(' => {
                    paren_depth += 1;
                    current_statement.push(ch);
                }
                ')' => {
                    paren_depth = paren_depth.saturating_sub(1);
                    current_statement.push(ch);
                }
                ';' if paren_depth == 0 => {
                    let stmt = current_statement.trim().to_string();
                    if !stmt.is_empty() {
                        statements.push(stmt);
                    }
                    current_statement.clear();
                }
                _ => {
                    current_statement.push(ch);
                }
            }
        }

        if !current_statement.is_empty() {
            current_statement.push(' ');
        }
    }

    // Trailing statement without a semicolon
    let final_stmt = current_statement.trim().to_string();
    if !final_stmt.is_empty() {
        statements.push(final_stmt);
    }

    statements
}
