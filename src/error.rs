//! Application error types.
//!
//! Every core operation returns either one of the domain kinds below or a
//! store-level failure. The transport layer uses [`AppError::is_domain`] and
//! [`AppError::code`] to choose response codes.

use serde::Serialize;
use thiserror::Error;

/// Which uniqueness rule or state transition a [`AppError::Conflict`] violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    /// A team with the same name already exists.
    TeamExists,
    /// A pull request with the same id already exists.
    #[serde(rename = "PR_EXISTS")]
    PullRequestExists,
    /// The pull request is already merged.
    #[serde(rename = "PR_MERGED")]
    PullRequestMerged,
}

impl ConflictKind {
    /// Wire code for this conflict.
    pub fn code(&self) -> &'static str {
        match self {
            Self::TeamExists => "TEAM_EXISTS",
            Self::PullRequestExists => "PR_EXISTS",
            Self::PullRequestMerged => "PR_MERGED",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Referenced team, user or pull request does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Duplicate name/id or an invalid state transition.
    #[error("Conflict ({kind}): {message}")]
    Conflict { kind: ConflictKind, message: String },

    /// Caller-level shape violation, raised by the transport layer.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        /// Wire code, e.g. `INVALID_TEAM`.
        code: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// No eligible replacement reviewer exists.
    #[error("No candidate: {message}")]
    NoCandidate { message: String },

    /// The reviewer to replace is not assigned to the pull request.
    #[error("Not assigned: {message}")]
    NotAssigned { message: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// The transaction scope exceeded the operation timeout and was rolled back.
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: None,
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    /// Create a conflict error.
    pub fn conflict(kind: ConflictKind, message: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid input error with its wire code.
    pub fn invalid_input(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            code,
            field: None,
        }
    }

    /// Create an invalid input error naming the offending field.
    pub fn invalid_input_field(
        code: &'static str,
        message: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            message: message.into(),
            code,
            field: Some(field.into()),
        }
    }

    /// Create a no-candidate error.
    pub fn no_candidate(message: impl Into<String>) -> Self {
        Self::NoCandidate {
            message: message.into(),
        }
    }

    /// Create a not-assigned error.
    pub fn not_assigned(message: impl Into<String>) -> Self {
        Self::NotAssigned {
            message: message.into(),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create a timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is a domain rule failure rather than a store or
    /// runtime failure.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::Conflict { .. }
                | Self::InvalidInput { .. }
                | Self::NoCandidate { .. }
                | Self::NotAssigned { .. }
        )
    }

    /// Wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Conflict { kind, .. } => kind.code(),
            Self::InvalidInput { code, .. } => *code,
            Self::NoCandidate { .. } => "NO_CANDIDATE",
            Self::NotAssigned { .. } => "NOT_ASSIGNED",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Database { .. } | Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

/// Returns true when `err` is a unique or primary-key constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        Self::database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = AppError::database("connection failed");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"type\":\"Database\""));
        assert!(json.contains("connection failed"));
    }

    #[test]
    fn test_conflict_serializes_wire_code() {
        let err = AppError::conflict(ConflictKind::PullRequestMerged, "cannot reassign");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"kind\":\"PR_MERGED\""));
        assert_eq!(err.code(), "PR_MERGED");
    }

    #[test]
    fn test_not_found_with_id() {
        let err = AppError::not_found_with_id("PullRequest", "123");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"resource\":\"PullRequest\""));
        assert!(json.contains("\"id\":\"123\""));
    }

    #[test]
    fn test_optional_fields_not_serialized() {
        let err = AppError::database("error");
        let json = serde_json::to_string(&err).unwrap();
        // operation is None, so should not appear
        assert!(!json.contains("operation"));
    }

    #[test]
    fn test_domain_classification() {
        assert!(AppError::not_found("User").is_domain());
        assert!(AppError::no_candidate("none").is_domain());
        assert!(AppError::not_assigned("nope").is_domain());
        assert!(AppError::invalid_input("INVALID_USER", "bad").is_domain());
        assert!(!AppError::database("disk full").is_domain());
        assert!(!AppError::timeout("merge_pull_request").is_domain());
        assert!(!AppError::internal("boom").is_domain());
    }

    #[test]
    fn test_display_impl() {
        let err = AppError::conflict(ConflictKind::TeamExists, "team_name already exists");
        assert_eq!(
            format!("{}", err),
            "Conflict (TEAM_EXISTS): team_name already exists"
        );
    }
}
