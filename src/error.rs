use serde::Serialize;
use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection failed to {database}: {cause}")]
    ConnectionFailed { database: String, cause: String },

    #[error("Duplicate value in {table} violates unique constraint {constraint}")]
    UniqueViolation { table: String, constraint: String },

    #[error("Record not found: table={table}, id={id}")]
    NotFound { table: String, id: i32 },

    #[error("Invalid value for {table}.{field}: {message}")]
    InvalidField {
        table: String,
        field: String,
        message: String,
    },

    #[error("Unknown column {column} on {table}")]
    UnknownColumn { table: String, column: String },

    #[error("Query failed on {table}: {cause}")]
    QueryFailed { table: String, cause: String },

    #[error("Failed to decode {table}.{column}: {cause}")]
    Decode {
        table: String,
        column: String,
        cause: String,
    },

    #[error("Schema deployment failed for {table}: {cause}")]
    SchemaDeployFailed { table: String, cause: String },

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Classify a driver error raised while running a statement against `table`.
    pub fn from_query(table: &str, err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            let constraint = err
                .as_db_error()
                .and_then(|db| db.constraint())
                .unwrap_or("unknown")
                .to_string();
            let table = err
                .as_db_error()
                .and_then(|db| db.table())
                .unwrap_or(table)
                .to_string();
            return StoreError::UniqueViolation { table, constraint };
        }

        StoreError::QueryFailed {
            table: table.to_string(),
            cause: err.to_string(),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::ConnectionFailed { .. } => "connection_failed",
            StoreError::UniqueViolation { .. } => "unique_violation",
            StoreError::NotFound { .. } => "not_found",
            StoreError::InvalidField { .. } => "invalid_field",
            StoreError::UnknownColumn { .. } => "unknown_column",
            StoreError::QueryFailed { .. } => "query_failed",
            StoreError::Decode { .. } => "decode_failed",
            StoreError::SchemaDeployFailed { .. } => "schema_deploy_failed",
            StoreError::PasswordHash(_) => "password_hash_failed",
            StoreError::Internal(_) => "internal_error",
        }
    }
}

/// Serializable shape of a [`StoreError`] for callers that render errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl From<&StoreError> for ErrorResponse {
    fn from(err: &StoreError) -> Self {
        let (table, field) = match err {
            StoreError::UniqueViolation { table, constraint } => {
                (Some(table.clone()), Some(constraint.clone()))
            }
            StoreError::NotFound { table, .. }
            | StoreError::QueryFailed { table, .. }
            | StoreError::SchemaDeployFailed { table, .. } => (Some(table.clone()), None),
            StoreError::InvalidField { table, field, .. }
            | StoreError::UnknownColumn {
                table,
                column: field,
            }
            | StoreError::Decode {
                table,
                column: field,
                ..
            } => (Some(table.clone()), Some(field.clone())),
            StoreError::ConnectionFailed { .. }
            | StoreError::PasswordHash(_)
            | StoreError::Internal(_) => (None, None),
        };

        ErrorResponse {
            error: err.code().to_string(),
            message: err.to_string(),
            table,
            field,
        }
    }
}

impl From<deadpool_postgres::PoolError> for StoreError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        StoreError::ConnectionFailed {
            database: "pool".to_string(),
            cause: err.to_string(),
        }
    }
}

impl From<bcrypt::BcryptError> for StoreError {
    fn from(err: bcrypt::BcryptError) -> Self {
        StoreError::PasswordHash(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let err = StoreError::UniqueViolation {
            table: "users".to_string(),
            constraint: "users_username_key".to_string(),
        };
        assert_eq!(err.code(), "unique_violation");
        assert!(err.is_unique_violation());

        let err = StoreError::NotFound {
            table: "labels".to_string(),
            id: 7,
        };
        assert_eq!(err.code(), "not_found");
        assert!(!err.is_unique_violation());
        assert_eq!(err.to_string(), "Record not found: table=labels, id=7");
    }

    #[test]
    fn test_error_response_carries_table_and_field() {
        let err = StoreError::InvalidField {
            table: "users".to_string(),
            field: "email".to_string(),
            message: "too long".to_string(),
        };

        let response = ErrorResponse::from(&err);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["error"], "invalid_field");
        assert_eq!(json["table"], "users");
        assert_eq!(json["field"], "email");
    }

    #[test]
    fn test_error_response_omits_missing_context() {
        let err = StoreError::PasswordHash("invalid hash".to_string());
        let json = serde_json::to_value(ErrorResponse::from(&err)).unwrap();

        assert_eq!(json["error"], "password_hash_failed");
        assert!(json.get("table").is_none());
        assert!(json.get("field").is_none());
    }
}
