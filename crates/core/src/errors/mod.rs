//! Error types for the GiftGrid domain core
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping for the boundary layer
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,

    // Resource errors (4xxx)
    NotFound,
    CompanyNotFound,
    ProductNotFound,
    SupplierNotFound,

    // Ledger errors (5xxx)
    InsufficientFunds,

    // Supplier sync errors (6xxx)
    AdapterNotConfigured,
    UnsupportedOperation,
    SyncInProgress,
    NotImplemented,
    UpstreamError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,

            // Resources (4xxx)
            ErrorCode::NotFound => 4001,
            ErrorCode::CompanyNotFound => 4002,
            ErrorCode::ProductNotFound => 4003,
            ErrorCode::SupplierNotFound => 4004,

            // Ledger (5xxx)
            ErrorCode::InsufficientFunds => 5001,

            // Supplier sync (6xxx)
            ErrorCode::AdapterNotConfigured => 6001,
            ErrorCode::UnsupportedOperation => 6002,
            ErrorCode::SyncInProgress => 6003,
            ErrorCode::NotImplemented => 6004,
            ErrorCode::UpstreamError => 6005,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    // Resource errors
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Company not found: {id}")]
    CompanyNotFound { id: String },

    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    #[error("Supplier not found: {id}")]
    SupplierNotFound { id: String },

    // Ledger errors
    #[error("Insufficient funds: balance {balance}, attempted debit {attempted}")]
    InsufficientFunds { balance: i64, attempted: i64 },

    // Supplier sync errors
    #[error("Supplier adapter not configured: {message}")]
    AdapterNotConfigured { message: String },

    #[error("{message}")]
    UnsupportedOperation { message: String },

    #[error("Sync already in progress for supplier {supplier_id}")]
    SyncInProgress { supplier_id: String },

    #[error("Not implemented: {message}")]
    NotImplemented { message: String },

    #[error("Upstream supplier error: {message}")]
    Upstream { message: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::CompanyNotFound { .. } => ErrorCode::CompanyNotFound,
            AppError::ProductNotFound { .. } => ErrorCode::ProductNotFound,
            AppError::SupplierNotFound { .. } => ErrorCode::SupplierNotFound,
            AppError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            AppError::AdapterNotConfigured { .. } => ErrorCode::AdapterNotConfigured,
            AppError::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            AppError::SyncInProgress { .. } => ErrorCode::SyncInProgress,
            AppError::NotImplemented { .. } => ErrorCode::NotImplemented,
            AppError::Upstream { .. } => ErrorCode::UpstreamError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. }
            | AppError::MissingField { .. }
            | AppError::InvalidFormat { .. }
            | AppError::InsufficientFunds { .. }
            | AppError::AdapterNotConfigured { .. }
            | AppError::UnsupportedOperation { .. }
            | AppError::SyncInProgress { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::NotFound { .. }
            | AppError::CompanyNotFound { .. }
            | AppError::ProductNotFound { .. }
            | AppError::SupplierNotFound { .. } => StatusCode::NOT_FOUND,

            // 501 Not Implemented
            AppError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,

            // 502 Bad Gateway
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,

            // 500 Internal Server Error
            AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_)
            | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for the boundary layer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let field = match &self {
            AppError::Validation { field, .. } => field.clone(),
            AppError::MissingField { field } => Some(field.clone()),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: err.to_string(),
            field: None,
        }
    }
}
