//! Error types for the table manager.
//!
//! Maps AWS SDK errors onto [`TableError`].
//! Uses typed `SdkError` variant matching, never string parsing of debug output.

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use thiserror::Error;

use crate::retry::RetryError;

/// Everything that can fail while managing a table.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Table '{table}' not found")]
    NotFound { table: String },

    #[error("Table '{table}' already exists or is being modified")]
    InUse { table: String },

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Credentials(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    Throttled(String),

    #[error("{0}")]
    Connection(String),

    #[error("{0}")]
    Service(String),

    #[error("Table name changed from '{current}' to '{desired}'; renaming a managed table is not supported")]
    NameMismatch { current: String, desired: String },

    #[error("{0} request is missing PhysicalResourceId")]
    MissingPhysicalId(&'static str),

    #[error("Invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error("{0}")]
    WaitExpired(String),
}

impl From<RetryError<TableError>> for TableError {
    fn from(err: RetryError<TableError>) -> Self {
        match err {
            RetryError::Aborted(inner) => inner,
            other => TableError::WaitExpired(other.to_string()),
        }
    }
}

// ========== TYPED ERROR MAPPING ==========

/// Map non-service `SdkError` variants (dispatch failures, timeouts, etc.).
///
/// Returns `Some(TableError)` for non-service errors, `None` for `ServiceError`.
fn map_outer_sdk_error<E, R>(err: &SdkError<E, R>) -> Option<TableError>
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(dispatch) => {
            if dispatch.is_timeout() {
                Some(TableError::Connection(
                    "Connection timed out to DynamoDB. Check your network or endpoint.".to_string(),
                ))
            } else if dispatch.is_io() {
                Some(TableError::Connection(
                    "Connection failed to DynamoDB (I/O error). Check if the endpoint is reachable."
                        .to_string(),
                ))
            } else {
                Some(TableError::Connection(
                    "Connection failed to DynamoDB. Check if the endpoint is reachable.".to_string(),
                ))
            }
        }
        SdkError::TimeoutError(_) => Some(TableError::Connection(
            "Connection timed out to DynamoDB. Check your network or endpoint.".to_string(),
        )),
        SdkError::ConstructionFailure(err) => {
            let msg = format!("{:?}", err);
            if msg.contains("credentials") || msg.contains("Credentials") {
                Some(TableError::Credentials(
                    "No AWS credentials found. Check the function's execution role.".to_string(),
                ))
            } else {
                Some(TableError::Service(format!("Failed to build request: {}", msg)))
            }
        }
        SdkError::ResponseError(err) => Some(TableError::Service(format!(
            "Invalid response from DynamoDB: {:?}",
            err
        ))),
        SdkError::ServiceError(_) => None,
        _ => Some(TableError::Service(format!(
            "Unknown error from DynamoDB: {:?}",
            err
        ))),
    }
}

/// Map credential, permission and throttling codes.
///
/// Returns `None` if the code needs table-specific handling.
fn map_common_service_code(code: Option<&str>, message: Option<&str>) -> Option<TableError> {
    let code = code?;

    match code {
        "UnrecognizedClientException" => Some(TableError::Credentials(
            "Invalid AWS credentials. Check your access key and secret.".to_string(),
        )),
        "ExpiredTokenException" | "ExpiredToken" => Some(TableError::Credentials(
            "AWS credentials have expired. Refresh your session token.".to_string(),
        )),
        "AccessDeniedException" | "AccessDenied" => {
            let msg = message.unwrap_or("Check your IAM permissions.");
            Some(TableError::AccessDenied(format!(
                "Access denied to DynamoDB: {}",
                msg
            )))
        }
        "ProvisionedThroughputExceededException"
        | "LimitExceededException"
        | "RequestLimitExceeded"
        | "ThrottlingException" => Some(TableError::Throttled(format!(
            "DynamoDB rejected the request ({}): {}",
            code,
            message.unwrap_or("request rate too high")
        ))),
        _ => None,
    }
}

/// Map a DynamoDB service error code + message to a [`TableError`].
fn map_dynamodb_code(
    code: Option<&str>,
    message: Option<&str>,
    display: &str,
    table: Option<&str>,
) -> TableError {
    if let Some(err) = map_common_service_code(code, message) {
        return err;
    }

    let table = table.unwrap_or("<unknown>").to_string();
    match code {
        Some("ResourceNotFoundException") | Some("TableNotFoundException") => {
            TableError::NotFound { table }
        }
        Some("ResourceInUseException") | Some("TableAlreadyExistsException") => {
            TableError::InUse { table }
        }
        Some("ValidationException") => {
            TableError::Validation(message.unwrap_or(display).to_string())
        }
        _ => TableError::Service(message.unwrap_or(display).to_string()),
    }
}

/// Map DynamoDB SDK errors using typed `SdkError` variants.
///
/// For `ServiceError`, uses `ProvideErrorMetadata` to get the error code and message
/// instead of parsing debug strings.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>, table: Option<&str>) -> TableError
where
    E: ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    if let Some(mapped) = map_outer_sdk_error(&err) {
        return mapped;
    }

    if let Some(service_err) = err.as_service_error() {
        let meta = ProvideErrorMetadata::meta(service_err);
        return map_dynamodb_code(meta.code(), meta.message(), &service_err.to_string(), table);
    }

    TableError::Service(format!("Unexpected DynamoDB error: {:?}", err))
}
