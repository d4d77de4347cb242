//! Error types for dynohelp.
//!
//! This module maps AWS SDK errors to [`Error`].
//! Uses a single mapping function to avoid code duplication.

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result alias used by every operation in the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by dynohelp operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("The condition expression evaluated to false")]
    ConditionCheckFailed,

    #[error("throttled: {0}")]
    Throttling(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any service error without a dedicated variant. Code and message are
    /// passed through from DynamoDB unchanged.
    #[error("{code}: {message}")]
    Service { code: String, message: String },

    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Error code as reported by DynamoDB, when the error came from the service.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::TableNotFound { .. } => Some("ResourceNotFoundException"),
            Error::ConditionCheckFailed => Some("ConditionalCheckFailedException"),
            Error::Service { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Map any AWS SDK error to the appropriate [`Error`].
///
/// This is the single entry point for error handling. All operations
/// should use this function to convert SDK errors.
pub fn map_sdk_error<E, R>(err: SdkError<E, R>, table: Option<&str>) -> Error
where
    E: ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err.message().map(str::to_string);

    match code {
        Some(code) => from_service_code(&code, message, table),
        // Dispatch and construction failures carry no service code.
        None => from_dispatch_failure(&format!("{:?}", err), err.to_string()),
    }
}

/// Map a DynamoDB error code and message to an [`Error`].
///
/// Also used for per-statement failures of a batch statement execution,
/// which report a code and message without an `SdkError` wrapper. Those
/// codes drop the `Exception` suffix (`ConditionalCheckFailed`,
/// `ValidationError`, ...) and map to the same variants.
pub fn from_service_code(code: &str, message: Option<String>, table: Option<&str>) -> Error {
    match code {
        "ResourceNotFoundException" | "ResourceNotFound" => match table {
            Some(t) => Error::TableNotFound {
                table: t.to_string(),
            },
            None => Error::Service {
                code: code.to_string(),
                message: message.unwrap_or_else(|| "Resource not found".to_string()),
            },
        },
        "ValidationException" | "ValidationError" => {
            Error::Validation(message.unwrap_or_else(|| "invalid request".to_string()))
        }
        "ConditionalCheckFailedException" | "ConditionalCheckFailed" => {
            Error::ConditionCheckFailed
        }
        "ProvisionedThroughputExceededException"
        | "ProvisionedThroughputExceeded"
        | "ThrottlingException"
        | "ThrottlingError" => Error::Throttling(
            message.unwrap_or_else(|| "Request rate too high".to_string()),
        ),
        "RequestLimitExceeded" => Error::Throttling(
            message.unwrap_or_else(|| "Request limit exceeded".to_string()),
        ),
        "AccessDeniedException" | "AccessDenied" => Error::AccessDenied(
            message.unwrap_or_else(|| "Access denied. Check your IAM permissions.".to_string()),
        ),
        "UnrecognizedClientException" | "InvalidSignatureException" => Error::Credentials(
            message.unwrap_or_else(|| "Invalid AWS credentials".to_string()),
        ),
        "ExpiredTokenException" => Error::Credentials(
            "AWS credentials have expired. Refresh your session token.".to_string(),
        ),
        _ => Error::Service {
            code: code.to_string(),
            message: message.unwrap_or_default(),
        },
    }
}

fn from_dispatch_failure(err_debug: &str, err_display: String) -> Error {
    if err_debug.contains("NoCredentialsError")
        || err_debug.contains("no credentials")
        || err_debug.contains("No credentials")
        || err_debug.contains("CredentialsError")
        || err_debug.contains("failed to load credentials")
    {
        return Error::Credentials(
            "No AWS credentials found. Configure credentials via environment variables \
            (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY), AWS profile, or IAM role."
                .to_string(),
        );
    }

    // The display of a dispatch failure is often just "dispatch failure".
    let detail = if err_display.len() < 32 {
        let clean = err_debug.replace('\n', " ").replace("  ", " ");
        if clean.len() > 500 {
            format!("{}...", truncate_on_char_boundary(&clean, 500))
        } else {
            clean
        }
    } else {
        err_display
    };

    Error::Service {
        code: "DispatchFailure".to_string(),
        message: detail,
    }
}

fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    let mut end = max.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
