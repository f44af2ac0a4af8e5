//! The one error type services return.
//!
//! An [`Error`] is a category code, a client-facing message and optional
//! structured details. Services never choose HTTP statuses; the inbound
//! adapter maps [`ErrorCode`] to a status and serialises the error as the
//! response body.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TraceId;

/// Failure category, serialised in snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The operation is not allowed in the resource's current status.
    InvalidState,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// The request conflicts with the current state of the resource.
    Conflict,
    /// A backing store is temporarily unreachable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Failure returned by every driving port.
///
/// `message` is never blank and `trace_id`, when set, is never blank.
///
/// # Examples
/// ```
/// use campus::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("club not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
    details: Option<Value>,
}

/// Rejected inputs to [`Error::try_new`] and [`Error::try_with_trace_id`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
    #[error("trace identifier must not be empty")]
    EmptyTraceId,
}

/// One infallible constructor per [`ErrorCode`].
///
/// Messages are literals or formatted domain text, never blank, so these
/// panic on an empty message rather than returning a `Result`.
macro_rules! shorthand {
    ($($(#[$meta:meta])* $name:ident => $code:ident;)+) => {
        $(
            $(#[$meta])*
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorCode::$code, message)
            }
        )+
    };
}

impl Error {
    /// Build an error, capturing the trace identifier in scope.
    ///
    /// # Panics
    ///
    /// When `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message)
            .unwrap_or_else(|err| panic!("invalid {code:?} error: {err}"))
    }

    /// Build an error, rejecting a blank message.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: None,
        })
    }

    shorthand! {
        /// Malformed input; details usually name the `field`.
        invalid_request => InvalidRequest;
        /// A rule of the club or election lifecycle forbids the action.
        invalid_state => InvalidState;
        unauthorized => Unauthorized;
        forbidden => Forbidden;
        not_found => NotFound;
        /// Duplicate names, repeat votes or a lost revision race.
        conflict => Conflict;
        service_unavailable => ServiceUnavailable;
        /// Redacted before it reaches a client.
        internal => InternalError;
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Replace the captured trace identifier.
    ///
    /// # Panics
    ///
    /// When `id` is blank.
    pub fn with_trace_id(self, id: impl Into<String>) -> Self {
        self.try_with_trace_id(id)
            .unwrap_or_else(|err| panic!("invalid trace identifier: {err}"))
    }

    pub fn try_with_trace_id(
        mut self,
        id: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        self.trace_id = Some(id);
        Ok(self)
    }

    /// Attach machine-readable context.
    ///
    /// # Examples
    /// ```
    /// use campus::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::conflict("You have already voted in this election")
    ///     .with_details(json!({ "code": "already_voted" }));
    /// assert_eq!(err.details().and_then(|d| d["code"].as_str()), Some("already_voted"));
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "trace_id")]
    trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(error: Error) -> Self {
        let Error {
            code,
            message,
            trace_id,
            details,
        } = error;
        Self {
            code,
            message,
            trace_id,
            details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    /// Deserialised errors keep exactly the trace id they carried.
    fn try_from(dto: ErrorDto) -> Result<Self, Self::Error> {
        if dto.message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        if dto.trace_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ErrorValidationError::EmptyTraceId);
        }
        Ok(Self {
            code: dto.code,
            message: dto.message,
            trace_id: dto.trace_id,
            details: dto.details,
        })
    }
}

#[cfg(test)]
mod tests;
