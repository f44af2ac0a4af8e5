//! Shared validation helpers for inbound HTTP adapters.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::{
    ClubValidationError, Error, InvalidId, RegistrationValidationError, UnknownVariant,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidTimestamp,
    InvalidValue,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be a valid UUID"))
        .with_value(ErrorCode::InvalidUuid, value)
}

/// Parse a typed identifier, reporting the offending field on failure.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = InvalidId>,
{
    value
        .parse()
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Unwrap a required field or report it missing.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn invalid_value_error(field: FieldName, err: &UnknownVariant) -> Error {
    ValidationError::new(field.as_str(), err.to_string())
        .with_value(ErrorCode::InvalidValue, err.value.clone())
}

/// Parse a snake_case wire value such as a status or category.
pub(crate) fn parse_wire_value<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .parse()
        .map_err(|err| invalid_value_error(field, &err))
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, &value))
}

/// Report a field-level domain validation failure.
pub(crate) fn invalid_field_error(field: &str, message: impl Into<String>) -> Error {
    ValidationError::new(field, message).with_code(ErrorCode::InvalidField)
}

/// Map club and applicant validation failures onto request fields.
pub(crate) fn map_club_validation_error(err: ClubValidationError) -> Error {
    let field = match &err {
        ClubValidationError::NameLength { .. } => "name",
        ClubValidationError::DescriptionTooLong { .. } => "description",
        ClubValidationError::BlankField { field } => *field,
        ClubValidationError::Unknown(unknown) => {
            return Error::invalid_request(unknown.to_string()).with_details(json!({
                "value": unknown.value,
                "code": ErrorCode::InvalidValue.as_str(),
            }));
        }
    };
    invalid_field_error(field, err.to_string())
}

/// Map registration failures onto request fields.
pub(crate) fn map_registration_error(err: RegistrationValidationError) -> Error {
    invalid_field_error(err.field(), err.to_string())
}
