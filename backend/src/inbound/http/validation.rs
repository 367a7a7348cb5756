//! Shared validation helpers for inbound HTTP adapters.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, ImageUpload, LoginValidationError, SignupValidationError, UserId, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidBase64,
    ConflictingImageEdit,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidBase64 => "invalid_base64",
            ErrorCode::ConflictingImageEdit => "conflicting_image_edit",
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

fn field_error(field: &str, message: impl Into<String>, code: &str) -> Error {
    Error::invalid_request(message).with_field(field, code)
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse a user id taken from the request path.
pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn conflicting_image_edit_error() -> Error {
    field_error(
        "image",
        "image and removeImage cannot be combined",
        ErrorCode::ConflictingImageEdit.as_str(),
    )
}

pub(crate) fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => {
            field_error("username", err.to_string(), "empty_username")
        }
        LoginValidationError::EmptyPassword => {
            field_error("password", err.to_string(), "empty_password")
        }
    }
}

pub(crate) fn map_user_validation_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => "invalid_user_id",
        UserValidationError::EmptyUsername => "empty_username",
        UserValidationError::UsernameTooLong { .. } => "username_too_long",
        UserValidationError::UsernameInvalidCharacters => "username_invalid_characters",
    };
    let field = match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => "userId",
        _ => "username",
    };
    field_error(field, err.to_string(), code)
}

pub(crate) fn map_signup_validation_error(err: SignupValidationError) -> Error {
    match err {
        SignupValidationError::Username(inner) => map_user_validation_error(inner),
        SignupValidationError::EmptyPassword => {
            field_error("password", err.to_string(), "empty_password")
        }
        SignupValidationError::PasswordMismatch => {
            field_error("passwordConfirmation", err.to_string(), "password_mismatch")
        }
    }
}

/// Inline cover image upload.
///
/// Example JSON:
/// `{"contentType":"image/png","data":"iVBORw0KGgo="}`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// MIME type of the image.
    #[schema(example = "image/png")]
    pub content_type: String,
    /// Standard base64 encoding of the image bytes.
    pub data: String,
}

impl TryFrom<ImagePayload> for ImageUpload {
    type Error = Error;

    fn try_from(value: ImagePayload) -> Result<Self, Self::Error> {
        let bytes = STANDARD.decode(value.data.trim()).map_err(|_| {
            field_error(
                "image",
                "image data must be base64 encoded",
                ErrorCode::InvalidBase64.as_str(),
            )
        })?;
        Ok(ImageUpload::new(&value.content_type, bytes)?)
    }
}

/// Decode an optional image payload.
pub(crate) fn parse_image(payload: Option<ImagePayload>) -> Result<Option<ImageUpload>, Error> {
    payload.map(ImageUpload::try_from).transpose()
}
