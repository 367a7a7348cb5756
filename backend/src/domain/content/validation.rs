//! Field-level validation for tickets and reviews.
//!
//! Every mutation builds its draft through these functions first, so length
//! limits and the rating range are enforced before any store is touched.

use std::fmt;

use crate::domain::Error;

/// Maximum ticket title length in characters.
pub const TITLE_MAX: usize = 128;
/// Maximum ticket description length in characters.
pub const DESCRIPTION_MAX: usize = 2048;
/// Maximum review headline length in characters.
pub const HEADLINE_MAX: usize = 128;
/// Maximum review body length in characters.
pub const BODY_MAX: usize = 8192;
/// Lowest accepted rating.
pub const RATING_MIN: i64 = 0;
/// Highest accepted rating.
pub const RATING_MAX: i64 = 5;

/// Validation failures for ticket and review fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentValidationError {
    /// A required field was blank once trimmed.
    Required {
        /// Offending field.
        field: &'static str,
    },
    /// A field exceeded its character limit.
    TooLong {
        /// Offending field.
        field: &'static str,
        /// Permitted maximum.
        max: usize,
        /// Observed length.
        actual: usize,
    },
    /// The rating fell outside `0..=5`.
    RatingOutOfRange {
        /// Rejected value.
        value: i64,
    },
    /// The image content type is not one of the accepted formats.
    UnsupportedImageType {
        /// Rejected content type.
        content_type: String,
    },
    /// The uploaded image had no bytes.
    EmptyImage,
    /// The uploaded image exceeded the configured size limit.
    ImageTooLarge {
        /// Permitted maximum in bytes.
        max: usize,
        /// Observed size in bytes.
        actual: usize,
    },
}

impl ContentValidationError {
    /// Name of the field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field } | Self::TooLong { field, .. } => field,
            Self::RatingOutOfRange { .. } => "rating",
            Self::UnsupportedImageType { .. } | Self::EmptyImage | Self::ImageTooLarge { .. } => {
                "image"
            }
        }
    }

    /// Stable machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Required { .. } => "required",
            Self::TooLong { .. } => "too_long",
            Self::RatingOutOfRange { .. } => "out_of_range",
            Self::UnsupportedImageType { .. } => "unsupported_type",
            Self::EmptyImage => "empty",
            Self::ImageTooLarge { .. } => "too_large",
        }
    }
}

impl fmt::Display for ContentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{field} is required"),
            Self::TooLong { field, max, actual } => {
                write!(f, "{field} must be at most {max} characters (got {actual})")
            }
            Self::RatingOutOfRange { value } => write!(
                f,
                "rating must be between {RATING_MIN} and {RATING_MAX} (got {value})"
            ),
            Self::UnsupportedImageType { content_type } => {
                write!(f, "unsupported image type: {content_type}")
            }
            Self::EmptyImage => write!(f, "image must not be empty"),
            Self::ImageTooLarge { max, actual } => {
                write!(f, "image must be at most {max} bytes (got {actual})")
            }
        }
    }
}

impl std::error::Error for ContentValidationError {}

impl From<ContentValidationError> for Error {
    fn from(err: ContentValidationError) -> Self {
        Error::invalid_request(err.to_string()).with_field(err.field(), err.reason())
    }
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<String, ContentValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ContentValidationError::TooLong { field, max, actual });
    }
    Ok(value.to_owned())
}

/// Trim `raw` and require a non-empty value of at most `max` characters.
pub fn required_text(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ContentValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ContentValidationError::Required { field });
    }
    bounded(field, trimmed, max)
}

/// Trim `raw` and require at most `max` characters; blank is allowed.
pub fn optional_text(
    field: &'static str,
    raw: &str,
    max: usize,
) -> Result<String, ContentValidationError> {
    bounded(field, raw.trim(), max)
}

/// Check a rating lies within `RATING_MIN..=RATING_MAX`.
pub fn rating(value: i64) -> Result<u8, ContentValidationError> {
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(ContentValidationError::RatingOutOfRange { value });
    }
    u8::try_from(value).map_err(|_| ContentValidationError::RatingOutOfRange { value })
}
