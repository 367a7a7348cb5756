//! Tickets: requests for a review of a book or article.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    ContentValidationError, DESCRIPTION_MAX, TITLE_MAX, optional_text, required_text,
};
use crate::domain::{User, UserId};

/// Store-assigned ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(i64);

impl TicketId {
    /// Wrap a raw identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Raw identifier value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Validated ticket text fields.
///
/// # Examples
/// ```
/// use litrevu::domain::TicketDraft;
///
/// let draft = TicketDraft::new("  Dune  ", "").unwrap();
/// assert_eq!(draft.title(), "Dune");
/// assert!(TicketDraft::new(" ", "").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    title: String,
    description: String,
}

impl TicketDraft {
    /// Validate a title (required) and description (optional).
    pub fn new(title: &str, description: &str) -> Result<Self, ContentValidationError> {
        Ok(Self {
            title: required_text("title", title, TITLE_MAX)?,
            description: optional_text("description", description, DESCRIPTION_MAX)?,
        })
    }

    /// Ticket title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Ticket description, possibly empty.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Accepted cover image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/gif`
    Gif,
    /// `image/webp`
    Webp,
}

impl ImageFormat {
    /// Resolve a MIME content type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Resolve a stored file extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    /// Canonical MIME content type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// File extension used when storing the blob.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// An uploaded cover image awaiting storage.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Validate the content type and require a non-empty payload.
    pub fn new(content_type: &str, bytes: Vec<u8>) -> Result<Self, ContentValidationError> {
        let format = ImageFormat::from_content_type(content_type).ok_or_else(|| {
            ContentValidationError::UnsupportedImageType {
                content_type: content_type.to_owned(),
            }
        })?;
        if bytes.is_empty() {
            return Err(ContentValidationError::EmptyImage);
        }
        Ok(Self { format, bytes })
    }

    /// Reject payloads above `max` bytes.
    pub fn ensure_within(&self, max: usize) -> Result<(), ContentValidationError> {
        if self.bytes.len() > max {
            return Err(ContentValidationError::ImageTooLarge {
                max,
                actual: self.bytes.len(),
            });
        }
        Ok(())
    }

    /// Image format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Raw image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// What to do with a ticket's image when editing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageEdit {
    /// Leave the current image untouched.
    #[default]
    Keep,
    /// Store a new image and drop the old one.
    Replace(ImageUpload),
    /// Drop the current image.
    Remove,
}

/// Image column change handed to the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredImageChange {
    /// Keep the stored reference.
    Keep,
    /// Point at a newly stored image.
    Set(String),
    /// Clear the reference.
    Clear,
}

/// A persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    /// Identifier.
    pub id: TicketId,
    /// Title, at most 128 characters.
    pub title: String,
    /// Description, at most 2048 characters.
    pub description: String,
    /// Relative media path of the cover image.
    pub image: Option<String>,
    /// Owning user.
    pub author: User,
    /// Creation time; never changes after insert.
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Whether `user_id` owns this ticket.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.author.id() == user_id
    }
}

/// Values for inserting a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    /// Owning user.
    pub owner: UserId,
    /// Validated text fields.
    pub draft: TicketDraft,
    /// Relative media path of an already stored image.
    pub image: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
