//! Core data types for the memory timeline.
//!
//! A **memory** is one remembered event; **media items** are the images and
//! videos attached to it. Media rows point at blobs in the object store by
//! path, never by public URL.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned memory identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryId(pub i64);

impl std::fmt::Display for MemoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned media identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub i64);

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an authenticated user, as issued by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A remembered event on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Store-assigned ID
    pub id: MemoryId,
    /// Short title, never empty
    pub title: String,
    /// Free-form description
    pub description: String,
    /// When the memory happened (not when it was recorded)
    pub date: NaiveDate,
    /// Where it happened
    pub location: Option<String>,
    /// Placeholder visual shown when no media is attached
    pub emoji: Option<String>,
    /// When the row was inserted
    pub created_at: DateTime<Utc>,
    /// Owner; set at creation and never edited
    pub user_id: UserId,
}

impl Memory {
    /// Human-readable date, e.g. `"January 1, 2024"`.
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }
}

/// Whether a media blob is a still image or a video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// `image/*` upload
    Image,
    /// Anything that is not `image/*`
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl MediaKind {
    /// Classify an upload by its MIME type prefix.
    pub fn from_mime(content_type: &str) -> Self {
        if content_type.trim().to_ascii_lowercase().starts_with("image/") {
            Self::Image
        } else {
            Self::Video
        }
    }

    /// Parse from the stored column value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            _ => Self::Video,
        }
    }
}

/// One image or video attached to a memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Store-assigned ID
    pub id: MediaId,
    /// Parent memory
    pub memory_id: MemoryId,
    /// Object store path (`{memory_id}/{file}`)
    pub url: String,
    /// Image or video
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Display position within the memory
    pub order_index: Option<i64>,
    /// When the row was inserted
    pub created_at: DateTime<Utc>,
    /// Owner of the parent memory
    pub user_id: UserId,
}

/// Insert payload for a memory row. Fields are already validated.
#[derive(Debug, Clone)]
pub struct NewMemory {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub emoji: Option<String>,
    pub user_id: UserId,
}

/// Insert payload for a media row.
#[derive(Debug, Clone)]
pub struct NewMediaItem {
    pub memory_id: MemoryId,
    pub url: String,
    pub kind: MediaKind,
    pub order_index: Option<i64>,
    pub user_id: UserId,
}

/// Partial update of a memory. `None` leaves a field unchanged.
///
/// `location` and `emoji` are nullable columns, so `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub location: Option<Option<String>>,
    pub emoji: Option<Option<String>>,
}

impl MemoryPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.emoji.is_none()
    }
}

/// A memory together with its ordered media.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryWithMedia {
    #[serde(flatten)]
    pub memory: Memory,
    pub media: Vec<MediaItem>,
}

/// Row filter for timeline reads.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    /// Only memories (and media) owned by this user
    pub user_id: Option<UserId>,
}

impl MemoryFilter {
    /// Restrict to one owner.
    pub fn owned_by(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }
}

/// Sort key for timeline reads. Both orders are newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOrder {
    /// By the date the memory happened
    #[default]
    Date,
    /// By insertion time
    CreatedAt,
}
