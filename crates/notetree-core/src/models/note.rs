//! Note model and note request bodies

use std::cmp::Ordering;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::nullable;
use super::user::UserId;

/// Server-assigned note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Lifecycle status of a note.
///
/// Encoded as `1` (normal) and `0` (trashed); `2` is accepted as trashed too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum NoteStatus {
    #[default]
    Normal,
    Trashed,
}

impl NoteStatus {
    pub const fn code(self) -> i64 {
        match self {
            Self::Normal => 1,
            Self::Trashed => 0,
        }
    }
}

impl From<NoteStatus> for i64 {
    fn from(status: NoteStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i64> for NoteStatus {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Normal),
            0 | 2 => Ok(Self::Trashed),
            other => Err(format!("unknown note status {other}")),
        }
    }
}

/// A note as returned by the note service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// `None` for top-level notes
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub parent_id: Option<NoteId>,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "nullable::deserialize")]
    pub icon: Option<String>,
    /// 1 when favorited, 0 otherwise
    #[serde(default)]
    pub is_favorite: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Note {
    pub const fn is_favorited(&self) -> bool {
        self.is_favorite == 1
    }

    pub fn is_trashed(&self) -> bool {
        self.status == NoteStatus::Trashed
    }

    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Sibling ordering used for display: `position`, then `id`.
    pub fn sibling_order(a: &Self, b: &Self) -> Ordering {
        a.position.cmp(&b.position).then(a.id.cmp(&b.id))
    }
}

/// Body of `POST /v1/notes`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NoteId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl CreateNote {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Body of `PUT /v1/notes/:id`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NoteId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NoteStatus>,
}

impl UpdateNote {
    /// Title + content snapshot, as written by the content sync.
    pub fn content_snapshot(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Body of `PUT /v1/notes/:id/position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdatePosition {
    pub position: i64,
}

/// Response of `PUT /v1/notes/:id`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NoteUpdated {
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

/// Parent filter for note listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Only top-level notes (`parent_id=null`)
    Root,
    /// Only direct children of the given note
    Id(NoteId),
}

impl ParentFilter {
    pub fn query_value(self) -> String {
        match self {
            Self::Root => "null".to_string(),
            Self::Id(id) => id.to_string(),
        }
    }
}

/// Optional filters of `GET /v1/notes`; unset filters add no query parameter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListNotesParams {
    pub parent: Option<ParentFilter>,
    pub status: Option<NoteStatus>,
    pub favorite: Option<bool>,
}

impl ListNotesParams {
    /// Query pairs in a fixed order: `parent_id`, `status`, `favorite`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(parent) = self.parent {
            pairs.push(("parent_id", parent.query_value()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.code().to_string()));
        }
        if let Some(favorite) = self.favorite {
            pairs.push(("favorite", favorite.to_string()));
        }
        pairs
    }
}
