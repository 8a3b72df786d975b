use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// Creation timestamp of the note, doubles as its identifier.
pub type NoteId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub last_edited: bool,
}

impl Note {
    /// Timestamp shown to the user: the last update once edited, the issue date before that.
    pub fn display_timestamp(&self) -> Timestamp {
        if self.last_edited {
            self.updated_at
        } else {
            self.created_at
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct NoteIdPath {
    pub note_id: NoteId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindNotesResponse {
    pub results: Vec<Note>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteNoteResponse {
    pub deleted: Option<Note>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteNoteQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// Body of the export and mint routes: the rendered note as a base64 data URI.
#[derive(Debug, Deserialize)]
pub struct RenderedNote {
    pub image: String,
}

pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_millis()
}
