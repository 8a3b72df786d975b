use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{storage::KvStore, Error, Result};

use super::{
    model::{now, Note, NoteDraft, NoteId},
    reducer::{reduce, NoteAction},
};

pub const NOTES_KEY: &str = "notes";

/// In-memory note collection backed by a single key of the key-value table.
///
/// Loaded once at startup; every mutation rewrites the whole serialized sequence while
/// holding the lock, so writes land in the order they were applied.
#[derive(Clone)]
pub struct NoteStore {
    kv: KvStore,
    notes: Arc<Mutex<Vec<Note>>>,
}

impl NoteStore {
    pub async fn load(kv: KvStore) -> Result<Self> {
        let notes = kv.get_json::<Vec<Note>>(NOTES_KEY).await?.unwrap_or_default();
        tracing::info!(count = notes.len(), "loaded notes");

        Ok(Self {
            kv,
            notes: Arc::new(Mutex::new(notes)),
        })
    }

    pub async fn find_notes(&self) -> Vec<Note> {
        self.notes.lock().await.clone()
    }

    pub async fn get_note(&self, note_id: NoteId) -> Result<Note> {
        self.notes
            .lock()
            .await
            .iter()
            .find(|n| n.id == note_id)
            .cloned()
            .ok_or_else(note_not_found)
    }

    pub async fn create_note(&self, draft: NoteDraft) -> Result<Note> {
        self.apply(NoteAction::Create(draft)).await?.ok_or_else(note_not_found)
    }

    pub async fn update_note(&self, note_id: NoteId, draft: NoteDraft) -> Result<Note> {
        self.apply(NoteAction::Update { id: note_id, draft })
            .await?
            .ok_or_else(note_not_found)
    }

    /// Removes the note. Unknown ids are a no-op and yield `None`.
    pub async fn delete_note(&self, note_id: NoteId) -> Result<Option<Note>> {
        self.apply(NoteAction::Delete { id: note_id }).await
    }

    async fn apply(&self, action: NoteAction) -> Result<Option<Note>> {
        let mut notes = self.notes.lock().await;

        let reduced = reduce(&notes, action, now())?;
        if reduced.affected.is_none() {
            return Ok(None);
        }

        self.kv.set_json(NOTES_KEY, &reduced.notes).await?;
        *notes = reduced.notes;

        Ok(reduced.affected)
    }
}

fn note_not_found() -> Error {
    Error::NotFound("Note not found".into())
}
