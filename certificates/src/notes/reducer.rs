//! Pure transitions of the note collection.
//!
//! Every mutation of the collection goes through [`reduce`], which returns the next
//! ordered sequence instead of touching the previous one. Persisting the result is the
//! caller's business.

use super::model::{Note, NoteDraft, NoteId, Timestamp};

#[derive(Debug, Clone)]
pub enum NoteAction {
    Create(NoteDraft),
    Update { id: NoteId, draft: NoteDraft },
    Delete { id: NoteId },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Certificate title must not be empty")]
    EmptyTitle,
    #[error("Certificate description must not be empty")]
    EmptyContent,
}

#[derive(Debug)]
pub struct Reduced {
    pub notes: Vec<Note>,
    /// The created, updated or removed record. `None` when the action matched nothing.
    pub affected: Option<Note>,
}

impl Reduced {
    fn unchanged(notes: &[Note]) -> Self {
        Self {
            notes: notes.to_vec(),
            affected: None,
        }
    }
}

pub fn reduce(notes: &[Note], action: NoteAction, now: Timestamp) -> Result<Reduced, ValidationError> {
    match action {
        NoteAction::Create(draft) => {
            validate(&draft)?;

            let id = notes.iter().map(|n| n.id).max().map_or(now, |last| now.max(last + 1));
            let note = Note {
                id,
                title: draft.title,
                content: draft.content,
                created_at: id,
                updated_at: id,
                last_edited: false,
            };

            let mut next = notes.to_vec();
            next.push(note.clone());
            Ok(Reduced {
                notes: next,
                affected: Some(note),
            })
        }
        NoteAction::Update { id, draft } => {
            let Some(position) = notes.iter().position(|n| n.id == id) else {
                return Ok(Reduced::unchanged(notes));
            };

            validate(&draft)?;

            let mut next = notes.to_vec();
            let note = &mut next[position];
            note.title = draft.title;
            note.content = draft.content;
            note.updated_at = now.max(note.created_at);
            note.last_edited = true;

            let affected = note.clone();
            Ok(Reduced {
                notes: next,
                affected: Some(affected),
            })
        }
        NoteAction::Delete { id } => {
            let mut next = notes.to_vec();
            let position = next.iter().position(|n| n.id == id);
            let affected = position.map(|position| next.remove(position));

            Ok(Reduced { notes: next, affected })
        }
    }
}

fn validate(draft: &NoteDraft) -> Result<(), ValidationError> {
    if draft.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if draft.content.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, content: &str) -> NoteDraft {
        NoteDraft {
            title: title.into(),
            content: content.into(),
        }
    }

    fn create(notes: &[Note], title: &str, now: Timestamp) -> Vec<Note> {
        reduce(notes, NoteAction::Create(draft(title, "body")), now).unwrap().notes
    }

    #[test]
    fn created_note_is_unedited() {
        let reduced = reduce(&[], NoteAction::Create(draft("Rust", "Completed the course")), 1_000).unwrap();
        let note = reduced.affected.unwrap();

        assert_eq!(note.id, 1_000);
        assert_eq!(note.created_at, note.updated_at);
        assert!(!note.last_edited);
        assert_eq!(note.display_timestamp(), note.created_at);
        assert_eq!(reduced.notes, vec![note]);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let notes = create(&[], "first", 1_000);
        let notes = create(&notes, "second", 1_000);

        assert_eq!(notes[0].id, 1_000);
        assert_eq!(notes[1].id, 1_001);
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_eq!(
            reduce(&[], NoteAction::Create(draft("  ", "body")), 1).unwrap_err(),
            ValidationError::EmptyTitle
        );
        assert_eq!(
            reduce(&[], NoteAction::Create(draft("title", "")), 1).unwrap_err(),
            ValidationError::EmptyContent
        );
    }

    #[test]
    fn update_marks_note_as_edited() {
        let notes = create(&[], "first", 1_000);

        let reduced = reduce(
            &notes,
            NoteAction::Update {
                id: 1_000,
                draft: draft("renamed", "new body"),
            },
            5_000,
        )
        .unwrap();
        let note = reduced.affected.unwrap();

        assert_eq!(note.id, 1_000);
        assert_eq!(note.title, "renamed");
        assert_eq!(note.content, "new body");
        assert_eq!(note.created_at, 1_000);
        assert_eq!(note.updated_at, 5_000);
        assert!(note.last_edited);
        assert_eq!(note.display_timestamp(), 5_000);
    }

    #[test]
    fn update_never_moves_before_creation() {
        let notes = create(&[], "first", 1_000);

        let reduced = reduce(
            &notes,
            NoteAction::Update {
                id: 1_000,
                draft: draft("a", "b"),
            },
            900,
        )
        .unwrap();

        assert_eq!(reduced.affected.unwrap().updated_at, 1_000);
    }

    #[test]
    fn update_of_unknown_id_changes_nothing() {
        let notes = create(&[], "first", 1_000);

        let reduced = reduce(
            &notes,
            NoteAction::Update {
                id: 42,
                draft: draft("a", "b"),
            },
            2_000,
        )
        .unwrap();

        assert!(reduced.affected.is_none());
        assert_eq!(reduced.notes, notes);
    }

    #[test]
    fn unknown_id_wins_over_blank_draft() {
        let notes = create(&[], "first", 1_000);

        let reduced = reduce(
            &notes,
            NoteAction::Update {
                id: 42,
                draft: draft("", ""),
            },
            2_000,
        )
        .unwrap();
        assert!(reduced.affected.is_none());

        let error = reduce(
            &notes,
            NoteAction::Update {
                id: 1_000,
                draft: draft("", "b"),
            },
            2_000,
        )
        .unwrap_err();
        assert_eq!(error, ValidationError::EmptyTitle);
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let notes = create(&[], "first", 1_000);
        let notes = create(&notes, "second", 2_000);
        let notes = create(&notes, "third", 3_000);

        let reduced = reduce(&notes, NoteAction::Delete { id: 2_000 }, 4_000).unwrap();

        assert_eq!(reduced.affected.unwrap().title, "second");
        assert_eq!(reduced.notes, vec![notes[0].clone(), notes[2].clone()]);
    }

    #[test]
    fn delete_of_unknown_id_is_a_no_op() {
        let notes = create(&[], "first", 1_000);

        let reduced = reduce(&notes, NoteAction::Delete { id: 7 }, 2_000).unwrap();

        assert!(reduced.affected.is_none());
        assert_eq!(reduced.notes, notes);
    }
}
