use crate::models::Note;
use crate::store::{NoteStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteLogState {
    Empty,
    Loading,
    Loaded,
    LoadFailed,
    Saving,
}

/// Outcome of reading notes. `Unavailable` keeps the reason for logs only.
#[derive(Debug)]
pub enum NoteFetch {
    Loaded(Vec<Note>),
    Unavailable(StoreError),
}

impl NoteFetch {
    pub fn into_notes(self) -> Vec<Note> {
        match self {
            NoteFetch::Loaded(notes) => notes,
            NoteFetch::Unavailable(_) => Vec::new(),
        }
    }
}

pub async fn fetch_notes<S>(store: &S, lead_id: &str) -> NoteFetch
where
    S: NoteStore + ?Sized,
{
    match store.fetch_notes(lead_id).await {
        Ok(notes) => NoteFetch::Loaded(notes),
        Err(err) => NoteFetch::Unavailable(err),
    }
}

/// Ordered, append-only notes for the lead currently open in a detail view.
#[derive(Debug)]
pub struct NoteLog {
    lead_id: String,
    state: NoteLogState,
    notes: Vec<Note>,
}

impl NoteLog {
    pub fn new(lead_id: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            state: NoteLogState::Empty,
            notes: Vec::new(),
        }
    }

    pub fn lead_id(&self) -> &str {
        &self.lead_id
    }

    pub fn state(&self) -> NoteLogState {
        self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Best-effort: a failed fetch leaves the log empty instead of erroring.
    pub async fn load<S>(&mut self, store: &S) -> &[Note]
    where
        S: NoteStore + ?Sized,
    {
        self.state = NoteLogState::Loading;
        let fetch = fetch_notes(store, &self.lead_id).await;
        if let NoteFetch::Unavailable(err) = &fetch {
            tracing::warn!(lead_id = %self.lead_id, error = %err, "notes unavailable, showing none");
            self.state = NoteLogState::LoadFailed;
        } else {
            self.state = NoteLogState::Loaded;
        }
        self.notes = fetch.into_notes();
        &self.notes
    }

    /// Saves `body` and appends the stored note to the end of the log.
    ///
    /// Returns `Ok(None)` without touching the store when `body` is blank.
    /// Store failures are returned and leave the log as it was.
    pub async fn append<S>(&mut self, store: &S, body: &str) -> Result<Option<Note>, StoreError>
    where
        S: NoteStore + ?Sized,
    {
        if body.trim().is_empty() {
            tracing::debug!(lead_id = %self.lead_id, "ignoring blank note");
            return Ok(None);
        }

        let previous = self.state;
        self.state = NoteLogState::Saving;
        match store.save_note(&self.lead_id, body).await {
            Ok(note) => {
                tracing::info!(lead_id = %self.lead_id, note_id = ?note.id, "note saved");
                self.notes.push(note.clone());
                self.state = NoteLogState::Loaded;
                Ok(Some(note))
            }
            Err(err) => {
                tracing::error!(lead_id = %self.lead_id, error = %err, "failed to save note");
                self.state = previous;
                Err(err)
            }
        }
    }
}
