use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Lead, Note};

pub const DEFAULT_FETCH_LIMIT: i64 = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lead not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => StoreError::Transport(err.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// Read access to the scored lead collection.
#[async_trait]
pub trait LeadSource {
    /// Returns the whole collection, or at most `limit` leads, in a stable order.
    async fn fetch_leads(&self, limit: Option<i64>) -> Result<Vec<Lead>, StoreError>;

    async fn fetch_lead_detail(&self, id: &str) -> Result<Lead, StoreError>;
}

/// Append-only per-lead note storage.
#[async_trait]
pub trait NoteStore {
    async fn fetch_notes(&self, lead_id: &str) -> Result<Vec<Note>, StoreError>;

    /// Persists a note and returns it with its store-assigned id and timestamp.
    async fn save_note(&self, lead_id: &str, body: &str) -> Result<Note, StoreError>;
}

#[cfg(test)]
pub mod fake {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    /// In-memory source used by tests; can be told to fail either side.
    #[derive(Default)]
    pub struct FakeStore {
        pub leads: Vec<Lead>,
        pub notes: Mutex<HashMap<String, Vec<Note>>>,
        pub fail_fetch_notes: bool,
        pub fail_save_notes: bool,
        pub save_calls: AtomicUsize,
        pub next_id: AtomicUsize,
    }

    impl FakeStore {
        pub fn with_leads(leads: Vec<Lead>) -> Self {
            Self {
                leads,
                ..Self::default()
            }
        }

        pub fn save_calls(&self) -> usize {
            self.save_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LeadSource for FakeStore {
        async fn fetch_leads(&self, limit: Option<i64>) -> Result<Vec<Lead>, StoreError> {
            let cap = limit
                .and_then(|value| usize::try_from(value).ok())
                .unwrap_or(self.leads.len());
            Ok(self.leads.iter().take(cap).cloned().collect())
        }

        async fn fetch_lead_detail(&self, id: &str) -> Result<Lead, StoreError> {
            self.leads
                .iter()
                .find(|lead| lead.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        }
    }

    #[async_trait]
    impl NoteStore for FakeStore {
        async fn fetch_notes(&self, lead_id: &str) -> Result<Vec<Note>, StoreError> {
            if self.fail_fetch_notes {
                return Err(StoreError::Transport("notes endpoint unavailable".to_string()));
            }
            let notes = self.notes.lock().unwrap();
            Ok(notes.get(lead_id).cloned().unwrap_or_default())
        }

        async fn save_note(&self, lead_id: &str, body: &str) -> Result<Note, StoreError> {
            self.save_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_save_notes {
                return Err(StoreError::Transport("connection reset".to_string()));
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
            let note = Note {
                id: Some(id),
                lead_id: lead_id.to_string(),
                body: body.to_string(),
                created_at: Some(Utc::now()),
            };
            self.notes
                .lock()
                .unwrap()
                .entry(lead_id.to_string())
                .or_default()
                .push(note.clone());
            Ok(note)
        }
    }
}
