use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::Session;
use crate::calendar::{self, DayGroup, YearMonth, Zone};
use crate::models::{JournalEntry, JournalPatch, Mood, NewJournalEntry};
use crate::store::{JournalStore, StoreError};
use crate::utils::now_utc;
use crate::view::ViewState;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Pick a mood before saving the entry")]
    MoodRequired,
    #[error("Journal entry content is required")]
    ContentRequired,
    #[error("No entry is being edited")]
    NotEditing,
    #[error("Journal entry {0} is not in the loaded month")]
    UnknownEntry(i64),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// The new-entry form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JournalDraft {
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: Vec<String>,
}

impl JournalDraft {
    pub fn submit(&self) -> Result<NewJournalEntry, JournalError> {
        if self.content.trim().is_empty() {
            return Err(JournalError::ContentRequired);
        }
        let mood = self.mood.ok_or(JournalError::MoodRequired)?;
        Ok(NewJournalEntry { content: self.content.clone(), mood, tags: self.tags.clone() })
    }
}

/// The single in-place edit in progress
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub entry_id: i64,
    pub content: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    original_content: String,
}

impl EditSession {
    /// Patch to store. `updated_at` is stamped only if the content now differs from what the
    /// entry was created with.
    pub fn patch(&self) -> JournalPatch {
        let updated_at = (self.content != self.original_content).then(now_utc);
        JournalPatch {
            content: self.content.clone(),
            mood: self.mood,
            tags: self.tags.clone(),
            updated_at,
        }
    }
}

/// One month of the signed-in user's journal
#[derive(Debug)]
pub struct JournalView {
    user_id: String,
    zone: Zone,
    month: YearMonth,
    months: Vec<YearMonth>,
    entries: ViewState<JournalEntry>,
    editing: Option<EditSession>,
}

impl JournalView {
    pub fn new(session: &Session, zone: Zone, month: YearMonth) -> Self {
        Self {
            user_id: session.user_id.clone(),
            zone,
            month,
            months: vec![month],
            entries: ViewState::new(),
            editing: None,
        }
    }

    /// View of `month` (current month when `None`) with its entries loaded
    pub fn load(
        store: &dyn JournalStore,
        session: &Session,
        zone: Zone,
        month: Option<YearMonth>,
    ) -> Result<Self, JournalError> {
        let month = month.unwrap_or_else(|| YearMonth::current(&zone));
        let mut view = Self::new(session, zone, month);
        view.reload(store)?;
        Ok(view)
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    /// Months for the selector, newest first, always including the current month
    pub fn available_months(&self) -> &[YearMonth] {
        &self.months
    }

    pub fn entries(&self) -> &[JournalEntry] {
        self.entries.records()
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn summary_sentence(&self) -> String {
        format!("You have written {} journal entries.", self.entries().len())
    }

    /// Switch the selected month and fetch it
    pub fn select_month(&mut self, store: &dyn JournalStore, month: YearMonth) -> Result<(), JournalError> {
        self.month = month;
        self.editing = None;
        self.reload(store)
    }

    #[instrument(skip(self, store), fields(user = %self.user_id, month = %self.month))]
    pub fn reload(&mut self, store: &dyn JournalStore) -> Result<(), JournalError> {
        let ticket = self.entries.begin_fetch();
        let range = self.month.bounds(&self.zone);
        let entries = store.list_journal_entries(&self.user_id, Some(range))?;
        let stamps = store.journal_timestamps(&self.user_id)?;
        debug!(count = entries.len(), "journal month fetched");
        if self.entries.apply(ticket, entries) {
            self.months = calendar::available_months(&stamps, YearMonth::current(&self.zone), &self.zone);
        }
        Ok(())
    }

    /// Entries matching `query`, grouped by day, newest day first. Days with no matching
    /// entry are left out.
    pub fn grouped(&self, query: &str) -> Vec<DayGroup<&JournalEntry>> {
        let matching = self
            .entries()
            .iter()
            .filter(|e| calendar::matches_query(query, &e.content, &e.tags));
        calendar::group_by_day(matching, &self.zone, |e| e.created_at)
    }

    #[instrument(skip(self, store, draft), fields(user = %self.user_id))]
    pub fn create(&mut self, store: &dyn JournalStore, draft: &JournalDraft) -> Result<JournalEntry, JournalError> {
        let new = draft.submit()?;
        let entry = store.insert_journal_entry(&self.user_id, &new).inspect_err(|err| {
            error!(error = %err, "failed to create journal entry");
        })?;
        info!(entry_id = entry.id, mood = %entry.mood, "journal entry created");
        self.reconcile(store);
        Ok(entry)
    }

    /// Start editing an entry of the loaded month. Any edit already in progress is discarded.
    pub fn begin_edit(&mut self, entry_id: i64) -> Result<&mut EditSession, JournalError> {
        let entry = self
            .entries()
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(JournalError::UnknownEntry(entry_id))?;
        if let Some(previous) = &self.editing {
            debug!(previous = previous.entry_id, "discarding unsaved edit");
        }
        let session = EditSession {
            entry_id,
            content: entry.content.clone(),
            mood: entry.mood,
            tags: entry.tags.clone(),
            original_content: entry.original_content.clone(),
        };
        Ok(self.editing.insert(session))
    }

    pub fn set_content(&mut self, content: impl Into<String>) -> Result<(), JournalError> {
        self.editing.as_mut().ok_or(JournalError::NotEditing)?.content = content.into();
        Ok(())
    }

    pub fn set_mood(&mut self, mood: Mood) -> Result<(), JournalError> {
        self.editing.as_mut().ok_or(JournalError::NotEditing)?.mood = mood;
        Ok(())
    }

    pub fn set_tags(&mut self, tags: Vec<String>) -> Result<(), JournalError> {
        self.editing.as_mut().ok_or(JournalError::NotEditing)?.tags = tags;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Save the edit in progress. On failure the edit stays open and the entries are
    /// refetched.
    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn commit_edit(&mut self, store: &dyn JournalStore) -> Result<JournalEntry, JournalError> {
        let edit = self.editing.as_ref().ok_or(JournalError::NotEditing)?;
        if edit.content.trim().is_empty() {
            return Err(JournalError::ContentRequired);
        }
        let entry_id = edit.entry_id;
        let patch = edit.patch();
        match store.update_journal_entry(&self.user_id, entry_id, &patch) {
            Ok(stored) => {
                info!(entry_id, edited = stored.is_edited(), "journal entry updated");
                self.editing = None;
                self.entries.patch(|e| e.id == stored.id, stored.clone());
                Ok(stored)
            }
            Err(err) => {
                error!(entry_id, error = %err, "failed to update journal entry");
                self.reconcile(store);
                Err(err.into())
            }
        }
    }

    #[instrument(skip(self, store), fields(user = %self.user_id))]
    pub fn delete(&mut self, store: &dyn JournalStore, entry_id: i64) -> Result<(), JournalError> {
        if let Err(err) = store.delete_journal_entry(&self.user_id, entry_id) {
            error!(entry_id, error = %err, "failed to delete journal entry");
            self.reconcile(store);
            return Err(err.into());
        }
        info!(entry_id, "journal entry deleted");
        if self.editing.as_ref().is_some_and(|e| e.entry_id == entry_id) {
            self.editing = None;
        }
        self.entries.remove(|e| e.id == entry_id);
        self.reconcile(store);
        Ok(())
    }

    fn reconcile(&mut self, store: &dyn JournalStore) {
        if let Err(err) = self.reload(store) {
            warn!(error = %err, "refetch after failed mutation also failed");
        }
    }
}
