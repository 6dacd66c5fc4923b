// src/store.rs

use crate::db::Storage;
use crate::error::{Result, StoolError};
use crate::models::{Color, EntryDraft, LogEntry, ShapeType, Size};
use chrono::{Local, NaiveDate, NaiveDateTime, SubsecRound};

/// Owns the entry collection and keeps it in sync with a single storage slot.
///
/// The whole collection is written on every change; reads replace the
/// in-memory collection wholesale.
pub struct EntryStore<S: Storage> {
    storage: S,
    key: String,
    entries: Vec<LogEntry>,
    diverged: bool,
}

impl<S: Storage> EntryStore<S> {
    /// Creates the store and loads whatever the slot currently holds.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = EntryStore {
            storage,
            key: key.into(),
            entries: Vec::new(),
            diverged: false,
        };
        store.load();
        store
    }

    /// Reloads the collection from storage.
    ///
    /// Missing, unreadable, or malformed data all yield an empty collection.
    pub fn load(&mut self) -> &[LogEntry] {
        self.entries = self.read_persisted();
        self.diverged = false;
        &self.entries
    }

    fn read_persisted(&self) -> Vec<LogEntry> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "storage read failed, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "stored entries are malformed, ignoring them");
                Vec::new()
            }
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    /// Records a new entry stamped with the current local time.
    pub fn add(&mut self, draft: EntryDraft) -> Result<LogEntry> {
        self.add_at(draft, Local::now().naive_local())
    }

    /// Records a new entry with an explicit timestamp, truncated to whole seconds.
    ///
    /// On a failed write the entry stays in memory, the store is marked
    /// diverged, and `StoolError::Diverged` is returned so the caller can
    /// warn and retry with `flush`.
    pub fn add_at(&mut self, draft: EntryDraft, timestamp: NaiveDateTime) -> Result<LogEntry> {
        let entry = draft.into_entry(timestamp.trunc_subsecs(0));
        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.entries = next;

        match self.persist() {
            Ok(()) => {
                self.diverged = false;
                tracing::debug!(count = self.entries.len(), "entry saved");
                Ok(entry)
            }
            Err(source) => {
                self.diverged = true;
                tracing::warn!(error = %source, "entry kept in memory only");
                Err(StoolError::Diverged {
                    entry: Box::new(entry),
                    source: Box::new(source),
                })
            }
        }
    }

    /// Writes the in-memory collection again, clearing the diverged flag.
    pub fn flush(&mut self) -> Result<()> {
        self.persist()?;
        self.diverged = false;
        Ok(())
    }

    /// Stores `seed` only if the collection is empty. Returns whether it did.
    pub fn seed_if_empty(&mut self, seed: Vec<LogEntry>) -> Result<bool> {
        if !self.entries.is_empty() {
            return Ok(false);
        }
        self.entries = seed;
        self.flush()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.write(&self.key, &raw)
    }
}

/// A small fixed set of entries for trying out the views.
pub fn demo_entries() -> Vec<LogEntry> {
    let at = |d: u32, h: u32, m: u32| -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .and_then(|date| date.and_hms_opt(h, m, 0))
            .unwrap_or_default()
    };
    vec![
        EntryDraft {
            shape_type: Some(ShapeType::SmoothSnake),
            size: Some(Size::M),
            color: Some(Color::Brown),
            notes: "Firm".to_string(),
            ..Default::default()
        }
        .into_entry(at(22, 12, 40)),
        EntryDraft {
            shape_type: Some(ShapeType::HardLumps),
            size: Some(Size::XS),
            color: Some(Color::Sienna),
            has_blood: true,
            ..Default::default()
        }
        .into_entry(at(22, 12, 47)),
        EntryDraft {
            shape_type: Some(ShapeType::Watery),
            color: Some(Color::Goldenrod),
            notes: "Frequent".to_string(),
            ..Default::default()
        }
        .into_entry(at(23, 8, 15)),
    ]
}
