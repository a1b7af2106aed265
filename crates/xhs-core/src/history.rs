//! Append-only log of completed generations.
//!
//! The newest `cap` records are kept in an in-memory ring buffer; every append
//! is also written to a JSON Lines file and flushed before returning, so a
//! completed generation survives a restart. The file is compacted once it
//! holds more than twice the cap.

use std::{
    collections::VecDeque,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{domain::ChatId, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub time: DateTime<Utc>,
    pub conversation_id: ChatId,
    pub command_type: String,
    pub topic: String,
    pub result: String,
}

impl HistoryRecord {
    pub fn now(
        conversation_id: ChatId,
        command_type: impl Into<String>,
        topic: impl Into<String>,
        result: impl Into<String>,
    ) -> Self {
        Self {
            time: Utc::now(),
            conversation_id,
            command_type: command_type.into(),
            topic: topic.into(),
            result: result.into(),
        }
    }
}

#[derive(Debug)]
pub struct HistoryStore {
    path: Option<PathBuf>,
    cap: usize,
    records: VecDeque<HistoryRecord>,
    lines_on_disk: usize,
}

impl HistoryStore {
    /// Memory-only store (nothing is persisted).
    pub fn in_memory(cap: usize) -> Self {
        Self {
            path: None,
            cap: cap.max(1),
            records: VecDeque::new(),
            lines_on_disk: 0,
        }
    }

    /// Open (or create on first append) the log at `path`.
    ///
    /// Never fails: an unreadable file yields an empty store and corrupt lines
    /// are skipped, both logged for the operator.
    pub fn open(path: impl Into<PathBuf>, cap: usize) -> Self {
        let path = path.into();
        let mut store = Self {
            path: Some(path.clone()),
            ..Self::in_memory(cap)
        };

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "history log not found, starting empty");
                return store;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "history log unreadable, starting empty");
                return store;
            }
        };

        let mut corrupt = 0usize;
        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            store.lines_on_disk += 1;
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(rec) => store.push_capped(rec),
                Err(_) => corrupt += 1,
            }
        }
        if corrupt > 0 {
            tracing::error!(
                path = %path.display(),
                corrupt,
                "skipped corrupt history records"
            );
        }
        tracing::info!(
            path = %path.display(),
            records = store.records.len(),
            "history log loaded"
        );
        store
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    /// Append a record, evicting the oldest beyond the cap.
    ///
    /// The in-memory append always happens; a returned error only means the
    /// record could not be persisted.
    pub fn append(&mut self, record: HistoryRecord) -> Result<()> {
        self.push_capped(record);
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        if self.lines_on_disk + 1 > self.cap.saturating_mul(2) {
            self.compact(&path)?;
            return Ok(());
        }

        let Some(last) = self.records.back() else {
            return Ok(());
        };
        let line = serde_json::to_string(last)?;
        ensure_parent_dir(&path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "{line}")?;
        file.flush()?;
        file.sync_data()?;
        self.lines_on_disk += 1;
        Ok(())
    }

    /// Records of `conversation_id` (if given) whose topic or result contains
    /// `keyword`, oldest first.
    pub fn search(&self, keyword: &str, conversation_id: Option<ChatId>) -> Vec<&HistoryRecord> {
        self.records
            .iter()
            .filter(|r| conversation_id.map_or(true, |c| r.conversation_id == c))
            .filter(|r| r.topic.contains(keyword) || r.result.contains(keyword))
            .collect()
    }

    /// Last `limit` records of a conversation, newest first.
    pub fn recent(&self, conversation_id: ChatId, limit: usize) -> Vec<&HistoryRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| r.conversation_id == conversation_id)
            .take(limit)
            .collect()
    }

    /// Newest record of `command_type` for an exact topic in a conversation.
    pub fn latest_for(
        &self,
        conversation_id: ChatId,
        command_type: &str,
        topic: &str,
    ) -> Option<&HistoryRecord> {
        self.records.iter().rev().find(|r| {
            r.conversation_id == conversation_id
                && r.command_type == command_type
                && r.topic == topic
        })
    }

    fn push_capped(&mut self, record: HistoryRecord) {
        self.records.push_back(record);
        while self.records.len() > self.cap {
            self.records.pop_front();
        }
    }

    fn compact(&mut self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("jsonl.tmp");
        ensure_parent_dir(path)?;
        {
            let mut file = fs::File::create(&tmp)?;
            for rec in &self.records {
                let line = serde_json::to_string(rec)?;
                writeln!(file, "{line}")?;
            }
            file.flush()?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        self.lines_on_disk = self.records.len();
        tracing::debug!(path = %path.display(), records = self.lines_on_disk, "history log compacted");
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
