//! Write journal: every mutation passes through an explicit
//! pending -> committed | failed lifecycle.
//!
//! A failed write records the error code that stopped it and implies the
//! store was left untouched. The journal keeps a bounded ring of recent
//! records and doubles as the admin audit trail.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Kinds of tracked writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    Signup,
    PasswordReset,
    CreateBook,
    UpdateBook,
    DeleteBook,
    CreateReview,
    UpdateReview,
    DeleteReview,
    LikeReview,
    UnlikeReview,
    UpdateProfile,
    Follow,
    Unfollow,
    ChangeRole,
    BanUser,
    UnbanUser,
}

impl WriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteKind::Signup => "signup",
            WriteKind::PasswordReset => "password_reset",
            WriteKind::CreateBook => "create_book",
            WriteKind::UpdateBook => "update_book",
            WriteKind::DeleteBook => "delete_book",
            WriteKind::CreateReview => "create_review",
            WriteKind::UpdateReview => "update_review",
            WriteKind::DeleteReview => "delete_review",
            WriteKind::LikeReview => "like_review",
            WriteKind::UnlikeReview => "unlike_review",
            WriteKind::UpdateProfile => "update_profile",
            WriteKind::Follow => "follow",
            WriteKind::Unfollow => "unfollow",
            WriteKind::ChangeRole => "change_role",
            WriteKind::BanUser => "ban_user",
            WriteKind::UnbanUser => "unban_user",
        }
    }
}

/// Lifecycle state of a journaled write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum WriteState {
    Pending,
    Committed,
    Failed { error: String },
}

/// One journaled write.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteRecord {
    pub id: Uuid,
    pub kind: WriteKind,
    /// Acting user, absent for signup.
    pub actor: Option<Uuid>,
    #[serde(flatten)]
    pub state: WriteState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Counts by terminal state, plus in-flight writes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WriteCounts {
    pub pending: usize,
    pub committed: u64,
    pub failed: u64,
}

/// Bounded journal of recent writes.
pub struct WriteJournal {
    records: DashMap<Uuid, WriteRecord>,
    /// Insertion order, oldest first; trimmed to `capacity`.
    order: Mutex<VecDeque<Uuid>>,
    capacity: usize,
    committed: AtomicU64,
    failed: AtomicU64,
}

impl WriteJournal {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity,
            committed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Open a pending record and return its id.
    pub fn begin(&self, kind: WriteKind, actor: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        let record = WriteRecord {
            id,
            kind,
            actor,
            state: WriteState::Pending,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.records.insert(id, record);

        let mut order = self.order.lock().expect("journal order lock");
        order.push_back(id);
        while order.len() > self.capacity {
            if let Some(old) = order.pop_front() {
                self.records.remove(&old);
            }
        }
        id
    }

    /// Mark a pending write committed.
    pub fn commit(&self, id: Uuid) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        if let Some(mut record) = self.records.get_mut(&id) {
            record.state = WriteState::Committed;
            record.finished_at = Some(Utc::now());
        }
    }

    /// Mark a pending write failed with the error code that stopped it.
    pub fn fail(&self, id: Uuid, error: &str) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        if let Some(mut record) = self.records.get_mut(&id) {
            record.state = WriteState::Failed {
                error: error.to_string(),
            };
            record.finished_at = Some(Utc::now());
        }
    }

    /// Most recent writes, newest first.
    pub fn recent(&self, limit: usize) -> Vec<WriteRecord> {
        let order = self.order.lock().expect("journal order lock");
        order
            .iter()
            .rev()
            .take(limit)
            .filter_map(|id| self.records.get(id).map(|r| r.clone()))
            .collect()
    }

    pub fn counts(&self) -> WriteCounts {
        let pending = self
            .records
            .iter()
            .filter(|r| r.state == WriteState::Pending)
            .count();
        WriteCounts {
            pending,
            committed: self.committed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
