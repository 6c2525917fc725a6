//! User-visible notices
//!
//! Every remote failure, validation failure and completed action is
//! surfaced as a short transient notice. `NoticeLog` is a cheap cloneable
//! handle: the gateway, the sync layer and the presentation surface all hold
//! a clone of the same log. Each notice is mirrored to `tracing`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Maximum notices retained before the oldest are dropped
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// Notice severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single user-visible message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

impl Notice {
    /// Create a notice stamped with the current time
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            raised_at: Utc::now(),
        }
    }

    /// Whether this notice reports a failure
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Shared, bounded log of notices
#[derive(Debug, Clone)]
pub struct NoticeLog {
    inner: Arc<Mutex<VecDeque<Notice>>>,
    capacity: usize,
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTICE_CAPACITY)
    }
}

impl NoticeLog {
    /// Create an empty log with the default capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log holding at most `capacity` notices
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Record a notice
    pub fn push(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => tracing::error!("{}", notice.text),
            NoticeLevel::Warning => tracing::warn!("{}", notice.text),
            NoticeLevel::Info | NoticeLevel::Success => tracing::info!("{}", notice.text),
        }

        let mut queue = self.lock();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(notice);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.push(Notice::new(NoticeLevel::Info, text));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.push(Notice::new(NoticeLevel::Success, text));
    }

    pub fn warning(&self, text: impl Into<String>) {
        self.push(Notice::new(NoticeLevel::Warning, text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(Notice::new(NoticeLevel::Error, text));
    }

    /// Remove and return every pending notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        self.lock().drain(..).collect()
    }

    /// Copy of the pending notices without consuming them
    pub fn snapshot(&self) -> Vec<Notice> {
        self.lock().iter().cloned().collect()
    }

    /// The most recent notice, if any
    pub fn latest(&self) -> Option<Notice> {
        self.lock().back().cloned()
    }

    /// Whether any pending notice is an error
    pub fn has_errors(&self) -> bool {
        self.lock().iter().any(Notice::is_error)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notice>> {
        // A poisoned log still holds valid notices.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ============================================================================
// Tests
// ============================================================================
