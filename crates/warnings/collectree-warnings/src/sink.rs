//! Where emitted warnings go.

use hashbrown::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::category::WarningCategory;
use crate::error::WarningError;
use crate::filter::{resolve, FilterAction, WarningFilter};
use crate::warning::WarningRecord;

/// Receives emitted warnings. Returning an error aborts the caller.
pub trait WarningSink: Send + Sync {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError>;
}

impl<S: WarningSink + ?Sized> WarningSink for Arc<S> {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        (**self).emit(record)
    }
}

impl<S: WarningSink + ?Sized> WarningSink for &S {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        (**self).emit(record)
    }
}

/// Log target used by [`LogSink`].
pub const LOG_TARGET: &str = "collectree::warnings";

/// Forwards every warning to the `log` facade at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        log::warn!(target: LOG_TARGET, "{record}");
        Ok(())
    }
}

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collects warnings so tests can assert on them.
#[derive(Debug, Default)]
pub struct WarningRecorder {
    records: Mutex<Vec<WarningRecord>>,
}

impl WarningRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<WarningRecord> {
        lock(&self.records).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }

    /// First record of `category` (or a subclass) whose message contains `needle`.
    pub fn find(&self, category: WarningCategory, needle: &str) -> Option<WarningRecord> {
        lock(&self.records)
            .iter()
            .find(|r| r.warning.is_instance_of(category) && r.message().contains(needle))
            .cloned()
    }

    /// Remove and return the first record of `category` (or a subclass).
    pub fn pop(&self, category: WarningCategory) -> Option<WarningRecord> {
        let mut records = lock(&self.records);
        let idx = records
            .iter()
            .position(|r| r.warning.is_instance_of(category))?;
        Some(records.remove(idx))
    }

    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl WarningSink for WarningRecorder {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        lock(&self.records).push(record);
        Ok(())
    }
}

type SeenKey = (WarningCategory, String, Option<String>);

/// Applies warning filters before handing warnings to `inner`.
#[derive(Debug)]
pub struct FilteredSink<S> {
    filters: Vec<WarningFilter>,
    default_action: FilterAction,
    inner: S,
    seen: Mutex<HashSet<SeenKey>>,
}

impl<S: WarningSink> FilteredSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            filters: Vec::new(),
            default_action: FilterAction::Default,
            inner,
            seen: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_filters(mut self, filters: impl IntoIterator<Item = WarningFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn with_default_action(mut self, action: FilterAction) -> Self {
        self.default_action = action;
        self
    }

    /// Add a filter that takes precedence over every filter added before it.
    pub fn push_filter(&mut self, filter: WarningFilter) {
        self.filters.push(filter);
    }

    pub fn filters(&self) -> &[WarningFilter] {
        &self.filters
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Returns true the first time `key` is seen.
    fn first_time(&self, key: SeenKey) -> bool {
        lock(&self.seen).insert(key)
    }
}

impl<S: WarningSink> WarningSink for FilteredSink<S> {
    fn emit(&self, record: WarningRecord) -> Result<(), WarningError> {
        let action = resolve(&self.filters, &record).unwrap_or(self.default_action);
        log::trace!("warning filter action {action} for {record}");
        match action {
            FilterAction::Error => Err(WarningError::Raised(record)),
            FilterAction::Ignore => Ok(()),
            FilterAction::Always => self.inner.emit(record),
            FilterAction::Default => {
                let key = (
                    record.category(),
                    record.message().to_string(),
                    record.location.clone(),
                );
                if self.first_time(key) {
                    self.inner.emit(record)
                } else {
                    Ok(())
                }
            }
            FilterAction::Once => {
                let key = (record.category(), record.message().to_string(), None);
                if self.first_time(key) {
                    self.inner.emit(record)
                } else {
                    Ok(())
                }
            }
        }
    }
}
