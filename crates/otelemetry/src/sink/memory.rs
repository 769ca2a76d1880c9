//! [`MemorySink`]: collects emitted records for later inspection.

use std::sync::{Arc, Mutex, MutexGuard};

use super::LogSink;
use crate::context::EmitContext;
use crate::record::LogRecord;

/// Cloneable in-memory sink; clones share the same buffer.
///
/// Intended for tests of code that logs through [`Log`](crate::Log).
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    inner: Arc<Mutex<Vec<(EmitContext, LogRecord)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(EmitContext, LogRecord)>> {
        // A panicking writer cannot leave a half-pushed Vec behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the records emitted so far, in emission order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Snapshot of records together with the context each was emitted under.
    pub fn entries(&self) -> Vec<(EmitContext, LogRecord)> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, ctx: &EmitContext, record: LogRecord) {
        self.lock().push((ctx.clone(), record));
    }
}
