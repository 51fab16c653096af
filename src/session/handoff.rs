//! Single-slot handoff of one analysis result from the capture flow to the
//! results view.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::analysis::AnalysisResult;

#[derive(Clone, Default)]
pub struct ResultSlot {
    inner: Arc<Mutex<Option<AnalysisResult>>>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites whatever was waiting.
    pub fn put(&self, result: AnalysisResult) {
        *self.lock() = Some(result);
    }

    /// Returns the pending result and empties the slot in the same step.
    pub fn take(&self) -> Option<AnalysisResult> {
        self.lock().take()
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<AnalysisResult>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
