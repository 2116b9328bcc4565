//! Navigator that records every navigation.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::Navigator;

#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path navigated to, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.history.lock().len()
    }

    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.history.lock().push(path.to_string());
    }
}
