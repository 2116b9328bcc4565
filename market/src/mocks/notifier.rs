//! Notifier that records every notification.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::{Notification, Notifier};

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .map(|n| n.title.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.notifications.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
