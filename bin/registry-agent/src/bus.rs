//! Registration-complete notifications for the agent

use registry_core::RegistrationListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::info;

/// Wakes the main loop once the registry acknowledges the node
#[derive(Default)]
pub struct NotifyListener {
    completions: AtomicUsize,
    notify: Notify,
}

impl NotifyListener {
    /// Wait for the next registration to complete. A notification that
    /// fired before the call is not lost.
    pub async fn wait(&self) {
        self.notify.notified().await
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl RegistrationListener for NotifyListener {
    fn registration_complete(&self) {
        let n = self.completions.fetch_add(1, Ordering::SeqCst) + 1;
        info!(completions = n, "Registry acknowledged this node");
        self.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_notification_before_wait_is_kept() {
        let listener = NotifyListener::default();
        listener.registration_complete();

        tokio::time::timeout(Duration::from_secs(1), listener.wait())
            .await
            .unwrap();
        assert_eq!(listener.completions(), 1);
    }
}
