use crate::types::HelpRequest;
use tokio::sync::watch;

pub fn pending_count(requests: &[HelpRequest]) -> usize {
    requests.iter().filter(|request| request.is_pending()).count()
}

/// Publishes the pending count of the latest successful snapshot.
pub struct BadgeAggregator {
    sender: watch::Sender<usize>,
}

impl BadgeAggregator {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self { sender }
    }

    /// Recompute from a freshly synchronized snapshot. Only notifies watchers when the
    /// count actually moved.
    pub fn update(&self, requests: &[HelpRequest]) {
        let count = pending_count(requests);
        self.sender.send_if_modified(|current| {
            if *current == count {
                return false;
            }
            *current = count;
            true
        });
    }

    pub fn current(&self) -> usize {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.sender.subscribe()
    }
}

impl Default for BadgeAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::apply_resolution;
    use crate::types::HelpRequestId;
    use chrono::Utc;

    fn request(id: &str) -> HelpRequest {
        HelpRequest::pending(
            HelpRequestId::new(id.to_string()).expect("valid id"),
            "Customer".to_string(),
            "question".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn counts_only_pending_requests() {
        let resolved = apply_resolution(&request("c"), "answer").expect("resolves");
        assert_eq!(pending_count(&[request("a"), request("b"), resolved]), 2);
        assert_eq!(pending_count(&[]), 0);
    }

    #[tokio::test]
    async fn update_signals_watchers_only_on_change() {
        let badge = BadgeAggregator::new();
        let mut rx = badge.subscribe();

        badge.update(&[request("a")]);
        assert!(rx.has_changed().expect("sender alive"));
        assert_eq!(*rx.borrow_and_update(), 1);

        badge.update(&[request("b")]);
        assert!(!rx.has_changed().expect("sender alive"));
        assert_eq!(badge.current(), 1);
    }
}
