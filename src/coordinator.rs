use crate::models::PendingPasswordRequest;
use tracing::debug;

/// Holds the one archive, if any, that is waiting for a password.
#[derive(Debug, Default)]
pub struct PasswordRetryCoordinator {
    pending: Option<PendingPasswordRequest>,
}

impl PasswordRetryCoordinator {
    /// Replaces whatever was pending with a fresh request for `path`.
    pub fn capture(&mut self, path: String, reason: Option<String>) {
        debug!("Awaiting password for {}", path);
        self.pending = Some(PendingPasswordRequest { path, reason });
    }

    /// Clears the pending request and hands it to the caller for resubmission.
    pub fn take(&mut self) -> Option<PendingPasswordRequest> {
        self.pending.take()
    }

    /// Returns true if something was pending.
    pub fn cancel(&mut self) -> bool {
        let had_pending = self.pending.take().is_some();
        if had_pending {
            debug!("Password prompt dismissed");
        }
        had_pending
    }

    pub fn pending(&self) -> Option<&PendingPasswordRequest> {
        self.pending.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_pending() {
        let mut coordinator = PasswordRetryCoordinator::default();
        coordinator.capture("/x.zip".into(), None);
        assert!(coordinator.pending().is_some());

        let taken = coordinator.take().unwrap();
        assert_eq!(taken.path, "/x.zip");
        assert!(coordinator.pending().is_none());
        assert!(coordinator.take().is_none());
    }

    #[test]
    fn capture_replaces_previous_request() {
        let mut coordinator = PasswordRetryCoordinator::default();
        coordinator.capture("/a.zip".into(), None);
        coordinator.capture("/b.zip".into(), Some("invalid password".into()));

        let pending = coordinator.pending().unwrap();
        assert_eq!(pending.path, "/b.zip");
        assert_eq!(pending.reason.as_deref(), Some("invalid password"));
    }

    #[test]
    fn cancel_reports_whether_anything_was_pending() {
        let mut coordinator = PasswordRetryCoordinator::default();
        assert!(!coordinator.cancel());
        coordinator.capture("/a.zip".into(), None);
        assert!(coordinator.cancel());
        assert!(coordinator.pending().is_none());
    }
}
