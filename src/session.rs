//! Session State: which archive is shown, what is in flight, and how backend
//! responses move the session between states.
//!
//! ```text
//! Empty ──open──▶ Opening ──ok──────────────▶ Open ──open──▶ Opening
//!                    │    ──password needed──▶ AwaitingPassword ──submit──▶ Opening
//!                    │                                          ──cancel──▶ Empty
//!                    └────failed─────────────▶ Empty (error shown)
//! ```
//!
//! Every open is issued under a fresh [`RequestToken`]. A response whose
//! token is not the one currently awaited belongs to a superseded request
//! and is dropped.

use crate::coordinator::PasswordRetryCoordinator;
use crate::error::{OpenError, SessionError};
use crate::gateway::{Gateway, GatewayEvent};
use crate::history::HistoryView;
use crate::models::{ArchiveHandle, OpenRequest, Password, PendingPasswordRequest, RequestToken};
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

#[derive(Debug)]
enum Phase {
    Empty,
    Opening {
        token: RequestToken,
        path: Option<String>,
    },
    Open(ArchiveHandle),
}

/// Read-only view of the session for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState<'a> {
    Empty,
    Opening { path: Option<&'a str> },
    Open(&'a ArchiveHandle),
    AwaitingPassword(&'a PendingPasswordRequest),
}

pub struct Session<G: Gateway> {
    gateway: G,
    phase: Phase,
    coordinator: PasswordRetryCoordinator,
    history: HistoryView,
    tokens: RequestToken,
    error: Option<String>,
}

impl<G: Gateway> Session<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            phase: Phase::Empty,
            coordinator: PasswordRetryCoordinator::default(),
            history: HistoryView::default(),
            tokens: RequestToken::default(),
            error: None,
        }
    }

    /// Loads the recent-files list once at startup.
    pub fn start(&mut self) -> RequestToken {
        self.refresh_history()
    }

    pub fn state(&self) -> SessionState<'_> {
        if let Some(pending) = self.coordinator.pending() {
            return SessionState::AwaitingPassword(pending);
        }
        match &self.phase {
            Phase::Empty => SessionState::Empty,
            Phase::Opening { path, .. } => SessionState::Opening {
                path: path.as_deref(),
            },
            Phase::Open(handle) => SessionState::Open(handle),
        }
    }

    /// Text of the last failed open, if the user has not moved on since.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_opening(&self) -> bool {
        matches!(self.phase, Phase::Opening { .. })
    }

    /// Starts opening `path`, or lets the backend ask for a file when it is
    /// `None`. Whatever was shown or pending before is dropped immediately.
    pub fn open(
        &mut self,
        path: Option<String>,
        password: Password,
    ) -> Result<RequestToken, SessionError> {
        self.coordinator.cancel();
        self.error = None;

        if path.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.phase = Phase::Empty;
            self.error = Some(SessionError::EmptyPath.to_string());
            return Err(SessionError::EmptyPath);
        }

        if let Phase::Opening { token, .. } = &self.phase {
            info!("Open {} superseded by a new request", token);
        }
        Ok(self.issue_open(OpenRequest::new(path, password)))
    }

    /// Resubmits the pending archive with `password`. The pending request is
    /// cleared before the new request goes out.
    pub fn submit_password(&mut self, password: Password) -> Result<RequestToken, SessionError> {
        if self.is_opening() {
            return Err(SessionError::RequestInFlight);
        }
        let pending = self
            .coordinator
            .take()
            .ok_or(SessionError::NoPendingPassword)?;

        self.error = None;
        Ok(self.issue_open(OpenRequest::new(Some(pending.path), password)))
    }

    /// Dismisses the prompt without contacting the backend.
    pub fn cancel_password(&mut self) -> bool {
        if !self.coordinator.cancel() {
            return false;
        }
        self.phase = Phase::Empty;
        true
    }

    /// Reopens the recent file at `index`, without a password.
    pub fn select_history(&mut self, index: usize) -> Result<RequestToken, SessionError> {
        let path = self
            .history
            .get(index)
            .map(|entry| entry.path.clone())
            .ok_or(SessionError::UnknownHistoryEntry(index))?;
        self.open(Some(path), Password::default())
    }

    pub fn refresh_history(&mut self) -> RequestToken {
        let token = self.tokens.advance();
        self.gateway.refresh_history(token);
        token
    }

    pub fn handle(&mut self, event: GatewayEvent) {
        match event {
            GatewayEvent::Opened { token, result } => self.on_opened(token, result),
            GatewayEvent::Refreshed { token, result } => self.history.apply(token, result),
        }
    }

    /// Applies every event already waiting on `events`. Returns how many.
    pub fn pump(&mut self, events: &Receiver<GatewayEvent>) -> usize {
        let mut handled = 0;
        while let Ok(event) = events.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    fn issue_open(&mut self, request: OpenRequest) -> RequestToken {
        let token = self.tokens.advance();
        self.phase = Phase::Opening {
            token,
            path: request.path.clone(),
        };
        self.gateway.open_archive(token, request);
        token
    }

    fn on_opened(&mut self, token: RequestToken, result: Result<ArchiveHandle, OpenError>) {
        match &self.phase {
            Phase::Opening { token: current, .. } if *current == token => {}
            _ => {
                debug!("Discarding response to superseded open {}", token);
                return;
            }
        }

        match result {
            Ok(handle) => {
                info!("Opened {} ({} entries)", handle.path, handle.entries.len());
                self.phase = Phase::Open(handle);
                self.refresh_history();
            }
            Err(OpenError::PasswordRequired { path, reason }) => {
                self.phase = Phase::Empty;
                self.coordinator.capture(path, reason);
            }
            Err(OpenError::Failed { message }) => {
                warn!("Open {} failed: {}", token, message);
                self.phase = Phase::Empty;
                self.error = Some(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefreshError;
    use crate::models::{ArchiveMeta, HistoryEntry};
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Open {
            token: RequestToken,
            path: Option<String>,
            password: Option<String>,
        },
        Refresh(RequestToken),
    }

    #[derive(Default)]
    struct RecordingGateway {
        calls: RefCell<Vec<Call>>,
    }

    impl Gateway for RecordingGateway {
        fn open_archive(&self, token: RequestToken, request: OpenRequest) {
            self.calls.borrow_mut().push(Call::Open {
                token,
                path: request.path,
                password: request.password.into_inner(),
            });
        }

        fn refresh_history(&self, token: RequestToken) {
            self.calls.borrow_mut().push(Call::Refresh(token));
        }
    }

    fn session() -> Session<RecordingGateway> {
        Session::new(RecordingGateway::default())
    }

    fn calls(session: &Session<RecordingGateway>) -> Vec<Call> {
        session.gateway().calls.borrow().clone()
    }

    fn handle(path: &str, entries: &[&str]) -> ArchiveHandle {
        ArchiveHandle {
            path: path.to_string(),
            meta: ArchiveMeta {
                name: crate::utils::file_name_of(path),
                size_compressed: "1 bytes".into(),
                size_uncompressed: "2 bytes".into(),
            },
            entries: entries.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn opened(token: RequestToken, result: Result<ArchiveHandle, OpenError>) -> GatewayEvent {
        GatewayEvent::Opened { token, result }
    }

    fn password_required(path: &str) -> Result<ArchiveHandle, OpenError> {
        Err(OpenError::PasswordRequired {
            path: path.to_string(),
            reason: None,
        })
    }

    fn pw(value: &str) -> Password {
        Password::from(value.to_string())
    }

    #[test]
    fn picker_open_then_password_then_success() {
        let mut session = session();
        let first = session.open(None, Password::default()).unwrap();
        assert_eq!(session.state(), SessionState::Opening { path: None });

        session.handle(opened(first, password_required("/x.zip")));
        match session.state() {
            SessionState::AwaitingPassword(pending) => assert_eq!(pending.path, "/x.zip"),
            other => panic!("unexpected state {:?}", other),
        }

        let retry = session.submit_password(pw("hunter2")).unwrap();
        assert_eq!(
            calls(&session).last(),
            Some(&Call::Open {
                token: retry,
                path: Some("/x.zip".into()),
                password: Some("hunter2".into()),
            })
        );

        session.handle(opened(retry, Ok(handle("/x.zip", &["a.txt", "b.txt"]))));
        match session.state() {
            SessionState::Open(archive) => assert_eq!(archive.entries, vec!["a.txt", "b.txt"]),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(matches!(calls(&session).last(), Some(Call::Refresh(_))));
    }

    #[test]
    fn failure_leaves_session_empty_with_message() {
        let mut session = session();
        let token = session.open(Some("/y.zip".into()), Password::default()).unwrap();
        session.handle(opened(
            token,
            Err(OpenError::Failed {
                message: "corrupt archive".into(),
            }),
        ));

        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.error(), Some("corrupt archive"));
        assert_eq!(calls(&session).len(), 1);
    }

    #[test]
    fn cancel_returns_to_empty_without_backend_call() {
        let mut session = session();
        let token = session.open(Some("/x.zip".into()), Password::default()).unwrap();
        session.handle(opened(token, password_required("/x.zip")));
        let before = calls(&session).len();

        assert!(session.cancel_password());
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(calls(&session).len(), before);
        assert!(!session.cancel_password());
    }

    #[test]
    fn failed_retry_creates_fresh_pending_request() {
        let mut session = session();
        let token = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        session.handle(opened(token, password_required("/a.zip")));

        let retry = session.submit_password(pw("wrong")).unwrap();
        assert_eq!(session.state(), SessionState::Opening { path: Some("/a.zip") });
        assert_eq!(
            session.submit_password(pw("again")),
            Err(SessionError::RequestInFlight)
        );

        session.handle(opened(
            retry,
            Err(OpenError::PasswordRequired {
                path: "/a.zip".into(),
                reason: Some("invalid password".into()),
            }),
        ));
        match session.state() {
            SessionState::AwaitingPassword(pending) => {
                assert_eq!(pending.path, "/a.zip");
                assert_eq!(pending.reason.as_deref(), Some("invalid password"));
            }
            other => panic!("unexpected state {:?}", other),
        }

        let second = session.submit_password(pw("right")).unwrap();
        assert!(second > retry);
    }

    #[test]
    fn submit_without_prompt_is_rejected() {
        let mut session = session();
        assert_eq!(
            session.submit_password(pw("x")),
            Err(SessionError::NoPendingPassword)
        );
        assert!(calls(&session).is_empty());
    }

    #[test]
    fn newer_open_discards_older_response() {
        let mut session = session();
        let a = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        let b = session.open(Some("/b.zip".into()), Password::default()).unwrap();
        assert_eq!(session.state(), SessionState::Opening { path: Some("/b.zip") });

        session.handle(opened(a, Ok(handle("/a.zip", &["old.txt"]))));
        assert_eq!(session.state(), SessionState::Opening { path: Some("/b.zip") });

        session.handle(opened(b, Ok(handle("/b.zip", &["new.txt"]))));
        match session.state() {
            SessionState::Open(archive) => assert_eq!(archive.path, "/b.zip"),
            other => panic!("unexpected state {:?}", other),
        }

        // A late password demand for the superseded request must not raise a prompt.
        session.handle(opened(a, password_required("/a.zip")));
        assert!(matches!(session.state(), SessionState::Open(_)));
    }

    #[test]
    fn reopening_hides_current_archive_immediately() {
        let mut session = session();
        let first = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        session.handle(opened(first, Ok(handle("/a.zip", &["a.txt"]))));

        session.open(None, Password::default()).unwrap();
        assert_eq!(session.state(), SessionState::Opening { path: None });
    }

    #[test]
    fn empty_path_is_reported_without_backend_call() {
        let mut session = session();
        assert_eq!(
            session.open(Some(String::new()), Password::default()),
            Err(SessionError::EmptyPath)
        );
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.error(), Some("no archive path given"));
        assert!(calls(&session).is_empty());
    }

    #[test]
    fn new_open_discards_pending_prompt() {
        let mut session = session();
        let token = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        session.handle(opened(token, password_required("/a.zip")));

        session.open(Some("/b.zip".into()), Password::default()).unwrap();
        assert_eq!(session.state(), SessionState::Opening { path: Some("/b.zip") });
        assert!(!session.cancel_password(), "prompt should already be gone");
    }

    #[test]
    fn selecting_history_opens_without_password() {
        let mut session = session();
        let refresh = session.start();
        session.handle(GatewayEvent::Refreshed {
            token: refresh,
            result: Ok(vec![HistoryEntry {
                name: "r.zip".into(),
                path: "/r.zip".into(),
            }]),
        });

        let token = session.select_history(0).unwrap();
        assert_eq!(
            calls(&session),
            vec![
                Call::Refresh(refresh),
                Call::Open {
                    token,
                    path: Some("/r.zip".into()),
                    password: None,
                },
            ]
        );
        assert_eq!(
            session.select_history(3),
            Err(SessionError::UnknownHistoryEntry(3))
        );
    }

    #[test]
    fn refresh_results_only_touch_history() {
        let mut session = session();
        let first = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        session.handle(opened(first, Ok(handle("/a.zip", &["a.txt"]))));
        let refresh = match calls(&session).last() {
            Some(Call::Refresh(token)) => *token,
            other => panic!("expected refresh, got {:?}", other),
        };

        session.open(Some("/b.zip".into()), Password::default()).unwrap();
        session.handle(GatewayEvent::Refreshed {
            token: refresh,
            result: Ok(vec![HistoryEntry {
                name: "a.zip".into(),
                path: "/a.zip".into(),
            }]),
        });

        assert_eq!(session.state(), SessionState::Opening { path: Some("/b.zip") });
        assert_eq!(session.history().entries().len(), 1);

        let failing = session.refresh_history();
        session.handle(GatewayEvent::Refreshed {
            token: failing,
            result: Err(RefreshError::Failed {
                message: "busy".into(),
            }),
        });
        assert_eq!(session.history().entries().len(), 1);
    }

    #[test]
    fn empty_password_is_sent_as_absent() {
        let mut session = session();
        let token = session.open(Some("/a.zip".into()), Password::default()).unwrap();
        session.handle(opened(token, password_required("/a.zip")));

        session.submit_password(pw("")).unwrap();
        assert!(matches!(
            calls(&session).last(),
            Some(Call::Open { password: None, .. })
        ));
    }
}
