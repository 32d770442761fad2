//! Request Gateway: the typed boundary between the session and the archive
//! backend.
//!
//! Calls never block the caller. Each result comes back later as a
//! [`GatewayEvent`] tagged with the token it was issued under.

use crate::backend::{ArchiveBackend, BackendError, History, OpenSuccess};
use crate::error::{OpenError, RefreshError};
use crate::models::{ArchiveHandle, ArchiveMeta, HistoryEntry, HistoryList, OpenRequest, RequestToken};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, warn};

const FALLBACK_OPEN_MESSAGE: &str = "could not open archive";

#[derive(Debug, Clone)]
pub enum GatewayEvent {
    Opened {
        token: RequestToken,
        result: Result<ArchiveHandle, OpenError>,
    },
    Refreshed {
        token: RequestToken,
        result: Result<HistoryList, RefreshError>,
    },
}

pub trait Gateway {
    fn open_archive(&self, token: RequestToken, request: OpenRequest);
    fn refresh_history(&self, token: RequestToken);
}

pub fn translate_open(response: Result<OpenSuccess, BackendError>) -> Result<ArchiveHandle, OpenError> {
    match response {
        Ok(success) => Ok(ArchiveHandle {
            path: success.path,
            meta: ArchiveMeta {
                name: success.meta.name,
                size_compressed: success.meta.compressed,
                size_uncompressed: success.meta.size,
            },
            entries: success.contents,
        }),
        Err(err) if err.password_required => Err(OpenError::PasswordRequired {
            path: err.path,
            reason: Some(err.message).filter(|m| !m.is_empty()),
        }),
        Err(err) if err.message.is_empty() => Err(OpenError::Failed {
            message: FALLBACK_OPEN_MESSAGE.to_string(),
        }),
        Err(err) => Err(OpenError::Failed {
            message: err.message,
        }),
    }
}

pub fn translate_refresh(response: Result<History, BackendError>) -> Result<HistoryList, RefreshError> {
    response
        .map(|history| {
            history
                .history
                .into_iter()
                .map(|item| HistoryEntry {
                    name: item.name,
                    path: item.path,
                })
                .collect()
        })
        .map_err(|err| RefreshError::Failed {
            message: err.message,
        })
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Runs every backend call on its own worker thread and reports back over a
/// channel.
pub struct ThreadedGateway {
    backend: Arc<dyn ArchiveBackend>,
    events: Sender<GatewayEvent>,
    waker: Option<Waker>,
}

impl ThreadedGateway {
    pub fn new(backend: Arc<dyn ArchiveBackend>) -> (Self, Receiver<GatewayEvent>) {
        let (events, receiver) = unbounded();
        (
            Self {
                backend,
                events,
                waker: None,
            },
            receiver,
        )
    }

    /// Called after every delivered event, e.g. to request a repaint.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    fn dispatch(
        &self,
        job: impl FnOnce(&dyn ArchiveBackend) -> GatewayEvent + Send + 'static,
        on_panic: impl FnOnce(String) -> GatewayEvent + Send + 'static,
    ) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let waker = self.waker.clone();

        thread::spawn(move || {
            let event = match panic::catch_unwind(AssertUnwindSafe(|| job(backend.as_ref()))) {
                Ok(event) => event,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    error!("Archive backend panicked: {}", message);
                    on_panic(message)
                }
            };
            if events.send(event).is_err() {
                warn!("Gateway event dropped: receiver is gone");
                return;
            }
            if let Some(waker) = waker {
                waker();
            }
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause");
    format!("archive backend crashed: {}", detail)
}

impl Gateway for ThreadedGateway {
    fn open_archive(&self, token: RequestToken, request: OpenRequest) {
        debug!("Dispatching open {} for {:?}", token, request.path);
        self.dispatch(
            move |backend| GatewayEvent::Opened {
                token,
                result: translate_open(
                    backend.open_file(request.path, request.password.into_inner()),
                ),
            },
            move |message| GatewayEvent::Opened {
                token,
                result: Err(OpenError::Failed { message }),
            },
        );
    }

    fn refresh_history(&self, token: RequestToken) {
        debug!("Dispatching refresh {}", token);
        self.dispatch(
            move |backend| GatewayEvent::Refreshed {
                token,
                result: translate_refresh(backend.refresh()),
            },
            move |message| GatewayEvent::Refreshed {
                token,
                result: Err(RefreshError::Failed { message }),
            },
        );
    }
}
