//! Client-side photo analysis session: file selection, preview lifetime, the
//! single in-flight request to the analysis service, and the mapping of its
//! outcome into renderable state.

use std::{path::Path, sync::Arc};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{info, warn};

pub mod analysis_service;
pub mod error;
pub mod preview;
pub mod selected_file;
pub mod session;
pub mod settings;

pub use analysis_service::{AnalysisService, HttpAnalysisService};
pub use error::ClientError;
pub use preview::{InMemoryPreviews, PreviewBackend, PreviewGuard};
pub use selected_file::{SelectedFile, SelectedFileError};
pub use session::{PendingAnalysis, Session, SessionSnapshot, SessionState};
pub use settings::{load_settings, load_settings_from, Settings};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Owns one [`Session`] and runs its analysis requests on the tokio runtime.
///
/// Every transition publishes a fresh [`SessionSnapshot`] to subscribers.
pub struct SessionController {
    service: Arc<dyn AnalysisService>,
    session: Arc<Mutex<Session>>,
    events: broadcast::Sender<SessionSnapshot>,
}

impl SessionController {
    pub fn new(service: Arc<dyn AnalysisService>, previews: Arc<dyn PreviewBackend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            session: Arc::new(Mutex::new(Session::new(previews))),
            events,
        }
    }

    /// Controller talking to the configured backend over HTTP.
    pub fn with_http(
        settings: &Settings,
        previews: Arc<dyn PreviewBackend>,
    ) -> Result<Self, ClientError> {
        let service = HttpAnalysisService::new(settings)?;
        info!(endpoint = service.endpoint(), "session: using http analysis service");
        Ok(Self::new(Arc::new(service), previews))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn select_file(&self, file: Option<SelectedFile>) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        let file_name = file.as_ref().map(|f| f.file_name().to_string());
        let applied = session.select_file(file);
        let snapshot = session.snapshot();
        drop(session);

        if applied {
            info!(file_name = file_name.as_deref(), "session: file selected");
            let _ = self.events.send(snapshot.clone());
        }
        snapshot
    }

    /// Loads `path` from disk and selects it. A file that cannot be read
    /// leaves the session untouched.
    pub async fn select_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<SessionSnapshot, ClientError> {
        let file = SelectedFile::from_path(path).await?;
        Ok(self.select_file(Some(file)).await)
    }

    /// Starts the analysis request in the background and returns at once.
    ///
    /// Returns `None` without side effects when nothing is selected or a
    /// request is already in flight. The handle resolves to the snapshot taken
    /// right after the outcome was applied.
    pub async fn start_analysis(&self) -> Option<JoinHandle<SessionSnapshot>> {
        let mut session = self.session.lock().await;
        let pending = session.begin_analysis()?;
        let request_id = pending.request_id();

        info!(
            %request_id,
            file_name = pending.file().file_name(),
            size_bytes = pending.file().len(),
            "session: analysis started"
        );
        let _ = self.events.send(session.snapshot());

        // The abort handle is attached before the session lock is released.
        let handle = tokio::spawn(run_analysis(
            Arc::clone(&self.session),
            Arc::clone(&self.service),
            self.events.clone(),
            pending,
        ));
        session.attach_task(request_id, handle.abort_handle());
        drop(session);
        Some(handle)
    }

    /// Same transition as [`Self::start_analysis`], awaiting the outcome.
    pub async fn analyze(&self) -> SessionSnapshot {
        match self.start_analysis().await {
            Some(handle) => match handle.await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(%error, "session: analysis task ended early");
                    self.snapshot().await
                }
            },
            None => self.snapshot().await,
        }
    }

    /// Aborts any in-flight request, releases the preview and returns to
    /// `Idle`.
    pub async fn shutdown(&self) -> SessionSnapshot {
        let mut session = self.session.lock().await;
        session.reset();
        let snapshot = session.snapshot();
        drop(session);

        info!("session: shut down");
        let _ = self.events.send(snapshot.clone());
        snapshot
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        // A held lock means the task is applying its outcome and about to end.
        if let Ok(mut session) = self.session.try_lock() {
            session.abort_task();
        }
    }
}

async fn run_analysis(
    session: Arc<Mutex<Session>>,
    service: Arc<dyn AnalysisService>,
    events: broadcast::Sender<SessionSnapshot>,
    pending: PendingAnalysis,
) -> SessionSnapshot {
    let request_id = pending.request_id();
    let outcome = service.analyze(pending.file()).await;
    match &outcome {
        Ok(result) => info!(%request_id, score = result.score, "session: analysis succeeded"),
        Err(error) => warn!(
            %request_id,
            kind = error.kind(),
            %error,
            "session: analysis failed"
        ),
    }

    let mut guard = session.lock().await;
    let applied = guard.complete(request_id, outcome);
    let snapshot = guard.snapshot();
    drop(guard);

    if applied {
        let _ = events.send(snapshot.clone());
    } else {
        info!(%request_id, "session: discarding outcome of superseded request");
    }
    snapshot
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
