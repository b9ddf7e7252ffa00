//! The photo analysis session state machine.
//!
//! [`Session`] is synchronous and owns everything a single attempt needs: the
//! selected file, its preview reference and the id of the request in flight.
//! [`crate::SessionController`] drives it from async code.

use std::sync::Arc;

use serde::Serialize;
use shared::{domain::AnalysisResult, error::AnalysisError};
use tokio::task::AbortHandle;
use tracing::debug;
use uuid::Uuid;

use crate::{
    preview::{PreviewBackend, PreviewGuard},
    selected_file::SelectedFile,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Selected,
    Uploading,
    Success { result: AnalysisResult },
    Failed { error: String },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Selected => "selected",
            SessionState::Uploading => "uploading",
            SessionState::Success { .. } => "success",
            SessionState::Failed { .. } => "failed",
        }
    }
}

/// Read-only view of a session handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub state: SessionState,
    pub file_name: Option<String>,
    pub preview_url: Option<String>,
}

impl SessionSnapshot {
    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Uploading
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            SessionState::Success { result } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Work order for one analysis request, produced by [`Session::begin_analysis`].
#[derive(Debug, Clone)]
pub struct PendingAnalysis {
    request_id: Uuid,
    file: SelectedFile,
}

impl PendingAnalysis {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }
}

pub struct Session {
    state: SessionState,
    selected: Option<SelectedFile>,
    preview: Option<PreviewGuard>,
    previews: Arc<dyn PreviewBackend>,
    pending: Option<Uuid>,
    task: Option<AbortHandle>,
}

impl Session {
    pub fn new(previews: Arc<dyn PreviewBackend>) -> Self {
        Self {
            state: SessionState::Idle,
            selected: None,
            preview: None,
            previews,
            pending: None,
            task: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview.as_ref().map(PreviewGuard::url)
    }

    pub fn is_uploading(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns `true` when the selection was applied. `None` and selections
    /// made while a request is in flight are ignored.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> bool {
        let Some(file) = file else {
            return false;
        };
        if self.is_uploading() {
            debug!(
                file_name = file.file_name(),
                "session: ignoring selection while uploading"
            );
            return false;
        }

        // The old reference must be gone before the new one exists.
        drop(self.preview.take());
        self.preview = Some(PreviewGuard::acquire(Arc::clone(&self.previews), &file));
        self.selected = Some(file);
        self.state = SessionState::Selected;
        true
    }

    /// Moves to `Uploading` and hands back the request to issue, or `None`
    /// when nothing is selected or a request is already in flight.
    pub fn begin_analysis(&mut self) -> Option<PendingAnalysis> {
        if self.is_uploading() {
            debug!("session: analysis already in flight");
            return None;
        }
        let file = self.selected.clone()?;
        let request_id = Uuid::new_v4();
        self.pending = Some(request_id);
        self.state = SessionState::Uploading;
        Some(PendingAnalysis { request_id, file })
    }

    /// Records the task running `request_id` so that [`Session::reset`] can
    /// abort it. Handles for any other request are aborted right away.
    pub fn attach_task(&mut self, request_id: Uuid, task: AbortHandle) {
        if self.pending == Some(request_id) {
            self.task = Some(task);
        } else {
            task.abort();
        }
    }

    pub fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Applies the outcome of the request `request_id`. Outcomes for any
    /// other request are dropped and `false` is returned.
    pub fn complete(
        &mut self,
        request_id: Uuid,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if self.pending != Some(request_id) {
            return false;
        }
        self.pending = None;
        self.task = None;
        self.state = match outcome {
            Ok(result) => SessionState::Success { result },
            Err(err) => SessionState::Failed {
                error: err.user_message(),
            },
        };
        true
    }

    /// Returns to `Idle`, forgetting the file and releasing its preview.
    pub fn reset(&mut self) {
        self.abort_task();
        self.pending = None;
        self.preview = None;
        self.selected = None;
        self.state = SessionState::Idle;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            file_name: self.selected.as_ref().map(|f| f.file_name().to_string()),
            preview_url: self.preview_url().map(str::to_string),
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
