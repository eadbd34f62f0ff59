use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{AnalysisResult, ImagePayload, NutritionEntry, NutritionFacts, RequestStatus};
use crate::services::analysis::{AnalysisError, FoodAnalyzer};
use crate::services::intake::{self, ImageCandidate, IntakeError};
use crate::services::nutrition;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error("no image selected")]
    NoImageSelected,
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        status: RequestStatus,
        action: &'static str,
    },
    #[error(transparent)]
    Rejected(#[from] IntakeError),
}

/// Locally held copy of the selected image, released when replaced or reset.
#[derive(Debug)]
pub struct Preview {
    image: ImagePayload,
}

impl Preview {
    fn acquire(image: ImagePayload) -> Self {
        log::debug!("🖼️ Preview acquired ({} bytes)", image.byte_len());
        Self { image }
    }

    pub fn image(&self) -> &ImagePayload {
        &self.image
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        log::debug!("🧹 Preview released ({} bytes)", self.image.byte_len());
    }
}

#[derive(Debug)]
pub enum SessionState {
    Idle { selected: Option<Preview> },
    Loading { preview: Preview },
    Success { preview: Preview, result: AnalysisResult },
    Error { preview: Option<Preview>, message: String },
}

impl SessionState {
    pub fn status(&self) -> RequestStatus {
        match self {
            SessionState::Idle { .. } => RequestStatus::Idle,
            SessionState::Loading { .. } => RequestStatus::Loading,
            SessionState::Success { .. } => RequestStatus::Success,
            SessionState::Error { .. } => RequestStatus::Error,
        }
    }
}

/// Request lifecycle for one user: idle -> loading -> success | error -> idle.
///
/// Every transition is guarded by the current state; a rejected action
/// leaves the state exactly as it was.
#[derive(Debug)]
pub struct AnalysisSession {
    state: SessionState,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle { selected: None },
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.state.status()
    }

    /// Choose a new image. Allowed while idle or after an error; the
    /// previous preview is released.
    pub fn select_image(&mut self, candidate: ImageCandidate) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle { .. } | SessionState::Error { .. } => {}
            SessionState::Loading { .. } => return Err(SessionError::Busy),
            SessionState::Success { .. } => {
                return Err(SessionError::InvalidTransition {
                    status: RequestStatus::Success,
                    action: "select an image",
                })
            }
        }

        let image = intake::accept(candidate)?;
        self.state = SessionState::Idle {
            selected: Some(Preview::acquire(image)),
        };
        Ok(())
    }

    /// Move to loading and hand back the image to analyze.
    pub fn begin_analysis(&mut self) -> Result<ImagePayload, SessionError> {
        let previous = std::mem::replace(&mut self.state, SessionState::Idle { selected: None });

        let preview = match previous {
            SessionState::Idle {
                selected: Some(preview),
            }
            | SessionState::Error {
                preview: Some(preview),
                ..
            } => preview,
            other => {
                let err = match other.status() {
                    RequestStatus::Loading => SessionError::Busy,
                    RequestStatus::Success => SessionError::InvalidTransition {
                        status: RequestStatus::Success,
                        action: "start an analysis",
                    },
                    _ => SessionError::NoImageSelected,
                };
                self.state = other;
                return Err(err);
            }
        };

        let image = preview.image().clone();
        self.state = SessionState::Loading { preview };
        log::info!("⏳ Analysis started");
        Ok(image)
    }

    /// Record the outcome of the in-flight analysis.
    pub fn finish(&mut self, outcome: Result<AnalysisResult, AnalysisError>) -> Result<(), SessionError> {
        let previous = std::mem::replace(&mut self.state, SessionState::Idle { selected: None });

        let preview = match previous {
            SessionState::Loading { preview } => preview,
            other => {
                let status = other.status();
                self.state = other;
                return Err(SessionError::InvalidTransition {
                    status,
                    action: "finish an analysis",
                });
            }
        };

        self.state = match outcome {
            Ok(result) => {
                log::info!("✅ Analysis succeeded: {}", result.food_name);
                SessionState::Success { preview, result }
            }
            Err(e) => {
                log::warn!("⚠️ Analysis failed: {}", e);
                SessionState::Error {
                    preview: Some(preview),
                    message: e.to_string(),
                }
            }
        };
        Ok(())
    }

    /// Back to an empty idle state. There is no cancel, so this is refused
    /// while a request is in flight.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if let SessionState::Loading { .. } = self.state {
            return Err(SessionError::Busy);
        }
        self.state = SessionState::Idle { selected: None };
        Ok(())
    }

    pub fn view(&self) -> SessionView {
        let (preview, result, error) = match &self.state {
            SessionState::Idle { selected } => (selected.as_ref(), None, None),
            SessionState::Loading { preview } => (Some(preview), None, None),
            SessionState::Success { preview, result } => (Some(preview), Some(result), None),
            SessionState::Error { preview, message } => (preview.as_ref(), None, Some(message.clone())),
        };

        SessionView {
            status: self.status(),
            result: result.map(AnalysisView::from_result),
            preview: preview.map(|p| p.image().as_str().to_string()),
            error,
        }
    }
}

/// Display-ready analysis result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisView {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub nutrition_entries: Vec<NutritionEntry>,
    /// Raw nutrition text, kept when no entries could be parsed from it.
    pub nutrition_text: Option<String>,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let nutrition_entries = nutrition::normalize(&result.nutrition);
        let nutrition_text = match &result.nutrition {
            NutritionFacts::Text(text) if nutrition_entries.is_empty() && !result.nutrition.is_empty() => {
                Some(text.clone())
            }
            _ => None,
        };

        Self {
            result: result.clone(),
            nutrition_entries,
            nutrition_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub status: RequestStatus,
    pub result: Option<AnalysisView>,
    pub preview: Option<String>,
    pub error: Option<String>,
}

/// Shares one session between request handlers and drives the analyzer.
///
/// The lock is only held for state transitions, never across the provider
/// call, so a second submission sees `loading` and is turned away.
#[derive(Clone)]
pub struct SessionController {
    session: Arc<Mutex<AnalysisSession>>,
    analyzer: Arc<FoodAnalyzer>,
}

impl SessionController {
    pub fn new(analyzer: Arc<FoodAnalyzer>) -> Self {
        Self {
            session: Arc::new(Mutex::new(AnalysisSession::new())),
            analyzer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AnalysisSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn view(&self) -> SessionView {
        self.lock().view()
    }

    pub fn select_image(&self, candidate: ImageCandidate) -> Result<SessionView, SessionError> {
        let mut session = self.lock();
        session.select_image(candidate)?;
        Ok(session.view())
    }

    /// Run one analysis. The provider call and the final transition run on
    /// their own task, so the session leaves `loading` even when the caller
    /// is dropped mid-flight.
    pub async fn analyze(&self) -> Result<SessionView, SessionError> {
        let image = self.lock().begin_analysis()?;

        let controller = self.clone();
        let task = tokio::spawn(async move {
            let outcome = controller.analyzer.analyze(&image).await;

            let mut session = controller.lock();
            session.finish(outcome)?;
            Ok::<_, SessionError>(session.view())
        });

        match task.await {
            Ok(view) => view,
            Err(e) => {
                log::error!("❌ Analysis task aborted: {}", e);
                let mut session = self.lock();
                session.finish(Err(AnalysisError::Failed))?;
                Ok(session.view())
            }
        }
    }

    pub fn reset(&self) -> Result<SessionView, SessionError> {
        let mut session = self.lock();
        session.reset()?;
        log::info!("🔄 Session reset");
        Ok(session.view())
    }
}
