//! Question answering about the current job.
//!
//! [`QuestionAnswerer::ask_question`] always returns an answer. Richer,
//! context-aware fallbacks built from local issue data belong to the UI layer.

use quality_lens_core::{ErrorState, JobId};
use tokio::sync::watch;

use crate::services::operation::OperationState;
use crate::services::session::AnalysisSession;

pub const NO_JOB_ANSWER: &str = "Please start an analysis first to ask questions about your code.";
pub const FALLBACK_ANSWER: &str =
    "Sorry, I couldn't process your question right now. Please try again.";

pub struct QuestionAnswerer {
    session: AnalysisSession,
    state: watch::Sender<OperationState>,
}

impl QuestionAnswerer {
    pub fn new(session: &AnalysisSession) -> Self {
        let (state, _) = watch::channel(OperationState::default());
        Self {
            session: session.clone(),
            state,
        }
    }

    pub async fn ask_question(&self, question: &str) -> String {
        let Some(job_id) = self.session.current_job() else {
            return NO_JOB_ANSWER.to_string();
        };
        self.ask_about(question, &job_id).await
    }

    async fn ask_about(&self, question: &str, job_id: &JobId) -> String {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error.clear();
        });

        let result = self.session.api().ask_question(question, job_id).await;
        match result {
            Ok(answer) => {
                self.state.send_modify(|s| s.loading = false);
                answer
            }
            Err(fault) => {
                tracing::warn!(job_id = %job_id, error = %fault, "question failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = ErrorState::from_raw(&fault);
                });
                FALLBACK_ANSWER.to_string()
            }
        }
    }

    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }
}
