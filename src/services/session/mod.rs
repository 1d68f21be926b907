//! Analysis Session
//!
//! Owns the current job identifier and its latest status snapshot, and runs
//! the poll loop while the job is non-terminal.
//!
//! Every fetch captures a ticket `(generation, seq)` when it is issued. The
//! generation changes whenever the current job changes; `seq` grows with every
//! fetch. A response is applied only while its generation is current and its
//! `seq` is newer than the last applied one, so a late answer for a superseded
//! job (or an older tick) never overwrites newer state.
//!
//! `loading` tracks the initial and refresh fetches still outstanding, so it
//! drops back to `false` even when such a response loses to a newer tick.
//! Once disposed, the session ignores every later call and response.

mod poller;
mod state;

pub use poller::PollHandle;
pub use state::{PollConfig, SessionPhase, SessionView};

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use chrono::Utc;
use quality_lens_client::AnalysisApi;
use quality_lens_core::{ErrorState, Fault, JobId, JobStatusSnapshot, StartAnalysisRequest};
use tokio::sync::watch;

use crate::services::network::ReconnectAction;
use crate::services::operation::{Callbacks, FormState, FormSubmission};

/// Where a fetch came from; decides how a fault is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchOrigin {
    Initial,
    Poll,
    Refresh,
}

#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    seq: u64,
    job_id: JobId,
}

#[derive(Default)]
struct Current {
    generation: u64,
    job_id: Option<JobId>,
    last_applied: u64,
    // Initial and refresh fetches not yet answered
    pending: usize,
    disposed: bool,
    poll: Option<PollHandle>,
}

impl Current {
    fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(PollHandle::is_active)
    }

    fn stop_polling(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel();
        }
    }
}

struct SessionShared {
    api: Arc<dyn AnalysisApi>,
    config: PollConfig,
    view: watch::Sender<SessionView>,
    job: watch::Sender<Option<JobId>>,
    current: Mutex<Current>,
    seq: AtomicU64,
    form: FormSubmission,
}

impl SessionShared {
    fn current(&self) -> MutexGuard<'_, Current> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make `job_id` current. Returns the ticket for its initial fetch.
    fn select(&self, job_id: Option<JobId>) -> Option<Ticket> {
        let mut current = self.current();
        if current.disposed {
            return None;
        }
        current.stop_polling();
        current.generation += 1;
        current.last_applied = 0;
        current.pending = usize::from(job_id.is_some());
        current.job_id = job_id.clone();

        match &job_id {
            Some(id) => {
                tracing::info!(job_id = %id, "job selected");
                self.view.send_replace(SessionView::loading(id.clone()));
            }
            None => {
                tracing::info!("job cleared");
                self.view.send_replace(SessionView::default());
            }
        }
        self.job.send_replace(job_id.clone());

        job_id.map(|job_id| Ticket {
            generation: current.generation,
            seq: self.next_seq(),
            job_id,
        })
    }

    /// Ticket for another fetch of the current job, if `generation` still names it.
    fn ticket(&self, generation: Option<u64>, origin: FetchOrigin) -> Option<Ticket> {
        let mut current = self.current();
        if current.disposed || generation.is_some_and(|g| g != current.generation) {
            return None;
        }
        let job_id = current.job_id.clone()?;
        if origin != FetchOrigin::Poll {
            current.pending += 1;
            self.view.send_modify(|view| view.loading = true);
        }
        Some(Ticket {
            generation: current.generation,
            seq: self.next_seq(),
            job_id,
        })
    }

    fn apply(
        self: &Arc<Self>,
        ticket: &Ticket,
        result: Result<JobStatusSnapshot, Fault>,
        origin: FetchOrigin,
    ) {
        let mut current = self.current();
        if current.disposed || current.generation != ticket.generation {
            tracing::debug!(job_id = %ticket.job_id, seq = ticket.seq, "discarding status response for superseded job");
            return;
        }
        if origin != FetchOrigin::Poll {
            current.pending = current.pending.saturating_sub(1);
        }
        let loading = current.pending > 0;

        if ticket.seq <= current.last_applied {
            tracing::debug!(job_id = %ticket.job_id, seq = ticket.seq, "discarding stale status response");
            if origin != FetchOrigin::Poll {
                self.view.send_if_modified(|view| {
                    let changed = view.loading != loading;
                    view.loading = loading;
                    changed
                });
            }
            return;
        }
        current.last_applied = ticket.seq;

        match result {
            Ok(snapshot) => {
                let terminal = snapshot.is_terminal();
                let phase = if terminal {
                    current.stop_polling();
                    tracing::info!(job_id = %ticket.job_id, state = ?snapshot.state, "job reached terminal state");
                    SessionPhase::Completed
                } else {
                    if !current.is_polling() {
                        current.poll = Some(self.start_polling(ticket.generation));
                    }
                    SessionPhase::Processing
                };

                self.view.send_modify(|view| {
                    view.data = Some(snapshot);
                    view.loading = loading;
                    view.error.clear();
                    view.phase = phase;
                    view.poll_failures = 0;
                    view.last_updated = Some(Utc::now());
                });
            }
            Err(fault) => match origin {
                FetchOrigin::Initial | FetchOrigin::Refresh => {
                    tracing::warn!(job_id = %ticket.job_id, error = %fault, ?origin, "status fetch failed");
                    self.view.send_modify(|view| {
                        view.error = ErrorState::from_fault(&fault);
                        view.loading = loading;
                        if view.data.is_none() {
                            view.phase = SessionPhase::Failed;
                        }
                    });
                }
                FetchOrigin::Poll => {
                    let max_failures = self.config.max_failures;
                    self.view.send_modify(|view| {
                        view.poll_failures += 1;
                        tracing::warn!(
                            job_id = %ticket.job_id,
                            failures = view.poll_failures,
                            error = %fault,
                            "poll tick failed"
                        );
                        if view.poll_failures >= max_failures {
                            view.error = ErrorState::from_fault(&fault);
                        }
                    });
                }
            },
        }
    }

    fn start_polling(self: &Arc<Self>, generation: u64) -> PollHandle {
        tracing::debug!(generation, "starting poll loop");
        let session: Weak<SessionShared> = Arc::downgrade(self);

        PollHandle::spawn(self.config.interval, move |cancel| {
            let session = session.clone();
            async move {
                let Some(shared) = session.upgrade() else {
                    return ControlFlow::Break(());
                };
                let Some(ticket) = shared.ticket(Some(generation), FetchOrigin::Poll) else {
                    return ControlFlow::Break(());
                };

                let result = tokio::select! {
                    _ = cancel.cancelled() => return ControlFlow::Break(()),
                    result = shared.api.job_status(&ticket.job_id) => result,
                };
                if cancel.is_cancelled() {
                    return ControlFlow::Break(());
                }

                shared.apply(&ticket, result, FetchOrigin::Poll);
                ControlFlow::Continue(())
            }
        })
    }

    async fn fetch(self: &Arc<Self>, ticket: Ticket, origin: FetchOrigin) {
        let result = self.api.job_status(&ticket.job_id).await;
        self.apply(&ticket, result, origin);
    }
}

/// Handle to the analysis session. Clones share the same session.
#[derive(Clone)]
pub struct AnalysisSession {
    shared: Arc<SessionShared>,
}

impl AnalysisSession {
    pub fn new(api: Arc<dyn AnalysisApi>, config: PollConfig) -> Self {
        let (view, _) = watch::channel(SessionView::default());
        let (job, _) = watch::channel(None);
        Self {
            shared: Arc::new(SessionShared {
                api,
                config,
                view,
                job,
                current: Mutex::new(Current::default()),
                seq: AtomicU64::new(0),
                form: FormSubmission::new(),
            }),
        }
    }

    /// Make `job_id` current (or clear it) and load its status.
    pub async fn set_current_job(&self, job_id: Option<JobId>) {
        if let Some(ticket) = self.shared.select(job_id) {
            self.shared.fetch(ticket, FetchOrigin::Initial).await;
        }
    }

    /// Stop polling and reset everything, including the submission state.
    pub fn clear_job(&self) {
        if self.is_disposed() {
            return;
        }
        self.shared.select(None);
        self.shared.form.reset();
    }

    /// Re-fetch the current job's status. Never reschedules an active loop.
    pub async fn refresh(&self) {
        let Some(ticket) = self.shared.ticket(None, FetchOrigin::Refresh) else {
            return;
        };
        tracing::debug!(job_id = %ticket.job_id, "refreshing job status");
        self.shared.fetch(ticket, FetchOrigin::Refresh).await;
    }

    /// Submit a new analysis and make the returned job current.
    ///
    /// Returns `None` when submission failed; the failure is in
    /// [`form_state`](Self::form_state).
    pub async fn start_analysis(&self, request: StartAnalysisRequest) -> Option<JobId> {
        if self.is_disposed() {
            return None;
        }
        let api = self.shared.api.clone();
        let response = self
            .shared
            .form
            .submit(
                || async move { api.start_analysis(&request).await },
                Callbacks::new(),
            )
            .await?;

        tracing::info!(job_id = %response.job_id, "analysis submitted");
        let job_id = response.job_id;
        self.set_current_job(Some(job_id.clone())).await;
        Some(job_id)
    }

    /// Cancel the poll loop and invalidate in-flight fetches for good.
    ///
    /// Later calls on any clone of this session are no-ops.
    pub fn dispose(&self) {
        let mut current = self.shared.current();
        current.stop_polling();
        current.generation += 1;
        current.disposed = true;
        tracing::debug!("session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.current().disposed
    }

    pub fn is_polling(&self) -> bool {
        self.shared.current().is_polling()
    }

    pub fn view(&self) -> SessionView {
        self.shared.view.borrow().clone()
    }

    pub fn current_job(&self) -> Option<JobId> {
        self.shared.job.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.view.subscribe()
    }

    /// Current job identifier only; changes exactly when the job changes.
    pub fn subscribe_job(&self) -> watch::Receiver<Option<JobId>> {
        self.shared.job.subscribe()
    }

    pub fn form_state(&self) -> FormState {
        self.shared.form.state()
    }

    pub(crate) fn api(&self) -> Arc<dyn AnalysisApi> {
        self.shared.api.clone()
    }
}

#[async_trait]
impl ReconnectAction for AnalysisSession {
    async fn run(&self) -> Result<(), Fault> {
        self.refresh().await;
        Ok(())
    }
}
