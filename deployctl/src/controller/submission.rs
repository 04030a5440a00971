//! Submission controller
//!
//! Drives deploy attempts through the [`AttemptFsm`] and owns the single
//! [`PollSession`]. Every state change happens inside [`SubmissionController::step`],
//! one event at a time; network calls run on spawned tasks that report back
//! through the same event queue.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::fsm::{AttemptEvent, AttemptFsm, AttemptState};
use crate::controller::session::{PollSession, ShutdownSignal};
use crate::errors::ClientError;
use crate::form::builder::build;
use crate::form::fields::FormFields;
use crate::http::deployments::DeployApi;
use crate::models::deployment::{AttemptKey, DeployRequest, DeployResult};
use crate::present::Presenter;
use crate::workers::poller;

pub const STATUS_SUBMITTING: &str = "Submitting...";
pub const STATUS_ACCEPTED: &str = "Accepted - build running in background";

/// Status line for a failed submission or a rejected form
pub fn error_status(error: &ClientError) -> String {
    format!("Error: {}", error)
}

fn done_status(result: &DeployResult) -> String {
    format!("Done - repo: {}", result.repo_url().unwrap_or_default())
}

fn complete_status(result: &DeployResult) -> String {
    format!("Build complete - {}", result.repo_url().unwrap_or_default())
}

/// Submission controller options
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub poller: poller::Options,
}

#[derive(Debug)]
enum ControllerEvent {
    Submit(DeployRequest),
    Reset,
    SubmitSettled {
        key: AttemptKey,
        outcome: Result<DeployResult, ClientError>,
    },
    PollCompleted {
        key: AttemptKey,
        result: DeployResult,
    },
    Flush(oneshot::Sender<()>),
}

/// Sends user actions to a [`SubmissionController`]
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    /// Queue a built request for submission
    pub fn submit(&self, request: DeployRequest) -> Result<AttemptKey, ClientError> {
        let key = request.attempt_key();
        self.send(ControllerEvent::Submit(request))?;
        Ok(key)
    }

    /// Build a request from `fields` and queue it.
    ///
    /// A malformed checks or attachments field fails here, before anything
    /// reaches the controller.
    pub fn submit_fields(&self, fields: &FormFields) -> Result<AttemptKey, ClientError> {
        let request = build(fields)?;
        self.submit(request)
    }

    /// Blank the status line
    pub fn reset(&self) -> Result<(), ClientError> {
        self.send(ControllerEvent::Reset)
    }

    /// Wait until every event queued before this call has been handled
    pub async fn flush(&self) -> Result<(), ClientError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.send(ControllerEvent::Flush(done_tx))?;
        done_rx.await.map_err(|_| stopped())
    }

    fn send(&self, event: ControllerEvent) -> Result<(), ClientError> {
        self.tx.send(event).map_err(|_| stopped())
    }
}

fn stopped() -> ClientError {
    ClientError::ControllerError("submission controller is not running".to_string())
}

struct InflightSubmit {
    key: AttemptKey,
    wait_for_result: bool,
    handle: JoinHandle<()>,
}

/// Owns one deploy attempt at a time and its background poll session
pub struct SubmissionController<A: ?Sized, P: ?Sized> {
    api: Arc<A>,
    presenter: Arc<P>,
    options: Options,
    fsm: AttemptFsm,
    session: PollSession,
    inflight: Option<InflightSubmit>,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    state_tx: watch::Sender<AttemptState>,
}

impl<A, P> SubmissionController<A, P>
where
    A: DeployApi + ?Sized + 'static,
    P: Presenter + ?Sized,
{
    pub fn new(api: Arc<A>, presenter: Arc<P>, options: Options) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state_tx, _) = watch::channel(AttemptState::Idle);
        Self {
            api,
            presenter,
            options,
            fsm: AttemptFsm::new(),
            session: PollSession::new(),
            inflight: None,
            events_tx,
            events_rx,
            state_tx,
        }
    }

    /// A handle for queueing user actions
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.events_tx.clone(),
        }
    }

    /// Watch attempt state changes
    pub fn subscribe(&self) -> watch::Receiver<AttemptState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> &AttemptState {
        self.fsm.state()
    }

    /// Failure detail of the last attempt, when it ended in Error
    pub fn error(&self) -> Option<&str> {
        self.fsm.error()
    }

    pub fn poll_session(&self) -> &PollSession {
        &self.session
    }

    /// Wait for the next event and handle it
    pub async fn step(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.on_event(event);
        }
    }

    /// Handle events until `shutdown_signal` fires, then stop all background work
    pub async fn run(mut self, mut shutdown_signal: ShutdownSignal) {
        info!("Submission controller starting...");

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_signal => {
                    info!("Submission controller shutting down...");
                    break;
                }
                event = self.events_rx.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => break,
                },
            }
        }

        self.cancel_inflight();
        self.session.cancel();
    }

    fn on_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Submit(request) => self.on_submit(request),
            ControllerEvent::Reset => self.on_reset(),
            ControllerEvent::SubmitSettled { key, outcome } => self.on_submit_settled(key, outcome),
            ControllerEvent::PollCompleted { key, result } => self.on_poll_completed(key, result),
            ControllerEvent::Flush(done_tx) => {
                let _ = done_tx.send(());
            }
        }
    }

    fn on_submit(&mut self, request: DeployRequest) {
        let key = request.attempt_key();

        // Whatever the previous attempt was doing is superseded
        self.cancel_inflight();
        if let Some(previous) = self.session.cancel() {
            info!(previous = %previous, "Cancelled poll session of superseded attempt");
        }

        self.transition(AttemptEvent::Submit);
        self.presenter.set_status(STATUS_SUBMITTING);
        info!(attempt = %key, wait_for_result = request.wait_for_result, "Submitting deploy request");

        let api = self.api.clone();
        let events_tx = self.events_tx.clone();
        let task_key = key.clone();
        let wait_for_result = request.wait_for_result;
        let handle = tokio::spawn(async move {
            let outcome = api.submit_deploy(&request).await;
            let _ = events_tx.send(ControllerEvent::SubmitSettled {
                key: task_key,
                outcome,
            });
        });

        self.inflight = Some(InflightSubmit {
            key,
            wait_for_result,
            handle,
        });
    }

    fn on_submit_settled(&mut self, key: AttemptKey, outcome: Result<DeployResult, ClientError>) {
        let wait_for_result = match self.inflight.take() {
            Some(inflight) if inflight.key == key => inflight.wait_for_result,
            other => {
                self.inflight = other;
                debug!(attempt = %key, "Dropping response of superseded submission");
                return;
            }
        };

        match outcome {
            Err(e) => {
                warn!(attempt = %key, "Deploy submission failed: {}", e);
                self.transition(AttemptEvent::Failed(e.to_string()));
                self.presenter.set_status(&error_status(&e));
            }
            Ok(result) if wait_for_result && result.is_terminal() => {
                info!(attempt = %key, "Deploy finished synchronously");
                self.transition(AttemptEvent::Completed);
                self.present(&done_status(&result), &result);
            }
            Ok(_) => {
                info!(attempt = %key, "Deploy accepted, polling for result");
                self.transition(AttemptEvent::Accepted);
                self.presenter.set_status(STATUS_ACCEPTED);
                self.start_polling(key);
            }
        }
    }

    fn on_poll_completed(&mut self, key: AttemptKey, result: DeployResult) {
        if !self.session.is_bound_to(&key) {
            debug!(attempt = %key, "Dropping result of superseded poll session");
            return;
        }

        info!(attempt = %key, "Background build complete");
        self.transition(AttemptEvent::Completed);
        self.present(&complete_status(&result), &result);
        self.session.cancel();
    }

    fn on_reset(&mut self) {
        self.presenter.set_status("");
        self.transition(AttemptEvent::Reset);
        if let Some(key) = self.session.key() {
            debug!(attempt = %key, "Reset leaves the active poll session running");
        }
    }

    fn start_polling(&mut self, key: AttemptKey) {
        let api = self.api.clone();
        let events_tx = self.events_tx.clone();
        let options = self.options.poller.clone();
        let task_key = key.clone();

        self.session.start(key, move |shutdown_signal| async move {
            if let Some(result) = poller::run(&options, &*api, &task_key, shutdown_signal).await {
                let _ = events_tx.send(ControllerEvent::PollCompleted {
                    key: task_key,
                    result,
                });
            }
        });
    }

    fn present(&self, status: &str, result: &DeployResult) {
        self.presenter.set_status(status);
        if let Some(pages_url) = result.pages_url() {
            self.presenter.show_preview(pages_url);
        }
    }

    fn cancel_inflight(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            debug!(attempt = %inflight.key, "Aborting in-flight submission");
            inflight.handle.abort();
        }
    }

    fn transition(&mut self, event: AttemptEvent) {
        match self.fsm.process(event) {
            Ok(()) => {
                self.state_tx.send_replace(self.fsm.state().clone());
            }
            Err(e) => warn!("{}", e),
        }
    }
}
