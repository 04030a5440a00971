//! Run modes: one-shot submission, interactive form, health check

use std::future::Future;
use std::sync::Arc;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::controller::fsm::AttemptState;
use crate::controller::submission::{error_status, ControllerHandle, SubmissionController};
use crate::errors::ClientError;
use crate::form::fields::{FormFields, FIELD_NAMES};
use crate::http::client::HttpClient;
use crate::http::deployments::{DeployApi, HealthStatus};
use crate::present::Presenter;

/// Create the HTTP client described by `options`
pub fn build_client(options: &AppOptions) -> Result<HttpClient, ClientError> {
    Ok(HttpClient::new(&options.backend_base_url, options.request_timeout)?
        .with_routes(options.routes.clone())
        .with_submit_timeout(options.submit_timeout))
}

/// Query the deploy service's health endpoint
pub async fn check_health(options: &AppOptions) -> Result<HealthStatus, ClientError> {
    build_client(options)?.check_health().await
}

/// A controller running on its own task
struct RunningController {
    handle: ControllerHandle,
    state_rx: watch::Receiver<AttemptState>,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RunningController {
    fn spawn<A, P>(api: Arc<A>, presenter: Arc<P>, options: &AppOptions) -> Self
    where
        A: DeployApi + ?Sized + 'static,
        P: Presenter + ?Sized + 'static,
    {
        let controller = SubmissionController::new(api, presenter, options.controller.clone());
        let handle = controller.handle();
        let state_rx = controller.subscribe();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(controller.run(Box::pin(async move {
            let _ = stop_rx.await;
        })));

        Self {
            handle,
            state_rx,
            stop_tx,
            task,
        }
    }

    fn current_state(&self) -> AttemptState {
        self.state_rx.borrow().clone()
    }

    async fn wait_until(
        &mut self,
        done: impl FnMut(&AttemptState) -> bool,
    ) -> Result<AttemptState, ClientError> {
        let state = self.state_rx.wait_for(done).await.map_err(|_| {
            ClientError::ControllerError("submission controller stopped".to_string())
        })?;
        Ok(state.clone())
    }

    async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            error!("Submission controller task failed: {}", e);
        }
    }
}

/// Submit `fields` once and wait for the attempt to finish.
///
/// Returns the final attempt state, or the attempt's state at the moment
/// `shutdown_signal` fired.
pub async fn run_once<A, P>(
    api: Arc<A>,
    presenter: Arc<P>,
    options: &AppOptions,
    fields: &FormFields,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<AttemptState, ClientError>
where
    A: DeployApi + ?Sized + 'static,
    P: Presenter + ?Sized + 'static,
{
    let mut controller = RunningController::spawn(api, presenter.clone(), options);

    if let Err(e) = controller.handle.submit_fields(fields) {
        presenter.set_status(&error_status(&e));
        controller.stop().await;
        return Err(e);
    }

    let result = tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, abandoning attempt...");
            Ok(controller.current_state())
        }
        state = controller.wait_until(AttemptState::is_terminal) => state,
    };

    controller.stop().await;
    result
}

/// A line of interactive input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Submit,
    Clear,
    Show,
    Help,
    Quit,
    Empty,
}

/// Parse one line of interactive input
pub fn parse_command(line: &str) -> Result<Command, ClientError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (line, ""),
    };

    match word {
        "" => Ok(Command::Empty),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim_start()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err(ClientError::ValidationError(
                    "usage: set <field> <value>".to_string(),
                ));
            }
            Ok(Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
        "submit" => Ok(Command::Submit),
        "clear" | "reset" => Ok(Command::Clear),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(ClientError::ValidationError(format!(
            "Unknown command '{}', type 'help'",
            other
        ))),
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  set <field> <value>   fields: {}", FIELD_NAMES.join(", "));
    println!("  submit                submit the form");
    println!("  clear                 clear the form and the status line");
    println!("  show                  print the current form");
    println!("  quit                  exit");
}

/// Drive the form from line-oriented `input`.
///
/// At end of input, waits for an outstanding attempt to finish before
/// returning.
pub async fn run_interactive<A, P, R>(
    api: Arc<A>,
    presenter: Arc<P>,
    options: &AppOptions,
    mut fields: FormFields,
    input: R,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<AttemptState, ClientError>
where
    A: DeployApi + ?Sized + 'static,
    P: Presenter + ?Sized + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut controller = RunningController::spawn(api, presenter.clone(), options);
    let mut lines = input.lines();
    let mut shutdown_signal = Box::pin(shutdown_signal);

    let result = loop {
        let line = tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Shutdown signal received, leaving interactive mode...");
                break Ok(controller.current_state());
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                // End of input: let the last attempt finish
                if let Err(e) = controller.handle.flush().await {
                    break Err(e);
                }
                break tokio::select! {
                    _ = &mut shutdown_signal => Ok(controller.current_state()),
                    state = controller.wait_until(|s| !s.is_in_flight()) => state,
                };
            }
            Err(e) => break Err(e.into()),
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().yellow());
                continue;
            }
        };

        match command {
            Command::Empty => {}
            Command::Help => print_help(),
            Command::Show => match serde_json::to_string_pretty(&fields) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("{}", e.to_string().yellow()),
            },
            Command::Set { field, value } => {
                if let Err(e) = fields.set(&field, &value) {
                    println!("{}", e.to_string().yellow());
                }
            }
            Command::Submit => match controller.handle.submit_fields(&fields) {
                Ok(key) => info!(attempt = %key, "Queued submission"),
                Err(e) if e.is_parse_error() => presenter.set_status(&error_status(&e)),
                Err(e) => break Err(e),
            },
            Command::Clear => {
                fields.reset();
                if let Err(e) = controller.handle.reset() {
                    break Err(e);
                }
            }
            Command::Quit => break Ok(controller.current_state()),
        }
    };

    controller.stop().await;
    result
}
