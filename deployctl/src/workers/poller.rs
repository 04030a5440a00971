//! Result polling worker

use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::controller::session::ShutdownSignal;
use crate::errors::ClientError;
use crate::http::deployments::DeployApi;
use crate::models::deployment::{AttemptKey, DeployResult};

/// Poller worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Time between result queries; the first query waits one interval
    pub interval: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
        }
    }
}

/// What one result query told us
#[derive(Debug)]
pub enum PollOutcome {
    /// Terminal result; polling stops
    Ready(DeployResult),

    /// Build still running
    Pending,

    /// Query failed; retried on the next tick and never reported
    TransientFailure(ClientError),
}

impl From<Result<DeployResult, ClientError>> for PollOutcome {
    fn from(result: Result<DeployResult, ClientError>) -> Self {
        match result {
            Ok(result) if result.is_terminal() => PollOutcome::Ready(result),
            Ok(_) => PollOutcome::Pending,
            Err(e) => PollOutcome::TransientFailure(e),
        }
    }
}

/// Poll the result endpoint for `key` until a terminal result arrives.
///
/// Queries run at a fixed cadence with no attempt limit. Returns the
/// terminal result, or `None` once `shutdown_signal` fires.
pub async fn run<A>(
    options: &Options,
    api: &A,
    key: &AttemptKey,
    mut shutdown_signal: ShutdownSignal,
) -> Option<DeployResult>
where
    A: DeployApi + ?Sized,
{
    info!(task = %key.task, nonce = %key.nonce, "Poller starting...");

    let mut ticker = interval_at(Instant::now() + options.interval, options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut attempts: u64 = 0;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!(nonce = %key.nonce, "Poller shutting down...");
                return None;
            }
            _ = ticker.tick() => {}
        }

        attempts += 1;
        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!(nonce = %key.nonce, "Poller shutting down...");
                return None;
            }
            result = api.fetch_result(key) => PollOutcome::from(result),
        };

        match outcome {
            PollOutcome::Ready(result) => {
                info!(nonce = %key.nonce, attempts, "Result ready");
                return Some(result);
            }
            PollOutcome::Pending => {
                debug!(nonce = %key.nonce, attempts, "Result not ready yet");
            }
            PollOutcome::TransientFailure(e) => {
                debug!(nonce = %key.nonce, attempts, "Ignoring failed result query: {}", e);
            }
        }
    }
}
