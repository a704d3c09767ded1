//! Worker side of the dispatch channel.
//!
//! Receives [`RequestEnvelope`]s, prices them with a [`FareCalculator`] and
//! answers each with a [`ResponseEnvelope`] carrying the same id.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::pricing::{FareCalculator, FareRequest};

use super::envelope::{RequestEnvelope, ResponseEnvelope};

/// How the worker schedules requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerMode {
    /// One request at a time, replies in arrival order
    #[default]
    Sequential,
    /// One task per request, replies in completion order
    Concurrent,
}

impl std::str::FromStr for WorkerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(WorkerMode::Sequential),
            "concurrent" => Ok(WorkerMode::Concurrent),
            other => Err(format!("unknown worker mode '{}'", other)),
        }
    }
}

pub struct FareWorker {
    calculator: Arc<FareCalculator>,
    mode: WorkerMode,
}

impl FareWorker {
    pub fn new(calculator: Arc<FareCalculator>, mode: WorkerMode) -> Self {
        Self { calculator, mode }
    }

    /// Start the worker on the current runtime.
    ///
    /// Returns the request sender and the reply receiver; the worker stops
    /// once every request sender is dropped.
    pub fn spawn(
        self,
        capacity: usize,
    ) -> (mpsc::Sender<RequestEnvelope>, mpsc::Receiver<ResponseEnvelope>) {
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (reply_tx, reply_rx) = mpsc::channel(capacity);

        tokio::spawn(self.run(request_rx, reply_tx));

        (request_tx, reply_rx)
    }

    async fn run(
        self,
        mut requests: mpsc::Receiver<RequestEnvelope>,
        replies: mpsc::Sender<ResponseEnvelope>,
    ) {
        info!(mode = ?self.mode, "Fare worker started");

        while let Some(envelope) = requests.recv().await {
            match self.mode {
                WorkerMode::Sequential => {
                    let reply = handle(&self.calculator, envelope);
                    if replies.send(reply).await.is_err() {
                        warn!("Reply channel closed, stopping fare worker");
                        break;
                    }
                }
                WorkerMode::Concurrent => {
                    let calculator = Arc::clone(&self.calculator);
                    let replies = replies.clone();
                    tokio::spawn(async move {
                        let reply = handle(&calculator, envelope);
                        let _ = replies.send(reply).await;
                    });
                }
            }
        }

        info!("Fare worker stopped");
    }
}

/// Price one envelope. Never fails: errors become error replies.
pub fn handle(calculator: &FareCalculator, envelope: RequestEnvelope) -> ResponseEnvelope {
    let RequestEnvelope { id, args } = envelope;

    let outcome = FareRequest::try_from(args).and_then(|req| calculator.compute(&req));

    match outcome {
        Ok(result) => {
            debug!(id = id.as_str(), total_fare = %result.total_fare, "Fare request handled");
            ResponseEnvelope::success(id, result)
        }
        Err(e) => {
            warn!(id = id.as_str(), error = %e, "Fare request rejected");
            ResponseEnvelope::failure(id, e)
        }
    }
}
