//! Asynchronous fare dispatch.
//!
//! ## Architecture
//!
//! ```text
//! caller ──► FareDispatcher::compute ──► mpsc<RequestEnvelope> ──► FareWorker
//!                  ▲                                                   │
//!            oneshot per id                                    FareCalculator
//!                  │                                                   │
//!            response router ◄──────── mpsc<ResponseEnvelope> ◄───────┘
//! ```
//!
//! - [`FareDispatcher`] mints a correlation id per call, parks a oneshot
//!   sender in the pending map and ships the request to the worker.
//! - The response router removes the pending entry for each reply id and
//!   resolves exactly that call. Replies for unknown ids are dropped.
//! - [`FareWorker`] prices requests off the caller's task.
//!
//! There are no timeouts and no cancellation: a call whose reply never
//! arrives stays pending, and so does its map entry.

pub mod envelope;
pub mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::pricing::{FareArgs, FareCalculator, FareRequest, FareResult};

pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use worker::{FareWorker, WorkerMode};

/// Default bound of the request and reply queues.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// The worker channel could not be built or has gone away.
    #[error("Fare worker unavailable")]
    WorkerUnavailable,

    /// The worker answered with an error.
    #[error("Fare request rejected: {0}")]
    Rejected(String),

    #[error("Malformed reply for request {0}")]
    MalformedReply(String),
}

/// Worker settings for [`FareDispatcher::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    pub queue_capacity: usize,
    pub worker_mode: WorkerMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_mode: WorkerMode::default(),
        }
    }
}

struct PendingCall {
    response_sender: oneshot::Sender<Result<FareResult, DispatchError>>,
}

type PendingCalls = DashMap<String, PendingCall>;

/// Caller-side handle to the fare worker.
pub struct FareDispatcher {
    outbound: Option<mpsc::Sender<RequestEnvelope>>,
    pending: Arc<PendingCalls>,
    available: Arc<AtomicBool>,
}

impl FareDispatcher {
    /// Spawn a worker and connect to it.
    ///
    /// Falls back to [`FareDispatcher::unavailable`] when the channel cannot
    /// be built (zero capacity, or no Tokio runtime on this thread).
    pub fn start(calculator: Arc<FareCalculator>, config: DispatchConfig) -> Self {
        if config.queue_capacity == 0 {
            error!("Fare worker queue capacity must be positive");
            return Self::unavailable();
        }
        if tokio::runtime::Handle::try_current().is_err() {
            error!("No Tokio runtime available for the fare worker");
            return Self::unavailable();
        }

        let worker = FareWorker::new(calculator, config.worker_mode);
        let (outbound, inbound) = worker.spawn(config.queue_capacity);
        info!(
            capacity = config.queue_capacity,
            mode = ?config.worker_mode,
            "Fare dispatcher started"
        );

        Self::connect(outbound, inbound)
    }

    /// Attach to an already running worker.
    ///
    /// Must be called within a Tokio runtime; the response router is
    /// spawned onto it.
    pub fn connect(
        outbound: mpsc::Sender<RequestEnvelope>,
        inbound: mpsc::Receiver<ResponseEnvelope>,
    ) -> Self {
        let pending: Arc<PendingCalls> = Arc::new(DashMap::new());
        let available = Arc::new(AtomicBool::new(true));

        tokio::spawn(route_responses(
            inbound,
            Arc::clone(&pending),
            Arc::clone(&available),
        ));

        Self {
            outbound: Some(outbound),
            pending,
            available,
        }
    }

    /// A dispatcher whose channel failed to initialize. Every call rejects.
    pub fn unavailable() -> Self {
        Self {
            outbound: None,
            pending: Arc::new(DashMap::new()),
            available: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_available(&self) -> bool {
        self.outbound.is_some() && self.available.load(Ordering::SeqCst)
    }

    /// Calls sent but not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Price a trip on the worker.
    pub async fn compute(&self, req: &FareRequest) -> Result<FareResult, DispatchError> {
        self.compute_args(FareArgs::from(req)).await
    }

    /// Price a trip given in positional form, e.g. straight from a client.
    pub async fn compute_args(&self, args: FareArgs) -> Result<FareResult, DispatchError> {
        let outbound = match &self.outbound {
            Some(tx) if self.available.load(Ordering::SeqCst) => tx,
            _ => return Err(DispatchError::WorkerUnavailable),
        };

        let id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending
            .insert(id.clone(), PendingCall { response_sender: tx });

        // The router may have shut down between the check above and the insert.
        if !self.available.load(Ordering::SeqCst) {
            self.pending.remove(&id);
            return Err(DispatchError::WorkerUnavailable);
        }

        debug!(id = id.as_str(), "Dispatching fare request");

        let envelope = RequestEnvelope {
            id: id.clone(),
            args,
        };
        if outbound.send(envelope).await.is_err() {
            self.pending.remove(&id);
            self.available.store(false, Ordering::SeqCst);
            error!(id = id.as_str(), "Fare worker channel closed");
            return Err(DispatchError::WorkerUnavailable);
        }

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(DispatchError::WorkerUnavailable),
        }
    }
}

pub type SharedFareDispatcher = Arc<FareDispatcher>;

async fn route_responses(
    mut inbound: mpsc::Receiver<ResponseEnvelope>,
    pending: Arc<PendingCalls>,
    available: Arc<AtomicBool>,
) {
    while let Some(reply) = inbound.recv().await {
        match pending.remove(&reply.id) {
            Some((id, call)) => {
                debug!(id = id.as_str(), "Fare reply received");
                let _ = call.response_sender.send(reply.into_outcome());
            }
            None => {
                warn!(id = reply.id.as_str(), "Reply for unknown request");
            }
        }
    }

    available.store(false, Ordering::SeqCst);
    error!(
        pending = pending.len(),
        "Fare worker disconnected, rejecting pending calls"
    );

    let ids: Vec<String> = pending.iter().map(|entry| entry.key().clone()).collect();
    for id in ids {
        if let Some((_, call)) = pending.remove(&id) {
            let _ = call.response_sender.send(Err(DispatchError::WorkerUnavailable));
        }
    }
}
