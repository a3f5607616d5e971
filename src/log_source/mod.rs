//! The boundary between the bindings and whatever delivers raw logs.
//!
//! A [`LogSource`] answers two questions: "which logs already match this filter" and "tell me
//! about matching logs as they appear". Live delivery is modelled as a [`LogSubscription`], a
//! pair of channels (logs and a terminal error) plus an unsubscribe token. Historical delivery
//! reuses the same shape: [`LogSubscription::replay`] pre-fills a log channel and closes it, which
//! is how the filterer feeds an [`EventIterator`](crate::EventIterator).

use std::{future::Future, sync::Arc};

use alloy::rpc::types::{Filter, Log};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{BindingError, ChannelState};

mod memory;

pub use memory::MemoryLogSource;

/// Supplier of raw logs for historical retrieval and live subscriptions.
pub trait LogSource: Send + Sync {
    /// Fetches every log currently matching `filter`, in block and log-index order.
    ///
    /// # Errors
    ///
    /// Returns the transport error that prevented the retrieval.
    fn fetch_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Log>, BindingError>> + Send;

    /// Opens a live subscription for logs matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the transport error that prevented the subscription from being established.
    fn subscribe_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<LogSubscription, BindingError>> + Send;
}

impl<S: LogSource> LogSource for Arc<S> {
    fn fetch_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<Vec<Log>, BindingError>> + Send {
        self.as_ref().fetch_logs(filter)
    }

    fn subscribe_logs(
        &self,
        filter: &Filter,
    ) -> impl Future<Output = Result<LogSubscription, BindingError>> + Send {
        self.as_ref().subscribe_logs(filter)
    }
}

/// Consumer end of a log delivery.
///
/// The error channel closing without an error means the producer finished cleanly.
#[derive(Debug)]
pub struct LogSubscription {
    pub(crate) logs: mpsc::Receiver<Log>,
    pub(crate) errors: mpsc::Receiver<BindingError>,
    pub(crate) token: CancellationToken,
}

impl LogSubscription {
    /// Creates a connected producer/consumer pair whose log channel holds up to `capacity`
    /// entries.
    ///
    /// # Errors
    ///
    /// * [`BindingError::InvalidBufferCapacity`] if `capacity` is zero.
    pub fn channel(capacity: usize) -> Result<(LogFeed, LogSubscription), BindingError> {
        if capacity == 0 {
            return Err(BindingError::InvalidBufferCapacity);
        }
        let (log_tx, log_rx) = mpsc::channel(capacity);
        // a feed reports at most one terminal error
        let (error_tx, error_rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        let feed = LogFeed { logs: log_tx, errors: error_tx, token: token.clone() };
        let subscription = LogSubscription { logs: log_rx, errors: error_rx, token };
        Ok((feed, subscription))
    }

    /// A finished delivery of already-fetched logs.
    #[must_use]
    pub fn replay(logs: Vec<Log>) -> Self {
        let (log_tx, log_rx) = mpsc::channel(logs.len().max(1));
        let (_, error_rx) = mpsc::channel(1);
        for log in logs {
            // capacity covers every log
            let _ = log_tx.try_send(log);
        }
        LogSubscription { logs: log_rx, errors: error_rx, token: CancellationToken::new() }
    }

    /// Releases the upstream subscription. Safe to call any number of times.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Producer end of a [`LogSubscription`].
///
/// Dropping the feed closes both channels, which the consumer reads as clean completion.
#[derive(Debug)]
pub struct LogFeed {
    // dropped first, so consumers see clean completion before the log channel closes
    errors: mpsc::Sender<BindingError>,
    logs: mpsc::Sender<Log>,
    token: CancellationToken,
}

impl LogFeed {
    /// Delivers one log, waiting for buffer space unless the consumer unsubscribes first.
    pub async fn send(&self, log: Log) -> ChannelState {
        tokio::select! {
            biased;
            () = self.token.cancelled() => ChannelState::Closed,
            sent = self.logs.send(log) => match sent {
                Ok(()) => ChannelState::Open,
                Err(_) => ChannelState::Closed,
            },
        }
    }

    /// Reports a terminal subscription failure and ends the feed.
    pub fn fail(self, error: BindingError) {
        if self.errors.try_send(error).is_err() {
            debug!("Subscription consumer is gone, dropping terminal error");
        }
    }

    /// Ends the feed without an error.
    pub fn finish(self) {}

    /// Resolves once the consumer has unsubscribed.
    pub async fn unsubscribed(&self) {
        self.token.cancelled().await;
    }

    #[must_use]
    pub fn is_unsubscribed(&self) -> bool {
        self.token.is_cancelled()
    }
}
