//! Live delivery of decoded events into a caller-owned channel.
//!
//! A watch session runs on its own tokio task. It waits on cancellation, the subscription's
//! error channel and the next raw log, in that order of preference, and keeps waiting on the first
//! two while blocked on a full sink. The session never closes the sink; callers close it after
//! observing the final status through [`WatchSubscription::wait`].

use std::{fmt::Debug, marker::PhantomData};

use tokio::{
    sync::mpsc::{self, error::TryRecvError},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{BindingError, EventDecoder, LogSubscription, SolEventDecoder, TypedEvent};

/// A live log subscription paired with the decoder for one event type.
#[derive(Debug)]
pub struct EventWatcher<E, D = SolEventDecoder<E>> {
    subscription: LogSubscription,
    decoder: D,
    _event: PhantomData<fn() -> E>,
}

impl<E, D> EventWatcher<E, D>
where
    E: Debug + Send + 'static,
    D: EventDecoder<E>,
{
    #[must_use]
    pub fn new(subscription: LogSubscription, decoder: D) -> Self {
        Self { subscription, decoder, _event: PhantomData }
    }

    /// Starts forwarding decoded events into `sink` on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(self, sink: mpsc::Sender<TypedEvent<E>>) -> WatchSubscription {
        let token = self.subscription.token.clone();
        info!(event = self.decoder.event_name(), "Starting watch session");
        let task = tokio::spawn(self.run(sink));
        WatchSubscription { token, task: Some(task), outcome: None }
    }

    async fn run(mut self, sink: mpsc::Sender<TypedEvent<E>>) -> Result<(), BindingError> {
        let result = self.forward(&sink).await;

        // release upstream before reporting the final status
        self.subscription.unsubscribe();

        match &result {
            Ok(()) => info!(event = self.decoder.event_name(), "Watch session ended"),
            Err(err) => {
                error!(event = self.decoder.event_name(), error = %err, "Watch session failed");
            }
        }
        result
    }

    async fn forward(&mut self, sink: &mpsc::Sender<TypedEvent<E>>) -> Result<(), BindingError> {
        let LogSubscription { logs, errors, token } = &mut self.subscription;
        let mut errors_open = true;

        loop {
            let log = tokio::select! {
                biased;

                () = token.cancelled() => {
                    debug!("Watch session cancelled");
                    return Ok(());
                }
                received = errors.recv(), if errors_open => {
                    match received {
                        Some(err) => return Err(err),
                        None => {
                            trace!("Log feed finished, delivering buffered entries");
                            errors_open = false;
                            continue;
                        }
                    }
                }
                received = logs.recv() => match received {
                    Some(log) => log,
                    None if errors_open => {
                        // the feed drops its error sender before its log sender
                        return match errors.try_recv() {
                            Ok(err) => Err(err),
                            Err(TryRecvError::Disconnected) => Ok(()),
                            Err(TryRecvError::Empty) => Err(BindingError::SubscriptionClosed),
                        };
                    }
                    None => return Ok(()),
                },
            };

            let event = self.decoder.decode_typed(log)?;

            // a stale send never wins over cancellation or a subscription error
            loop {
                tokio::select! {
                    biased;

                    () = token.cancelled() => {
                        debug!("Watch session cancelled while delivering");
                        return Ok(());
                    }
                    received = errors.recv(), if errors_open => match received {
                        Some(err) => return Err(err),
                        None => errors_open = false,
                    },
                    permit = sink.reserve() => {
                        match permit {
                            Ok(permit) => {
                                trace!(event = ?event.event, "Delivering event");
                                permit.send(event);
                            }
                            Err(_) => {
                                warn!("Sink receiver dropped, stopping watch session");
                                return Ok(());
                            }
                        }
                        break;
                    }
                }
            }
        }
    }
}

/// Handle to a running watch session.
///
/// Dropping the handle cancels the session.
#[derive(Debug)]
pub struct WatchSubscription {
    token: CancellationToken,
    task: Option<JoinHandle<Result<(), BindingError>>>,
    outcome: Option<Result<(), BindingError>>,
}

impl WatchSubscription {
    /// Cancels the session. No event is delivered after the session observes it.
    ///
    /// Safe to call any number of times, including after the session ended.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the session to end and returns its final status.
    ///
    /// Cancellation is a clean end. Repeated calls return the same status.
    ///
    /// # Errors
    ///
    /// The subscription or decode error that terminated the session, or
    /// [`BindingError::WatcherAborted`] if the task panicked.
    pub async fn wait(&mut self) -> Result<(), BindingError> {
        if let Some(task) = self.task.as_mut() {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!(error = %join_err, "Watch task terminated abnormally");
                    Err(BindingError::WatcherAborted)
                }
            };
            self.task = None;
            self.outcome = Some(outcome);
        }
        self.outcome.clone().unwrap_or(Ok(()))
    }

    /// Cancels the session and waits for it to wind down.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn unsubscribe_and_wait(mut self) -> Result<(), BindingError> {
        self.unsubscribe();
        self.wait().await
    }
}

impl Drop for WatchSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
