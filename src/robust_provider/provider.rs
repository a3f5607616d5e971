use std::{sync::Arc, time::Duration};

use alloy::{
    network::{Ethereum, Network},
    providers::{Provider, RootProvider},
    pubsub::Subscription,
    rpc::types::{Filter, Log},
    transports::{RpcError, TransportErrorKind},
};
use backon::{ExponentialBuilder, Retryable};
use thiserror::Error;
use tokio::time::{error as TokioError, timeout};

use crate::{
    BindingError,
    log_source::{LogSource, LogSubscription},
    robust_provider::subscription::spawn_log_pump,
};

/// Failure of a single RPC operation after retries and failover.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("Operation timed out")]
    Timeout,
    #[error("RPC call failed after exhausting all retry attempts: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),
}

impl From<RpcError<TransportErrorKind>> for Error {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        Error::RpcError(Arc::new(err))
    }
}

impl From<TokioError::Elapsed> for Error {
    fn from(_: TokioError::Elapsed) -> Self {
        Error::Timeout
    }
}

/// Provider wrapper with built-in retry and timeout mechanisms.
///
/// Every call is bounded by `call_timeout`, retried with exponential backoff up to
/// `max_retries` times, and then repeated against each fallback provider in order.
#[derive(Clone, Debug)]
pub struct RobustProvider<N: Network = Ethereum> {
    pub(crate) primary_provider: RootProvider<N>,
    pub(crate) fallback_providers: Vec<RootProvider<N>>,
    pub(crate) call_timeout: Duration,
    pub(crate) max_retries: usize,
    pub(crate) min_delay: Duration,
    pub(crate) subscription_buffer_capacity: usize,
}

impl<N: Network> RobustProvider<N> {
    /// Get a reference to the primary provider
    #[must_use]
    pub fn primary(&self) -> &RootProvider<N> {
        &self.primary_provider
    }

    #[must_use]
    pub fn subscription_buffer_capacity(&self) -> usize {
        self.subscription_buffer_capacity
    }

    /// Fetch logs for the given [`Filter`] with retry and timeout.
    ///
    /// # Errors
    ///
    /// See [retry errors](#retry-errors).
    pub async fn get_logs(&self, filter: &Filter) -> Result<Vec<Log>, Error> {
        info!("eth_getLogs called");
        let result = self
            .try_operation_with_failover(
                move |provider| async move { provider.get_logs(filter).await },
                false,
            )
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_getLogs failed");
        }
        result
    }

    /// Open an `eth_subscribe("logs")` subscription on the first provider that accepts it.
    ///
    /// Returns the subscription together with the provider that owns it, which is needed to
    /// release it again.
    ///
    /// # Errors
    ///
    /// See [retry errors](#retry-errors).
    pub async fn subscribe_raw_logs(
        &self,
        filter: &Filter,
    ) -> Result<(Subscription<Log>, RootProvider<N>), Error> {
        info!("eth_subscribe called");
        let result = self
            .try_operation_with_failover(
                move |provider| async move {
                    let subscription = provider.subscribe_logs(filter).await?;
                    Ok((subscription, provider))
                },
                true,
            )
            .await;
        if let Err(e) = &result {
            error!(error = %e, "eth_subscribe failed");
        }
        result
    }

    /// Execute `operation` with exponential backoff and a total timeout.
    ///
    /// If the primary provider fails, each fallback provider is attempted in sequence. With
    /// `require_pubsub`, fallbacks without a pubsub frontend are skipped.
    ///
    /// # Errors
    /// <a name="retry-errors"></a>
    ///
    /// * [`Error::Timeout`] if `call_timeout` elapsed on the last provider attempted.
    /// * [`Error::RpcError`] with the last provider's error otherwise, including
    ///   [`TransportErrorKind::PubsubUnavailable`] when a subscription was requested and no
    ///   provider supports pubsub.
    pub(crate) async fn try_operation_with_failover<T, F, Fut>(
        &self,
        operation: F,
        require_pubsub: bool,
    ) -> Result<T, Error>
    where
        F: Fn(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let mut last_error = match self.try_provider_with_timeout(self.primary(), &operation).await
        {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let num_fallbacks = self.fallback_providers.len();
        if num_fallbacks > 0 {
            info!("Primary provider failed, trying fallback provider(s)");
        }

        for (fallback_idx, provider) in self.fallback_providers.iter().enumerate() {
            if require_pubsub && !Self::supports_pubsub(provider) {
                info!("Fallback provider {} doesn't support pubsub, skipping", fallback_idx + 1);
                continue;
            }
            info!("Attempting fallback provider {}/{}", fallback_idx + 1, num_fallbacks);

            match self.try_provider_with_timeout(provider, &operation).await {
                Ok(value) => {
                    info!(provider_num = fallback_idx + 1, "Fallback provider succeeded");
                    return Ok(value);
                }
                Err(e) => {
                    error!(provider_num = fallback_idx + 1, err = %e, "Fallback provider failed");
                    last_error = e;
                }
            }
        }

        error!("All providers failed or timed out - returning the last providers attempt's error");
        Err(last_error)
    }

    /// Try executing an operation with a specific provider with retry and timeout.
    async fn try_provider_with_timeout<T, F, Fut>(
        &self,
        provider: &RootProvider<N>,
        operation: F,
    ) -> Result<T, Error>
    where
        F: Fn(RootProvider<N>) -> Fut,
        Fut: Future<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        let retry_strategy = ExponentialBuilder::default()
            .with_max_times(self.max_retries)
            .with_min_delay(self.min_delay);

        timeout(
            self.call_timeout,
            (|| operation(provider.clone()))
                .retry(retry_strategy)
                .notify(|err: &RpcError<TransportErrorKind>, dur: Duration| {
                    info!(error = %err, "RPC error retrying after {:?}", dur);
                })
                .sleep(tokio::time::sleep),
        )
        .await
        .map_err(Error::from)?
        .map_err(Error::from)
    }

    fn supports_pubsub(provider: &RootProvider<N>) -> bool {
        provider.client().pubsub_frontend().is_some()
    }
}

impl<N: Network> LogSource for RobustProvider<N> {
    async fn fetch_logs(&self, filter: &Filter) -> Result<Vec<Log>, BindingError> {
        Ok(self.get_logs(filter).await?)
    }

    async fn subscribe_logs(&self, filter: &Filter) -> Result<LogSubscription, BindingError> {
        let (subscription, provider) = self.subscribe_raw_logs(filter).await?;
        spawn_log_pump(subscription, provider, self.subscription_buffer_capacity)
    }
}
