use alloy::{
    network::Network,
    providers::RootProvider,
    pubsub::Subscription,
    rpc::types::Log,
};
use tokio::sync::broadcast::error::RecvError;

use crate::{
    BindingError,
    log_source::{LogFeed, LogSubscription},
};

/// Moves logs from an `eth_subscribe` subscription into a [`LogSubscription`].
///
/// The spawned task ends when the consumer unsubscribes, stops reading, or the upstream
/// subscription fails; in every case the node-side subscription is released.
pub(crate) fn spawn_log_pump<N: Network>(
    mut subscription: Subscription<Log>,
    provider: RootProvider<N>,
    buffer_capacity: usize,
) -> Result<LogSubscription, BindingError> {
    let (feed, log_subscription) = LogSubscription::channel(buffer_capacity)?;

    tokio::spawn(async move {
        pump_logs(&mut subscription, feed).await;

        let id = *subscription.local_id();
        if let Err(err) = provider.unsubscribe(id) {
            warn!(error = %err, "Failed to release log subscription");
        } else {
            debug!(subscription_id = %id, "Log subscription released");
        }
    });

    Ok(log_subscription)
}

/// The receiving half of an upstream log subscription.
trait LogReceiver: Send {
    fn recv_log(&mut self) -> impl Future<Output = Result<Log, RecvError>> + Send;
}

impl LogReceiver for Subscription<Log> {
    fn recv_log(&mut self) -> impl Future<Output = Result<Log, RecvError>> + Send {
        self.recv()
    }
}

async fn pump_logs<R: LogReceiver>(subscription: &mut R, feed: LogFeed) {
    loop {
        let received = tokio::select! {
            biased;
            () = feed.unsubscribed() => {
                debug!("Log subscription cancelled by consumer");
                return;
            }
            received = subscription.recv_log() => received,
        };

        match received {
            Ok(log) => {
                if feed.send(log).await.is_closed() {
                    debug!("Log consumer stopped reading, ending subscription");
                    return;
                }
            }
            Err(RecvError::Closed) => {
                error!("Log subscription closed by the node");
                feed.fail(BindingError::SubscriptionClosed);
                return;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped = skipped, "Log subscription lagged");
                feed.fail(BindingError::Lagged(skipped));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{sync::broadcast, time::timeout};

    use super::*;
    use crate::test_utils::transfer_log;

    impl LogReceiver for broadcast::Receiver<Log> {
        fn recv_log(&mut self) -> impl Future<Output = Result<Log, RecvError>> + Send {
            self.recv()
        }
    }

    #[tokio::test]
    async fn forwards_logs_then_reports_remote_close() -> anyhow::Result<()> {
        let (upstream, mut receiver) = broadcast::channel(4);
        let (feed, mut subscription) = LogSubscription::channel(4)?;

        let first = transfer_log(1, 0, 10);
        let second = transfer_log(2, 0, 20);
        upstream.send(first.clone())?;
        upstream.send(second.clone())?;
        drop(upstream);

        pump_logs(&mut receiver, feed).await;

        assert_eq!(subscription.logs.recv().await, Some(first));
        assert_eq!(subscription.logs.recv().await, Some(second));
        assert_eq!(subscription.logs.recv().await, None);
        assert!(matches!(
            subscription.errors.recv().await,
            Some(BindingError::SubscriptionClosed)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn lagging_behind_the_node_is_terminal() -> anyhow::Result<()> {
        let (upstream, mut receiver) = broadcast::channel(1);
        let (feed, mut subscription) = LogSubscription::channel(4)?;

        upstream.send(transfer_log(1, 0, 1))?;
        upstream.send(transfer_log(2, 0, 2))?;
        upstream.send(transfer_log(3, 0, 3))?;

        pump_logs(&mut receiver, feed).await;

        assert!(matches!(subscription.errors.recv().await, Some(BindingError::Lagged(2))));
        assert_eq!(subscription.logs.recv().await, None);
        Ok(())
    }

    #[tokio::test]
    async fn stops_when_the_consumer_unsubscribes() -> anyhow::Result<()> {
        let (_upstream, mut receiver) = broadcast::channel::<Log>(4);
        let (feed, subscription) = LogSubscription::channel(4)?;

        let pump = tokio::spawn(async move { pump_logs(&mut receiver, feed).await });
        subscription.unsubscribe();

        timeout(Duration::from_secs(1), pump).await??;
        Ok(())
    }

    #[tokio::test]
    async fn stops_when_the_consumer_is_gone() -> anyhow::Result<()> {
        let (upstream, mut receiver) = broadcast::channel(4);
        let (feed, subscription) = LogSubscription::channel(1)?;
        drop(subscription);

        upstream.send(transfer_log(1, 0, 1))?;
        timeout(Duration::from_secs(1), pump_logs(&mut receiver, feed)).await?;
        Ok(())
    }
}
