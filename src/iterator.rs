use std::{
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll, ready},
};

use alloy::rpc::types::Log;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_stream::Stream;

use crate::{
    BindingError, EventDecoder, IteratorState, LogSubscription, SolEventDecoder, TypedEvent,
};

/// Pull-based cursor over a log delivery, decoding one entry per call.
///
/// Each call to [`next`](Self::next) yields `Some(Ok(event))` for a decoded record,
/// `Some(Err(err))` exactly once when retrieval or decoding fails, and `None` once iteration is
/// over. After a failure every further call returns `None`; the error stays available through
/// [`state`](Self::state).
///
/// The iterator never runs ahead of its consumer: entries are decoded only when requested.
/// Dropping the iterator releases the upstream subscription.
#[derive(Debug)]
pub struct EventIterator<E, D = SolEventDecoder<E>> {
    subscription: LogSubscription,
    decoder: D,
    state: IteratorState,
    _event: PhantomData<fn() -> E>,
}

impl<E, D: EventDecoder<E>> EventIterator<E, D> {
    #[must_use]
    pub fn new(subscription: LogSubscription, decoder: D) -> Self {
        Self { subscription, decoder, state: IteratorState::Open, _event: PhantomData }
    }

    #[must_use]
    pub fn state(&self) -> &IteratorState {
        &self.state
    }

    /// Advances to the next record.
    ///
    /// Safe to call in any state; terminal states return `None` without waiting.
    pub async fn next(&mut self) -> Option<Result<TypedEvent<E>, BindingError>> {
        std::future::poll_fn(|cx| self.poll_next_event(cx)).await
    }

    /// Drains the iterator, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The error that moved the iterator to [`IteratorState::Failed`].
    pub async fn try_collect(mut self) -> Result<Vec<TypedEvent<E>>, BindingError> {
        let mut events = Vec::new();
        while let Some(event) = self.next().await {
            events.push(event?);
        }
        Ok(events)
    }

    /// Releases the upstream subscription and ends iteration.
    ///
    /// Buffered entries are discarded. Idempotent and valid in every state; a failed iterator
    /// keeps its error.
    pub fn close(&mut self) {
        self.subscription.unsubscribe();
        self.subscription.logs.close();
        self.subscription.errors.close();
        if !self.state.is_terminal() {
            debug!(event = self.decoder.event_name(), "Event iterator closed");
            self.state = IteratorState::Exhausted;
        }
    }

    pub(crate) fn poll_next_event(
        &mut self,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<TypedEvent<E>, BindingError>>> {
        loop {
            match self.state {
                IteratorState::Exhausted | IteratorState::Failed(_) => return Poll::Ready(None),
                IteratorState::Draining => {
                    return Poll::Ready(match self.subscription.logs.try_recv() {
                        Ok(log) => Some(self.decode(log)),
                        Err(TryRecvError::Empty | TryRecvError::Disconnected) => {
                            self.exhaust();
                            None
                        }
                    });
                }
                IteratorState::Open => {}
            }

            // an error signaled before the next entry wins over it
            match self.subscription.errors.poll_recv(cx) {
                Poll::Ready(Some(err)) => return Poll::Ready(Some(Err(self.fail(err)))),
                Poll::Ready(None) => {
                    trace!("Log delivery completed, draining buffered entries");
                    self.state = IteratorState::Draining;
                    continue;
                }
                Poll::Pending => {}
            }

            let received = ready!(self.subscription.logs.poll_recv(cx));
            return Poll::Ready(match received {
                Some(log) => Some(self.decode(log)),
                None => match self.subscription.errors.try_recv() {
                    Ok(err) => Some(Err(self.fail(err))),
                    Err(_) => {
                        self.exhaust();
                        None
                    }
                },
            });
        }
    }

    fn decode(&mut self, log: Log) -> Result<TypedEvent<E>, BindingError> {
        self.decoder.decode_typed(log).map_err(|err| self.fail(err))
    }

    fn fail(&mut self, err: BindingError) -> BindingError {
        error!(event = self.decoder.event_name(), error = %err, "Event iterator failed");
        self.subscription.unsubscribe();
        self.state = IteratorState::Failed(err.clone());
        err
    }

    fn exhaust(&mut self) {
        debug!(event = self.decoder.event_name(), "Event iterator exhausted");
        self.subscription.unsubscribe();
        self.state = IteratorState::Exhausted;
    }
}

impl<E, D: EventDecoder<E> + Unpin> Stream for EventIterator<E, D> {
    type Item = Result<TypedEvent<E>, BindingError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().poll_next_event(cx)
    }
}

impl<E, D> Drop for EventIterator<E, D> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{Address, U256},
        rpc::types::Log,
    };
    use tokio_stream::StreamExt;

    use super::*;
    use crate::{
        assert_exhausted, assert_failed, assert_next_event,
        test_utils::{ALICE, BOB, CAROL, Transfer, ValidatorRemoved, raw_log},
    };

    fn transfer(from: Address, to: Address, value: u64) -> Transfer {
        Transfer { from, to, value: U256::from(value) }
    }

    fn iterator(logs: Vec<Log>) -> EventIterator<Transfer> {
        EventIterator::new(LogSubscription::replay(logs), SolEventDecoder::new())
    }

    #[tokio::test]
    async fn yields_transfers_in_order_then_exhausts() {
        let transfers =
            [transfer(ALICE, BOB, 100), transfer(BOB, CAROL, 50), transfer(ALICE, CAROL, 25)];
        let logs = transfers.iter().enumerate().map(|(i, t)| raw_log(t, 1, i as u64)).collect();
        let mut iter = iterator(logs);

        assert_next_event!(iter, transfers[0]);
        assert_next_event!(iter, transfers[1]);
        assert_next_event!(iter, transfers[2]);
        assert_exhausted!(iter);
        assert!(iter.state().error().is_none());
    }

    #[tokio::test]
    async fn decode_failure_is_reported_once_and_sticks() {
        let logs = vec![
            raw_log(&transfer(ALICE, BOB, 1), 1, 0),
            raw_log(&ValidatorRemoved { addr: ALICE }, 1, 1),
            raw_log(&transfer(BOB, CAROL, 2), 1, 2),
        ];
        let mut iter = iterator(logs);

        assert_next_event!(iter, transfer(ALICE, BOB, 1));
        assert_failed!(iter, BindingError::EventSignatureMismatch { .. });

        for _ in 0..3 {
            assert!(iter.next().await.is_none());
        }
        assert!(matches!(
            iter.state(),
            IteratorState::Failed(BindingError::EventSignatureMismatch { .. })
        ));
        assert!(iter.subscription.is_unsubscribed());
    }

    #[tokio::test]
    async fn empty_delivery_is_exhausted_without_error() {
        let mut iter = iterator(vec![]);

        assert_exhausted!(iter);
        assert_eq!(iter.state(), &IteratorState::Exhausted);
    }

    #[tokio::test]
    async fn signaled_error_wins_over_buffered_entries() -> anyhow::Result<()> {
        let (feed, subscription) = LogSubscription::channel(8)?;
        let mut iter: EventIterator<Transfer> =
            EventIterator::new(subscription, SolEventDecoder::new());

        assert!(feed.send(raw_log(&transfer(ALICE, BOB, 1), 1, 0)).await.is_open());
        assert!(feed.send(raw_log(&transfer(BOB, CAROL, 2), 2, 0)).await.is_open());
        feed.fail(BindingError::SubscriptionClosed);

        assert_failed!(iter, BindingError::SubscriptionClosed);
        assert!(iter.next().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn entries_arriving_while_open_are_served_before_completion() -> anyhow::Result<()> {
        let (feed, subscription) = LogSubscription::channel(1)?;
        let iter: EventIterator<Transfer> =
            EventIterator::new(subscription, SolEventDecoder::new());

        let producer = tokio::spawn(async move {
            for block in 1..=3 {
                if feed.send(raw_log(&transfer(ALICE, BOB, block), block, 0)).await.is_closed() {
                    break;
                }
            }
            feed.finish();
        });

        let events = iter.try_collect().await?;
        producer.await?;

        let blocks: Vec<_> = events.iter().filter_map(TypedEvent::block_number).collect();
        assert_eq!(blocks, vec![1, 2, 3]);
        Ok(())
    }

    #[tokio::test]
    async fn close_is_idempotent_and_releases_subscription() {
        let mut iter = iterator(vec![raw_log(&transfer(ALICE, BOB, 1), 1, 0)]);

        iter.close();
        iter.close();

        assert!(iter.subscription.is_unsubscribed());
        assert_exhausted!(iter);
    }

    #[tokio::test]
    async fn close_keeps_the_failure() {
        let mut iter = iterator(vec![raw_log(&ValidatorRemoved { addr: BOB }, 1, 0)]);

        assert!(matches!(iter.next().await, Some(Err(_))));
        iter.close();

        assert!(iter.state().error().is_some());
    }

    #[tokio::test]
    async fn drop_releases_subscription() -> anyhow::Result<()> {
        let (feed, subscription) = LogSubscription::channel(1)?;
        let iter: EventIterator<Transfer> =
            EventIterator::new(subscription, SolEventDecoder::new());

        drop(iter);

        assert!(feed.is_unsubscribed());
        Ok(())
    }

    #[tokio::test]
    async fn works_as_a_stream() -> anyhow::Result<()> {
        let logs = (0..4).map(|i| raw_log(&transfer(ALICE, BOB, i), 1, i)).collect();

        let values: Vec<_> = iterator(logs)
            .map(|event| event.map(|typed| typed.event.value))
            .collect::<Result<Vec<_>, BindingError>>()
            .await?;

        assert_eq!(values, (0..4).map(U256::from).collect::<Vec<_>>());
        Ok(())
    }
}
