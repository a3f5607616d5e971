use alloy::{
    primitives::{Address, B256},
    rpc::types::Log,
    sol_types::SolEvent,
};
use tokio::sync::mpsc;

use crate::{
    BindingError, EventDecoder, EventFilter, EventIterator, EventWatcher, FilterOpts, LogSource,
    LogSubscription, SolEventDecoder, TypedEvent, WatchOpts, WatchSubscription,
};

/// Filter, watch and parse access to the events of one deployed contract.
#[derive(Clone, Debug)]
pub struct ContractFilterer<S> {
    address: Address,
    source: S,
}

impl<S: LogSource> ContractFilterer<S> {
    #[must_use]
    pub fn new(address: Address, source: S) -> Self {
        Self { address, source }
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Retrieves past `E` events and iterates them lazily.
    ///
    /// `topic_rules` hold, per indexed argument in declaration order, the accepted values; an
    /// empty rule matches anything. Build them with [`topic_rule`](crate::topic_rule).
    ///
    /// # Errors
    ///
    /// * [`BindingError::TooManyTopicRules`] if more than three rules are given.
    /// * The log source's error if the retrieval fails.
    pub async fn filter<E: SolEvent + 'static>(
        &self,
        opts: &FilterOpts,
        topic_rules: Vec<Vec<B256>>,
    ) -> Result<EventIterator<E>, BindingError> {
        let filter = EventFilter::new().event_signature(E::SIGNATURE_HASH).topic_rules(topic_rules);
        self.filter_with(filter, opts, SolEventDecoder::new()).await
    }

    /// Like [`filter`](Self::filter), with an explicit filter and decoder.
    ///
    /// The contract's address is added to `filter`.
    ///
    /// # Errors
    ///
    /// See [`filter`](Self::filter).
    pub async fn filter_with<E, D: EventDecoder<E>>(
        &self,
        filter: EventFilter,
        opts: &FilterOpts,
        decoder: D,
    ) -> Result<EventIterator<E, D>, BindingError> {
        let filter = filter.contract_address(self.address);
        filter.validate()?;

        debug!(filter = %filter, event = decoder.event_name(), "Fetching historical logs");
        let logs = self.source.fetch_logs(&filter.to_log_filter(opts)).await?;
        debug!(count = logs.len(), "Fetched historical logs");

        Ok(EventIterator::new(LogSubscription::replay(logs), decoder))
    }

    /// Subscribes to new `E` events and forwards them into `sink` until the returned session is
    /// cancelled or fails.
    ///
    /// # Errors
    ///
    /// * [`BindingError::TooManyTopicRules`] if more than three rules are given.
    /// * The log source's error if the subscription cannot be established.
    pub async fn watch<E: SolEvent + Send + std::fmt::Debug + 'static>(
        &self,
        opts: &WatchOpts,
        sink: mpsc::Sender<TypedEvent<E>>,
        topic_rules: Vec<Vec<B256>>,
    ) -> Result<WatchSubscription, BindingError> {
        let filter = EventFilter::new().event_signature(E::SIGNATURE_HASH).topic_rules(topic_rules);
        self.watch_with(filter, opts, SolEventDecoder::new(), sink).await
    }

    /// Like [`watch`](Self::watch), with an explicit filter and decoder.
    ///
    /// # Errors
    ///
    /// See [`watch`](Self::watch).
    pub async fn watch_with<E, D>(
        &self,
        filter: EventFilter,
        opts: &WatchOpts,
        decoder: D,
        sink: mpsc::Sender<TypedEvent<E>>,
    ) -> Result<WatchSubscription, BindingError>
    where
        E: Send + std::fmt::Debug + 'static,
        D: EventDecoder<E>,
    {
        let filter = filter.contract_address(self.address);
        filter.validate()?;

        debug!(filter = %filter, event = decoder.event_name(), "Subscribing to logs");
        let subscription = self.source.subscribe_logs(&filter.to_subscription_filter(opts)).await?;

        Ok(EventWatcher::new(subscription, decoder).watch(sink))
    }

    /// Decodes one already-retrieved log as an `E` event.
    ///
    /// # Errors
    ///
    /// A decode error if the log does not have `E`'s shape.
    pub fn parse<E: SolEvent + 'static>(&self, log: Log) -> Result<TypedEvent<E>, BindingError> {
        self.parse_with(&SolEventDecoder::new(), log)
    }

    /// Decodes one already-retrieved log with `decoder`.
    ///
    /// # Errors
    ///
    /// A decode error if the log does not have the decoded event's shape.
    pub fn parse_with<E, D: EventDecoder<E>>(
        &self,
        decoder: &D,
        log: Log,
    ) -> Result<TypedEvent<E>, BindingError> {
        decoder.decode_typed(log)
    }
}
