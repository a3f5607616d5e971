use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use alloy::rpc::types::{Filter, Log};

use crate::{
    BindingError,
    log_source::{LogFeed, LogSource, LogSubscription},
    robust_provider::DEFAULT_SUBSCRIPTION_BUFFER_CAPACITY,
};

/// A [`LogSource`] backed by a vector of logs and hand-driven subscriptions.
///
/// Historical retrievals return the stored logs matching the requested filter. Every
/// subscription hands its producer end to the source, where the owner can pick it up with
/// [`MemoryLogSource::take_feed`] and push logs or a terminal error into it.
#[derive(Clone, Debug, Default)]
pub struct MemoryLogSource {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    logs: Vec<Log>,
    requested_filters: Vec<Filter>,
    feeds: VecDeque<LogFeed>,
    fetch_error: Option<BindingError>,
    subscribe_error: Option<BindingError>,
    buffer_capacity: Option<usize>,
}

impl MemoryLogSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_logs(logs: impl IntoIterator<Item = Log>) -> Self {
        let source = Self::new();
        source.state().logs.extend(logs);
        source
    }

    /// Buffer capacity of subscriptions opened from now on.
    #[must_use]
    pub fn subscription_buffer_capacity(self, capacity: usize) -> Self {
        self.state().buffer_capacity = Some(capacity);
        self
    }

    /// Stores a log for later historical retrievals. Live subscriptions are not notified.
    pub fn push_log(&self, log: Log) {
        self.state().logs.push(log);
    }

    /// Makes every following `fetch_logs` call fail with `error`.
    pub fn fail_fetches_with(&self, error: BindingError) {
        self.state().fetch_error = Some(error);
    }

    /// Makes every following `subscribe_logs` call fail with `error`.
    pub fn fail_subscriptions_with(&self, error: BindingError) {
        self.state().subscribe_error = Some(error);
    }

    /// Filters passed to `fetch_logs` and `subscribe_logs`, oldest first.
    #[must_use]
    pub fn requested_filters(&self) -> Vec<Filter> {
        self.state().requested_filters.clone()
    }

    /// Producer end of the oldest subscription not yet taken.
    #[must_use]
    pub fn take_feed(&self) -> Option<LogFeed> {
        let mut state = self.state();
        state.feeds.pop_front()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSource for MemoryLogSource {
    async fn fetch_logs(&self, filter: &Filter) -> Result<Vec<Log>, BindingError> {
        let mut state = self.state();
        state.requested_filters.push(filter.clone());
        if let Some(err) = &state.fetch_error {
            return Err(err.clone());
        }

        let mut matching: Vec<Log> =
            state.logs.iter().filter(|log| log_matches(filter, log)).cloned().collect();
        matching.sort_by_key(|log| (log.block_number, log.log_index));
        debug!(filter = ?filter, count = matching.len(), "Served logs from memory");
        Ok(matching)
    }

    async fn subscribe_logs(&self, filter: &Filter) -> Result<LogSubscription, BindingError> {
        let mut state = self.state();
        state.requested_filters.push(filter.clone());
        if let Some(err) = &state.subscribe_error {
            return Err(err.clone());
        }

        let capacity = state.buffer_capacity.unwrap_or(DEFAULT_SUBSCRIPTION_BUFFER_CAPACITY);
        let (feed, subscription) = LogSubscription::channel(capacity)?;
        state.feeds.push_back(feed);
        Ok(subscription)
    }
}

/// Address, topic and block-range matching as a node applies it to `eth_getLogs`.
fn log_matches(filter: &Filter, log: &Log) -> bool {
    if !filter.address.matches(&log.address()) {
        return false;
    }

    let topics = log.topics();
    for (position, accepted) in filter.topics.iter().enumerate() {
        if accepted.is_empty() {
            continue;
        }
        match topics.get(position) {
            Some(topic) if accepted.matches(topic) => {}
            _ => return false,
        }
    }

    match log.block_number {
        Some(block) => {
            filter.get_from_block().is_none_or(|from| block >= from) &&
                filter.get_to_block().is_none_or(|to| block <= to)
        }
        None => true,
    }
}
