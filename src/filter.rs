use std::fmt::{Display, Formatter};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, U256, keccak256},
    rpc::types::Filter,
};

use crate::BindingError;

/// Maximum number of indexed-argument topic rules; topic 0 is the event signature.
pub const MAX_TOPIC_RULES: usize = 3;

/// Selects the logs a filter or watch session receives.
///
/// An empty list of addresses or signatures matches any value, and so does an empty topic rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub(crate) contract_addresses: Vec<Address>,
    pub(crate) event_signatures: Vec<B256>,
    pub(crate) topic_rules: Vec<Vec<B256>>,
}

impl EventFilter {
    #[must_use]
    pub fn new() -> Self {
        EventFilter::default()
    }

    /// Restricts the filter to logs emitted by `address`. Can be called repeatedly.
    #[must_use]
    pub fn contract_address(mut self, address: impl Into<Address>) -> Self {
        self.contract_addresses.push(address.into());
        self
    }

    /// Restricts the filter to the event with the given canonical signature, e.g.
    /// `"Transfer(address,address,uint256)"`.
    #[must_use]
    pub fn event(self, signature: impl AsRef<str>) -> Self {
        self.event_signature(keccak256(signature.as_ref()))
    }

    /// Restricts the filter to the event with the given signature hash.
    #[must_use]
    pub fn event_signature(mut self, signature_hash: B256) -> Self {
        self.event_signatures.push(signature_hash);
        self
    }

    /// Appends the rule for the next indexed argument, in declaration order.
    #[must_use]
    pub fn topic_rule(mut self, rule: Vec<B256>) -> Self {
        self.topic_rules.push(rule);
        self
    }

    /// Appends one rule per item of `rules`.
    #[must_use]
    pub fn topic_rules(mut self, rules: impl IntoIterator<Item = Vec<B256>>) -> Self {
        self.topic_rules.extend(rules);
        self
    }

    #[must_use]
    pub fn contract_addresses(&self) -> &[Address] {
        &self.contract_addresses
    }

    #[must_use]
    pub fn event_signatures(&self) -> &[B256] {
        &self.event_signatures
    }

    /// Fails if more rules were supplied than a log has indexed topics.
    ///
    /// # Errors
    ///
    /// * [`BindingError::TooManyTopicRules`]
    pub fn validate(&self) -> Result<(), BindingError> {
        if self.topic_rules.len() > MAX_TOPIC_RULES {
            return Err(BindingError::TooManyTopicRules(self.topic_rules.len()));
        }
        Ok(())
    }

    /// Builds the RPC filter for a bounded historical retrieval.
    #[must_use]
    pub fn to_log_filter(&self, opts: &FilterOpts) -> Filter {
        Filter::from(self).from_block(opts.from_block).to_block(opts.to_block)
    }

    /// Builds the RPC filter for a live subscription.
    #[must_use]
    pub fn to_subscription_filter(&self, opts: &WatchOpts) -> Filter {
        let filter = Filter::from(self);
        match opts.from_block {
            Some(from_block) => filter.from_block(from_block),
            None => filter,
        }
    }
}

impl Display for EventFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut content = vec![];
        if !self.contract_addresses.is_empty() {
            content.push(format!("contracts: {:?}", self.contract_addresses));
        }
        if !self.event_signatures.is_empty() {
            content.push(format!("event_signatures: {:?}", self.event_signatures));
        }
        if self.topic_rules.iter().any(|rule| !rule.is_empty()) {
            content.push(format!("topic_rules: {:?}", self.topic_rules));
        }
        write!(f, "EventFilter({})", content.join(", "))
    }
}

impl From<&EventFilter> for Filter {
    fn from(event_filter: &EventFilter) -> Self {
        let mut filter = Filter::new();
        if !event_filter.contract_addresses.is_empty() {
            filter = filter.address(event_filter.contract_addresses.clone());
        }
        if !event_filter.event_signatures.is_empty() {
            filter = filter.event_signature(event_filter.event_signatures.clone());
        }
        // empty rules stay wildcards; rules past the third are rejected by `validate`
        for (position, rule) in event_filter.topic_rules.iter().enumerate() {
            if rule.is_empty() {
                continue;
            }
            filter = match position {
                0 => filter.topic1(rule.clone()),
                1 => filter.topic2(rule.clone()),
                2 => filter.topic3(rule.clone()),
                _ => filter,
            };
        }
        filter
    }
}

impl From<EventFilter> for Filter {
    fn from(event_filter: EventFilter) -> Self {
        Filter::from(&event_filter)
    }
}

/// Block bounds for a historical retrieval.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterOpts {
    pub(crate) from_block: BlockNumberOrTag,
    pub(crate) to_block: BlockNumberOrTag,
}

impl Default for FilterOpts {
    fn default() -> Self {
        Self { from_block: BlockNumberOrTag::Earliest, to_block: BlockNumberOrTag::Latest }
    }
}

impl FilterOpts {
    /// Retrieves logs from `Earliest` to `Latest`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.from_block = block.into();
        self
    }

    #[must_use]
    pub fn to_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.to_block = block.into();
        self
    }
}

/// Options for a live subscription.
///
/// Without a starting block only logs from blocks produced after subscribing are delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WatchOpts {
    pub(crate) from_block: Option<BlockNumberOrTag>,
}

impl WatchOpts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_block(mut self, block: impl Into<BlockNumberOrTag>) -> Self {
        self.from_block = Some(block.into());
        self
    }
}

/// Encodes a value of an indexed event argument the way it appears in a log topic.
pub trait IntoTopic {
    fn into_topic(&self) -> B256;
}

impl IntoTopic for B256 {
    fn into_topic(&self) -> B256 {
        *self
    }
}

impl IntoTopic for Address {
    fn into_topic(&self) -> B256 {
        self.into_word()
    }
}

impl IntoTopic for U256 {
    fn into_topic(&self) -> B256 {
        B256::from(self.to_be_bytes::<32>())
    }
}

impl IntoTopic for u64 {
    fn into_topic(&self) -> B256 {
        U256::from(*self).into_topic()
    }
}

impl IntoTopic for bool {
    fn into_topic(&self) -> B256 {
        U256::from(u8::from(*self)).into_topic()
    }
}

// dynamic types are indexed by the hash of their contents
impl IntoTopic for str {
    fn into_topic(&self) -> B256 {
        keccak256(self.as_bytes())
    }
}

impl IntoTopic for String {
    fn into_topic(&self) -> B256 {
        self.as_str().into_topic()
    }
}

impl<T: IntoTopic + ?Sized> IntoTopic for &T {
    fn into_topic(&self) -> B256 {
        (**self).into_topic()
    }
}

/// Flattens the accepted values of one indexed argument into a topic rule.
///
/// An empty slice yields an empty rule, which matches any value.
#[must_use]
pub fn topic_rule<T: IntoTopic>(values: &[T]) -> Vec<B256> {
    values.iter().map(IntoTopic::into_topic).collect()
}
