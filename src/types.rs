use alloy::rpc::types::Log;

use crate::BindingError;

/// A decoded event together with the raw log it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedEvent<E> {
    /// The decoded business record.
    pub event: E,
    /// Blockchain-specific context: address, topics, data and block/tx/log positions.
    pub raw: Log,
}

impl<E> TypedEvent<E> {
    #[must_use]
    pub fn new(event: E, raw: Log) -> Self {
        Self { event, raw }
    }

    /// Drops the provenance and returns the decoded record.
    #[must_use]
    pub fn into_event(self) -> E {
        self.event
    }

    #[must_use]
    pub fn block_number(&self) -> Option<u64> {
        self.raw.block_number
    }

    #[must_use]
    pub fn log_index(&self) -> Option<u64> {
        self.raw.log_index
    }
}

/// Lifecycle of an [`EventIterator`](crate::EventIterator).
///
/// `Exhausted` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum IteratorState {
    /// The upstream feed may still produce entries.
    Open,
    /// The upstream finished cleanly; entries already buffered are still served.
    Draining,
    /// No more entries, no error.
    Exhausted,
    /// Retrieval or decoding failed; no further entries are ever yielded.
    Failed(BindingError),
}

impl IteratorState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, IteratorState::Exhausted | IteratorState::Failed(_))
    }

    /// The error that stopped iteration, if any.
    #[must_use]
    pub fn error(&self) -> Option<&BindingError> {
        match self {
            IteratorState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Whether the receiving side of a delivery is still listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Open,
    Closed,
}

impl ChannelState {
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, ChannelState::Open)
    }

    #[must_use]
    pub fn is_closed(self) -> bool {
        matches!(self, ChannelState::Closed)
    }
}
