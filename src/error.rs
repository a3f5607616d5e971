use std::{mem::discriminant, sync::Arc};

use alloy::{
    primitives::B256,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

use crate::robust_provider::Error as RobustProviderError;

/// Errors surfaced by iterators, watch sessions and log sources.
///
/// Every variant is terminal for the iterator or watch session that reports it. Exhaustion and
/// cancellation are not errors and never appear here.
#[derive(Error, Debug, Clone)]
pub enum BindingError {
    /// The underlying RPC transport returned an error.
    #[error("RPC error: {0}")]
    RpcError(Arc<RpcError<TransportErrorKind>>),

    /// A timeout elapsed while waiting for an RPC response.
    #[error("Operation timed out")]
    Timeout,

    /// The log carries no topics, so it cannot belong to a non-anonymous event.
    #[error("Log has no event signature topic")]
    MissingEventSignature,

    /// The first topic of the log is not the signature of the requested event.
    #[error("Event signature mismatch, expected {expected}, found {found}")]
    EventSignatureMismatch { expected: B256, found: B256 },

    /// The log's topics or data could not be ABI-decoded into the requested event.
    #[error("Failed to decode event log: {0}")]
    Decode(Arc<alloy::sol_types::Error>),

    /// The live log feed ended without being cancelled.
    #[error("Subscription closed")]
    SubscriptionClosed,

    /// The upstream subscription dropped entries because the consumer fell behind.
    ///
    /// The contained value is the number of skipped entries reported by the transport.
    #[error("Subscription lagged by {0} entries")]
    Lagged(u64),

    /// More indexed-argument topic rules were supplied than a log can carry.
    #[error("At most 3 indexed topic rules are supported, got {0}")]
    TooManyTopicRules(usize),

    /// The configured subscription buffer capacity is invalid (must be greater than zero).
    #[error("Subscription buffer capacity must be greater than 0")]
    InvalidBufferCapacity,

    /// The watch task panicked or was aborted by the runtime.
    #[error("Watch task terminated abnormally")]
    WatcherAborted,
}

impl From<RobustProviderError> for BindingError {
    fn from(error: RobustProviderError) -> BindingError {
        match error {
            RobustProviderError::Timeout => BindingError::Timeout,
            RobustProviderError::RpcError(err) => BindingError::RpcError(err),
        }
    }
}

impl From<RpcError<TransportErrorKind>> for BindingError {
    fn from(error: RpcError<TransportErrorKind>) -> Self {
        BindingError::RpcError(Arc::new(error))
    }
}

impl From<alloy::sol_types::Error> for BindingError {
    fn from(error: alloy::sol_types::Error) -> Self {
        BindingError::Decode(Arc::new(error))
    }
}

impl BindingError {
    /// Returns `true` for errors raised while turning a raw log into a typed event.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            BindingError::MissingEventSignature |
                BindingError::EventSignatureMismatch { .. } |
                BindingError::Decode(_)
        )
    }
}

/// Variant-level equality, payloads are ignored.
impl PartialEq for BindingError {
    fn eq(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }
}

impl<T> PartialEq<BindingError> for Result<T, BindingError> {
    fn eq(&self, other: &BindingError) -> bool {
        match self {
            Ok(_) => false,
            Err(err) => err == other,
        }
    }
}
