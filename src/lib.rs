//! Typed filter, watch and parse access to EVM contract event logs.
//!
//! Generated contract bindings repeat one pattern for every event a contract declares: fetch past
//! logs and iterate them as typed records, subscribe to new logs and forward them as typed records,
//! or decode a single log. This crate implements that pattern once, generically over the event
//! type, and builds the per-contract bindings in [`bindings`] on top of it.
//!
//! # Historical logs
//!
//! [`ContractFilterer::filter`] fetches every matching log from a [`LogSource`] in one call and
//! returns an [`EventIterator`], which decodes lazily, one entry per [`EventIterator::next`].
//! The iterator yields `Some(Ok(event))` per record, `Some(Err(err))` once if retrieval or
//! decoding fails, and `None` afterwards. Failure is sticky: a failed iterator never yields
//! another record.
//!
//! # Live logs
//!
//! [`ContractFilterer::watch`] opens a live subscription and spawns one task that decodes each
//! arriving log and sends it into a caller-owned [`tokio::sync::mpsc::Sender`]. The returned
//! [`WatchSubscription`] cancels the session and reports its final status. A session prefers
//! cancellation and subscription errors over completing a pending send, and it never closes the
//! sink.
//!
//! # Ordering
//!
//! Records are delivered in the order the log source produced them, normally block number then
//! log index. Nothing is reordered or deduplicated.
//!
//! # Errors
//!
//! Decode errors and subscription errors are terminal for the iterator or session that hit
//! them and are reported exactly once. Exhaustion and cancellation are not errors. There is no
//! automatic reconnection: a caller that wants to keep watching after a failure starts a new
//! session.
//!
//! # Log sources
//!
//! [`robust_provider::RobustProvider`] reads logs over JSON-RPC with timeouts, retries and
//! fallback endpoints. [`MemoryLogSource`] serves logs held in memory.

#[macro_use]
mod logging;

pub mod bindings;
pub mod robust_provider;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

mod decoder;
mod error;
mod filter;
mod filterer;
mod iterator;
mod log_source;
mod types;
mod watcher;

pub use decoder::{EventDecoder, SolEventDecoder};
pub use error::BindingError;
pub use filter::{EventFilter, FilterOpts, IntoTopic, MAX_TOPIC_RULES, WatchOpts, topic_rule};
pub use filterer::ContractFilterer;
pub use iterator::EventIterator;
pub use log_source::{LogFeed, LogSource, LogSubscription, MemoryLogSource};
pub use types::{ChannelState, IteratorState, TypedEvent};
pub use watcher::{EventWatcher, WatchSubscription};
