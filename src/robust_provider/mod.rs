//! Retrying, failover-aware log access over Alloy providers.
//!
//! [`RobustProvider`] wraps one primary [`RootProvider`](alloy::providers::RootProvider) and any
//! number of fallbacks, and implements [`LogSource`](crate::LogSource) on top of them:
//! * `eth_getLogs` calls are bounded by a timeout and retried with exponential backoff
//! * a provider that keeps failing is replaced by the next fallback, in the order added
//! * `eth_subscribe("logs")` picks the first provider with a pubsub transport and pumps its
//!   notifications into a bounded [`LogSubscription`](crate::LogSubscription)
//!
//! A dropped live subscription is reported as [`BindingError::SubscriptionClosed`] and a
//! lagging one as [`BindingError::Lagged`](crate::BindingError::Lagged); neither is resumed.
//!
//! [`BindingError::SubscriptionClosed`]: crate::BindingError::SubscriptionClosed
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use event_bindings::{
//!     EventFilter,
//!     robust_provider::{RobustProvider, RobustProviderBuilder},
//! };
//!
//! # async fn example() -> Result<(), event_bindings::BindingError> {
//! let robust: RobustProvider = RobustProviderBuilder::new("ws://localhost:8545")
//!     .fallback("ws://localhost:8546")
//!     .call_timeout(Duration::from_secs(30))
//!     .build()
//!     .await?;
//!
//! let logs = robust.get_logs(&EventFilter::new().into()).await?;
//! println!("{} logs so far", logs.len());
//! # Ok(()) }
//! ```

pub mod builder;
pub mod provider;
pub mod provider_conversion;
mod subscription;

pub use builder::*;
pub use provider::{Error, RobustProvider};
pub use provider_conversion::{IntoRobustProvider, IntoRootProvider};
