//! Typed bindings for the events of the Autonity protocol contracts.
//!
//! Each contract gets a filterer wrapping a [`ContractFilterer`](crate::ContractFilterer) with
//! one `filter_*`, `watch_*` and `parse_*` method per event. Indexed arguments become slice
//! parameters: every given value is accepted, and an empty slice accepts any value.

/// Expands to the `filter_*`, `watch_*` and `parse_*` methods of a set of events, inside an
/// `impl` block of a type with an `inner: ContractFilterer<S>` field.
macro_rules! event_methods {
    ($(
        $event:ident => $filter:ident, $watch:ident, $parse:ident $(, [$($arg:ident: $ty:ty),+])?;
    )+) => {
        $(
            #[doc = concat!("Retrieves past [`", stringify!($event), "`] events.")]
            ///
            /// # Errors
            ///
            /// The log source's error if the retrieval fails.
            pub async fn $filter(
                &self,
                opts: &$crate::FilterOpts,
                $($($arg: &[$ty],)+)?
            ) -> Result<$crate::EventIterator<$event>, $crate::BindingError> {
                self.inner
                    .filter::<$event>(opts, vec![$($($crate::topic_rule($arg)),+)?])
                    .await
            }

            #[doc = concat!("Forwards new [`", stringify!($event), "`] events into `sink`.")]
            ///
            /// # Errors
            ///
            /// The log source's error if the subscription cannot be established.
            pub async fn $watch(
                &self,
                opts: &$crate::WatchOpts,
                sink: ::tokio::sync::mpsc::Sender<$crate::TypedEvent<$event>>,
                $($($arg: &[$ty],)+)?
            ) -> Result<$crate::WatchSubscription, $crate::BindingError> {
                self.inner
                    .watch::<$event>(opts, sink, vec![$($($crate::topic_rule($arg)),+)?])
                    .await
            }

            #[doc = concat!("Decodes one log as a [`", stringify!($event), "`] event.")]
            ///
            /// # Errors
            ///
            /// A decode error if the log is not of this event.
            pub fn $parse(
                &self,
                log: ::alloy::rpc::types::Log,
            ) -> Result<$crate::TypedEvent<$event>, $crate::BindingError> {
                self.inner.parse::<$event>(log)
            }
        )+
    };
}

pub mod autonity;
pub mod liquid;

pub use autonity::AutonityFilterer;
pub use liquid::LiquidFilterer;
