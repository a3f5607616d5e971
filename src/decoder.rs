use std::marker::PhantomData;

use alloy::{rpc::types::Log, sol_types::SolEvent};

use crate::{BindingError, TypedEvent};

/// Turns a raw log into a typed event record.
///
/// Implementations must be pure: the same log always decodes to the same result.
pub trait EventDecoder<E>: Send + Sync + 'static {
    /// Name of the decoded event, used for logging.
    fn event_name(&self) -> &'static str;

    /// Decodes `log`, failing when its topics or data do not match the event's shape.
    ///
    /// # Errors
    ///
    /// * [`BindingError::MissingEventSignature`], [`BindingError::EventSignatureMismatch`] or
    ///   [`BindingError::Decode`] for logs of another shape.
    fn decode(&self, log: &Log) -> Result<E, BindingError>;

    /// Decodes `log` and keeps it alongside the record.
    ///
    /// # Errors
    ///
    /// See [`EventDecoder::decode`].
    fn decode_typed(&self, log: Log) -> Result<TypedEvent<E>, BindingError> {
        let event = self.decode(&log)?;
        Ok(TypedEvent::new(event, log))
    }
}

/// ABI decoder for events declared with [`alloy::sol!`].
pub struct SolEventDecoder<E> {
    _event: PhantomData<fn() -> E>,
}

impl<E> SolEventDecoder<E> {
    #[must_use]
    pub fn new() -> Self {
        Self { _event: PhantomData }
    }
}

impl<E> Default for SolEventDecoder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for SolEventDecoder<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for SolEventDecoder<E> {}

impl<E> std::fmt::Debug for SolEventDecoder<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolEventDecoder").field("event", &std::any::type_name::<E>()).finish()
    }
}

impl<E: SolEvent + 'static> EventDecoder<E> for SolEventDecoder<E> {
    fn event_name(&self) -> &'static str {
        E::SIGNATURE
    }

    fn decode(&self, log: &Log) -> Result<E, BindingError> {
        if !E::ANONYMOUS {
            let Some(found) = log.topics().first() else {
                return Err(BindingError::MissingEventSignature);
            };
            if *found != E::SIGNATURE_HASH {
                return Err(BindingError::EventSignatureMismatch {
                    expected: E::SIGNATURE_HASH,
                    found: *found,
                });
            }
        }
        Ok(E::decode_log_data(log.data())?)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{Address, LogData, U256, address};

    use super::*;
    use crate::test_utils::{Transfer, ValidatorRemoved, raw_log};

    const A: Address = address!("0x00000000000000000000000000000000000000aa");
    const B: Address = address!("0x00000000000000000000000000000000000000bb");

    #[test]
    fn decodes_indexed_and_data_fields() -> anyhow::Result<()> {
        let transfer = Transfer { from: A, to: B, value: U256::from(100) };
        let log = raw_log(&transfer, 1, 0);

        let decoded = SolEventDecoder::<Transfer>::new().decode_typed(log.clone())?;

        assert_eq!(decoded.event, transfer);
        assert_eq!(decoded.raw, log);
        Ok(())
    }

    #[test]
    fn rejects_log_without_topics() {
        let mut log = raw_log(&Transfer { from: A, to: B, value: U256::from(1) }, 1, 0);
        log.inner.data = LogData::new_unchecked(vec![], log.inner.data.data.clone());

        let result = SolEventDecoder::<Transfer>::new().decode(&log);

        assert_eq!(result, BindingError::MissingEventSignature);
    }

    #[test]
    fn rejects_log_of_another_event() {
        let log = raw_log(&ValidatorRemoved { addr: A }, 1, 0);

        let result = SolEventDecoder::<Transfer>::new().decode(&log);

        match result {
            Err(BindingError::EventSignatureMismatch { expected, found }) => {
                assert_eq!(expected, Transfer::SIGNATURE_HASH);
                assert_eq!(found, ValidatorRemoved::SIGNATURE_HASH);
            }
            other => panic!("Expected EventSignatureMismatch, got {other:?}"),
        }
    }

    #[test]
    fn rejects_truncated_data() {
        let mut log = raw_log(&Transfer { from: A, to: B, value: U256::from(1) }, 1, 0);
        let topics = log.inner.data.topics().to_vec();
        log.inner.data = LogData::new_unchecked(topics, vec![0u8; 4].into());

        let result = SolEventDecoder::<Transfer>::new().decode(&log);

        match result {
            Err(err @ BindingError::Decode(_)) => assert!(err.is_decode_error()),
            other => panic!("Expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn event_name_is_the_solidity_signature() {
        assert_eq!(
            SolEventDecoder::<Transfer>::new().event_name(),
            "Transfer(address,address,uint256)"
        );
    }
}
