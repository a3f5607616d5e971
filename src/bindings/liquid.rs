use alloy::{primitives::Address, sol};

use crate::{ContractFilterer, LogSource};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Approval(address indexed owner, address indexed spender, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Event access for a validator's Liquid Newton contract.
#[derive(Clone, Debug)]
pub struct LiquidFilterer<S> {
    inner: ContractFilterer<S>,
}

impl<S: LogSource> LiquidFilterer<S> {
    #[must_use]
    pub fn new(address: Address, source: S) -> Self {
        Self { inner: ContractFilterer::new(address, source) }
    }

    #[must_use]
    pub fn filterer(&self) -> &ContractFilterer<S> {
        &self.inner
    }

    event_methods! {
        Approval => filter_approval, watch_approval, parse_approval,
            [owner: Address, spender: Address];
        Transfer => filter_transfer, watch_transfer, parse_transfer, [from: Address, to: Address];
    }
}
