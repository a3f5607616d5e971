//! Log fixtures and assertion macros shared by the crate's tests.

use alloy::{
    primitives::{Address, B256, U256, address},
    rpc::types::Log,
    sol,
    sol_types::SolEvent,
};

pub mod macros;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event ValidatorRemoved(address addr);
}

/// Emitting contract of every fixture log.
pub const TOKEN: Address = address!("0x5a443704dd4b594b382c22a083e2bd3090a6fef3");
pub const ALICE: Address = address!("0x00000000000000000000000000000000000000aa");
pub const BOB: Address = address!("0x00000000000000000000000000000000000000bb");
pub const CAROL: Address = address!("0x00000000000000000000000000000000000000cc");

/// Encodes `event` as a mined log of [`TOKEN`] at the given position.
#[must_use]
pub fn raw_log<E: SolEvent>(event: &E, block: u64, log_index: u64) -> Log {
    Log {
        inner: alloy::primitives::Log { address: TOKEN, data: event.encode_log_data() },
        block_hash: Some(B256::left_padding_from(&block.to_be_bytes())),
        block_number: Some(block),
        block_timestamp: None,
        transaction_hash: Some(B256::left_padding_from(&(block << 16 | log_index).to_be_bytes())),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

/// An `ALICE -> BOB` transfer of `value` at the given position.
#[must_use]
pub fn transfer_log(block: u64, log_index: u64, value: u64) -> Log {
    raw_log(&Transfer { from: ALICE, to: BOB, value: U256::from(value) }, block, log_index)
}
