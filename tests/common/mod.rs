#![allow(dead_code)]

use alloy::{
    primitives::{Address, B256, U256, address},
    rpc::types::Log,
    sol,
    sol_types::SolEvent,
};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    event Transfer(address indexed from, address indexed to, uint256 value);

    #[derive(Debug, PartialEq, Eq)]
    event CountIncreased(uint256 newCount);
}

pub const TOKEN: Address = address!("0x5a443704dd4b594b382c22a083e2bd3090a6fef3");
pub const A: Address = address!("0x00000000000000000000000000000000000000aa");
pub const B: Address = address!("0x00000000000000000000000000000000000000bb");
pub const C: Address = address!("0x00000000000000000000000000000000000000cc");

pub fn transfer(from: Address, to: Address, value: u64) -> Transfer {
    Transfer { from, to, value: U256::from(value) }
}

/// Encodes `event` as a log emitted by `TOKEN` at the given position.
pub fn mined<E: SolEvent>(event: &E, block: u64, log_index: u64) -> Log {
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

/// The `A -> B (100)`, `B -> C (50)`, `A -> C (25)` transfers, one per block.
pub fn three_transfers() -> Vec<Transfer> {
    vec![transfer(A, B, 100), transfer(B, C, 50), transfer(A, C, 25)]
}

pub fn three_transfer_logs() -> Vec<Log> {
    three_transfers().iter().zip(1..).map(|(event, block)| mined(event, block, 0)).collect()
}
