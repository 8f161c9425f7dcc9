//! JSON-RPC node collaborator

mod provider;
mod types;

pub use provider::{create_rpc, ChainRpc, HttpRpc};
pub use types::{
    parse_hex_u64, parse_raw_block, parse_raw_receipt, parse_raw_transaction, BlockTransactions,
    RawBlock, RawReceipt, RawTransaction,
};
