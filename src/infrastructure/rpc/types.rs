//! Raw JSON-RPC response normalization
//!
//! Blocks and transactions are fetched as raw JSON and parsed by hand so
//! chains with non-standard fields still render. Hex quantities are
//! tolerant of missing keys; absent numbers parse to zero where display
//! demands a value and to `None` where the distinction matters (pending
//! blocks, contract creations).

use alloy_primitives::{Bytes, U256};
use anyhow::{Context, Result};

use crate::domain::units::parse_quantity;

/// A block normalized from `eth_getBlockByNumber`/`eth_getBlockByHash`.
#[derive(Debug, Clone)]
pub struct RawBlock {
    /// `None` for the pending pseudo-block.
    pub number: Option<u64>,
    /// `None` for the pending pseudo-block.
    pub hash: Option<String>,
    pub parent_hash: String,
    pub timestamp: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub miner: String,
    pub difficulty: Option<String>,
    pub total_difficulty: Option<String>,
    pub size: u64,
    pub transactions: BlockTransactions,
}

impl RawBlock {
    pub fn tx_count(&self) -> usize {
        match &self.transactions {
            BlockTransactions::Hashes(hashes) => hashes.len(),
            BlockTransactions::Full(txs) => txs.len(),
        }
    }
}

/// The node returns either bare hashes or embedded transaction objects
/// depending on the `full` flag; some nodes mix both in pending blocks.
#[derive(Debug, Clone)]
pub enum BlockTransactions {
    Hashes(Vec<String>),
    Full(Vec<RawTransaction>),
}

impl BlockTransactions {
    pub fn full(&self) -> &[RawTransaction] {
        match self {
            BlockTransactions::Full(txs) => txs,
            BlockTransactions::Hashes(_) => &[],
        }
    }
}

/// A transaction normalized from RPC (or rebuilt from an indexer row).
#[derive(Debug, Clone, Default)]
pub struct RawTransaction {
    pub hash: String,
    /// `None` while pending.
    pub block_number: Option<u64>,
    pub block_hash: Option<String>,
    pub from: String,
    /// `None` for contract creation.
    pub to: Option<String>,
    pub value: U256,
    pub gas: u64,
    pub gas_price: U256,
    pub nonce: u64,
    pub input: Bytes,
    /// `None` while pending.
    pub transaction_index: Option<u64>,
    /// Block timestamp, stitched in by the caller; RPC txs don't carry one.
    pub timestamp: Option<u64>,
}

/// A receipt normalized from `eth_getTransactionReceipt`.
#[derive(Debug, Clone)]
pub struct RawReceipt {
    pub transaction_hash: String,
    pub block_number: u64,
    pub block_hash: String,
    pub from: String,
    pub to: Option<String>,
    pub gas_used: u64,
    /// `None` on pre-Byzantium-style chains that omit status.
    pub status: Option<bool>,
    pub effective_gas_price: Option<U256>,
    pub log_count: usize,
}

pub fn parse_raw_block(json: &serde_json::Value) -> Result<RawBlock> {
    let number = opt_str(json, "number").and_then(|s| parse_hex_u64(&s).ok());
    let hash = opt_str(json, "hash");
    let parent_hash = opt_str(json, "parentHash").unwrap_or_else(|| "0x0".to_string());
    let timestamp = hex_u64_or_zero(json, "timestamp");
    let gas_limit = hex_u64_or_zero(json, "gasLimit");
    let gas_used = hex_u64_or_zero(json, "gasUsed");
    let size = hex_u64_or_zero(json, "size");
    let miner = opt_str(json, "miner")
        .unwrap_or_else(|| "0x0000000000000000000000000000000000000000".to_string());
    let difficulty = opt_str(json, "difficulty");
    let total_difficulty = opt_str(json, "totalDifficulty");

    let transactions = match json.get("transactions").and_then(|v| v.as_array()) {
        Some(entries) => parse_block_transactions(entries),
        None => BlockTransactions::Hashes(Vec::new()),
    };

    Ok(RawBlock {
        number,
        hash,
        parent_hash,
        timestamp,
        gas_limit,
        gas_used,
        miner,
        difficulty,
        total_difficulty,
        size,
        transactions,
    })
}

fn parse_block_transactions(entries: &[serde_json::Value]) -> BlockTransactions {
    // A block with only string entries stays hash-only; otherwise keep the
    // parseable objects (hash-only stragglers are fetched individually by
    // the service when it needs them).
    if entries.iter().all(|e| e.is_string()) {
        let hashes = entries
            .iter()
            .filter_map(|e| e.as_str().map(str::to_string))
            .collect();
        return BlockTransactions::Hashes(hashes);
    }
    let txs = entries.iter().filter_map(parse_raw_transaction).collect();
    BlockTransactions::Full(txs)
}

pub fn parse_raw_transaction(json: &serde_json::Value) -> Option<RawTransaction> {
    let hash = json.get("hash")?.as_str()?.to_string();
    let from = json.get("from")?.as_str()?.to_string();
    let to = opt_str(json, "to");

    let value = opt_str(json, "value")
        .and_then(|s| parse_quantity(&s))
        .unwrap_or(U256::ZERO);
    let gas_price = opt_str(json, "gasPrice")
        .and_then(|s| parse_quantity(&s))
        .unwrap_or(U256::ZERO);

    let input_str = opt_str(json, "input").unwrap_or_else(|| "0x".to_string());
    let input_bytes =
        hex::decode(input_str.strip_prefix("0x").unwrap_or(&input_str)).unwrap_or_default();

    Some(RawTransaction {
        hash,
        block_number: opt_str(json, "blockNumber").and_then(|s| parse_hex_u64(&s).ok()),
        block_hash: opt_str(json, "blockHash"),
        from,
        to,
        value,
        gas: hex_u64_or_zero(json, "gas"),
        gas_price,
        nonce: hex_u64_or_zero(json, "nonce"),
        input: Bytes::from(input_bytes),
        transaction_index: opt_str(json, "transactionIndex").and_then(|s| parse_hex_u64(&s).ok()),
        timestamp: None,
    })
}

pub fn parse_raw_receipt(json: &serde_json::Value) -> Option<RawReceipt> {
    let transaction_hash = json.get("transactionHash")?.as_str()?.to_string();
    let status = opt_str(json, "status")
        .and_then(|s| parse_hex_u64(&s).ok())
        .map(|v| v == 1);
    let log_count = json
        .get("logs")
        .and_then(|v| v.as_array())
        .map(|logs| logs.len())
        .unwrap_or(0);

    Some(RawReceipt {
        transaction_hash,
        block_number: hex_u64_or_zero(json, "blockNumber"),
        block_hash: opt_str(json, "blockHash").unwrap_or_default(),
        from: opt_str(json, "from").unwrap_or_default(),
        to: opt_str(json, "to"),
        gas_used: hex_u64_or_zero(json, "gasUsed"),
        status,
        effective_gas_price: opt_str(json, "effectiveGasPrice").and_then(|s| parse_quantity(&s)),
        log_count,
    })
}

/// Parse a `0x`-prefixed hex string to u64.
pub fn parse_hex_u64(s: &str) -> Result<u64> {
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u64::from_str_radix(s, 16).context("Failed to parse hex u64")
}

fn opt_str(json: &serde_json::Value, key: &str) -> Option<String> {
    json.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn hex_u64_or_zero(json: &serde_json::Value, key: &str) -> u64 {
    opt_str(json, key)
        .and_then(|s| parse_hex_u64(&s).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_raw_block_full_txs() {
        let block = json!({
            "number": "0x2612f43",
            "hash": "0xaa",
            "parentHash": "0xbb",
            "timestamp": "0x68b0c000",
            "gasLimit": "0x1c9c380",
            "gasUsed": "0x5208",
            "miner": "0x1111111111111111111111111111111111111111",
            "size": "0x220",
            "transactions": [{
                "hash": "0xcc",
                "from": "0x2222222222222222222222222222222222222222",
                "to": "0x3333333333333333333333333333333333333333",
                "value": "0xde0b6b3a7640000",
                "gas": "0x5208",
                "gasPrice": "0x3b9aca00",
                "nonce": "0x1",
                "input": "0x",
                "blockNumber": "0x2612f43",
                "transactionIndex": "0x0"
            }]
        });

        let parsed = parse_raw_block(&block).unwrap();
        assert_eq!(parsed.number, Some(39_923_523));
        assert_eq!(parsed.gas_used, 21_000);
        assert_eq!(parsed.tx_count(), 1);

        let tx = &parsed.transactions.full()[0];
        assert_eq!(tx.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(tx.gas_price, U256::from(1_000_000_000u64));
        assert_eq!(tx.transaction_index, Some(0));
    }

    #[test]
    fn test_parse_raw_block_hash_only() {
        let block = json!({
            "number": "0x10",
            "hash": "0xaa",
            "timestamp": "0x1",
            "transactions": ["0x01", "0x02"]
        });
        let parsed = parse_raw_block(&block).unwrap();
        match parsed.transactions {
            BlockTransactions::Hashes(ref hashes) => assert_eq!(hashes.len(), 2),
            _ => panic!("expected hash-only transactions"),
        }
    }

    #[test]
    fn test_parse_pending_block() {
        let block = json!({
            "number": null,
            "hash": null,
            "timestamp": "0x68b0c000",
            "transactions": []
        });
        let parsed = parse_raw_block(&block).unwrap();
        assert_eq!(parsed.number, None);
        assert_eq!(parsed.hash, None);
    }

    #[test]
    fn test_parse_contract_creation_tx() {
        let tx = json!({
            "hash": "0xdd",
            "from": "0x2222222222222222222222222222222222222222",
            "to": null,
            "value": "0x0",
            "gas": "0x100000",
            "nonce": "0x0",
            "input": "0x6080604052"
        });
        let parsed = parse_raw_transaction(&tx).unwrap();
        assert_eq!(parsed.to, None);
        assert_eq!(parsed.input.len(), 5);
        assert_eq!(parsed.block_number, None);
    }

    #[test]
    fn test_parse_raw_receipt() {
        let receipt = json!({
            "transactionHash": "0xcc",
            "blockNumber": "0x10",
            "blockHash": "0xaa",
            "from": "0x2222222222222222222222222222222222222222",
            "to": "0x3333333333333333333333333333333333333333",
            "gasUsed": "0x5208",
            "status": "0x1",
            "effectiveGasPrice": "0x3b9aca00",
            "logs": [{}, {}]
        });
        let parsed = parse_raw_receipt(&receipt).unwrap();
        assert_eq!(parsed.status, Some(true));
        assert_eq!(parsed.gas_used, 21_000);
        assert_eq!(parsed.log_count, 2);
        assert_eq!(
            parsed.effective_gas_price,
            Some(U256::from(1_000_000_000u64))
        );
    }

    #[test]
    fn test_parse_receipt_reverted() {
        let receipt = json!({
            "transactionHash": "0xcc",
            "blockNumber": "0x10",
            "gasUsed": "0x5208",
            "status": "0x0"
        });
        let parsed = parse_raw_receipt(&receipt).unwrap();
        assert_eq!(parsed.status, Some(false));
    }
}
