//! Display-ready domain objects produced by the service

use alloy_primitives::U256;

use crate::domain::calldata::NftStandard;
use crate::infrastructure::rpc::{RawBlock, RawReceipt, RawTransaction};

/// A block row for list views.
#[derive(Debug, Clone)]
pub struct BlockSummary {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub tx_count: usize,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub miner: String,
    pub size: u64,
}

impl BlockSummary {
    /// Mined blocks only; the pending pseudo-block has no number/hash.
    pub fn from_raw(block: &RawBlock) -> Option<Self> {
        Some(Self {
            number: block.number?,
            hash: block.hash.clone()?,
            parent_hash: block.parent_hash.clone(),
            timestamp: block.timestamp,
            tx_count: block.tx_count(),
            gas_used: block.gas_used,
            gas_limit: block.gas_limit,
            miner: block.miner.clone(),
            size: block.size,
        })
    }

    /// Gas utilization in percent, zero-safe.
    pub fn gas_utilization(&self) -> f64 {
        if self.gas_limit == 0 {
            return 0.0;
        }
        (self.gas_used as f64 / self.gas_limit as f64) * 100.0
    }
}

/// A transaction joined with its receipt, fee derived.
#[derive(Debug, Clone)]
pub struct TransactionDetail {
    pub tx: RawTransaction,
    pub receipt: Option<RawReceipt>,
    /// gas_used x effective gas price; `None` until mined.
    pub fee_wei: Option<U256>,
    /// Present when the calldata is an ERC-20 transfer.
    pub token_transfer: Option<TokenTransferView>,
}

/// Balance + classification + recent activity for an address.
#[derive(Debug, Clone)]
pub struct AddressSummary {
    pub address: String,
    pub balance_wei: U256,
    pub is_contract: bool,
    pub code_size: usize,
    pub transactions: Vec<RawTransaction>,
}

/// Network headline numbers for the overview section.
#[derive(Debug, Clone)]
pub struct NetworkStats {
    pub head: u64,
    pub gas_price_wei: U256,
    pub total_transactions: u64,
    pub chain_id: u64,
}

/// A ranked account from the recent-activity balance harvest.
#[derive(Debug, Clone)]
pub struct TopAccount {
    pub rank: usize,
    pub address: String,
    pub balance_wei: U256,
}

/// ERC-20 metadata fetched via eth_call, best effort.
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: u8,
}

impl TokenMetadata {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown Token")
    }

    pub fn display_symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("UNK")
    }
}

/// A detected ERC-20 transfer, joined with token metadata.
#[derive(Debug, Clone)]
pub struct TokenTransferView {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub timestamp: Option<u64>,
    pub from: String,
    pub to: String,
    /// Amount scaled by the token's decimals.
    pub amount: String,
    pub token: TokenMetadata,
}

/// A detected mint, joined with the collection name.
#[derive(Debug, Clone)]
pub struct NftMintView {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub timestamp: Option<u64>,
    pub minter: String,
    pub standard: NftStandard,
    pub token_id: Option<U256>,
    pub quantity: U256,
    pub collection: Option<String>,
    pub contract: String,
}

/// A detected NFT transfer.
#[derive(Debug, Clone)]
pub struct NftTransferView {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub timestamp: Option<u64>,
    pub method: &'static str,
    pub from: String,
    pub to: String,
    pub standard: NftStandard,
    pub token_id: Option<U256>,
    pub quantity: U256,
    pub collection: Option<String>,
    pub contract: String,
}

/// Resolved search result, after RPC disambiguation.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Block(BlockSummary),
    Transaction(Box<TransactionDetail>),
    Address(AddressSummary),
    Contract(AddressSummary),
    NotFound { term: String, hint: String },
}
