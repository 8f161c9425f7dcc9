//! Normalized accessors over the RPC node and the indexer
//!
//! One service object wraps both collaborators. List endpoints prefer the
//! indexer and silently fall back to RPC block scanning when it is down;
//! detail endpoints are RPC-only. Token metadata lookups are cached for
//! the lifetime of the service.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::calldata::{
    decode_abi_string, decode_abi_u8, decode_nft_mint, decode_nft_transfer,
    decode_token_transfer, SEL_DECIMALS, SEL_NAME, SEL_SYMBOL,
};
use crate::domain::format::normalize_address;
use crate::domain::search::{classify, SearchTerm};
use crate::domain::units::format_token_amount;
use crate::explorer::views::{
    AddressSummary, BlockSummary, NetworkStats, NftMintView, NftTransferView, SearchOutcome,
    TokenMetadata, TokenTransferView, TopAccount, TransactionDetail,
};
use crate::infrastructure::indexer::IndexerClient;
use crate::infrastructure::rpc::{BlockTransactions, ChainRpc, RawBlock, RawTransaction};

/// How far back the RPC fallback scans when the indexer is unavailable.
const FALLBACK_SCAN_BLOCKS: u64 = 50;

/// Cap on per-list eth_call fan-out when joining token metadata.
const METADATA_LOOKUP_CAP: usize = 25;

pub struct ExplorerService {
    rpc: Box<dyn ChainRpc>,
    indexer: Option<IndexerClient>,
    token_cache: RwLock<HashMap<String, TokenMetadata>>,
}

impl ExplorerService {
    pub fn new(rpc: Box<dyn ChainRpc>, indexer: Option<IndexerClient>) -> Self {
        Self {
            rpc,
            indexer,
            token_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn endpoint_name(&self) -> String {
        self.rpc.endpoint_name()
    }

    pub async fn head(&self) -> Result<u64> {
        self.rpc.block_number().await
    }

    /// Walk the chain head backwards.
    pub async fn latest_blocks(&self, count: usize) -> Result<Vec<BlockSummary>> {
        let head = self.rpc.block_number().await?;
        let mut blocks = Vec::with_capacity(count);
        for offset in 0..count as u64 {
            let Some(number) = head.checked_sub(offset) else {
                break;
            };
            if let Some(block) = self.rpc.get_block(number, false).await? {
                if let Some(summary) = BlockSummary::from_raw(&block) {
                    blocks.push(summary);
                }
            }
        }
        Ok(blocks)
    }

    pub async fn block_by_number(&self, number: u64) -> Result<Option<RawBlock>> {
        self.rpc.get_block(number, true).await
    }

    pub async fn block_by_hash(&self, hash: &str) -> Result<Option<RawBlock>> {
        self.rpc.get_block_by_hash(hash, true).await
    }

    /// Transactions of a block, with the block timestamp stitched in.
    /// Hash-only entries are fetched individually.
    pub async fn block_transactions(&self, block: &RawBlock) -> Result<Vec<RawTransaction>> {
        let mut txs = Vec::new();
        match &block.transactions {
            BlockTransactions::Full(full) => {
                for tx in full {
                    let mut tx = tx.clone();
                    tx.timestamp = Some(block.timestamp);
                    txs.push(tx);
                }
            }
            BlockTransactions::Hashes(hashes) => {
                for hash in hashes {
                    if let Some(mut tx) = self.rpc.get_transaction(hash).await? {
                        tx.timestamp = Some(block.timestamp);
                        txs.push(tx);
                    }
                }
            }
        }
        Ok(txs)
    }

    /// Most recent transactions, newest first. Indexer first, RPC scan on
    /// failure.
    pub async fn latest_transactions(&self, count: usize) -> Result<Vec<RawTransaction>> {
        if let Some(indexer) = &self.indexer {
            match indexer.latest_transactions(count).await {
                Ok(txs) => return Ok(txs),
                Err(_) => {
                    // fall through to the RPC scan
                }
            }
        }
        self.scan_recent_transactions(count).await
    }

    async fn scan_recent_transactions(&self, count: usize) -> Result<Vec<RawTransaction>> {
        let head = self.rpc.block_number().await?;
        let floor = head.saturating_sub(FALLBACK_SCAN_BLOCKS);
        let mut txs: Vec<RawTransaction> = Vec::new();

        let mut number = head;
        while number >= floor && txs.len() < count {
            let block = match self.rpc.get_block(number, true).await {
                Ok(Some(block)) => block,
                _ => {
                    if number == 0 {
                        break;
                    }
                    number -= 1;
                    continue;
                }
            };

            let remaining = count - txs.len();
            match &block.transactions {
                BlockTransactions::Full(full) => {
                    for tx in full.iter().take(remaining) {
                        let mut tx = tx.clone();
                        tx.timestamp = Some(block.timestamp);
                        txs.push(tx);
                    }
                }
                BlockTransactions::Hashes(hashes) => {
                    for hash in hashes.iter().take(remaining) {
                        if let Ok(Some(mut tx)) = self.rpc.get_transaction(hash).await {
                            tx.timestamp = Some(block.timestamp);
                            txs.push(tx);
                        }
                    }
                }
            }

            if number == 0 {
                break;
            }
            number -= 1;
        }

        txs.sort_by(|a, b| b.timestamp.unwrap_or(0).cmp(&a.timestamp.unwrap_or(0)));
        Ok(txs)
    }

    /// Transaction joined with its receipt and derived fields.
    pub async fn transaction_detail(&self, hash: &str) -> Result<Option<TransactionDetail>> {
        let Some(mut tx) = self.rpc.get_transaction(hash).await? else {
            return Ok(None);
        };
        let receipt = self.rpc.get_receipt(hash).await.unwrap_or(None);

        // stamp the mining time from the containing block
        if let Some(number) = tx.block_number {
            if let Ok(Some(block)) = self.rpc.get_block(number, false).await {
                tx.timestamp = Some(block.timestamp);
            }
        }

        let fee_wei = receipt.as_ref().map(|r| {
            let price = r.effective_gas_price.unwrap_or(tx.gas_price);
            U256::from(r.gas_used) * price
        });

        let token_transfer = self.detect_token_transfer(&tx).await;

        Ok(Some(TransactionDetail {
            tx,
            receipt,
            fee_wei,
            token_transfer,
        }))
    }

    /// Transactions waiting in the pending pseudo-block, stamped with the
    /// local clock (the node gives pending txs no timestamp).
    pub async fn pending_transactions(&self, count: usize) -> Result<Vec<RawTransaction>> {
        let Some(block) = self.rpc.get_pending_block().await? else {
            return Ok(Vec::new());
        };
        let now = Utc::now().timestamp().max(0) as u64;

        let mut txs = Vec::new();
        match &block.transactions {
            BlockTransactions::Full(full) => {
                for tx in full.iter().take(count) {
                    let mut tx = tx.clone();
                    tx.timestamp = Some(now);
                    txs.push(tx);
                }
            }
            BlockTransactions::Hashes(hashes) => {
                for hash in hashes.iter().take(count) {
                    if let Ok(Some(mut tx)) = self.rpc.get_transaction(hash).await {
                        tx.timestamp = Some(now);
                        txs.push(tx);
                    }
                }
            }
        }
        Ok(txs)
    }

    /// Balance, EOA/contract classification, and recent activity.
    pub async fn address_summary(&self, address: &str, tx_limit: usize) -> Result<AddressSummary> {
        let normalized = normalize_address(address);
        let addr = parse_address(&normalized)
            .with_context(|| format!("Invalid address: {address}"))?;

        let balance_wei = self.rpc.get_balance(addr).await?;
        let code = self.rpc.get_code(addr).await.unwrap_or_default();
        let transactions = self.address_transactions(&normalized, tx_limit).await?;

        Ok(AddressSummary {
            address: normalized,
            balance_wei,
            is_contract: !code.is_empty(),
            code_size: code.len(),
            transactions,
        })
    }

    /// Transactions touching an address. Indexer first; the fallback
    /// filters recent mined + pending sets by from/to.
    pub async fn address_transactions(
        &self,
        address: &str,
        count: usize,
    ) -> Result<Vec<RawTransaction>> {
        if let Some(indexer) = &self.indexer {
            if let Ok(txs) = indexer.address_transactions(address, count).await {
                return Ok(txs);
            }
        }

        let needle = normalize_address(address);
        let matches = |tx: &RawTransaction| {
            normalize_address(&tx.from) == needle
                || tx.to.as_deref().map(normalize_address) == Some(needle.clone())
        };

        let mined = self
            .scan_recent_transactions(count.max(10) * 10)
            .await
            .unwrap_or_default();
        let pending = self
            .pending_transactions(count.max(10) * 2)
            .await
            .unwrap_or_default();

        let mut combined: Vec<RawTransaction> = mined
            .into_iter()
            .chain(pending)
            .filter(|tx| matches(tx))
            .collect();
        combined.sort_by(|a, b| b.timestamp.unwrap_or(0).cmp(&a.timestamp.unwrap_or(0)));
        combined.truncate(count);
        Ok(combined)
    }

    /// Headline numbers for the overview. Indexer count degrades to zero.
    pub async fn network_stats(&self) -> Result<NetworkStats> {
        let head = self.rpc.block_number().await?;
        let gas_price_wei = self.rpc.gas_price().await.unwrap_or(U256::ZERO);
        let chain_id = self.rpc.chain_id().await.unwrap_or(0);

        let total_transactions = match &self.indexer {
            Some(indexer) => indexer.transaction_count().await.unwrap_or(0),
            None => 0,
        };

        Ok(NetworkStats {
            head,
            gas_price_wei,
            total_transactions,
            chain_id,
        })
    }

    /// Harvest unique addresses out of recent activity, rank by balance.
    /// Deliberately not a full-chain scan.
    pub async fn top_accounts(&self, count: usize) -> Result<Vec<TopAccount>> {
        let recent = self.latest_transactions(100).await?;

        let mut seen = Vec::new();
        for tx in &recent {
            let from = normalize_address(&tx.from);
            if !seen.contains(&from) {
                seen.push(from);
            }
            if let Some(to) = &tx.to {
                let to = normalize_address(to);
                if !seen.contains(&to) {
                    seen.push(to);
                }
            }
        }

        let candidates: Vec<String> = seen.into_iter().take(count).collect();
        let lookups = candidates.iter().filter_map(|address| {
            let addr = parse_address(address)?;
            Some(async move {
                let balance_wei = self.rpc.get_balance(addr).await.ok()?;
                if balance_wei.is_zero() {
                    return None;
                }
                Some((address.clone(), balance_wei))
            })
        });

        let mut accounts: Vec<TopAccount> = futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .map(|(address, balance_wei)| TopAccount {
                rank: 0,
                address,
                balance_wei,
            })
            .collect();

        accounts.sort_by(|a, b| b.balance_wei.cmp(&a.balance_wei));
        accounts.truncate(count);
        for (i, account) in accounts.iter_mut().enumerate() {
            account.rank = i + 1;
        }
        Ok(accounts)
    }

    /// name()/symbol()/decimals() via eth_call, cached. Missing or
    /// non-decoding answers degrade to defaults (decimals 18).
    pub async fn token_metadata(&self, address: &str) -> TokenMetadata {
        let normalized = normalize_address(address);
        {
            let cache = self.token_cache.read().await;
            if let Some(meta) = cache.get(&normalized) {
                return meta.clone();
            }
        }

        let meta = self.fetch_token_metadata(&normalized).await;

        let mut cache = self.token_cache.write().await;
        cache.insert(normalized, meta.clone());
        meta
    }

    async fn fetch_token_metadata(&self, normalized: &str) -> TokenMetadata {
        let Some(addr) = parse_address(normalized) else {
            return TokenMetadata {
                address: normalized.to_string(),
                name: None,
                symbol: None,
                decimals: 18,
            };
        };

        let name = match self.rpc.call(addr, SEL_NAME.to_vec()).await {
            Ok(data) => decode_abi_string(&data),
            Err(_) => None,
        };
        let symbol = match self.rpc.call(addr, SEL_SYMBOL.to_vec()).await {
            Ok(data) => decode_abi_string(&data),
            Err(_) => None,
        };
        let decimals = match self.rpc.call(addr, SEL_DECIMALS.to_vec()).await {
            Ok(data) => decode_abi_u8(&data).unwrap_or(18),
            Err(_) => 18,
        };

        TokenMetadata {
            address: normalized.to_string(),
            name,
            symbol,
            decimals,
        }
    }

    async fn detect_token_transfer(&self, tx: &RawTransaction) -> Option<TokenTransferView> {
        let call = decode_token_transfer(&tx.input)?;
        let contract = tx.to.as_deref()?;
        let token = self.token_metadata(contract).await;
        Some(TokenTransferView {
            tx_hash: tx.hash.clone(),
            block_number: tx.block_number,
            timestamp: tx.timestamp,
            from: tx.from.clone(),
            to: format!("{:#x}", call.to),
            amount: format_token_amount(call.amount, token.decimals),
            token,
        })
    }

    /// Scan recent transactions for ERC-20 transfer calldata.
    pub async fn token_transfers(&self, scan: usize) -> Result<Vec<TokenTransferView>> {
        let recent = self.latest_transactions(scan).await?;
        let mut transfers = Vec::new();
        for tx in &recent {
            if transfers.len() >= METADATA_LOOKUP_CAP {
                break;
            }
            if let Some(view) = self.detect_token_transfer(tx).await {
                transfers.push(view);
            }
        }
        Ok(transfers)
    }

    /// Scan recent transactions for mint-family calldata.
    pub async fn nft_mints(&self, scan: usize) -> Result<Vec<NftMintView>> {
        let recent = self.latest_transactions(scan).await?;
        let mut mints = Vec::new();
        for tx in &recent {
            if mints.len() >= METADATA_LOOKUP_CAP {
                break;
            }
            let Some(call) = decode_nft_mint(&tx.input) else {
                continue;
            };
            let Some(contract) = tx.to.clone() else {
                continue;
            };
            let collection = self.token_metadata(&contract).await.name;
            mints.push(NftMintView {
                tx_hash: tx.hash.clone(),
                block_number: tx.block_number,
                timestamp: tx.timestamp,
                minter: tx.from.clone(),
                standard: call.standard,
                token_id: call.token_id,
                quantity: call.quantity,
                collection,
                contract,
            });
        }
        Ok(mints)
    }

    /// Scan recent transactions for NFT transfer-family calldata.
    pub async fn nft_transfers(&self, scan: usize) -> Result<Vec<NftTransferView>> {
        let recent = self.latest_transactions(scan).await?;
        let mut transfers = Vec::new();
        for tx in &recent {
            if transfers.len() >= METADATA_LOOKUP_CAP {
                break;
            }
            let Some(call) = decode_nft_transfer(&tx.input) else {
                continue;
            };
            let Some(contract) = tx.to.clone() else {
                continue;
            };
            let collection = self.token_metadata(&contract).await.name;
            transfers.push(NftTransferView {
                tx_hash: tx.hash.clone(),
                block_number: tx.block_number,
                timestamp: tx.timestamp,
                method: call.method,
                from: format!("{:#x}", call.from),
                to: format!("{:#x}", call.to),
                standard: call.standard,
                token_id: call.token_id,
                quantity: call.quantity,
                collection,
                contract,
            });
        }
        Ok(transfers)
    }

    /// Classify a free-text term and resolve it against the chain.
    ///
    /// 32-byte hashes are ambiguous: probed as a block hash first, then as
    /// a transaction hash. Addresses are classified contract/EOA via
    /// eth_getCode.
    pub async fn resolve_search(&self, term: &str) -> Result<SearchOutcome> {
        let Some(parsed) = classify(term) else {
            return Ok(SearchOutcome::NotFound {
                term: term.to_string(),
                hint: "Enter a tx hash, address, or block number".to_string(),
            });
        };

        match parsed {
            SearchTerm::Hash(hash) => {
                if let Some(block) = self.rpc.get_block_by_hash(&hash, false).await? {
                    if let Some(summary) = BlockSummary::from_raw(&block) {
                        return Ok(SearchOutcome::Block(summary));
                    }
                }
                if let Some(detail) = self.transaction_detail(&hash).await? {
                    return Ok(SearchOutcome::Transaction(Box::new(detail)));
                }
                Ok(SearchOutcome::NotFound {
                    term: hash,
                    hint: "No block or transaction with this hash".to_string(),
                })
            }
            SearchTerm::Address(address) => {
                let summary = self.address_summary(&address, 10).await?;
                if summary.is_contract {
                    Ok(SearchOutcome::Contract(summary))
                } else {
                    Ok(SearchOutcome::Address(summary))
                }
            }
            SearchTerm::BlockNumber(number) => {
                match self.rpc.get_block(number, false).await? {
                    Some(block) => match BlockSummary::from_raw(&block) {
                        Some(summary) => Ok(SearchOutcome::Block(summary)),
                        None => Ok(SearchOutcome::NotFound {
                            term: number.to_string(),
                            hint: "Block is not mined yet".to_string(),
                        }),
                    },
                    None => Ok(SearchOutcome::NotFound {
                        term: number.to_string(),
                        hint: "Block number past the chain head".to_string(),
                    }),
                }
            }
            SearchTerm::TokenQuery(text) => Ok(SearchOutcome::NotFound {
                // no name index on this chain; only addresses resolve tokens
                term: text,
                hint: "Search tokens by their contract address".to_string(),
            }),
        }
    }
}

/// Parse a hex address string.
pub(crate) fn parse_address(s: &str) -> Option<Address> {
    let normalized = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    if normalized.len() != 40 {
        return None;
    }
    let bytes = hex::decode(normalized).ok()?;
    Some(Address::from_slice(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert!(parse_address("0x742d35cc6634c0532925a3b844bc9e7595f0beb1").is_some());
        assert!(parse_address("742d35cc6634c0532925a3b844bc9e7595f0beb1").is_some());
        assert!(parse_address("0x742d").is_none());
        assert!(parse_address("").is_none());
    }
}
