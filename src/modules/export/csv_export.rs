//! CSV Export
//!
//! Writes explorer list views to CSV files.

use std::path::Path;

use crate::explorer::{
    BlockSummary, NftMintView, NftTransferView, TokenTransferView, TopAccount,
};
use crate::infrastructure::rpc::RawTransaction;

type ExportResult = Result<usize, Box<dyn std::error::Error>>;

/// Write blocks to CSV file
pub fn write_blocks(path: &Path, blocks: &[BlockSummary]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "number",
        "hash",
        "timestamp",
        "tx_count",
        "gas_used",
        "gas_limit",
        "miner",
        "size",
    ])?;

    for block in blocks {
        wtr.write_record([
            block.number.to_string(),
            block.hash.clone(),
            block.timestamp.to_string(),
            block.tx_count.to_string(),
            block.gas_used.to_string(),
            block.gas_limit.to_string(),
            block.miner.clone(),
            block.size.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(blocks.len())
}

/// Write transactions to CSV file
pub fn write_transactions(path: &Path, txs: &[RawTransaction]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "hash",
        "block_number",
        "from",
        "to",
        "value_wei",
        "gas",
        "gas_price_wei",
        "nonce",
    ])?;

    for tx in txs {
        wtr.write_record([
            tx.hash.clone(),
            tx.block_number.map(|n| n.to_string()).unwrap_or_default(),
            tx.from.clone(),
            tx.to.clone().unwrap_or_default(),
            tx.value.to_string(),
            tx.gas.to_string(),
            tx.gas_price.to_string(),
            tx.nonce.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(txs.len())
}

/// Write ranked accounts to CSV file
pub fn write_accounts(path: &Path, accounts: &[TopAccount]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["rank", "address", "balance_wei"])?;

    for account in accounts {
        wtr.write_record([
            account.rank.to_string(),
            account.address.clone(),
            account.balance_wei.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(accounts.len())
}

/// Write detected token transfers to CSV file
pub fn write_token_transfers(path: &Path, transfers: &[TokenTransferView]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "tx_hash",
        "block_number",
        "from",
        "to",
        "amount",
        "token",
        "symbol",
    ])?;

    for transfer in transfers {
        wtr.write_record([
            transfer.tx_hash.clone(),
            transfer
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            transfer.from.clone(),
            transfer.to.clone(),
            transfer.amount.clone(),
            transfer.token.address.clone(),
            transfer.token.display_symbol().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(transfers.len())
}

/// Write detected NFT mints to CSV file
pub fn write_nft_mints(path: &Path, mints: &[NftMintView]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "tx_hash",
        "block_number",
        "minter",
        "standard",
        "token_id",
        "quantity",
        "contract",
    ])?;

    for mint in mints {
        wtr.write_record([
            mint.tx_hash.clone(),
            mint.block_number.map(|n| n.to_string()).unwrap_or_default(),
            mint.minter.clone(),
            mint.standard.label().to_string(),
            mint.token_id.map(|id| id.to_string()).unwrap_or_default(),
            mint.quantity.to_string(),
            mint.contract.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(mints.len())
}

/// Write detected NFT transfers to CSV file
pub fn write_nft_transfers(path: &Path, transfers: &[NftTransferView]) -> ExportResult {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "tx_hash",
        "block_number",
        "method",
        "from",
        "to",
        "standard",
        "token_id",
        "quantity",
        "contract",
    ])?;

    for transfer in transfers {
        wtr.write_record([
            transfer.tx_hash.clone(),
            transfer
                .block_number
                .map(|n| n.to_string())
                .unwrap_or_default(),
            transfer.method.to_string(),
            transfer.from.clone(),
            transfer.to.clone(),
            transfer.standard.label().to_string(),
            transfer
                .token_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            transfer.quantity.to_string(),
            transfer.contract.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(transfers.len())
}
