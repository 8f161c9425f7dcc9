//! JSON Export
//!
//! Writes a transaction detail (with its receipt) to a JSON file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::explorer::TransactionDetail;

#[derive(Serialize)]
struct ExportableTransaction {
    hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_hash: Option<String>,
    from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<String>,
    value_wei: String,
    gas: u64,
    gas_price_wei: String,
    nonce: u64,
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fee_wei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<ExportableReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_transfer: Option<ExportableTokenTransfer>,
}

#[derive(Serialize)]
struct ExportableReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<bool>,
    gas_used: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    effective_gas_price_wei: Option<String>,
    log_count: usize,
}

#[derive(Serialize)]
struct ExportableTokenTransfer {
    token: String,
    symbol: String,
    from: String,
    to: String,
    amount: String,
}

impl From<&TransactionDetail> for ExportableTransaction {
    fn from(detail: &TransactionDetail) -> Self {
        Self {
            hash: detail.tx.hash.clone(),
            block_number: detail.tx.block_number,
            block_hash: detail.tx.block_hash.clone(),
            from: detail.tx.from.clone(),
            to: detail.tx.to.clone(),
            value_wei: detail.tx.value.to_string(),
            gas: detail.tx.gas,
            gas_price_wei: detail.tx.gas_price.to_string(),
            nonce: detail.tx.nonce,
            input: format!("0x{}", hex::encode(&detail.tx.input)),
            fee_wei: detail.fee_wei.map(|fee| fee.to_string()),
            receipt: detail.receipt.as_ref().map(|receipt| ExportableReceipt {
                status: receipt.status,
                gas_used: receipt.gas_used,
                effective_gas_price_wei: receipt
                    .effective_gas_price
                    .map(|price| price.to_string()),
                log_count: receipt.log_count,
            }),
            token_transfer: detail.token_transfer.as_ref().map(|transfer| {
                ExportableTokenTransfer {
                    token: transfer.token.address.clone(),
                    symbol: transfer.token.display_symbol().to_string(),
                    from: transfer.from.clone(),
                    to: transfer.to.clone(),
                    amount: transfer.amount.clone(),
                }
            }),
        }
    }
}

/// Write a transaction detail to a JSON file
pub fn write_transaction_detail(
    path: &Path,
    detail: &TransactionDetail,
) -> Result<(), Box<dyn std::error::Error>> {
    let exportable = ExportableTransaction::from(detail);
    let json = serde_json::to_string_pretty(&exportable)?;

    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;

    Ok(())
}
