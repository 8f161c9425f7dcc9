//! Auxiliary indexer API client
//!
//! The indexer is a plain REST service with paginated transaction lists;
//! it is much faster than scanning blocks over RPC but entirely optional.
//! Every failure here is recoverable: callers fall back to RPC.
//!
//! Row fields arrive as decimal strings or bare numbers depending on the
//! indexer build, so everything is normalized through untagged helpers.

use alloy_primitives::{Bytes, U256};
use serde::Deserialize;

use crate::domain::units::parse_quantity;
use crate::infrastructure::rpc::RawTransaction;

/// Indexer failure classification.
#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("indexer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("indexer returned status {0}")]
    Status(u16),
    #[error("unexpected indexer payload: {0}")]
    Payload(String),
}

/// A number the indexer may serialize as a string, an integer, or a float.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Flexible {
    Number(u64),
    Text(String),
    Float(f64),
}

impl Flexible {
    fn as_u64(&self) -> Option<u64> {
        match self {
            Flexible::Number(n) => Some(*n),
            Flexible::Text(s) => s.trim().parse().ok(),
            Flexible::Float(f) if *f >= 0.0 => Some(*f as u64),
            Flexible::Float(_) => None,
        }
    }

    fn as_u256(&self) -> Option<U256> {
        match self {
            Flexible::Number(n) => Some(U256::from(*n)),
            Flexible::Text(s) => parse_quantity(s),
            Flexible::Float(f) if *f >= 0.0 => Some(U256::from(*f as u128)),
            Flexible::Float(_) => None,
        }
    }
}

/// A transaction row as the indexer serves it (snake_case, decimal fields).
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedTransaction {
    pub hash: String,
    pub block_number: Option<Flexible>,
    pub from_address: String,
    pub to_address: Option<String>,
    pub value: Option<Flexible>,
    pub gas: Option<Flexible>,
    pub gas_price: Option<Flexible>,
    pub nonce: Option<Flexible>,
    pub input: Option<String>,
    pub transaction_index: Option<Flexible>,
    pub timestamp: Option<Flexible>,
}

impl IndexedTransaction {
    /// Normalize into the same shape the RPC path produces.
    pub fn into_raw(self) -> RawTransaction {
        let input_str = self.input.unwrap_or_else(|| "0x".to_string());
        let input_bytes = hex::decode(input_str.strip_prefix("0x").unwrap_or(&input_str))
            .unwrap_or_default();

        RawTransaction {
            hash: self.hash,
            block_number: self.block_number.as_ref().and_then(Flexible::as_u64),
            // the indexer doesn't store block hashes
            block_hash: None,
            from: self.from_address,
            to: self.to_address,
            value: self
                .value
                .as_ref()
                .and_then(Flexible::as_u256)
                .unwrap_or(U256::ZERO),
            gas: self.gas.as_ref().and_then(Flexible::as_u64).unwrap_or(0),
            gas_price: self
                .gas_price
                .as_ref()
                .and_then(Flexible::as_u256)
                .unwrap_or(U256::ZERO),
            nonce: self.nonce.as_ref().and_then(Flexible::as_u64).unwrap_or(0),
            input: Bytes::from(input_bytes),
            transaction_index: self
                .transaction_index
                .as_ref()
                .and_then(Flexible::as_u64),
            timestamp: self.timestamp.as_ref().and_then(Flexible::as_u64),
        }
    }
}

/// The count endpoint answers with a bare number or a wrapper object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CountResponse {
    Bare(Flexible),
    Object {
        count: Option<Flexible>,
        total: Option<Flexible>,
    },
}

/// REST client for the indexer API.
pub struct IndexerClient {
    http: reqwest::Client,
    base_url: String,
}

impl IndexerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, IndexerError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(IndexerError::Status(response.status().as_u16()));
        }
        response.json::<T>().await.map_err(IndexerError::from)
    }

    /// Most recent transactions, newest first.
    pub async fn latest_transactions(
        &self,
        limit: usize,
    ) -> Result<Vec<RawTransaction>, IndexerError> {
        let rows: Vec<IndexedTransaction> = self
            .get_json(&format!("/transactions/latest?limit={limit}"))
            .await?;
        Ok(rows.into_iter().map(IndexedTransaction::into_raw).collect())
    }

    /// Transactions touching an address, newest first.
    pub async fn address_transactions(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<RawTransaction>, IndexerError> {
        let rows: Vec<IndexedTransaction> = self
            .get_json(&format!("/transactions/address/{address}?limit={limit}"))
            .await?;
        Ok(rows.into_iter().map(IndexedTransaction::into_raw).collect())
    }

    /// Total transaction count seen by the indexer.
    pub async fn transaction_count(&self) -> Result<u64, IndexerError> {
        let response: CountResponse = self.get_json("/transactions/count").await?;
        let count = match response {
            CountResponse::Bare(v) => v.as_u64(),
            CountResponse::Object { count, total } => count
                .as_ref()
                .and_then(Flexible::as_u64)
                .or_else(|| total.as_ref().and_then(Flexible::as_u64)),
        };
        count.ok_or_else(|| IndexerError::Payload("count field missing".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_normalization() {
        let row: IndexedTransaction = serde_json::from_str(
            r#"{
                "hash": "0xcc",
                "block_number": "39923523",
                "from_address": "0x2222222222222222222222222222222222222222",
                "to_address": "0x3333333333333333333333333333333333333333",
                "value": "1000000000000000000",
                "gas": 21000,
                "gas_price": "1000000000",
                "nonce": "5",
                "input": "0x",
                "transaction_index": "0",
                "timestamp": "1756500000"
            }"#,
        )
        .unwrap();

        let raw = row.into_raw();
        assert_eq!(raw.block_number, Some(39_923_523));
        assert_eq!(raw.value, U256::from(1_000_000_000_000_000_000u64));
        assert_eq!(raw.gas, 21_000);
        assert_eq!(raw.nonce, 5);
        assert_eq!(raw.timestamp, Some(1_756_500_000));
        assert_eq!(raw.block_hash, None);
    }

    #[test]
    fn test_row_with_missing_fields() {
        let row: IndexedTransaction = serde_json::from_str(
            r#"{
                "hash": "0xcc",
                "from_address": "0x2222222222222222222222222222222222222222",
                "to_address": null
            }"#,
        )
        .unwrap();
        let raw = row.into_raw();
        assert_eq!(raw.to, None);
        assert_eq!(raw.value, U256::ZERO);
        assert_eq!(raw.timestamp, None);
    }

    #[test]
    fn test_count_shapes() {
        for payload in [r#"1234"#, r#"{"count": 1234}"#, r#"{"total": "1234"}"#] {
            let parsed: CountResponse = serde_json::from_str(payload).unwrap();
            let count = match parsed {
                CountResponse::Bare(v) => v.as_u64(),
                CountResponse::Object { count, total } => count
                    .as_ref()
                    .and_then(Flexible::as_u64)
                    .or_else(|| total.as_ref().and_then(Flexible::as_u64)),
            };
            assert_eq!(count, Some(1234), "payload: {payload}");
        }
    }

    #[test]
    fn test_hex_value_accepted() {
        let row: IndexedTransaction = serde_json::from_str(
            r#"{
                "hash": "0xcc",
                "from_address": "0x22",
                "value": "0xde0b6b3a7640000"
            }"#,
        )
        .unwrap();
        assert_eq!(
            row.into_raw().value,
            U256::from(1_000_000_000_000_000_000u64)
        );
    }
}
