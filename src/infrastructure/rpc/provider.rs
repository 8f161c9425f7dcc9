//! Chain RPC abstraction and the Alloy HTTP implementation
//!
//! Block, transaction, and receipt fetches go through `raw_request` and
//! hand-rolled parsing so chains with non-standard shapes (odd tx types,
//! missing fields) still work; typed helpers are used where the response
//! is a plain quantity.

use alloy::network::Ethereum;
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, U256};
use anyhow::{Context, Result};

use crate::infrastructure::rpc::types::{
    parse_raw_block, parse_raw_receipt, parse_raw_transaction, RawBlock, RawReceipt,
    RawTransaction,
};

/// Abstract chain RPC node.
///
/// Everything the explorer needs from the JSON-RPC collaborator; the
/// service layer and tests implement/mock against this seam.
#[async_trait::async_trait]
pub trait ChainRpc: Send + Sync + 'static {
    /// Current head block number.
    async fn block_number(&self) -> Result<u64>;

    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<U256>;

    /// Client version string (for the connection banner).
    async fn client_version(&self) -> Result<String>;

    /// Block by number, optionally with embedded transactions.
    async fn get_block(&self, number: u64, full: bool) -> Result<Option<RawBlock>>;

    /// Block by hash.
    async fn get_block_by_hash(&self, hash: &str, full: bool) -> Result<Option<RawBlock>>;

    /// The pending pseudo-block with embedded transactions.
    async fn get_pending_block(&self) -> Result<Option<RawBlock>>;

    /// Transaction by hash.
    async fn get_transaction(&self, hash: &str) -> Result<Option<RawTransaction>>;

    /// Receipt by transaction hash.
    async fn get_receipt(&self, hash: &str) -> Result<Option<RawReceipt>>;

    /// Native balance at latest.
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Deployed code at latest (empty for EOAs).
    async fn get_code(&self, address: Address) -> Result<Bytes>;

    /// Execute an eth_call against a contract.
    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes>;

    /// Endpoint display name.
    fn endpoint_name(&self) -> String;
}

type HttpFillProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

/// HTTP JSON-RPC implementation over Alloy.
pub struct HttpRpc {
    provider: HttpFillProvider,
    endpoint: String,
}

/// Create an RPC client for an HTTP endpoint.
pub fn create_rpc(url: &str) -> Result<Box<dyn ChainRpc>> {
    let rpc_url = url.parse().context("Invalid HTTP URL")?;
    let provider = ProviderBuilder::new().connect_http(rpc_url);
    Ok(Box::new(HttpRpc {
        provider,
        endpoint: url.to_string(),
    }))
}

impl HttpRpc {
    async fn block_json(
        &self,
        tag: &str,
        full: bool,
    ) -> Result<Option<serde_json::Value>> {
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getBlockByNumber".into(), (tag, full))
            .await?;
        Ok((!json.is_null()).then_some(json))
    }
}

#[async_trait::async_trait]
impl ChainRpc for HttpRpc {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.provider.get_block_number().await?)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn gas_price(&self) -> Result<U256> {
        let price = self.provider.get_gas_price().await?;
        Ok(U256::from(price))
    }

    async fn client_version(&self) -> Result<String> {
        Ok(self.provider.get_client_version().await?)
    }

    async fn get_block(&self, number: u64, full: bool) -> Result<Option<RawBlock>> {
        let tag = format!("0x{number:x}");
        match self.block_json(&tag, full).await? {
            Some(json) => Ok(Some(parse_raw_block(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_block_by_hash(&self, hash: &str, full: bool) -> Result<Option<RawBlock>> {
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getBlockByHash".into(), (hash, full))
            .await?;
        if json.is_null() {
            return Ok(None);
        }
        Ok(Some(parse_raw_block(&json)?))
    }

    async fn get_pending_block(&self) -> Result<Option<RawBlock>> {
        match self.block_json("pending", true).await? {
            Some(json) => Ok(Some(parse_raw_block(&json)?)),
            None => Ok(None),
        }
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RawTransaction>> {
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getTransactionByHash".into(), (hash,))
            .await?;
        Ok(parse_raw_transaction(&json))
    }

    async fn get_receipt(&self, hash: &str) -> Result<Option<RawReceipt>> {
        let json: serde_json::Value = self
            .provider
            .raw_request("eth_getTransactionReceipt".into(), (hash,))
            .await?;
        Ok(parse_raw_receipt(&json))
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        let request = TransactionRequest::default().to(to).input(data.into());
        Ok(self.provider.call(request).await?)
    }

    fn endpoint_name(&self) -> String {
        self.endpoint.clone()
    }
}
