//! The explorer service: normalized accessors over the RPC node and the
//! indexer API. Every view in the UI is a thin consumer of this module.

mod service;
mod views;

pub use service::ExplorerService;
pub use views::{
    AddressSummary, BlockSummary, NetworkStats, NftMintView, NftTransferView, SearchOutcome,
    TokenMetadata, TokenTransferView, TopAccount, TransactionDetail,
};
