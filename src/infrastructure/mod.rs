//! Network-facing infrastructure: the RPC client, the indexer REST
//! client, and the runtime bridge that carries both to the TUI.

pub mod indexer;
pub mod rpc;
pub mod runtime;
