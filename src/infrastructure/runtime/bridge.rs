//! Runtime bridge - connects the sync TUI thread with the async runtime
//!
//! The TUI never awaits: it sends commands over a std mpsc channel and
//! drains events each tick. A dedicated thread owns the Tokio runtime and
//! the network collaborators.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tokio::runtime::Runtime;

use crate::explorer::{
    AddressSummary, BlockSummary, NetworkStats, NftMintView, NftTransferView, SearchOutcome,
    TokenMetadata, TokenTransferView, TopAccount, TransactionDetail,
};
use crate::infrastructure::runtime::worker::{run_async_worker, WorkerEndpoints};
use crate::infrastructure::rpc::{RawBlock, RawTransaction};

/// Commands sent from the TUI to the async worker.
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Re-fetch the overview snapshot (stats + latest lists)
    Refresh,
    /// Open a block detail by number
    OpenBlock { number: u64 },
    /// Open a block detail by hash
    OpenBlockByHash { hash: String },
    /// Open a transaction detail
    OpenTransaction { hash: String },
    /// Open an address summary
    OpenAddress { address: String },
    /// Fetch token metadata for a contract
    OpenToken { address: String },
    /// Fetch the pending transaction list
    FetchPending,
    /// Fetch ranked accounts
    FetchTopAccounts,
    /// Scan recent txs for ERC-20 transfers
    FetchTokenTransfers,
    /// Scan recent txs for NFT mints
    FetchNftMints,
    /// Scan recent txs for NFT transfers
    FetchNftTransfers,
    /// Resolve a free-text search term
    Search { term: String },
    /// Switch to a different RPC endpoint
    SwitchEndpoint { index: usize },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Successfully connected to a node
    Connected {
        endpoint: String,
        client_version: String,
        chain_id: u64,
    },
    /// Overview numbers refreshed
    StatsReady(NetworkStats),
    /// Latest block list refreshed
    LatestBlocks(Vec<BlockSummary>),
    /// Latest transaction list refreshed
    LatestTransactions(Vec<RawTransaction>),
    /// A new chain head was observed
    NewHead { number: u64 },
    /// Block detail ready (with stitched transactions)
    BlockReady {
        block: RawBlock,
        txs: Vec<RawTransaction>,
    },
    /// Transaction detail ready
    TransactionReady(Box<TransactionDetail>),
    /// Address summary ready
    AddressReady(AddressSummary),
    /// Token metadata ready
    TokenReady(TokenMetadata),
    /// Pending transaction list ready
    PendingReady(Vec<RawTransaction>),
    /// Ranked accounts ready
    TopAccountsReady(Vec<TopAccount>),
    /// ERC-20 transfer scan ready
    TokenTransfersReady(Vec<TokenTransferView>),
    /// NFT mint scan ready
    NftMintsReady(Vec<NftMintView>),
    /// NFT transfer scan ready
    NftTransfersReady(Vec<NftTransferView>),
    /// Search outcome ready
    SearchReady(SearchOutcome),
    /// Error occurred; retry by re-issuing the command
    Error { message: String },
}

/// Bridge between the sync TUI thread and the async runtime.
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread with its own Tokio runtime.
    pub fn new(endpoints: WorkerEndpoints) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Failed to create runtime: {err}"),
                    });
                    return;
                }
            };
            rt.block_on(async {
                if let Err(err) = run_async_worker(endpoints, cmd_rx, evt_tx.clone()).await {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Worker exited: {err:#}"),
                    });
                }
            });
        });

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker.
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Drain pending events (non-blocking).
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
