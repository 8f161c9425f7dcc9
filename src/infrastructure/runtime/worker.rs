//! Async worker - owns the explorer service and handles all fetches
//!
//! Mirrors the UI's command set one-to-one. The poll loop watches the
//! chain head every couple of seconds and pushes a fresh overview when it
//! moves; everything else is fetched on demand.

use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::explorer::ExplorerService;
use crate::infrastructure::indexer::IndexerClient;
use crate::infrastructure::rpc::create_rpc;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

const OVERVIEW_BLOCKS: usize = 10;
const OVERVIEW_TXS: usize = 10;
const PENDING_LIMIT: usize = 25;
const TOP_ACCOUNTS_LIMIT: usize = 25;
const ACTIVITY_SCAN: usize = 50;

const HEAD_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECONNECT_BACKOFF: Duration = Duration::from_millis(900);

/// Endpoint set the worker rotates through.
#[derive(Debug, Clone)]
pub struct WorkerEndpoints {
    pub rpc_urls: Vec<String>,
    pub indexer_url: Option<String>,
}

/// Run the async worker loop.
pub async fn run_async_worker(
    endpoints: WorkerEndpoints,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    if endpoints.rpc_urls.is_empty() {
        anyhow::bail!("No RPC endpoints configured");
    }

    let mut endpoint_index = 0usize;
    let mut service: Option<ExplorerService> = None;
    let mut last_head: Option<u64> = None;
    let mut last_poll = Instant::now()
        .checked_sub(HEAD_POLL_INTERVAL)
        .unwrap_or_else(Instant::now);

    loop {
        if service.is_none() {
            let url = endpoints.rpc_urls[endpoint_index].clone();
            match connect(&url, endpoints.indexer_url.as_deref(), &evt_tx).await {
                Ok(connected) => {
                    last_head = None;
                    refresh_overview(&connected, &evt_tx, &mut last_head).await;
                    service = Some(connected);
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Connection failed ({url}): {err:#}"),
                    });
                    if endpoints.rpc_urls.len() > 1 {
                        endpoint_index = (endpoint_index + 1) % endpoints.rpc_urls.len();
                    }
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                    continue;
                }
            }
        }

        // Process commands (non-blocking)
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::SwitchEndpoint { index } => {
                    if index >= endpoints.rpc_urls.len() {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!(
                                "Invalid endpoint index {} ({} total)",
                                index,
                                endpoints.rpc_urls.len()
                            ),
                        });
                        continue;
                    }
                    endpoint_index = index;
                    service = None;
                    last_head = None;
                }

                other => {
                    if let Some(ref svc) = service {
                        handle_command(svc, other, &evt_tx, &mut last_head).await;
                    }
                }
            }
            if service.is_none() {
                break;
            }
        }

        // Head poll
        if let Some(ref svc) = service {
            if last_poll.elapsed() >= HEAD_POLL_INTERVAL {
                last_poll = Instant::now();
                match svc.head().await {
                    Ok(head) => {
                        if last_head.map(|last| head > last).unwrap_or(true) {
                            let _ = evt_tx.send(RuntimeEvent::NewHead { number: head });
                            refresh_overview(svc, &evt_tx, &mut last_head).await;
                        }
                    }
                    Err(err) => {
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("RPC error: {err:#}"),
                        });
                        service = None;
                        if endpoints.rpc_urls.len() > 1 {
                            endpoint_index = (endpoint_index + 1) % endpoints.rpc_urls.len();
                        }
                        continue;
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn connect(
    rpc_url: &str,
    indexer_url: Option<&str>,
    evt_tx: &Sender<RuntimeEvent>,
) -> Result<ExplorerService> {
    let rpc = create_rpc(rpc_url)?;
    let client_version = rpc
        .client_version()
        .await
        .context("Failed to get client version")?;
    let chain_id = rpc.chain_id().await.unwrap_or(0);

    let indexer = indexer_url.map(IndexerClient::new);
    let service = ExplorerService::new(rpc, indexer);

    let _ = evt_tx.send(RuntimeEvent::Connected {
        endpoint: service.endpoint_name(),
        client_version,
        chain_id,
    });

    Ok(service)
}

/// Fetch the overview snapshot: stats, latest blocks, latest transactions.
async fn refresh_overview(
    service: &ExplorerService,
    evt_tx: &Sender<RuntimeEvent>,
    last_head: &mut Option<u64>,
) {
    match service.network_stats().await {
        Ok(stats) => {
            *last_head = Some(stats.head);
            let _ = evt_tx.send(RuntimeEvent::StatsReady(stats));
        }
        Err(err) => {
            let _ = evt_tx.send(RuntimeEvent::Error {
                message: format!("Stats fetch failed: {err:#}"),
            });
            return;
        }
    }

    match service.latest_blocks(OVERVIEW_BLOCKS).await {
        Ok(blocks) => {
            let _ = evt_tx.send(RuntimeEvent::LatestBlocks(blocks));
        }
        Err(err) => {
            let _ = evt_tx.send(RuntimeEvent::Error {
                message: format!("Block fetch failed: {err:#}"),
            });
        }
    }

    match service.latest_transactions(OVERVIEW_TXS).await {
        Ok(txs) => {
            let _ = evt_tx.send(RuntimeEvent::LatestTransactions(txs));
        }
        Err(err) => {
            let _ = evt_tx.send(RuntimeEvent::Error {
                message: format!("Transaction fetch failed: {err:#}"),
            });
        }
    }
}

async fn handle_command(
    service: &ExplorerService,
    cmd: RuntimeCommand,
    evt_tx: &Sender<RuntimeEvent>,
    last_head: &mut Option<u64>,
) {
    match cmd {
        RuntimeCommand::Refresh => {
            refresh_overview(service, evt_tx, last_head).await;
        }

        RuntimeCommand::OpenBlock { number } => {
            match service.block_by_number(number).await {
                Ok(Some(block)) => {
                    let txs = service
                        .block_transactions(&block)
                        .await
                        .unwrap_or_default();
                    let _ = evt_tx.send(RuntimeEvent::BlockReady { block, txs });
                }
                Ok(None) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Block {number} not found"),
                    });
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Block fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::OpenBlockByHash { hash } => {
            match service.block_by_hash(&hash).await {
                Ok(Some(block)) => {
                    let txs = service
                        .block_transactions(&block)
                        .await
                        .unwrap_or_default();
                    let _ = evt_tx.send(RuntimeEvent::BlockReady { block, txs });
                }
                Ok(None) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("No block with hash {hash}"),
                    });
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Block fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::OpenTransaction { hash } => {
            match service.transaction_detail(&hash).await {
                Ok(Some(detail)) => {
                    let _ = evt_tx.send(RuntimeEvent::TransactionReady(Box::new(detail)));
                }
                Ok(None) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Transaction {hash} not found"),
                    });
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Transaction fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::OpenAddress { address } => {
            match service.address_summary(&address, 10).await {
                Ok(summary) => {
                    let _ = evt_tx.send(RuntimeEvent::AddressReady(summary));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Address fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::OpenToken { address } => {
            let meta = service.token_metadata(&address).await;
            let _ = evt_tx.send(RuntimeEvent::TokenReady(meta));
        }

        RuntimeCommand::FetchPending => {
            match service.pending_transactions(PENDING_LIMIT).await {
                Ok(txs) => {
                    let _ = evt_tx.send(RuntimeEvent::PendingReady(txs));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Pending fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::FetchTopAccounts => {
            match service.top_accounts(TOP_ACCOUNTS_LIMIT).await {
                Ok(accounts) => {
                    let _ = evt_tx.send(RuntimeEvent::TopAccountsReady(accounts));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Top accounts fetch failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::FetchTokenTransfers => {
            match service.token_transfers(ACTIVITY_SCAN).await {
                Ok(transfers) => {
                    let _ = evt_tx.send(RuntimeEvent::TokenTransfersReady(transfers));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("Token transfer scan failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::FetchNftMints => {
            match service.nft_mints(ACTIVITY_SCAN).await {
                Ok(mints) => {
                    let _ = evt_tx.send(RuntimeEvent::NftMintsReady(mints));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("NFT mint scan failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::FetchNftTransfers => {
            match service.nft_transfers(ACTIVITY_SCAN).await {
                Ok(transfers) => {
                    let _ = evt_tx.send(RuntimeEvent::NftTransfersReady(transfers));
                }
                Err(err) => {
                    let _ = evt_tx.send(RuntimeEvent::Error {
                        message: format!("NFT transfer scan failed: {err:#}"),
                    });
                }
            }
        }

        RuntimeCommand::Search { term } => match service.resolve_search(&term).await {
            Ok(outcome) => {
                let _ = evt_tx.send(RuntimeEvent::SearchReady(outcome));
            }
            Err(err) => {
                let _ = evt_tx.send(RuntimeEvent::Error {
                    message: format!("Search failed: {err:#}"),
                });
            }
        },

        // handled by the outer loop
        RuntimeCommand::SwitchEndpoint { .. } | RuntimeCommand::Shutdown => {}
    }
}
