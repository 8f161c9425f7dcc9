//! Service-level tests over an in-memory RPC node.
//!
//! The mock implements the same trait the HTTP client does, seeded with a
//! small canned chain: a few mined blocks, one ERC-20 transfer, a pending
//! pseudo-block, and a token contract answering name/symbol/decimals.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, Bytes, U256};
use anyhow::Result;

use verox::domain::calldata::{SEL_DECIMALS, SEL_ERC20_TRANSFER, SEL_NAME, SEL_SYMBOL};
use verox::explorer::{ExplorerService, SearchOutcome};
use verox::infrastructure::rpc::{
    BlockTransactions, ChainRpc, RawBlock, RawReceipt, RawTransaction,
};

const TOKEN_CONTRACT: &str = "0x00000000000000000000000000000000000000aa";
const ALICE: &str = "0x0000000000000000000000000000000000000a11";
const BOB: &str = "0x0000000000000000000000000000000000000b0b";

#[derive(Default)]
struct MockRpc {
    head: u64,
    blocks: HashMap<u64, RawBlock>,
    blocks_by_hash: HashMap<String, RawBlock>,
    pending: Option<RawBlock>,
    txs: HashMap<String, RawTransaction>,
    receipts: HashMap<String, RawReceipt>,
    balances: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    calls: HashMap<(Address, [u8; 4]), Bytes>,
    call_log: Arc<Mutex<Vec<[u8; 4]>>>,
}

#[async_trait::async_trait]
impl ChainRpc for MockRpc {
    async fn block_number(&self) -> Result<u64> {
        Ok(self.head)
    }

    async fn chain_id(&self) -> Result<u64> {
        Ok(808)
    }

    async fn gas_price(&self) -> Result<U256> {
        Ok(U256::from(2_000_000_000u64))
    }

    async fn client_version(&self) -> Result<String> {
        Ok("veroth/test".to_string())
    }

    async fn get_block(&self, number: u64, _full: bool) -> Result<Option<RawBlock>> {
        Ok(self.blocks.get(&number).cloned())
    }

    async fn get_block_by_hash(&self, hash: &str, _full: bool) -> Result<Option<RawBlock>> {
        Ok(self.blocks_by_hash.get(hash).cloned())
    }

    async fn get_pending_block(&self) -> Result<Option<RawBlock>> {
        Ok(self.pending.clone())
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RawTransaction>> {
        Ok(self.txs.get(hash).cloned())
    }

    async fn get_receipt(&self, hash: &str) -> Result<Option<RawReceipt>> {
        Ok(self.receipts.get(hash).cloned())
    }

    async fn get_balance(&self, address: Address) -> Result<U256> {
        Ok(self.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.code.get(&address).cloned().unwrap_or_default())
    }

    async fn call(&self, to: Address, data: Vec<u8>) -> Result<Bytes> {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&data[..4]);
        self.call_log.lock().unwrap().push(selector);
        match self.calls.get(&(to, selector)) {
            Some(response) => Ok(response.clone()),
            None => anyhow::bail!("execution reverted"),
        }
    }

    fn endpoint_name(&self) -> String {
        "mock".to_string()
    }
}

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn block_hash(number: u64) -> String {
    format!("0x{number:064x}")
}

fn tx_hash(n: u64) -> String {
    format!("0x{:064x}", 0xf000 + n)
}

/// Standard ABI encoding of a string return value.
fn abi_string(value: &str) -> Bytes {
    let mut out = vec![0u8; 64];
    out[31] = 32;
    out[63] = value.len() as u8;
    let mut data = value.as_bytes().to_vec();
    data.resize(data.len().div_ceil(32).max(1) * 32, 0);
    out.extend_from_slice(&data);
    Bytes::from(out)
}

fn abi_u8(value: u8) -> Bytes {
    let mut word = [0u8; 32];
    word[31] = value;
    Bytes::from(word.to_vec())
}

fn erc20_transfer_input(to: &str, amount: U256) -> Bytes {
    let mut input = SEL_ERC20_TRANSFER.to_vec();
    let mut to_word = [0u8; 32];
    to_word[12..].copy_from_slice(addr(to).as_slice());
    input.extend_from_slice(&to_word);
    input.extend_from_slice(&amount.to_be_bytes::<32>());
    Bytes::from(input)
}

fn plain_tx(n: u64, block_number: u64, from: &str, to: &str, value: U256) -> RawTransaction {
    RawTransaction {
        hash: tx_hash(n),
        block_number: Some(block_number),
        block_hash: Some(block_hash(block_number)),
        from: from.to_string(),
        to: Some(to.to_string()),
        value,
        gas: 21_000,
        gas_price: U256::from(1_000_000_000u64),
        nonce: n,
        input: Bytes::new(),
        transaction_index: Some(0),
        timestamp: None,
    }
}

fn mined_block(number: u64, txs: Vec<RawTransaction>) -> RawBlock {
    RawBlock {
        number: Some(number),
        hash: Some(block_hash(number)),
        parent_hash: block_hash(number.saturating_sub(1)),
        timestamp: 1_700_000_000 + number * 2,
        gas_limit: 30_000_000,
        gas_used: 21_000 * txs.len() as u64,
        miner: "0x0000000000000000000000000000000000000001".to_string(),
        difficulty: None,
        total_difficulty: None,
        size: 1024,
        transactions: BlockTransactions::Full(txs),
    }
}

/// A three-block chain where block 3 carries an ERC-20 transfer.
fn seeded_rpc() -> MockRpc {
    let mut rpc = MockRpc {
        head: 3,
        ..Default::default()
    };

    let mut transfer_tx = plain_tx(3, 3, ALICE, TOKEN_CONTRACT, U256::ZERO);
    transfer_tx.input = erc20_transfer_input(BOB, U256::from(1_500_000u64));

    let blocks = [
        mined_block(1, vec![plain_tx(1, 1, ALICE, BOB, U256::from(10u64))]),
        mined_block(2, vec![plain_tx(2, 2, BOB, ALICE, U256::from(20u64))]),
        mined_block(3, vec![transfer_tx]),
    ];
    for block in blocks {
        for tx in block.transactions.full() {
            rpc.txs.insert(tx.hash.clone(), tx.clone());
        }
        rpc.blocks_by_hash
            .insert(block.hash.clone().unwrap(), block.clone());
        rpc.blocks.insert(block.number.unwrap(), block);
    }

    rpc.receipts.insert(
        tx_hash(3),
        RawReceipt {
            transaction_hash: tx_hash(3),
            block_number: 3,
            block_hash: block_hash(3),
            from: ALICE.to_string(),
            to: Some(TOKEN_CONTRACT.to_string()),
            gas_used: 52_000,
            status: Some(true),
            effective_gas_price: Some(U256::from(1_100_000_000u64)),
            log_count: 1,
        },
    );

    // pending pseudo-block: no number, no hash
    let mut pending_tx = plain_tx(9, 0, BOB, ALICE, U256::from(5u64));
    pending_tx.block_number = None;
    pending_tx.block_hash = None;
    pending_tx.transaction_index = None;
    rpc.pending = Some(RawBlock {
        number: None,
        hash: None,
        parent_hash: block_hash(3),
        timestamp: 0,
        gas_limit: 30_000_000,
        gas_used: 0,
        miner: String::new(),
        difficulty: None,
        total_difficulty: None,
        size: 0,
        transactions: BlockTransactions::Full(vec![pending_tx]),
    });

    let token = addr(TOKEN_CONTRACT);
    rpc.code.insert(token, Bytes::from(vec![0x60, 0x80]));
    rpc.calls.insert((token, SEL_NAME), abi_string("Vero Gold"));
    rpc.calls.insert((token, SEL_SYMBOL), abi_string("VGLD"));
    rpc.calls.insert((token, SEL_DECIMALS), abi_u8(6));

    rpc.balances.insert(addr(ALICE), U256::from(500u64));
    rpc.balances
        .insert(addr(BOB), U256::from(1_000_000u64));

    rpc
}

fn service() -> ExplorerService {
    ExplorerService::new(Box::new(seeded_rpc()), None)
}

#[tokio::test]
async fn latest_blocks_walk_head_backwards() {
    let service = service();
    let blocks = service.latest_blocks(2).await.unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].number, 3);
    assert_eq!(blocks[1].number, 2);
}

#[tokio::test]
async fn latest_transactions_fall_back_to_block_scan() {
    // no indexer configured, so the list comes from scanning blocks
    let service = service();
    let txs = service.latest_transactions(3).await.unwrap();
    assert_eq!(txs.len(), 3);
    // newest first, with block timestamps stitched in
    assert_eq!(txs[0].hash, tx_hash(3));
    assert_eq!(txs[0].timestamp, Some(1_700_000_000 + 3 * 2));
    assert_eq!(txs[2].hash, tx_hash(1));
}

#[tokio::test]
async fn transaction_detail_joins_receipt_and_fee() {
    let service = service();
    let detail = service
        .transaction_detail(&tx_hash(3))
        .await
        .unwrap()
        .unwrap();

    // fee = gas_used x effective gas price
    assert_eq!(
        detail.fee_wei,
        Some(U256::from(52_000u64) * U256::from(1_100_000_000u64))
    );
    assert_eq!(detail.tx.timestamp, Some(1_700_000_000 + 3 * 2));
    assert_eq!(detail.receipt.as_ref().unwrap().status, Some(true));
}

#[tokio::test]
async fn transaction_detail_decodes_token_transfer() {
    let service = service();
    let detail = service
        .transaction_detail(&tx_hash(3))
        .await
        .unwrap()
        .unwrap();

    let transfer = detail.token_transfer.expect("erc20 transfer detected");
    assert_eq!(transfer.to, BOB);
    // 1_500_000 scaled by 6 decimals
    assert_eq!(transfer.amount, "1.5");
    assert_eq!(transfer.token.name.as_deref(), Some("Vero Gold"));
    assert_eq!(transfer.token.symbol.as_deref(), Some("VGLD"));
    assert_eq!(transfer.token.decimals, 6);
}

#[tokio::test]
async fn plain_transfer_has_no_token_decoration() {
    let service = service();
    let detail = service
        .transaction_detail(&tx_hash(1))
        .await
        .unwrap()
        .unwrap();
    assert!(detail.token_transfer.is_none());
    // no receipt seeded for this one, so no fee either
    assert!(detail.fee_wei.is_none());
}

#[tokio::test]
async fn pending_transactions_are_stamped_with_local_clock() {
    let service = service();
    let pending = service.pending_transactions(10).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].hash, tx_hash(9));
    assert!(pending[0].block_number.is_none());
    // the node gives pending txs no timestamp, the service stamps "now"
    assert!(pending[0].timestamp.unwrap() > 1_700_000_000);
}

#[tokio::test]
async fn token_metadata_is_cached() {
    let rpc = seeded_rpc();
    let call_log = rpc.call_log.clone();
    let service = ExplorerService::new(Box::new(rpc), None);

    let first = service.token_metadata(TOKEN_CONTRACT).await;
    let second = service.token_metadata(TOKEN_CONTRACT).await;
    assert_eq!(first.name.as_deref(), Some("Vero Gold"));
    assert_eq!(first.name, second.name);

    let name_lookups = call_log
        .lock()
        .unwrap()
        .iter()
        .filter(|sel| **sel == SEL_NAME)
        .count();
    assert_eq!(name_lookups, 1);
}

#[tokio::test]
async fn token_metadata_degrades_to_defaults() {
    // BOB is an EOA, every eth_call reverts
    let service = service();
    let meta = service.token_metadata(BOB).await;
    assert!(meta.name.is_none());
    assert!(meta.symbol.is_none());
    assert_eq!(meta.decimals, 18);
    assert_eq!(meta.display_name(), "Unknown Token");
    assert_eq!(meta.display_symbol(), "UNK");
}

#[tokio::test]
async fn token_transfer_scan_finds_the_transfer() {
    let service = service();
    let transfers = service.token_transfers(10).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].tx_hash, tx_hash(3));
    assert_eq!(transfers[0].token.display_symbol(), "VGLD");
}

#[tokio::test]
async fn network_stats_without_indexer_degrade_to_zero_count() {
    let service = service();
    let stats = service.network_stats().await.unwrap();
    assert_eq!(stats.head, 3);
    assert_eq!(stats.chain_id, 808);
    assert_eq!(stats.total_transactions, 0);
    assert_eq!(stats.gas_price_wei, U256::from(2_000_000_000u64));
}

#[tokio::test]
async fn top_accounts_rank_by_balance_and_skip_zero() {
    let service = service();
    let accounts = service.top_accounts(10).await.unwrap();
    // token contract has no balance seeded, so only ALICE and BOB remain
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[0].rank, 1);
    assert_eq!(accounts[0].address, BOB);
    assert_eq!(accounts[1].rank, 2);
    assert_eq!(accounts[1].address, ALICE);
}

#[tokio::test]
async fn address_history_matches_regardless_of_case() {
    // nodes hand back checksummed addresses; the fallback filter has to
    // match them against lowercase queries and vice versa
    let mut rpc = seeded_rpc();
    let checksummed_alice = "0x0000000000000000000000000000000000000A11";
    let mixed = plain_tx(4, 4, checksummed_alice, BOB, U256::from(7u64));
    let block = mined_block(4, vec![mixed.clone()]);
    rpc.txs.insert(mixed.hash.clone(), mixed);
    rpc.blocks_by_hash
        .insert(block.hash.clone().unwrap(), block.clone());
    rpc.blocks.insert(4, block);
    rpc.head = 4;
    let service = ExplorerService::new(Box::new(rpc), None);

    // lowercase query finds the checksummed sender
    let txs = service.address_transactions(ALICE, 10).await.unwrap();
    assert!(txs.iter().any(|tx| tx.hash == tx_hash(4)));

    // checksummed query finds the lowercase history too
    let txs = service
        .address_transactions(checksummed_alice, 10)
        .await
        .unwrap();
    assert!(txs.iter().any(|tx| tx.hash == tx_hash(1)));
}

#[tokio::test]
async fn search_resolves_block_numbers() {
    let service = service();
    match service.resolve_search("2").await.unwrap() {
        SearchOutcome::Block(summary) => assert_eq!(summary.number, 2),
        other => panic!("expected block, got {other:?}"),
    }
}

#[tokio::test]
async fn search_prefers_block_hash_over_tx_hash() {
    let service = service();
    match service.resolve_search(&block_hash(2)).await.unwrap() {
        SearchOutcome::Block(summary) => assert_eq!(summary.number, 2),
        other => panic!("expected block, got {other:?}"),
    }
    match service.resolve_search(&tx_hash(1)).await.unwrap() {
        SearchOutcome::Transaction(detail) => assert_eq!(detail.tx.hash, tx_hash(1)),
        other => panic!("expected transaction, got {other:?}"),
    }
}

#[tokio::test]
async fn search_classifies_contract_addresses() {
    let service = service();
    match service.resolve_search(TOKEN_CONTRACT).await.unwrap() {
        SearchOutcome::Contract(summary) => {
            assert!(summary.is_contract);
            assert_eq!(summary.code_size, 2);
        }
        other => panic!("expected contract, got {other:?}"),
    }
    match service.resolve_search(ALICE).await.unwrap() {
        SearchOutcome::Address(summary) => {
            assert!(!summary.is_contract);
            assert_eq!(summary.balance_wei, U256::from(500u64));
        }
        other => panic!("expected address, got {other:?}"),
    }
}

#[tokio::test]
async fn search_free_text_points_at_contract_lookup() {
    let service = service();
    match service.resolve_search("gold token").await.unwrap() {
        SearchOutcome::NotFound { term, hint } => {
            assert_eq!(term, "gold token");
            assert!(hint.contains("contract address"));
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}

#[tokio::test]
async fn search_past_head_reports_not_found() {
    let service = service();
    match service.resolve_search("999").await.unwrap() {
        SearchOutcome::NotFound { hint, .. } => {
            assert!(hint.contains("head"));
        }
        other => panic!("expected not-found, got {other:?}"),
    }
}
