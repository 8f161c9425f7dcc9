//! Application state for the explorer TUI
//!
//! The app never talks to the network. It queues `RuntimeCommand`s which
//! the main loop forwards to the bridge, and the main loop feeds runtime
//! events back through the `apply_*` methods.

use std::path::PathBuf;
use std::time::Instant;

use crate::config::ChainConfig;
use crate::explorer::{
    AddressSummary, BlockSummary, NetworkStats, NftMintView, NftTransferView, SearchOutcome,
    TokenMetadata, TokenTransferView, TopAccount, TransactionDetail,
};
use crate::infrastructure::rpc::{RawBlock, RawTransaction};
use crate::infrastructure::runtime::RuntimeCommand;
use crate::store::{save_theme, Theme};

const STATUS_TTL_SECS: u64 = 5;

/// Sidebar sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Blocks,
    Transactions,
    Pending,
    Accounts,
    TokenTransfers,
    NftMints,
    NftTransfers,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Overview,
        Section::Blocks,
        Section::Transactions,
        Section::Pending,
        Section::Accounts,
        Section::TokenTransfers,
        Section::NftMints,
        Section::NftTransfers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Overview => "Overview",
            Section::Blocks => "Blocks",
            Section::Transactions => "Transactions",
            Section::Pending => "Pending",
            Section::Accounts => "Top Accounts",
            Section::TokenTransfers => "Token Transfers",
            Section::NftMints => "NFT Mints",
            Section::NftTransfers => "NFT Transfers",
        }
    }

    fn index(self) -> usize {
        Section::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }
}

/// Detail views pushed on top of the section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    BlockDetail,
    TxDetail,
    AddressDetail,
    TokenDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct RpcEndpointOption {
    pub label: String,
    pub display: String,
}

/// A block opened in the detail view, with its stitched transactions.
#[derive(Debug, Clone)]
pub struct BlockDetail {
    pub block: RawBlock,
    pub txs: Vec<RawTransaction>,
    pub selected: usize,
}

#[derive(Debug, Clone)]
struct StatusLine {
    message: String,
    level: StatusLevel,
    set_at: Instant,
}

pub struct App {
    pub chain: ChainConfig,
    pub theme: Theme,
    pub theme_path: Option<PathBuf>,

    pub should_quit: bool,
    pub paused: bool,
    pub help_open: bool,

    pub input_mode: InputMode,
    pub search_input: String,

    pub active_section: Section,
    view_stack: Vec<View>,

    // Connection state
    pub connected: bool,
    pub endpoint: String,
    pub client_version: String,
    pub node_chain_id: u64,
    pub rpc_endpoints: Vec<RpcEndpointOption>,
    pub rpc_endpoint_index: usize,

    // Section data
    pub stats: Option<NetworkStats>,
    pub blocks: Vec<BlockSummary>,
    pub txs: Vec<RawTransaction>,
    pub pending: Vec<RawTransaction>,
    pub accounts: Vec<TopAccount>,
    pub token_transfers: Vec<TokenTransferView>,
    pub nft_mints: Vec<NftMintView>,
    pub nft_transfers: Vec<NftTransferView>,

    // Detail data
    pub block_detail: Option<BlockDetail>,
    pub tx_detail: Option<TransactionDetail>,
    pub address_detail: Option<AddressSummary>,
    pub token_detail: Option<TokenMetadata>,

    // One selection slot per section
    selections: [usize; Section::ALL.len()],

    status: Option<StatusLine>,

    // Commands queued for the runtime bridge, drained by the main loop
    queued: Vec<RuntimeCommand>,
}

impl App {
    pub fn new(chain: ChainConfig, theme: Theme, theme_path: Option<PathBuf>) -> Self {
        Self {
            chain,
            theme,
            theme_path,
            should_quit: false,
            paused: false,
            help_open: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            active_section: Section::Overview,
            view_stack: vec![View::List],
            connected: false,
            endpoint: String::new(),
            client_version: String::new(),
            node_chain_id: 0,
            rpc_endpoints: Vec::new(),
            rpc_endpoint_index: 0,
            stats: None,
            blocks: Vec::new(),
            txs: Vec::new(),
            pending: Vec::new(),
            accounts: Vec::new(),
            token_transfers: Vec::new(),
            nft_mints: Vec::new(),
            nft_transfers: Vec::new(),
            block_detail: None,
            tx_detail: None,
            address_detail: None,
            token_detail: None,
            selections: [0; Section::ALL.len()],
            status: None,
            queued: Vec::new(),
        }
    }

    // === Status bar ===

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusLine {
            message: message.into(),
            level,
            set_at: Instant::now(),
        });
    }

    pub fn status(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|line| (line.message.as_str(), line.level))
    }

    /// Expire stale status lines.
    pub fn on_tick(&mut self) {
        if let Some(line) = &self.status {
            if line.level != StatusLevel::Error
                && line.set_at.elapsed().as_secs() >= STATUS_TTL_SECS
            {
                self.status = None;
            }
        }
    }

    // === Views and sections ===

    pub fn current_view(&self) -> View {
        *self.view_stack.last().unwrap_or(&View::List)
    }

    fn push_view(&mut self, view: View) {
        if self.current_view() != view {
            self.view_stack.push(view);
        }
    }

    pub fn pop_view(&mut self) {
        if self.view_stack.len() > 1 {
            self.view_stack.pop();
        }
    }

    pub fn set_section(&mut self, section: Section) {
        self.active_section = section;
        self.view_stack = vec![View::List];
        self.queue_section_fetch(section);
    }

    pub fn cycle_section(&mut self, forward: bool) {
        let count = Section::ALL.len();
        let idx = self.active_section.index();
        let next = if forward {
            (idx + 1) % count
        } else {
            (idx + count - 1) % count
        };
        self.set_section(Section::ALL[next]);
    }

    /// Sections whose data is not covered by the overview poll need an
    /// explicit fetch when entered.
    fn queue_section_fetch(&mut self, section: Section) {
        let cmd = match section {
            Section::Overview | Section::Blocks | Section::Transactions => return,
            Section::Pending => RuntimeCommand::FetchPending,
            Section::Accounts => RuntimeCommand::FetchTopAccounts,
            Section::TokenTransfers => RuntimeCommand::FetchTokenTransfers,
            Section::NftMints => RuntimeCommand::FetchNftMints,
            Section::NftTransfers => RuntimeCommand::FetchNftTransfers,
        };
        self.request(cmd);
    }

    // === Selection ===

    pub fn list_len(&self) -> usize {
        if self.current_view() == View::BlockDetail {
            return self
                .block_detail
                .as_ref()
                .map(|detail| detail.txs.len())
                .unwrap_or(0);
        }
        match self.active_section {
            Section::Overview => 0,
            Section::Blocks => self.blocks.len(),
            Section::Transactions => self.txs.len(),
            Section::Pending => self.pending.len(),
            Section::Accounts => self.accounts.len(),
            Section::TokenTransfers => self.token_transfers.len(),
            Section::NftMints => self.nft_mints.len(),
            Section::NftTransfers => self.nft_transfers.len(),
        }
    }

    pub fn current_selection(&self) -> usize {
        if self.current_view() == View::BlockDetail {
            return self
                .block_detail
                .as_ref()
                .map(|detail| detail.selected)
                .unwrap_or(0);
        }
        self.selections[self.active_section.index()]
    }

    fn set_selection(&mut self, value: usize) {
        let len = self.list_len();
        let clamped = if len == 0 { 0 } else { value.min(len - 1) };
        if self.current_view() == View::BlockDetail {
            if let Some(detail) = &mut self.block_detail {
                detail.selected = clamped;
            }
            return;
        }
        self.selections[self.active_section.index()] = clamped;
    }

    pub fn move_selection_up(&mut self) {
        let current = self.current_selection();
        self.set_selection(current.saturating_sub(1));
    }

    pub fn move_selection_down(&mut self) {
        let current = self.current_selection();
        self.set_selection(current + 1);
    }

    pub fn go_to_top(&mut self) {
        self.set_selection(0);
    }

    pub fn go_to_bottom(&mut self) {
        let len = self.list_len();
        self.set_selection(len.saturating_sub(1));
    }

    // === Runtime command queue ===

    pub fn request(&mut self, cmd: RuntimeCommand) {
        self.queued.push(cmd);
    }

    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.queued)
    }

    pub fn refresh(&mut self) {
        self.request(RuntimeCommand::Refresh);
        self.queue_section_fetch(self.active_section);
        self.set_status("Refreshing…", StatusLevel::Info);
    }

    pub fn cycle_rpc_endpoint(&mut self, forward: bool) {
        let count = self.rpc_endpoints.len();
        if count <= 1 {
            self.set_status("Only one RPC endpoint configured", StatusLevel::Warn);
            return;
        }
        let next = if forward {
            (self.rpc_endpoint_index + 1) % count
        } else {
            (self.rpc_endpoint_index + count - 1) % count
        };
        self.rpc_endpoint_index = next;
        self.connected = false;
        self.request(RuntimeCommand::SwitchEndpoint { index: next });
        let label = self.rpc_endpoints[next].label.clone();
        self.set_status(format!("Switching to {label}"), StatusLevel::Info);
    }

    /// Open the detail view for the selected list row.
    pub fn open_selected(&mut self) {
        if self.current_view() == View::BlockDetail {
            let hash = self
                .block_detail
                .as_ref()
                .and_then(|detail| detail.txs.get(detail.selected))
                .map(|tx| tx.hash.clone());
            if let Some(hash) = hash {
                self.request(RuntimeCommand::OpenTransaction { hash });
            }
            return;
        }

        let selection = self.current_selection();
        match self.active_section {
            Section::Overview => {}
            Section::Blocks => {
                if let Some(block) = self.blocks.get(selection) {
                    let number = block.number;
                    self.request(RuntimeCommand::OpenBlock { number });
                }
            }
            Section::Transactions => {
                if let Some(tx) = self.txs.get(selection) {
                    let hash = tx.hash.clone();
                    self.request(RuntimeCommand::OpenTransaction { hash });
                }
            }
            Section::Pending => {
                if let Some(tx) = self.pending.get(selection) {
                    let hash = tx.hash.clone();
                    self.request(RuntimeCommand::OpenTransaction { hash });
                }
            }
            Section::Accounts => {
                if let Some(account) = self.accounts.get(selection) {
                    let address = account.address.clone();
                    self.request(RuntimeCommand::OpenAddress { address });
                }
            }
            Section::TokenTransfers => {
                // the interesting entity here is the token, not the tx
                if let Some(transfer) = self.token_transfers.get(selection) {
                    let address = transfer.token.address.clone();
                    self.request(RuntimeCommand::OpenToken { address });
                }
            }
            Section::NftMints => {
                if let Some(mint) = self.nft_mints.get(selection) {
                    let hash = mint.tx_hash.clone();
                    self.request(RuntimeCommand::OpenTransaction { hash });
                }
            }
            Section::NftTransfers => {
                if let Some(transfer) = self.nft_transfers.get(selection) {
                    let hash = transfer.tx_hash.clone();
                    self.request(RuntimeCommand::OpenTransaction { hash });
                }
            }
        }
    }

    // === Search ===

    pub fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input.clear();
    }

    pub fn exit_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
    }

    pub fn submit_search(&mut self) {
        let term = self.search_input.trim().to_string();
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
        if term.is_empty() {
            return;
        }
        self.set_status(format!("Searching for {term}…"), StatusLevel::Info);
        self.request(RuntimeCommand::Search { term });
    }

    // === Toggles ===

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let state = if self.paused { "paused" } else { "live" };
        self.set_status(format!("Feed {state}"), StatusLevel::Info);
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        let label = self.theme.label();
        let saved = self
            .theme_path
            .as_deref()
            .map(|path| save_theme(path, self.theme));
        match saved {
            Some(Ok(())) => self.set_status(format!("Theme: {label}"), StatusLevel::Info),
            Some(Err(err)) => {
                self.set_status(format!("Theme: {label} (not saved: {err})"), StatusLevel::Warn)
            }
            None => self.set_status(format!("Theme: {label} (not saved)"), StatusLevel::Info),
        }
    }

    // === Clipboard target ===

    /// The identifier worth copying in the current context.
    pub fn copy_target(&self) -> Option<String> {
        match self.current_view() {
            View::BlockDetail => self
                .block_detail
                .as_ref()
                .and_then(|detail| detail.block.hash.clone()),
            View::TxDetail => self.tx_detail.as_ref().map(|detail| detail.tx.hash.clone()),
            View::AddressDetail => self
                .address_detail
                .as_ref()
                .map(|summary| summary.address.clone()),
            View::TokenDetail => self.token_detail.as_ref().map(|meta| meta.address.clone()),
            View::List => {
                let selection = self.current_selection();
                match self.active_section {
                    Section::Overview => None,
                    Section::Blocks => self.blocks.get(selection).map(|b| b.hash.clone()),
                    Section::Transactions => self.txs.get(selection).map(|tx| tx.hash.clone()),
                    Section::Pending => self.pending.get(selection).map(|tx| tx.hash.clone()),
                    Section::Accounts => {
                        self.accounts.get(selection).map(|a| a.address.clone())
                    }
                    Section::TokenTransfers => self
                        .token_transfers
                        .get(selection)
                        .map(|t| t.tx_hash.clone()),
                    Section::NftMints => {
                        self.nft_mints.get(selection).map(|m| m.tx_hash.clone())
                    }
                    Section::NftTransfers => self
                        .nft_transfers
                        .get(selection)
                        .map(|t| t.tx_hash.clone()),
                }
            }
        }
    }

    // === Runtime event ingestion ===

    pub fn apply_connected(&mut self, endpoint: String, client_version: String, chain_id: u64) {
        self.connected = true;
        self.endpoint = endpoint;
        self.client_version = client_version;
        self.node_chain_id = chain_id;
        if chain_id != 0 && chain_id != self.chain.chain_id {
            self.set_status(
                format!(
                    "Connected, but node reports chain id {chain_id} (expected {})",
                    self.chain.chain_id
                ),
                StatusLevel::Warn,
            );
        } else {
            self.set_status(format!("Connected to {}", self.endpoint), StatusLevel::Info);
        }
    }

    pub fn apply_stats(&mut self, stats: NetworkStats) {
        if !self.paused {
            self.stats = Some(stats);
        }
    }

    pub fn apply_blocks(&mut self, blocks: Vec<BlockSummary>) {
        if !self.paused {
            self.blocks = blocks;
            let idx = Section::Blocks.index();
            self.selections[idx] = self.selections[idx].min(self.blocks.len().saturating_sub(1));
        }
    }

    pub fn apply_txs(&mut self, txs: Vec<RawTransaction>) {
        if !self.paused {
            self.txs = txs;
            let idx = Section::Transactions.index();
            self.selections[idx] = self.selections[idx].min(self.txs.len().saturating_sub(1));
        }
    }

    pub fn apply_block_detail(&mut self, block: RawBlock, txs: Vec<RawTransaction>) {
        self.block_detail = Some(BlockDetail {
            block,
            txs,
            selected: 0,
        });
        self.push_view(View::BlockDetail);
    }

    pub fn apply_tx_detail(&mut self, detail: TransactionDetail) {
        self.tx_detail = Some(detail);
        self.push_view(View::TxDetail);
    }

    pub fn apply_address(&mut self, summary: AddressSummary) {
        self.address_detail = Some(summary);
        self.push_view(View::AddressDetail);
    }

    pub fn apply_token(&mut self, meta: TokenMetadata) {
        self.token_detail = Some(meta);
        self.push_view(View::TokenDetail);
    }

    pub fn apply_pending(&mut self, txs: Vec<RawTransaction>) {
        self.pending = txs;
        let idx = Section::Pending.index();
        self.selections[idx] = self.selections[idx].min(self.pending.len().saturating_sub(1));
    }

    pub fn apply_accounts(&mut self, accounts: Vec<TopAccount>) {
        self.accounts = accounts;
        let idx = Section::Accounts.index();
        self.selections[idx] = self.selections[idx].min(self.accounts.len().saturating_sub(1));
    }

    pub fn apply_token_transfers(&mut self, transfers: Vec<TokenTransferView>) {
        self.token_transfers = transfers;
        let idx = Section::TokenTransfers.index();
        self.selections[idx] =
            self.selections[idx].min(self.token_transfers.len().saturating_sub(1));
    }

    pub fn apply_nft_mints(&mut self, mints: Vec<NftMintView>) {
        self.nft_mints = mints;
        let idx = Section::NftMints.index();
        self.selections[idx] = self.selections[idx].min(self.nft_mints.len().saturating_sub(1));
    }

    pub fn apply_nft_transfers(&mut self, transfers: Vec<NftTransferView>) {
        self.nft_transfers = transfers;
        let idx = Section::NftTransfers.index();
        self.selections[idx] =
            self.selections[idx].min(self.nft_transfers.len().saturating_sub(1));
    }

    pub fn apply_search(&mut self, outcome: SearchOutcome) {
        match outcome {
            SearchOutcome::Block(summary) => {
                self.request(RuntimeCommand::OpenBlock {
                    number: summary.number,
                });
            }
            SearchOutcome::Transaction(detail) => self.apply_tx_detail(*detail),
            SearchOutcome::Address(summary) | SearchOutcome::Contract(summary) => {
                self.apply_address(summary)
            }
            SearchOutcome::NotFound { term, hint } => {
                self.set_status(format!("No result for \"{term}\": {hint}"), StatusLevel::Warn);
            }
        }
    }

    pub fn apply_error(&mut self, message: String) {
        self.set_status(message, StatusLevel::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;

    fn test_app() -> App {
        App::new(ChainConfig::default(), Theme::Dark, None)
    }

    fn block(number: u64) -> BlockSummary {
        BlockSummary {
            number,
            hash: format!("0x{number:064x}"),
            parent_hash: format!("0x{:064x}", number.saturating_sub(1)),
            timestamp: 1_700_000_000 + number * 2,
            tx_count: 3,
            gas_used: 21_000,
            gas_limit: 30_000_000,
            miner: "0x0000000000000000000000000000000000000001".to_string(),
            size: 1024,
        }
    }

    #[test]
    fn section_cycling_wraps() {
        let mut app = test_app();
        assert_eq!(app.active_section, Section::Overview);
        app.cycle_section(false);
        assert_eq!(app.active_section, Section::NftTransfers);
        app.cycle_section(true);
        assert_eq!(app.active_section, Section::Overview);
    }

    #[test]
    fn entering_pending_section_queues_fetch() {
        let mut app = test_app();
        app.set_section(Section::Pending);
        let cmds = app.take_commands();
        assert!(matches!(cmds.as_slice(), [RuntimeCommand::FetchPending]));
        // blocks section is covered by the overview poll, no extra fetch
        app.set_section(Section::Blocks);
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn selection_clamps_to_list() {
        let mut app = test_app();
        app.set_section(Section::Blocks);
        app.apply_blocks(vec![block(1), block(2), block(3)]);
        app.go_to_bottom();
        assert_eq!(app.current_selection(), 2);
        app.move_selection_down();
        assert_eq!(app.current_selection(), 2);
        app.apply_blocks(vec![block(4)]);
        assert_eq!(app.current_selection(), 0);
        app.move_selection_up();
        assert_eq!(app.current_selection(), 0);
    }

    #[test]
    fn open_selected_block_requests_detail() {
        let mut app = test_app();
        app.set_section(Section::Blocks);
        app.apply_blocks(vec![block(42), block(41)]);
        app.take_commands();
        app.open_selected();
        let cmds = app.take_commands();
        assert!(matches!(
            cmds.as_slice(),
            [RuntimeCommand::OpenBlock { number: 42 }]
        ));
    }

    #[test]
    fn open_selected_token_transfer_opens_the_token() {
        let mut app = test_app();
        app.set_section(Section::TokenTransfers);
        app.apply_token_transfers(vec![TokenTransferView {
            tx_hash: "0xf1".to_string(),
            block_number: Some(7),
            timestamp: Some(1_700_000_000),
            from: "0x0000000000000000000000000000000000000a11".to_string(),
            to: "0x0000000000000000000000000000000000000b0b".to_string(),
            amount: "1.5".to_string(),
            token: TokenMetadata {
                address: "0x00000000000000000000000000000000000000aa".to_string(),
                name: Some("Vero Gold".to_string()),
                symbol: Some("VGLD".to_string()),
                decimals: 6,
            },
        }]);
        app.take_commands();
        app.open_selected();
        let cmds = app.take_commands();
        match cmds.as_slice() {
            [RuntimeCommand::OpenToken { address }] => {
                assert_eq!(address, "0x00000000000000000000000000000000000000aa")
            }
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn search_submit_queues_command() {
        let mut app = test_app();
        app.enter_search();
        app.search_input = "  1234  ".to_string();
        app.submit_search();
        assert_eq!(app.input_mode, InputMode::Normal);
        let cmds = app.take_commands();
        match cmds.as_slice() {
            [RuntimeCommand::Search { term }] => assert_eq!(term, "1234"),
            other => panic!("unexpected commands: {other:?}"),
        }
    }

    #[test]
    fn empty_search_is_ignored() {
        let mut app = test_app();
        app.enter_search();
        app.search_input = "   ".to_string();
        app.submit_search();
        assert!(app.take_commands().is_empty());
    }

    #[test]
    fn pause_gates_live_updates() {
        let mut app = test_app();
        app.toggle_pause();
        app.apply_blocks(vec![block(9)]);
        assert!(app.blocks.is_empty());
        app.apply_stats(NetworkStats {
            head: 9,
            gas_price_wei: U256::from(1_000_000_000u64),
            total_transactions: 100,
            chain_id: 808,
        });
        assert!(app.stats.is_none());
        app.toggle_pause();
        app.apply_blocks(vec![block(9)]);
        assert_eq!(app.blocks.len(), 1);
    }

    #[test]
    fn pending_updates_ignore_pause() {
        let mut app = test_app();
        app.toggle_pause();
        app.apply_pending(Vec::new());
        assert!(app.pending.is_empty());
    }

    #[test]
    fn search_not_found_sets_status() {
        let mut app = test_app();
        app.apply_search(SearchOutcome::NotFound {
            term: "pepe".to_string(),
            hint: "try a block number, hash, or address".to_string(),
        });
        let (message, level) = app.status().unwrap();
        assert!(message.contains("pepe"));
        assert_eq!(level, StatusLevel::Warn);
        assert_eq!(app.current_view(), View::List);
    }

    #[test]
    fn chain_id_mismatch_warns() {
        let mut app = test_app();
        app.apply_connected("node".to_string(), "veroth/1.0".to_string(), 1);
        let (message, level) = app.status().unwrap();
        assert!(message.contains("chain id 1"));
        assert_eq!(level, StatusLevel::Warn);
        assert!(app.connected);
    }

    #[test]
    fn view_stack_pops_back_to_list() {
        let mut app = test_app();
        app.apply_tx_detail(TransactionDetail {
            tx: crate::infrastructure::rpc::RawTransaction::default(),
            receipt: None,
            fee_wei: None,
            token_transfer: None,
        });
        assert_eq!(app.current_view(), View::TxDetail);
        app.pop_view();
        assert_eq!(app.current_view(), View::List);
        app.pop_view();
        assert_eq!(app.current_view(), View::List);
    }
}
