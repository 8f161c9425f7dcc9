use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use verox::app::{App, InputMode, RpcEndpointOption, Section, StatusLevel};
use verox::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, RuntimeEvent, WorkerEndpoints};
use verox::store::{load_theme, Theme};

#[derive(Debug, Parser)]
#[command(
    name = "verox",
    version,
    about = "Verox: a terminal explorer for the Vero chain"
)]
struct Args {
    /// HTTP JSON-RPC endpoint (e.g. http://localhost:8545)
    #[arg(long)]
    rpc: Option<String>,

    /// Indexer API base URL (e.g. http://localhost:4100/api)
    #[arg(long)]
    indexer: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = verox::config::load();
    let (rpc_urls, rpc_endpoint_options) = endpoints_from_args_and_config(&args, &config);
    let indexer_url = args
        .indexer
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| config.indexer.clone())
        .or_else(|| Some(verox::config::DEFAULT_INDEXER_URL.to_string()));

    let theme_path = verox::config::theme_path();
    let (theme, theme_notice) = match theme_path.as_deref().map(load_theme) {
        Some(Ok(theme)) => (theme, None),
        Some(Err(err)) => (
            Theme::default(),
            Some(format!("Theme reset to dark: {err:#}")),
        ),
        None => (Theme::default(), None),
    };

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runtime = RuntimeBridge::new(WorkerEndpoints {
        rpc_urls,
        indexer_url,
    })?;

    let mut app = App::new(config.chain.clone(), theme, theme_path);
    app.rpc_endpoints = rpc_endpoint_options;
    match theme_notice {
        Some(notice) => app.set_status(notice, StatusLevel::Warn),
        None => app.set_status("Connecting…", StatusLevel::Info),
    }

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: RuntimeBridge,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, &runtime);
        terminal.draw(|f| verox::ui::draw(f, &mut app))?;
        if app.should_quit {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, &runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        match event {
            RuntimeEvent::Connected {
                endpoint,
                client_version,
                chain_id,
            } => app.apply_connected(endpoint, client_version, chain_id),
            RuntimeEvent::StatsReady(stats) => app.apply_stats(stats),
            RuntimeEvent::LatestBlocks(blocks) => app.apply_blocks(blocks),
            RuntimeEvent::LatestTransactions(txs) => app.apply_txs(txs),
            RuntimeEvent::NewHead { .. } => {}
            RuntimeEvent::BlockReady { block, txs } => app.apply_block_detail(block, txs),
            RuntimeEvent::TransactionReady(detail) => app.apply_tx_detail(*detail),
            RuntimeEvent::AddressReady(summary) => app.apply_address(summary),
            RuntimeEvent::TokenReady(meta) => app.apply_token(meta),
            RuntimeEvent::PendingReady(txs) => app.apply_pending(txs),
            RuntimeEvent::TopAccountsReady(accounts) => app.apply_accounts(accounts),
            RuntimeEvent::TokenTransfersReady(transfers) => app.apply_token_transfers(transfers),
            RuntimeEvent::NftMintsReady(mints) => app.apply_nft_mints(mints),
            RuntimeEvent::NftTransfersReady(transfers) => app.apply_nft_transfers(transfers),
            RuntimeEvent::SearchReady(outcome) => app.apply_search(outcome),
            RuntimeEvent::Error { message } => app.apply_error(message),
        }
    }

    for cmd in app.take_commands() {
        let _ = runtime.send(cmd);
    }
}

fn endpoints_from_args_and_config(
    args: &Args,
    config: &verox::config::Config,
) -> (Vec<String>, Vec<RpcEndpointOption>) {
    use std::collections::BTreeSet;

    let mut urls = Vec::new();
    let mut options = Vec::new();
    let mut seen = BTreeSet::<String>::new();

    let mut push = |urls: &mut Vec<String>,
                    options: &mut Vec<RpcEndpointOption>,
                    url: String,
                    name: Option<String>| {
        if !seen.insert(url.to_lowercase()) {
            return;
        }
        let label = name
            .filter(|value| !value.trim().is_empty())
            .map(|name| format!("{name} ({url})"))
            .unwrap_or_else(|| url.clone());
        options.push(RpcEndpointOption {
            label,
            display: url.clone(),
        });
        urls.push(url);
    };

    // CLI argument takes precedence
    if let Some(rpc) = args.rpc.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        push(
            &mut urls,
            &mut options,
            normalize_http_endpoint(rpc),
            Some("cli".to_string()),
        );
    }

    for entry in &config.endpoints {
        let rpc = entry.rpc.trim();
        if rpc.is_empty() {
            continue;
        }
        push(
            &mut urls,
            &mut options,
            normalize_http_endpoint(rpc),
            entry.name.clone(),
        );
    }

    if urls.is_empty() {
        push(
            &mut urls,
            &mut options,
            normalize_http_endpoint(verox::config::DEFAULT_RPC_URL),
            Some("public".to_string()),
        );
    }

    (urls, options)
}

fn normalize_http_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.help_open {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.help_open = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Search => handle_search_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _) => app.should_quit = true,
        (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        (KeyCode::Char('?'), _) => app.help_open = true,
        (KeyCode::Char('/'), _) => app.enter_search(),
        (KeyCode::Char('r'), _) => app.refresh(),
        (KeyCode::Char('t'), _) => app.toggle_theme(),
        (KeyCode::Char(' '), _) => app.toggle_pause(),
        (KeyCode::Char('y'), _) => copy_to_clipboard(app),
        (KeyCode::Char('e'), _) => {
            let (message, level) = verox::modules::export::export_current_view(app);
            app.set_status(message, level);
        }
        (KeyCode::Char('g'), _) => app.go_to_top(),
        (KeyCode::Char('G'), _) => app.go_to_bottom(),
        (KeyCode::Char('{'), _) => app.cycle_rpc_endpoint(false),
        (KeyCode::Char('}'), _) => app.cycle_rpc_endpoint(true),
        (KeyCode::Char('['), _) => app.cycle_section(false),
        (KeyCode::Char(']'), _) => app.cycle_section(true),
        (KeyCode::Char('1'), _) => app.set_section(Section::Overview),
        (KeyCode::Char('2'), _) => app.set_section(Section::Blocks),
        (KeyCode::Char('3'), _) => app.set_section(Section::Transactions),
        (KeyCode::Char('4'), _) => app.set_section(Section::Pending),
        (KeyCode::Char('5'), _) => app.set_section(Section::Accounts),
        (KeyCode::Char('6'), _) => app.set_section(Section::TokenTransfers),
        (KeyCode::Char('7'), _) => app.set_section(Section::NftMints),
        (KeyCode::Char('8'), _) => app.set_section(Section::NftTransfers),
        (KeyCode::Up | KeyCode::Char('k'), _) => app.move_selection_up(),
        (KeyCode::Down | KeyCode::Char('j'), _) => app.move_selection_down(),
        (KeyCode::Enter, _) => app.open_selected(),
        (KeyCode::Esc, _) => app.pop_view(),
        _ => {}
    }
}

fn handle_search_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.exit_search(),
        KeyCode::Enter => app.submit_search(),
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(ch) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return;
            }
            app.search_input.push(ch);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(rpc: Option<&str>) -> Args {
        Args {
            rpc: rpc.map(str::to_string),
            indexer: None,
        }
    }

    #[test]
    fn empty_config_falls_back_to_public_endpoint() {
        let config = verox::config::Config::default();
        let (urls, options) = endpoints_from_args_and_config(&args(None), &config);
        assert_eq!(urls, vec![verox::config::DEFAULT_RPC_URL.to_string()]);
        assert!(options[0].label.starts_with("public"));
    }

    #[test]
    fn cli_endpoint_comes_first_and_dedups() {
        let config = verox::config::Config {
            endpoints: vec![verox::config::EndpointConfig {
                name: Some("local".to_string()),
                rpc: "http://localhost:8545".to_string(),
            }],
            ..Default::default()
        };
        let (urls, _) = endpoints_from_args_and_config(&args(Some("localhost:8545")), &config);
        // the config entry is the same endpoint, normalized
        assert_eq!(urls, vec!["http://localhost:8545".to_string()]);
    }

    #[test]
    fn bare_host_gets_http_scheme() {
        assert_eq!(normalize_http_endpoint("localhost:8545"), "http://localhost:8545");
        assert_eq!(
            normalize_http_endpoint("https://vero-rpc.publicnode.online"),
            "https://vero-rpc.publicnode.online"
        );
    }
}

fn copy_to_clipboard(app: &mut App) {
    use arboard::Clipboard;

    let Some(text) = app.copy_target() else {
        app.set_status("Nothing to copy", StatusLevel::Warn);
        return;
    };

    match Clipboard::new() {
        Ok(mut clipboard) => {
            if clipboard.set_text(&text).is_ok() {
                let shown = if text.len() > 20 {
                    format!("{}…", &text[..20])
                } else {
                    text
                };
                app.set_status(format!("Copied: {shown}"), StatusLevel::Info);
            } else {
                app.set_status("Failed to copy to clipboard", StatusLevel::Error);
            }
        }
        Err(_) => {
            app.set_status("Clipboard not available", StatusLevel::Error);
        }
    }
}
