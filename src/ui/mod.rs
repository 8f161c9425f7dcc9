use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, InputMode, Section, StatusLevel, View};
use crate::domain::format::{relative_time, short_address, short_hash};
use crate::domain::units::{format_ether, format_gwei, format_token_amount};
use crate::explorer::TransactionDetail;
use crate::infrastructure::rpc::RawTransaction;
use crate::store::Theme;

/// Colors resolved from the active theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    fg: Color,
    dim: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    warn: Color,
    error: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Palette {
                fg: Color::White,
                dim: Color::DarkGray,
                accent: Color::LightCyan,
                highlight_fg: Color::Black,
                highlight_bg: Color::Cyan,
                warn: Color::Yellow,
                error: Color::LightRed,
            },
            Theme::Light => Palette {
                fg: Color::Black,
                dim: Color::Gray,
                accent: Color::Blue,
                highlight_fg: Color::White,
                highlight_bg: Color::Blue,
                warn: Color::Rgb(160, 110, 0),
                error: Color::Red,
            },
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.size();
    let palette = Palette::for_theme(app.theme);
    let areas = layout::areas(size);

    draw_header(f, areas.header, app, palette);
    draw_sidebar(f, areas.sidebar, app, palette);
    draw_content(f, areas.content, app, palette);
    draw_status_line(f, areas.status_line, app, palette);
    draw_input_line(f, areas.input_line, app, palette);

    if app.help_open {
        draw_help_popup(f, areas.size, palette);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let connection = if app.connected {
        app.endpoint.clone()
    } else {
        "connecting…".to_string()
    };
    let title = Line::from(vec![
        Span::styled(
            app.chain.name.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("RPC", Style::default().fg(palette.dim)),
        Span::raw(format!(" {connection} ")),
        Span::styled("Node", Style::default().fg(palette.dim)),
        Span::raw(format!(
            " {}",
            if app.client_version.is_empty() {
                "--"
            } else {
                &app.client_version
            }
        )),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let mut right_spans = vec![
        Span::styled("Chain ", Style::default().fg(palette.dim)),
        Span::raw(format!("{}  ", app.chain.chain_id)),
    ];
    if let Some(stats) = &app.stats {
        right_spans.push(Span::styled("Head ", Style::default().fg(palette.dim)));
        right_spans.push(Span::raw(format!("{}  ", stats.head)));
        right_spans.push(Span::styled("Gas ", Style::default().fg(palette.dim)));
        right_spans.push(Span::raw(format!(
            "{} gwei",
            format_gwei(stats.gas_price_wei)
        )));
    }
    if app.paused {
        right_spans.push(Span::raw("  "));
        right_spans.push(Span::styled(
            "PAUSED",
            Style::default()
                .fg(palette.warn)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let right = Paragraph::new(Line::from(right_spans))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let items: Vec<ListItem> = Section::ALL
        .iter()
        .map(|section| {
            let is_active = *section == app.active_section;
            let style = if is_active {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.fg)
            };
            ListItem::new(Line::from(section.title())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Sections"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("-> ");

    let mut state = ListState::default();
    state.select(
        Section::ALL
            .iter()
            .position(|section| *section == app.active_section),
    );
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_content(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    match app.current_view() {
        View::List => match app.active_section {
            Section::Overview => draw_overview(f, area, app, palette),
            _ => draw_section_list(f, area, app, palette),
        },
        View::BlockDetail => draw_block_detail(f, area, app, palette),
        View::TxDetail => draw_paragraph(
            f,
            area,
            "Transaction",
            app.tx_detail
                .as_ref()
                .map(|detail| tx_detail_lines(detail, app, palette))
                .unwrap_or_default(),
        ),
        View::AddressDetail => draw_paragraph(
            f,
            area,
            "Address",
            address_detail_lines(app, palette),
        ),
        View::TokenDetail => draw_paragraph(f, area, "Token", token_detail_lines(app, palette)),
    }
}

fn draw_paragraph(f: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line<'_>>) {
    if lines.is_empty() {
        lines.push(Line::from("No data"));
    }
    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn draw_overview(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let mut stat_lines = Vec::new();
    if let Some(stats) = &app.stats {
        stat_lines.push(Line::from(vec![
            Span::styled("Latest block  ", Style::default().fg(palette.dim)),
            Span::raw(stats.head.to_string()),
            Span::raw("    "),
            Span::styled("Gas price  ", Style::default().fg(palette.dim)),
            Span::raw(format!("{} gwei", format_gwei(stats.gas_price_wei))),
        ]));
        stat_lines.push(Line::from(vec![
            Span::styled("Transactions  ", Style::default().fg(palette.dim)),
            Span::raw(stats.total_transactions.to_string()),
            Span::raw("    "),
            Span::styled("Block time  ", Style::default().fg(palette.dim)),
            Span::raw(format!("~{}s", app.chain.block_time_secs)),
        ]));
    } else {
        stat_lines.push(Line::from("Waiting for network data…"));
    }
    let stats_widget = Paragraph::new(Text::from(stat_lines))
        .block(Block::default().borders(Borders::ALL).title("Network"));
    f.render_widget(stats_widget, chunks[0]);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let block_lines: Vec<Line> = app
        .blocks
        .iter()
        .take(10)
        .map(|block| {
            Line::from(vec![
                Span::styled(
                    format!("#{:<9}", block.number),
                    Style::default().fg(palette.accent),
                ),
                Span::raw(format!("{:>3} txs  ", block.tx_count)),
                Span::styled(relative_time(block.timestamp), Style::default().fg(palette.dim)),
            ])
        })
        .collect();
    let blocks_widget = Paragraph::new(Text::from(block_lines))
        .block(Block::default().borders(Borders::ALL).title("Latest Blocks"));
    f.render_widget(blocks_widget, halves[0]);

    let tx_lines: Vec<Line> = app
        .txs
        .iter()
        .take(10)
        .map(|tx| tx_row(tx, app, palette))
        .collect();
    let txs_widget = Paragraph::new(Text::from(tx_lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Latest Transactions"),
    );
    f.render_widget(txs_widget, halves[1]);
}

fn draw_section_list(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let items: Vec<ListItem> = match app.active_section {
        Section::Overview => Vec::new(),
        Section::Blocks => app
            .blocks
            .iter()
            .map(|block| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("#{:<9}", block.number),
                        Style::default().fg(palette.accent),
                    ),
                    Span::raw(format!("{:>4} txs  ", block.tx_count)),
                    Span::raw(format!("gas {:>5.1}%  ", block.gas_utilization())),
                    Span::raw(format!("{}  ", short_address(&block.miner))),
                    Span::styled(
                        relative_time(block.timestamp),
                        Style::default().fg(palette.dim),
                    ),
                ]))
            })
            .collect(),
        Section::Transactions => app
            .txs
            .iter()
            .map(|tx| ListItem::new(tx_row(tx, app, palette)))
            .collect(),
        Section::Pending => app
            .pending
            .iter()
            .map(|tx| ListItem::new(tx_row(tx, app, palette)))
            .collect(),
        Section::Accounts => app
            .accounts
            .iter()
            .map(|account| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", account.rank),
                        Style::default().fg(palette.dim),
                    ),
                    Span::raw(format!("{}  ", account.address)),
                    Span::styled(
                        format!(
                            "{} {}",
                            format_ether(account.balance_wei),
                            app.chain.coin_symbol
                        ),
                        Style::default().fg(palette.accent),
                    ),
                ]))
            })
            .collect(),
        Section::TokenTransfers => app
            .token_transfers
            .iter()
            .map(|transfer| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}  ", short_hash(&transfer.tx_hash, 10)),
                        Style::default().fg(palette.dim),
                    ),
                    Span::raw(format!(
                        "{} -> {}  ",
                        short_address(&transfer.from),
                        short_address(&transfer.to)
                    )),
                    Span::styled(
                        format!("{} {}", transfer.amount, transfer.token.display_symbol()),
                        Style::default().fg(palette.accent),
                    ),
                ]))
            })
            .collect(),
        Section::NftMints => app
            .nft_mints
            .iter()
            .map(|mint| {
                let token_id = mint
                    .token_id
                    .map(|id| format!("#{id}"))
                    .unwrap_or_else(|| "new".to_string());
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}  ", short_hash(&mint.tx_hash, 10)),
                        Style::default().fg(palette.dim),
                    ),
                    Span::raw(format!("{}  ", mint.standard.label())),
                    Span::styled(format!("{token_id}  "), Style::default().fg(palette.accent)),
                    Span::raw(format!("x{}  ", mint.quantity)),
                    Span::raw(
                        mint.collection
                            .clone()
                            .unwrap_or_else(|| short_address(&mint.contract)),
                    ),
                ]))
            })
            .collect(),
        Section::NftTransfers => app
            .nft_transfers
            .iter()
            .map(|transfer| {
                let token_id = transfer
                    .token_id
                    .map(|id| format!("#{id}"))
                    .unwrap_or_default();
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{}  ", short_hash(&transfer.tx_hash, 10)),
                        Style::default().fg(palette.dim),
                    ),
                    Span::raw(format!("{}  ", transfer.standard.label())),
                    Span::styled(format!("{token_id}  "), Style::default().fg(palette.accent)),
                    Span::raw(format!(
                        "{} -> {}",
                        short_address(&transfer.from),
                        short_address(&transfer.to)
                    )),
                ]))
            })
            .collect(),
    };

    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.active_section.title()),
        )
        .highlight_style(
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !empty {
        state.select(Some(app.current_selection()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn tx_row<'a>(tx: &'a RawTransaction, app: &'a App, palette: Palette) -> Line<'a> {
    let to = tx
        .to
        .as_deref()
        .map(short_address)
        .unwrap_or_else(|| "contract creation".to_string());
    let mut spans = vec![
        Span::styled(
            format!("{}  ", short_hash(&tx.hash, 10)),
            Style::default().fg(palette.dim),
        ),
        Span::raw(format!("{} -> {to}  ", short_address(&tx.from))),
        Span::styled(
            format!("{} {}", format_ether(tx.value), app.chain.coin_symbol),
            Style::default().fg(palette.accent),
        ),
    ];
    if let Some(ts) = tx.timestamp {
        spans.push(Span::styled(
            format!("  {}", relative_time(ts)),
            Style::default().fg(palette.dim),
        ));
    }
    Line::from(spans)
}

fn draw_block_detail(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let Some(detail) = &app.block_detail else {
        draw_paragraph(f, area, "Block", Vec::new());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(area);

    let block = &detail.block;
    let number = block
        .number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "pending".to_string());
    let hash = block.hash.clone().unwrap_or_else(|| "--".to_string());
    let header_lines = vec![
        field_line("Number", number, palette),
        field_line("Hash", hash, palette),
        field_line("Parent", block.parent_hash.clone(), palette),
        field_line("Miner", block.miner.clone(), palette),
        field_line(
            "Gas",
            format!("{} / {}", block.gas_used, block.gas_limit),
            palette,
        ),
        field_line("Age", relative_time(block.timestamp), palette),
    ];
    let header = Paragraph::new(Text::from(header_lines))
        .block(Block::default().borders(Borders::ALL).title("Block"));
    f.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = detail
        .txs
        .iter()
        .map(|tx| ListItem::new(tx_row(tx, app, palette)))
        .collect();
    let empty = items.is_empty();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Transactions ({})", detail.txs.len())),
        )
        .highlight_style(
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");
    let mut state = ListState::default();
    if !empty {
        state.select(Some(detail.selected));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn field_line(name: &str, value: String, palette: Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name:<12}"), Style::default().fg(palette.dim)),
        Span::raw(value),
    ])
}

fn tx_detail_lines<'a>(
    detail: &'a TransactionDetail,
    app: &'a App,
    palette: Palette,
) -> Vec<Line<'a>> {
    let tx = &detail.tx;
    let mut lines = vec![
        field_line("Hash", tx.hash.clone(), palette),
        field_line(
            "Status",
            match detail.receipt.as_ref().and_then(|r| r.status) {
                Some(true) => "success".to_string(),
                Some(false) => "reverted".to_string(),
                None => "pending".to_string(),
            },
            palette,
        ),
        field_line(
            "Block",
            tx.block_number
                .map(|n| n.to_string())
                .unwrap_or_else(|| "pending".to_string()),
            palette,
        ),
        field_line("From", tx.from.clone(), palette),
        field_line(
            "To",
            tx.to.clone().unwrap_or_else(|| "contract creation".to_string()),
            palette,
        ),
        field_line(
            "Value",
            format!("{} {}", format_ether(tx.value), app.chain.coin_symbol),
            palette,
        ),
        field_line(
            "Gas price",
            format!("{} gwei", format_gwei(tx.gas_price)),
            palette,
        ),
        field_line("Nonce", tx.nonce.to_string(), palette),
    ];

    if let Some(fee) = detail.fee_wei {
        lines.push(field_line(
            "Fee",
            format!("{} {}", format_ether(fee), app.chain.coin_symbol),
            palette,
        ));
    }
    if let Some(receipt) = &detail.receipt {
        lines.push(field_line(
            "Gas used",
            receipt.gas_used.to_string(),
            palette,
        ));
        lines.push(field_line("Logs", receipt.log_count.to_string(), palette));
    }
    if let Some(ts) = tx.timestamp {
        lines.push(field_line("Age", relative_time(ts), palette));
    }

    if let Some(transfer) = &detail.token_transfer {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Token Transfer",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(field_line("Token", transfer.token.address.clone(), palette));
        lines.push(field_line(
            "Amount",
            format!("{} {}", transfer.amount, transfer.token.display_symbol()),
            palette,
        ));
        lines.push(field_line("Recipient", transfer.to.clone(), palette));
    }

    if !tx.input.is_empty() {
        lines.push(Line::from(""));
        lines.push(field_line(
            "Input",
            format!("0x{} ({} bytes)", hex::encode(&tx.input[..tx.input.len().min(36)]), tx.input.len()),
            palette,
        ));
    }

    lines
}

fn address_detail_lines<'a>(app: &'a App, palette: Palette) -> Vec<Line<'a>> {
    let Some(summary) = &app.address_detail else {
        return Vec::new();
    };

    let kind = if summary.is_contract {
        format!("contract ({} bytes of code)", summary.code_size)
    } else {
        "externally owned account".to_string()
    };
    let mut lines = vec![
        field_line("Address", summary.address.clone(), palette),
        field_line("Type", kind, palette),
        field_line(
            "Balance",
            format!(
                "{} {}",
                format_ether(summary.balance_wei),
                app.chain.coin_symbol
            ),
            palette,
        ),
        Line::from(""),
        Line::from(Span::styled(
            format!("Recent Transactions ({})", summary.transactions.len()),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
    ];
    for tx in &summary.transactions {
        lines.push(tx_row(tx, app, palette));
    }
    lines
}

fn token_detail_lines<'a>(app: &'a App, palette: Palette) -> Vec<Line<'a>> {
    let Some(meta) = &app.token_detail else {
        return Vec::new();
    };
    vec![
        field_line("Contract", meta.address.clone(), palette),
        field_line("Name", meta.display_name().to_string(), palette),
        field_line("Symbol", meta.display_symbol().to_string(), palette),
        field_line("Decimals", meta.decimals.to_string(), palette),
        field_line(
            "One unit",
            format_token_amount(
                alloy_primitives::U256::from(10u64).pow(alloy_primitives::U256::from(
                    meta.decimals as u64,
                )),
                meta.decimals,
            ),
            palette,
        ),
    ]
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let spans = match app.status() {
        Some((message, level)) => {
            let color = match level {
                StatusLevel::Info => palette.fg,
                StatusLevel::Warn => palette.warn,
                StatusLevel::Error => palette.error,
            };
            vec![Span::styled(message.to_string(), Style::default().fg(color))]
        }
        None => vec![
            Span::styled("Section ", Style::default().fg(palette.dim)),
            Span::raw(app.active_section.title()),
        ],
    };
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input_line(f: &mut Frame, area: Rect, app: &App, palette: Palette) {
    let line = match app.input_mode {
        InputMode::Search => Line::from(vec![
            Span::styled("/", Style::default().fg(palette.accent)),
            Span::raw(app.search_input.clone()),
            Span::styled("▏", Style::default().fg(palette.accent)),
        ]),
        InputMode::Normal => Line::from(Span::styled(
            "q quit  / search  1-8 sections  j/k move  Enter open  Esc back  y copy  e export  t theme  space pause  ? help",
            Style::default().fg(palette.dim),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_help_popup(f: &mut Frame, size: Rect, palette: Palette) {
    let area = centered_rect(60, 70, size);
    f.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "Keys",
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  q          quit"),
        Line::from("  /          search (block number, hash, or address)"),
        Line::from("  1-8        jump to section"),
        Line::from("  [ / ]      previous / next section"),
        Line::from("  j/k        move selection"),
        Line::from("  g / G      top / bottom"),
        Line::from("  Enter      open selected item"),
        Line::from("  Esc        back"),
        Line::from("  y          copy hash/address to clipboard"),
        Line::from("  e          export current list"),
        Line::from("  r          refresh"),
        Line::from("  t          toggle light/dark theme"),
        Line::from("  { / }      previous / next RPC endpoint"),
        Line::from("  space      pause live updates"),
        Line::from("  ?          close this help"),
    ];

    let popup = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .wrap(Wrap { trim: false });
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, size: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(size);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
