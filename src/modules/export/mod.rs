//! Export Module
//!
//! Provides CSV and JSON export functionality for explorer lists.
//!
//! - 'e' key triggers export based on current view/section
//! - Lists (Blocks, Transactions, Accounts, activity scans) -> CSV
//! - Transaction detail -> JSON
//! - Files saved to the data directory under exports/

mod csv_export;
mod json_export;

use std::fs;
use std::path::PathBuf;

use chrono::Local;

use crate::app::{App, Section, StatusLevel, View};
use crate::config;

/// Get the export directory path, creating it if needed
fn get_export_dir() -> std::io::Result<PathBuf> {
    let export_dir = config::data_dir()
        .map(|dir| dir.join("exports"))
        .unwrap_or_else(|| PathBuf::from(".verox").join("exports"));
    fs::create_dir_all(&export_dir)?;
    Ok(export_dir)
}

/// Generate a timestamped filename
fn generate_filename(prefix: &str, extension: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
    format!("{}-{}.{}", prefix, timestamp, extension)
}

/// Export current view data based on context. Returns the status line to
/// show for the outcome.
pub fn export_current_view(app: &App) -> (String, StatusLevel) {
    if app.current_view() == View::TxDetail {
        return export_transaction_detail(app);
    }

    match app.active_section {
        Section::Blocks => write_csv("blocks", app.blocks.len(), |path| {
            csv_export::write_blocks(path, &app.blocks)
        }),
        Section::Transactions => write_csv("transactions", app.txs.len(), |path| {
            csv_export::write_transactions(path, &app.txs)
        }),
        Section::Pending => write_csv("pending", app.pending.len(), |path| {
            csv_export::write_transactions(path, &app.pending)
        }),
        Section::Accounts => write_csv("accounts", app.accounts.len(), |path| {
            csv_export::write_accounts(path, &app.accounts)
        }),
        Section::TokenTransfers => {
            write_csv("token-transfers", app.token_transfers.len(), |path| {
                csv_export::write_token_transfers(path, &app.token_transfers)
            })
        }
        Section::NftMints => write_csv("nft-mints", app.nft_mints.len(), |path| {
            csv_export::write_nft_mints(path, &app.nft_mints)
        }),
        Section::NftTransfers => {
            write_csv("nft-transfers", app.nft_transfers.len(), |path| {
                csv_export::write_nft_transfers(path, &app.nft_transfers)
            })
        }
        Section::Overview => (
            "Nothing to export in this view".to_string(),
            StatusLevel::Warn,
        ),
    }
}

fn write_csv<F>(prefix: &str, len: usize, writer: F) -> (String, StatusLevel)
where
    F: FnOnce(&std::path::Path) -> Result<usize, Box<dyn std::error::Error>>,
{
    if len == 0 {
        return (format!("No {prefix} to export"), StatusLevel::Warn);
    }

    let export_dir = match get_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return (
                format!("Failed to create export directory: {}", e),
                StatusLevel::Error,
            )
        }
    };

    let filename = generate_filename(prefix, "csv");
    let path = export_dir.join(&filename);

    match writer(&path) {
        Ok(count) => (
            format!("Exported {} rows to exports/{}", count, filename),
            StatusLevel::Info,
        ),
        Err(e) => (format!("Export failed: {}", e), StatusLevel::Error),
    }
}

fn export_transaction_detail(app: &App) -> (String, StatusLevel) {
    let Some(detail) = &app.tx_detail else {
        return ("No transaction to export".to_string(), StatusLevel::Warn);
    };

    let export_dir = match get_export_dir() {
        Ok(dir) => dir,
        Err(e) => {
            return (
                format!("Failed to create export directory: {}", e),
                StatusLevel::Error,
            )
        }
    };

    let filename = generate_filename("transaction", "json");
    let path = export_dir.join(&filename);

    match json_export::write_transaction_detail(&path, detail) {
        Ok(()) => (
            format!("Exported transaction to exports/{}", filename),
            StatusLevel::Info,
        ),
        Err(e) => (format!("Export failed: {}", e), StatusLevel::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainConfig;
    use crate::store::Theme;

    fn test_app() -> App {
        App::new(ChainConfig::default(), Theme::Dark, None)
    }

    #[test]
    fn overview_has_nothing_to_export() {
        let app = test_app();
        let (message, level) = export_current_view(&app);
        assert_eq!(level, StatusLevel::Warn);
        assert!(message.contains("Nothing to export"));
    }

    #[test]
    fn empty_list_warns_without_touching_disk() {
        let mut app = test_app();
        app.set_section(Section::Blocks);
        let (message, level) = export_current_view(&app);
        assert_eq!(level, StatusLevel::Warn);
        assert!(message.contains("No blocks"));
    }
}
