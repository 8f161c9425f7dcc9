use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Public Vero endpoints used when neither the CLI nor the config file
/// names any.
pub const DEFAULT_RPC_URL: &str = "https://vero-rpc.publicnode.online";
pub const DEFAULT_INDEXER_URL: &str = "http://75.119.156.249:3000/api";

/// The chain profile shown in the header and used for unit labels.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain_name")]
    pub name: String,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_coin_symbol")]
    pub coin_symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
    /// Target block interval in seconds, display only.
    #[serde(default = "default_block_time")]
    pub block_time_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: default_chain_name(),
            chain_id: default_chain_id(),
            coin_symbol: default_coin_symbol(),
            decimals: default_decimals(),
            block_time_secs: default_block_time(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: Option<String>,
    pub rpc: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    /// Base URL of the companion indexer API, if one is running.
    pub indexer: Option<String>,
}

impl Config {
    pub fn rpc_urls(&self) -> Vec<String> {
        self.endpoints.iter().map(|e| e.rpc.clone()).collect()
    }
}

fn default_chain_name() -> String {
    "Vero Chain".to_string()
}

fn default_chain_id() -> u64 {
    808
}

fn default_coin_symbol() -> String {
    "VERO".to_string()
}

fn default_decimals() -> u8 {
    18
}

fn default_block_time() -> u64 {
    2
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    toml::from_str::<Config>(&content).unwrap_or_default()
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("VEROX_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("verox").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("verox").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "verox", "verox")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("verox"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("verox"));
    }
    directories::ProjectDirs::from("io", "verox", "verox").map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn theme_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("theme"))
}
