use crate::constants::{
    DEFAULT_DOWNLOAD_BUFFER_SIZE, DEFAULT_SERVER_PORT, DEFAULT_USERNAME, MAX_UPLOAD_CHUNK_SIZE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_addr: String,
    pub server_port: u16,
    pub username: String,
    pub password: String,
    pub local_dir: PathBuf,
    pub upload_chunk_size: Option<usize>, // Capped at 1 MiB
    pub download_buffer_size: Option<usize>,
    pub reply_timeout_secs: Option<u64>, // None waits forever
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: String::from("127.0.0.1"),
            server_port: DEFAULT_SERVER_PORT,
            username: String::from(DEFAULT_USERNAME),
            password: String::new(),
            local_dir: PathBuf::from("."),
            upload_chunk_size: Some(MAX_UPLOAD_CHUNK_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
            reply_timeout_secs: None,
            connect_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn upload_chunk_size(&self) -> usize {
        self.upload_chunk_size
            .unwrap_or(MAX_UPLOAD_CHUNK_SIZE)
            .clamp(1, MAX_UPLOAD_CHUNK_SIZE)
    }

    pub fn download_buffer_size(&self) -> usize {
        self.download_buffer_size
            .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE)
            .max(1)
    }

    pub fn reply_timeout(&self) -> Option<Duration> {
        self.reply_timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn from_toml(config_str: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(config_str).context("Failed to parse configuration")?;
        Ok(config)
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    Config::from_toml(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))
}
