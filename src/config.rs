use crate::error::StashError;
use clap::Parser;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
pub struct StartArgs {
    #[arg(short, long, default_value = "config.json")]
    pub config_path: String,

    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    #[arg(short, long, default_value = "3030")]
    pub port: u16,

    #[arg(short, long, default_value = "INFO")]
    pub log_level: tracing::Level,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,

    pub admin: Option<AdminConfig>,
}

impl Config {
    pub fn read(path: impl AsRef<Path>) -> Result<Self, StashError> {
        let config = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&config)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory the object store writes uploaded files to.
    pub root: PathBuf,

    /// Externally visible base URL under which stored objects are served,
    /// e.g. `http://localhost:3030/files`. Stored document URLs are derived
    /// from it, and delete recognises its own objects by this prefix.
    pub public_url: String,

    /// Upload size cap in bytes. The original enforced 50MB client-side
    /// only; here the cap is authoritative.
    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: usize,
}

fn default_max_upload() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub cookie_domain: String,
    #[serde(alias = "password_hash")]
    pub pw_hash: String,
}
