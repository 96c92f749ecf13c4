//! Client configuration, read from the environment.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::DEFAULT_BASE_URL;
use crate::session::SESSION_KEY;

pub const API_URL_VAR: &str = "CARPOOL_API_URL";
pub const SESSION_FILE_VAR: &str = "CARPOOL_SESSION_FILE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address every endpoint path is appended to.
    pub api_url: String,
    /// File holding the persisted session identity.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// `CARPOOL_API_URL` (default `http://127.0.0.1:8000/api`) and
    /// `CARPOOL_SESSION_FILE` (default `{data_dir}/carpool/currentUser.json`).
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = std::env::var(API_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let session_file = match std::env::var_os(SESSION_FILE_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_session_file()?,
        };

        Ok(Self {
            api_url,
            session_file,
        })
    }
}

/// `{app_data_dir}/carpool/currentUser.json`
fn default_session_file() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    dir.push("carpool");
    dir.push(format!("{SESSION_KEY}.json"));
    Ok(dir)
}
