//! Async HTTP client for the session service and the voice service.

use anyhow::{Context, Result};

use crate::model::EngineConfig;

mod http_client;
pub use self::http_client::RemoteError;

mod types;
pub use self::types::*;

mod session_ops;
pub use self::session_ops::Download;
mod voice_ops;

#[derive(Clone, Debug)]
pub struct RemoteClient {
    session_base: String,
    voice_base: String,
    client: reqwest::Client,
}

impl RemoteClient {
    pub fn new(cfg: &EngineConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent("voicesheet");
        if let Some(timeout) = cfg.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build reqwest client")?;
        Ok(Self {
            session_base: cfg.session_url().to_string(),
            voice_base: cfg.voice_url().to_string(),
            client,
        })
    }

    pub fn session_base(&self) -> &str {
        &self.session_base
    }

    pub fn voice_base(&self) -> &str {
        &self.voice_base
    }
}
