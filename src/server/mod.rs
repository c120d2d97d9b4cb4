//! Listening socket, per-connection dispatch and file resolution.

pub mod files;
pub mod listener;

use std::path::PathBuf;

use anyhow::Context;

use crate::config::Config;
use crate::http::mime::MimeIndex;

/// Read-only state shared by every connection worker.
///
/// Built once before the first `accept` and never mutated afterwards.
#[derive(Debug)]
pub struct ServerContext {
    pub mime: MimeIndex,
    pub root: PathBuf,
}

impl ServerContext {
    pub fn new(mime: MimeIndex, root: impl Into<PathBuf>) -> Self {
        Self {
            mime,
            root: root.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mime = MimeIndex::from_file(&cfg.mime_types)
            .context("failed to build MIME index")?;
        Ok(Self::new(mime, cfg.root.clone()))
    }
}
