//! Process configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults, an
//! optional YAML file (`--config`), then command-line flags or their
//! `CHTTPD_*` environment variables.
//!
//! ```yaml
//! server:
//!   address: all
//!   port: 3000
//!   mime_types: /etc/chttpd/mime.types
//!   root: /srv/www
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde::Deserialize;

/// Address value meaning "listen on every interface".
pub const ALL_ADDRESSES: &str = "all";

#[derive(Debug, Clone, Parser)]
#[command(name = "chttpd", version, about = "Minimal static file HTTP daemon")]
pub struct Cli {
    /// IP address to listen on ("all" = every interface)
    #[arg(short, long, env = "CHTTPD_ADDRESS")]
    pub address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CHTTPD_PORT")]
    pub port: Option<u16>,

    /// MIME definitions file, one "<suffix> <type>" per line
    #[arg(short = 'm', long = "mime-types", env = "CHTTPD_MIME_TYPES")]
    pub mime_types: Option<PathBuf>,

    /// Directory that request URIs are resolved against
    #[arg(short, long, env = "CHTTPD_ROOT")]
    pub root: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "CHTTPD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub address: String,
    pub port: u16,
    pub mime_types: PathBuf,
    pub root: PathBuf,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: Config,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: ALL_ADDRESSES.to_string(),
            port: 3000,
            mime_types: PathBuf::from("mime.types"),
            root: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Parses the `server:` section of a YAML document. Missing keys keep
    /// their defaults.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml).context("invalid config YAML")?;
        Ok(file.server)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Resolves the final configuration from parsed command-line arguments.
    pub fn load(cli: Cli) -> anyhow::Result<Self> {
        let mut cfg = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(address) = cli.address {
            cfg.address = address;
        }
        if let Some(port) = cli.port {
            cfg.port = port;
        }
        if let Some(mime_types) = cli.mime_types {
            cfg.mime_types = mime_types;
        }
        if let Some(root) = cli.root {
            cfg.root = root;
        }

        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.address.trim().is_empty() {
            bail!("listen address must not be empty");
        }
        if self.port == 0 {
            bail!("port must be between 1 and 65535");
        }
        if !self.root.is_dir() {
            bail!("root {} is not a directory", self.root.display());
        }
        Ok(())
    }

    /// The host part to bind, with "all" mapped to `0.0.0.0`.
    pub fn host(&self) -> &str {
        if self.address == ALL_ADDRESSES {
            "0.0.0.0"
        } else {
            &self.address
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host(), self.port)
    }
}
