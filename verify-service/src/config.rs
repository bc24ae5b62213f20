use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use wipe_verifier::certificate::{KeySource, VerdictPolicy, VerifierConfig};

#[derive(Clone, Debug, Deserialize)]
/// Runtime configuration loaded from `VERIFIER_*` environment variables.
pub struct Config {
    pub log_level: Option<String>,

    #[serde(default = "def_public_addr")]
    pub public_addr: SocketAddr,

    /// PEM public key (or certificate) on disk.
    pub public_key_path: Option<PathBuf>,

    /// URL to fetch the PEM public key from when no path is set.
    pub public_key_url: Option<String>,

    /// Fail verdicts on hash mismatches and unverified signatures.
    #[serde(default)]
    pub strict: bool,

    #[serde(default = "def_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "def_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Config {
    /// Populates the configuration from environment variables, honoring `.env`.
    pub fn from_env() -> anyhow::Result<Self> {
        tracing::debug!("fetching config");
        let _ = dotenvy::dotenv();
        let cfg: Self = envy::prefixed("VERIFIER_").from_env()?;
        Ok(cfg)
    }

    /// Emit the effective configuration via tracing.
    pub fn info(&self) {
        tracing::info!(
            public_addr = %self.public_addr,
            strict = self.strict,
            key_path = ?self.public_key_path,
            key_url = ?self.public_key_url,
            "effective config"
        );
        if self.public_addr.ip().is_unspecified() {
            tracing::warn!("binding to 0.0.0.0, make sure this is intentional");
        }
        if self.key_source().is_none() {
            tracing::warn!("no public key configured; signatures will not be checked");
        }
    }

    /// Key path wins over URL.
    pub fn key_source(&self) -> Option<KeySource> {
        match (&self.public_key_path, &self.public_key_url) {
            (Some(path), _) => Some(KeySource::Path(path.clone())),
            (None, Some(url)) => Some(KeySource::Url(url.clone())),
            (None, None) => None,
        }
    }

    /// Verifier settings; the key itself is loaded by the runner.
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            policy: if self.strict {
                VerdictPolicy::Strict
            } else {
                VerdictPolicy::Lenient
            },
            ..VerifierConfig::default()
        }
    }
}

fn def_public_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn def_request_timeout_secs() -> u64 {
    15
}

fn def_max_body_bytes() -> usize {
    10 * 1024 * 1024
}
