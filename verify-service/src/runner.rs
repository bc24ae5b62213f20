use anyhow::{anyhow, Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use wipe_verifier::certificate::{KeyState, Verifier};

use crate::config::Config;
use crate::handlers::shutdown_signal;
use crate::router::build_public_router;
use crate::state::AppState;

/// Top-level orchestrator for the verification HTTP server.
pub struct Runner {
    cfg: Config,
    public_listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
}

impl Runner {
    /// Bind a TCP listener on the provided address, annotating errors with context.
    async fn bind(addr: SocketAddr, description: &str) -> Result<TcpListener> {
        info!(%addr, "binding {} listener", description);
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {} addr {}", description, addr))
    }

    /// Runs the server until a shutdown signal is received.
    pub async fn run(self) -> Result<()> {
        tracing::debug!("starting runner");

        let Runner {
            cfg,
            public_listener,
            state,
            shutdown,
        } = self;

        let app = build_public_router(state, &cfg);
        let cancel = shutdown.clone();
        let server_handle = tokio::spawn(async move {
            axum::serve(public_listener, app)
                .with_graceful_shutdown(async move { cancel.cancelled().await })
                .await
        });

        shutdown_signal().await;
        info!("shutdown signal received, exiting");
        shutdown.cancel();

        match server_handle.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow!(e).context("public server")),
            Err(e) => {
                error!(error = ?e, "public server task panicked");
                Err(anyhow!(e))
            }
        }
    }

    pub fn builder(cfg: Config) -> RunnerBuilder {
        RunnerBuilder::from(cfg)
    }
}

pub struct RunnerBuilder {
    cfg: Config,
    public_listener: Option<TcpListener>,
    key: KeyState,
    public_key_pem: Option<String>,
    shutdown: CancellationToken,
}

impl RunnerBuilder {
    pub fn from(cfg: Config) -> Self {
        Self {
            cfg,
            public_listener: None,
            key: KeyState::Absent,
            public_key_pem: None,
            shutdown: CancellationToken::new(),
        }
    }

    /// Fetches and imports the verification key. An unreachable key leaves the
    /// service running with signature checks skipped.
    pub async fn load_key(mut self) -> Self {
        let Some(source) = self.cfg.key_source() else {
            return self;
        };
        match source.fetch().await {
            Ok(pem) => {
                self.key = KeyState::import(&pem);
                if self.key.is_ready() {
                    self.public_key_pem = Some(pem);
                }
            }
            Err(e) => warn!(error = ?e, "public key unavailable"),
        }
        self
    }

    pub async fn bind_public(mut self) -> Result<Self> {
        let listener = Runner::bind(self.cfg.public_addr, "public").await?;
        self.public_listener = Some(listener);
        Ok(self)
    }

    pub fn build(self) -> Result<Runner> {
        let public_listener = self
            .public_listener
            .ok_or_else(|| anyhow!("public listener not bound"))?;

        let verifier = Verifier::with_key(self.cfg.verifier_config(), self.key);
        let state = AppState::new(verifier, self.public_key_pem);

        Ok(Runner {
            cfg: self.cfg,
            public_listener,
            state,
            shutdown: self.shutdown,
        })
    }
}
