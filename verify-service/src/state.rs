use std::sync::Arc;
use std::time::Instant;
use wipe_verifier::certificate::Verifier;

/// Shared, read-only state handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Verifier,
    /// PEM text the verifier's key was imported from, served at `/public-key.pem`.
    pub public_key_pem: Option<Arc<str>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(verifier: Verifier, public_key_pem: Option<String>) -> Self {
        Self {
            verifier,
            public_key_pem: public_key_pem.map(Arc::from),
            started_at: Instant::now(),
        }
    }
}
