use crate::config::Config;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Used when neither `RUST_LOG` nor `VERIFIER_LOG_LEVEL` yields a usable filter.
const DEFAULT_DIRECTIVES: &str = "info";

/// `RUST_LOG` wins over `VERIFIER_LOG_LEVEL`; blank values count as unset.
fn directives(rust_log: Option<String>, cfg: &Config) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or_else(|| cfg.log_level.clone().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVES.to_string())
}

/// Installs the service's tracing subscriber: compact lines, no targets.
///
/// A malformed filter falls back to `info` and is reported once the
/// subscriber is up.
pub fn init_tracing(cfg: &Config) {
    let wanted = directives(std::env::var("RUST_LOG").ok(), cfg);
    let (filter, rejected) = match EnvFilter::try_new(&wanted) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_DIRECTIVES), Some(e)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    match rejected {
        Some(e) => warn!(directives = %wanted, error = %e, "bad log filter, using info"),
        None => debug!(directives = %wanted, "tracing initialized"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: Option<&str>) -> Config {
        Config {
            log_level: log_level.map(str::to_string),
            public_addr: "127.0.0.1:0".parse().unwrap(),
            public_key_path: None,
            public_key_url: None,
            strict: false,
            request_timeout_secs: 15,
            max_body_bytes: 1024,
        }
    }

    #[test]
    fn rust_log_takes_precedence() {
        let cfg = config(Some("warn"));
        assert_eq!(directives(Some("debug".into()), &cfg), "debug");
    }

    #[test]
    fn configured_level_used_without_rust_log() {
        let cfg = config(Some("verify_service=trace"));
        assert_eq!(directives(None, &cfg), "verify_service=trace");
        assert_eq!(directives(Some("  ".into()), &cfg), "verify_service=trace");
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(directives(None, &config(None)), "info");
        assert_eq!(directives(None, &config(Some(""))), "info");
    }
}
