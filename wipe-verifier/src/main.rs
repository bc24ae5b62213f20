use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use std::{io::Read, path::PathBuf, process::ExitCode};
use wipe_verifier::certificate::{
    Artifact, KeySource, Verdict, VerdictPolicy, VerdictStatus, Verifier, VerifierConfig,
};

type CliResult<T> = Result<T, anyhow::Error>;

#[derive(Debug, Parser)]
#[command(version, about = "Verify a secure-wipe certificate")]
struct Args {
    /// Certificate JSON file, or `-` for stdin.
    certificate: String,

    /// Wiped-device report (e.g. the PDF) to compare against `sha256Pdf`.
    #[arg(long, value_name = "FILE", conflicts_with = "artifact_sha256")]
    artifact: Option<PathBuf>,

    /// Precomputed SHA-256 (hex) of the report, instead of --artifact.
    #[arg(long, value_name = "HEX")]
    artifact_sha256: Option<String>,

    /// PEM public key (SPKI) or certificate used for signature checks.
    #[arg(long, value_name = "FILE", env = "WIPE_VERIFIER_PUBLIC_KEY", conflicts_with = "key_url")]
    key: Option<PathBuf>,

    /// URL to fetch the PEM public key from.
    #[arg(long, value_name = "URL", env = "WIPE_VERIFIER_PUBLIC_KEY_URL")]
    key_url: Option<String>,

    /// Fail the verdict when a hash mismatches or a signature does not verify.
    #[arg(long, env = "WIPE_VERIFIER_STRICT")]
    strict: bool,

    /// Print the full verdict as JSON.
    #[arg(long)]
    json: bool,
}

/// CLI entrypoint: reads the certificate, verifies it, and prints the verdict.
#[tokio::main]
async fn main() -> CliResult<ExitCode> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init()
        .ok();

    let args = Args::parse();

    let mut cfg = VerifierConfig::default();
    if args.strict {
        cfg.policy = VerdictPolicy::Strict;
    }
    cfg.key_source = key_source(&args);

    let verifier = Verifier::new(cfg).await;
    let text = read_certificate(&args.certificate)?;
    let artifact = load_artifact(&args).await?;

    let verdict = verifier.verify_text(&text, artifact).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }
    Ok(exit_code(verdict.status))
}

/// Picks the key source: file path takes precedence over URL.
fn key_source(args: &Args) -> Option<KeySource> {
    match (&args.key, &args.key_url) {
        (Some(path), _) => Some(KeySource::Path(path.clone())),
        (None, Some(url)) => Some(KeySource::Url(url.clone())),
        (None, None) => None,
    }
}

/// Read certificate text from a file or stdin.
fn read_certificate(source: &str) -> CliResult<String> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read certificate from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(source).with_context(|| format!("read {source:?}"))
}

async fn load_artifact(args: &Args) -> CliResult<Option<Artifact>> {
    if let Some(path) = &args.artifact {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read {:?}", path))?;
        return Ok(Some(Artifact::Bytes(bytes)));
    }
    Ok(args.artifact_sha256.clone().map(Artifact::Sha256))
}

/// Human-friendly rendering of a verdict for terminal output.
fn print_verdict(verdict: &Verdict) {
    let marker = match verdict.status {
        VerdictStatus::Ok => "✅",
        VerdictStatus::Fail => "❌",
        VerdictStatus::Error => "⚠️",
        VerdictStatus::Idle => "…",
    };
    println!("{marker} {}", verdict.message);
    let Some(checks) = &verdict.checks else {
        return;
    };
    if let Some(check) = &checks.signature.method {
        println!("  signature method : {check}");
    }
    if let Some(encoding) = checks.signature.encoding {
        println!("  signature format : {}", encoding.as_str());
    }
    if !checks.signature.attempts.is_empty() {
        println!("  strategies tried : {}", checks.signature.attempts.len());
    }
}

fn exit_code(status: VerdictStatus) -> ExitCode {
    match status {
        VerdictStatus::Ok => ExitCode::SUCCESS,
        VerdictStatus::Fail => ExitCode::from(1),
        VerdictStatus::Error | VerdictStatus::Idle => ExitCode::from(2),
    }
}
