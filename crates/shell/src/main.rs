//! trust-gateway - evaluate the shell's trust decisions headlessly.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use common::SurfaceKind;
use networking::HttpClient;
use shell::{Environment, Gateway, GatewayConfig, LoggingHost};
use shell_security::{NavigationAttempt, PeerCertificate, PlatformVerification, VerificationRequest};

/// Evaluate the trust gateway's decisions against a configuration
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment to point at (overrides the configuration file)
    #[arg(long)]
    env: Option<Environment>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a URL belongs to the trusted origin
    CheckOrigin {
        url: String,
    },
    /// Decide a navigation
    Navigate {
        url: String,

        /// Surface the navigation happens in
        #[arg(long, value_enum, default_value = "embedded")]
        from: SurfaceArg,

        /// Treat as a new-window request triggered by an embedded surface
        #[arg(long)]
        new_window: bool,
    },
    /// Decide a TLS handshake
    VerifyCert {
        #[arg(long)]
        host: String,

        /// Platform verification status
        #[arg(long, default_value = "net::OK")]
        status: String,

        /// Base64 DER SubjectPublicKeyInfo, leaf first
        #[arg(long = "spki", required = true)]
        chain: Vec<String>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SurfaceArg {
    Primary,
    Embedded,
}

impl From<SurfaceArg> for SurfaceKind {
    fn from(arg: SurfaceArg) -> Self {
        match arg {
            SurfaceArg::Primary => SurfaceKind::Primary,
            SurfaceArg::Embedded => SurfaceKind::Embedded,
        }
    }
}

fn load_config(args: &Args) -> Result<GatewayConfig> {
    let mut config = match &args.config {
        Some(path) => GatewayConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => GatewayConfig::default(),
    };

    if let Some(env) = args.env {
        config = config.with_environment(env);
    }

    Ok(config)
}

fn certificate_chain(encoded: &[String]) -> Result<PeerCertificate> {
    let mut keys = encoded
        .iter()
        .map(|key| BASE64.decode(key).context("invalid base64 public key"))
        .collect::<Result<Vec<_>>>()?;

    let mut certificate = PeerCertificate::new(keys.pop().context("empty certificate chain")?);
    while let Some(key) = keys.pop() {
        certificate = PeerCertificate::new(key).with_issuer(certificate);
    }
    Ok(certificate)
}

/// Directives from `RUST_LOG` replace the command-line level.
fn log_filter(default_level: Level, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(log_level, std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("trust-gateway v{}", shell::VERSION);

    let config = load_config(&args)?;
    let transport = Arc::new(HttpClient::new()?);
    let gateway = Gateway::new(&config, Arc::new(LoggingHost), transport)?;

    match args.command {
        Command::CheckOrigin { url } => {
            let trusted = gateway.trusted_origin().matches(&url);
            info!(origin = %gateway.trusted_origin(), url = %url, trusted, "Origin check");
            println!("{}", if trusted { "trusted" } else { "untrusted" });
        }
        Command::Navigate { url, from, new_window } => {
            let surface = SurfaceKind::from(from);
            let attempt = if new_window {
                NavigationAttempt::new_window(surface, SurfaceKind::Embedded, url)
            } else {
                NavigationAttempt::in_place(surface, url)
            };
            let verdict = gateway.navigation_attempted(&attempt);
            println!("{:?}", verdict);
        }
        Command::VerifyCert { host, status, chain } => {
            let request = VerificationRequest::new(
                host,
                certificate_chain(&chain)?,
                PlatformVerification::from_net_status(&status),
            );
            gateway.tls_verification(&request, |code| {
                println!("{:?} ({})", code, code.as_i32());
            });
        }
    }

    Ok(())
}
