use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::{Parser, ValueEnum};
use futures::{stream::FuturesUnordered, StreamExt};
use rustls::crypto::{ring, CryptoProvider};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nanokvm_redfish::atx::{detect, AtxController};
use nanokvm_redfish::config::{self, AppConfig};
use nanokvm_redfish::redfish::BootStore;
use nanokvm_redfish::state::AppState;
use nanokvm_redfish::utils::bind_listeners;
use nanokvm_redfish::web;

/// How long in-flight requests get to finish once shutdown starts
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Verbose,
    Debug,
    Trace,
}

/// NanoKVM Redfish command line arguments
#[derive(Parser, Debug)]
#[command(name = "nanokvm-redfish")]
#[command(version, about = "Redfish power control for GPIO-wired IP-KVM boards", long_about = None)]
struct CliArgs {
    /// Configuration file (default: <data-dir>/redfish.toml)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address (overrides config file)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    address: Option<String>,

    /// HTTP port (overrides config file)
    #[arg(short = 'p', long, value_name = "PORT")]
    http_port: Option<u16>,

    /// HTTPS port (overrides config file)
    #[arg(long, value_name = "PORT")]
    https_port: Option<u16>,

    /// Enable HTTPS (overrides config file)
    #[arg(long)]
    enable_https: bool,

    /// Path to SSL certificate file (generates self-signed if not provided)
    #[arg(long, value_name = "FILE", requires = "ssl_key")]
    ssl_cert: Option<PathBuf>,

    /// Path to SSL private key file
    #[arg(long, value_name = "FILE", requires = "ssl_cert")]
    ssl_key: Option<PathBuf>,

    /// File holding the hardware version tag (default: /etc/kvm/hw)
    #[arg(long, value_name = "FILE")]
    hw_file: Option<PathBuf>,

    /// Data directory path (default: /etc/kvm)
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, verbose, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for verbose, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(args.log_level, args.verbose);

    tracing::info!(
        "Starting NanoKVM Redfish v{} (built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE")
    );

    let data_dir = args.data_dir.clone().unwrap_or_else(get_data_dir);
    tracing::info!("Data directory: {}", data_dir.display());

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("redfish.toml"));
    let mut config = config::load_config(Some(&config_path)).await?;
    apply_cli_overrides(&mut config, &args);
    config.validate()?;

    let bind_ips = config.web.bind_ips()?;
    let bind_port = config.web.port();
    let scheme = if config.web.https_enabled {
        "https"
    } else {
        "http"
    };

    // Hardware detection
    let profile = detect(&config.hardware.version_file)
        .await
        .context("Hardware detection failed")?;
    tracing::info!("Detected hardware variant: {}", profile.variant);

    let atx = AtxController::new(config.atx.to_controller_config(profile));
    let boot = BootStore::new();

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let state = AppState::new(atx, boot, shutdown_tx.clone());

    let app = web::create_router(state.clone());

    let listeners = bind_listeners(&bind_ips, bind_port)
        .with_context(|| format!("Failed to bind any addresses on port {}", bind_port))?;
    for (addr, _) in &listeners {
        tracing::info!("Server will listen on: {}://{}", scheme, addr);
    }

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                let _ = shutdown_tx.send(());
            }
            Err(e) => tracing::error!("Failed to install CTRL+C handler: {}", e),
        }
    });

    if config.web.https_enabled {
        CryptoProvider::install_default(ring::default_provider())
            .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

        let tls_config = load_tls_config(&config, &data_dir).await?;

        let handle = axum_server::Handle::new();
        let mut shutdown_rx = state.shutdown_signal();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown_rx.recv().await;
            shutdown_handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });

        let mut servers = FuturesUnordered::new();
        for (addr, listener) in listeners {
            tracing::info!("Starting HTTPS server on {}", addr);
            let server = axum_server::from_tcp_rustls(listener, tls_config.clone())
                .handle(handle.clone())
                .serve(app.clone().into_make_service());
            servers.push(server);
        }

        while let Some(result) = servers.next().await {
            if let Err(e) = result {
                tracing::error!("HTTPS server error: {}", e);
            }
        }
    } else {
        let mut servers = FuturesUnordered::new();
        for (addr, listener) in listeners {
            tracing::info!("Starting HTTP server on {}", addr);

            let listener = tokio::net::TcpListener::from_std(listener)?;
            let mut shutdown_rx = state.shutdown_signal();
            let server = axum::serve(listener, app.clone()).with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            });
            servers.push(async move { server.await });
        }

        while let Some(result) = servers.next().await {
            if let Err(e) = result {
                tracing::error!("HTTP server error: {}", e);
            }
        }
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Verbose,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "nanokvm_redfish=error,tower_http=error",
        LogLevel::Warn => "nanokvm_redfish=warn,tower_http=warn",
        LogLevel::Info => "nanokvm_redfish=info,tower_http=info",
        LogLevel::Verbose => "nanokvm_redfish=debug,tower_http=info",
        LogLevel::Debug => "nanokvm_redfish=debug,tower_http=debug",
        LogLevel::Trace => "nanokvm_redfish=trace,tower_http=debug",
    };

    // RUST_LOG takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}

/// Get the application data directory
fn get_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("NANOKVM_REDFISH_DATA_DIR") {
        return PathBuf::from(path);
    }

    PathBuf::from("/etc/kvm")
}

/// Apply CLI argument overrides to config (only if explicitly specified)
fn apply_cli_overrides(config: &mut AppConfig, args: &CliArgs) {
    if let Some(addr) = &args.address {
        config.web.bind_address = addr.clone();
        config.web.bind_addresses = vec![addr.clone()];
    }
    if let Some(port) = args.http_port {
        config.web.http_port = port;
    }
    if let Some(port) = args.https_port {
        config.web.https_port = port;
    }
    if args.enable_https {
        config.web.https_enabled = true;
    }
    if let Some(cert_path) = &args.ssl_cert {
        config.web.ssl_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.ssl_key {
        config.web.ssl_key_path = Some(key_path.to_string_lossy().to_string());
    }
    if let Some(hw_file) = &args.hw_file {
        config.hardware.version_file = hw_file.clone();
    }
}

/// Load the configured certificate, or a self-signed one kept under the data directory
async fn load_tls_config(config: &AppConfig, data_dir: &Path) -> anyhow::Result<RustlsConfig> {
    if let (Some(cert_path), Some(key_path)) =
        (&config.web.ssl_cert_path, &config.web.ssl_key_path)
    {
        return Ok(RustlsConfig::from_pem_file(cert_path, key_path).await?);
    }

    let cert_dir = data_dir.join("certs");
    let cert_path = cert_dir.join("server.crt");
    let key_path = cert_dir.join("server.key");

    // Only generate if missing
    if !cert_path.exists() || !key_path.exists() {
        tracing::info!("Generating new self-signed TLS certificate");
        let cert = generate_self_signed_cert()?;
        tokio::fs::create_dir_all(&cert_dir).await?;
        tokio::fs::write(&cert_path, cert.cert.pem()).await?;
        tokio::fs::write(&key_path, cert.key_pair.serialize_pem()).await?;
    } else {
        tracing::info!("Using existing TLS certificate from {}", cert_dir.display());
    }

    Ok(RustlsConfig::from_pem_file(&cert_path, &key_path).await?)
}

/// Generate a self-signed TLS certificate
fn generate_self_signed_cert() -> anyhow::Result<rcgen::CertifiedKey> {
    use rcgen::generate_simple_self_signed;

    let subject_alt_names = vec![
        "localhost".to_string(),
        "127.0.0.1".to_string(),
        "::1".to_string(),
    ];

    let certified_key = generate_simple_self_signed(subject_alt_names)?;
    Ok(certified_key)
}
