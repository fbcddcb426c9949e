//! trackdeck server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use trackdeck_core::tracing::{TracingConfig, init_tracing};
use trackdeck_providers::spotify::{ClientCredentials, SpotifyConfig};
use trackdeck_server::{ServerConfig, ServerError, ServerResult, serve};

/// trackdeck - delegated music-catalog search and playlists
#[derive(Debug, Parser)]
#[command(name = "trackdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8888", env = "TRACKDECK_BIND")]
    bind: SocketAddr,

    /// Path to a credentials JSON file; falls back to
    /// SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET
    #[arg(long, env = "TRACKDECK_CREDENTIALS")]
    credentials_file: Option<PathBuf>,

    /// Redirect URI registered with the provider
    #[arg(long, env = "TRACKDECK_REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// Mark session cookies Secure (requires serving behind HTTPS)
    #[arg(long, env = "TRACKDECK_SECURE_COOKIES")]
    secure_cookies: bool,

    /// Log as JSON
    #[arg(long)]
    log_json: bool,

    /// Enable debug output
    #[arg(long, short = 'v')]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.debug {
        TracingConfig::debug()
    } else if cli.log_json {
        TracingConfig::server()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServerResult<()> {
    let credentials = match cli.credentials_file {
        Some(ref path) => ClientCredentials::from_file(path),
        None => ClientCredentials::from_env(),
    }
    .map_err(ServerError::config)?;

    let mut provider = SpotifyConfig::new(credentials);
    if let Some(uri) = cli.redirect_uri {
        provider = provider.with_redirect_uri(uri);
    }
    provider.validate().map_err(ServerError::config)?;

    info!("redirect uri: {}", provider.redirect_uri);

    let server = ServerConfig::new(cli.bind).with_secure_cookies(cli.secure_cookies);
    serve(server, &provider).await
}
