//! batch-relay - forwards batch API requests with per-client tokens
//!
//! Each route names a client identifier; the matching token is read from the
//! tokens directory and attached to a GET against the upstream API.

use clap::Parser;
use std::path::PathBuf;

use relay_core::{Settings, SettingsManager};
use relay_server::RelayServer;

/// batch-relay - token-attaching forwarder for the batch API
#[derive(Parser, Debug)]
#[command(name = "batch-relay")]
#[command(version)]
#[command(about = "Forward batch API requests with per-client tokens")]
struct Args {
    /// JSON settings file (missing file means defaults)
    #[arg(long, short = 'c', env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (default: 0.0.0.0)
    #[arg(long, env = "RELAY_HOST")]
    host: Option<String>,

    /// Port for HTTP server (default: 3000)
    #[arg(long, short = 'p', env = "PORT")]
    port: Option<u16>,

    /// Directory holding one token entry per identifier (default: ./tokens)
    #[arg(long, env = "RELAY_TOKENS_DIR")]
    tokens_dir: Option<PathBuf>,

    /// Upstream base URL, e.g. https://api.example.com
    #[arg(long, env = "RELAY_UPSTREAM_URL")]
    upstream: Option<String>,

    /// Take the upstream host from the request path (requires --allow-host)
    #[arg(long)]
    host_from_path: bool,

    /// Host reachable in host-from-path mode (repeatable)
    #[arg(long = "allow-host", value_name = "HOST")]
    allowed_hosts: Vec<String>,

    /// Upstream request timeout in seconds (default: 30)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Maximum requests in flight (default: 256)
    #[arg(long)]
    max_concurrent: Option<usize>,
}

impl Args {
    /// Layer command-line values over the settings file
    fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(tokens_dir) = self.tokens_dir {
            settings.tokens_dir = tokens_dir;
        }
        if let Some(upstream) = self.upstream {
            settings.upstream.base_url = Some(upstream);
        }
        if self.host_from_path {
            settings.upstream.host_from_path = true;
        }
        if !self.allowed_hosts.is_empty() {
            settings.upstream.allowed_hosts = self.allowed_hosts;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.http.timeout_secs = timeout_secs;
        }
        if let Some(max) = self.max_concurrent {
            settings.max_concurrent_requests = max;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut settings = SettingsManager::load(args.config.as_deref())
        .map_err(|e| format!("Failed to load settings: {}", e))?
        .into_settings();
    args.apply(&mut settings);

    let server = RelayServer::from_settings(&settings)?;

    server.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_override_settings() {
        let args = Args::try_parse_from([
            "batch-relay",
            "--port",
            "8080",
            "--tokens-dir",
            "/srv/tokens",
            "--host-from-path",
            "--allow-host",
            "api.example.com",
            "--allow-host",
            "cdn.example.com",
        ])
        .unwrap();

        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.port, 8080);
        assert_eq!(settings.tokens_dir, PathBuf::from("/srv/tokens"));
        assert!(settings.upstream.host_from_path);
        assert_eq!(
            settings.upstream.allowed_hosts,
            vec!["api.example.com", "cdn.example.com"]
        );
        assert!(settings.upstream_target().unwrap().host_from_path());
    }

    #[test]
    fn test_args_keep_file_values_when_absent() {
        let args = Args::try_parse_from(["batch-relay"]).unwrap();

        let mut settings = Settings::default();
        settings.port = 4000;
        settings.upstream.base_url = Some("https://api.example.com".to_string());
        args.apply(&mut settings);

        assert_eq!(settings.port, 4000);
        assert_eq!(
            settings.upstream.base_url.as_deref(),
            Some("https://api.example.com")
        );
    }
}
