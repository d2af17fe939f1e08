use std::env;
use std::error::Error;

use solwatch::stream::client::StreamClient;
use solwatch::stream::session::StreamSession;
use tracing_subscriber::EnvFilter;

/// Optional websocket endpoint override.
const ENDPOINT_ENV: &str = "SOLWATCH_ENDPOINT";

fn main() -> Result<(), Box<dyn Error>> {
    // Diagnostics go to stderr; stdout carries the log line stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut client = StreamClient::new();
    if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
        client = client.with_endpoint(endpoint);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        StreamSession::new(client).run().await;
    });

    Ok(())
}
