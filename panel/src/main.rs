mod app;
mod hmi;
mod link;

use std::io::ErrorKind;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpStream;
use tracing::{info, warn};

use smarthome_common::RuntimeConfig;

use crate::app::App;
use crate::hmi::ConsoleHmi;
use crate::link::CommandLink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut runtime = load_runtime_config().await.unwrap_or_else(|err| {
        warn!("failed to load runtime config: {err:#}");
        RuntimeConfig::default()
    });
    runtime.sanitize();

    let addr = std::env::var("NODE_ADDR").unwrap_or_else(|_| "127.0.0.1:7878".to_string());
    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to reach the node at {addr}"))?;
    info!("connected to node at {addr}");

    let link = CommandLink::new(stream, Duration::from_millis(runtime.panel.link_timeout_ms));
    App::new(runtime.panel, link, ConsoleHmi::new()).run().await
}

/// Optional JSON config; `SMARTHOME_CONFIG` names the file. Absent file
/// means factory defaults, a malformed one is an error the caller logs.
async fn load_runtime_config() -> anyhow::Result<RuntimeConfig> {
    let Ok(path) = std::env::var("SMARTHOME_CONFIG") else {
        return Ok(RuntimeConfig::default());
    };
    match tokio::fs::read(&path).await {
        Ok(raw) => serde_json::from_slice(&raw)
            .with_context(|| format!("malformed runtime config at {path}")),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(RuntimeConfig::default()),
        Err(err) => Err(err).with_context(|| format!("failed to read runtime config at {path}")),
    }
}
