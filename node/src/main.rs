mod control;
mod dispatcher;
mod sensors;
mod state;

use std::io::ErrorKind;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use smarthome_common::RuntimeConfig;

use crate::sensors::SimSensors;
use crate::state::NodeState;

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

    let state = Arc::new(NodeState::new(runtime.node));
    let sensors: Arc<dyn sensors::AnalogSensor> = Arc::new(SimSensors::new());

    control::spawn(state.clone(), sensors.clone());

    let addr = std::env::var("NODE_ADDR").unwrap_or_else(|_| "127.0.0.1:7878".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind node listener at {addr}"))?;
    info!("node listening on {addr}");

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("panel connected from {peer}");

        let state = state.clone();
        let sensors = sensors.clone();
        tokio::spawn(async move {
            match dispatcher::serve(stream, &state, sensors.as_ref()).await {
                Ok(()) => info!("panel at {peer} disconnected"),
                Err(err) => warn!("link with {peer} failed: {err:#}"),
            }
        });
    }
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
