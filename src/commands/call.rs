use std::sync::Arc;

use anyhow::{Context, Result};
use lbryweb::{
    config::Config,
    gateway::{Gateway, GatewayCore, HttpTransport},
    timing::TimingRecorder,
};
use serde_json::{Map, Value};
use tracing::info;

/// Send one internal call to the daemon and print its result
pub async fn call_method(config: Config, method: String, params: Option<String>) -> Result<()> {
    let params: Map<String, Value> = match params {
        Some(raw) => serde_json::from_str(&raw).context("--params must be a JSON object")?,
        None => Map::new(),
    };

    let transport = HttpTransport::new(&config.daemon)?;
    let recorder = Arc::new(TimingRecorder::new(
        config.timing.keying,
        config.timing.history_capacity,
    ));
    let core = GatewayCore::new(Arc::new(transport), recorder.clone(), config.content.base_url);
    let gateway = Gateway::new(Arc::new(core), None);

    let result = gateway.call(&method, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    for operation in recorder.recent() {
        info!("{}", operation);
    }
    Ok(())
}
