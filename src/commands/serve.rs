use anyhow::Result;
use lbryweb::{config::Config, Service};

pub async fn serve(config: Config) -> Result<()> {
    let service = Service::start(config)?;
    service.run().await
}
