use kcschema::client::tui::SchemaBrowserUI;
use kcschema::db::load_from_config;
use kcschema::models::config::SourceConfig;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SourceConfig::from_env()?;
    info!("loading schema from {:?} source", config.source_type);
    let registry = Arc::new(load_from_config(&config).await?);

    let mut tui = SchemaBrowserUI::new(registry);
    tui.run().await?;

    Ok(())
}
