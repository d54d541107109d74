use std::sync::Arc;

use hoja_api::{Config, JsonFileStore, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let store = JsonFileStore::new(&config.data_file);
    store.init()?;
    log::info!("hojas en {}", config.data_file.display());

    app::run(config, Arc::new(store)).await
}
