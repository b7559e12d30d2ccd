use tracing::{error, info};

use nexodrive::{Config, FileStore, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = nexodrive::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        nexodrive::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("NexoDrive starting");
    info!(
        ssid = %config.network.ssid,
        open = config.network.passphrase.is_empty(),
        "Access point configured"
    );

    let store = match FileStore::open(
        &config.files.storage_path,
        config.files.max_upload_size_bytes(),
    )
    .await
    {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open file store: {}", e);
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, store) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create web server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {}", e);
        std::process::exit(1);
    }
}
