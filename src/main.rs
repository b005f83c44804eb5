use ticket_validator::{
    api::Server,
    config::Config,
    contract::RpcLockReader,
    validation::TicketValidator,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the ticket validator service.
///
/// This function initializes logging, loads the configuration (path from the
/// first argument, falling back to `config/default.toml`), binds the lock
/// contract and starts the API server.
#[tokio::main] // Marks the async main function to be run by the Tokio runtime.
async fn main() -> anyhow::Result<()> {
    // Initialize logging using tracing_subscriber.
    // RUST_LOG wins when set; otherwise log at info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load the configuration from the TOML file given on the command line.
    // Environment overrides are applied inside `Config::load`.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path)?;
    // Log the loaded configuration for debugging and informational purposes.
    info!("Ticket validator starting with config: {:?}", config);

    // Bind the lock contract once; every validation shares the same provider.
    // Fails fast on a malformed RPC url or contract address.
    let reader = RpcLockReader::connect(&config.rpc, &config.contract)?;

    // Create the validator that runs the key, balance and expiration checks
    let validator = Arc::new(TicketValidator::new(Arc::new(reader), &config.ticket));

    // Create the API server. It owns the session registry, sized from [api].
    let server = Server::new(config, validator);
    // Start the API server. This binds to the configured port and serves
    // requests until the process stops. The `?` operator propagates any
    // errors that occur during server startup.
    server.start().await?;

    // Return `Ok(())` to indicate successful execution of the main function.
    Ok(())
}
