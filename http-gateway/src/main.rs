use http_gateway::http::Server;
use http_gateway::{configure_observability, handlers, Config, Dispatcher, Gateway, Result};
use rest::RestClient;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_envvar()?;
    let _guard = configure_observability(&config)?;

    let rest = RestClient::new(&config.api_base, &config.bot_token, config.application_id)?;
    let dispatcher = handlers::register(Dispatcher::new(config.owners.clone()));
    let gateway = Arc::new(Gateway::new(Arc::new(rest), dispatcher));

    let definitions = gateway.dispatcher.command_definitions();
    match gateway.rest.register_commands(&definitions).await {
        Some(commands) => info!(count = commands.len(), "Registered commands"),
        None => error!("Failed to register commands"),
    }

    Server::new(config, gateway).start().await
}
