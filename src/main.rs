use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{error, info};

use chatbot_gateway::config::Config;
use chatbot_gateway::web::{cors, routes};
use chatbot_gateway::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chatbot gateway");

    let config = Config::from_env().context("invalid configuration")?;
    let client = config
        .http_client()
        .context("failed to build outbound HTTP client")?;

    // Shared by every worker; dropped with the server.
    let app_state = Data::new(AppState::new(&config, client));
    if !app_state.completions.is_configured() {
        error!("OPENROUTER_API_KEY is not set; chat requests will be refused");
    }
    let origins = config.allowed_origins.clone();

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    info!("Chatbot gateway stopped");
    Ok(())
}
