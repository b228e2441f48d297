use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use token_proxy::cache::token_manager::TokenManager;
use token_proxy::server;
use token_proxy::sources::credentials::CredentialsSource;
use token_proxy::sources::oauth2::ClientCredentialsSource;
use token_proxy::utils::config_loader;
use token_proxy::utils::logging;
use token_proxy::utils::logging::LogLevel;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG")]
    config: Option<String>,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load config, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(args.config.as_deref()).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Build upstream source and token manager
    //
    // credentials are read from the environment on every fetch
    // -------------------------------

    let source = ClientCredentialsSource::new(&service_config.token, CredentialsSource::Env)?;
    let token_manager = TokenManager::new(Arc::new(source), &service_config.token);

    // -------------------------------
    // 3. Start http server
    // -------------------------------

    info!("Service starting...");
    server::server::start(&service_config, token_manager).await
}
