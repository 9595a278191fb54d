use clap::Parser;
use mimic_server::config::Config;
use mimic_server::dispatch::Dispatcher;
use mimic_server::handlers::default_chain;
use mimic_server::server::MockServer;
use mimic_server::state::StateStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mimic-server")]
#[command(author, version, about = "HTTP mock/record server", long_about = None)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short, long, env = "MIMIC_CONFIG")]
    config: Option<String>,

    /// Listen port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Listen host, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Admin base path, overrides the config file
    #[arg(short, long)]
    base_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.listen.port = port;
    }
    if let Some(host) = args.host {
        config.listen.host = host;
    }
    if let Some(base_path) = args.base_path {
        config.base_path = base_path;
    }
    config.validate()?;

    let store = Arc::new(StateStore::new());
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&store),
        default_chain(&config.base_path, &store),
    ));

    let server = MockServer::bind(config.listen_addr()?, dispatcher).await?;
    info!(base_path = %config.base_path, "admin chain mounted");

    tokio::select! {
        result = server.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
