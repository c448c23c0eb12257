use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use tutorlink_core::gateways::HttpGateways;
use tutorlink_core::TutorlinkConfig;
use tutorlink_dispatch::{DispatchService, SessionStore};

use tutorlink_server::http::{start_http_server, HttpState};
use tutorlink_server::server;
use tutorlink_server::subsystems::sweeper;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "tutorlink.toml")]
    config: String,

    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience — production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Init logging
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    // Load config
    let config = match TutorlinkConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // Connect to DB
    let pool = match tutorlink_core::db::create_pool(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if args.health {
        match tutorlink_core::db::health_check(&pool).await {
            Ok(v) => println!("✅ PostgreSQL connected: {}", v),
            Err(e) => {
                println!("❌ PostgreSQL connection failed: {}", e);
                std::process::exit(1);
            }
        }

        println!("✅ Tutorlink DB health check passed");
        return Ok(());
    }

    // Collaborator gateways
    let gateways = match HttpGateways::new(&config.gateways) {
        Ok(g) => Arc::new(g),
        Err(e) => {
            eprintln!("Failed to build gateway clients: {}", e);
            std::process::exit(1);
        }
    };

    let store = SessionStore::new(pool);
    let service = DispatchService::new(store.clone(), gateways.clone(), gateways.clone());

    // Shutdown plumbing
    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    // Spawn expiry sweeper background loop
    let sweeper_store = store.clone();
    let sweeper_config = config.sweeper.clone();
    let sweeper_shutdown = tx.subscribe();

    tokio::spawn(async move {
        sweeper::run_sweeper_loop(sweeper_store, sweeper_config, sweeper_shutdown).await;
    });

    // Spawn HTTP REST API server if enabled
    if config.http.enabled {
        let http_state = Arc::new(HttpState {
            service: service.clone(),
            profiles: gateways.clone(),
            subjects: gateways.clone(),
            socket_path: config.service.socket_path.clone(),
        });
        let http_config = config.clone();
        let http_shutdown = tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = start_http_server(http_state, http_config, http_shutdown).await {
                tracing::error!("HTTP server error: {}", e);
            }
        });
    }

    let socket_path = config.service.socket_path.clone();
    server::run_unix_server(&socket_path, service, tx.subscribe()).await?;

    Ok(())
}
