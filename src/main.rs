use axum::Router;
use replicated_directory::config::{NodeConfig, Role, USAGE};
use replicated_directory::directory::{self, store::UserDirectory};
use replicated_directory::replica::{
    self, store::MirrorStore, sync::SyncAgent, transport::HttpSnapshotSource,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        // .with_max_level(tracing::Level::DEBUG)
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", USAGE);
            eprintln!("Example: directory-node --role primary");
            eprintln!("Example: directory-node --role replica --primary http://localhost:8080");
            std::process::exit(1);
        }
    };

    let app: Router = match config.role {
        Role::Primary => {
            tracing::info!("Starting primary node (id policy: {:?})", config.id_policy);
            let users = Arc::new(UserDirectory::new(config.id_policy));
            directory::router(users)
        }
        Role::Replica => {
            tracing::info!("Starting replica node, pulling from {}", config.primary_url);
            let mirror = Arc::new(MirrorStore::new());
            let source = Arc::new(HttpSnapshotSource::new(
                &config.primary_url,
                config.fetch_timeout,
            ));
            let agent = SyncAgent::new(
                mirror.clone(),
                source,
                config.sync_interval,
                config.retry_delay,
            );

            agent.clone().start();

            replica::router(mirror, agent)
        }
    };

    tracing::info!("HTTP server listening on {}", config.bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
