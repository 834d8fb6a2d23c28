// Serveur de flotte de drones
// Détient l'état des drones et répond aux requêtes JSON reçues par TCP

use drone_fleet::config::{ServerConfig, init_tracing};
use drone_fleet::history::JsonFileHistory;
use drone_fleet::network::serve;
use drone_fleet::registry::Registry;
use drone_fleet::service::DroneService;

use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let config = ServerConfig::parse();

    // === PHASE 1: INITIALISATION DES COMPOSANTS ===

    let history = match JsonFileHistory::open(&config.history_dir) {
        Ok(history) => history,
        Err(e) => {
            error!(dir = %config.history_dir.display(), error = %e, "cannot open history directory");
            return Err(e.into());
        }
    };
    info!(dir = %history.dir().display(), "history store ready");

    let service = Arc::new(DroneService::new(Registry::new(), history));

    // === PHASE 2: CONFIGURATION DU SERVEUR RÉSEAU ===

    let addr = config.bind_addr()?;
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!(%addr, error = %e, "cannot bind, is another program using this port?");
            return Err(e.into());
        }
    };
    info!(addr = %listener.local_addr()?, "fleet server listening");

    // === PHASE 3: BOUCLE D'ACCEPTATION DES CONNEXIONS ===

    tokio::select! {
        result = serve(listener, service) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
