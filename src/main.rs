// --- Sistema de Gestión de Horarios - Archivo principal ---

use aulagrid::run_server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind = std::env::var("AULAGRID_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    tracing::info!("Iniciando servidor en http://{}", bind);
    run_server(&bind).await
}
