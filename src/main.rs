use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use ecotrack::clients::{LogDispatcher, WebhookDispatcher};
use ecotrack::config::database::DatabaseConfig;
use ecotrack::config::EnvironmentConfig;
use ecotrack::database::DatabaseConnection;
use ecotrack::middleware::cors_layer;
use ecotrack::repositories::{MemoryStore, PgStore, Store};
use ecotrack::services::{GeoDistance, MapboxGeoClient, NotificationDispatcher, UnconfiguredGeo};
use ecotrack::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env().context("configuración inválida")?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("♻️ EcoTrack - Recycling logistics API");
    info!("======================================");

    // Inicializar persistencia
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let connection = DatabaseConnection::connect(&DatabaseConfig::new(url.clone()))
                .await
                .map_err(|e| {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    e
                })?;
            Arc::new(PgStore::new(connection.pool().clone()))
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando store en memoria");
            Arc::new(MemoryStore::new())
        }
    };

    // Geocoding
    let geo: Arc<dyn GeoDistance> = match &config.mapbox_token {
        Some(token) => Arc::new(MapboxGeoClient::new(
            token.clone(),
            config.routing.road_factor,
            config.routing.geo_timeout,
        )?),
        None => {
            warn!("⚠️ MAPBOX_TOKEN no definido, las rutas usarán la distancia de respaldo");
            Arc::new(UnconfiguredGeo)
        }
    };

    // Notificaciones
    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.notification_webhook_url {
        Some(url) => Arc::new(WebhookDispatcher::new(url.clone(), config.notification_timeout)?),
        None => {
            info!("📭 NOTIFICATION_WEBHOOK_URL no definida, notificaciones solo en logs");
            Arc::new(LogDispatcher)
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let cors = cors_layer(&config.cors_origins);
    let app = create_router(AppState::new(config, store, geo, dispatcher))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("👤 Usuarios:");
    info!("   POST /api/users - Registrar usuario");
    info!("   GET  /api/users/:id - Obtener usuario");
    info!("   PUT  /api/users/:id/role - Cambiar rol (admin)");
    info!("📦 Pedidos:");
    info!("   POST /api/orders - Crear pedido");
    info!("   GET  /api/orders - Listar pedidos");
    info!("   GET  /api/orders/:id - Obtener pedido");
    info!("   GET  /api/orders/:id/route - Ruta del pedido");
    info!("   POST /api/orders/:id/route/retry - Reintentar ruteo");
    info!("   POST /api/orders/:id/advance - Avanzar estado");
    info!("   POST /api/orders/:id/cancel - Cancelar pedido");
    info!("🗺️ Rutas:");
    info!("   POST /api/routes/:id/select - Elegir opción");
    info!("💰 Precios:");
    info!("   GET  /api/pricing/quote - Presupuesto");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
