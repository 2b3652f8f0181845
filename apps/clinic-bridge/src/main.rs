//! Clinic Bridge - Micro-serviço de análise de agenda e testes A/B
//!
//! Expõe as análises da biblioteca clinic-analytics via HTTP para o CRM da
//! clínica. O serviço não acessa banco de dados: recebe os registros no corpo
//! da requisição e devolve o relatório calculado.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use config::{BridgeConfig, LogFormat};

/// Metadados gerados em tempo de compilação pelo build.rs
#[allow(dead_code)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const DEFAULT_LOG_FILTER: &str = "clinic_bridge=info,clinic_analytics=info,tower_http=info";

/// Inicializa o subscriber de logs conforme o formato configurado
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Falha ao aguardar sinal de encerramento: {}", e);
    }
    info!("Encerrando clinic-bridge");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = BridgeConfig::from_env().context("Falha ao carregar configuração")?;
    init_tracing(config.log_format);

    let bind_addr = config.bind_addr;
    info!(
        "{} {} ouvindo em {} (capacidade diária padrão {}, confiança {})",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        bind_addr,
        config.analytics.day_capacity,
        config.analytics.confidence_level
    );

    let app = routes::router(Arc::new(config));

    axum::Server::try_bind(&bind_addr)
        .with_context(|| format!("Falha ao abrir {}", bind_addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Falha no servidor HTTP")?;

    Ok(())
}
