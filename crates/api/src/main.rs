use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use crudline_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crudline_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let services = crudline_api::app::services::build_services(&config)
        .await
        .context("failed to build services")?;
    let app = crudline_api::app::build_app(Arc::new(services), config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("starting server on port: {}", config.http_port);

    crudline_api::server::serve(listener, app)
        .await
        .context("server error")
}
