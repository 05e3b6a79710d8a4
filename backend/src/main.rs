//! Admin gateway entry-point: loads configuration, wires collaborators and
//! serves the admin REST surface.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use admin_gateway::inbound::http::health::HealthState;
#[cfg(feature = "metrics")]
use server::build_prometheus;
use server::{AdminGatewaySettings, ServerConfig, create_server};

#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AdminGatewaySettings::load_from_iter(std::env::args_os())?;
    let config = ServerConfig::from_settings(&settings)?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(build_prometheus()?));

    let bind_addr = config.bind_addr();
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "admin gateway listening");

    server.await?;
    Ok(())
}
