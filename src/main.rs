use std::sync::Arc;

use anyhow::Result;

use crate::{
    config::SETTINGS,
    server::{
        gateway::{self as gateway_server, GatewayState},
        resolver::{self as resolver_server, ResolverState},
    },
    util::http::{Fetch, UpstreamClient},
};

pub mod config;
pub mod crawler;
pub mod declare;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod server;
pub mod util;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    util::ensure_rustls_crypto_provider();

    let role = SETTINGS.system.role;
    logging::info_file_async(format!("quote_relay 啟動，角色: {:?}", role));

    let fetcher: Arc<dyn Fetch> =
        Arc::new(UpstreamClient::new(SETTINGS.upstream.connect_timeout())?);

    tokio::try_join!(run_resolver(fetcher.clone()), run_gateway(fetcher))?;

    logging::info_file_async("quote_relay 已停止".to_string());

    Ok(())
}

async fn run_resolver(fetcher: Arc<dyn Fetch>) -> Result<()> {
    if !SETTINGS.system.role.runs_resolver() {
        return Ok(());
    }

    let state = ResolverState::from_settings(fetcher, &SETTINGS.upstream)?;
    server::serve(
        resolver_server::router(Arc::new(state)),
        SETTINGS.system.resolver_port,
        "resolver",
    )
    .await
}

async fn run_gateway(fetcher: Arc<dyn Fetch>) -> Result<()> {
    if !SETTINGS.system.role.runs_gateway() {
        return Ok(());
    }

    let state = GatewayState::from_settings(fetcher, &SETTINGS.gateway);
    server::serve(
        gateway_server::router(Arc::new(state)),
        SETTINGS.system.gateway_port,
        "gateway",
    )
    .await
}
