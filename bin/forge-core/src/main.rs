#[macro_use]
extern crate tracing;

use std::{net::SocketAddr, sync::Arc};

use crate::config::core_config;

mod api;
mod committer;
mod config;
mod fixer;
mod generator;
mod host_client;
mod http_client;
mod image_seeder;
mod infra_executor;
mod llm;
mod monitor;
mod progress;
mod registry_gateway;
mod repo_analyzer;
mod templates;
mod validator;
mod workspace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  let config = core_config();
  logger::init(&config.log_config())?;

  info!("forge-core version: v{}", env!("CARGO_PKG_VERSION"));

  llm::registry::init(config.clone());
  workspace::spawn_sweeper();

  let state = api::AppState {
    store: Arc::new(templates::TemplateStore::new(
      config.store_base_url.clone(),
      config.store_tenant.clone(),
      config.store_database.clone(),
    )),
    progress: Arc::new(progress::ProgressStore::new()),
  };

  let app = api::router(state);
  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  info!("listening on {addr}");

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
