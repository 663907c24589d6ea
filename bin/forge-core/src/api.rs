//! Thin HTTP surface over the generator/monitor/registry core. Full
//! request routing is out of scope for this pipeline (see Non-goals),
//! but the core still runs inside a request-response server per the
//! concurrency model, so a minimal handler set is wired up here rather
//! than left as a bare library with no entry point.

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::{Path as AxumPath, State},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use forge_client::{CoreError, HostKind, TargetPlatform};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serror::Serror;
use tracing::instrument;

use crate::config::core_config;
use crate::generator::{self, GenerateOptionsRequest};
use crate::host_client::HostClient;
use crate::llm;
use crate::progress::ProgressStore;
use crate::repo_analyzer;
use crate::templates::TemplateStore;
use crate::{committer, monitor};

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<TemplateStore>,
  pub progress: Arc<ProgressStore>,
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/generate", post(generate_handler))
    .route("/progress/{project_id}", get(progress_handler))
    .route("/providers", get(providers_handler))
    .route("/providers/active", post(set_active_provider_handler))
    .with_state(state)
}

struct AppError(CoreError);

impl From<CoreError> for AppError {
  fn from(err: CoreError) -> Self {
    AppError(err)
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError(CoreError::UpstreamUnavailable { system: "core", source: err })
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      CoreError::InputInvalid(_) => StatusCode::BAD_REQUEST,
      CoreError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
      CoreError::ValidationFatal(_) => StatusCode::UNPROCESSABLE_ENTITY,
      CoreError::PolicyViolation(_) => StatusCode::FORBIDDEN,
      CoreError::CommitPartial { .. } => StatusCode::CONFLICT,
      CoreError::SupervisorExhausted { .. } => StatusCode::GATEWAY_TIMEOUT,
    };
    let body = Serror { error: self.0.to_string(), trace: Vec::new() };
    (status, Json(body)).into_response()
  }
}

#[derive(Deserialize)]
struct GenerateBody {
  owner: String,
  repo: String,
  platform: TargetPlatform,
  #[serde(default)]
  template_only: bool,
  #[serde(default)]
  commit: bool,
}

#[derive(Serialize)]
struct GenerateResponseBody {
  provenance: String,
  files: Vec<String>,
  errors: usize,
  warnings: usize,
  committed_branch: Option<String>,
}

#[instrument(level = "info", skip(state, body), fields(owner = %body.owner, repo = %body.repo))]
async fn generate_handler(
  State(state): State<AppState>,
  Json(body): Json<GenerateBody>,
) -> Result<Json<GenerateResponseBody>, AppError> {
  let cfg = core_config();
  let host_kind = match cfg.host_kind.as_str() {
    "github" => HostKind::GithubStyle,
    _ => HostKind::GiteaStyle,
  };
  let host = HostClient::new(host_kind, cfg.host_base_url.clone(), cfg.host_token.clone());

  let analysis = repo_analyzer::analyze(&host, &body.owner, &body.repo)
    .await
    .map_err(|err| CoreError::UpstreamUnavailable { system: "host", source: err })?;

  let result = generator::generate(
    &state.store,
    body.platform,
    analysis,
    GenerateOptionsRequest { template_only: body.template_only },
  )
  .await?;

  if result.validation.has_errors() {
    return Err(
      CoreError::ValidationFatal(format!(
        "{} validation error(s) remain after generation",
        result.validation.errors().count()
      ))
      .into(),
    );
  }

  let mut committed_branch = None;
  if body.commit {
    let default_branch = host
      .default_branch(&body.owner, &body.repo)
      .await
      .map_err(|err| CoreError::UpstreamUnavailable { system: "host", source: err })?;
    let commit_result = committer::commit(&host, &body.owner, &body.repo, &default_branch, None, &result.artifacts)
      .await
      .map_err(|err| match err.downcast::<CoreError>() {
        Ok(core_err) => core_err,
        Err(err) => CoreError::UpstreamUnavailable { system: "host", source: err },
      })?;
    committed_branch = Some(commit_result.branch.clone());

    monitor::spawn(
      host,
      body.owner,
      body.repo,
      commit_result.branch,
      body.platform,
      result.artifacts.clone(),
      state.progress.clone(),
      state.store.clone(),
    );
  }

  Ok(Json(GenerateResponseBody {
    provenance: result.provenance.to_string(),
    files: result.artifacts.files.keys().cloned().collect(),
    errors: result.validation.errors().count(),
    warnings: result.validation.warnings().count(),
    committed_branch,
  }))
}

async fn progress_handler(
  State(state): State<AppState>,
  AxumPath(project_id): AxumPath<String>,
) -> Result<Json<forge_client::PipelineProgress>, AppError> {
  state
    .progress
    .get(&project_id)
    .map(Json)
    .ok_or_else(|| AppError(CoreError::InputInvalid(format!("no progress tracked for {project_id}"))))
}

async fn providers_handler() -> Json<Vec<forge_client::LLMProviderInfo>> {
  Json(llm::registry::registry().list().to_vec())
}

#[derive(Deserialize)]
struct SetActiveProviderBody {
  provider_id: String,
}

async fn set_active_provider_handler(
  Json(body): Json<SetActiveProviderBody>,
) -> Result<StatusCode, AppError> {
  llm::registry::registry().set_active(&body.provider_id)?;
  Ok(StatusCode::NO_CONTENT)
}
