//! Private container registry gateway: existence checks against the
//! registry's search API, and best-effort image copy via an external
//! `skopeo`-style subprocess. Grounded on the Nexus/skopeo integration
//! in the image seeder this pipeline was distilled from — there is no
//! registry-gateway precedent in the teacher, whose own "registry"
//! concept is just docker-account credentials for direct pushes.

mod translation;

pub use translation::{is_skip_pattern, public_ref_for};

use std::time::Duration;

use command::run_forge_command;
use forge_client::ImageRef;
use tracing::{instrument, warn};

use crate::config::core_config;
use crate::http_client;

#[derive(Debug, Default, serde::Serialize)]
pub struct SeedSummary {
  pub seeded: Vec<String>,
  pub already_exists: Vec<String>,
  pub failed: Vec<String>,
  pub skipped: Vec<String>,
}

/// Best-effort: queries the registry's search API by bare name. A
/// network failure is treated as "unknown" (the caller downgrades this
/// to a non-blocking warning), never as a hard error.
#[instrument(level = "debug", skip_all, fields(image = %image.nexus_bare()))]
pub async fn exists(image: &ImageRef) -> Option<bool> {
  let cfg = core_config();
  let url = format!(
    "{}/service/rest/v1/search",
    cfg.registry_base_url.trim_end_matches('/')
  );
  let res = http_client::client()
    .get(&url)
    .query(&[("name", image.nexus_name().as_str()), ("version", image.tag.as_str())])
    .basic_auth(&cfg.registry_user, Some(&cfg.registry_pass))
    .send()
    .await;

  match res {
    Ok(res) if res.status().is_success() => {
      match res.json::<serde_json::Value>().await {
        Ok(body) => Some(
          body
            .get("items")
            .and_then(|v| v.as_array())
            .is_some_and(|items| !items.is_empty()),
        ),
        Err(err) => {
          warn!("registry search response unparseable: {err:#}");
          None
        }
      }
    }
    Ok(res) => {
      warn!("registry search returned {}", res.status());
      None
    }
    Err(err) => {
      warn!("registry search request failed: {err:#}");
      None
    }
  }
}

/// Copies `image` from its public origin into the private registry
/// using an external copy tool. Failure is never fatal to the caller;
/// it is reported in the returned bool and logged.
#[instrument(level = "debug", skip_all, fields(image = %image.nexus_bare()))]
pub async fn seed(image: &ImageRef) -> bool {
  let cfg = core_config();
  let src = public_ref_for(image);
  let dst = format!(
    "docker://{}/{}",
    cfg.registry_host.trim_end_matches('/'),
    image.nexus_bare()
  );

  let command = format!(
    "skopeo copy --src-tls-verify=true --dest-tls-verify=false \
     --dest-creds {}:{} docker://{src} {dst}",
    cfg.registry_user, cfg.registry_pass,
  );

  let log = tokio::time::timeout(
    Duration::from_secs(120),
    run_forge_command("seed-image", None, command),
  )
  .await;

  match log {
    Ok(log) if log.success => true,
    Ok(log) => {
      warn!("image seed failed for {}: {}", image.nexus_bare(), log.stderr);
      false
    }
    Err(_) => {
      warn!("image seed timed out for {}", image.nexus_bare());
      false
    }
  }
}

/// Ensures every distinct image reference among `images` exists in the
/// private registry, seeding any that are missing. Runs after
/// validation passes and before commit, per the generator pipeline.
pub async fn ensure_images(images: &[ImageRef]) -> SeedSummary {
  let mut summary = SeedSummary::default();
  let mut seen = std::collections::HashSet::new();

  for image in images {
    let bare = image.nexus_bare();
    if !seen.insert(bare.clone()) {
      continue;
    }
    if is_skip_pattern(&image.nexus_name()) {
      summary.skipped.push(bare);
      continue;
    }
    match exists(image).await {
      Some(true) => summary.already_exists.push(bare),
      Some(false) | None => {
        if seed(image).await {
          summary.seeded.push(bare);
        } else {
          summary.failed.push(bare);
        }
      }
    }
  }

  summary
}

/// Lists repositories currently in the private registry via the
/// registry v2 `_catalog` endpoint. Used to prime the fixer's repair
/// prompt with "already available" images; an unreachable registry
/// just yields an empty hint, not a failure.
#[instrument(level = "debug", skip_all)]
pub async fn catalog() -> anyhow::Result<Vec<String>> {
  let cfg = core_config();
  let url = format!("{}/v2/_catalog", cfg.registry_base_url.trim_end_matches('/'));
  let res = http_client::client()
    .get(&url)
    .basic_auth(&cfg.registry_user, Some(&cfg.registry_pass))
    .send()
    .await?
    .error_for_status()?
    .json::<serde_json::Value>()
    .await?;

  Ok(
    res
      .get("repositories")
      .and_then(|v| v.as_array())
      .map(|repos| {
        repos
          .iter()
          .filter_map(|r| r.as_str().map(String::from))
          .collect()
      })
      .unwrap_or_default(),
  )
}
