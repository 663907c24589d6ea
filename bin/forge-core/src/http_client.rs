use std::{sync::OnceLock, time::Duration};

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Shared client for every outbound call that doesn't need a bespoke
/// timeout (registry checks, host API, store API). LLM calls build
/// their own client with a longer timeout instead of reusing this one.
pub fn client() -> &'static reqwest::Client {
  CLIENT.get_or_init(|| {
    reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .expect("failed to build http client")
  })
}

pub fn client_with_timeout(timeout: Duration) -> reqwest::Client {
  reqwest::Client::builder()
    .timeout(timeout)
    .build()
    .expect("failed to build http client")
}
