use anyhow::{Context, Result};
use api::{build_router, AppState};
use common::settings::Settings;
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Test environment configuration
pub struct TestEnv {
    pub api_url: String,
    pub client: Client,
    server: Option<JoinHandle<()>>,
}

impl TestEnv {
    /// Targets `API_URL` when set, otherwise boots the api in-process on an
    /// ephemeral port with the built-in catalog.
    pub async fn start() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        if let Ok(api_url) = std::env::var("API_URL") {
            return Ok(Self {
                api_url: api_url.trim_end_matches('/').to_string(),
                client,
                server: None,
            });
        }

        let mut settings = Settings::default();
        settings.static_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../static").to_string();
        let services = common::build_all(&settings)?;
        let app = build_router(Arc::new(AppState { settings, services }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {}", err);
            }
        });

        Ok(Self {
            api_url: format!("http://{}", addr),
            client,
            server: Some(server),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Wait for the API to answer its health check
    pub async fn wait_for_services(&self) -> Result<()> {
        let max_attempts = 30;
        let mut attempt = 0;
        let health = self.url("/health");

        while attempt < max_attempts {
            attempt += 1;
            match self.client.get(&health).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => {
                    if attempt < max_attempts {
                        sleep(Duration::from_millis(200)).await;
                    }
                }
            }
        }

        anyhow::bail!("API failed to start after {} attempts", max_attempts)
    }

    pub async fn activities(&self) -> Result<HashMap<String, Value>> {
        let resp = self
            .client
            .get(self.url("/activities"))
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    pub async fn participants(&self, activity: &str) -> Result<Vec<String>> {
        let activities = self.activities().await?;
        let entry = activities
            .get(activity)
            .with_context(|| format!("activity {} missing from listing", activity))?;
        Ok(serde_json::from_value(entry["participants"].clone())?)
    }

    /// POSTs a signup/unregister and returns status plus JSON body.
    pub async fn membership(
        &self,
        activity: &str,
        action: &str,
        email: &str,
    ) -> Result<(u16, Value)> {
        let url = self.membership_url(activity, action, email)?;
        let resp = self.client.post(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.json().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    /// `/activities/<activity>/<action>?email=<email>` with every part
    /// percent-encoded.
    pub fn membership_url(&self, activity: &str, action: &str, email: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("api url {} cannot be a base", self.api_url))?
            .pop_if_empty()
            .extend(["activities", activity, action]);
        url.query_pairs_mut().append_pair("email", email);
        Ok(url)
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.abort();
        }
    }
}
