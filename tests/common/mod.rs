#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use gamedata_api::config::{AppConfig, StoreBackend};
use gamedata_api::database::{DataStore, MemoryStore, Row};
use gamedata_api::{app, AppState};

pub const PROFESSIONS: [&str; 3] = ["Herrero", "Alquimista", "Minero"];

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        read(res).await
    }

    pub async fn send_json(&self, method: reqwest::Method, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.request(method, self.url(path)).json(body).send().await?;
        read(res).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<(StatusCode, Value)> {
        self.send_json(reqwest::Method::POST, path, body).await
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

async fn read(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let body = res.json::<Value>().await.context("response body is not JSON")?;
    Ok((status, body))
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.store.backend = StoreBackend::Memory;
    config.security.jwt_secret = "integration-test-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

/// Seed the lookup tables a fresh deployment would already have.
pub async fn seed(store: &MemoryStore) -> Result<()> {
    let professions = PROFESSIONS.iter().map(|name| row(json!({ "nombre": name }))).collect();
    store.insert("oficios", professions).await?;

    store
        .insert(
            "clases",
            vec![
                row(json!({"nombre": "Guerrero", "descripcion": "Combate cuerpo a cuerpo"})),
                row(json!({"nombre": "Mago", "descripcion": "Magia arcana"})),
            ],
        )
        .await?;
    store
        .insert("mazmorras", vec![row(json!({"nombre": "Cripta olvidada", "nivel_minimo": 5}))])
        .await?;
    store
        .insert("equipamiento", vec![row(json!({"nombre": "Espada larga", "tipo": "arma"}))])
        .await?;
    store
        .insert("recursos", vec![row(json!({"nombre": "Mineral de hierro"}))])
        .await?;
    store
        .insert("bestiario", vec![row(json!({"nombre": "Lobo gris", "peligro": 2}))])
        .await?;
    Ok(())
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

/// Start the router in-process on a free port over a seeded memory store.
pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(test_config()).await
}

pub async fn spawn_server_with(config: AppConfig) -> Result<TestServer> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let store = Arc::new(MemoryStore::with_default_constraints());
    seed(&store).await?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;

    let router = app(AppState::new(config, store.clone()));
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let server = TestServer {
        port,
        base_url,
        client: reqwest::Client::new(),
        store,
    };
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}
