//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use address_gateway::config::GatewayConfig;
use address_gateway::gateway::ValidationGateway;
use address_gateway::http::HttpServer;
use address_gateway::lifecycle::Shutdown;
use address_gateway::upstream::provider::{self, ProviderState};
use address_gateway::upstream::HttpValidator;
use axum::{http::StatusCode, response::IntoResponse, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// A running gateway bound to an ephemeral port.
#[allow(dead_code)]
pub struct TestGateway {
    pub url: String,
    pub gateway: Arc<ValidationGateway>,
    pub config_updates: mpsc::UnboundedSender<GatewayConfig>,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestGateway {
    pub async fn set_flag(&self, feature: &str, enabled: bool) -> reqwest::Response {
        client()
            .post(format!("{}/toggle-feature", self.url))
            .json(&serde_json::json!({ "feature": feature, "enabled": enabled }))
            .send()
            .await
            .expect("gateway unreachable")
    }

    pub async fn validate(&self, address: &str) -> reqwest::Response {
        client()
            .post(format!("{}/validate", self.url))
            .json(&serde_json::json!({ "address": address }))
            .send()
            .await
            .expect("gateway unreachable")
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start the stand-in address provider.
#[allow(dead_code)]
pub async fn start_provider() -> (SocketAddr, Arc<ProviderState>) {
    let state = Arc::new(ProviderState::new());
    let addr = serve(provider::router(state.clone())).await;
    (addr, state)
}

/// Start a validator whose answer comes from `f` for every request.
#[allow(dead_code)]
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let app = Router::new().fallback(move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            let status = StatusCode::from_u16(status).unwrap();
            (status, [("content-type", "application/json")], body).into_response()
        }
    });
    serve(app).await
}

/// Start a gateway in front of `upstream`.
pub async fn start_gateway(mut config: GatewayConfig, upstream: SocketAddr) -> TestGateway {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = format!("http://{}", upstream);

    let validator = Arc::new(HttpValidator::new(&config.upstream).unwrap());
    let gateway = Arc::new(ValidationGateway::new(&config, validator).unwrap());

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config, gateway.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    TestGateway {
        url,
        gateway,
        config_updates,
        shutdown,
    }
}
