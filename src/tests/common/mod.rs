// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::collections::HashMap;
use std::net::SocketAddr;
use reqwest::Client;

use crate::sources::credentials::CredentialsSource;
use crate::utils::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_INSTANCE_URL};

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Credentials pointing at a local upstream, without touching the process env.
pub fn static_credentials(instance_url: &str) -> CredentialsSource {
    let mut values = HashMap::new();
    values.insert(ENV_INSTANCE_URL.to_owned(), instance_url.to_owned());
    values.insert(ENV_CLIENT_ID.to_owned(), "proxy-client".to_owned());
    values.insert(ENV_CLIENT_SECRET.to_owned(), "proxy-secret".to_owned());
    CredentialsSource::Static(values)
}
