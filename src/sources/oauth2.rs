use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use tracing::{debug, info};

use crate::cache::token::TokenRecord;
use crate::config::settings::TokenSettings;
use crate::helpers::time::now_millis;
use crate::parser::token_response::parse_token_response;
use crate::sources::credentials::CredentialsSource;
use crate::sources::error::FetchError;
use crate::sources::FetchToken;
use crate::utils::constants::GRANT_TYPE_CLIENT_CREDENTIALS;

/// OAuth2 client-credentials grant against `{INSTANCE_URL}/services/oauth2/token`.
#[derive(Debug, Clone)]
pub struct ClientCredentialsSource {
    client: Client,
    credentials: CredentialsSource,
    default_expires_in_seconds: u64,
}

impl ClientCredentialsSource {
    pub fn new(settings: &TokenSettings, credentials: CredentialsSource) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            credentials,
            default_expires_in_seconds: settings.default_expires_in_seconds,
        })
    }

    async fn exchange(&self) -> Result<TokenRecord, FetchError> {
        // resolved per attempt so rotated credentials are picked up
        let credentials = self.credentials.resolve()?;
        let url = credentials.token_url();
        let form = [
            ("grant_type", GRANT_TYPE_CLIENT_CREDENTIALS),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];

        info!("requesting token from {}", url);
        let fetched_at = now_millis();
        // .form() sets Content-Type: application/x-www-form-urlencoded
        let response = self.client.post(&url).form(&form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }
        debug!("token endpoint answered {}", status);

        parse_token_response(&body, fetched_at, self.default_expires_in_seconds)
    }
}

impl FetchToken for ClientCredentialsSource {
    fn fetch_token(&self) -> BoxFuture<'_, Result<TokenRecord, FetchError>> {
        self.exchange().boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::utils::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_INSTANCE_URL};

    fn settings() -> TokenSettings {
        TokenSettings {
            request_timeout_ms: 2_000,
            ..TokenSettings::default()
        }
    }

    fn credentials(instance_url: &str, secret: Option<&str>) -> CredentialsSource {
        let mut values = HashMap::new();
        values.insert(ENV_INSTANCE_URL.to_owned(), instance_url.to_owned());
        values.insert(ENV_CLIENT_ID.to_owned(), "my-client".to_owned());
        if let Some(secret) = secret {
            values.insert(ENV_CLIENT_SECRET.to_owned(), secret.to_owned());
        }
        CredentialsSource::Static(values)
    }

    #[tokio::test]
    async fn posts_client_credentials_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/services/oauth2/token")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body("grant_type=client_credentials&client_id=my-client&client_secret=s3cr3t");
                then.status(200).json_body(json!({
                    "access_token": "tok-1",
                    "token_type": "Bearer",
                    "expires_in": 3600
                }));
            })
            .await;

        // trailing slash must not produce a double slash
        let source = ClientCredentialsSource::new(
            &settings(),
            credentials(&format!("{}/", server.base_url()), Some("s3cr3t")),
        )
        .unwrap();

        let before = now_millis();
        let record = source.fetch_token().await.unwrap();
        let after = now_millis();

        mock.assert_async().await;
        assert_eq!(record.access_token, "tok-1");
        assert_eq!(record.token_type.as_deref(), Some("Bearer"));
        assert!(record.expires_at >= before + 3_600_000);
        assert!(record.expires_at <= after + 3_600_000);
    }

    #[tokio::test]
    async fn default_lifetime_when_expires_in_absent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(200).json_body(json!({"access_token": "tok-2"}));
            })
            .await;

        let source =
            ClientCredentialsSource::new(&settings(), credentials(&server.base_url(), Some("s")))
                .unwrap();

        let before = now_millis();
        let record = source.fetch_token().await.unwrap();
        let after = now_millis();

        assert!(record.expires_at >= before + 300_000);
        assert!(record.expires_at <= after + 300_000);
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(400)
                    .body(r#"{"error":"invalid_client_id"}"#);
            })
            .await;

        let source =
            ClientCredentialsSource::new(&settings(), credentials(&server.base_url(), Some("s")))
                .unwrap();

        let err = source.fetch_token().await.unwrap_err();
        assert_eq!(
            err,
            FetchError::UpstreamStatus {
                status: 400,
                body: r#"{"error":"invalid_client_id"}"#.to_owned()
            }
        );
    }

    #[tokio::test]
    async fn missing_secret_fails_without_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(200).json_body(json!({"access_token": "never"}));
            })
            .await;

        let source =
            ClientCredentialsSource::new(&settings(), credentials(&server.base_url(), None))
                .unwrap();

        let err = source.fetch_token().await.unwrap_err();
        assert!(err.to_string().contains(ENV_CLIENT_SECRET));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/services/oauth2/token");
                then.status(200)
                    .delay(Duration::from_millis(1_000))
                    .json_body(json!({"access_token": "late"}));
            })
            .await;

        let settings = TokenSettings {
            request_timeout_ms: 100,
            ..TokenSettings::default()
        };
        let source =
            ClientCredentialsSource::new(&settings, credentials(&server.base_url(), Some("s")))
                .unwrap();

        let err = source.fetch_token().await.unwrap_err();
        assert_eq!(err.reason(), "transport");
    }
}
