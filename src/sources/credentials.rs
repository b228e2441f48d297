use std::collections::HashMap;
use std::env;

use crate::sources::error::FetchError;
use crate::utils::constants::{ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_INSTANCE_URL, TOKEN_ENDPOINT_PATH};

/// Where the client credentials come from. Looked up on every fetch attempt.
#[derive(Debug, Clone, Default)]
pub enum CredentialsSource {
    #[default]
    Env,
    Static(HashMap<String, String>),
}

#[derive(Clone)]
pub struct ClientCredentials {
    pub instance_url: String,
    pub client_id: String,
    pub client_secret: String,
}

// keep the secret out of logs
impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("instance_url", &self.instance_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

impl ClientCredentials {
    /// `{instance_url}/services/oauth2/token`, one trailing slash stripped.
    pub fn token_url(&self) -> String {
        let base = self
            .instance_url
            .strip_suffix('/')
            .unwrap_or(&self.instance_url);
        format!("{}{}", base, TOKEN_ENDPOINT_PATH)
    }
}

impl CredentialsSource {
    fn lookup(&self, key: &str) -> Option<String> {
        let value = match self {
            CredentialsSource::Env => env::var(key).ok(),
            CredentialsSource::Static(values) => values.get(key).cloned(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Fails with every missing variable named, before any network call.
    pub fn resolve(&self) -> Result<ClientCredentials, FetchError> {
        let instance_url = self.lookup(ENV_INSTANCE_URL);
        let client_id = self.lookup(ENV_CLIENT_ID);
        let client_secret = self.lookup(ENV_CLIENT_SECRET);

        match (instance_url, client_id, client_secret) {
            (Some(instance_url), Some(client_id), Some(client_secret)) => Ok(ClientCredentials {
                instance_url,
                client_id,
                client_secret,
            }),
            (instance_url, client_id, client_secret) => {
                let missing = [
                    (ENV_INSTANCE_URL, instance_url.is_none()),
                    (ENV_CLIENT_ID, client_id.is_none()),
                    (ENV_CLIENT_SECRET, client_secret.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name.to_owned())
                .collect();
                Err(FetchError::MissingConfig(missing))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn static_source(pairs: &[(&str, &str)]) -> CredentialsSource {
        CredentialsSource::Static(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn resolves_all_three_values() {
        let creds = static_source(&[
            (ENV_INSTANCE_URL, "https://example.my.salesforce.com/"),
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, "secret"),
        ])
        .resolve()
        .unwrap();

        assert_eq!(
            creds.token_url(),
            "https://example.my.salesforce.com/services/oauth2/token"
        );
        assert!(!format!("{:?}", creds).contains("\"secret\""));
    }

    #[test]
    fn names_only_the_missing_variables() {
        let err = static_source(&[
            (ENV_INSTANCE_URL, "https://example.my.salesforce.com"),
            (ENV_CLIENT_ID, "id"),
            (ENV_CLIENT_SECRET, ""),
        ])
        .resolve()
        .unwrap_err();

        assert_eq!(err, FetchError::MissingConfig(vec![ENV_CLIENT_SECRET.to_owned()]));
    }

    #[test]
    #[serial]
    fn reads_process_environment_each_time() {
        env::set_var(ENV_INSTANCE_URL, "http://localhost:1");
        env::set_var(ENV_CLIENT_ID, "id");
        env::remove_var(ENV_CLIENT_SECRET);

        let source = CredentialsSource::Env;
        assert!(source.resolve().is_err());

        env::set_var(ENV_CLIENT_SECRET, "secret");
        assert_eq!(source.resolve().unwrap().client_secret, "secret");

        env::remove_var(ENV_INSTANCE_URL);
        env::remove_var(ENV_CLIENT_ID);
        env::remove_var(ENV_CLIENT_SECRET);
    }
}
