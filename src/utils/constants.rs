//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 10;
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_TOKEN_PATH: &str = "/token";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "8080";

// Upstream OAuth2 exchange
pub const TOKEN_ENDPOINT_PATH: &str = "/services/oauth2/token";
pub const GRANT_TYPE_CLIENT_CREDENTIALS: &str = "client_credentials";

// Credential environment variables, read on every fetch attempt
pub const ENV_INSTANCE_URL: &str = "INSTANCE_URL";
pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
