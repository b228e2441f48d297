use serde::Serialize;

/// The single cached credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// unix milliseconds
    pub expires_at: i64,
    /// unix milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<i64>,
}

impl TokenRecord {
    pub fn new(access_token: String, expires_at: i64) -> Self {
        Self {
            access_token,
            token_type: None,
            expires_at,
            issued_at: None,
        }
    }

    /// True when the token outlives `now_ms` by more than the safety margin.
    pub fn is_fresh(&self, now_ms: i64, safety_margin_ms: i64) -> bool {
        now_ms.saturating_add(safety_margin_ms) < self.expires_at
    }
}
