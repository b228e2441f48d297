use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::token::TokenRecord;
use crate::helpers::time::seconds_to_millis;
use crate::sources::error::FetchError;

static ACCESS_TOKEN_FIELD: &str = "access_token";
static TOKEN_TYPE_FIELD: &str = "token_type";
static EXPIRES_IN_FIELD: &str = "expires_in";
static ISSUED_AT_FIELD: &str = "issued_at";

/// Turn an OAuth2 token endpoint body into a [`TokenRecord`].
///
/// `fetched_at_ms` is the moment the exchange happened; the absolute expiry
/// is derived from it once and never recomputed.
pub fn parse_token_response(
    body: &str,
    fetched_at_ms: i64,
    default_expires_in_seconds: u64,
) -> Result<TokenRecord, FetchError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Decode(format!("body is not valid JSON: {}", e)))?;

    let access_token = json
        .get(ACCESS_TOKEN_FIELD)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| FetchError::Decode(format!("no {} in response", ACCESS_TOKEN_FIELD)))?
        .to_owned();

    let token_type = json
        .get(TOKEN_TYPE_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned);

    let expires_in_ms = match json.get(EXPIRES_IN_FIELD).and_then(Value::as_f64) {
        Some(seconds) => (seconds * 1000.0) as i64,
        None => {
            debug!(
                "{} absent, assuming {} seconds",
                EXPIRES_IN_FIELD, default_expires_in_seconds
            );
            seconds_to_millis(default_expires_in_seconds)
        }
    };

    Ok(TokenRecord {
        access_token,
        token_type,
        expires_at: fetched_at_ms.saturating_add(expires_in_ms),
        issued_at: json.get(ISSUED_AT_FIELD).and_then(parse_issued_at),
    })
}

/// Salesforce sends `issued_at` as a string of milliseconds, other providers
/// as a number.
fn parse_issued_at(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            let millis = n.as_i64();
            if millis.is_none() {
                warn!("ignoring non-integer {}: {}", ISSUED_AT_FIELD, n);
            }
            millis
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Null => None,
        other => {
            warn!("ignoring non-numeric {}: {}", ISSUED_AT_FIELD, other);
            None
        }
    }
}
