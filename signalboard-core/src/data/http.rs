//! Shared blocking HTTP plumbing for the exchange clients.
//!
//! Maps transport failures and HTTP status codes onto [`SourceError`] so each
//! exchange client only has to deal with its own payload shapes.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::provider::SourceError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("signalboard/", env!("CARGO_PKG_VERSION"));

/// Blocking client with the request timeout every source shares.
pub fn build_client() -> Result<reqwest::blocking::Client, SourceError> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SourceError::Other(format!("failed to build HTTP client: {e}")))
}

/// GET `url` with `query` and decode the JSON body.
pub fn get_json<T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, SourceError> {
    let resp = client.get(url).query(query).send().map_err(|e| {
        if e.is_timeout() {
            SourceError::NetworkUnreachable(format!("timeout: {e}"))
        } else {
            SourceError::NetworkUnreachable(e.to_string())
        }
    })?;

    let status = resp.status();

    if status == reqwest::StatusCode::FORBIDDEN {
        return Err(SourceError::Forbidden(format!("HTTP 403 from {url}")));
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(SourceError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if status.is_client_error() {
        // Exchanges answer unknown markets with 400/404 and a JSON explanation.
        let body = resp.text().unwrap_or_default();
        return Err(SourceError::Rejected(format!(
            "HTTP {status}: {}",
            truncate(&body, 200)
        )));
    }

    if !status.is_success() {
        return Err(SourceError::Other(format!("HTTP {status} from {url}")));
    }

    resp.json::<T>()
        .map_err(|e| SourceError::ResponseFormatChanged(format!("failed to parse {url}: {e}")))
}

/// Exchanges encode numbers as JSON strings or numbers, depending on the field.
pub fn value_f64(v: &Value) -> Option<f64> {
    match v {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

pub fn value_i64(v: &Value) -> Option<i64> {
    match v {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

pub fn opt_str_f64(s: Option<&str>) -> Option<f64> {
    s.and_then(|s| s.trim().parse::<f64>().ok())
}

pub fn secs_to_utc(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

pub fn millis_to_utc(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_from_strings_and_numbers() {
        assert_eq!(value_f64(&json!("1.5")), Some(1.5));
        assert_eq!(value_f64(&json!(2.25)), Some(2.25));
        assert_eq!(value_f64(&json!(null)), None);
        assert_eq!(value_f64(&json!("abc")), None);
        assert_eq!(value_i64(&json!("1700000000")), Some(1_700_000_000));
        assert_eq!(value_i64(&json!(42)), Some(42));
    }

    #[test]
    fn timestamps() {
        let t = secs_to_utc(86_400).unwrap();
        assert_eq!(t.to_rfc3339(), "1970-01-02T00:00:00+00:00");
        assert_eq!(millis_to_utc(86_400_000), Some(t));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ação", 2), "aç");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
