use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ForecastResponse, ForecastResult};

/// Remaining API calls for the key, as reported by the service.
pub const API_CALLS_HEADER: &str = "x-forecast-api-calls";
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// What a transport hands back for one request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// Informational headers. These never fail a call: anything missing or malformed is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseHeaders {
    pub api_calls: Option<i64>,
    pub response_time: Option<String>,
}

impl ResponseHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            api_calls: header_str(headers, API_CALLS_HEADER).and_then(|v| v.trim().parse().ok()),
            response_time: header_str(headers, RESPONSE_TIME_HEADER).map(str::to_string),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Turns a raw response into a [`ForecastResult`].
pub fn map_response(raw: RawResponse) -> Result<ForecastResult> {
    if !raw.status.is_success() {
        return Err(Error::Status { status: raw.status, body: truncate_body(&raw.body) });
    }

    let response: ForecastResponse = serde_json::from_str(&raw.body)?;
    let headers = ResponseHeaders::from_headers(&raw.headers);

    Ok(ForecastResult { response, headers })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
