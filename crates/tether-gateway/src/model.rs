use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tether_core::LinkRecord;

use crate::extract::StrictSchema;

/// Body of `POST /shorten` and `PUT /shorten/{code}`.
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    /// A missing key is treated like an empty string.
    #[serde(default)]
    pub url: String,
}

impl StrictSchema for UrlRequest {
    const FIELDS: &'static [&'static str] = &["url"];
}

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub target_url: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub access_count: u64,
}

impl From<LinkRecord> for LinkResponse {
    fn from(record: LinkRecord) -> Self {
        Self {
            code: record.code.to_string(),
            target_url: record.target_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
            access_count: record.access_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccessCountResponse {
    pub access_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code,
                message: message.into(),
            },
        }
    }
}
