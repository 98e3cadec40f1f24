//! Request extractors.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// The exact set of top-level keys a request body may carry.
pub trait StrictSchema {
    const FIELDS: &'static [&'static str];
}

/// JSON body extractor that rejects unknown fields.
///
/// The body must be a JSON object whose keys all appear in
/// [`StrictSchema::FIELDS`]. Only then is it deserialized into `T`.
/// A `Content-Type` header is not required.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned + StrictSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        parse_strict(&bytes).map(StrictJson)
    }
}

fn parse_strict<T>(bytes: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + StrictSchema,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::InvalidBody("request body is empty".to_string()));
    }

    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let Value::Object(fields) = &value else {
        return Err(AppError::InvalidBody(
            "request body must be a JSON object".to_string(),
        ));
    };

    if let Some(unknown) = fields.keys().find(|key| !T::FIELDS.contains(&key.as_str())) {
        return Err(AppError::UnknownField(unknown.clone()));
    }

    serde_json::from_value(value).map_err(|e| AppError::InvalidBody(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UrlRequest;

    #[test]
    fn accepts_known_fields() {
        let request: UrlRequest = parse_strict(br#"{"url":"example.com"}"#).unwrap();
        assert_eq!(request.url, "example.com");
    }

    #[test]
    fn missing_url_defaults_to_empty() {
        let request: UrlRequest = parse_strict(b"{}").unwrap();
        assert_eq!(request.url, "");
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_strict::<UrlRequest>(br#"{"url":"example.com","alias":"x"}"#).unwrap_err();
        assert!(matches!(err, AppError::UnknownField(field) if field == "alias"));
    }

    #[test]
    fn rejects_non_objects_and_wrong_types() {
        let bodies: [&[u8]; 6] = [b"[]", b"\"example.com\"", b"null", br#"{"url":42}"#, b"{", b"  "];
        for body in bodies {
            let err = parse_strict::<UrlRequest>(body).unwrap_err();
            assert!(matches!(err, AppError::InvalidBody(_)), "body {body:?}");
        }
    }
}
