//! Turns an engine error response into a [`NormalizedError`].

use serde_json::Value;

use super::transport::RawResponse;
use crate::error::NormalizedError;

/// Serializes a response body the way it is reported in error messages.
fn serialize_body(data: Option<&Value>) -> String {
    match data {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}

/// Builds the error reported for a failed response.
///
/// A status that could not be read becomes 500. A `statusCode` declared by
/// the engine in a JSON body wins over the transport status, and its `error`
/// label wins over the canonical phrase.
pub fn normalize(response: &RawResponse) -> NormalizedError {
    let message = serialize_body(response.data.as_ref());

    let Some(status) = response.status else {
        return NormalizedError::new(500, message);
    };

    match response.data.as_ref().and_then(declared_status) {
        Some((declared, Some(label))) => NormalizedError::with_label(declared, label, message),
        Some((declared, None)) => NormalizedError::new(declared, message),
        None => NormalizedError::new(status, message),
    }
}

fn declared_status(data: &Value) -> Option<(u16, Option<String>)> {
    let obj = data.as_object()?;
    let status = obj
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())?;
    let label = obj
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string);
    Some((status, label))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_boom_body() {
        let body = json!({"statusCode": 404, "error": "Not Found", "message": "Not Found"});
        let err = normalize(&RawResponse {
            status: Some(404),
            data: Some(body.clone()),
        });

        assert_eq!(err.status_code, 404);
        assert_eq!(err.error, "Not Found");
        assert_eq!(err.message, body.to_string());
    }

    #[test]
    fn test_normalize_unreadable_status() {
        let err = normalize(&RawResponse {
            status: None,
            data: Some(json!("donaldson")),
        });

        assert_eq!(err.status_code, 500);
        assert_eq!(err.error, "Internal Server Error");
        assert_eq!(err.message, "\"donaldson\"");
    }

    #[test]
    fn test_normalize_declared_status_wins() {
        let err = normalize(&RawResponse {
            status: Some(400),
            data: Some(json!({"statusCode": 409, "message": "exists"})),
        });

        assert_eq!(err.status_code, 409);
        assert_eq!(err.error, "Conflict");
    }

    #[test]
    fn test_normalize_declared_label_passed_through() {
        let err = normalize(&RawResponse {
            status: Some(422),
            data: Some(json!({"statusCode": 422, "error": "Bad Shape"})),
        });

        assert_eq!(err.status_code, 422);
        assert_eq!(err.error, "Bad Shape");
    }

    #[test]
    fn test_normalize_without_body() {
        let err = normalize(&RawResponse {
            status: Some(503),
            data: None,
        });

        assert_eq!(err.status_code, 503);
        assert_eq!(err.error, "Service Unavailable");
        assert_eq!(err.message, "");
    }

    #[test]
    fn test_normalize_plain_text_body() {
        let err = normalize(&RawResponse {
            status: Some(502),
            data: Some(json!("bad gateway")),
        });

        assert_eq!(err.status_code, 502);
        assert_eq!(err.message, "\"bad gateway\"");
    }

    #[test]
    fn test_normalize_ignores_non_numeric_declared_status() {
        let err = normalize(&RawResponse {
            status: Some(400),
            data: Some(json!({"statusCode": "teapot"})),
        });

        assert_eq!(err.status_code, 400);
        assert_eq!(err.error, "Bad Request");
    }
}
