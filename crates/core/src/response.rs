//! Response checking
//!
//! Translates a raw HTTP response into either a parsed payload or one of
//! the API error variants.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::transport::HttpResponse;

/// Parsed JSON object returned by a successful call
pub type Payload = Map<String, Value>;

/// Statuses the API uses for success
pub const SUCCESS_STATUSES: [u16; 4] = [200, 201, 202, 204];

pub fn is_success(status: u16) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// Check a response and return its payload
///
/// A non-empty body is parsed whatever the status. An empty body becomes
/// `{"error": "", "message": "OK"}` on success and
/// `{"error": <status>, "message": ""}` on failure. 401 and 404 map to
/// `Unauthorized` and `PathNotFound`; every other failure maps to
/// `Generic` with the payload's `error` and `message` fields.
pub fn check_response(response: &HttpResponse, token: &str) -> Result<Payload> {
    let status = response.status;
    let success = is_success(status);
    let payload = parse_payload(status, success, response.body.trim())?;

    if success {
        return Ok(payload);
    }

    match status {
        401 => Err(Error::Unauthorized {
            token: token.to_string(),
        }),
        404 => Err(Error::PathNotFound {
            path: String::new(),
        }),
        _ => Err(Error::Generic {
            status,
            code: field_text(&payload, "error"),
            message: field_text(&payload, "message"),
        }),
    }
}

fn parse_payload(status: u16, success: bool, body: &str) -> Result<Payload> {
    if body.is_empty() {
        let mut payload = Map::new();
        if success {
            payload.insert("error".into(), Value::from(""));
            payload.insert("message".into(), Value::from("OK"));
        } else {
            payload.insert("error".into(), Value::from(status));
            payload.insert("message".into(), Value::from(""));
        }
        return Ok(payload);
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            let mut payload = Map::new();
            payload.insert("value".into(), other);
            Ok(payload)
        }
        // Gateways answer failures with HTML; keep the text as the message.
        Err(_) if !success => {
            let mut payload = Map::new();
            payload.insert("error".into(), Value::from(status));
            payload.insert("message".into(), Value::from(body));
            Ok(payload)
        }
        Err(e) => Err(Error::Json(e)),
    }
}

fn field_text(payload: &Payload, key: &str) -> String {
    match payload.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: u16, body: &str) -> Result<Payload> {
        check_response(&HttpResponse::new(status, body), "token")
    }

    #[test]
    fn test_success_with_body() {
        let payload = check(200, r#"{"href":"https://upload.example/abc","method":"PUT"}"#).unwrap();
        assert_eq!(payload["href"], "https://upload.example/abc");
    }

    #[test]
    fn test_all_success_statuses() {
        for status in SUCCESS_STATUSES {
            assert!(check(status, "").is_ok(), "status {status} should be accepted");
        }
        assert!(check(203, "").is_err());
    }

    #[test]
    fn test_empty_success_body_is_synthesized() {
        let payload = check(204, "   \n").unwrap();
        assert_eq!(payload["error"], "");
        assert_eq!(payload["message"], "OK");
    }

    #[test]
    fn test_unauthorized_carries_token() {
        let err = check_response(
            &HttpResponse::new(401, r#"{"error":"UnauthorizedError","message":"Unauthorized"}"#),
            "rejected",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unauthorized { ref token } if token == "rejected"));
    }

    #[test]
    fn test_not_found_has_empty_path() {
        let err = check(404, r#"{"error":"DiskNotFoundError","message":"Resource not found."}"#)
            .unwrap_err();
        assert!(matches!(err, Error::PathNotFound { ref path } if path.is_empty()));
    }

    #[test]
    fn test_generic_carries_server_fields() {
        let err = check(
            409,
            r#"{"error":"DiskPathPointsToExistentDirectoryError","message":"Path already exists."}"#,
        )
        .unwrap_err();
        match err {
            Error::Generic {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 409);
                assert_eq!(code, "DiskPathPointsToExistentDirectoryError");
                assert_eq!(message, "Path already exists.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_generic_with_empty_body_uses_status_as_code() {
        let err = check(503, "").unwrap_err();
        assert!(matches!(
            err,
            Error::Generic { status: 503, ref code, ref message } if code == "503" && message.is_empty()
        ));
    }

    #[test]
    fn test_non_json_failure_body_becomes_message() {
        let err = check(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            Error::Generic { status: 502, ref message, .. } if message == "<html>Bad Gateway</html>"
        ));
    }

    #[test]
    fn test_non_json_success_body_is_json_error() {
        assert!(matches!(check(200, "not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_non_object_success_body_is_wrapped() {
        let payload = check(200, "[1,2]").unwrap();
        assert_eq!(payload["value"], serde_json::json!([1, 2]));
    }
}
