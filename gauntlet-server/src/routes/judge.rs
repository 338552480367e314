//! `POST /api/judge`
//!
//! Request: `{"level": 1-5, "userInput": "...", "ideaName": "..."}`
//!
//! | Outcome                         | Status | Body                          |
//! |---------------------------------|--------|-------------------------------|
//! | verdict                         | 200    | `{verdict, reasons, hint}`    |
//! | field absent, blank or zero     | 400    | missing-fields error          |
//! | level not an ordinal in 1-5     | 400    | `Invalid level`               |
//! | no model credential             | 500    | `API key not configured`      |
//! | model unreachable / unparseable | 500    | generic retry message         |

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde_json::Value;
use tracing::{debug, error};

use gauntlet_judge::error::MISSING_FIELDS;
use gauntlet_judge::{JudgeError, JudgeRequest, JudgeService};

use super::{error_response, json_response};

/// Decode a request body leniently.
///
/// Anything that is not a JSON object yields `None`. Absent or mistyped
/// text fields decode as empty and are rejected by validation. Levels are
/// accepted as integers, integral floats or canonical numeric strings.
pub fn decode_request(body: &[u8]) -> Option<JudgeRequest> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    let level = level_ordinal(object.get("level"));
    let text = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    Some(JudgeRequest {
        level,
        user_input: text("userInput"),
        idea_name: text("ideaName"),
    })
}

/// Ordinal that matches no level, so validation answers `Invalid level`.
const UNRESOLVED_LEVEL: i64 = -1;

/// Absent, null, `false`, `0` and `""` count as a missing level (0).
/// Any other value that does not name an integer is unresolved.
fn level_ordinal(value: Option<&Value>) -> i64 {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => 0,
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .unwrap_or(UNRESOLVED_LEVEL),
        Some(Value::String(s)) if s.is_empty() => 0,
        Some(Value::String(s)) => s
            .parse::<i64>()
            .ok()
            .filter(|n| *n != 0 && n.to_string() == *s)
            .unwrap_or(UNRESOLVED_LEVEL),
        Some(_) => UNRESOLVED_LEVEL,
    }
}

/// Status code for a judging failure.
pub fn status_for(err: &JudgeError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Judge a submission.
pub async fn handle_judge(judge: &JudgeService, body: &[u8]) -> Response<Full<Bytes>> {
    let Some(request) = decode_request(body) else {
        debug!(body_len = body.len(), "Judge request is not a JSON object");
        return error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS);
    };

    match judge.judge(&request).await {
        Ok(verdict) => json_response(StatusCode::OK, &verdict),
        Err(e) => {
            if let JudgeError::Configuration(_) = e {
                error!(error = %e, "Judge endpoint is misconfigured");
            } else {
                debug!(error = %e, "Judge request failed");
            }
            error_response(status_for(&e), e.public_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_judge::backend::MockBackend;
    use gauntlet_judge::error::{API_KEY_MISSING, JUDGMENT_FAILED};
    use gauntlet_judge::LlmBackend;
    use http_body_util::BodyExt;
    use std::sync::Arc;

    async fn call(judge: &JudgeService, body: &str) -> (StatusCode, Value) {
        let response = handle_judge(judge, body.as_bytes()).await;
        let status = response.status();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn mock_judge(reply: &str) -> (Arc<MockBackend>, JudgeService) {
        let backend = Arc::new(MockBackend::default().with_response(reply));
        let service = JudgeService::new(Arc::clone(&backend) as Arc<dyn LlmBackend>);
        (backend, service)
    }

    #[test]
    fn test_decode_is_lenient() {
        let request = decode_request(br#"{"level":"2","userInput":"x","ideaName":"y"}"#).unwrap();
        assert_eq!(request.level, 2);

        let request = decode_request(br#"{"level":3.0,"userInput":"x"}"#).unwrap();
        assert_eq!(request.level, 3);
        assert_eq!(request.idea_name, "");

        let request = decode_request(br#"{"level":true,"userInput":5}"#).unwrap();
        assert_eq!(request.level, UNRESOLVED_LEVEL);
        assert_eq!(request.user_input, "");

        for (level, expected) in [
            ("null", 0),
            ("false", 0),
            ("\"\"", 0),
            ("0", 0),
            ("\"abc\"", UNRESOLVED_LEVEL),
            ("\"02\"", UNRESOLVED_LEVEL),
            ("\" 2\"", UNRESOLVED_LEVEL),
            ("\"0\"", UNRESOLVED_LEVEL),
            ("2.5", UNRESOLVED_LEVEL),
            ("[2]", UNRESOLVED_LEVEL),
        ] {
            let body = format!(r#"{{"level":{},"userInput":"x","ideaName":"y"}}"#, level);
            let request = decode_request(body.as_bytes()).unwrap();
            assert_eq!(request.level, expected, "level: {}", level);
        }

        assert!(decode_request(b"not json").is_none());
        assert!(decode_request(b"[1,2]").is_none());
        assert!(decode_request(b"null").is_none());
    }

    #[tokio::test]
    async fn test_pass_verdict() {
        let (backend, judge) = mock_judge(
            "```json\n{\"verdict\":\"PASS\",\"reasons\":[\"ok\"],\"hint\":\"ship it\"}\n```",
        );

        let (status, body) = call(
            &judge,
            r#"{"level":1,"userInput":"Freelancers chase invoices","ideaName":"Acme"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "verdict": "PASS", "reasons": ["ok"], "hint": "ship it" })
        );
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_client_errors() {
        let (backend, judge) = mock_judge("unused");

        for body in [
            "garbage",
            r#"{"userInput":"x","ideaName":"y"}"#,
            r#"{"level":0,"userInput":"x","ideaName":"y"}"#,
            r#"{"level":1,"userInput":"","ideaName":"y"}"#,
            r#"{"level":1,"userInput":"x"}"#,
        ] {
            let (status, json) = call(&judge, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json["error"], MISSING_FIELDS);
        }

        for body in [
            r#"{"level":9,"userInput":"x","ideaName":"y"}"#,
            r#"{"level":"abc","userInput":"x","ideaName":"y"}"#,
            r#"{"level":2.5,"userInput":"x","ideaName":"y"}"#,
            r#"{"level":true,"userInput":"x","ideaName":"y"}"#,
        ] {
            let (status, json) = call(&judge, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
            assert_eq!(json["error"], "Invalid level", "body: {}", body);
        }

        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_server_errors() {
        let body = r#"{"level":4,"userInput":"$9/month","ideaName":"Acme"}"#;

        let (status, json) = call(&JudgeService::unconfigured(), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], API_KEY_MISSING);

        let (_, judge) = mock_judge("Looks good to me!");
        let (status, json) = call(&judge, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], JUDGMENT_FAILED);
    }
}
