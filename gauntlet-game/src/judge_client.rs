//! How the controller reaches a judge.
//!
//! In-process via [`JudgeService`], or over HTTP against the judging
//! endpoint the way the browser client does.

use std::time::Duration;

use async_trait::async_trait;
use gauntlet_judge::error::{API_KEY_MISSING, JUDGMENT_FAILED};
use gauntlet_judge::{parse_verdict, JudgeError, JudgeRequest, JudgeService, Verdict};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Anything that can judge a submission.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn judge(&self, request: JudgeRequest) -> Result<Verdict, JudgeError>;
}

#[async_trait]
impl Judge for JudgeService {
    async fn judge(&self, request: JudgeRequest) -> Result<Verdict, JudgeError> {
        JudgeService::judge(self, &request).await
    }
}

#[async_trait]
impl<J: Judge + ?Sized> Judge for std::sync::Arc<J> {
    async fn judge(&self, request: JudgeRequest) -> Result<Verdict, JudgeError> {
        (**self).judge(request).await
    }
}

/// Error body returned by the endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a remote judging endpoint.
pub struct HttpJudge {
    client: Client,
    endpoint: String,
}

impl HttpJudge {
    /// `endpoint` is the full URL of the judge route, e.g.
    /// `http://localhost:3000/api/judge`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, JudgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JudgeError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl Judge for HttpJudge {
    async fn judge(&self, request: JudgeRequest) -> Result<Verdict, JudgeError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JudgeError::Upstream("judging endpoint timed out".to_string())
                } else {
                    JudgeError::Upstream(e.to_string())
                }
            })?;

        let status = response.status();
        debug!(status = status.as_u16(), "Judging endpoint replied");

        if status.is_success() {
            let text = response
                .text()
                .await
                .map_err(|e| JudgeError::Upstream(e.to_string()))?;
            return parse_verdict(&text);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("HTTP {}", status));

        Err(match status {
            StatusCode::BAD_REQUEST => JudgeError::InvalidRequest(message),
            _ if message == API_KEY_MISSING => JudgeError::Configuration(message),
            _ if message == JUDGMENT_FAILED => JudgeError::Upstream(message),
            _ => JudgeError::Upstream(format!("HTTP {}: {}", status, message)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gauntlet_judge::{Level, VerdictKind};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn judge_against(server: &MockServer) -> HttpJudge {
        HttpJudge::new(format!("{}/api/judge", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_posts_request_and_reads_verdict() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/judge"))
            .and(body_json(serde_json::json!({
                "level": 2,
                "userInput": "For freelancers who...",
                "ideaName": "Acme"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "verdict": "FAIL",
                "reasons": ["Stripe could ship this"],
                "hint": "find a wedge"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = judge_against(&server)
            .await
            .judge(JudgeRequest::new(Level::ValueProposition, "Acme", "For freelancers who..."))
            .await
            .unwrap();

        assert_eq!(verdict.verdict, VerdictKind::Fail);
        assert_eq!(verdict.hint, "find a wedge");
    }

    #[tokio::test]
    async fn test_maps_error_statuses() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "error": "API key not configured" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "Invalid level" })),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let judge = judge_against(&server).await;
        let request = JudgeRequest::new(Level::ProblemStatement, "Acme", "text");

        assert!(matches!(
            judge.judge(request.clone()).await,
            Err(JudgeError::Configuration(_))
        ));
        assert_eq!(
            judge.judge(request.clone()).await.unwrap_err(),
            JudgeError::InvalidRequest("Invalid level".into())
        );
        assert!(matches!(
            judge.judge(request).await,
            Err(JudgeError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn test_garbage_success_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = judge_against(&server)
            .await
            .judge(JudgeRequest::new(Level::ProblemStatement, "Acme", "text"))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_success_body_must_hold_reasons() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "verdict": "PASS",
                "reasons": [],
                "hint": "ship it"
            })))
            .mount(&server)
            .await;

        let err = judge_against(&server)
            .await
            .judge(JudgeRequest::new(Level::ProblemStatement, "Acme", "text"))
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Parse(ref m) if m.contains("reasons")));
    }
}
