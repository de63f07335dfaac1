//! Webhook notification sink.
//!
//! Posts `{"text": "..."}` to a single configured URL, the payload shape chat
//! incoming-webhooks accept. One attempt per notification, no retries.

use std::time::Duration;

use async_trait::async_trait;
use error_stack::Report;
use error_stack::ResultExt;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::domain::error::SinkError;
use crate::domain::traits::NotificationSink;
use crate::domain::types::Notification;

/// Longest slice of an error response body kept in a delivery error.
const MAX_ERROR_BODY_BYTES: usize = 256;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

pub struct WebhookSink {
    url: Url,
    client: Client,
}

impl WebhookSink {
    /// Create a sink posting to `url` with the given per-request timeout.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, Report<SinkError>> {
        let config_error = SinkError::Configuration {
            message: "Failed to create HTTP client".to_string(),
        };
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .change_context(config_error)?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, notification: &Notification) -> Result<(), Report<SinkError>> {
        let payload = WebhookPayload {
            text: &notification.summary,
        };

        let response = self
            .client
            .post(self.url.clone())
            .json(&payload)
            .send()
            .await
            .change_context(SinkError::Delivery {
                message: format!("HTTP request to {} failed", self.url),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = truncate_body(response.text().await.unwrap_or_default());
            return Err(Report::new(SinkError::Delivery {
                message: format!("Webhook responded with {status}: {body}"),
            }));
        }

        Ok(())
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;
    use wiremock::matchers::body_json;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;

    use super::*;
    use crate::domain::types::PodIdentity;

    fn notification(summary: &str) -> Notification {
        Notification {
            summary: summary.to_string(),
            pod: PodIdentity {
                kind: "Pod".to_string(),
                namespace: "prod".to_string(),
                name: "web-7".to_string(),
            },
        }
    }

    fn sink_for(server: &MockServer) -> WebhookSink {
        let url = Url::parse(&format!("{}/hooks/alerts", server.uri())).unwrap();
        WebhookSink::new(url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn posts_text_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/alerts"))
            .and(body_json(serde_json::json!({
                "text": "Pod prod/web-7 is in the Failed phase"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = sink_for(&mock_server)
            .send(&notification("Pod prod/web-7 is in the Failed phase"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn error_status_is_a_delivery_error_without_retry() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/alerts"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&mock_server)
            .await;

        let err = sink_for(&mock_server)
            .send(&notification("boom"))
            .await
            .unwrap_err();

        assert!(matches!(err.current_context(), SinkError::Delivery { .. }));
        assert!(err.to_string().contains("503"));
        let received_requests = mock_server.received_requests().await.unwrap();
        assert_eq!(received_requests.len(), 1);
    }

    #[tokio::test]
    async fn large_error_body_is_truncated() {
        let oversized = "x".repeat(64 * 1024);
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/alerts"))
            .respond_with(ResponseTemplate::new(500).set_body_string(oversized))
            .mount(&mock_server)
            .await;

        let err = sink_for(&mock_server)
            .send(&notification("boom"))
            .await
            .unwrap_err();

        let SinkError::Delivery { message } = err.current_context() else {
            panic!("expected a delivery error");
        };
        assert!(message.starts_with("Webhook responded with 500"));
        assert!(message.ends_with("..."));
        assert!(message.len() < MAX_ERROR_BODY_BYTES + 64);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let body = truncate_body("€".repeat(200));

        assert_eq!(body.len(), 255 + "...".len());
        assert!(body.ends_with("€..."));
        assert_eq!(truncate_body("unavailable".to_string()), "unavailable");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_delivery_error() {
        let mock_server = MockServer::start().await;
        let sink = sink_for(&mock_server);
        drop(mock_server);

        let err = sink.send(&notification("boom")).await.unwrap_err();

        assert!(matches!(err.current_context(), SinkError::Delivery { .. }));
    }
}
