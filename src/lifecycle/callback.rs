use log::{info, warn};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::lifecycle::event::{LifecycleEvent, LifecycleResult, LifecycleStatus};

/// The status envelope delivered to the stack's callback endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackEnvelope {
    pub status: LifecycleStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl CallbackEnvelope {
    pub fn new(event: &LifecycleEvent, result: LifecycleResult) -> Self {
        Self {
            status: result.status,
            reason: result.reason,
            physical_resource_id: result.physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            data: result.data,
        }
    }
}

/// What became of one delivery attempt. The reporter never escalates its own
/// failure; the outcome exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The event carried no callback endpoint.
    Skipped,
    Delivered,
    /// The endpoint answered with a non-2xx status.
    Rejected(u16),
    /// The request never completed.
    Failed(String),
}

/// Best-effort reporter for the callback endpoint.
pub struct CallbackReporter {
    client: reqwest::Client,
}

impl CallbackReporter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Serializes the envelope and PUTs it to the endpoint. The callback is
    /// advisory signaling: transport errors and rejections are logged, never
    /// retried, never propagated.
    pub async fn report(
        &self,
        response_url: Option<&str>,
        envelope: &CallbackEnvelope,
    ) -> CallbackOutcome {
        let Some(url) = response_url else {
            info!("[callback] no response URL in event; completing locally");
            return CallbackOutcome::Skipped;
        };

        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(err) => {
                warn!("[callback] could not serialize response envelope: {err}");
                return CallbackOutcome::Failed(err.to_string());
            }
        };

        // The endpoint is pre-signed; it requires an empty Content-Type.
        match self
            .client
            .put(url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!("[callback] delivered {} response", envelope_status(envelope));
                CallbackOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status().as_u16();
                warn!("[callback] endpoint answered {status}");
                CallbackOutcome::Rejected(status)
            }
            Err(err) => {
                warn!("[callback] delivery failed: {err}");
                CallbackOutcome::Failed(err.to_string())
            }
        }
    }
}

fn envelope_status(envelope: &CallbackEnvelope) -> &'static str {
    match envelope.status {
        LifecycleStatus::Success => "SUCCESS",
        LifecycleStatus::Failed => "FAILED",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::event::InvocationContext;

    fn sample_event() -> LifecycleEvent {
        serde_json::from_str(
            r#"{
                "RequestType": "Create",
                "StackId": "stack-1",
                "RequestId": "req-1",
                "LogicalResourceId": "Cert"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn envelope_serializes_wire_names() {
        let ctx = InvocationContext::new(Some("stream-1"));
        let result = LifecycleResult::success(
            &ctx,
            serde_json::json!({"domainName": "api.example.com"}),
        );
        let envelope = CallbackEnvelope::new(&sample_event(), result);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["Status"], "SUCCESS");
        assert_eq!(value["PhysicalResourceId"], "stream-1");
        assert_eq!(value["StackId"], "stack-1");
        assert_eq!(value["RequestId"], "req-1");
        assert_eq!(value["LogicalResourceId"], "Cert");
        assert_eq!(value["Data"]["domainName"], "api.example.com");
    }

    #[test]
    fn null_data_is_omitted() {
        let ctx = InvocationContext::new(Some("stream-1"));
        let result = LifecycleResult::failed(&ctx, "boom".into());
        let envelope = CallbackEnvelope::new(&sample_event(), result);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["Status"], "FAILED");
        assert_eq!(value["Reason"], "boom");
        assert!(value.get("Data").is_none());
    }

    #[tokio::test]
    async fn missing_response_url_short_circuits() {
        let reporter = CallbackReporter::new(reqwest::Client::new());
        let ctx = InvocationContext::new(Some("stream-1"));
        let envelope =
            CallbackEnvelope::new(&sample_event(), LifecycleResult::failed(&ctx, "boom".into()));
        let outcome = reporter.report(None, &envelope).await;
        assert_eq!(outcome, CallbackOutcome::Skipped);
    }
}
