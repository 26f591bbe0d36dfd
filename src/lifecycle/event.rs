use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The three lifecycle transitions the orchestrator handles. Anything else is
/// preserved verbatim so the failure reason can name it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl From<String> for RequestType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Other(raw),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("Create"),
            Self::Update => f.write_str("Update"),
            Self::Delete => f.write_str("Delete"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Domain-specific configuration carried by the declared resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    pub hosted_zone_id: Option<String>,
    pub subdomain: Option<String>,
    /// Accepted under both spellings; older stack templates used the
    /// lowercase form.
    #[serde(alias = "domainName")]
    pub domain_name: Option<String>,
}

/// One resource-lifecycle event, received exactly once per invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    #[serde(default)]
    pub resource_properties: ResourceProperties,
    #[serde(default)]
    pub old_resource_properties: Option<ResourceProperties>,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleStatus {
    Success,
    Failed,
}

/// Terminal value of one orchestrator invocation.
#[derive(Debug, Clone)]
pub struct LifecycleResult {
    pub status: LifecycleStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub data: Value,
}

impl LifecycleResult {
    pub fn success(ctx: &InvocationContext, data: Value) -> Self {
        Self {
            status: LifecycleStatus::Success,
            reason: format!("See the process log stream: {}", ctx.physical_resource_id),
            physical_resource_id: ctx.physical_resource_id.clone(),
            data,
        }
    }

    pub fn failed(ctx: &InvocationContext, reason: String) -> Self {
        Self {
            status: LifecycleStatus::Failed,
            reason,
            physical_resource_id: ctx.physical_resource_id.clone(),
            data: Value::Null,
        }
    }
}

/// Per-invocation identity surfaced back to the orchestrator.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub physical_resource_id: String,
}

impl InvocationContext {
    /// Uses the operator-supplied log stream name when present so repeated
    /// updates of one resource keep a stable physical id.
    pub fn new(log_stream_name: Option<&str>) -> Self {
        let physical_resource_id = log_stream_name
            .map(str::to_string)
            .unwrap_or_else(|| format!("certgate-{}", Uuid::new_v4().as_simple()));
        Self {
            physical_resource_id,
        }
    }
}
