pub mod callback;
pub mod event;

pub use callback::{CallbackEnvelope, CallbackOutcome, CallbackReporter};
pub use event::{
    InvocationContext, LifecycleEvent, LifecycleResult, LifecycleStatus, RequestType,
    ResourceProperties,
};

use chrono::Utc;
use log::{error, info};
use serde_json::Value;

use crate::binding::{CreateBindingRequest, DomainBindings};
use crate::config::Settings;
use crate::dns::HostedZones;
use crate::domain;
use crate::error::ProvisionError;
use crate::issuance::{CertificateIssuer, IssuanceRequest};

/// The lifecycle state machine. Dispatches one event to its handler, drives
/// the injected collaborators, and converts every failure into a FAILED
/// result; `handle` itself cannot fail.
pub struct Orchestrator<Z, I, B> {
    zones: Z,
    issuer: I,
    bindings: B,
    settings: Settings,
}

impl<Z, I, B> Orchestrator<Z, I, B>
where
    Z: HostedZones,
    I: CertificateIssuer,
    B: DomainBindings,
{
    pub fn new(zones: Z, issuer: I, bindings: B, settings: Settings) -> Self {
        Self {
            zones,
            issuer,
            bindings,
            settings,
        }
    }

    pub async fn handle(&self, event: &LifecycleEvent, ctx: &InvocationContext) -> LifecycleResult {
        info!("[lifecycle] handling {} request", event.request_type);

        let outcome = match &event.request_type {
            RequestType::Create => self.create(event).await,
            RequestType::Delete => self.delete(&event.resource_properties).await,
            RequestType::Update => self.update(event).await,
            RequestType::Other(raw) => Err(ProvisionError::UnrecognizedRequest(raw.clone())),
        };

        match outcome {
            Ok(data) => LifecycleResult::success(ctx, data),
            Err(err) => {
                error!("[lifecycle] {} failed: {err}", event.request_type);
                LifecycleResult::failed(ctx, err.to_string())
            }
        }
    }

    /// Resolve the zone apex, compose the domain name, issue the
    /// certificate, then bind it to the routing layer.
    async fn create(&self, event: &LifecycleEvent) -> Result<Value, ProvisionError> {
        let props = &event.resource_properties;
        let hosted_zone_id = props
            .hosted_zone_id
            .as_deref()
            .ok_or(ProvisionError::MissingProperty("HostedZoneId"))?;
        let email_address = self
            .settings
            .email_address
            .clone()
            .ok_or(ProvisionError::MissingEnvironment("EMAIL_ADDRESS"))?;

        let zone_apex = self.zones.zone_apex(hosted_zone_id).await?;
        let domain_name = domain::compose_domain_name(props.subdomain.as_deref(), &zone_apex)?;
        info!("[lifecycle] provisioning certificate for {domain_name}");

        let artifacts = self
            .issuer
            .issue(&IssuanceRequest {
                domain_name: domain_name.clone(),
                hosted_zone_id: hosted_zone_id.to_string(),
                email_address,
            })
            .await?;

        let certificate_name = domain::certificate_name(&domain_name, Utc::now().date_naive());
        let info = self
            .bindings
            .create(CreateBindingRequest {
                domain_name,
                certificate_name,
                artifacts,
            })
            .await?;

        serde_json::to_value(&info)
            .map_err(|err| ProvisionError::Provider(format!("encoding binding info: {err}")))
    }

    /// Removing a binding that is already gone counts as success.
    async fn delete(&self, props: &ResourceProperties) -> Result<Value, ProvisionError> {
        let domain_name = props
            .domain_name
            .as_deref()
            .ok_or(ProvisionError::MissingProperty("DomainName"))?;

        match self.bindings.get(domain_name).await? {
            None => {
                info!("[lifecycle] no binding for {domain_name}; nothing to delete");
                Ok(Value::Null)
            }
            Some(_) => {
                self.bindings.delete(domain_name).await?;
                info!("[lifecycle] deleted binding for {domain_name}");
                Ok(Value::Null)
            }
        }
    }

    /// Update is delete-of-old then create-of-new, not an in-place change.
    /// A failed delete short-circuits; the create never runs.
    async fn update(&self, event: &LifecycleEvent) -> Result<Value, ProvisionError> {
        let old_props = event
            .old_resource_properties
            .as_ref()
            .ok_or(ProvisionError::MissingField("OldResourceProperties"))?;
        self.delete(old_props).await?;
        self.create(event).await
    }
}

/// Builds the response envelope and echoes it, completing the orchestrator's
/// logging contract; the caller hands the envelope to the reporter.
pub fn finish(event: &LifecycleEvent, result: LifecycleResult) -> CallbackEnvelope {
    let envelope = CallbackEnvelope::new(event, result);
    match serde_json::to_string(&envelope) {
        Ok(rendered) => info!("[lifecycle] RESPONSE: {rendered}"),
        Err(err) => error!("[lifecycle] response not renderable: {err}"),
    }
    envelope
}
