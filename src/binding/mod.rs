pub mod apigateway;

pub use apigateway::ApiGatewayAdapter;

use serde::Serialize;

use crate::error::ProvisionError;
use crate::issuance::IssuedArtifacts;

/// Request to bind a custom domain to a freshly issued certificate. A
/// binding is never created without all three artifacts present.
pub struct CreateBindingRequest {
    pub domain_name: String,
    pub certificate_name: String,
    pub artifacts: IssuedArtifacts,
}

/// What the routing layer reports about a binding. Wire names are camelCase,
/// as the gateway API returns them; the create-time info becomes the SUCCESS
/// data payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingInfo {
    pub domain_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution_domain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_name: Option<String>,
}

/// The domain-binding controller: create/lookup/delete of a custom-domain
/// to certificate binding at the routing layer.
pub trait DomainBindings {
    async fn create(&self, request: CreateBindingRequest) -> Result<BindingInfo, ProvisionError>;

    /// `None` when no binding exists for the domain.
    async fn get(&self, domain_name: &str) -> Result<Option<BindingInfo>, ProvisionError>;

    /// Removing an absent binding is a successful no-op.
    async fn delete(&self, domain_name: &str) -> Result<(), ProvisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_info_serializes_camel_case() {
        let info = BindingInfo {
            domain_name: "api.example.com".into(),
            distribution_domain_name: Some("d123.cloudfront.example".into()),
            certificate_name: None,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["domainName"], "api.example.com");
        assert_eq!(value["distributionDomainName"], "d123.cloudfront.example");
        assert!(value.get("certificateName").is_none());
    }
}
