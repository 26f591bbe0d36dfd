use log::info;

use crate::binding::{BindingInfo, CreateBindingRequest, DomainBindings};
use crate::error::ProvisionError;

/// API Gateway implementation of the domain-binding controller, over an
/// injected SDK client.
pub struct ApiGatewayAdapter {
    client: aws_sdk_apigateway::Client,
}

impl ApiGatewayAdapter {
    pub fn new(client: aws_sdk_apigateway::Client) -> Self {
        Self { client }
    }
}

impl DomainBindings for ApiGatewayAdapter {
    async fn create(&self, request: CreateBindingRequest) -> Result<BindingInfo, ProvisionError> {
        info!(
            "[binding] creating custom domain {} with certificate {}",
            request.domain_name, request.certificate_name
        );
        let output = self
            .client
            .create_domain_name()
            .domain_name(&request.domain_name)
            .certificate_name(&request.certificate_name)
            .certificate_body(&request.artifacts.certificate_body)
            .certificate_chain(&request.artifacts.certificate_chain)
            .certificate_private_key(&request.artifacts.private_key)
            .send()
            .await
            .map_err(|err| {
                ProvisionError::Provider(format!(
                    "creating domain binding for {}: {}",
                    request.domain_name,
                    err.into_service_error()
                ))
            })?;

        Ok(BindingInfo {
            domain_name: output
                .domain_name()
                .unwrap_or(&request.domain_name)
                .to_string(),
            distribution_domain_name: output.distribution_domain_name().map(str::to_string),
            certificate_name: output.certificate_name().map(str::to_string),
        })
    }

    async fn get(&self, domain_name: &str) -> Result<Option<BindingInfo>, ProvisionError> {
        match self
            .client
            .get_domain_name()
            .domain_name(domain_name)
            .send()
            .await
        {
            Ok(output) => Ok(Some(BindingInfo {
                domain_name: output.domain_name().unwrap_or(domain_name).to_string(),
                distribution_domain_name: output.distribution_domain_name().map(str::to_string),
                certificate_name: output.certificate_name().map(str::to_string),
            })),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found_exception() {
                    Ok(None)
                } else {
                    Err(ProvisionError::Provider(format!(
                        "looking up domain binding {domain_name}: {service_err}"
                    )))
                }
            }
        }
    }

    async fn delete(&self, domain_name: &str) -> Result<(), ProvisionError> {
        info!("[binding] deleting custom domain {domain_name}");
        match self
            .client
            .delete_domain_name()
            .domain_name(domain_name)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found_exception() {
                    // Already gone; removal is idempotent.
                    Ok(())
                } else {
                    Err(ProvisionError::Provider(format!(
                        "deleting domain binding {domain_name}: {service_err}"
                    )))
                }
            }
        }
    }
}
