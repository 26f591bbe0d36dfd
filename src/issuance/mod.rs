pub mod artifacts;
pub mod driver;

pub use artifacts::IssuedArtifacts;
pub use driver::CertbotIssuer;

use crate::error::ProvisionError;

/// Parameters for one certificate issuance round.
#[derive(Debug, Clone)]
pub struct IssuanceRequest {
    pub domain_name: String,
    pub hosted_zone_id: String,
    pub email_address: String,
}

/// Core operation any certificate issuer must support. Implemented by the
/// subprocess driver in production and by fakes in tests.
pub trait CertificateIssuer {
    /// Runs one issuance round and returns the harvested artifacts, or fails
    /// with a subprocess or artifact-read error. Partial artifacts are never
    /// returned.
    async fn issue(&self, request: &IssuanceRequest) -> Result<IssuedArtifacts, ProvisionError>;
}
