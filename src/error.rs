use thiserror::Error;

/// Failure taxonomy for one provisioning invocation.
///
/// Everything a lifecycle handler can raise funnels through this enum; the
/// orchestrator boundary converts any variant into a FAILED result carrying
/// the display string as the reason. In hook mode the same errors are fatal
/// and terminate the process instead.
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("\"{0}\" missing in ResourceProperties")]
    MissingProperty(&'static str),
    #[error("\"{0}\" missing in lifecycle event")]
    MissingField(&'static str),
    #[error("{0} is not set in the environment")]
    MissingEnvironment(&'static str),
    #[error("invalid RequestType: {0}")]
    UnrecognizedRequest(String),
    #[error("provider request failed: {0}")]
    Provider(String),
    #[error("issuance subprocess failed: {0}")]
    Subprocess(String),
    #[error("certificate artifact unreadable: {0}")]
    ArtifactRead(String),
}
