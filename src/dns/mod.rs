pub mod hook;
pub mod propagation;
pub mod route53;

pub use route53::Route53Adapter;

use crate::error::ProvisionError;

/// TTL for validation records; they live for one validation round only.
pub const CHALLENGE_RECORD_TTL: i64 = 30;

/// The TXT record published to prove control of a domain. Exists only for
/// the duration of one validation round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeRecord {
    /// Fully qualified record name, `_acme-challenge.<domain>`.
    pub name: String,
    /// Wire-quoted validation token.
    pub value: String,
    pub ttl: i64,
}

impl ChallengeRecord {
    pub fn new(domain: &str, token: &str) -> Self {
        Self {
            name: record_name(domain),
            value: quote_txt_value(token),
            ttl: CHALLENGE_RECORD_TTL,
        }
    }
}

/// Opaque handle for a submitted record change, used to poll its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRef(pub String);

/// The DNS record controller consumed by the challenge hook: publish or
/// withdraw a TXT record, and block until a change is observably live.
pub trait ChallengeDns {
    /// Create-or-replace the record; returns a handle for the propagation wait.
    async fn upsert_txt(
        &self,
        hosted_zone_id: &str,
        record: &ChallengeRecord,
    ) -> Result<ChangeRef, ProvisionError>;

    /// Withdraws the record. Callers may treat this as fire-and-forget; a
    /// stale negative record is harmless.
    async fn delete_txt(
        &self,
        hosted_zone_id: &str,
        record: &ChallengeRecord,
    ) -> Result<(), ProvisionError>;

    /// Blocks until the submitted change is observably propagated, or fails
    /// once the configured deadline expires.
    async fn wait_propagated(
        &self,
        change: &ChangeRef,
        record: &ChallengeRecord,
    ) -> Result<(), ProvisionError>;
}

/// Hosted-zone metadata lookup consumed by the Create handler.
pub trait HostedZones {
    /// The zone's apex name, without the trailing dot.
    async fn zone_apex(&self, hosted_zone_id: &str) -> Result<String, ProvisionError>;
}

pub fn record_name(domain: &str) -> String {
    let trimmed = domain.trim_end_matches('.');
    if trimmed.starts_with("_acme-challenge.") {
        trimmed.to_string()
    } else {
        format!("_acme-challenge.{trimmed}")
    }
}

/// TXT record values travel wire-quoted; quoting is applied exactly once.
pub fn quote_txt_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed.to_string()
    } else {
        format!("\"{}\"", trimmed.trim_matches('"'))
    }
}
