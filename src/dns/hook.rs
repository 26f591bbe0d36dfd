use std::env;

use log::info;

use crate::dns::{ChallengeDns, ChallengeRecord};
use crate::error::ProvisionError;

/// Validation context the issuance subprocess supplies to its hook: the
/// domain and token arrive through the environment, the zone id as the
/// positional argument baked into the hook command line. The presence of the
/// auth-output variable marks the cleanup phase.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub hosted_zone_id: String,
    pub domain: String,
    pub token: String,
    pub cleanup: bool,
}

impl HookContext {
    pub fn new(hosted_zone_id: String, domain: String, token: String, cleanup: bool) -> Self {
        Self {
            hosted_zone_id,
            domain,
            token,
            cleanup,
        }
    }

    /// Reads the hook context from the process environment. Returns
    /// `Ok(None)` when the validation domain is absent, which means the
    /// binary was not invoked as a hook at all.
    pub fn from_env(
        mut args: impl Iterator<Item = String>,
    ) -> Result<Option<Self>, ProvisionError> {
        let Ok(domain) = env::var("CERTBOT_DOMAIN") else {
            return Ok(None);
        };
        let token = env::var("CERTBOT_VALIDATION")
            .map_err(|_| ProvisionError::MissingEnvironment("CERTBOT_VALIDATION"))?;
        let hosted_zone_id = args
            .nth(1)
            .filter(|arg| !arg.is_empty())
            .ok_or(ProvisionError::MissingField("hosted zone id argument"))?;
        let cleanup = env::var_os("CERTBOT_AUTH_OUTPUT").is_some();
        Ok(Some(Self::new(hosted_zone_id, domain, token, cleanup)))
    }

    pub fn record(&self) -> ChallengeRecord {
        ChallengeRecord::new(&self.domain, &self.token)
    }
}

/// One hook invocation: publish the challenge record and block until it is
/// live, or withdraw it and return immediately. Errors are fatal to the
/// process; the calling subprocess only sees the exit status.
pub async fn run(dns: &impl ChallengeDns, ctx: &HookContext) -> Result<(), ProvisionError> {
    let record = ctx.record();

    if ctx.cleanup {
        info!("[hook] withdrawing {} for {}", record.name, ctx.domain);
        // Deletion is not gated on propagation; a lingering negative record
        // is harmless to the validator.
        dns.delete_txt(&ctx.hosted_zone_id, &record).await?;
        return Ok(());
    }

    info!("[hook] publishing {} for {}", record.name, ctx.domain);
    let change = dns.upsert_txt(&ctx.hosted_zone_id, &record).await?;
    // The validator queries DNS as soon as this process exits; the wait is
    // the synchronization point that makes that safe.
    dns.wait_propagated(&change, &record).await?;
    info!("[hook] {} is live", record.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::ChangeRef;
    use std::sync::Mutex;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Upsert(String, String),
        Delete(String, String),
        Wait(String),
    }

    #[derive(Default)]
    struct RecordingDns {
        calls: Mutex<Vec<Call>>,
    }

    impl ChallengeDns for RecordingDns {
        async fn upsert_txt(
            &self,
            hosted_zone_id: &str,
            record: &ChallengeRecord,
        ) -> Result<ChangeRef, ProvisionError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Upsert(hosted_zone_id.into(), record.name.clone()));
            Ok(ChangeRef("change-1".into()))
        }

        async fn delete_txt(
            &self,
            hosted_zone_id: &str,
            record: &ChallengeRecord,
        ) -> Result<(), ProvisionError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Delete(hosted_zone_id.into(), record.name.clone()));
            Ok(())
        }

        async fn wait_propagated(
            &self,
            change: &ChangeRef,
            _record: &ChallengeRecord,
        ) -> Result<(), ProvisionError> {
            self.calls.lock().unwrap().push(Call::Wait(change.0.clone()));
            Ok(())
        }
    }

    fn publish_ctx() -> HookContext {
        HookContext::new("Z1".into(), "api.example.com".into(), "abc123".into(), false)
    }

    #[tokio::test]
    async fn publish_upserts_then_waits() {
        let dns = RecordingDns::default();
        run(&dns, &publish_ctx()).await.unwrap();
        let calls = dns.calls.into_inner().unwrap();
        assert_eq!(
            calls,
            vec![
                Call::Upsert("Z1".into(), "_acme-challenge.api.example.com".into()),
                Call::Wait("change-1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn cleanup_deletes_without_waiting() {
        let dns = RecordingDns::default();
        let mut ctx = publish_ctx();
        ctx.cleanup = true;
        run(&dns, &ctx).await.unwrap();
        let calls = dns.calls.into_inner().unwrap();
        assert_eq!(
            calls,
            vec![Call::Delete("Z1".into(), "_acme-challenge.api.example.com".into())]
        );
    }

    #[test]
    fn context_builds_quoted_challenge_record() {
        let record = publish_ctx().record();
        assert_eq!(record.name, "_acme-challenge.api.example.com");
        assert_eq!(record.value, "\"abc123\"");
    }
}
