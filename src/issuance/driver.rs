use std::env;
use std::path::{Path, PathBuf};

use log::{error, info};
use tokio::process::Command;

use crate::config::Settings;
use crate::error::ProvisionError;
use crate::issuance::{CertificateIssuer, IssuanceRequest, IssuedArtifacts};

/// Drives the external issuance CLI through one DNS-01 validation round.
///
/// The subprocess contract is an external interface, not an implementation
/// detail: the tool's stdio passes through unmodified for operator
/// visibility, only the exit status is interpreted, and on success the issued
/// artifacts are read back from `<scratch>/live/<domain>/{cert,chain,privkey}.pem`.
pub struct CertbotIssuer {
    settings: Settings,
}

impl CertbotIssuer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// The hook command handed to the subprocess for both the publish and
    /// cleanup phases. The subprocess tells the phases apart through the
    /// environment it sets, so one command serves both flags.
    fn hook_command(&self, hosted_zone_id: &str) -> Result<String, ProvisionError> {
        let exe = env::current_exe().map_err(|err| {
            ProvisionError::Subprocess(format!("could not resolve hook executable path: {err}"))
        })?;
        Ok(format!("{} {hosted_zone_id}", exe.display()))
    }

    fn live_dir(&self, domain_name: &str) -> PathBuf {
        self.settings.scratch_dir.join("live").join(domain_name)
    }
}

impl CertificateIssuer for CertbotIssuer {
    async fn issue(&self, request: &IssuanceRequest) -> Result<IssuedArtifacts, ProvisionError> {
        let hook = self.hook_command(&request.hosted_zone_id)?;
        let scratch = &self.settings.scratch_dir;

        let mut command = Command::new(&self.settings.certbot_path);
        command
            .arg("certonly")
            .arg("--non-interactive")
            .arg("--manual")
            .args(["--manual-auth-hook", hook.as_str()])
            .args(["--manual-cleanup-hook", hook.as_str()])
            .args(["--preferred-challenges", "dns"])
            .arg("--config-dir")
            .arg(scratch)
            .arg("--work-dir")
            .arg(scratch)
            .arg("--logs-dir")
            .arg(scratch)
            .arg("--agree-tos")
            .args(["--email", request.email_address.as_str()])
            .args(["--domains", request.domain_name.as_str()]);

        info!(
            "[certbot] invoking {} for {}",
            self.settings.certbot_path.display(),
            request.domain_name
        );

        // stdio stays inherited: the tool's own output is the operator's
        // window into the validation round.
        let status = command.status().await.map_err(|err| {
            ProvisionError::Subprocess(format!(
                "failed to launch {}: {err}",
                self.settings.certbot_path.display()
            ))
        })?;

        if !status.success() {
            error!("[certbot] exited with {status}");
            return Err(ProvisionError::Subprocess(format!(
                "issuance tool exited with {status}"
            )));
        }

        read_artifacts(&self.live_dir(&request.domain_name)).await
    }
}

/// Reads the three issued PEM files concurrently. The first failure cancels
/// the join; partial artifacts never escape.
pub async fn read_artifacts(live_dir: &Path) -> Result<IssuedArtifacts, ProvisionError> {
    let (certificate_body, certificate_chain, private_key) = tokio::try_join!(
        read_pem(live_dir.join("cert.pem")),
        read_pem(live_dir.join("chain.pem")),
        read_pem(live_dir.join("privkey.pem")),
    )?;

    Ok(IssuedArtifacts {
        certificate_body,
        certificate_chain,
        private_key,
    })
}

async fn read_pem(path: PathBuf) -> Result<String, ProvisionError> {
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| ProvisionError::ArtifactRead(format!("{}: {err}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scratch_settings(dir: &Path) -> Settings {
        Settings {
            email_address: Some("ops@example.com".into()),
            certbot_path: PathBuf::from("/nonexistent/certbot"),
            scratch_dir: dir.to_path_buf(),
            propagation_timeout: Duration::from_secs(1),
            propagation_poll: Duration::from_secs(1),
            log_stream_name: None,
        }
    }

    fn unique_scratch() -> PathBuf {
        env::temp_dir().join(format!("certgate-test-{}", uuid::Uuid::new_v4().as_simple()))
    }

    #[tokio::test]
    async fn harvests_all_three_artifacts() {
        let scratch = unique_scratch();
        let live = scratch.join("live").join("api.example.com");
        tokio::fs::create_dir_all(&live).await.unwrap();
        for (name, contents) in [("cert.pem", "CERT"), ("chain.pem", "CHAIN"), ("privkey.pem", "KEY")]
        {
            tokio::fs::write(live.join(name), contents).await.unwrap();
        }

        let artifacts = read_artifacts(&live).await.unwrap();
        assert_eq!(artifacts.certificate_body, "CERT");
        assert_eq!(artifacts.certificate_chain, "CHAIN");
        assert_eq!(artifacts.private_key, "KEY");

        tokio::fs::remove_dir_all(&scratch).await.unwrap();
    }

    #[tokio::test]
    async fn one_missing_artifact_fails_the_harvest() {
        let scratch = unique_scratch();
        let live = scratch.join("live").join("api.example.com");
        tokio::fs::create_dir_all(&live).await.unwrap();
        tokio::fs::write(live.join("cert.pem"), "CERT").await.unwrap();
        tokio::fs::write(live.join("chain.pem"), "CHAIN").await.unwrap();
        // privkey.pem intentionally absent

        let err = read_artifacts(&live).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ArtifactRead(_)));
        assert!(err.to_string().contains("privkey.pem"));

        tokio::fs::remove_dir_all(&scratch).await.unwrap();
    }

    #[tokio::test]
    async fn launch_failure_is_a_subprocess_error() {
        let scratch = unique_scratch();
        let issuer = CertbotIssuer::new(scratch_settings(&scratch));
        let request = IssuanceRequest {
            domain_name: "api.example.com".into(),
            hosted_zone_id: "Z1".into(),
            email_address: "ops@example.com".into(),
        };
        let err = issuer.issue(&request).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Subprocess(_)));
    }
}
