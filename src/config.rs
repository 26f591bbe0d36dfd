use std::env;
use std::path::PathBuf;
use std::time::Duration;

use log::warn;

const DEFAULT_PROPAGATION_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PROPAGATION_POLL_SECS: u64 = 5;
const DEFAULT_CERTBOT_PATH: &str = "certbot";
const DEFAULT_SCRATCH_DIR: &str = "/tmp";

/// Environment-derived settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// ACME contact email, required for Create handling.
    pub email_address: Option<String>,
    /// Path to the issuance CLI binary.
    pub certbot_path: PathBuf,
    /// Root for the subprocess's config/work/logs directories and the
    /// harvested `live/<domain>` artifact tree.
    pub scratch_dir: PathBuf,
    /// Deadline for the whole DNS propagation wait.
    pub propagation_timeout: Duration,
    /// Interval between propagation polls.
    pub propagation_poll: Duration,
    /// Operator-facing log stream name; used as the physical resource id
    /// when present.
    pub log_stream_name: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            email_address: non_empty_var("EMAIL_ADDRESS"),
            certbot_path: PathBuf::from(
                non_empty_var("CERTBOT_PATH").unwrap_or_else(|| DEFAULT_CERTBOT_PATH.to_string()),
            ),
            scratch_dir: PathBuf::from(
                non_empty_var("CERTGATE_SCRATCH_DIR")
                    .unwrap_or_else(|| DEFAULT_SCRATCH_DIR.to_string()),
            ),
            propagation_timeout: duration_var(
                "PROPAGATION_TIMEOUT_SECS",
                DEFAULT_PROPAGATION_TIMEOUT_SECS,
            ),
            propagation_poll: duration_var("PROPAGATION_POLL_SECS", DEFAULT_PROPAGATION_POLL_SECS),
            log_stream_name: non_empty_var("LOG_STREAM_NAME"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn duration_var(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(default_secs);
    if secs == 0 {
        warn!("[config] invalid {name} value; using default");
        return Duration::from_secs(default_secs);
    }
    Duration::from_secs(secs)
}
