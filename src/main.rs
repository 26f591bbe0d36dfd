use certgate::config::Settings;
use certgate::dns::hook::HookContext;
use certgate::{run_challenge_hook, run_lifecycle};

/// Thin dispatcher between the two execution modes: validation-hook context
/// in the environment means the issuance subprocess re-invoked this binary
/// as its DNS hook; otherwise one lifecycle event is handled.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let settings = Settings::from_env();

    match HookContext::from_env(std::env::args())? {
        Some(ctx) => run_challenge_hook(settings, ctx).await,
        None => run_lifecycle(settings).await,
    }
}
