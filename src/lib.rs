pub mod binding;
pub mod config;
pub mod dns;
pub mod domain;
pub mod error;
pub mod issuance;
pub mod lifecycle;

use std::io::Read;

use anyhow::Context;
use aws_config::BehaviorVersion;
use log::info;

use binding::ApiGatewayAdapter;
use config::Settings;
use dns::hook::HookContext;
use dns::Route53Adapter;
use issuance::CertbotIssuer;
use lifecycle::{CallbackReporter, InvocationContext, LifecycleEvent, Orchestrator};

/// Lifecycle mode: read one event from stdin, drive the orchestrator, and
/// report the outcome to the stack's callback endpoint. The only error that
/// can escape is a malformed event; before parsing there is no callback
/// target to report to.
pub async fn run_lifecycle(settings: Settings) -> anyhow::Result<()> {
    let mut raw = String::new();
    std::io::stdin()
        .read_to_string(&mut raw)
        .context("reading lifecycle event from stdin")?;
    info!("[lifecycle] RECEIVED EVENT: {}", raw.trim());

    let event: LifecycleEvent =
        serde_json::from_str(&raw).context("parsing lifecycle event")?;

    let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let http = reqwest::Client::new();
    let dns = Route53Adapter::new(
        aws_sdk_route53::Client::new(&aws),
        http.clone(),
        settings.propagation_timeout,
        settings.propagation_poll,
    );
    let issuer = CertbotIssuer::new(settings.clone());
    let bindings = ApiGatewayAdapter::new(aws_sdk_apigateway::Client::new(&aws));

    let ctx = InvocationContext::new(settings.log_stream_name.as_deref());
    let orchestrator = Orchestrator::new(dns, issuer, bindings, settings);

    let result = orchestrator.handle(&event, &ctx).await;
    let envelope = lifecycle::finish(&event, result);
    CallbackReporter::new(http)
        .report(event.response_url.as_deref(), &envelope)
        .await;
    Ok(())
}

/// Hook mode: run one validation-hook round to completion. Any error aborts
/// the process with a non-zero status, which is the only failure channel the
/// calling issuance subprocess observes.
pub async fn run_challenge_hook(settings: Settings, ctx: HookContext) -> anyhow::Result<()> {
    let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;
    let dns = Route53Adapter::new(
        aws_sdk_route53::Client::new(&aws),
        reqwest::Client::new(),
        settings.propagation_timeout,
        settings.propagation_poll,
    );
    dns::hook::run(&dns, &ctx)
        .await
        .context("challenge hook failed")
}
