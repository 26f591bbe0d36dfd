use std::time::{Duration, Instant};

use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ChangeStatus, ResourceRecord, ResourceRecordSet, RrType,
};
use log::{debug, info, warn};
use tokio::time::sleep;

use crate::dns::propagation::{self, RecordVisibility};
use crate::dns::{ChallengeDns, ChallengeRecord, ChangeRef, HostedZones};
use crate::error::ProvisionError;

/// Route 53 implementation of the DNS record controller.
///
/// The SDK client is constructed by the caller and injected so tests and
/// alternate deployments can substitute their own handles.
pub struct Route53Adapter {
    client: aws_sdk_route53::Client,
    http: reqwest::Client,
    propagation_timeout: Duration,
    propagation_poll: Duration,
}

impl Route53Adapter {
    pub fn new(
        client: aws_sdk_route53::Client,
        http: reqwest::Client,
        propagation_timeout: Duration,
        propagation_poll: Duration,
    ) -> Self {
        Self {
            client,
            http,
            propagation_timeout,
            propagation_poll,
        }
    }

    fn record_set(record: &ChallengeRecord) -> Result<ResourceRecordSet, ProvisionError> {
        let value = ResourceRecord::builder()
            .value(&record.value)
            .build()
            .map_err(|err| ProvisionError::Provider(format!("building ResourceRecord: {err}")))?;
        ResourceRecordSet::builder()
            .name(&record.name)
            .r#type(RrType::Txt)
            .ttl(record.ttl)
            .resource_records(value)
            .build()
            .map_err(|err| ProvisionError::Provider(format!("building ResourceRecordSet: {err}")))
    }

    async fn submit_change(
        &self,
        hosted_zone_id: &str,
        action: ChangeAction,
        record: &ChallengeRecord,
    ) -> Result<ChangeRef, ProvisionError> {
        let change = Change::builder()
            .action(action)
            .resource_record_set(Self::record_set(record)?)
            .build()
            .map_err(|err| ProvisionError::Provider(format!("building Change: {err}")))?;
        let batch = ChangeBatch::builder()
            .changes(change)
            .build()
            .map_err(|err| ProvisionError::Provider(format!("building ChangeBatch: {err}")))?;

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|err| {
                ProvisionError::Provider(format!(
                    "changing record set for {}: {}",
                    record.name,
                    err.into_service_error()
                ))
            })?;

        let change_id = output
            .change_info()
            .map(|info| info.id().to_string())
            .ok_or_else(|| {
                ProvisionError::Provider("record change response carried no change info".into())
            })?;
        Ok(ChangeRef(change_id))
    }

    /// Polls `GetChange` until the zone change reaches INSYNC or the deadline
    /// passes.
    async fn await_change_insync(
        &self,
        change: &ChangeRef,
        deadline: Instant,
    ) -> Result<(), ProvisionError> {
        loop {
            let output = self
                .client
                .get_change()
                .id(&change.0)
                .send()
                .await
                .map_err(|err| {
                    ProvisionError::Provider(format!(
                        "polling change {}: {}",
                        change.0,
                        err.into_service_error()
                    ))
                })?;

            let synced = output
                .change_info()
                .is_some_and(|info| info.status() == &ChangeStatus::Insync);
            if synced {
                debug!("[dns] change {} is INSYNC", change.0);
                return Ok(());
            }

            if Instant::now() + self.propagation_poll >= deadline {
                return Err(ProvisionError::Provider(format!(
                    "zone change {} did not reach INSYNC within {}s",
                    change.0,
                    self.propagation_timeout.as_secs()
                )));
            }
            sleep(self.propagation_poll).await;
        }
    }

    /// Polls public resolvers until the record is visible or the deadline
    /// passes. A wrong value keeps the wait alive: the upsert replaces the
    /// record, so resolvers serving stale content simply have not caught up.
    async fn await_resolver_visibility(
        &self,
        record: &ChallengeRecord,
        deadline: Instant,
    ) -> Result<(), ProvisionError> {
        loop {
            match propagation::check_record(&self.http, &record.name, &record.value).await {
                RecordVisibility::Found => {
                    info!("[dns] {} is visible to public resolvers", record.name);
                    return Ok(());
                }
                state => {
                    if state == RecordVisibility::WrongContent {
                        warn!("[dns] {} currently serves a different value", record.name);
                    }
                    if Instant::now() + self.propagation_poll >= deadline {
                        return Err(ProvisionError::Provider(format!(
                            "record {} was not visible to resolvers within {}s (last state: {state:?})",
                            record.name,
                            self.propagation_timeout.as_secs()
                        )));
                    }
                    debug!("[dns] {} not visible yet ({state:?})", record.name);
                    sleep(self.propagation_poll).await;
                }
            }
        }
    }
}

impl ChallengeDns for Route53Adapter {
    async fn upsert_txt(
        &self,
        hosted_zone_id: &str,
        record: &ChallengeRecord,
    ) -> Result<ChangeRef, ProvisionError> {
        info!("[dns] upserting {} in zone {hosted_zone_id}", record.name);
        self.submit_change(hosted_zone_id, ChangeAction::Upsert, record)
            .await
    }

    async fn delete_txt(
        &self,
        hosted_zone_id: &str,
        record: &ChallengeRecord,
    ) -> Result<(), ProvisionError> {
        info!("[dns] deleting {} from zone {hosted_zone_id}", record.name);
        self.submit_change(hosted_zone_id, ChangeAction::Delete, record)
            .await
            .map(|_| ())
    }

    async fn wait_propagated(
        &self,
        change: &ChangeRef,
        record: &ChallengeRecord,
    ) -> Result<(), ProvisionError> {
        let deadline = Instant::now() + self.propagation_timeout;
        self.await_change_insync(change, deadline).await?;
        self.await_resolver_visibility(record, deadline).await
    }
}

impl HostedZones for Route53Adapter {
    async fn zone_apex(&self, hosted_zone_id: &str) -> Result<String, ProvisionError> {
        let output = self
            .client
            .get_hosted_zone()
            .id(hosted_zone_id)
            .send()
            .await
            .map_err(|err| {
                ProvisionError::Provider(format!(
                    "looking up hosted zone {hosted_zone_id}: {}",
                    err.into_service_error()
                ))
            })?;

        let zone = output.hosted_zone().ok_or_else(|| {
            ProvisionError::Provider(format!("hosted zone {hosted_zone_id} has no metadata"))
        })?;
        Ok(zone.name().trim_end_matches('.').to_string())
    }
}
