//! Usage recording and the two-level buffered quota check.

use std::sync::Arc;

use chrono::{DateTime, Datelike, DurationRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{ApiKeyStore, TenantStore, UsageStore};
use tollgate_entity::api_key::QuotaPeriod;
use tollgate_entity::usage::{RecordUsage, UsageEvent};

/// The buffer applied to every configured limit before comparison.
///
/// Check-then-record is deliberately not transactional; concurrent
/// writers can overshoot between the check and the write, and this
/// margin absorbs that overshoot.
const QUOTA_BUFFER: f64 = 0.99;

/// Which limit produced a quota decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaLevel {
    /// The API key's own limit. Authoritative whenever configured.
    ApiKey,
    /// The tenant's global monthly limit.
    Tenant,
    /// No limit configured anywhere.
    Unlimited,
}

/// Result of a quota check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaCheck {
    /// Whether the requested quantity fits.
    pub allowed: bool,
    /// Which limit decided.
    pub level: QuotaLevel,
    /// The buffered effective limit, if one applies.
    pub limit: Option<i64>,
    /// Usage already recorded in the current period.
    pub used: i64,
    /// Units still available under the effective limit.
    pub remaining: i64,
}

impl QuotaCheck {
    fn unlimited() -> Self {
        Self {
            allowed: true,
            level: QuotaLevel::Unlimited,
            limit: None,
            used: 0,
            remaining: i64::MAX,
        }
    }
}

/// Records usage events idempotently and enforces the two-level
/// (API key → tenant) buffered quota algorithm.
#[derive(Clone)]
pub struct QuotaService {
    usage: Arc<dyn UsageStore>,
    keys: Arc<dyn ApiKeyStore>,
    tenants: Arc<dyn TenantStore>,
}

impl std::fmt::Debug for QuotaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaService").finish()
    }
}

impl QuotaService {
    /// Create a new quota service.
    pub fn new(
        usage: Arc<dyn UsageStore>,
        keys: Arc<dyn ApiKeyStore>,
        tenants: Arc<dyn TenantStore>,
    ) -> Self {
        Self {
            usage,
            keys,
            tenants,
        }
    }

    /// Record a usage event idempotently.
    ///
    /// A replay of an already-recorded idempotency key returns the
    /// original event unchanged, regardless of the replayed quantity.
    pub async fn record_usage(&self, data: &RecordUsage) -> AppResult<UsageEvent> {
        if data.quantity <= 0 {
            return Err(AppError::validation("quantity must be positive"));
        }

        if let Some(existing) = self
            .usage
            .find_by_idempotency_key(&data.idempotency_key)
            .await?
        {
            debug!(
                idempotency_key = %data.idempotency_key,
                event_id = %existing.id,
                "Replay of recorded usage event"
            );
            return Ok(existing);
        }

        let bucket = self.bucket_for(data).await?;
        self.usage.insert(data, &bucket).await
    }

    /// The two-level quota check.
    ///
    /// 1. A key-level limit, when configured, is authoritative: it is
    ///    the more restrictive policy and always wins, allowed or not.
    /// 2. Otherwise the tenant's global limit applies, always monthly.
    /// 3. With neither configured, the result is unlimited.
    ///
    /// `boost` is additive headroom from overrides, applied to the
    /// tenant's base limit before buffering. Key-level limits are key
    /// configuration, not plan limits, so boosts do not touch them.
    pub async fn check_quota(
        &self,
        tenant_id: Uuid,
        quantity: i64,
        api_key_id: Option<Uuid>,
        boost: i64,
    ) -> AppResult<QuotaCheck> {
        let now = Utc::now();

        if let Some(key_id) = api_key_id {
            let key = self
                .keys
                .find_by_id(key_id)
                .await?
                .filter(|k| k.tenant_id == tenant_id)
                .ok_or_else(|| AppError::not_found("API key not found"))?;

            if let (Some(limit), Some(period)) = (key.quota_limit, key.quota_period) {
                let since = period_start(period, now);
                let used = self.usage.sum_for_api_key(key.id, since).await?;
                return Ok(evaluate(QuotaLevel::ApiKey, limit, used, quantity));
            }
        }

        let tenant = self
            .tenants
            .find_by_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found("Tenant not found"))?;

        match tenant.global_quota_limit {
            Some(limit) => {
                let since = period_start(QuotaPeriod::Month, now);
                let used = self.usage.sum_for_tenant(tenant_id, since).await?;
                Ok(evaluate(
                    QuotaLevel::Tenant,
                    limit.saturating_add(boost),
                    used,
                    quantity,
                ))
            }
            None => Ok(QuotaCheck::unlimited()),
        }
    }

    /// Check, then record if allowed.
    ///
    /// On denial nothing is written. On success the returned `remaining`
    /// already reflects the just-recorded quantity without a second read.
    /// The check and the write are not one transaction; the race window
    /// this opens is bounded by the buffer.
    pub async fn check_and_record(
        &self,
        data: &RecordUsage,
        boost: i64,
    ) -> AppResult<(QuotaCheck, Option<UsageEvent>)> {
        let mut check = self
            .check_quota(data.tenant_id, data.quantity, data.api_key_id, boost)
            .await?;

        if !check.allowed {
            info!(
                tenant_id = %data.tenant_id,
                api_key_id = ?data.api_key_id,
                level = ?check.level,
                remaining = check.remaining,
                "Usage denied by quota"
            );
            return Ok((check, None));
        }

        let event = self.record_usage(data).await?;
        check.used = check.used.saturating_add(data.quantity);
        check.remaining = (check.remaining.saturating_sub(data.quantity)).max(0);

        Ok((check, Some(event)))
    }

    /// The bucket label a new event is tagged with: the key's own period
    /// when a key with a configured period is involved, monthly otherwise.
    async fn bucket_for(&self, data: &RecordUsage) -> AppResult<String> {
        let now = Utc::now();

        if let Some(key_id) = data.api_key_id {
            if let Some(key) = self.keys.find_by_id(key_id).await? {
                if let Some(period) = key.quota_period {
                    return Ok(period.bucket_label(now));
                }
            }
        }

        Ok(QuotaPeriod::Month.bucket_label(now))
    }
}

/// Apply the buffer and compare.
fn evaluate(level: QuotaLevel, limit: i64, used: i64, quantity: i64) -> QuotaCheck {
    let effective = buffered_limit(limit);
    QuotaCheck {
        allowed: used.saturating_add(quantity) <= effective,
        level,
        limit: Some(effective),
        used,
        remaining: (effective - used).max(0),
    }
}

/// `floor(limit * 0.99)`.
fn buffered_limit(limit: i64) -> i64 {
    ((limit as f64) * QUOTA_BUFFER).floor() as i64
}

/// Start of the period bucket containing `now`, in UTC.
fn period_start(period: QuotaPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        QuotaPeriod::Hour => now
            .duration_trunc(chrono::Duration::hours(1))
            .unwrap_or(now),
        QuotaPeriod::Day => now.duration_trunc(chrono::Duration::days(1)).unwrap_or(now),
        QuotaPeriod::Month => Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now),
    }
}
