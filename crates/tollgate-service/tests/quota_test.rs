//! Quota service behavior: idempotency, buffering, level precedence.

mod common;

use std::sync::Arc;

use common::InMemory;
use uuid::Uuid;

use tollgate_entity::api_key::QuotaPeriod;
use tollgate_entity::usage::RecordUsage;
use tollgate_service::quota::{QuotaLevel, QuotaService};

fn quota(store: &Arc<InMemory>) -> QuotaService {
    QuotaService::new(store.clone(), store.clone(), store.clone())
}

fn usage(tenant_id: Uuid, api_key_id: Option<Uuid>, quantity: i64, key: &str) -> RecordUsage {
    RecordUsage {
        tenant_id,
        api_key_id,
        user_id: None,
        service: "billing".into(),
        action: "convert".into(),
        quantity,
        idempotency_key: key.into(),
    }
}

#[tokio::test]
async fn replayed_idempotency_key_returns_original_event() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, None);
    let quota = quota(&store);

    let first = quota
        .record_usage(&usage(tenant.id, None, 3, "evt-1"))
        .await
        .unwrap();

    // Replay with a different quantity: the original row wins.
    let second = quota
        .record_usage(&usage(tenant.id, None, 999, "evt-1"))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity, 3);
    assert_eq!(store.total_recorded(tenant.id), 3);
}

#[tokio::test]
async fn recorded_usage_never_exceeds_buffered_limit() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, Some(100));
    let quota = quota(&store);

    // Effective limit is floor(100 * 0.99) = 99.
    let mut denials = 0;
    for i in 0..20 {
        let (check, event) = quota
            .check_and_record(&usage(tenant.id, None, 9, &format!("evt-{i}")), 0)
            .await
            .unwrap();
        if event.is_none() {
            assert!(!check.allowed);
            denials += 1;
        }
    }

    assert!(denials > 0);
    assert!(store.total_recorded(tenant.id) <= 99);
}

#[tokio::test]
async fn exactly_at_effective_limit_denies_any_further_quantity() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, Some(100));
    let quota = quota(&store);

    // Fill to exactly the effective limit of 99.
    quota
        .record_usage(&usage(tenant.id, None, 99, "fill"))
        .await
        .unwrap();

    let check = quota.check_quota(tenant.id, 1, None, 0).await.unwrap();
    assert!(!check.allowed);
    assert_eq!(check.remaining, 0);
    assert_eq!(check.level, QuotaLevel::Tenant);
}

#[tokio::test]
async fn key_level_limit_wins_over_tenant_headroom() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Enterprise, Some(1000));
    let key = store.seed_api_key(tenant.id, &["*"], Some(10), Some(QuotaPeriod::Hour));
    let quota = quota(&store);

    // Effective key limit is floor(10 * 0.99) = 9.
    quota
        .record_usage(&usage(tenant.id, Some(key.id), 9, "k-fill"))
        .await
        .unwrap();

    // Tenant-level headroom is plentiful, but the key limit is
    // authoritative and already exhausted.
    let check = quota
        .check_quota(tenant.id, 1, Some(key.id), 0)
        .await
        .unwrap();
    assert!(!check.allowed);
    assert_eq!(check.level, QuotaLevel::ApiKey);

    // The same tenant without the key is still wide open.
    let tenant_check = quota.check_quota(tenant.id, 1, None, 0).await.unwrap();
    assert!(tenant_check.allowed);
    assert_eq!(tenant_check.level, QuotaLevel::Tenant);
}

#[tokio::test]
async fn hourly_key_exhaustion_scenario() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, None);
    let key = store.seed_api_key(tenant.id, &["*"], Some(5), Some(QuotaPeriod::Hour));
    let quota = quota(&store);

    // 5 units across 3 idempotency keys.
    for (i, qty) in [2i64, 2, 1].iter().enumerate() {
        quota
            .record_usage(&usage(tenant.id, Some(key.id), *qty, &format!("h-{i}")))
            .await
            .unwrap();
    }

    // A further distinct-key call is denied with nothing remaining.
    let (check, event) = quota
        .check_and_record(&usage(tenant.id, Some(key.id), 1, "h-next"), 0)
        .await
        .unwrap();
    assert!(event.is_none());
    assert!(!check.allowed);
    assert_eq!(check.remaining, 0);
    assert_eq!(check.level, QuotaLevel::ApiKey);
}

#[tokio::test]
async fn unlimited_when_no_limit_configured_anywhere() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Free, None);
    let key = store.seed_api_key(tenant.id, &["*"], None, None);
    let quota = quota(&store);

    let check = quota
        .check_quota(tenant.id, 1_000_000, Some(key.id), 0)
        .await
        .unwrap();
    assert!(check.allowed);
    assert_eq!(check.level, QuotaLevel::Unlimited);
    assert_eq!(check.remaining, i64::MAX);
}

#[tokio::test]
async fn denial_writes_nothing() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Free, Some(10));
    let quota = quota(&store);

    let (check, event) = quota
        .check_and_record(&usage(tenant.id, None, 50, "too-big"), 0)
        .await
        .unwrap();

    assert!(!check.allowed);
    assert!(event.is_none());
    assert_eq!(store.total_recorded(tenant.id), 0);
}

#[tokio::test]
async fn allowed_recording_decrements_remaining_without_second_read() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, Some(100));
    let quota = quota(&store);

    let (check, event) = quota
        .check_and_record(&usage(tenant.id, None, 10, "first"), 0)
        .await
        .unwrap();

    assert!(event.is_some());
    // Effective 99, used 0 at check time, minus the just-recorded 10.
    assert_eq!(check.remaining, 89);
    assert_eq!(check.used, 10);
}

#[tokio::test]
async fn boost_applies_before_buffer() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, Some(100));
    let quota = quota(&store);

    // floor((100 + 100) * 0.99) = 198.
    let check = quota.check_quota(tenant.id, 198, None, 100).await.unwrap();
    assert!(check.allowed);
    assert_eq!(check.limit, Some(198));

    let over = quota.check_quota(tenant.id, 199, None, 100).await.unwrap();
    assert!(!over.allowed);
}

#[tokio::test]
async fn rejects_non_positive_quantity() {
    let store = Arc::new(InMemory::new());
    let tenant = store.seed_tenant(tollgate_entity::tenant::TenantTier::Pro, None);
    let quota = quota(&store);

    let err = quota
        .record_usage(&usage(tenant.id, None, 0, "zero"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, tollgate_core::error::ErrorKind::Validation);
}
