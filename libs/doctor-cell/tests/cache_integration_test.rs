// libs/doctor-cell/tests/cache_integration_test.rs
//
// Live cache tests against a local Redis. Only run when
// RUN_REDIS_TESTS=true; everything else in the suite covers the
// disabled-cache paths.

use serde_json::json;

use doctor_cell::services::AvailabilityCache;
use shared_models::DoctorId;

fn should_run_redis_tests() -> bool {
    std::env::var("RUN_REDIS_TESTS").unwrap_or_default() == "true"
}

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
}

#[tokio::test]
async fn test_put_get_invalidate_round_trip() {
    if !should_run_redis_tests() {
        println!("Skipping Redis cache tests (set RUN_REDIS_TESTS=true to enable)");
        return;
    }

    let cache = AvailabilityCache::connect(Some(&redis_url())).await;
    assert!(cache.is_enabled());

    let doctor_id = DoctorId::new();
    let key = AvailabilityCache::doctor_availability_key(&doctor_id);
    let value = json!({
        "doctor_id": doctor_id.to_string(),
        "availability_start": "09:00",
        "availability_end": "17:00",
        "days_available": ["monday"]
    });

    cache.put_json(&key, &value).await;
    let cached = cache.get_json(&key).await;
    assert_eq!(cached, Some(value));

    cache
        .invalidate_doctor(&doctor_id)
        .await
        .expect("invalidation against a live Redis succeeds");
    assert_eq!(cache.get_json(&key).await, None);
}

#[tokio::test]
async fn test_invalidate_clears_both_snapshots() {
    if !should_run_redis_tests() {
        println!("Skipping Redis cache tests (set RUN_REDIS_TESTS=true to enable)");
        return;
    }

    let cache = AvailabilityCache::connect(Some(&redis_url())).await;
    let doctor_id = DoctorId::new();

    let availability_key = AvailabilityCache::doctor_availability_key(&doctor_id);
    let details_key = AvailabilityCache::doctor_details_key(&doctor_id);
    cache.put_json(&availability_key, &json!({"window": "a"})).await;
    cache.put_json(&details_key, &json!({"profile": "b"})).await;

    cache
        .invalidate_doctor(&doctor_id)
        .await
        .expect("invalidation against a live Redis succeeds");

    assert_eq!(cache.get_json(&availability_key).await, None);
    assert_eq!(cache.get_json(&details_key).await, None);
}

#[tokio::test]
async fn test_disabled_cache_is_inert() {
    let cache = AvailabilityCache::disabled();
    assert!(!cache.is_enabled());

    let doctor_id = DoctorId::new();
    let key = AvailabilityCache::doctor_availability_key(&doctor_id);

    cache.put_json(&key, &json!({"window": "a"})).await;
    assert_eq!(cache.get_json(&key).await, None);

    // Without a pool there is nothing to invalidate and nothing to fail
    assert!(cache.invalidate_doctor(&doctor_id).await.is_ok());
}
