//! TTL, clock injection, and stale eviction.

use std::sync::Arc;
use std::time::Duration;

use gather_resilience_cache::{MemoryBackend, ResearchCache, DEFAULT_RESEARCH_TTL};
use gather_resilience_core::{Clock, ManualClock};

fn cache(ttl: Duration) -> (ResearchCache<String>, Arc<ManualClock>, Arc<MemoryBackend<String>>) {
    let clock = Arc::new(ManualClock::default());
    let backend = Arc::new(MemoryBackend::new());
    let cache = ResearchCache::builder()
        .backend(backend.clone())
        .clock(clock.clone())
        .default_ttl(ttl)
        .build();
    (cache, clock, backend)
}

#[test]
fn default_ttl_is_one_week() {
    assert_eq!(DEFAULT_RESEARCH_TTL, Duration::from_secs(7 * 24 * 60 * 60));
    let plain: ResearchCache<String> = ResearchCache::new(Arc::new(MemoryBackend::new()));
    assert_eq!(plain.default_ttl(), DEFAULT_RESEARCH_TTL);
}

#[test]
fn entry_stays_fresh_until_the_boundary() {
    let (cache, clock, _backend) = cache(Duration::from_secs(100));
    cache.put("acme", "notes".to_string(), vec![]).unwrap();

    clock.advance(Duration::from_secs(99));
    assert!(cache.get("acme").is_some());

    clock.advance(Duration::from_secs(1));
    // now == expires_at counts as stale.
    assert!(cache.get("acme").is_none());
}

#[test]
fn stale_read_purges_the_backend() {
    let (cache, clock, backend) = cache(Duration::from_secs(10));
    cache.put("acme", "notes".to_string(), vec![]).unwrap();
    assert_eq!(backend.len(), 1);

    clock.advance(Duration::from_secs(11));
    assert!(cache.get("acme").is_none());
    assert!(backend.is_empty());
}

#[test]
fn explicit_ttl_overrides_the_default() {
    let (cache, clock, _backend) = cache(Duration::from_secs(1000));
    cache
        .put_with_ttl("acme", "notes".to_string(), Duration::from_secs(5), vec![])
        .unwrap();

    clock.advance(Duration::from_secs(6));
    assert!(cache.get("acme").is_none());
}

#[test]
fn entry_records_provenance_and_timestamps() {
    let (cache, clock, _backend) = cache(Duration::from_secs(60));
    let fetched_at = clock.now();
    cache
        .put("acme", "notes".to_string(), vec!["research".into(), "crm".into()])
        .unwrap();

    let entry = cache.get("acme").unwrap();
    assert_eq!(entry.fetched_at, fetched_at);
    assert_eq!(entry.expires_at, fetched_at + Duration::from_secs(60));
    assert_eq!(entry.ttl, Duration::from_secs(60));
    assert_eq!(entry.sources_used, vec!["research".to_string(), "crm".to_string()]);
}

#[test]
fn rewrite_restarts_the_ttl() {
    let (cache, clock, _backend) = cache(Duration::from_secs(10));
    cache.put("acme", "old".to_string(), vec![]).unwrap();

    clock.advance(Duration::from_secs(8));
    cache.put("acme", "new".to_string(), vec![]).unwrap();

    clock.advance(Duration::from_secs(8));
    assert_eq!(cache.get("acme").unwrap().value, "new");
}
