//! Cache-aside binding: hit shadowing and write-through.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gather_resilience_cache::{CacheBackend, CacheEntry, CacheError, MemoryBackend, ResearchCache};
use gather_resilience_core::{ManualClock, SourceKind};
use gather_resilience_fanout::{Fanout, GatherStatus, SourceOperation, CACHE_SOURCE};

fn research_fetch(counter: Arc<AtomicUsize>) -> SourceOperation<String> {
    SourceOperation::new("research", SourceKind::Research, async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, String>(Some("fresh research".to_string()))
    })
}

#[tokio::test]
async fn second_gather_is_served_from_cache() {
    let cache: ResearchCache<String> = ResearchCache::new(Arc::new(MemoryBackend::new()));
    let fetches = Arc::new(AtomicUsize::new(0));

    let fanout: Fanout<String> = Fanout::builder()
        .cache_source("research", "Acme, Inc.", cache)
        .build();

    let first = fanout
        .gather(vec![research_fetch(Arc::clone(&fetches))])
        .await
        .unwrap();
    assert_eq!(first.status, GatherStatus::Complete);
    assert_eq!(first.sources_used, vec!["research".to_string()]);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    let second = fanout
        .gather(vec![research_fetch(Arc::clone(&fetches))])
        .await
        .unwrap();
    assert_eq!(second.status, GatherStatus::Complete);
    assert_eq!(second.value("research").unwrap(), "fresh research");
    assert_eq!(second.sources_used, vec![CACHE_SOURCE.to_string()]);
    assert_eq!(fetches.load(Ordering::SeqCst), 1, "hit must shadow the fetch");
}

#[tokio::test]
async fn expired_entry_falls_back_to_the_fetch() {
    let clock = Arc::new(ManualClock::default());
    let cache: ResearchCache<String> = ResearchCache::builder()
        .backend(Arc::new(MemoryBackend::new()))
        .clock(clock.clone())
        .default_ttl(Duration::from_secs(60))
        .build();
    cache
        .put("acme", "stale research".to_string(), vec!["research".into()])
        .unwrap();
    clock.advance(Duration::from_secs(61));

    let fetches = Arc::new(AtomicUsize::new(0));
    let fanout: Fanout<String> = Fanout::builder()
        .cache_source("research", "acme", cache.clone())
        .build();

    let report = fanout
        .gather(vec![research_fetch(Arc::clone(&fetches))])
        .await
        .unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(report.value("research").unwrap(), "fresh research");
    // The fetched value replaced the stale entry.
    assert_eq!(cache.get("acme").unwrap().value, "fresh research");
}

#[tokio::test]
async fn unbound_sources_ignore_the_cache() {
    let cache: ResearchCache<String> = ResearchCache::new(Arc::new(MemoryBackend::new()));
    cache.put("acme", "cached".to_string(), vec![]).unwrap();

    let fanout: Fanout<String> = Fanout::builder()
        .cache_source("research", "acme", cache)
        .build();

    let report = fanout
        .gather(vec![SourceOperation::new("crm", SourceKind::Crm, async {
            Ok::<_, String>(Some("contacts".to_string()))
        })])
        .await
        .unwrap();

    assert_eq!(report.sources_used, vec!["crm".to_string()]);
}

// Backend that accepts reads but refuses writes.
struct ReadOnlyBackend {
    inner: MemoryBackend<String>,
}

impl CacheBackend<String> for ReadOnlyBackend {
    fn get(&self, key: &str) -> Option<CacheEntry<String>> {
        self.inner.get(key)
    }

    fn set(&self, _key: &str, _entry: CacheEntry<String>) -> Result<(), CacheError> {
        Err(CacheError::Backend("read-only".to_string()))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.inner.delete(key)
    }
}

#[tokio::test]
async fn failed_write_through_does_not_fail_the_gather() {
    let cache: ResearchCache<String> = ResearchCache::new(Arc::new(ReadOnlyBackend {
        inner: MemoryBackend::new(),
    }));
    let fetches = Arc::new(AtomicUsize::new(0));

    let fanout: Fanout<String> = Fanout::builder()
        .cache_source("research", "acme", cache)
        .build();

    let report = fanout
        .gather(vec![research_fetch(Arc::clone(&fetches))])
        .await
        .unwrap();

    assert_eq!(report.status, GatherStatus::Complete);
    assert_eq!(report.value("research").unwrap(), "fresh research");
}
