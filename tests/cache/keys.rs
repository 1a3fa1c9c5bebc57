//! Key normalization and collision behavior.

use std::sync::Arc;

use gather_resilience_cache::{normalize_key, MemoryBackend, ResearchCache};

#[test]
fn company_name_variants_share_one_slug() {
    let variants = [
        "Acme, Inc.",
        "acme inc",
        "ACME   INC",
        "Acme-Inc",
        "acme.inc!",
    ];
    for v in variants {
        assert_eq!(normalize_key(v), "acme-inc", "variant: {v}");
    }
}

#[test]
fn normalization_strips_edge_punctuation() {
    assert_eq!(normalize_key("  (Globex Corp.)  "), "globex-corp");
    assert_eq!(normalize_key("--dash--heavy--"), "dash-heavy");
}

#[test]
fn already_normalized_keys_pass_through() {
    for k in ["acme-inc", "a", "company-123"] {
        assert_eq!(normalize_key(k), k);
    }
}

#[test]
fn variant_writes_hit_the_same_entry() {
    let cache: ResearchCache<String> = ResearchCache::new(Arc::new(MemoryBackend::new()));

    let key = cache
        .put("Acme, Inc.", "first".to_string(), vec![])
        .unwrap();
    assert_eq!(key, "acme-inc");
    cache.put("ACME INC", "second".to_string(), vec![]).unwrap();

    assert_eq!(cache.get("acme inc").unwrap().value, "second");
}

#[test]
fn distinct_companies_do_not_collide() {
    let cache: ResearchCache<String> = ResearchCache::new(Arc::new(MemoryBackend::new()));
    cache.put("Acme, Inc.", "a".to_string(), vec![]).unwrap();
    cache.put("Acme Labs", "b".to_string(), vec![]).unwrap();

    assert_eq!(cache.get("acme inc").unwrap().value, "a");
    assert_eq!(cache.get("acme labs").unwrap().value, "b");
}
