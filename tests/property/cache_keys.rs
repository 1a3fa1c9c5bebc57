//! Property tests for cache key normalization.
//!
//! Invariants tested:
//! - Normalization is idempotent
//! - Output only contains lowercase alphanumerics and single hyphens
//! - Case and punctuation variants collapse to the same slug

use gather_resilience_cache::normalize_key;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: normalizing twice changes nothing.
    #[test]
    fn normalization_is_idempotent(raw in ".{0,64}") {
        let once = normalize_key(&raw);
        prop_assert_eq!(normalize_key(&once), once);
    }

    /// Property: the output alphabet is lowercase alphanumerics and
    /// hyphens, with no hyphen runs and no hyphens at the edges.
    #[test]
    fn output_alphabet_is_closed(raw in ".{0,64}") {
        let key = normalize_key(&raw);
        prop_assert!(
            key.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "key: {key:?}"
        );
        prop_assert!(!key.contains("--"), "key: {key:?}");
        prop_assert!(!key.starts_with('-') && !key.ends_with('-'), "key: {key:?}");
    }

    /// Property: case differences never produce different slugs.
    #[test]
    fn case_is_irrelevant(raw in "[a-zA-Z0-9 ,.()&-]{1,40}") {
        prop_assert_eq!(
            normalize_key(&raw.to_uppercase()),
            normalize_key(&raw.to_lowercase())
        );
    }

    /// Property: swapping separator punctuation never changes the slug.
    #[test]
    fn separators_are_interchangeable(words in prop::collection::vec("[a-z0-9]{1,8}", 1..5)) {
        let spaced = words.join(" ");
        let dotted = words.join(".");
        let dashed = words.join("-");
        prop_assert_eq!(normalize_key(&spaced), normalize_key(&dotted));
        prop_assert_eq!(normalize_key(&spaced), normalize_key(&dashed));
    }
}
