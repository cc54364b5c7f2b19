//! Indexed path tracking
//!
//! Update planning asks whether a mutated field path could touch an indexed
//! one; positional components never distinguish paths.

use strata::index_paths::{canonicalize, IndexPathSet};

#[test]
fn test_positional_components_are_dropped() {
    let cases = [
        ("a.b", "a.b", false),
        ("a.$.b", "a.b", true),
        ("a.0.b", "a.b", true),
        ("a.12.b.$", "a.b", true),
        ("a.b0.c", "a.b0.c", false),
        ("a.$x", "a.$x", false),
        ("items.3", "items", true),
        ("0", "0", false),
    ];
    for (input, expected, rewritten) in cases {
        let (canonical, changed) = canonicalize(input);
        assert_eq!(canonical, expected, "{}", input);
        assert_eq!(changed, rewritten, "{}", input);
    }
}

#[test]
fn test_unchanged_path_is_borrowed() {
    let (canonical, _) = canonicalize("a.b.c");
    assert!(matches!(canonical, std::borrow::Cow::Borrowed(_)));
}

#[test]
fn test_update_planning() {
    let mut indexed = IndexPathSet::new();
    indexed.add_path("tags.$.name");
    indexed.add_path("owner.id");
    assert_eq!(indexed.len(), 2);

    // Updates at, above or below an indexed path
    assert!(indexed.might_be_indexed("tags.name"));
    assert!(indexed.might_be_indexed("tags.4.name"));
    assert!(indexed.might_be_indexed("tags"));
    assert!(indexed.might_be_indexed("tags.0"));
    assert!(indexed.might_be_indexed("owner.id.hi"));
    assert!(indexed.might_be_indexed("owner"));

    // Siblings and lookalikes
    assert!(!indexed.might_be_indexed("tags.names"));
    assert!(!indexed.might_be_indexed("owner.ident"));
    assert!(!indexed.might_be_indexed("title"));
}

#[test]
fn test_empty_set_indexes_nothing() {
    let indexed = IndexPathSet::new();
    assert!(indexed.is_empty());
    assert!(!indexed.might_be_indexed("a"));
}
