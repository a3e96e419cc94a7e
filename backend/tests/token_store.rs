use std::collections::HashSet;

use coachlog_backend::services::token::{hash_token, issue_token};

#[test]
fn ten_thousand_issues_are_distinct() {
    let mut seen = HashSet::with_capacity(10_000);
    for _ in 0..10_000 {
        assert!(seen.insert(issue_token()), "token collision");
    }
}

#[test]
fn tokens_are_url_safe() {
    for _ in 0..100 {
        let token = issue_token();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "unexpected character in {:?}",
            token
        );
    }
}

#[test]
fn hashes_are_stable_hex_digests() {
    let token = issue_token();
    let hash = hash_token(&token);
    assert_eq!(hash, hash_token(&token));
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(hash, hash_token("something-else"));
}
