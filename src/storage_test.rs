use super::*;

#[test]
fn memory_storage_clones_share_entries() {
    let a = MemoryStorage::new();
    let b = a.clone();
    a.set("k", "v");
    assert_eq!(b.get("k").as_deref(), Some("v"));
    b.remove("k");
    assert!(a.is_empty());
}

#[test]
fn token_store_ignores_blank_tokens() {
    let mem = MemoryStorage::new();
    let tokens = TokenStore::new(Arc::new(mem.clone()), "token");
    assert_eq!(tokens.get(), None);

    mem.set("token", "  ");
    assert_eq!(tokens.get(), None);

    tokens.set("abc");
    assert_eq!(tokens.get().as_deref(), Some("abc"));
    assert_eq!(mem.get("token").as_deref(), Some("abc"));

    tokens.clear();
    assert_eq!(mem.get("token"), None);
}

#[test]
fn email_cache_trims_and_clears() {
    let mem = MemoryStorage::new();
    let cache = EmailCache::new(Arc::new(mem.clone()), "verificationEmail");
    cache.set(" student@pec.edu.in ");
    assert_eq!(cache.get().as_deref(), Some("student@pec.edu.in"));
    cache.clear();
    assert_eq!(cache.get(), None);
}

#[test]
fn token_debug_does_not_print_value() {
    let mem = MemoryStorage::new();
    let tokens = TokenStore::new(Arc::new(mem), "token");
    tokens.set("super-secret");
    let printed = format!("{tokens:?}");
    assert!(!printed.contains("super-secret"));
}
