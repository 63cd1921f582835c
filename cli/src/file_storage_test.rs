use super::*;

fn scratch(name: &str) -> FileStorage {
    let path = std::env::temp_dir().join(format!("portal-cli-{}-{name}.json", std::process::id()));
    let _ = fs::remove_file(&path);
    FileStorage::new(path)
}

#[test]
fn missing_file_reads_as_empty() {
    let storage = scratch("missing");
    assert_eq!(storage.get("token"), None);
}

#[test]
fn set_then_get_survives_a_new_handle() {
    let storage = scratch("persist");
    storage.set("token", "abc");

    let reopened = FileStorage::new(storage.path().to_path_buf());
    assert_eq!(reopened.get("token").as_deref(), Some("abc"));
    reopened.remove("token");
}

#[test]
fn removing_last_key_deletes_the_file() {
    let storage = scratch("remove");
    storage.set("token", "abc");
    storage.remove("token");

    assert!(!storage.path().exists());
    assert_eq!(storage.get("token"), None);
}

#[test]
fn keys_are_independent() {
    let storage = scratch("keys");
    storage.set("token", "abc");
    storage.set("other", "xyz");
    storage.remove("token");

    assert_eq!(storage.get("other").as_deref(), Some("xyz"));
    storage.remove("other");
}

#[test]
fn garbage_file_is_ignored() {
    let storage = scratch("garbage");
    fs::write(storage.path(), "not json").unwrap();

    assert_eq!(storage.get("token"), None);
    storage.set("token", "abc");
    assert_eq!(storage.get("token").as_deref(), Some("abc"));
    storage.remove("token");
}
