use super::*;

#[test]
fn starts_alive_and_kill_is_shared() {
    let owner = Liveness::new();
    let task = owner.clone();
    assert!(task.is_alive());
    owner.kill();
    assert!(!task.is_alive());
    owner.kill();
    assert!(!owner.is_alive());
}
