use deskapp::api::DeskApi;
use deskapp::identity::LocalIdentity;
use deskapp::model::Node;
use deskapp::store::memory::MemTreeStore;

fn api_with_docs() -> DeskApi<MemTreeStore, LocalIdentity> {
    let mut api = DeskApi::new(MemTreeStore::new(), LocalIdentity::new());
    api.create_folder("Docs").unwrap();
    api
}

fn docs(api: &DeskApi<MemTreeStore, LocalIdentity>) -> Node {
    api.list()
        .unwrap()
        .listed_nodes
        .into_iter()
        .find(|n| n.name == "Docs")
        .unwrap()
}

#[test]
fn test_lock_wrong_unlock_then_unlock() {
    let api = api_with_docs();
    let mut logs = Vec::new();
    for line in [
        "Lock /Root/Docs p1",
        "Unlock /Root/Docs wrong",
        "Unlock /Root/Docs p1",
    ] {
        logs.extend(api.terminal(line).unwrap().logs);
    }

    assert_eq!(
        logs,
        vec![
            "> Lock /Root/Docs p1",
            "Folder /Root/Docs locked.",
            "> Unlock /Root/Docs wrong",
            "Incorrect password.",
            "> Unlock /Root/Docs p1",
            "Folder /Root/Docs unlocked.",
        ]
    );
    assert_eq!(logs.iter().filter(|l| l.ends_with("unlocked.")).count(), 1);
    assert!(!docs(&api).locked);
}

#[test]
fn test_wrong_password_leaves_lock_state() {
    let api = api_with_docs();
    api.terminal("Lock root/Docs p1").unwrap();
    let out = api.terminal("Unlock /root/Docs P1").unwrap();
    assert_eq!(out.logs[1], "Incorrect password.");

    let node = docs(&api);
    assert!(node.locked);
    assert_eq!(node.password.as_deref(), Some("p1"));
}

#[test]
fn test_lock_then_unlock_clears_password() {
    let api = api_with_docs();
    api.terminal("Lock /Root/Docs multi word pass").unwrap();
    assert_eq!(docs(&api).password.as_deref(), Some("multi word pass"));

    api.terminal("Unlock /Root/Docs multi word pass").unwrap();
    let node = docs(&api);
    assert!(!node.locked);
    assert_eq!(node.password, None);
}

#[test]
fn test_terminal_lock_overwrites_existing_password() {
    let mut api = api_with_docs();
    api.lock("Docs", "first").unwrap();
    api.terminal("Lock /Root/Docs second").unwrap();
    assert_eq!(docs(&api).password.as_deref(), Some("second"));
}

#[test]
fn test_terminal_changes_are_logged() {
    let api = api_with_docs();
    api.terminal("Lock /Root/Docs p1").unwrap();
    api.terminal("Unlock /Root/Docs p1").unwrap();
    let actions: Vec<_> = api
        .recent_logs(10)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert!(actions.contains(&"Lock".to_string()));
    assert!(actions.contains(&"Unlock".to_string()));
}

#[test]
fn test_clear_and_unknown() {
    let api = api_with_docs();
    assert!(api.terminal("/clear").unwrap().is_clear());
    assert_eq!(
        api.terminal("rm -rf /").unwrap().logs,
        vec!["> rm -rf /", "Command not found."]
    );
}
