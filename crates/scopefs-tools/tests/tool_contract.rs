//! Integration tests for the host tool contract.

use std::sync::Arc;
use std::time::Duration;

use scopefs_tools::HostToolRegistry;
use scopefs_vfs::{ScopedVfs, VfsEvent, VfsOptions};
use serde_json::{Value, json};
use tempfile::TempDir;

async fn registry() -> (TempDir, HostToolRegistry) {
    let dir = TempDir::new().unwrap();
    let vfs = ScopedVfs::open(VfsOptions::new(dir.path(), "task-42", "run-7"))
        .await
        .unwrap();
    (dir, HostToolRegistry::with_defaults(Arc::new(vfs)))
}

fn assert_ok(env: &Value) {
    assert_eq!(env["success"], json!(true), "unexpected failure: {env}");
}

fn assert_failed(env: &Value, needle: &str) {
    assert_eq!(env["success"], json!(false), "unexpected success: {env}");
    let error = env["error"].as_str().unwrap();
    assert!(error.contains(needle), "'{error}' does not mention '{needle}'");
}

#[tokio::test]
async fn test_write_then_auto_read_finds_task_scope() {
    let (_dir, registry) = registry().await;

    let env = registry
        .call(
            "writeFile",
            json!({"path": "notes/a.txt", "content": "hello", "scope": "task"}),
        )
        .await;
    assert_ok(&env);
    assert_eq!(env["size"], json!(5));
    assert_eq!(env["path"], json!("notes/a.txt"));

    let env = registry
        .call("readFile", json!({"path": "notes/a.txt", "scope": "auto"}))
        .await;
    assert_ok(&env);
    assert_eq!(env["content"], json!("hello"));
    assert_eq!(env["scope"], json!("task"));
}

#[tokio::test]
async fn test_missing_path_envelope() {
    let (_dir, registry) = registry().await;

    let env = registry.call("writeFile", json!({"content": "x"})).await;
    assert_failed(&env, "path");
    assert_eq!(env["tool"], json!("writeFile"));
    assert_eq!(env["params"]["content"], json!("[redacted: 1 chars]"));
}

#[tokio::test]
async fn test_recursive_listing_includes_nested_entries() {
    let (_dir, registry) = registry().await;
    assert_ok(&registry.call("mkdir", json!({"path": "sub"})).await);
    assert_ok(
        &registry
            .call("writeFile", json!({"path": "sub/f.txt", "content": "x"}))
            .await,
    );

    let env = registry
        .call(
            "listFiles",
            json!({"path": "/", "scope": "run", "recursive": true}),
        )
        .await;
    assert_ok(&env);
    let paths: Vec<_> = env["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["sub", "sub/f.txt"]);
}

#[tokio::test]
async fn test_traversal_rejected_in_every_scope() {
    let (_dir, registry) = registry().await;

    for scope in ["run", "task", "global"] {
        let env = registry
            .call(
                "writeFile",
                json!({"path": "../../escape.txt", "content": "x", "scope": scope}),
            )
            .await;
        assert_failed(&env, "outside scope root");

        let env = registry
            .call("readFile", json!({"path": "../secret", "scope": scope}))
            .await;
        assert_failed(&env, "outside scope root");
    }

    let env = registry
        .call("fileExists", json!({"path": "../../../etc/passwd"}))
        .await;
    assert_ok(&env);
    assert_eq!(env["exists"], json!(false));
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let (_dir, registry) = registry().await;
    assert_ok(
        &registry
            .call(
                "writeFile",
                json!({"path": "shared.txt", "content": "g", "scope": "global"}),
            )
            .await,
    );

    let env = registry
        .call("readFile", json!({"path": "shared.txt", "scope": "run"}))
        .await;
    assert_failed(&env, "Not found");

    let env = registry
        .call("readFile", json!({"path": "shared.txt"}))
        .await;
    assert_ok(&env);
    assert_eq!(env["scope"], json!("global"));
}

#[tokio::test]
async fn test_auto_read_miss_reports_every_scope() {
    let (_dir, registry) = registry().await;
    let env = registry.call("readFile", json!({"path": "ghost.txt"})).await;
    assert_failed(&env, "run:");
    assert_failed(&env, "task:");
    assert_failed(&env, "global:");
}

#[tokio::test]
async fn test_delete_semantics() {
    let (_dir, registry) = registry().await;
    assert_failed(
        &registry.call("deleteFile", json!({"path": "nothing"})).await,
        "Not found",
    );

    assert_ok(
        &registry
            .call("writeFile", json!({"path": "d/e/f.txt", "content": "x"}))
            .await,
    );
    let env = registry.call("deleteFile", json!({"path": "d"})).await;
    assert_ok(&env);
    assert_eq!(env["wasDirectory"], json!(true));

    let env = registry.call("fileExists", json!({"path": "d/e/f.txt"})).await;
    assert_eq!(env["exists"], json!(false));
}

#[tokio::test]
async fn test_list_never_created_directory_is_empty() {
    let (_dir, registry) = registry().await;
    let env = registry
        .call("listFiles", json!({"path": "not/here", "scope": "global"}))
        .await;
    assert_ok(&env);
    assert_eq!(env["files"], json!([]));
    assert_eq!(env["directories"], json!([]));
}

#[tokio::test]
async fn test_mkdir_then_stat() {
    let (_dir, registry) = registry().await;
    assert_ok(&registry.call("mkdir", json!({"path": "a/b"})).await);
    assert_ok(&registry.call("mkdir", json!({"path": "a/b"})).await);

    let env = registry.call("fileStat", json!({"path": "a/b"})).await;
    assert_ok(&env);
    assert_eq!(env["isDirectory"], json!(true));
    assert_eq!(env["path"], json!("a/b"));
}

#[tokio::test]
async fn test_invalid_scope_and_encoding() {
    let (_dir, registry) = registry().await;
    assert_failed(
        &registry
            .call("mkdir", json!({"path": "x", "scope": "elsewhere"}))
            .await,
        "Invalid scope",
    );
    assert_failed(
        &registry
            .call(
                "writeFile",
                json!({"path": "x", "content": "y", "encoding": "utf32"}),
            )
            .await,
        "encoding",
    );
}

#[tokio::test]
async fn test_vfs_tree_reports_all_scopes() {
    let (_dir, registry) = registry().await;
    assert_ok(
        &registry
            .call(
                "writeFile",
                json!({"path": "g.txt", "content": "abc", "scope": "global"}),
            )
            .await,
    );

    let env = registry.call("vfsTree", json!({})).await;
    assert_ok(&env);
    for scope in ["run", "task", "global"] {
        assert_eq!(env["tree"][scope]["exists"], json!(true));
    }
    assert_eq!(env["tree"]["global"]["size"], json!(3));
    assert!(
        env["tree"]["run"]["path"]
            .as_str()
            .unwrap()
            .ends_with("run-7")
    );
}

#[tokio::test]
async fn test_write_events_reach_subscribers() {
    let (_dir, registry) = registry().await;
    let mut writes = registry.vfs().events().subscribe_type("file:write");

    assert_ok(
        &registry
            .call("writeFile", json!({"path": "e.txt", "content": "1"}))
            .await,
    );

    let event = writes.recv().await.unwrap();
    assert!(matches!(&*event, VfsEvent::FileWrite { path, size: 1, .. } if path == "e.txt"));
}

#[tokio::test]
async fn test_watch_publishes_changes_until_closed() {
    let (_dir, registry) = registry().await;
    assert_ok(&registry.call("mkdir", json!({"path": "inbox"})).await);
    let mut changes = registry.vfs().events().subscribe_type("file:change");

    let env = registry.call("watchFile", json!({"path": "inbox"})).await;
    assert_ok(&env);
    let watch_id = env["watchId"].as_str().unwrap().parse().unwrap();
    assert_eq!(registry.active_watches(), 1);

    assert_ok(
        &registry
            .call("writeFile", json!({"path": "inbox/msg.txt", "content": "hi"}))
            .await,
    );

    let event = tokio::time::timeout(Duration::from_secs(10), changes.recv())
        .await
        .expect("change within timeout")
        .unwrap();
    assert!(matches!(
        &*event,
        VfsEvent::FileChange { watch_id: id, path, .. } if *id == watch_id && path == "inbox"
    ));

    assert!(registry.close_watch(watch_id));
    assert!(!registry.close_watch(watch_id));
    assert_eq!(registry.active_watches(), 0);
}

#[tokio::test]
async fn test_watch_missing_path_fails() {
    let (_dir, registry) = registry().await;
    assert_failed(
        &registry.call("watchFile", json!({"path": "nope"})).await,
        "Not found",
    );
    assert_eq!(registry.close_all_watches(), 0);
}
