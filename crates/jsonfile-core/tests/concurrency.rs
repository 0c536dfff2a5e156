//! Concurrent read-modify-write against one document

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use jsonfile_core::{AsyncStore, LockOptions, Options, Store};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

const WRITERS: usize = 20;

fn contended_lock() -> LockOptions {
    LockOptions {
        wait: Duration::from_secs(30),
        retries: 10_000,
        poll_interval: Duration::from_millis(2),
    }
}

fn expected_keys(n: usize) -> Value {
    let map: Map<String, Value> = (0..n).map(|i| (i.to_string(), json!(i))).collect();
    Value::Object(map)
}

#[test]
fn concurrent_sets_from_threads_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store =
        Store::new(temp_dir.path().join("atomic-test.json")).with_lock_options(contended_lock());
    store.write(&json!({})).unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = store.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.set([i.to_string().as_str()], &i).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.read().unwrap(), expected_keys(WRITERS));
    assert!(!store.lock_path().exists());
}

#[test]
fn separate_stores_on_one_file_share_the_lock() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared.json");
    let options = Options::default().with_cant_read_file_default(json!({}));

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = Store::new(&path)
                .with_options(options.clone())
                .with_lock_options(contended_lock());
            thread::spawn(move || {
                store.merge(&json!({ i.to_string(): i })).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(Store::new(&path).read().unwrap(), expected_keys(WRITERS));
}

#[test]
fn readers_never_see_a_torn_document() {
    let temp_dir = TempDir::new().unwrap();
    let store =
        Store::new(temp_dir.path().join("continuous.json")).with_lock_options(contended_lock());
    store.write(&json!({"i": 0})).unwrap();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 1..=50 {
                store.write(&json!({ "i": i, "padding": "x".repeat(i * 100) })).unwrap();
            }
        })
    };

    for _ in 0..50 {
        let doc = store.read().unwrap();
        assert!(doc["i"].is_u64());
    }

    writer.join().unwrap();
    assert_eq!(store.get("i", None).unwrap(), json!(50));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sets_from_tasks_lose_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let store = AsyncStore::new(
        Store::new(temp_dir.path().join("async.json")).with_lock_options(contended_lock()),
    );
    store.write(&json!({})).await.unwrap();

    let tasks: Vec<_> = (0..WRITERS)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.set(vec![i.to_string()], &i).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(store.read().await.unwrap(), expected_keys(WRITERS));
}
