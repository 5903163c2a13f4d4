mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bridge_desktop::{TokioStore, ZipCodec};
use chrono::{TimeZone, Utc};
use common::{config, zip_bytes, MemoryStore, StaticCodec};
use core_fs::error::SESSION_CLOSED_ERROR;
use core_fs::{HandleKind, Opfs, SyncFs, TempOptions};
use core_runtime::config::FsConfig;

fn session(store: Arc<MemoryStore>) -> SyncFs {
    SyncFs::spawn(&config(store, Arc::new(ZipCodec::new()))).unwrap()
}

#[test]
fn test_basic_operations_round_trip() {
    let store = MemoryStore::new();
    let fs = session(store.clone());

    fs.mkdir("/docs").unwrap();
    fs.write_file("/docs/note.txt", "hello").unwrap();
    fs.append_file("/docs/note.txt", " world").unwrap();

    assert_eq!(&fs.read_file("/docs/note.txt").unwrap()[..], b"hello world");
    assert!(fs.exists("/docs/note.txt").unwrap());
    assert!(!fs.exists("/docs/other.txt").unwrap());

    let handle = fs.stat("/docs").unwrap();
    assert_eq!(handle.kind, HandleKind::Directory);
    assert_eq!(handle.name, "docs");

    let entries = fs.read_dir("/docs", false).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "note.txt");

    fs.remove("/docs").unwrap();
    assert!(!store.has("/docs/note.txt"));
    fs.remove("/docs").unwrap();
}

#[test]
fn test_read_blob_file_carries_metadata() {
    let store = MemoryStore::new();
    store.set_clock(42_000);
    store.seed("/img/logo.png", b"\x89PNG");
    let fs = session(store);

    let file = fs.read_blob_file("/img/logo.png").unwrap();
    assert_eq!(file.name, "logo.png");
    assert_eq!(file.size, 4);
    assert_eq!(file.last_modified, 42_000);
    assert_eq!(file.data, b"\x89PNG".to_vec());

    let err = fs.read_blob_file("/img").unwrap_err();
    assert_eq!(err.name(), "TypeMismatchError");
}

#[test]
fn test_native_errors_cross_the_bridge() {
    let fs = session(MemoryStore::new());

    let err = fs.read_file("/missing.txt").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "/missing.txt is not found");
}

#[test]
fn test_temp_lifecycle_through_bridge() {
    let store = MemoryStore::new();
    let fs = session(store.clone());

    store.set_clock(100);
    let old = fs.mk_temp(&TempOptions::file().with_extname(".log")).unwrap();
    store.set_clock(900);
    let dir = fs.mk_temp(&TempOptions::directory()).unwrap();
    let fresh = format!("{}/fresh.txt", dir);
    fs.write_file(&fresh, "new").unwrap();

    fs.prune_temp(Utc.timestamp_millis_opt(500).unwrap()).unwrap();
    assert!(!fs.exists(&old).unwrap());
    assert!(fs.exists(&fresh).unwrap());
    assert!(fs.exists(&dir).unwrap());

    fs.delete_temp().unwrap();
    assert!(!store.has("/tmp"));
}

#[test]
fn test_unzip_through_bridge() {
    let store = MemoryStore::new();
    store.seed(
        "/pack.zip",
        &zip_bytes(&[("a.txt", b"alpha"), ("dir/", b""), ("dir/b.txt", b"beta")]),
    );
    let fs = session(store.clone());

    fs.unzip("/pack.zip", "/out").unwrap();

    assert_eq!(&fs.read_file("/out/dir/b.txt").unwrap()[..], b"beta");
    assert!(fs.exists("/out/a.txt").unwrap());
}

#[test]
fn test_aggregate_failure_through_bridge() {
    let store = MemoryStore::new();
    store.seed("/pack.zip", b"ignored");
    store.fail_under("/out/b.txt");
    let codec = StaticCodec::new(&[("a.txt", b"a"), ("b.txt", b"b"), ("c.txt", b"c")]);
    let fs = SyncFs::spawn(&config(store.clone(), codec)).unwrap();

    let err = fs.unzip("/pack.zip", "/out").unwrap_err();

    assert_eq!(err.name(), "OperationError");
    assert!(store.has("/out/a.txt"));
    assert!(store.has("/out/c.txt"));
}

#[test]
fn test_timeout_then_late_response_is_discarded() {
    let store = MemoryStore::new();
    store.seed("/slow.txt", b"eventually");
    store.set_read_delay(Duration::from_millis(300));
    let fs = session(store.clone());
    fs.set_op_timeout(Duration::from_millis(50));

    let start = Instant::now();
    let err = fs.read_file("/slow.txt").unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.message(), "Operating Timeout");
    assert!(start.elapsed() < Duration::from_millis(250));

    // The executor still finishes the orphaned read; its response must not
    // satisfy the next call.
    fs.set_op_timeout(Duration::from_secs(5));
    fs.write_file("/after.txt", "x").unwrap();
    thread::sleep(Duration::from_millis(350));
    assert!(fs.exists("/after.txt").unwrap());
}

#[test]
fn test_shortening_timeout_releases_waiting_caller() {
    let store = MemoryStore::new();
    store.seed("/slow.txt", b"x");
    store.set_read_delay(Duration::from_secs(2));
    let fs = session(store);
    fs.set_op_timeout(Duration::from_secs(30));

    thread::scope(|scope| {
        let caller = scope.spawn(|| {
            let start = Instant::now();
            (fs.read_file("/slow.txt"), start.elapsed())
        });
        thread::sleep(Duration::from_millis(50));
        fs.set_op_timeout(Duration::from_millis(100));

        let (result, elapsed) = caller.join().unwrap();
        assert!(result.unwrap_err().is_timeout());
        assert!(elapsed < Duration::from_secs(1));
    });
}

#[test]
fn test_concurrent_callers_get_their_own_results() {
    let store = MemoryStore::new();
    let fs = session(store.clone());

    thread::scope(|scope| {
        for i in 0..8 {
            let fs = &fs;
            scope.spawn(move || {
                let path = format!("/parallel/{}.txt", i);
                fs.write_file(&path, i.to_string()).unwrap();
                let read = fs.read_file(&path).unwrap();
                assert_eq!(read, i.to_string().as_bytes());
            });
        }
    });

    assert_eq!(fs.read_dir("/parallel", false).unwrap().len(), 8);
}

#[test]
fn test_terminate_fails_in_flight_and_later_calls() {
    let store = MemoryStore::new();
    store.seed("/slow.txt", b"x");
    store.set_read_delay(Duration::from_secs(5));
    let fs = session(store);
    fs.set_op_timeout(Duration::from_secs(30));

    thread::scope(|scope| {
        let caller = scope.spawn(|| fs.read_file("/slow.txt"));
        thread::sleep(Duration::from_millis(50));

        let start = Instant::now();
        fs.terminate();
        assert!(start.elapsed() < Duration::from_secs(2));

        let err = caller.join().unwrap().unwrap_err();
        assert_eq!(err.name(), SESSION_CLOSED_ERROR);
    });

    let err = fs.exists("/slow.txt").unwrap_err();
    assert_eq!(err.name(), SESSION_CLOSED_ERROR);
    fs.terminate();
}

#[test]
fn test_with_fs_uses_given_timeouts() {
    let store = MemoryStore::new();
    let fs = Opfs::new(&config(store, Arc::new(ZipCodec::new())));
    let session = SyncFs::with_fs(fs, Duration::from_millis(1234), Duration::from_secs(5)).unwrap();
    assert_eq!(session.op_timeout(), Duration::from_millis(1234));
}

#[test]
fn test_calls_from_async_context_still_complete() {
    let fs = session(MemoryStore::new());
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    runtime.block_on(async {
        fs.write_file("/from-async.txt", "ok").unwrap();
    });
    assert!(fs.exists("/from-async.txt").unwrap());
}

#[test]
fn test_end_to_end_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let config = FsConfig::builder()
        .store(Arc::new(TokioStore::with_root(root.path())))
        .codec(Arc::new(ZipCodec::new()))
        .build()
        .unwrap();
    let fs = SyncFs::spawn(&config).unwrap();

    let archive = fs.mk_temp(&TempOptions::file().with_extname(".zip")).unwrap();
    fs.write_file(
        &archive,
        zip_bytes(&[("readme.md", b"# hi"), ("src/", b""), ("src/main.rs", b"fn main() {}")]),
    )
    .unwrap();

    let target = fs.mk_temp(&TempOptions::directory().with_basename("unpacked")).unwrap();
    fs.unzip(&archive, &target).unwrap();

    let relative = target.trim_start_matches('/');
    let on_disk = root.path().join(relative).join("src/main.rs");
    assert_eq!(std::fs::read_to_string(on_disk).unwrap(), "fn main() {}");

    let entries = fs.read_dir(&target, true).unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["readme.md", "src", "src/main.rs"]);

    fs.delete_temp().unwrap();
    assert!(!root.path().join("tmp").exists());
}
