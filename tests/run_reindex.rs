//! Start-up failures of `run_reindex` that happen before any database
//! connection is made.

use reindexer::{run_reindex, Config};

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        password: "secret".to_string(),
        workers: 1,
        authorities: false,
        lock_file: dir.path().join("reindex.lock"),
        batch_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_invalid_configuration_is_fatal() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        chunk_size: 1,
        ..config_in(&dir)
    };

    let err = run_reindex(config).await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.starts_with("Invalid configuration"), "{message}");
    assert!(message.contains("chunkSize"));
    assert!(!dir.path().join("reindex.lock").exists());
}

#[tokio::test]
async fn test_missing_password_is_fatal() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        password: String::new(),
        ..config_in(&dir)
    };

    let err = run_reindex(config).await.unwrap_err();
    assert!(format!("{:#}", err).contains("password"));
}

#[tokio::test]
async fn test_missing_ingest_tool_is_fatal_before_locking() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = Config {
        ingest_tool: "reindexer-test-missing-tool".to_string(),
        ..config_in(&dir)
    };

    let err = run_reindex(config).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "'reindexer-test-missing-tool' binary not found on path"
    );
    assert!(!dir.path().join("reindex.lock").exists());
    assert_eq!(
        std::fs::read_dir(dir.path())
            .expect("Failed to read temp dir")
            .count(),
        0
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_held_lock_is_fatal_with_operator_message() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let lock_file = dir.path().join("reindex.lock");
    std::fs::write(&lock_file, "4242").expect("Failed to write lock file");
    let config = Config {
        // Any executable on PATH satisfies tool discovery
        ingest_tool: "sh".to_string(),
        ..config_in(&dir)
    };

    let err = run_reindex(config).await.unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("held by PID 4242"), "{message}");
    assert!(message.contains("remove the file manually"));
    assert_eq!(
        std::fs::read_to_string(&lock_file).expect("lock must survive"),
        "4242"
    );
}
