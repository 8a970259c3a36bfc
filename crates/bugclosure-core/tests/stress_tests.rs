//! Stress tests against real files
//!
//! These tests verify sustained throughput, rotation under load and
//! end-to-end behavior with the filesystem provider.

use std::collections::HashSet;
use std::fs;
use std::time::Instant;

use bugclosure_core::{FsStorage, Logger, LoggerConfig};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

fn fs_logger(root: &TempDir) -> Logger {
    let logger = Logger::builder()
        .config(LoggerConfig {
            console_enabled: false,
            timestamp_format: "TS".into(),
            ..LoggerConfig::default()
        })
        .storage(FsStorage::new(root.path()))
        .build();
    logger.set_file_persistence(true);
    logger.set_file_info("logs", "stress", 1);
    logger
}

fn read_all_lines(root: &TempDir) -> Vec<String> {
    let dir = root.path().join("logs");
    let mut paths: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    paths.sort();
    paths
        .iter()
        .flat_map(|p| {
            fs::read_to_string(p)
                .unwrap()
                .lines()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

// ============================================================================
// Filesystem Tests
// ============================================================================

/// Files land under `<root>/<directory>/<base>_<date>.txt`
#[test]
fn test_file_layout_on_disk() {
    let root = TempDir::new().unwrap();
    let logger = fs_logger(&root);
    logger.info("hello disk");
    logger.close_logger();

    let today = chrono::Local::now().format("%Y%m%d").to_string();
    let path = root.path().join("logs").join(format!("stress_{today}.txt"));
    assert_eq!(fs::read_to_string(path).unwrap(), "TS [INFO] hello disk\n");
}

/// Restarting reuses nothing: a second logger starts a new file
#[test]
fn test_restart_appends_new_file() {
    let root = TempDir::new().unwrap();

    let first = fs_logger(&root);
    first.info("first run");
    first.close_logger();

    let second = fs_logger(&root);
    second.info("second run");
    second.close_logger();

    let names: HashSet<_> = fs::read_dir(root.path().join("logs"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 2);
    assert_eq!(
        read_all_lines(&root)
            .iter()
            .filter(|l| l.ends_with(" run"))
            .count(),
        2
    );
}

// ============================================================================
// Throughput Tests
// ============================================================================

/// 10,000 lines from 4 threads, rotating every 64 KiB
#[test]
fn test_sustained_rotation_under_load() {
    const THREADS: usize = 4;
    const PER_THREAD: usize = 2_500;

    let root = TempDir::new().unwrap();
    let logger = fs_logger(&root);
    logger.set_max_file_bytes(64 * 1024);

    let start = Instant::now();
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..PER_THREAD {
                    logger.info(format!("thread {t} line {i} {}", "x".repeat(40)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let enqueue_duration = start.elapsed();

    logger.close_logger();
    let total_duration = start.elapsed();

    let lines = read_all_lines(&root);
    assert_eq!(lines.len(), THREADS * PER_THREAD);

    let unique: HashSet<_> = lines.iter().collect();
    assert_eq!(unique.len(), THREADS * PER_THREAD);

    let files = fs::read_dir(root.path().join("logs")).unwrap().count();
    assert!(files > 1);
    assert_eq!(logger.error_count(), 0);

    println!(
        "{} lines: enqueue {:?}, persisted {:?}, {} files",
        lines.len(),
        enqueue_duration,
        total_duration,
        files
    );
}

/// Maximum-length chunked messages survive intact on disk
#[test]
fn test_large_messages_on_disk() {
    let root = TempDir::new().unwrap();
    let logger = fs_logger(&root);

    let message = "0123456789".repeat(1_000);
    for _ in 0..20 {
        logger.debug(&message);
    }
    logger.close_logger();

    let lines = read_all_lines(&root);
    // 10,000 chars -> 4 chunks each
    assert_eq!(lines.len(), 80);
    let rebuilt: String = lines[..4]
        .iter()
        .map(|l| l.trim_start_matches("TS [DEBUG] "))
        .collect();
    assert_eq!(rebuilt, message);
}
