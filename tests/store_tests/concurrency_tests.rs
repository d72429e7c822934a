//! Tests for concurrent instances sharing one backing file
//!
//! Every writer opens its own Store (its own descriptor), which is how two
//! processes see each other: only through the advisory lock and the file.
//!
//! These tests verify:
//! - Paired writers never interleave or duplicate records
//! - Readers under the shared lock never observe a half-placed record
//! - The file parses cleanly after the writers finish

use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use mapkv::config::{Config, Encoding};
use mapkv::record::binary;
use mapkv::Store;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const WRITERS: u32 = 2;
const KEYS_PER_WRITER: u32 = 200;

fn open_store(path: &Path, encoding: Encoding) -> Store {
    let config = Config::builder().path(path).encoding(encoding).build();
    Store::open(config).unwrap()
}

/// Run `WRITERS` threads, each inserting its own keys and then overwriting
/// a range of keys shared with the other writers.
fn run_paired_writers(path: PathBuf, encoding: Encoding) {
    // Create the file before the writers race to open it
    open_store(&path, encoding).close().unwrap();

    let barrier = Arc::new(Barrier::new(WRITERS as usize));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut store = open_store(&path, encoding);
                barrier.wait();

                for i in 0..KEYS_PER_WRITER {
                    // Interleaved key spaces: writer 0 takes evens, writer 1 odds
                    let key = i * WRITERS + writer;
                    store.set(key, key + 1).unwrap();

                    // Both writers fight over the same small range
                    store.set(60000 + i % 10, writer).unwrap();
                }
                store.close().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

fn check_store(path: &Path, encoding: Encoding) {
    let mut store = open_store(path, encoding);

    assert_eq!(store.len() as u32, WRITERS * KEYS_PER_WRITER + 10);
    for key in 0..WRITERS * KEYS_PER_WRITER {
        assert_eq!(store.get(key).unwrap(), Some(key + 1), "key {}", key);
    }
    for key in 60000..60010 {
        let value = store.get(key).unwrap().unwrap();
        assert!(value < WRITERS);
    }

    let entries = store.entries().unwrap();
    assert_eq!(entries.len(), store.len());
}

// =============================================================================
// Paired Writer Tests
// =============================================================================

#[test]
fn test_paired_text_writers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("text.db");

    run_paired_writers(path.clone(), Encoding::Text);
    check_store(&path, Encoding::Text);
}

#[test]
fn test_paired_binary_writers() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("binary.db");

    run_paired_writers(path.clone(), Encoding::Binary);
    check_store(&path, Encoding::Binary);

    // Strictly ascending on disk
    let bytes = std::fs::read(&path).unwrap();
    let keys: Vec<u16> = bytes
        .chunks_exact(binary::RECORD_SIZE)
        .map(|c| binary::decode(c).unwrap().key)
        .collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_binary_reader_during_inserts() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("binary.db");

    let mut seed = open_store(&path, Encoding::Binary);
    seed.set(65535, 7).unwrap();
    seed.close().unwrap();

    let writer_path = path.clone();
    let writer = thread::spawn(move || {
        let mut store = open_store(&writer_path, Encoding::Binary);
        // Descending keys: every insert shifts the whole tail
        for key in (0..300u32).rev() {
            store.set(key, key).unwrap();
        }
    });

    let mut reader = open_store(&path, Encoding::Binary);
    while !writer.is_finished() {
        assert_eq!(reader.get(65535).unwrap(), Some(7));
        // flock does not queue writers behind readers; leave the writer a gap
        thread::sleep(Duration::from_millis(1));
    }
    writer.join().unwrap();

    assert_eq!(reader.get(0).unwrap(), Some(0));
    assert_eq!(reader.len(), 301);
}
