//! Tests for the mapkv binary
//!
//! These tests verify:
//! - Exit status 0 after `exit` or end of input, with the expected replies
//! - Exit status 1 when the backing file cannot be opened or is corrupt
//! - Two processes sharing one backing file

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use mapkv::config::Encoding;
use mapkv::record::binary;
use mapkv::Store;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn spawn_mapkv(path: &Path, args: &[&str]) -> Child {
    Command::new(env!("CARGO_BIN_EXE_mapkv"))
        .arg(path)
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

/// Write `input` and close stdin so the session sees end of input
fn feed(child: &mut Child, input: &str) {
    let mut stdin = child.stdin.take().unwrap();
    // The child may exit before reading its input (e.g. on startup failure)
    match stdin.write_all(input.as_bytes()) {
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        result => result.unwrap(),
    }
}

fn run_mapkv(path: &Path, args: &[&str], input: &str) -> Output {
    let mut child = spawn_mapkv(path, args);
    feed(&mut child, input);
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

// =============================================================================
// Exit Status Tests
// =============================================================================

#[test]
fn test_clean_exit() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");

    for encoding in ["text", "binary"] {
        let path = path.with_extension(encoding);
        let output = run_mapkv(
            &path,
            &["-q", "-e", encoding],
            "5 42\n5\n70000\n6\nexit\n5 1\n",
        );

        assert_eq!(output.status.code(), Some(0), "{}", encoding);
        assert_eq!(
            stdout(&output),
            "ok\nresult: 42\nerror: key is out of range: 70000 > 65535\nresult: null\n"
        );
    }
}

#[test]
fn test_end_of_input_exits_cleanly() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");

    let output = run_mapkv(&path, &["-q"], "1 10\n");
    assert_eq!(output.status.code(), Some(0));

    // The set survived the process
    let output = run_mapkv(&path, &["-q"], "1\n");
    assert_eq!(stdout(&output), "result: 10\n");
}

#[test]
fn test_corrupt_file_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");
    fs::write(&path, b"this is not a record\n").unwrap();

    let output = run_mapkv(&path, &["-q"], "5\nexit\n");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), "");
    assert!(String::from_utf8_lossy(&output.stderr).contains("backing file is corrupt"));
}

#[test]
fn test_missing_file_without_create_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.db");

    let output = run_mapkv(&path, &["-q", "--no-create"], "exit\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(!path.exists());
}

#[test]
fn test_dump_lists_records() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.db");

    run_mapkv(&path, &["-q", "-e", "binary"], "9 90\n3 30\n");
    let output = run_mapkv(&path, &["-e", "binary", "--dump"], "");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "3 30\n9 90\n");
}

// =============================================================================
// Multi-Process Tests
// =============================================================================

#[test]
fn test_two_processes_share_file() {
    const KEYS: u32 = 150;

    let temp = TempDir::new().unwrap();

    for (encoding, flag) in [(Encoding::Text, "text"), (Encoding::Binary, "binary")] {
        let path = temp.path().join(format!("{}.db", flag));

        // Both processes start before either gets its input
        let mut children: Vec<Child> = (0..2)
            .map(|_| spawn_mapkv(&path, &["-q", "-e", flag]))
            .collect();

        for (writer, child) in children.iter_mut().enumerate() {
            let input: String = (0..KEYS)
                .map(|i| {
                    let key = i * 2 + writer as u32;
                    format!("{} {}\n", key, key + 1)
                })
                .chain(std::iter::once("exit\n".to_string()))
                .collect();
            feed(child, &input);
        }

        for child in children {
            let output = child.wait_with_output().unwrap();
            assert_eq!(output.status.code(), Some(0));
            assert_eq!(stdout(&output).lines().count(), KEYS as usize);
        }

        let mut store = Store::open_path(&path, encoding).unwrap();
        assert_eq!(store.len(), 2 * KEYS as usize);
        for key in 0..2 * KEYS {
            assert_eq!(store.get(key).unwrap(), Some(key + 1), "key {}", key);
        }
        store.close().unwrap();

        if encoding == Encoding::Binary {
            let bytes = fs::read(&path).unwrap();
            let keys: Vec<u16> = bytes
                .chunks_exact(binary::RECORD_SIZE)
                .map(|c| binary::decode(c).unwrap().key)
                .collect();
            assert!(keys.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
