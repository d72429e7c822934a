//! Tests for the interactive session
//!
//! These tests verify:
//! - Lookups, sets and exit through the line protocol
//! - Recoverable errors keep the session going
//! - End of input ends the session like exit

use std::io::Cursor;

use mapkv::config::Encoding;
use mapkv::session::{Session, SessionEnd, PROMPT};
use mapkv::Store;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Run `input` through a quiet session and return (end, output lines).
fn run(store: &mut Store, input: &str) -> (SessionEnd, Vec<String>) {
    let mut session = Session::new(Cursor::new(input.as_bytes()), Vec::new()).with_prompt(false);
    let end = session.run(store).unwrap();
    let output = String::from_utf8(session.into_writer()).unwrap();
    (end, output.lines().map(str::to_string).collect())
}

fn setup_temp_store(encoding: Encoding) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open_path(&temp_dir.path().join("store.db"), encoding).unwrap();
    (temp_dir, store)
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_set_get_exit() {
    for encoding in [Encoding::Text, Encoding::Binary] {
        let (_temp, mut store) = setup_temp_store(encoding);

        let (end, lines) = run(&mut store, "5\n5 42\n5\n5 7\n5\nexit\n9\n");

        assert_eq!(end, SessionEnd::Exit);
        assert_eq!(
            lines,
            vec!["result: null", "ok", "result: 42", "ok", "result: 7"]
        );
    }
}

#[test]
fn test_errors_do_not_end_session() {
    let (_temp, mut store) = setup_temp_store(Encoding::Text);

    let (end, lines) = run(&mut store, " 5 1\n70000 1\nabc\n1 2 3\n1 2\n1\n");

    assert_eq!(end, SessionEnd::Eof);
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("error: ") && lines[0].contains("spaces"));
    assert!(lines[1].starts_with("error: key is out of range"));
    assert!(lines[2].starts_with("error: "));
    assert!(lines[3].starts_with("error: "));
    assert_eq!(lines[4], "ok");
    assert_eq!(lines[5], "result: 2");

    // Only the valid set reached the store
    assert_eq!(store.len(), 1);
}

#[test]
fn test_value_out_of_range() {
    let (_temp, mut store) = setup_temp_store(Encoding::Binary);

    let (_, lines) = run(&mut store, "1 4294967296\n1\n");

    assert!(lines[0].starts_with("error: value is out of range"));
    assert_eq!(lines[1], "result: null");
}

#[test]
fn test_prompt_before_each_command() {
    let (_temp, mut store) = setup_temp_store(Encoding::Text);

    let mut session = Session::new(Cursor::new("1 1\nexit\n"), Vec::new());
    assert_eq!(session.run(&mut store).unwrap(), SessionEnd::Exit);

    let output = String::from_utf8(session.into_writer()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines, vec![PROMPT, "ok", PROMPT]);
}
