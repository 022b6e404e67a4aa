//! Fuzz target for the dump statement scanner.
//!
//! This fuzzer checks that:
//! 1. No input causes a panic
//! 2. Every statement is trimmed and non-empty
//! 3. Splitting is stable for statements made of plain characters
//!
//! Run with: `cargo +nightly fuzz run fuzz_split_statements`

#![no_main]

use dbview::viewer::dump::split::{parse_script, split_statements};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let statements = split_statements(&text);
    for statement in &statements {
        assert!(!statement.is_empty());
        assert_eq!(statement.trim(), statement);
    }

    let script = parse_script(&text);
    for statement in &script.statements {
        assert!(!statement.is_empty());
    }

    // Statements made of plain characters must survive a second pass.
    if statements
        .iter()
        .all(|s| s.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_'))
    {
        assert_eq!(split_statements(&statements.join(";")), statements);
    }
});
