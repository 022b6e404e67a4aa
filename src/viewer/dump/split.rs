//! Statement scanner for SQL dumps.
//!
//! Splits a dump into top-level statements on `;`, tracking quote and
//! comment state so semicolons inside literals, identifiers and comments
//! never end a statement. Comments are dropped from the output, including
//! MySQL's `/*! ... */` version hints.

use regex::Regex;
use std::sync::LazyLock;

/// Session and transaction statements that carry no schema or data.
static NOOP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:SET\b|START\s+TRANSACTION\b|BEGIN\b|COMMIT\b|ROLLBACK\b|LOCK\s+TABLES?\b|UNLOCK\s+TABLES?\b|USE\b|DELIMITER\b)",
    )
    .expect("valid no-op regex")
});

/// A dump split into executable statements.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Script {
    pub statements: Vec<String>,
    /// No-op statements dropped from `statements`.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Splits `text` into trimmed, non-empty statements without their `;`.
pub fn split_statements(text: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut state = State::Normal;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                ';' => flush(&mut current, &mut statements),
                '\'' | '"' | '`' => {
                    current.push(c);
                    state = State::Quoted(c);
                }
                '#' => state = State::LineComment,
                '-' if chars.peek() == Some(&'-') => {
                    // `--` only opens a comment when followed by whitespace.
                    let mut lookahead = chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        None => {
                            chars.next();
                        }
                        Some(next) if next.is_whitespace() => {
                            chars.next();
                            state = State::LineComment;
                        }
                        Some(_) => current.push(c),
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => current.push(c),
            },
            State::Quoted(quote) => {
                current.push(c);
                if c == '\\' && quote != '`' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == quote {
                    if chars.peek() == Some(&quote) {
                        current.push(quote);
                        chars.next();
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = State::Normal;
                }
            }
        }
    }

    flush(&mut current, &mut statements);
    statements
}

fn flush(current: &mut String, statements: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}

/// Whether a statement is a session/transaction no-op.
pub fn is_noop(statement: &str) -> bool {
    NOOP.is_match(statement)
}

/// Splits a dump and drops no-op statements.
pub fn parse_script(text: &str) -> Script {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut script = Script::default();
    for statement in split_statements(text) {
        if is_noop(&statement) {
            script.skipped += 1;
        } else {
            script.statements.push(statement);
        }
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_splits_on_top_level_semicolons() {
        let stmts = split_statements("CREATE TABLE a (x INT);\nINSERT INTO a VALUES (1);");
        assert_eq!(stmts, ["CREATE TABLE a (x INT)", "INSERT INTO a VALUES (1)"]);
    }

    #[test]
    fn test_semicolons_inside_literals() {
        let stmts = split_statements(
            "INSERT INTO t VALUES ('a;b', \"c;d\", 'it\\'s; fine', 'x'';y');SELECT `we;ird`",
        );
        assert_eq!(stmts.len(), 2);
        assert!(stmts[0].ends_with("'x'';y')"));
        assert_eq!(stmts[1], "SELECT `we;ird`");
    }

    #[test]
    fn test_strips_comments() {
        let text = "-- header; with semicolon\n\
                    /*!40101 SET NAMES utf8 */;\n\
                    # hash comment;\n\
                    CREATE TABLE t (a INT /* inline; */);\n\
                    SELECT 5--3;";
        let stmts = split_statements(text);
        assert_eq!(stmts, ["CREATE TABLE t (a INT  )", "SELECT 5--3"]);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_data() {
        let stmts = split_statements("INSERT INTO t VALUES ('-- not a comment', '/* nor this */')");
        assert_eq!(
            stmts,
            ["INSERT INTO t VALUES ('-- not a comment', '/* nor this */')"]
        );
    }

    #[test]
    fn test_parse_script_drops_noops() {
        let script = parse_script(
            "\u{feff}SET NAMES utf8mb4;\nSTART TRANSACTION;\nLOCK TABLES `t` WRITE;\n\
             INSERT INTO t VALUES (1);\nUNLOCK TABLES;\nCOMMIT;",
        );
        assert_eq!(script.statements, ["INSERT INTO t VALUES (1)"]);
        assert_eq!(script.skipped, 5);
    }

    #[test]
    fn test_unterminated_literal_keeps_tail() {
        let stmts = split_statements("INSERT INTO t VALUES ('oops;");
        assert_eq!(stmts, ["INSERT INTO t VALUES ('oops;"]);
    }

    proptest! {
        #[test]
        fn prop_never_panics(input in ".{0,300}") {
            let _ = split_statements(&input);
        }

        #[test]
        fn prop_plain_statements_round_trip(
            parts in prop::collection::vec("[A-Za-z0-9_ (),=]{1,40}", 1..10)
        ) {
            let expected: Vec<String> = parts
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
            let joined = parts.join(";");
            prop_assert_eq!(split_statements(&joined), expected);
        }

        #[test]
        fn prop_quoted_semicolons_never_split(
            literals in prop::collection::vec("[a-z; ]{0,20}", 1..6)
        ) {
            let values: Vec<String> = literals.iter().map(|l| format!("'{l}'")).collect();
            let stmt = format!("INSERT INTO t VALUES ({})", values.join(", "));
            let stmts = split_statements(&format!("{stmt};{stmt};"));
            prop_assert_eq!(stmts.len(), 2);
            prop_assert_eq!(&stmts[0], &stmt);
        }
    }
}
