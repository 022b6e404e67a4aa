//! Dialect rewrite rules for MySQL-style DDL and DML.
//!
//! Translation is best effort. `CREATE TABLE` statements go through an
//! ordered list of named [`Rule`]s; each rule either rewrites the whole
//! statement or only the text outside quoted spans, so identifiers such as
//! `"timestamp"` and literals such as `'int'` are never mistaken for types.
//! `INSERT` statements only need quoting normalized.

use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::trace;

/// Which part of a statement a rule may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The statement as a whole, quoted spans included.
    Whole,
    /// Only text outside `'...'` and `"..."` spans.
    Unquoted,
}

#[derive(Debug)]
enum Action {
    Replace {
        pattern: Regex,
        replacement: &'static str,
    },
    Transform(fn(&str) -> String),
}

/// A named rewrite step.
#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub scope: Scope,
    action: Action,
}

impl Rule {
    fn replace(name: &'static str, scope: Scope, pattern: &str, replacement: &'static str) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid pattern for rule '{name}': {e}"));
        Self {
            name,
            scope,
            action: Action::Replace {
                pattern,
                replacement,
            },
        }
    }

    fn transform(name: &'static str, f: fn(&str) -> String) -> Self {
        Self {
            name,
            scope: Scope::Whole,
            action: Action::Transform(f),
        }
    }

    /// Applies this rule to `sql`.
    pub fn apply(&self, sql: &str) -> String {
        match &self.action {
            Action::Transform(f) => f(sql),
            Action::Replace {
                pattern,
                replacement,
            } => match self.scope {
                Scope::Whole => pattern.replace_all(sql, *replacement).into_owned(),
                Scope::Unquoted => map_unquoted(sql, |segment| {
                    pattern.replace_all(segment, *replacement).into_owned()
                }),
            },
        }
    }
}

static CREATE_TABLE_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    use Scope::{Unquoted, Whole};
    vec![
        Rule::transform("quoting", normalize_quoting),
        Rule::replace("charset-introducers", Unquoted, INTRODUCER, "$1"),
        Rule::transform("bit-literals", rewrite_bit_literals),
        Rule::replace(
            "schema-qualifier",
            Whole,
            r#"(?i)^(\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?)"(?:[^"]|"")+"\s*\.\s*"#,
            "$1",
        ),
        Rule::replace(
            "table-options",
            Whole,
            r"(?is)\)\s*(?:ENGINE|TYPE|AUTO_INCREMENT|(?:DEFAULT\s+)?(?:CHARSET|CHARACTER\s+SET|COLLATE)|ROW_FORMAT|COMMENT|PACK_KEYS|CHECKSUM|DELAY_KEY_WRITE|STATS_PERSISTENT|KEY_BLOCK_SIZE)\s*=.*$",
            ")",
        ),
        Rule::replace(
            "column-comments",
            Whole,
            r"(?i)\s+COMMENT\s+'(?:[^']|'')*'",
            "",
        ),
        // A plain KEY/INDEX member is never first, so it always follows a comma.
        Rule::replace(
            "index-definitions",
            Whole,
            r#"(?i),\s*(?:FULLTEXT\s+|SPATIAL\s+)?(?:KEY|INDEX)\b(?:\s*"(?:[^"]|"")*"|\s+\w+)?\s*\((?:[^()']|'(?:[^']|'')*'|\([^()]*\))*\)(?:\s+USING\s+\w+)?"#,
            "",
        ),
        Rule::replace(
            "unique-key-names",
            Whole,
            r#"(?i)\bUNIQUE\s+(?:KEY|INDEX)\s*(?:"(?:[^"]|"")*"\s*)?\("#,
            "UNIQUE (",
        ),
        Rule::replace("index-using", Unquoted, r"(?i)\s+USING\s+(?:BTREE|HASH)\b", ""),
        Rule::replace(
            "character-set",
            Unquoted,
            r"(?i)\s+(?:CHARACTER\s+SET|CHARSET)\s+\w+",
            "",
        ),
        Rule::replace("collate", Unquoted, r"(?i)\s+COLLATE\s+\w+", ""),
        Rule::replace("unsigned", Unquoted, r"(?i)\s+(?:UNSIGNED|ZEROFILL)\b", ""),
        Rule::replace(
            "on-update-timestamp",
            Unquoted,
            r"(?i)\s+ON\s+UPDATE\s+(?:CURRENT_TIMESTAMP(?:\s*\(\s*\d*\s*\))?|NOW\s*\(\s*\))",
            "",
        ),
        Rule::replace(
            "zero-datetime",
            Whole,
            r"'0000-00-00 00:00:00'",
            "'1970-01-01 00:00:00'",
        ),
        Rule::replace("zero-date", Whole, r"'0000-00-00'", "'1970-01-01'"),
        Rule::replace("default-null", Unquoted, r"(?i)\s+DEFAULT\s+NULL\b", ""),
        Rule::replace(
            "enum-types",
            Whole,
            r"(?i)\b(?:ENUM|SET)\s*\((?:'(?:[^']|'')*'|[^)'])*\)",
            "TEXT",
        ),
        Rule::replace(
            "integer-types",
            Unquoted,
            r"(?i)\b(?:TINYINT|SMALLINT|MEDIUMINT|BIGINT|INTEGER|INT|BOOLEAN|BOOL|BIT)\b(?:\s*\(\s*\d+\s*\))?",
            "INTEGER",
        ),
        Rule::replace(
            "real-types",
            Unquoted,
            r"(?i)\b(?:DOUBLE(?:\s+PRECISION)?|FLOAT|DECIMAL|NUMERIC|DEC|FIXED|REAL)\b(?:\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\))?",
            "REAL",
        ),
        Rule::replace(
            "text-types",
            Unquoted,
            r"(?i)\b(?:NATIONAL\s+)?(?:VARCHAR|NVARCHAR|CHAR|NCHAR|TINYTEXT|MEDIUMTEXT|LONGTEXT|TEXT|JSON)\b(?:\s*\(\s*\d+\s*\))?",
            "TEXT",
        ),
        Rule::replace(
            "temporal-types",
            Unquoted,
            r"(?i)\b(?:DATETIME|TIMESTAMP|DATE|TIME|YEAR)\b(?:\s*\(\s*\d+\s*\))?",
            "TEXT",
        ),
        Rule::replace(
            "blob-types",
            Unquoted,
            r"(?i)\b(?:TINYBLOB|MEDIUMBLOB|LONGBLOB|BLOB|VARBINARY|BINARY)\b(?:\s*\(\s*\d+\s*\))?",
            "BLOB",
        ),
        // After the temporal rule, which would otherwise rewrite `datetime(`.
        Rule::replace(
            "default-current-timestamp",
            Unquoted,
            r"(?i)\bDEFAULT\s+(?:CURRENT_TIMESTAMP(?:\s*\(\s*\d*\s*\))?|NOW\s*\(\s*\))",
            "DEFAULT (datetime('now'))",
        ),
        Rule::replace(
            "inline-auto-increment-key",
            Unquoted,
            r"(?i)\b(?:AUTO_INCREMENT\s+PRIMARY\s+KEY|PRIMARY\s+KEY\s+AUTO_INCREMENT)\b",
            "PRIMARY KEY AUTOINCREMENT",
        ),
        Rule::transform("auto-increment", promote_auto_increment),
        Rule::replace("dangling-commas", Unquoted, r",(\s*)\)", "$1)"),
        Rule::transform("terminator", terminate),
    ]
});

/// The ordered rule list applied to `CREATE TABLE` statements.
pub fn create_table_rules() -> &'static [Rule] {
    &CREATE_TABLE_RULES
}

/// Rewrites a MySQL `CREATE TABLE` statement into SQLite syntax.
pub fn translate_create_table(statement: &str) -> String {
    let mut sql = statement.to_string();
    for rule in create_table_rules() {
        let next = rule.apply(&sql);
        if next != sql {
            trace!(rule = rule.name, "rewrite rule applied");
            sql = next;
        }
    }
    sql
}

/// Character set introducer before a literal (`_binary 'x'`, `_utf8mb4 0x61`).
const INTRODUCER: &str =
    r"(?i)\b_(?:binary|utf8mb4|utf8mb3|utf8|latin1|ascii|ucs2|utf16|utf32)\s*($|0[xX])";

static INSERT_RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    use Scope::{Unquoted, Whole};
    vec![
        Rule::transform("quoting", normalize_quoting),
        Rule::replace("charset-introducers", Unquoted, INTRODUCER, "$1"),
        Rule::transform("bit-literals", rewrite_bit_literals),
        Rule::transform("hex-literals", rewrite_hex_literals),
        Rule::replace(
            "insert-ignore",
            Whole,
            r"(?i)^\s*INSERT\s+IGNORE\s+INTO\b",
            "INSERT OR IGNORE INTO",
        ),
        Rule::replace(
            "schema-qualifier",
            Whole,
            r#"(?i)^(\s*(?:INSERT(?:\s+OR\s+\w+)?|REPLACE)\s+INTO\s+)"(?:[^"]|"")+"\s*\.\s*"#,
            "$1",
        ),
        Rule::transform("terminator", terminate),
    ]
});

/// The ordered rule list applied to `INSERT` statements.
pub fn insert_rules() -> &'static [Rule] {
    &INSERT_RULES
}

/// Rewrites a MySQL `INSERT` statement into SQLite syntax.
pub fn translate_insert(statement: &str) -> String {
    insert_rules()
        .iter()
        .fold(statement.to_string(), |sql, rule| rule.apply(&sql))
}

/// Optional schema qualifier followed by the table name in any quoting.
///
/// Quote characters inside a quoted name are escaped by doubling.
const TABLE_NAME: &str = r#"(?:(?:`(?:[^`]|``)+`|"(?:[^"]|"")+"|[\w$]+)\s*\.\s*)?(?:`(?P<bt>(?:[^`]|``)+)`|"(?P<dq>(?:[^"]|"")+)"|(?P<bare>[\w$]+))"#;

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?{TABLE_NAME}"
    ))
    .expect("valid create-table regex")
});

static INSERT_INTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^\s*(?:INSERT|REPLACE)\s+(?:(?:IGNORE|OR\s+\w+|LOW_PRIORITY|DELAYED|HIGH_PRIORITY)\s+)*INTO\s+{TABLE_NAME}"
    ))
    .expect("valid insert-into regex")
});

fn captured_name(caps: &Captures<'_>) -> Option<String> {
    if let Some(m) = caps.name("bt") {
        return Some(m.as_str().replace("``", "`"));
    }
    if let Some(m) = caps.name("dq") {
        return Some(m.as_str().replace("\"\"", "\""));
    }
    caps.name("bare").map(|m| m.as_str().to_string())
}

/// Table named by a `CREATE TABLE` statement, or `None` for other statements.
pub fn create_table_name(statement: &str) -> Option<String> {
    CREATE_TABLE
        .captures(statement)
        .and_then(|caps| captured_name(&caps))
}

/// Target table of an `INSERT`/`REPLACE` statement, or `None` for other statements.
pub fn insert_table_name(statement: &str) -> Option<String> {
    INSERT_INTO
        .captures(statement)
        .and_then(|caps| captured_name(&caps))
}

/// Whether `statement` is a `CREATE TABLE`, even one whose name can't be read.
pub fn is_create_table(statement: &str) -> bool {
    static HEAD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\b").expect("valid create head regex")
    });
    HEAD.is_match(statement)
}

/// Whether `statement` is an `INSERT`/`REPLACE ... INTO`.
pub fn is_insert(statement: &str) -> bool {
    static HEAD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^\s*(?:INSERT|REPLACE)\b").expect("valid insert head regex")
    });
    HEAD.is_match(statement)
}

/// Converts MySQL quoting to SQLite quoting.
///
/// Backtick identifiers become double-quoted; inside single-quoted
/// literals, backslash escapes are resolved (`\'` becomes `''`).
pub fn normalize_quoting(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                out.push('\'');
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('\'') => out.push_str("''"),
                            Some('n') => out.push('\n'),
                            Some('r') => out.push('\r'),
                            Some('t') => out.push('\t'),
                            Some('Z') => out.push('\u{1a}'),
                            // Kept verbatim: NUL can't be inlined, and MySQL
                            // keeps the backslash for LIKE wildcards.
                            Some(kept @ ('0' | '%' | '_')) => {
                                out.push('\\');
                                out.push(kept);
                            }
                            Some(other) => out.push(other),
                            None => out.push('\\'),
                        },
                        '\'' if chars.peek() == Some(&'\'') => {
                            chars.next();
                            out.push_str("''");
                        }
                        '\'' => {
                            out.push('\'');
                            break;
                        }
                        other => out.push(other),
                    }
                }
            }
            '"' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    out.push(c);
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            out.push('"');
                        } else {
                            break;
                        }
                    }
                }
            }
            '`' => {
                out.push('"');
                while let Some(c) = chars.next() {
                    match c {
                        '`' if chars.peek() == Some(&'`') => {
                            chars.next();
                            out.push('`');
                        }
                        '`' => break,
                        '"' => out.push_str("\"\""),
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            other => out.push(other),
        }
    }

    out
}

/// Index just past the quoted span opening at `start`.
///
/// Expects SQLite quoting, where quotes are escaped by doubling. An
/// unterminated span runs to the end of `bytes`.
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

/// Applies `f` to every stretch of `sql` outside quoted spans.
fn map_unquoted(sql: &str, f: impl Fn(&str) -> String) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut segment_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\'' && bytes[i] != b'"' {
            i += 1;
            continue;
        }

        out.push_str(&f(&sql[segment_start..i]));
        let end = skip_quoted(bytes, i);
        out.push_str(&sql[i..end]);
        i = end;
        segment_start = end;
    }

    out.push_str(&f(&sql[segment_start..]));
    out
}

/// Rewrites bit-value literals (`b'101'`) as integers.
///
/// Expects SQLite quoting. Literals wider than an `i64` are left alone and
/// will fail in the engine.
fn rewrite_bit_literals(sql: &str) -> String {
    let bytes = sql.as_bytes();
    let mut out = String::with_capacity(sql.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' | b'"' => i = skip_quoted(bytes, i),
            b'b' | b'B'
                if bytes.get(i + 1) == Some(&b'\'')
                    && (i == 0 || !is_word_byte(bytes[i - 1])) =>
            {
                let digits_start = i + 2;
                let digits_end = digits_start
                    + bytes[digits_start..]
                        .iter()
                        .take_while(|b| matches!(b, b'0' | b'1'))
                        .count();
                let closed = bytes.get(digits_end) == Some(&b'\'')
                    && bytes.get(digits_end + 1) != Some(&b'\'');
                let digits = &sql[digits_start..digits_end];
                let value = if digits.is_empty() {
                    Ok(0)
                } else {
                    i64::from_str_radix(digits, 2)
                };

                match value {
                    Ok(value) if closed => {
                        out.push_str(&sql[copied..i]);
                        out.push_str(&value.to_string());
                        i = digits_end + 1;
                        copied = i;
                    }
                    _ => i += 1,
                }
            }
            _ => i += 1,
        }
    }

    out.push_str(&sql[copied..]);
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b0[xX]([0-9A-Fa-f]+)\b").expect("valid hex literal regex")
});

/// Rewrites `0xCAFE` hex literals as SQLite blob literals (`X'CAFE'`).
fn rewrite_hex_literals(sql: &str) -> String {
    map_unquoted(sql, |segment| {
        HEX_LITERAL
            .replace_all(segment, |caps: &Captures<'_>| {
                let hex = &caps[1];
                if hex.len() % 2 == 0 {
                    format!("X'{hex}'")
                } else {
                    format!("X'0{hex}'")
                }
            })
            .into_owned()
    })
}

const IDENT: &str = r#"(?:"(?P<dq>(?:[^"]|"")+)"|(?P<bare>\w+))"#;

static AUTO_INCREMENT_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)[(,]\s*{IDENT}[^,]*?\bAUTO_INCREMENT\b"))
        .expect("valid auto-increment column regex")
});

static PRIMARY_KEY_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i),\s*PRIMARY\s+KEY\s*\(\s*{IDENT}\s*\)"))
        .expect("valid primary key regex")
});

static AUTO_INCREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*\bAUTO_INCREMENT\b").expect("valid auto-increment regex")
});

fn ident_of(caps: &Captures<'_>) -> Option<String> {
    caps.name("dq")
        .map(|m| m.as_str().replace("\"\"", "\""))
        .or_else(|| caps.name("bare").map(|m| m.as_str().to_string()))
}

/// Turns `AUTO_INCREMENT` into something SQLite accepts.
///
/// SQLite only allows `AUTOINCREMENT` on an `INTEGER PRIMARY KEY`. When the
/// auto-increment column is the table's single-column primary key, the
/// separate `PRIMARY KEY (...)` clause is folded into the column; otherwise
/// the keyword is dropped.
fn promote_auto_increment(sql: &str) -> String {
    let columns: Vec<String> = AUTO_INCREMENT_COLUMN
        .captures_iter(sql)
        .filter_map(|caps| ident_of(&caps))
        .collect();
    if columns.is_empty() {
        return sql.to_string();
    }

    let keys: Vec<_> = PRIMARY_KEY_CLAUSE.captures_iter(sql).collect();
    if let ([column], [key]) = (columns.as_slice(), keys.as_slice())
        && ident_of(key).is_some_and(|k| k.eq_ignore_ascii_case(column))
        && let Some(clause) = key.get(0)
    {
        let without_key = format!("{}{}", &sql[..clause.start()], &sql[clause.end()..]);
        return AUTO_INCREMENT
            .replace(&without_key, " PRIMARY KEY AUTOINCREMENT")
            .into_owned();
    }

    AUTO_INCREMENT.replace_all(sql, "").into_owned()
}

/// Trims and ends the statement with exactly one `;`.
fn terminate(sql: &str) -> String {
    let body = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    format!("{body};")
}
