//! Operation script parsing.
//!
//! A script is line-oriented text holding at most one directive per line:
//!
//! ```text
//! Insert:{id:10,nombre:"Ana"}
//! Search:{id:10}
//! Delete:{id:10}
//! ```
//!
//! Blank lines and `#` comments are skipped. Lines that do not start with a
//! directive keyword are skipped with a warning; a directive with a
//! malformed body is an error.

use crate::error::{IndexError, Result};
use crate::types::Key;
use std::fs;
use std::path::Path;

/// A single scripted operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insert { key: Key, payload: String },
    Search { key: Key },
    Delete { key: Key },
}

impl Operation {
    /// Key the operation targets
    pub fn key(&self) -> Key {
        match self {
            Self::Insert { key, .. } | Self::Search { key } | Self::Delete { key } => *key,
        }
    }

    /// Directive keyword, as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "Insert",
            Self::Search { .. } => "Search",
            Self::Delete { .. } => "Delete",
        }
    }
}

/// Read and parse a script file
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<Operation>> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_script(&text)
}

/// Parse script text into operations, in file order
pub fn parse_script(text: &str) -> Result<Vec<Operation>> {
    let mut ops = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((keyword, body)) = line.split_once(':') else {
            tracing::warn!(line = line_no, "skipping line without directive");
            continue;
        };

        let op = match keyword.trim() {
            "Insert" => parse_insert(body),
            "Search" => parse_key_only(body).map(|key| Operation::Search { key }),
            "Delete" => parse_key_only(body).map(|key| Operation::Delete { key }),
            other => {
                tracing::warn!(line = line_no, keyword = other, "skipping unknown directive");
                continue;
            }
        };
        ops.push(op.map_err(|msg| IndexError::parse(line_no, msg))?);
    }

    tracing::debug!(count = ops.len(), "parsed script");
    Ok(ops)
}

fn parse_insert(body: &str) -> std::result::Result<Operation, String> {
    let mut cur = Scanner::new(body);
    cur.expect('{')?;
    let key = cur.field_int("id")?;
    cur.expect(',')?;
    cur.field_name("nombre")?;
    let payload = cur.quoted()?;
    cur.expect('}')?;
    cur.finish()?;
    Ok(Operation::Insert { key, payload })
}

fn parse_key_only(body: &str) -> std::result::Result<Key, String> {
    let mut cur = Scanner::new(body);
    cur.expect('{')?;
    let key = cur.field_int("id")?;
    cur.expect('}')?;
    cur.finish()?;
    Ok(key)
}

/// Whitespace-tolerant scanner over a directive body
struct Scanner<'a> {
    rest: &'a str,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        self.skip_ws();
        match self.rest.strip_prefix(c) {
            Some(rest) => {
                self.rest = rest;
                Ok(())
            }
            None => Err(format!("expected '{c}'")),
        }
    }

    /// Consume `name :`
    fn field_name(&mut self, name: &str) -> std::result::Result<(), String> {
        self.skip_ws();
        match self.rest.strip_prefix(name) {
            Some(rest) => self.rest = rest,
            None => return Err(format!("expected field '{name}'")),
        }
        self.expect(':')
    }

    /// Consume `name : <int>`
    fn field_int(&mut self, name: &str) -> std::result::Result<Key, String> {
        self.field_name(name)?;
        self.skip_ws();
        let end = self
            .rest
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
            .map_or(self.rest.len(), |(i, _)| i);
        let (digits, rest) = self.rest.split_at(end);
        let key = digits
            .parse::<Key>()
            .map_err(|_| format!("invalid {name} '{digits}'"))?;
        self.rest = rest;
        Ok(key)
    }

    /// Consume a double-quoted string
    fn quoted(&mut self) -> std::result::Result<String, String> {
        self.expect('"')?;
        let end = self
            .rest
            .find('"')
            .ok_or_else(|| "unterminated string".to_string())?;
        let value = self.rest[..end].to_string();
        self.rest = &self.rest[end + 1..];
        Ok(value)
    }

    fn finish(&mut self) -> std::result::Result<(), String> {
        self.skip_ws();
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(format!("unexpected trailing input '{}'", self.rest))
        }
    }
}
