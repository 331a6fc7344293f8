//! The BibTeX parser.
//!
//! Reads `.bib` source into [`Entry`]s. Field values keep their inner braces,
//! since name lists and case protection depend on them. Clean-up for display
//! happens when an entry is formatted.

use crate::error::{Error, Result};
use phf::phf_map;
use slog::{debug, trace, warn};
use std::collections::HashMap;

/// Macros every BibTeX style predefines.
static MONTHS: phf::Map<&'static str, &'static str> = phf_map! {
    "jan" => "January",
    "feb" => "February",
    "mar" => "March",
    "apr" => "April",
    "may" => "May",
    "jun" => "June",
    "jul" => "July",
    "aug" => "August",
    "sep" => "September",
    "oct" => "October",
    "nov" => "November",
    "dec" => "December",
};

/// A single bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The entry type, lower-cased (`article`, `book`, ...).
    pub entry_type: String,
    /// The citation key, case preserved.
    pub key: String,
    fields: HashMap<String, String>,
}

impl Entry {
    pub fn new(entry_type: &str, key: &str, fields: HashMap<String, String>) -> Entry {
        Entry {
            entry_type: entry_type.to_ascii_lowercase(),
            key: key.to_string(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
        }
    }

    /// The raw value of a field. Field names are case-insensitive.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Parse BibTeX source into its entries, in source order.
pub fn parse_bibtex(source: &str) -> Result<Vec<Entry>> {
    debug!(slog_scope::logger(), "Starting BibTeX parsing...");
    let entries = Parser::new(source).entries()?;
    debug!(
        slog_scope::logger(),
        "BibTeX parsed: {} entries",
        entries.len()
    );
    Ok(entries)
}

struct Parser<'s> {
    src: &'s str,
    pos: usize,
    macros: HashMap<String, String>,
}

impl<'s> Parser<'s> {
    fn new(src: &'s str) -> Parser<'s> {
        Parser {
            src,
            pos: 0,
            macros: MONTHS
                .entries()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn line_at(&self, pos: usize) -> usize {
        self.src[..pos].matches('\n').count() + 1
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(self.line_at(self.pos), message)
    }

    /// Read an identifier: entry types, field names, and macro names.
    fn identifier(&mut self) -> &'s str {
        let src = self.src;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && !"{}(),=#\"%".contains(c)) {
            self.bump();
        }
        &src[start..self.pos]
    }

    fn entries(mut self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();

        // Anything outside an entry is a comment.
        while let Some(c) = self.bump() {
            match c {
                '@' => {}
                '%' => {
                    self.skip_line();
                    continue;
                }
                _ => continue,
            }

            let at = self.pos - 1;
            self.skip_whitespace();
            let kind = self.identifier().to_ascii_lowercase();
            self.skip_whitespace();

            let close = match self.peek() {
                Some('{') if !kind.is_empty() => '}',
                Some('(') if !kind.is_empty() => ')',
                // A bare `@comment` comments out nothing but itself.
                _ if kind == "comment" => continue,
                _ => {
                    warn!(
                        slog_scope::logger(),
                        "Line {}: ignoring '@{}' outside an entry",
                        self.line_at(at),
                        kind
                    );
                    continue;
                }
            };
            self.bump();

            match kind.as_str() {
                "comment" | "preamble" => self.skip_balanced(close)?,
                "string" => self.string_definition(close)?,
                _ => entries.push(self.entry(&kind, close)?),
            }
        }

        Ok(entries)
    }

    fn skip_balanced(&mut self, close: char) -> Result<()> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                c if c == close && depth == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(Error::parse(self.line_at(start), "unterminated entry"))
    }

    fn string_definition(&mut self, close: char) -> Result<()> {
        self.skip_whitespace();
        let name = self.identifier().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.error("expected a macro name in @string"));
        }
        self.skip_whitespace();
        if !self.eat('=') {
            return Err(self.error(format!("expected '=' after macro name {}", name)));
        }
        let value = self.value()?;
        trace!(slog_scope::logger(), "Macro {} = {}", name, value);
        self.macros.insert(name, value);

        self.skip_whitespace();
        self.eat(',');
        self.skip_whitespace();
        if !self.eat(close) {
            return Err(self.error("unterminated @string"));
        }
        Ok(())
    }

    fn entry(&mut self, kind: &str, close: char) -> Result<Entry> {
        let start = self.pos;
        self.skip_whitespace();

        let src = self.src;
        let key_start = self.pos;
        while matches!(self.peek(), Some(c) if c != ',' && c != close && !c.is_whitespace()) {
            self.bump();
        }
        let key = &src[key_start..self.pos];

        self.skip_whitespace();
        if key.is_empty() || key.contains('=') || self.peek() == Some('=') {
            return Err(self.error(format!("missing citation key in @{} entry", kind)));
        }
        trace!(slog_scope::logger(), "Parsing entry {}", key);

        let mut fields = HashMap::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(c) if c == close => {
                    self.bump();
                    break;
                }
                Some(',') => {
                    self.bump();
                    continue;
                }
                None => {
                    return Err(Error::parse(
                        self.line_at(start),
                        format!("unterminated entry {}", key),
                    ));
                }
                _ => {}
            }

            let name = self.identifier().to_ascii_lowercase();
            if name.is_empty() {
                let found = self.peek().unwrap_or_default();
                return Err(self.error(format!("unexpected '{}' in entry {}", found, key)));
            }
            self.skip_whitespace();
            if !self.eat('=') {
                return Err(self.error(format!(
                    "expected '=' after field {} in entry {}",
                    name, key
                )));
            }
            let value = self.value()?;

            if fields.contains_key(&name) {
                warn!(
                    slog_scope::logger(),
                    "Repeated field {} in entry {}; keeping the first", name, key
                );
                continue;
            }
            fields.insert(name, value);
        }

        Ok(Entry::new(kind, key, fields))
    }

    /// Read a field value: one or more parts joined with `#`.
    fn value(&mut self) -> Result<String> {
        let mut value = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    value.push_str(self.delimited('}')?);
                }
                Some('"') => {
                    self.bump();
                    value.push_str(self.delimited('"')?);
                }
                Some(c) if c.is_ascii_digit() => value.push_str(self.identifier()),
                Some(_) => {
                    let name = self.identifier().to_ascii_lowercase();
                    if name.is_empty() {
                        return Err(self.error("expected a field value"));
                    }
                    match self.macros.get(&name) {
                        Some(expansion) => value.push_str(expansion),
                        None => warn!(slog_scope::logger(), "Undefined macro {}", name),
                    }
                }
                None => return Err(self.error("expected a field value")),
            }

            self.skip_whitespace();
            if !self.eat('#') {
                return Ok(value);
            }
        }
    }

    /// Read up to the unnested `end`, which is consumed but not returned.
    fn delimited(&mut self, end: char) -> Result<&'s str> {
        let src = self.src;
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                c if c == end && depth == 0 => {
                    let inner = &src[start..self.pos];
                    self.bump();
                    return Ok(inner);
                }
                '{' => depth += 1,
                '}' if depth > 0 => depth -= 1,
                '}' => return Err(self.error("unbalanced '}' in field value")),
                _ => {}
            }
            self.bump();
        }
        Err(Error::parse(self.line_at(start), "unterminated field value"))
    }
}
