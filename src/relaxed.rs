//! Relaxed, comment-tolerant configuration notation.
//!
//! The reader accepts a JSON superset in the spirit of Hjson: comments (`#`,
//! `//`, `/* */`), unquoted keys, members separated by commas or line breaks,
//! trailing commas, single-quoted and `'''` multi-line strings, quoteless
//! strings running to the end of the line, and a root object written without
//! its outer braces.
//!
//! The writer emits one canonical form: two-space indentation, one member per
//! line, bare keys when possible and double-quoted string values. It never
//! writes the host statement terminator `;` and, depending on the
//! [`DelimiterPolicy`], either refuses or escapes the reserved delimiter.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormatError, FormatResult};
use crate::protocol::{DEFAULT_DELIMITER, STATEMENT_TERMINATOR};

/// How the writer treats the reserved delimiter inside string values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimiterPolicy {
    /// Fail with [`FormatError::EncodingCollision`].
    #[default]
    Reject,
    /// Write the character as a `\uXXXX` escape; decoding restores it.
    Escape,
}

/// Encoder/decoder for the relaxed notation, bound to one reserved delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelaxedFormat {
    delimiter: char,
    policy: DelimiterPolicy,
}

impl Default for RelaxedFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER, DelimiterPolicy::default())
    }
}

impl RelaxedFormat {
    pub fn new(delimiter: char, policy: DelimiterPolicy) -> Self {
        Self { delimiter, policy }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn policy(&self) -> DelimiterPolicy {
        self.policy
    }

    /// Serializes `value` into canonical relaxed text.
    pub fn encode<T: Serialize>(&self, value: &T) -> FormatResult<String> {
        let tree =
            serde_json::to_value(value).map_err(|err| FormatError::Serialization(err.to_string()))?;
        self.encode_value(&tree)
    }

    pub fn encode_value(&self, tree: &Value) -> FormatResult<String> {
        let mut out = String::new();
        self.write_value(tree, 0, "", &mut out)?;
        tracing::trace!(bytes = out.len(), "encoded relaxed config");
        Ok(out)
    }

    /// Parses relaxed text into `T`. Either the whole value is produced or an
    /// error is returned.
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> FormatResult<T> {
        let tree = parse_relaxed(text)?;
        serde_json::from_value(tree).map_err(|err| FormatError::Serialization(err.to_string()))
    }

    fn write_value(
        &self,
        value: &Value,
        indent: usize,
        path: &str,
        out: &mut String,
    ) -> FormatResult<()> {
        match value {
            Value::Null => out.push_str("null"),
            Value::Bool(flag) => out.push_str(if *flag { "true" } else { "false" }),
            Value::Number(number) => out.push_str(&number.to_string()),
            Value::String(text) => self.write_string(text, path, out)?,
            Value::Array(items) if items.is_empty() => out.push_str("[]"),
            Value::Array(items) => {
                out.push_str("[\n");
                for (index, item) in items.iter().enumerate() {
                    push_indent(indent + 1, out);
                    self.write_value(item, indent + 1, &format!("{path}[{index}]"), out)?;
                    out.push('\n');
                }
                push_indent(indent, out);
                out.push(']');
            }
            Value::Object(members) if members.is_empty() => out.push_str("{}"),
            Value::Object(members) => {
                out.push_str("{\n");
                for (key, member) in members {
                    let member_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    push_indent(indent + 1, out);
                    if is_bare_key(key) {
                        out.push_str(key);
                    } else {
                        self.write_string(key, &member_path, out)?;
                    }
                    out.push_str(": ");
                    self.write_value(member, indent + 1, &member_path, out)?;
                    out.push('\n');
                }
                push_indent(indent, out);
                out.push('}');
            }
        }
        Ok(())
    }

    fn write_string(&self, text: &str, path: &str, out: &mut String) -> FormatResult<()> {
        let text = normalize_newlines(text);
        out.push('"');
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                STATEMENT_TERMINATOR => push_unicode_escape(c, out),
                c if c == self.delimiter => match self.policy {
                    DelimiterPolicy::Reject => {
                        return Err(FormatError::EncodingCollision {
                            delimiter: self.delimiter,
                            path: if path.is_empty() {
                                "<root>".to_string()
                            } else {
                                path.to_string()
                            },
                        });
                    }
                    DelimiterPolicy::Escape => push_unicode_escape(c, out),
                },
                c if c.is_control() => push_unicode_escape(c, out),
                c => out.push(c),
            }
        }
        out.push('"');
        Ok(())
    }
}

/// Parses relaxed text into a JSON tree.
///
/// Empty input (or input holding only comments) yields an empty object.
pub fn parse_relaxed(text: &str) -> FormatResult<Value> {
    let mut parser = Parser::new(text);
    let value = parser.parse_root()?;
    tracing::trace!(bytes = text.len(), "parsed relaxed config");
    Ok(value)
}

/// Rewrites CRLF and lone CR line endings as LF.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Deepest object/array nesting the parser accepts.
const MAX_NESTING: usize = 64;

fn push_indent(level: usize, out: &mut String) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn push_unicode_escape(c: char, out: &mut String) {
    let mut units = [0u16; 2];
    for unit in c.encode_utf16(&mut units) {
        out.push_str(&format!("\\u{unit:04x}"));
    }
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_punctuator(c: char) -> bool {
    matches!(c, ',' | ':' | '[' | ']' | '{' | '}')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        // a byte order mark is not part of the payload
        let pos = if src.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
        Self { src, pos, depth: 0 }
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> FormatError {
        FormatError::parse_failure(self.src, position, reason)
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn parse_root(&mut self) -> FormatResult<Value> {
        self.skip_trivia()?;
        let value = match self.peek() {
            None => Value::Object(Map::new()),
            Some('{') | Some('[') => self.parse_value()?,
            Some(_) if self.at_member() => Value::Object(self.parse_members(None)?),
            Some(_) => self.parse_value()?,
        };
        self.skip_trivia()?;
        if self.pos < self.src.len() {
            return Err(self.error(self.pos, "unexpected characters after the root value"));
        }
        Ok(value)
    }

    /// Skips whitespace and comments. Returns whether a line break was crossed.
    fn skip_trivia(&mut self) -> FormatResult<bool> {
        let mut crossed_line = false;
        loop {
            let rest = self.rest();
            let Some(c) = rest.chars().next() else {
                return Ok(crossed_line);
            };
            if c.is_whitespace() {
                crossed_line |= c == '\n';
                self.pos += c.len_utf8();
            } else if c == '#' || rest.starts_with("//") {
                self.pos += rest.find('\n').unwrap_or(rest.len());
            } else if rest.starts_with("/*") {
                let Some(end) = rest[2..].find("*/") else {
                    return Err(self.error(self.pos, "unterminated block comment"));
                };
                crossed_line |= rest[2..2 + end].contains('\n');
                self.pos += end + 4;
            } else {
                return Ok(crossed_line);
            }
        }
    }

    /// Whether the input at the cursor reads as `key:`.
    fn at_member(&mut self) -> bool {
        let start = self.pos;
        let is_member = self.parse_key().is_ok()
            && self.skip_trivia().is_ok()
            && self.peek() == Some(':');
        self.pos = start;
        is_member
    }

    fn parse_members(&mut self, closing: Option<char>) -> FormatResult<Map<String, Value>> {
        let mut members = Map::new();
        loop {
            self.skip_trivia()?;
            match (self.peek(), closing) {
                (None, None) => return Ok(members),
                (None, Some(close)) => {
                    return Err(self.error(self.pos, format!("expected '{close}' before end of input")))
                }
                (Some(c), Some(close)) if c == close => {
                    self.pos += 1;
                    return Ok(members);
                }
                _ => {}
            }
            let key = self.parse_key()?;
            self.skip_trivia()?;
            if self.peek() != Some(':') {
                return Err(self.error(self.pos, format!("expected ':' after key '{key}'")));
            }
            self.pos += 1;
            self.skip_trivia()?;
            let value = self.parse_value()?;
            members.insert(key, value);
            self.expect_separator(closing)?;
        }
    }

    fn parse_array(&mut self) -> FormatResult<Vec<Value>> {
        let open = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(self.error(open, "array is never closed")),
                Some(']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(_) => {}
            }
            items.push(self.parse_value()?);
            self.expect_separator(Some(']'))?;
        }
    }

    /// After a value: a comma, a line break, the closing bracket or end of input.
    fn expect_separator(&mut self, closing: Option<char>) -> FormatResult<()> {
        let crossed_line = self.skip_trivia()?;
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                Ok(())
            }
            None => Ok(()),
            Some(c) if Some(c) == closing => Ok(()),
            Some(_) if crossed_line => Ok(()),
            Some(c) => Err(self.error(self.pos, format!("expected ',' or a line break, found '{c}'"))),
        }
    }

    fn parse_key(&mut self) -> FormatResult<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_quoted(quote),
            _ => {
                let start = self.pos;
                let len = self
                    .rest()
                    .find(|c: char| c.is_whitespace() || is_punctuator(c))
                    .unwrap_or(self.rest().len());
                if len == 0 {
                    return Err(self.error(start, "expected a key"));
                }
                self.pos += len;
                Ok(self.src[start..self.pos].to_string())
            }
        }
    }

    fn enter(&mut self) -> FormatResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(self.pos, format!("nesting deeper than {MAX_NESTING} levels")));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> FormatResult<Value> {
        match self.peek() {
            None => Err(self.error(self.pos, "expected a value")),
            Some('{') => {
                self.enter()?;
                self.pos += 1;
                let members = self.parse_members(Some('}'))?;
                self.depth -= 1;
                Ok(Value::Object(members))
            }
            Some('[') => {
                self.enter()?;
                let items = self.parse_array()?;
                self.depth -= 1;
                Ok(Value::Array(items))
            }
            Some('"') => Ok(Value::String(self.parse_quoted('"')?)),
            Some('\'') if self.rest().starts_with("'''") => {
                Ok(Value::String(self.parse_multiline()?))
            }
            Some('\'') => Ok(Value::String(self.parse_quoted('\'')?)),
            Some(c) if is_punctuator(c) => Err(self.error(self.pos, format!("unexpected '{c}'"))),
            Some(_) => Ok(self.parse_quoteless()),
        }
    }

    /// A bare token: a literal when the token is exactly a number, `true`,
    /// `false` or `null`, otherwise a string running to the end of the line.
    fn parse_quoteless(&mut self) -> Value {
        let rest = self.rest();
        let line = &rest[..rest.find('\n').unwrap_or(rest.len())];

        let token_len = line
            .find(|c: char| c.is_whitespace() || matches!(c, ',' | ']' | '}' | '#' | '/'))
            .unwrap_or(line.len());
        let (token, after) = line.split_at(token_len);
        let after = after.trim_start();
        let ends_token = after.is_empty()
            || after.starts_with(&[',', ']', '}', '#'][..])
            || after.starts_with("//")
            || after.starts_with("/*");
        if ends_token {
            if let Ok(literal @ (Value::Number(_) | Value::Bool(_) | Value::Null)) =
                serde_json::from_str::<Value>(token)
            {
                self.pos += token_len;
                return literal;
            }
        }

        self.pos += line.len();
        Value::String(line.trim_end().to_string())
    }

    fn parse_quoted(&mut self, quote: char) -> FormatResult<String> {
        let open = self.pos;
        self.pos += quote.len_utf8();
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(open, "string is never closed"));
            };
            self.pos += c.len_utf8();
            match c {
                c if c == quote => break,
                '\\' => self.parse_escape(&mut out)?,
                '\n' | '\r' => {
                    return Err(self.error(self.pos - 1, "line break inside a quoted string"))
                }
                c => out.push(c),
            }
        }
        Ok(normalize_newlines(&out).into_owned())
    }

    fn parse_escape(&mut self, out: &mut String) -> FormatResult<()> {
        let at = self.pos - 1;
        let Some(c) = self.peek() else {
            return Err(self.error(at, "escape at end of input"));
        };
        self.pos += c.len_utf8();
        match c {
            '"' | '\'' | '\\' | '/' => out.push(c),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'u' => {
                let unit = self.parse_hex4(at)?;
                let code = if (0xD800..0xDC00).contains(&unit) {
                    if !self.rest().starts_with("\\u") {
                        return Err(self.error(at, "high surrogate without a low surrogate"));
                    }
                    self.pos += 2;
                    let low = self.parse_hex4(at)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.error(at, "invalid low surrogate"));
                    }
                    0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    unit
                };
                let decoded = char::from_u32(code)
                    .ok_or_else(|| self.error(at, "escape is not a unicode scalar value"))?;
                out.push(decoded);
            }
            other => return Err(self.error(at, format!("unknown escape '\\{other}'"))),
        }
        Ok(())
    }

    fn parse_hex4(&mut self, at: usize) -> FormatResult<u32> {
        let digits = self
            .rest()
            .get(..4)
            .filter(|digits| digits.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error(at, "expected four hex digits"))?;
        let unit = u32::from_str_radix(digits, 16)
            .map_err(|_| self.error(at, "expected four hex digits"))?;
        self.pos += 4;
        Ok(unit)
    }

    /// `'''` string; indentation up to the column of the opening quotes is removed.
    fn parse_multiline(&mut self) -> FormatResult<String> {
        let open = self.pos;
        let line_start = self.src[..open].rfind('\n').map_or(0, |idx| idx + 1);
        let column = self.src[line_start..open].chars().count();

        self.pos += 3;
        let Some(len) = self.rest().find("'''") else {
            return Err(self.error(open, "multi-line string is never closed"));
        };
        let raw = normalize_newlines(&self.rest()[..len]).into_owned();
        self.pos += len + 3;

        let mut body = raw.as_str();
        if let Some(newline) = body.find('\n') {
            if body[..newline].trim().is_empty() {
                body = &body[newline + 1..];
            }
        }
        match body.rfind('\n') {
            Some(newline) if body[newline + 1..].trim().is_empty() => body = &body[..newline],
            None if body.trim().is_empty() => body = "",
            _ => {}
        }

        let lines: Vec<&str> = body
            .split('\n')
            .map(|line| {
                let strip = line
                    .char_indices()
                    .take(column)
                    .take_while(|(_, c)| *c == ' ' || *c == '\t')
                    .map(|(idx, c)| idx + c.len_utf8())
                    .last()
                    .unwrap_or(0);
                &line[strip..]
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
#[path = "tests/relaxed_tests.rs"]
mod tests;
