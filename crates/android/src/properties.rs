//! Java `.properties` file parsing
//!
//! Follows the `java.util.Properties.load` grammar, which is what Gradle
//! scripts use to read `key.properties`:
//! - `#` and `!` comment lines, blank lines
//! - `=`, `:` or whitespace between key and value
//! - backslash line continuations
//! - `\t \n \r \f \uXXXX` escapes; any other escaped character stands for itself

use keysmith_core::error::{Error, Result, ResultExt};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Syntax error in a properties document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    /// 1-based line on which the offending logical line starts
    pub line: usize,
    /// Description of the problem
    pub message: String,
}

/// Parsed key-value pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Parse properties from text
    pub fn parse(content: &str) -> std::result::Result<Self, SyntaxError> {
        let mut entries = BTreeMap::new();

        for (line, logical) in logical_lines(content) {
            let chars: Vec<char> = logical.chars().collect();
            let (key, value) = split_entry(&chars);
            let key = unescape(key).map_err(|message| SyntaxError { line, message })?;
            let value = unescape(value).map_err(|message| SyntaxError { line, message })?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Read and parse a properties file
    ///
    /// The file is read in one call; the handle is closed before parsing.
    ///
    /// Unlike `java.util.Properties.load(InputStream)`, which decodes bytes
    /// as ISO-8859-1, the file must be valid UTF-8. ASCII files and files
    /// that spell non-ASCII characters as `\uXXXX` escapes read the same
    /// either way; a raw Latin-1 byte such as `0xE9` is a parse error here.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).context(format!("Failed to read {}", path.display()))?;

        let content = String::from_utf8(bytes)
            .map_err(|e| Error::parse(path, 0, "file is not valid UTF-8").with_source(e))?;

        let properties = Self::parse(&content)
            .map_err(|e| Error::parse(path, e.line, e.message.clone()).with_source(e))?;

        tracing::debug!(
            path = %path.display(),
            entries = properties.len(),
            "Loaded properties"
        );

        Ok(properties)
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether a key is present
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// Join physical lines into logical lines, dropping comments and blanks.
///
/// Returns the 1-based starting line of each logical line.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut physical = normalized.split('\n').enumerate();
    let mut logical = Vec::new();

    while let Some((index, raw)) = physical.next() {
        let trimmed = raw.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut joined = String::new();
        let mut current = trimmed;
        loop {
            if ends_with_continuation(current) {
                joined.push_str(&current[..current.len() - 1]);
                match physical.next() {
                    // continuation lines are never comments
                    Some((_, next)) => current = next.trim_start_matches(is_blank),
                    None => break,
                }
            } else {
                joined.push_str(current);
                break;
            }
        }

        logical.push((index + 1, joined));
    }

    logical
}

/// An odd number of trailing backslashes continues the line
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line into raw (still escaped) key and value
fn split_entry(chars: &[char]) -> (&[char], &[char]) {
    let mut key_end = chars.len();
    let mut value_start = chars.len();
    let mut has_separator = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if !escaped && (c == '=' || c == ':') {
            key_end = i;
            value_start = i + 1;
            has_separator = true;
            break;
        }
        if !escaped && is_blank(c) {
            key_end = i;
            value_start = i + 1;
            break;
        }
        escaped = c == '\\' && !escaped;
    }

    while value_start < chars.len() {
        let c = chars[value_start];
        if !is_blank(c) {
            if !has_separator && (c == '=' || c == ':') {
                has_separator = true;
            } else {
                break;
            }
        }
        value_start += 1;
    }

    (&chars[..key_end], &chars[value_start..])
}

/// Resolve escapes. UTF-16 surrogate pairs written as two `\u` escapes
/// combine into one character.
fn unescape(raw: &[char]) -> std::result::Result<String, String> {
    let mut units: Vec<u16> = Vec::with_capacity(raw.len());
    let mut buf = [0u16; 2];
    let mut i = 0;

    while i < raw.len() {
        let mut c = raw[i];
        i += 1;

        if c == '\\' {
            let Some(&next) = raw.get(i) else {
                break;
            };
            i += 1;

            if next == 'u' {
                let digits: String = raw.iter().skip(i).take(4).collect();
                if digits.len() != 4 || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                    return Err("malformed \\uxxxx encoding".to_string());
                }
                let unit = u16::from_str_radix(&digits, 16)
                    .map_err(|_| "malformed \\uxxxx encoding".to_string())?;
                units.push(unit);
                i += 4;
                continue;
            }

            c = match next {
                't' => '\t',
                'r' => '\r',
                'n' => '\n',
                'f' => '\x0c',
                other => other,
            };
        }

        units.extend_from_slice(c.encode_utf16(&mut buf));
    }

    Ok(String::from_utf16_lossy(&units))
}
