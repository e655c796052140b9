// SPDX-License-Identifier: MIT OR Apache-2.0

//! `.properties` document parser.

use crate::adapters::yaml::is_active_document;
use crate::domain::{ConfigValue, Entries, Result};
use crate::ports::{ConfigParser, EnvironmentOracle};

/// Line separating two documents of one properties entry.
const DOCUMENT_SEPARATORS: [&str; 2] = ["#---", "!---"];

/// Parser for `key=value` properties documents.
///
/// Supports `=`, `:` and whitespace separators, `#` and `!` comments, line
/// continuations with a trailing backslash and the usual escapes (`\t`, `\n`,
/// `\r`, `\f`, `\uXXXX`). Every value is a string.
///
/// A `#---` line splits the content into documents. A document holding
/// `spring.config.activate.on-profile` is applied only when the active
/// profiles match it.
///
/// # Examples
///
/// ```rust
/// use k8scfg::adapters::{PropertiesParser, StaticEnvironment};
/// use k8scfg::domain::ConfigValue;
/// use k8scfg::ports::ConfigParser;
///
/// let content = "# database\ndatabase.host=localhost\ndatabase.port: 5432";
/// let result = PropertiesParser::new()
///     .parse(content, &StaticEnvironment::new())
///     .unwrap();
/// assert_eq!(result.get("database.port"), Some(&ConfigValue::from("5432")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }

    /// Splits content into documents on separator lines.
    fn documents(content: &str) -> Vec<String> {
        let mut documents = vec![String::new()];
        for line in content.lines() {
            if DOCUMENT_SEPARATORS.contains(&line.trim()) {
                documents.push(String::new());
            } else if let Some(current) = documents.last_mut() {
                current.push_str(line);
                current.push('\n');
            }
        }
        documents
    }

    /// Joins physical lines into logical lines, dropping comments and blanks.
    fn logical_lines(content: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut continuing = false;

        for raw in content.lines() {
            let line = raw.trim_start();
            if !continuing && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
            {
                continue;
            }

            let trailing = line.chars().rev().take_while(|c| *c == '\\').count();
            if trailing % 2 == 1 {
                current.push_str(&line[..line.len() - 1]);
                continuing = true;
            } else {
                current.push_str(line);
                lines.push(std::mem::take(&mut current));
                continuing = false;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Splits a logical line into its raw key and raw value.
    fn split_line(line: &str) -> (&str, &str) {
        let mut escaped = false;
        let mut key_end = line.len();

        for (i, c) in line.char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '=' | ':' | ' ' | '\t' | '\x0c' => {
                    key_end = i;
                    break;
                }
                _ => {}
            }
        }

        let key = &line[..key_end];
        let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
        }
        (key, rest)
    }

    fn unescape(raw: &str) -> String {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            match chars.next() {
                Some('t') => result.push('\t'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('f') => result.push('\x0c'),
                Some('u') => {
                    let hex: String = chars.by_ref().take(4).collect();
                    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                        Some(decoded) => result.push(decoded),
                        None => {
                            result.push_str("\\u");
                            result.push_str(&hex);
                        }
                    }
                }
                Some(other) => result.push(other),
                None => {}
            }
        }
        result
    }
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str, env: &dyn EnvironmentOracle) -> Result<Entries> {
        let mut result = Entries::new();
        for (index, document) in Self::documents(content).iter().enumerate() {
            let mut entries = Entries::new();
            for line in Self::logical_lines(document) {
                let (key, value) = Self::split_line(&line);
                entries.insert(Self::unescape(key), ConfigValue::from(Self::unescape(value)));
            }

            if is_active_document(&entries, env)? {
                result.extend(entries);
            } else {
                tracing::trace!("Skipping properties document {} not active for current profiles", index);
            }
        }
        Ok(result)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}
