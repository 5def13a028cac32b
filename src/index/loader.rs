//! Loading of `searchindex.js` artifacts.
//!
//! The artifact is a JavaScript expression, `Search.setIndex({...})`,
//! whose argument is an object literal rather than strict JSON: most keys
//! are bare identifiers (`docnames:`, `terms:`) with quoted keys mixed in
//! (`"sphinx.domains.py"`, `"typeof"`). The loader strips the call
//! wrapper, parses the literal subset into a [`serde_json::Value`], and
//! deserializes that into the typed [`SearchIndex`] model, normalizing
//! postings and flattening the object inventory along the way.

use crate::index::types::{
    resolve_anchor, DocId, EnvVersion, ObjectEntry, ObjectType, SearchIndex,
};
use anyhow::{bail, Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Load and normalize an index artifact from disk
pub fn load_index(path: &Path) -> Result<SearchIndex> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read index file: {}", path.display()))?;
    let value = parse_payload(&src)
        .with_context(|| format!("Failed to parse index file: {}", path.display()))?;
    index_from_value(value)
}

/// Parse the raw artifact text into a JSON value.
///
/// Accepts the `Search.setIndex({...})` call form (with an optional
/// trailing semicolon), as well as a bare object literal or strict JSON.
pub fn parse_payload(src: &str) -> Result<Value> {
    let trimmed = src.trim_start_matches('\u{feff}').trim();

    let body = if let Some(rest) = trimmed.strip_prefix("Search.setIndex(") {
        let rest = rest.trim_end();
        let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
        match rest.strip_suffix(')') {
            Some(inner) => inner,
            None => bail!("Unterminated Search.setIndex(...) call"),
        }
    } else {
        trimmed
    };

    let mut parser = LiteralParser::new(body);
    parser.skip_whitespace();
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if !parser.is_eof() {
        bail!("Trailing garbage after index payload at byte {}", parser.pos);
    }
    Ok(value)
}

/// Recursive-descent parser for the object-literal subset the generator
/// emits: objects with bare or quoted keys, arrays, strings, numbers,
/// `true`/`false`/`null`.
struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_value(&mut self) -> Result<Value> {
        self.skip_whitespace();
        match self.peek_char() {
            Some('{') => self.parse_object(),
            Some('[') => self.parse_array(),
            Some('"') | Some('\'') => self.parse_string().map(Value::String),
            Some(ch) if ch.is_ascii_digit() || ch == '-' => self.parse_number(),
            Some(ch) if ch.is_ascii_alphabetic() => self.parse_keyword(),
            Some(ch) => bail!("Unexpected character '{}' at byte {}", ch, self.pos),
            None => bail!("Unexpected end of payload at byte {}", self.pos),
        }
    }

    fn parse_object(&mut self) -> Result<Value> {
        self.advance(); // '{'
        let mut map = Map::new();

        self.skip_whitespace();
        if self.consume_char('}') {
            return Ok(Value::Object(map));
        }

        loop {
            self.skip_whitespace();
            let key = self.parse_key()?;

            self.skip_whitespace();
            if !self.consume_char(':') {
                bail!("Expected ':' after key \"{}\" at byte {}", key, self.pos);
            }

            let value = self.parse_value()?;
            map.insert(key, value);

            self.skip_whitespace();
            if self.consume_char(',') {
                continue;
            }
            if self.consume_char('}') {
                return Ok(Value::Object(map));
            }
            bail!("Expected ',' or '}}' in object at byte {}", self.pos);
        }
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek_char() {
            Some('"') | Some('\'') => self.parse_string(),
            Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' => {
                let start = self.pos;
                while let Some(ch) = self.peek_char() {
                    if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Ok(self.input[start..self.pos].to_string())
            }
            Some(ch) => bail!("Invalid object key starting with '{}' at byte {}", ch, self.pos),
            None => bail!("Unexpected end of payload in object at byte {}", self.pos),
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        self.advance(); // '['
        let mut items = Vec::new();

        self.skip_whitespace();
        if self.consume_char(']') {
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.parse_value()?);

            self.skip_whitespace();
            if self.consume_char(',') {
                continue;
            }
            if self.consume_char(']') {
                return Ok(Value::Array(items));
            }
            bail!("Expected ',' or ']' in array at byte {}", self.pos);
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let quote = match self.peek_char() {
            Some(q @ ('"' | '\'')) => q,
            _ => bail!("Expected string at byte {}", self.pos),
        };
        self.advance();

        let mut out = String::new();
        loop {
            match self.peek_char() {
                None => bail!("Unterminated string at byte {}", self.pos),
                Some(ch) if ch == quote => {
                    self.advance();
                    return Ok(out);
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        Some('n') => out.push('\n'),
                        Some('t') => out.push('\t'),
                        Some('r') => out.push('\r'),
                        Some('b') => out.push('\u{8}'),
                        Some('f') => out.push('\u{c}'),
                        Some('u') => {
                            self.advance();
                            out.push(self.parse_unicode_escape()?);
                            continue;
                        }
                        Some(c) => out.push(c),
                        None => bail!("Unterminated escape at byte {}", self.pos),
                    }
                    self.advance();
                }
                Some(ch) => {
                    out.push(ch);
                    self.advance();
                }
            }
        }
    }

    fn parse_unicode_escape(&mut self) -> Result<char> {
        let first = self.parse_hex4()?;
        // Surrogate pairs arrive as two consecutive \uXXXX escapes
        if (0xD800..0xDC00).contains(&first) {
            if !(self.consume_char('\\') && self.consume_char('u')) {
                bail!("Lone high surrogate in string at byte {}", self.pos);
            }
            let second = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&second) {
                bail!("Invalid low surrogate in string at byte {}", self.pos);
            }
            let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            return char::from_u32(combined)
                .with_context(|| format!("Invalid surrogate pair at byte {}", self.pos));
        }
        char::from_u32(first)
            .with_context(|| format!("Invalid unicode escape at byte {}", self.pos))
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .with_context(|| format!("Truncated unicode escape at byte {}", self.pos))?;
        let value = u32::from_str_radix(hex, 16)
            .with_context(|| format!("Invalid unicode escape \"{}\" at byte {}", hex, self.pos))?;
        self.pos += 4;
        Ok(value)
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.pos;
        if self.peek_char() == Some('-') {
            self.advance();
        }
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' || ch == '+' || ch == '-'
            {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.input[start..self.pos];
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::Number(Number::from(n)));
        }
        let f: f64 = text
            .parse()
            .with_context(|| format!("Invalid number \"{}\" at byte {}", text, start))?;
        Number::from_f64(f)
            .map(Value::Number)
            .with_context(|| format!("Non-finite number \"{}\" at byte {}", text, start))
    }

    fn parse_keyword(&mut self) -> Result<Value> {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }

        match &self.input[start..self.pos] {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            other => bail!("Unexpected identifier \"{}\" at byte {}", other, start),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}

/// Raw shape of the payload, field for field, before normalization
#[derive(Debug, Deserialize)]
struct RawIndex {
    #[serde(default)]
    docnames: Vec<String>,
    #[serde(default)]
    filenames: Vec<String>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    terms: FxHashMap<String, RawPostings>,
    #[serde(default)]
    titleterms: FxHashMap<String, RawPostings>,
    #[serde(default)]
    objects: FxHashMap<String, FxHashMap<String, RawObject>>,
    #[serde(default)]
    objnames: FxHashMap<String, (String, String, String)>,
    #[serde(default)]
    objtypes: FxHashMap<String, String>,
    #[serde(default)]
    envversion: EnvVersion,
}

/// Term postings: a lone document index or an array of them
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPostings {
    One(i64),
    Many(Vec<i64>),
}

/// Object entry as stored: `[doc, type_id, priority, anchor]`
#[derive(Debug, Deserialize)]
struct RawObject(i64, i64, i64, String);

/// Deserialize and normalize a parsed payload into the typed model
pub fn index_from_value(value: Value) -> Result<SearchIndex> {
    let raw: RawIndex =
        serde_json::from_value(value).context("Index payload has unexpected shape")?;

    let mut terms = FxHashMap::default();
    for (term, postings) in raw.terms {
        terms.insert(term.clone(), normalize_postings(&term, postings)?);
    }

    let mut titleterms = FxHashMap::default();
    for (term, postings) in raw.titleterms {
        titleterms.insert(term.clone(), normalize_postings(&term, postings)?);
    }

    let mut objtypes: FxHashMap<String, ObjectType> = FxHashMap::default();
    for (type_id, (domain, name, label)) in raw.objnames {
        objtypes.insert(
            type_id,
            ObjectType {
                domain,
                name,
                label,
            },
        );
    }
    // objtypes can describe ids that objnames lacks; synthesize a label
    for (type_id, qualified) in raw.objtypes {
        objtypes.entry(type_id).or_insert_with(|| {
            let (domain, name) = qualified.split_once(':').unwrap_or(("", &qualified));
            ObjectType {
                domain: domain.to_string(),
                name: name.to_string(),
                label: qualified.clone(),
            }
        });
    }

    let mut objects = Vec::new();
    for (prefix, entries) in raw.objects {
        for (name, RawObject(doc, type_id, priority, anchor)) in entries {
            let full_name = if prefix.is_empty() {
                name
            } else {
                format!("{}.{}", prefix, name)
            };
            let doc = match DocId::try_from(doc) {
                Ok(doc) => doc,
                Err(_) => bail!(
                    "Object \"{}\" has out-of-range document index {}",
                    full_name,
                    doc
                ),
            };
            let type_id = type_id.to_string();
            let type_name = objtypes
                .get(&type_id)
                .map(|t| t.name.as_str())
                .unwrap_or("");
            let anchor = resolve_anchor(&anchor, &full_name, type_name);
            objects.push(ObjectEntry {
                name: full_name,
                doc,
                type_id,
                priority,
                anchor,
            });
        }
    }
    objects.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(SearchIndex {
        docnames: raw.docnames,
        filenames: raw.filenames,
        titles: raw.titles,
        terms,
        titleterms,
        objects,
        objtypes,
        envversion: raw.envversion,
    })
}

/// Sort, deduplicate, and range-check raw postings
fn normalize_postings(term: &str, postings: RawPostings) -> Result<Vec<DocId>> {
    let raw = match postings {
        RawPostings::One(doc) => vec![doc],
        RawPostings::Many(docs) => docs,
    };

    let mut docs = Vec::with_capacity(raw.len());
    for doc in raw {
        match DocId::try_from(doc) {
            Ok(doc) => docs.push(doc),
            Err(_) => bail!("Term \"{}\" has out-of-range document index {}", term, doc),
        }
    }
    docs.sort_unstable();
    docs.dedup();
    Ok(docs)
}
