//! Flat text persistence for the tag store.
//!
//! # Responsibility
//! - Write one `tag = literal` line per stored field, tags in lexicographic
//!   order.
//! - Load a file back through a closed literal grammar, rebuild the vessel
//!   registry, and run the post-load notification pass.
//!
//! # Invariants
//! - The literal grammar is closed: `None`, booleans, integers, floats,
//!   quoted strings, lists, tuples. Nothing is ever evaluated as code.
//! - A malformed line is a fatal load error carrying its 1-based line
//!   number; there is no partial-recovery path.
//! - A load always performs, in order: full reset, silent field population,
//!   wholesale plate design rebuild, one notification pass per loaded tag.

use crate::model::value::Value;
use crate::store::tag_store::{StoreError, TagStore};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Result type for persistence APIs.
pub type CodecResult<T> = Result<T, CodecError>;

/// Error for saving or loading the persisted text form.
#[derive(Debug)]
pub enum CodecError {
    /// Underlying file I/O failure.
    Io(std::io::Error),
    /// A line without `=` or with an undecodable literal.
    MalformedFile { line: usize, message: String },
    /// The store rejected an operation while loading.
    Store(StoreError),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::MalformedFile { line, message } => {
                write!(f, "malformed metadata file at line {line}: {message}")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::MalformedFile { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<StoreError> for CodecError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Writes every field as one `tag = literal` line, lexicographic tag order.
pub fn save<W: Write>(store: &TagStore, mut writer: W) -> CodecResult<()> {
    for (tag, value) in store.fields_snapshot() {
        writeln!(writer, "{tag} = {value}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Saves the store to a file, replacing any previous content.
pub fn save_to_path(store: &TagStore, path: impl AsRef<Path>) -> CodecResult<()> {
    let file = File::create(path.as_ref())?;
    save(store, BufWriter::new(file))?;
    info!(
        "event=save module=codec path={} tags={}",
        path.as_ref().display(),
        store.len()
    );
    Ok(())
}

/// Loads the store from a reader.
///
/// Resets the store first, populates fields with notification suppressed,
/// rebuilds the plate design, then notifies subscribers once per loaded
/// tag so presentation state can refresh.
pub fn load<R: BufRead>(store: &TagStore, reader: R) -> CodecResult<()> {
    store.clear()?;
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let (raw_tag, raw_value) =
            line.split_once('=')
                .ok_or_else(|| CodecError::MalformedFile {
                    line: line_number,
                    message: "missing `=` separator".to_string(),
                })?;
        let tag = raw_tag.trim();
        if tag.is_empty() {
            return Err(CodecError::MalformedFile {
                line: line_number,
                message: "empty tag before `=`".to_string(),
            });
        }
        let value =
            parse_literal(raw_value.trim()).map_err(|message| CodecError::MalformedFile {
                line: line_number,
                message,
            })?;
        store.set_field(tag, value, false)?;
    }
    store.rebuild_plate_design()?;
    for tag in store.tags() {
        store.notify(&tag);
    }
    info!("event=load module=codec tags={}", store.len());
    Ok(())
}

/// Loads the store from a file.
pub fn load_from_path(store: &TagStore, path: impl AsRef<Path>) -> CodecResult<()> {
    let file = File::open(path.as_ref())?;
    load(store, BufReader::new(file))
}

/// Parses one literal of the closed value grammar.
///
/// Accepts exactly what `Value`'s `Display` writes, plus double-quoted
/// strings for tolerance with hand-edited files.
pub fn parse_literal(text: &str) -> Result<Value, String> {
    let mut parser = LiteralParser::new(text);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(format!(
            "unexpected trailing content at offset {}",
            parser.offset
        ));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.offset..]
    }

    fn at_end(&self) -> bool {
        self.offset >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance(ch);
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.rest().starts_with(keyword) {
            self.offset += keyword.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), String> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance(ch);
                Ok(())
            }
            Some(ch) => Err(format!(
                "expected `{expected}` at offset {}, found `{ch}`",
                self.offset
            )),
            None => Err(format!("expected `{expected}`, found end of input")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, String> {
        self.skip_whitespace();
        if self.eat_keyword("None") {
            return Ok(Value::None);
        }
        if self.eat_keyword("True") {
            return Ok(Value::Bool(true));
        }
        if self.eat_keyword("False") {
            return Ok(Value::Bool(false));
        }
        match self.peek() {
            Some('\'') | Some('"') => self.parse_string(),
            Some('[') => self.parse_sequence('[', ']').map(Value::List),
            Some('(') => self.parse_tuple(),
            Some(ch) if ch == '-' || ch == '+' || ch.is_ascii_digit() => self.parse_number(),
            Some(ch) => Err(format!(
                "unexpected character `{ch}` at offset {}",
                self.offset
            )),
            None => Err("empty literal".to_string()),
        }
    }

    fn parse_string(&mut self) -> Result<Value, String> {
        let quote = self.peek().ok_or("unterminated string")?;
        self.advance(quote);
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err("unterminated string literal".to_string()),
                Some(ch) if ch == quote => {
                    self.advance(ch);
                    return Ok(Value::Str(text));
                }
                Some('\\') => {
                    self.advance('\\');
                    let escaped = self.peek().ok_or("dangling escape in string literal")?;
                    self.advance(escaped);
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        other => text.push(other),
                    }
                }
                Some(ch) => {
                    self.advance(ch);
                    text.push(ch);
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, String> {
        let start = self.offset;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.advance(self.peek().unwrap_or('-'));
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance(ch);
            } else if ch == '.' || ch == 'e' || ch == 'E' {
                is_float = true;
                self.advance(ch);
                // Allow a sign right after the exponent marker.
                if (ch == 'e' || ch == 'E') && matches!(self.peek(), Some('-') | Some('+')) {
                    self.advance(self.peek().unwrap_or('-'));
                }
            } else {
                break;
            }
        }
        let raw = &self.text[start..self.offset];
        if is_float {
            raw.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("invalid float literal `{raw}`"))
        } else {
            raw.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("invalid integer literal `{raw}`"))
        }
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Result<Vec<Value>, String> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.advance(close);
                return Ok(items);
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(','),
                Some(ch) if ch == close => {}
                Some(ch) => {
                    return Err(format!(
                        "expected `,` or `{close}` at offset {}, found `{ch}`",
                        self.offset
                    ))
                }
                None => return Err(format!("unterminated `{open}` sequence")),
            }
        }
    }

    fn parse_tuple(&mut self) -> Result<Value, String> {
        self.parse_sequence('(', ')').map(Value::Tuple)
    }
}
