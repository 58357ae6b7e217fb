//! Typed token model
//!
//! A [`Token`] is at once the AST node produced by the lexer, the runtime
//! value produced by evaluation, and the medium in which host data is bound
//! into an interpreter. Tokens own their children, so cloning a token is a
//! deep copy and no two trees ever share a node.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::kind::Kind;
use crate::numeric::Decimal;
use crate::stack::ensure_sufficient_stack;

pub type Timestamp = DateTime<FixedOffset>;

static DECIMAL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("decimal pattern is valid")
});

// ============================================================================
// Map
// ============================================================================

/// Insertion-ordered map with linear lookup. Maps in rules are small.
#[derive(Debug, Clone, Default)]
pub struct TokenMap {
    keys: Vec<String>,
    values: Vec<Token>,
}

impl TokenMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn values(&self) -> &[Token] {
        &self.values
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Token> {
        self.position(key).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Token> {
        self.position(key).map(|i| &mut self.values[i])
    }

    /// Replace the value under `key` if present, otherwise append it.
    pub fn insert(&mut self, key: impl Into<String>, value: Token) -> Option<Token> {
        let key = key.into();
        match self.position(&key) {
            Some(i) => Some(std::mem::replace(&mut self.values[i], value)),
            None => {
                self.keys.push(key);
                self.values.push(value);
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Token> {
        let i = self.position(key)?;
        self.keys.remove(i);
        Some(self.values.remove(i))
    }

    /// Slot for `key`, appending `Null` first when the key is absent.
    pub fn get_or_insert_null(&mut self, key: &str) -> &mut Token {
        let i = match self.position(key) {
            Some(i) => i,
            None => {
                self.keys.push(key.to_string());
                self.values.push(Token::Null);
                self.values.len() - 1
            }
        };
        &mut self.values[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Token)> {
        self.keys.iter().map(String::as_str).zip(self.values.iter())
    }
}

// Maps compare as unordered key sets
impl PartialEq for TokenMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>> FromIterator<(K, Token)> for TokenMap {
    fn from_iter<I: IntoIterator<Item = (K, Token)>>(iter: I) -> Self {
        let mut map = TokenMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

// ============================================================================
// Block
// ============================================================================

/// An unevaluated call `(head children...)`. An empty head marks a grouping.
///
/// Lexed trees may nest far deeper than the native stack allows, so cloning,
/// comparing and formatting grow the stack on demand and dropping is
/// iterative.
#[derive(Default)]
pub struct Block {
    pub head: String,
    pub children: Vec<Token>,
}

impl Block {
    pub fn new(head: impl Into<String>, children: Vec<Token>) -> Self {
        Block {
            head: head.into(),
            children,
        }
    }

    /// Take the head and children out of the block.
    pub fn into_parts(mut self) -> (String, Vec<Token>) {
        (
            std::mem::take(&mut self.head),
            std::mem::take(&mut self.children),
        )
    }
}

impl Clone for Block {
    fn clone(&self) -> Self {
        Block {
            head: self.head.clone(),
            children: ensure_sufficient_stack(|| self.children.clone()),
        }
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && ensure_sufficient_stack(|| self.children == other.children)
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        ensure_sufficient_stack(|| {
            f.debug_struct("Block")
                .field("head", &self.head)
                .field("children", &self.children)
                .finish()
        })
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if !self.children.iter().any(Token::has_children) {
            return;
        }
        let mut pending = std::mem::take(&mut self.children);
        while let Some(token) = pending.pop() {
            match token {
                Token::Block(mut block) => pending.append(&mut block.children),
                Token::List(mut items) => pending.append(&mut items),
                Token::Map(mut map) => pending.append(&mut map.values),
                _ => {}
            }
        }
    }
}

// ============================================================================
// Token
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Token {
    Decimal(Decimal),
    String(String),
    Boolean(bool),
    Time(Timestamp),
    #[default]
    Null,
    List(Vec<Token>),
    Map(TokenMap),
    Block(Block),
}

impl Token {
    /// Build an atom from raw text, inferring its kind: `true`/`false` in any
    /// case, then RFC 3339 time, then decimal, otherwise string.
    pub fn from_text(text: &str) -> Token {
        if text.eq_ignore_ascii_case("true") {
            return Token::Boolean(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Token::Boolean(false);
        }
        if let Ok(time) = DateTime::parse_from_rfc3339(text) {
            return Token::Time(time);
        }
        if DECIMAL_PATTERN.is_match(text)
            && let Ok(decimal) = text.parse::<Decimal>()
        {
            return Token::Decimal(decimal);
        }
        Token::String(text.to_string())
    }

    pub fn string(text: impl Into<String>) -> Token {
        Token::String(text.into())
    }

    pub fn decimal(value: impl Into<Decimal>) -> Token {
        Token::Decimal(value.into())
    }

    pub fn block(head: impl Into<String>, children: Vec<Token>) -> Token {
        Token::Block(Block::new(head, children))
    }

    /// An empty block: what the lexer returns for blank input.
    pub fn empty() -> Token {
        Token::Block(Block::default())
    }

    pub fn list(items: Vec<Token>) -> Token {
        Token::List(items)
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Token)>) -> Token {
        Token::Map(entries.into_iter().collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Token::Decimal(_) => Kind::DECIMAL,
            Token::String(_) => Kind::STRING,
            Token::Boolean(_) => Kind::BOOLEAN,
            Token::Time(_) => Kind::TIME,
            Token::Null => Kind::NULL,
            Token::List(_) => Kind::LIST,
            Token::Map(_) => Kind::MAP,
            Token::Block(_) => Kind::TOKEN,
        }
    }

    /// Canonical text: the payload rendering for typed atoms, the string itself,
    /// the head name for blocks, the stringified form for collections.
    pub fn text(&self) -> String {
        match self {
            Token::Decimal(d) => d.to_string(),
            Token::String(s) => s.clone(),
            Token::Boolean(b) => b.to_string(),
            Token::Time(t) => format_time(t),
            Token::Null => String::new(),
            Token::List(_) | Token::Map(_) => self.to_string(),
            Token::Block(block) => block.head.clone(),
        }
    }

    pub fn stringify(&self) -> String {
        self.to_string()
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Token::Block(_))
    }

    fn has_children(&self) -> bool {
        match self {
            Token::Block(block) => !block.children.is_empty(),
            Token::List(items) => !items.is_empty(),
            Token::Map(map) => !map.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Token::Null)
    }

    /// Everything except `false` and `null` is truthy, collections included.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Token::Boolean(false) | Token::Null)
    }

    pub fn as_decimal(&self) -> Option<&Decimal> {
        match self {
            Token::Decimal(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Timestamp> {
        match self {
            Token::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Token]> {
        match self {
            Token::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&TokenMap> {
        match self {
            Token::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Token::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Positional children: list elements, map values, block arguments.
    pub fn children(&self) -> &[Token] {
        match self {
            Token::List(items) => items,
            Token::Map(map) => map.values(),
            Token::Block(block) => &block.children,
            _ => &[],
        }
    }

    pub fn keys(&self) -> &[String] {
        match self {
            Token::Map(map) => map.keys(),
            _ => &[],
        }
    }

    /// Value under `key`, or `Null` when absent or when this is not a map.
    pub fn map_get(&self, key: &str) -> Token {
        self.as_map()
            .and_then(|map| map.get(key))
            .cloned()
            .unwrap_or(Token::Null)
    }

    pub fn map_set(&mut self, key: impl Into<String>, value: Token) -> Result<()> {
        match self {
            Token::Map(map) => {
                map.insert(key, value);
                Ok(())
            }
            other => Err(Error::KindMismatch {
                context: "map_set".to_string(),
                expected: Kind::MAP,
                found: other.kind(),
            }),
        }
    }

    /// One step of a dot path: a map key, or a list index.
    pub fn child(&self, key: &str) -> Option<&Token> {
        match self {
            Token::Map(map) => map.get(key),
            Token::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Follow `path` through nested maps and lists.
    pub fn dot_path<S: AsRef<str>>(&self, path: &[S]) -> Result<&Token> {
        let mut current = self;
        for (depth, key) in path.iter().enumerate() {
            current = current
                .child(key.as_ref())
                .ok_or_else(|| Error::UnboundName(join_path(&path[..=depth])))?;
        }
        Ok(current)
    }

    /// Install `value` at `path`, turning `Null` slots into maps on the way.
    pub fn set_path<S: AsRef<str>>(&mut self, path: &[S], value: Token) -> Result<()> {
        let Some((first, rest)) = path.split_first() else {
            *self = value;
            return Ok(());
        };
        let key = first.as_ref();
        if self.is_null() {
            *self = Token::Map(TokenMap::new());
        }
        let slot = match self {
            Token::Map(map) => map.get_or_insert_null(key),
            Token::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get_mut(i))
                .ok_or_else(|| Error::UnboundName(key.to_string()))?,
            other => {
                return Err(Error::KindMismatch {
                    context: key.to_string(),
                    expected: Kind::COLLECTION,
                    found: other.kind(),
                });
            }
        };
        slot.set_path(rest, value)
    }
}

pub(crate) fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(".")
}

pub(crate) fn format_time(time: &Timestamp) -> String {
    time.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ============================================================================
// Conversions
// ============================================================================

impl From<Decimal> for Token {
    fn from(value: Decimal) -> Self {
        Token::Decimal(value)
    }
}

impl From<i64> for Token {
    fn from(value: i64) -> Self {
        Token::Decimal(Decimal::from(value))
    }
}

impl From<bool> for Token {
    fn from(value: bool) -> Self {
        Token::Boolean(value)
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Token::String(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Token::String(value.to_string())
    }
}

impl From<Timestamp> for Token {
    fn from(value: Timestamp) -> Self {
        Token::Time(value)
    }
}

impl From<Vec<Token>> for Token {
    fn from(value: Vec<Token>) -> Self {
        Token::List(value)
    }
}

impl From<TokenMap> for Token {
    fn from(value: TokenMap) -> Self {
        Token::Map(value)
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

fn escape_string(s: &str) -> String {
    s.replace('"', "\\\"")
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Decimal(d) => write!(f, "{d}"),
            Token::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Token::Boolean(b) => write!(f, "{b}"),
            Token::Time(t) => write!(f, "{}", format_time(t)),
            Token::Null => write!(f, "null"),
            Token::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Token::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                write!(f, "}}")
            }
            Token::Block(block) => ensure_sufficient_stack(|| {
                write!(f, "(")?;
                let mut first = true;
                if !block.head.is_empty() {
                    write!(f, "{}", block.head)?;
                    first = false;
                }
                for child in &block.children {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{child}")?;
                    first = false;
                }
                write!(f, ")")
            }),
        }
    }
}
