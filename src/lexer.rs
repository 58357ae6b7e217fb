use crate::error::{Error, Result};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Block, Token};

// ============================================================================
// Lexer
// ============================================================================

/// Nesting-aware tokenizer: turns source text into a tree of tokens.
///
/// At every nesting level the first bareword becomes the block head and the
/// remaining items become its children. Quoted strings are always
/// `String`-kinded children; barewords are typed by inference.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

/// One item at a nesting level, before the level is assembled into a block.
enum Item {
    Bare(String),
    Quoted(String),
    Block(Token),
}

impl Item {
    fn into_token(self) -> Token {
        match self {
            Item::Bare(text) => Token::from_text(&text),
            Item::Quoted(text) => Token::String(text),
            Item::Block(token) => token,
        }
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> char {
        if self.position < self.input.len() {
            self.input[self.position]
        } else {
            '\0'
        }
    }

    fn peek_ahead(&self, n: usize) -> char {
        if self.position + n < self.input.len() {
            self.input[self.position + n]
        } else {
            '\0'
        }
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_eof() && is_separator(self.current_char()) {
            self.advance();
        }
    }

    /// Lex the whole input into a single block.
    pub fn lex(mut self) -> Result<Token> {
        let items = self.read_items(None)?;
        Ok(assemble(items).unwrap_or_else(Token::empty))
    }

    /// Read items up to the end of input, or up to the `)` closing the block
    /// opened at `open`.
    fn read_items(&mut self, open: Option<usize>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_eof() {
                return match open {
                    Some(start) => Err(Error::syntax(start, "unterminated block")),
                    None => Ok(items),
                };
            }

            match self.current_char() {
                ')' => {
                    if open.is_none() {
                        return Err(Error::syntax(self.position, "unbalanced paren"));
                    }
                    self.advance();
                    return Ok(items);
                }
                '(' => {
                    let start = self.position;
                    self.advance();
                    let inner = ensure_sufficient_stack(|| self.read_items(Some(start)))?;
                    // Empty blocks are dropped
                    if let Some(token) = assemble(inner) {
                        items.push(Item::Block(token));
                    }
                }
                quote @ ('"' | '\'') => items.push(Item::Quoted(self.read_string(quote)?)),
                _ => items.push(Item::Bare(self.read_bareword())),
            }
        }
    }

    /// Read a quoted string. A backslash escapes the closing quote only.
    fn read_string(&mut self, quote: char) -> Result<String> {
        let start = self.position;
        self.advance();
        let mut content = String::new();

        loop {
            if self.is_eof() {
                return Err(Error::syntax(start, "unterminated string"));
            }
            let ch = self.current_char();
            if ch == '\\' && self.peek_ahead(1) == quote {
                content.push(quote);
                self.advance();
                self.advance();
            } else if ch == quote {
                self.advance();
                return Ok(content);
            } else {
                content.push(ch);
                self.advance();
            }
        }
    }

    fn read_bareword(&mut self) -> String {
        let mut word = String::new();
        while !self.is_eof() {
            let ch = self.current_char();
            if is_separator(ch) || matches!(ch, '(' | ')' | '"' | '\'') {
                break;
            }
            word.push(ch);
            self.advance();
        }
        word
    }
}

/// Build the block for one nesting level. A level holding a single block
/// collapses to that block; an empty level yields nothing.
fn assemble(items: Vec<Item>) -> Option<Token> {
    let mut items = items.into_iter();
    let first = items.next()?;
    let head = match first {
        Item::Block(token) if items.len() == 0 => return Some(token),
        Item::Bare(text) => text,
        other => {
            let children = std::iter::once(other)
                .chain(items)
                .map(Item::into_token)
                .collect();
            return Some(Token::Block(Block::new("", children)));
        }
    };
    Some(Token::Block(Block::new(
        head,
        items.map(Item::into_token).collect(),
    )))
}

/// Lex `input` into a token tree.
pub fn lex(input: &str) -> Result<Token> {
    Lexer::new(input).lex()
}
