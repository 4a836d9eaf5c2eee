//! Formula lexer
//!
//! The lexer never fails. Input it cannot classify becomes a
//! [`Symbol::Error`] token carrying the offending text, which the grammar's
//! error productions absorb into a `#ERROR!` value.

use crate::symbol::Symbol;
use cellcalc_core::ErrorKind;
use lazy_regex::regex_is_match;

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub symbol: Symbol,
    /// Source text of the token. String literals keep their quotes.
    pub text: String,
    /// Byte offset in the formula
    pub position: usize,
}

impl Token {
    pub fn new(symbol: Symbol, text: impl Into<String>, position: usize) -> Self {
        Self {
            symbol,
            text: text.into(),
            position,
        }
    }

    /// The error an `Error` token stands for. Unrecognized text is `Generic`.
    pub fn error_kind(&self) -> ErrorKind {
        ErrorKind::parse(&self.text).unwrap_or(ErrorKind::Generic)
    }
}

/// Split `formula` into tokens, ending with a single [`Symbol::End`]
///
/// Leading whitespace and one leading `=` are skipped.
pub fn tokenize(formula: &str) -> Vec<Token> {
    Lexer::new(formula).collect_tokens()
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

/// Error literals, longest spelling first where one is a prefix of another
const ERROR_LITERALS: [&str; 9] = [
    "#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A", "#ERROR!", "#ERROR",
];

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn collect_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        self.skip_whitespace();
        if self.peek_char() == Some('=') {
            self.advance();
        }

        loop {
            self.skip_whitespace();
            let start = self.pos;
            let Some(c) = self.peek_char() else {
                tokens.push(Token::new(Symbol::End, "", start));
                return tokens;
            };

            let token = match c {
                '0'..='9' => self.number(),
                '"' => self.string(),
                '#' => self.error_literal(),
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.word(),
                _ => self.operator(),
            };
            tokens.push(token);
        }
    }

    fn number(&mut self) -> Token {
        let start = self.pos;
        self.take_digits();

        // Exponent only when digits actually follow, so `1E` stays two tokens
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let after = match self.peek_char_at(1) {
                Some('+' | '-') => self.peek_char_at(2),
                other => other,
            };
            if matches!(after, Some(d) if d.is_ascii_digit()) {
                self.advance();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
                self.take_digits();
            }
        }

        Token::new(Symbol::Number, &self.input[start..self.pos], start)
    }

    fn take_digits(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn string(&mut self) -> Token {
        let start = self.pos;
        self.advance();

        loop {
            match self.advance() {
                Some('"') => {
                    if self.peek_char() == Some('"') {
                        self.advance();
                    } else {
                        return Token::new(Symbol::Text, &self.input[start..self.pos], start);
                    }
                }
                Some(_) => {}
                None => {
                    return Token::new(Symbol::Error, &self.input[start..self.pos], start);
                }
            }
        }
    }

    fn error_literal(&mut self) -> Token {
        let start = self.pos;
        let rest = &self.input[start..];

        for literal in ERROR_LITERALS {
            let matched = rest
                .get(..literal.len())
                .map_or(false, |head| head.eq_ignore_ascii_case(literal));
            if matched {
                self.pos += literal.len();
                return Token::new(Symbol::Error, &self.input[start..self.pos], start);
            }
        }

        self.advance();
        Token::new(Symbol::Error, "#", start)
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while matches!(
            self.peek_char(),
            Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$'
        ) {
            self.advance();
        }
        let word = &self.input[start..self.pos];

        let symbol = if self.peek_char() == Some('(') && is_identifier(word) {
            Symbol::Function
        } else if regex_is_match!(r"^[A-Za-z]+[0-9]+$", word) {
            Symbol::Cell
        } else if regex_is_match!(r"^\$?[A-Za-z]+\$?[0-9]+$", word) {
            Symbol::FixedCell
        } else if is_identifier(word) {
            Symbol::Name
        } else {
            Symbol::Error
        };

        Token::new(symbol, word, start)
    }

    fn operator(&mut self) -> Token {
        let start = self.pos;
        let c = self.advance().unwrap_or_default();

        let symbol = match c {
            '.' => Symbol::Decimal,
            ':' => Symbol::Colon,
            '(' => Symbol::LParen,
            ')' => Symbol::RParen,
            '{' => Symbol::LBrace,
            '}' => Symbol::RBrace,
            ',' => Symbol::Comma,
            ';' => Symbol::Semicolon,
            '&' => Symbol::Amp,
            '=' => Symbol::Eq,
            '+' => Symbol::Plus,
            '-' => Symbol::Minus,
            '*' => Symbol::Star,
            '/' => Symbol::Slash,
            '^' => Symbol::Caret,
            '%' => Symbol::Percent,
            '<' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    Symbol::Le
                }
                Some('>') => {
                    self.advance();
                    Symbol::Ne
                }
                _ => Symbol::Lt,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    Symbol::Ge
                } else {
                    Symbol::Gt
                }
            }
            _ => Symbol::Error,
        };

        Token::new(symbol, &self.input[start..self.pos], start)
    }
}

fn is_identifier(word: &str) -> bool {
    regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_.]*$", word)
}
