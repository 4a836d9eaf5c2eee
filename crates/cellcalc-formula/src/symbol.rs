//! Grammar symbols
//!
//! Terminals come first so that a terminal's id doubles as its column in
//! the action table, and a non-terminal's id minus [`TERMINAL_COUNT`] is its
//! column in the goto table.

use std::fmt;

/// Number of terminal symbols
pub const TERMINAL_COUNT: usize = 29;

/// Number of non-terminal symbols
pub const NONTERMINAL_COUNT: usize = 6;

/// Total number of symbols
pub const SYMBOL_COUNT: usize = TERMINAL_COUNT + NONTERMINAL_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Symbol {
    // Terminals
    End,
    Number,
    Decimal,
    Text,
    Cell,
    FixedCell,
    Colon,
    Function,
    Name,
    Error,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semicolon,
    Amp,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Percent,

    // Non-terminals
    Start,
    Expr,
    Num,
    Args,
    Rows,
    Row,
}

impl Symbol {
    /// Every symbol, in id order
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::End,
        Symbol::Number,
        Symbol::Decimal,
        Symbol::Text,
        Symbol::Cell,
        Symbol::FixedCell,
        Symbol::Colon,
        Symbol::Function,
        Symbol::Name,
        Symbol::Error,
        Symbol::LParen,
        Symbol::RParen,
        Symbol::LBrace,
        Symbol::RBrace,
        Symbol::Comma,
        Symbol::Semicolon,
        Symbol::Amp,
        Symbol::Eq,
        Symbol::Ne,
        Symbol::Lt,
        Symbol::Le,
        Symbol::Gt,
        Symbol::Ge,
        Symbol::Plus,
        Symbol::Minus,
        Symbol::Star,
        Symbol::Slash,
        Symbol::Caret,
        Symbol::Percent,
        Symbol::Start,
        Symbol::Expr,
        Symbol::Num,
        Symbol::Args,
        Symbol::Rows,
        Symbol::Row,
    ];

    /// Stable integer id
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Symbol> {
        Self::ALL.get(index).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.index() < TERMINAL_COUNT
    }

    /// Column in the goto table. `None` for terminals.
    pub fn nonterminal_index(self) -> Option<usize> {
        self.index().checked_sub(TERMINAL_COUNT)
    }

    /// Iterate over terminals only
    pub fn terminals() -> impl Iterator<Item = Symbol> {
        Self::ALL[..TERMINAL_COUNT].iter().copied()
    }

    /// Name used in grammar dumps and syntax errors
    pub fn name(self) -> &'static str {
        match self {
            Symbol::End => "end of formula",
            Symbol::Number => "NUMBER",
            Symbol::Decimal => "'.'",
            Symbol::Text => "TEXT",
            Symbol::Cell => "CELL",
            Symbol::FixedCell => "FIXED_CELL",
            Symbol::Colon => "':'",
            Symbol::Function => "FUNCTION",
            Symbol::Name => "NAME",
            Symbol::Error => "ERROR",
            Symbol::LParen => "'('",
            Symbol::RParen => "')'",
            Symbol::LBrace => "'{'",
            Symbol::RBrace => "'}'",
            Symbol::Comma => "','",
            Symbol::Semicolon => "';'",
            Symbol::Amp => "'&'",
            Symbol::Eq => "'='",
            Symbol::Ne => "'<>'",
            Symbol::Lt => "'<'",
            Symbol::Le => "'<='",
            Symbol::Gt => "'>'",
            Symbol::Ge => "'>='",
            Symbol::Plus => "'+'",
            Symbol::Minus => "'-'",
            Symbol::Star => "'*'",
            Symbol::Slash => "'/'",
            Symbol::Caret => "'^'",
            Symbol::Percent => "'%'",
            Symbol::Start => "Start",
            Symbol::Expr => "Expr",
            Symbol::Num => "Num",
            Symbol::Args => "Args",
            Symbol::Rows => "Rows",
            Symbol::Row => "Row",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_table_order() {
        for (i, sym) in Symbol::ALL.iter().enumerate() {
            assert_eq!(sym.index(), i, "{sym} is out of order");
            assert_eq!(Symbol::from_index(i), Some(*sym));
        }
        assert_eq!(Symbol::from_index(SYMBOL_COUNT), None);
    }

    #[test]
    fn test_terminal_partition() {
        assert_eq!(Symbol::terminals().count(), TERMINAL_COUNT);
        assert!(Symbol::Percent.is_terminal());
        assert!(!Symbol::Start.is_terminal());
        assert_eq!(Symbol::Start.nonterminal_index(), Some(0));
        assert_eq!(Symbol::Row.nonterminal_index(), Some(NONTERMINAL_COUNT - 1));
        assert_eq!(Symbol::Caret.nonterminal_index(), None);
    }
}
