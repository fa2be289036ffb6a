//! SQL Token definitions
//!
//! This module defines all tokens that can appear in SQL statements.
//! Only the words that delimit clauses are reserved; every other word
//! (type names, `AUTO_INCREMENT`, `ENGINE`, `TABLES`, ...) lexes as an
//! identifier and is matched case-insensitively by the parser.

use std::fmt;

/// Reserved words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // DDL
    Create,
    Drop,
    Table,
    Database,
    Schema,

    // DML
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,

    // Clauses
    And,
    Or,
    Not,
    As,
    On,
    Is,
    In,
    Like,

    // Ordering & Grouping
    Order,
    Group,
    By,
    Asc,
    Desc,
    Limit,
    Offset,

    // Constraints
    Primary,
    Unique,
    Default,
    Null,
}

impl Keyword {
    /// Try to parse a keyword from a string
    pub fn from_word(s: &str) -> Option<Keyword> {
        let kw = match s.to_uppercase().as_str() {
            "CREATE" => Keyword::Create,
            "DROP" => Keyword::Drop,
            "TABLE" => Keyword::Table,
            "DATABASE" => Keyword::Database,
            "SCHEMA" => Keyword::Schema,

            "SELECT" => Keyword::Select,
            "INSERT" => Keyword::Insert,
            "UPDATE" => Keyword::Update,
            "DELETE" => Keyword::Delete,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "SET" => Keyword::Set,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,

            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "AS" => Keyword::As,
            "ON" => Keyword::On,
            "IS" => Keyword::Is,
            "IN" => Keyword::In,
            "LIKE" => Keyword::Like,

            "ORDER" => Keyword::Order,
            "GROUP" => Keyword::Group,
            "BY" => Keyword::By,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "LIMIT" => Keyword::Limit,
            "OFFSET" => Keyword::Offset,

            "PRIMARY" => Keyword::Primary,
            "UNIQUE" => Keyword::Unique,
            "DEFAULT" => Keyword::Default,
            "NULL" => Keyword::Null,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Create => "CREATE",
            Keyword::Drop => "DROP",
            Keyword::Table => "TABLE",
            Keyword::Database => "DATABASE",
            Keyword::Schema => "SCHEMA",
            Keyword::Select => "SELECT",
            Keyword::Insert => "INSERT",
            Keyword::Update => "UPDATE",
            Keyword::Delete => "DELETE",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Set => "SET",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::As => "AS",
            Keyword::On => "ON",
            Keyword::Is => "IS",
            Keyword::In => "IN",
            Keyword::Like => "LIKE",
            Keyword::Order => "ORDER",
            Keyword::Group => "GROUP",
            Keyword::By => "BY",
            Keyword::Asc => "ASC",
            Keyword::Desc => "DESC",
            Keyword::Limit => "LIMIT",
            Keyword::Offset => "OFFSET",
            Keyword::Primary => "PRIMARY",
            Keyword::Unique => "UNIQUE",
            Keyword::Default => "DEFAULT",
            Keyword::Null => "NULL",
        }
    }
}

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Reserved word
    Keyword(Keyword),
    /// Identifier or non-reserved word (bare or backtick-quoted)
    Identifier(String),
    /// Numeric literal, kept as written
    Number(String),
    /// String literal (single- or double-quoted), de-quoted
    StringLiteral(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Asterisk,
    /// /
    Slash,
    /// %
    Percent,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    /// End of input
    Eof,
}

impl Token {
    /// Whether this is the given reserved word
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == keyword)
    }

    /// Whether this is a non-reserved word equal to `word` (case-insensitive)
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Identifier(w) if w.eq_ignore_ascii_case(word))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(k) => write!(f, "{}", k.as_str()),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Number(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "end of input"),
        }
    }
}

/// Render a token run back to compact SQL text, e.g. `PRIMARY KEY (id, name)`.
pub fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let tight = match token {
            Token::RParen | Token::Comma | Token::Dot => true,
            _ => matches!(tokens.get(i.wrapping_sub(1)), Some(Token::LParen | Token::Dot)),
        };
        if i > 0 && !tight {
            out.push(' ');
        }
        out.push_str(&token.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(Keyword::from_word("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("Limit"), Some(Keyword::Limit));
        assert_eq!(Keyword::from_word("tables"), None);
    }

    #[test]
    fn test_join_tokens() {
        let tokens = vec![
            Token::Keyword(Keyword::Primary),
            Token::Identifier("KEY".into()),
            Token::LParen,
            Token::Identifier("id".into()),
            Token::Comma,
            Token::Identifier("name".into()),
            Token::RParen,
        ];
        assert_eq!(join_tokens(&tokens), "PRIMARY KEY (id, name)");
    }
}
