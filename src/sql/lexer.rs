//! SQL Lexer (Tokenizer)
//!
//! This module converts SQL strings into a stream of tokens. It is the single
//! place that understands quoting, so every parser that needs to split on
//! commas or parentheses works on tokens rather than raw text.

use super::token::{Keyword, Token};
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input. The last token is always `Eof`.
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        let token = match ch {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ';' => Token::Semicolon,
            '.' => Token::Dot,
            '+' => Token::Plus,
            '*' => Token::Asterisk,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' => Token::Eq,
            '-' => {
                // A minus directly followed by a digit is a negative literal
                if self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                    let number = self.read_number();
                    return Ok(Token::Number(format!("-{}", number)));
                }
                Token::Minus
            }
            '<' => match self.peek_char() {
                Some('=') => {
                    self.advance();
                    Token::Lte
                }
                Some('>') => {
                    self.advance();
                    Token::Neq
                }
                _ => Token::Lt,
            },
            '>' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    Token::Gte
                } else {
                    Token::Gt
                }
            }
            '!' => {
                if self.peek_char() == Some('=') {
                    self.advance();
                    Token::Neq
                } else {
                    return Err(Error::UnexpectedCharacter('!', self.position));
                }
            }
            '\'' | '"' => return self.read_string(ch).map(Token::StringLiteral),
            '`' => return self.read_string('`').map(Token::Identifier),
            c if c.is_ascii_digit() => return Ok(Token::Number(self.read_number())),
            c if c.is_alphabetic() || c == '_' || c == '$' => return Ok(self.read_word()),
            c => return Err(Error::UnexpectedCharacter(c, self.position)),
        };

        self.advance();
        Ok(token)
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace and comments (-- and /* */)
    fn skip_trivia(&mut self) {
        loop {
            while !self.is_at_end() && self.current_char().is_whitespace() {
                self.advance();
            }
            if self.is_at_end() {
                return;
            }

            if self.current_char() == '-' && self.peek_char() == Some('-') {
                while !self.is_at_end() && self.current_char() != '\n' {
                    self.advance();
                }
            } else if self.current_char() == '/' && self.peek_char() == Some('*') {
                self.position += 2;
                while !self.is_at_end() {
                    if self.current_char() == '*' && self.peek_char() == Some('/') {
                        self.position += 2;
                        break;
                    }
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    /// Read a quoted run. Doubling the quote or a backslash escapes it.
    fn read_string(&mut self, quote: char) -> Result<String> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == quote {
                if self.peek_char() == Some(quote) {
                    value.push(quote);
                    self.position += 2;
                } else {
                    self.advance(); // skip closing quote
                    return Ok(value);
                }
            } else if ch == '\\' && quote != '`' {
                let escaped = match self.peek_char() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some('0') => '\0',
                    Some(other) => other,
                    None => return Err(Error::UnterminatedString(start_pos)),
                };
                value.push(escaped);
                self.position += 2;
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::UnterminatedString(start_pos))
    }

    /// Read a number, kept as written (integer, decimal or scientific)
    fn read_number(&mut self) -> String {
        let mut value = String::new();
        let mut seen_dot = false;

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_ascii_digit() {
                value.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_char().is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                value.push(ch);
                self.advance();
            } else if (ch == 'e' || ch == 'E')
                && self
                    .peek_char()
                    .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
            {
                // Scientific notation
                value.push(ch);
                self.advance();
                value.push(self.current_char());
                self.advance();
            } else {
                break;
            }
        }

        value
    }

    /// Read an identifier or keyword
    fn read_word(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::from_word(&value) {
            Some(keyword) => Token::Keyword(keyword),
            None => Token::Identifier(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(sql: &str) -> Vec<Token> {
        Lexer::new(sql).tokenize().unwrap()
    }

    fn ident(s: &str) -> Token {
        Token::Identifier(s.to_string())
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            lex("SELECT * FROM users"),
            vec![
                Token::Keyword(Keyword::Select),
                Token::Asterisk,
                Token::Keyword(Keyword::From),
                ident("users"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_select_with_where() {
        assert_eq!(
            lex("SELECT id FROM users WHERE age >= -3.5"),
            vec![
                Token::Keyword(Keyword::Select),
                ident("id"),
                Token::Keyword(Keyword::From),
                ident("users"),
                Token::Keyword(Keyword::Where),
                ident("age"),
                Token::Gte,
                Token::Number("-3.5".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_type_names_are_identifiers() {
        let tokens = lex("id INT PRIMARY KEY AUTO_INCREMENT, name VARCHAR(100)");
        assert_eq!(tokens[1], ident("INT"));
        assert_eq!(tokens[2], Token::Keyword(Keyword::Primary));
        assert_eq!(tokens[3], ident("KEY"));
        assert_eq!(tokens[4], ident("AUTO_INCREMENT"));
        assert_eq!(tokens[9], Token::Number("100".to_string()));
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(lex("'it''s'")[0], Token::StringLiteral("it's".to_string()));
        assert_eq!(lex(r"'a\'b'")[0], Token::StringLiteral("a'b".to_string()));
        assert_eq!(lex("\"Ann\"")[0], Token::StringLiteral("Ann".to_string()));
        assert_eq!(lex("`order`")[0], ident("order"));
        assert_eq!(lex("'a, (b)'")[0], Token::StringLiteral("a, (b)".to_string()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("SELECT 'oops").tokenize().unwrap_err();
        assert!(matches!(err, Error::UnterminatedString(7)));
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = lex("a < b <= c > d >= e <> f != g");
        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Lte));
        assert!(tokens.contains(&Token::Gt));
        assert!(tokens.contains(&Token::Gte));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Neq).count(), 2);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("SELECT -- trailing\n* /* block */ FROM t --"),
            vec![
                Token::Keyword(Keyword::Select),
                Token::Asterisk,
                Token::Keyword(Keyword::From),
                ident("t"),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("SELECT @x").tokenize().unwrap_err();
        assert!(matches!(err, Error::UnexpectedCharacter('@', 7)));
    }
}
