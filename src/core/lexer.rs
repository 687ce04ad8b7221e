//! Lanefile tokenizer
//!
//! Produces tokens annotated with 1-based line and column. Newlines are
//! tokens because they terminate statements.

use std::fmt;

/// Token kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    /// `key:` inside argument lists and map literals
    Label(String),
    /// `:name` or `:"any text"`
    Symbol(String),
    Str(String),
    Int(i64),
    True,
    False,
    Nil,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Assign,
    Plus,
    Pipe,
    /// Newline or `;`
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "identifier '{name}'"),
            Self::Label(name) => write!(f, "label '{name}:'"),
            Self::Symbol(name) => write!(f, "symbol ':{name}'"),
            Self::Str(_) => write!(f, "string literal"),
            Self::Int(n) => write!(f, "integer {n}"),
            Self::True => write!(f, "'true'"),
            Self::False => write!(f, "'false'"),
            Self::Nil => write!(f, "'nil'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBrace => write!(f, "'{{'"),
            Self::RBrace => write!(f, "'}}'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Comma => write!(f, "','"),
            Self::Assign => write!(f, "'='"),
            Self::Plus => write!(f, "'+'"),
            Self::Pipe => write!(f, "'|'"),
            Self::Newline => write!(f, "end of line"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// Tokenizer failure, positioned like a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Character-level scanner
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the whole input; the last token is always [`TokenKind::Eof`]
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn error(&self, message: impl Into<String>, line: usize, column: usize) -> LexError {
        LexError {
            message: message.into(),
            line,
            column,
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        // Skip horizontal whitespace, comments and line continuations
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r') => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.peek(), Some('\n') | None) {
                        self.bump();
                    }
                }
                Some('\\') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    if self.peek() == Some('\n') {
                        self.bump();
                    } else {
                        return Err(self.error("unexpected '\\'", line, column));
                    }
                }
                _ => break,
            }
        }

        let (line, column) = (self.line, self.column);
        let make = |kind| Token { kind, line, column };

        let Some(c) = self.bump() else {
            return Ok(make(TokenKind::Eof));
        };

        let kind = match c {
            '\n' | ';' => TokenKind::Newline,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '|' => TokenKind::Pipe,
            '"' => TokenKind::Str(self.string_body(line, column)?),
            ':' => self.symbol(line, column)?,
            '-' if self.peek().is_some_and(|d| d.is_ascii_digit()) => {
                TokenKind::Int(self.integer('-', line, column)?)
            }
            d if d.is_ascii_digit() => TokenKind::Int(self.integer(d, line, column)?),
            a if is_ident_start(a) => {
                let name = self.identifier(a);
                match name.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    "nil" => TokenKind::Nil,
                    _ => {
                        // `key:` but not `key::`
                        let mut ahead = self.chars.clone();
                        if ahead.next() == Some(':') && ahead.next() != Some(':') {
                            self.bump();
                            TokenKind::Label(name)
                        } else {
                            TokenKind::Ident(name)
                        }
                    }
                }
            }
            other => {
                return Err(self.error(format!("unexpected character '{other}'"), line, column));
            }
        };

        Ok(make(kind))
    }

    fn identifier(&mut self, first: char) -> String {
        let mut name = String::from(first);
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                name.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if let Some(c @ ('?' | '!')) = self.peek() {
            name.push(c);
            self.bump();
        }
        name
    }

    /// Digits following `first`, which is either the sign or the leading digit
    fn integer(&mut self, first: char, line: usize, column: usize) -> Result<i64, LexError> {
        let mut digits = String::from(first);
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.bump();
            } else if c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        digits
            .parse()
            .map_err(|_| self.error(format!("integer literal {digits} is out of range"), line, column))
    }

    fn symbol(&mut self, line: usize, column: usize) -> Result<TokenKind, LexError> {
        match self.peek() {
            Some('"') => {
                self.bump();
                Ok(TokenKind::Symbol(self.string_body(line, column)?))
            }
            Some(c) if is_ident_start(c) => {
                self.bump();
                Ok(TokenKind::Symbol(self.identifier(c)))
            }
            _ => Err(self.error("unexpected ':'", line, column)),
        }
    }

    fn string_body(&mut self, line: usize, column: usize) -> Result<String, LexError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(self.error("unterminated string meets end of line", line, column));
                }
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('0') => value.push('\0'),
                    Some(c @ ('"' | '\\')) => value.push(c),
                    Some(other) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => {
                        return Err(self.error("unterminated string meets end of file", line, column));
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_lane_declaration_tokens() {
        assert_eq!(
            kinds("lane :deploy {\n}"),
            vec![
                TokenKind::Ident("lane".into()),
                TokenKind::Symbol("deploy".into()),
                TokenKind::LBrace,
                TokenKind::Newline,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_labels_and_quoted_symbols() {
        assert_eq!(
            kinds(r#"lane2 key: :"my name""#),
            vec![
                TokenKind::Ident("lane2".into()),
                TokenKind::Label("key".into()),
                TokenKind::Symbol("my name".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("# hello\nx = 1 # trailing"),
            vec![
                TokenKind::Newline,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Int(1),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!((tokens[2].line, tokens[2].column), (2, 3));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("sh \"oops\nnext").tokenize().unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            kinds(r#""a\"b\n""#),
            vec![TokenKind::Str("a\"b\n".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(
            kinds("[-9223372036854775808, 9_223_372_036_854_775_807, -12]"),
            vec![
                TokenKind::LBracket,
                TokenKind::Int(i64::MIN),
                TokenKind::Comma,
                TokenKind::Int(i64::MAX),
                TokenKind::Comma,
                TokenKind::Int(-12),
                TokenKind::RBracket,
                TokenKind::Eof,
            ]
        );

        let err = Lexer::new("9223372036854775808").tokenize().unwrap_err();
        assert!(err.message.contains("out of range"));
    }
}
