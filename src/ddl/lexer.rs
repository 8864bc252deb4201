//! Tokenizer for single DDL statements.
//!
//! Keywords are only recognised in their exact uppercase spelling. Any other
//! casing, and every quoted identifier, comes out as [`Token::Ident`].

use std::iter::Peekable;
use std::str::Chars;

/// DDL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Temporary,
    Temp,
    Alter,
    Add,
    Table,
    Column,
    Only,
    Constraint,
    Primary,
    Key,
    Foreign,
    References,
    Not,
    Null,
    Unique,
    Default,
    Check,
    If,
    Exists,
    On,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

impl Token {
    /// Spelling of a keyword token, `None` for every other token.
    pub fn keyword(&self) -> Option<&'static str> {
        let word = match self {
            Token::Create => "CREATE",
            Token::Temporary => "TEMPORARY",
            Token::Temp => "TEMP",
            Token::Alter => "ALTER",
            Token::Add => "ADD",
            Token::Table => "TABLE",
            Token::Column => "COLUMN",
            Token::Only => "ONLY",
            Token::Constraint => "CONSTRAINT",
            Token::Primary => "PRIMARY",
            Token::Key => "KEY",
            Token::Foreign => "FOREIGN",
            Token::References => "REFERENCES",
            Token::Not => "NOT",
            Token::Null => "NULL",
            Token::Unique => "UNIQUE",
            Token::Default => "DEFAULT",
            Token::Check => "CHECK",
            Token::If => "IF",
            Token::Exists => "EXISTS",
            Token::On => "ON",
            _ => return None,
        };
        Some(word)
    }
}

/// DDL lexer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.advance(); // skip *
        while let Some(c) = self.current_char {
            self.advance();
            if c == '*' && self.current_char == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    /// Reads a quoted identifier or string literal. A doubled quote is an
    /// escaped quote; an unterminated quote runs to the end of input.
    fn read_quoted(&mut self, quote: char) -> String {
        self.advance(); // skip opening quote
        let mut text = String::new();
        while let Some(c) = self.current_char {
            if c == quote {
                if self.peek() == Some(&quote) {
                    text.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    break;
                }
            } else {
                text.push(c);
                self.advance();
            }
        }
        text
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: String) -> Token {
        match s.as_str() {
            "CREATE" => Token::Create,
            "TEMPORARY" => Token::Temporary,
            "TEMP" => Token::Temp,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "TABLE" => Token::Table,
            "COLUMN" => Token::Column,
            "ONLY" => Token::Only,
            "CONSTRAINT" => Token::Constraint,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "NOT" => Token::Not,
            "NULL" => Token::Null,
            "UNIQUE" => Token::Unique,
            "DEFAULT" => Token::Default,
            "CHECK" => Token::Check,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "ON" => Token::On,
            _ => Token::Ident(s),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            match self.current_char {
                None => return Token::Eof,

                Some('-') => {
                    if self.peek() == Some(&'-') {
                        self.skip_line_comment();
                        continue;
                    } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                        return Token::Num(self.read_number());
                    } else {
                        self.advance();
                        continue;
                    }
                }

                Some('/') => {
                    self.advance();
                    if self.current_char == Some('*') {
                        self.skip_block_comment();
                    }
                    continue;
                }

                Some('#') => {
                    self.skip_line_comment();
                    continue;
                }

                Some('(') => {
                    self.advance();
                    return Token::LParen;
                }
                Some(')') => {
                    self.advance();
                    return Token::RParen;
                }
                Some('[') => {
                    self.advance();
                    return Token::LBracket;
                }
                Some(']') => {
                    self.advance();
                    return Token::RBracket;
                }
                Some(',') => {
                    self.advance();
                    return Token::Comma;
                }
                Some(';') => {
                    self.advance();
                    return Token::Semicolon;
                }
                Some('.') => {
                    self.advance();
                    return Token::Dot;
                }

                Some(q @ ('"' | '`')) => {
                    return Token::Ident(self.read_quoted(q));
                }

                Some('\'') => {
                    return Token::Str(self.read_quoted('\''));
                }

                Some(c) if c.is_ascii_digit() => {
                    return Token::Num(self.read_number());
                }

                Some(c) if c.is_alphabetic() || c == '_' => {
                    let ident = self.read_identifier();
                    return Self::keyword_or_ident(ident);
                }

                Some(_) => {
                    // Operators and casts carry nothing the statement shapes need.
                    self.advance();
                    continue;
                }
            }
        }
    }

    /// Collect all tokens, ending with [`Token::Eof`].
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}
