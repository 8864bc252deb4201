use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Str(String),

    LBrace,  // {
    RBrace,  // }
    Colon,   // :
    Dot,     // .
    Arrow,   // ->
    Newline, // \n

    Eof,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("Unexpected character {ch:?} on line {line}")]
    UnexpectedChar { ch: char, line: usize },
    #[error("Unterminated string on line {line}")]
    UnterminatedString { line: usize },
}

/// Characters that may appear in an unquoted word.
pub fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                Some('\n') => break,
                Some(c) if c.is_whitespace() => {
                    self.chars.next();
                }
                Some('#') => {
                    while let Some(&c) = self.chars.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.chars.next();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_ident(&mut self, first: char) -> String {
        let mut s = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if is_bare_char(c) {
                s.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        s
    }

    fn read_string(&mut self) -> Result<String, LexError> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                Some('"') => return Ok(s),
                Some('\\') => match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(LexError::UnterminatedString { line: self.line }),
                },
                Some('\n') | None => return Err(LexError::UnterminatedString { line: self.line }),
                Some(c) => s.push(c),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_blanks_and_comments();

        let c = match self.chars.next() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let tok = match c {
            '\n' => {
                self.line += 1;
                Token::Newline
            }
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            ':' => Token::Colon,
            '.' => Token::Dot,
            '-' => {
                if self.chars.peek() == Some(&'>') {
                    self.chars.next();
                    Token::Arrow
                } else {
                    return Err(LexError::UnexpectedChar { ch: c, line: self.line });
                }
            }
            '"' => Token::Str(self.read_string()?),
            c if is_bare_char(c) => Token::Ident(self.read_ident(c)),
            _ => return Err(LexError::UnexpectedChar { ch: c, line: self.line }),
        };

        Ok(tok)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            if tok == Token::Eof {
                tokens.push(tok);
                break;
            }
            tokens.push(tok);
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_block() {
        let tokens = Lexer::new("users: {\n  shape: sql_table\n}").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("users".into()),
                Token::Colon,
                Token::LBrace,
                Token::Newline,
                Token::Ident("shape".into()),
                Token::Colon,
                Token::Ident("sql_table".into()),
                Token::Newline,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_edge_key() {
        let tokens = Lexer::new(r#"users.id -> "order items".user_id"#).tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("users".into()),
                Token::Dot,
                Token::Ident("id".into()),
                Token::Arrow,
                Token::Str("order items".into()),
                Token::Dot,
                Token::Ident("user_id".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a \"quoted\" \\ name""#).tokenize().unwrap();
        assert_eq!(tokens[0], Token::Str(r#"a "quoted" \ name"#.into()));
    }

    #[test]
    fn test_comments() {
        let tokens = Lexer::new("# header\na\nb # trailing").tokenize().unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Newline,
                Token::Ident("a".into()),
                Token::Newline,
                Token::Ident("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_errors_carry_line() {
        let err = Lexer::new("a\nb - c").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnexpectedChar { ch: '-', line: 2 });

        let err = Lexer::new("\"open").tokenize().unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { line: 1 });
    }

    #[test]
    fn test_unicode_ident() {
        let tokens = Lexer::new("ユーザー.名前").tokenize().unwrap();
        assert_eq!(tokens[0], Token::Ident("ユーザー".into()));
        assert_eq!(tokens[2], Token::Ident("名前".into()));
    }
}
