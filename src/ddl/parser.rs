//! Keyword-anchored parser for one-statement-per-line DDL logs.
//!
//! Each line is tokenized and classified by the keyword phrases it contains.
//! Fields are extracted relative to those keywords, so extra whitespace and
//! optional clauses (`IF NOT EXISTS`, `ONLY`, schema qualifiers) do not
//! shift anything.

use super::command::{AddColumn, ColumnDef, Command, CommandKind, CreateTable, ForeignKey, Statement};
use super::lexer::{Lexer, Token};
use tracing::{debug, warn};

/// Parse a statement log into statements, one per non-blank line.
pub fn parse_statements(input: &str) -> Vec<Statement> {
    let mut statements = Vec::new();

    for (line_idx, raw) in input.lines().enumerate() {
        let text = raw.trim().trim_end_matches(';').trim_end();
        if text.is_empty() {
            continue;
        }

        let Some(command) = parse_command(text) else {
            debug!(line = line_idx + 1, "skipping comment-only line");
            continue;
        };

        let statement = Statement {
            index: statements.len(),
            line: line_idx + 1,
            text: text.to_string(),
            command,
        };

        match &statement.command {
            Command::Malformed { reason, .. } => {
                debug!(index = statement.index, line = statement.line, %reason, "malformed statement");
            }
            Command::Unrecognized => {
                debug!(index = statement.index, line = statement.line, "unrecognized statement");
            }
            command => {
                debug!(index = statement.index, line = statement.line, %command, "parsed statement");
            }
        }

        statements.push(statement);
    }

    statements
}

/// Parse a single statement. Returns `None` when the text holds no tokens
/// at all (comments only).
pub fn parse_command(text: &str) -> Option<Command> {
    let mut tokens = Lexer::new(text).tokenize();
    if tokens.first() == Some(&Token::Eof) {
        return None;
    }

    // One statement per line: anything after an interior separator is dropped.
    if let Some(end) = tokens.iter().position(|t| *t == Token::Semicolon) {
        tokens.truncate(end);
        tokens.push(Token::Eof);
    }

    Some(StatementParser::new(tokens).parse())
}

struct StatementParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl StatementParser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        match self.current() {
            Token::Ident(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    /// Column name. Keywords are accepted here, spelled as written, so
    /// `ADD COLUMN KEY int` names a column `KEY`.
    fn column_name(&mut self) -> Option<String> {
        if let Some(word) = self.current().keyword() {
            self.advance();
            return Some(word.to_string());
        }
        self.ident()
    }

    /// Position of the first token of `phrase`, if the statement contains it.
    fn find_phrase(&self, phrase: &[Token]) -> Option<usize> {
        self.tokens
            .windows(phrase.len())
            .position(|window| window == phrase)
    }

    fn eat_if_not_exists(&mut self) -> bool {
        if self.current() == &Token::If
            && self.peek_at(1) == &Token::Not
            && self.peek_at(2) == &Token::Exists
        {
            self.pos += 3;
            true
        } else {
            false
        }
    }

    fn eat_if_exists(&mut self) -> bool {
        if self.current() == &Token::If && self.peek_at(1) == &Token::Exists {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    /// Table name, keeping only the last part of `schema.table`.
    fn table_name(&mut self) -> Option<String> {
        let mut name = self.ident()?;
        while self.current() == &Token::Dot {
            self.advance();
            name = self.ident()?;
        }
        Some(name)
    }

    fn parse(mut self) -> Command {
        if self.current() == &Token::Create {
            return self.parse_create_table();
        }
        if let Some(at) = self.find_phrase(&[Token::Add, Token::Column]) {
            return self.parse_add_column(at + 2);
        }
        let fk_phrase = self
            .find_phrase(&[Token::Add, Token::Constraint])
            .or_else(|| self.find_phrase(&[Token::Add, Token::Foreign, Token::Key]));
        if let Some(at) = fk_phrase {
            return self.parse_add_foreign_key(at + 1);
        }
        Command::Unrecognized
    }

    fn parse_create_table(&mut self) -> Command {
        self.advance(); // CREATE
        if !self.eat(&Token::Temporary) {
            self.eat(&Token::Temp);
        }

        // CREATE INDEX, CREATE VIEW and friends are other statement kinds.
        if !self.eat(&Token::Table) {
            return Command::Unrecognized;
        }

        let if_not_exists = self.eat_if_not_exists();
        let Some(table) = self.table_name() else {
            return Command::malformed(CommandKind::CreateTable, "missing table name");
        };

        let mut create = CreateTable {
            table,
            if_not_exists,
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        };

        if self.eat(&Token::LParen) {
            self.parse_table_body(&mut create);
        }

        Command::CreateTable(create)
    }

    /// Best-effort column list: an element that does not parse is dropped
    /// on its own, the table keeps everything else.
    fn parse_table_body(&mut self, create: &mut CreateTable) {
        loop {
            let element = match self.current() {
                Token::RParen => {
                    self.advance();
                    return;
                }
                Token::Eof => {
                    warn!(table = %create.table, "unterminated column list");
                    return;
                }
                Token::Comma => {
                    self.advance();
                    continue;
                }
                Token::Constraint => {
                    // Named constraint; the constraint itself follows the name.
                    self.advance();
                    self.ident();
                    continue;
                }
                Token::Foreign => self
                    .parse_foreign_key_clause(&create.table)
                    .map(|fk| create.foreign_keys.push(fk)),
                // Table constraints and MySQL `KEY name (cols)` / `INDEX` entries.
                Token::Primary | Token::Unique | Token::Check | Token::Key => {
                    self.skip_element();
                    continue;
                }
                Token::Ident(word) if word == "INDEX" => {
                    self.skip_element();
                    continue;
                }
                token if matches!(token, Token::Ident(_)) || token.keyword().is_some() => self
                    .parse_column_def(&create.table)
                    .map(|(column, reference)| {
                        create.columns.push(column);
                        create.foreign_keys.extend(reference);
                    }),
                _ => {
                    self.skip_element();
                    continue;
                }
            };

            if let Err(reason) = element {
                warn!(table = %create.table, %reason, "dropping column list element");
                self.skip_element();
            }
        }
    }

    fn parse_column_def(&mut self, table: &str) -> Result<(ColumnDef, Option<ForeignKey>), String> {
        let name = self.column_name().ok_or("missing column name")?;
        // SQLite allows columns without a declared type.
        let ty = self.parse_type();

        let mut reference = None;
        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Eof => break,
                Token::References => {
                    self.advance();
                    let (foreign_table, foreign_column) = self.parse_reference()?;
                    reference = Some(ForeignKey {
                        table: table.to_string(),
                        column: name.clone(),
                        foreign_table,
                        foreign_column,
                    });
                }
                Token::LParen => self.skip_parenthesized(),
                _ => self.advance(),
            }
        }

        Ok((ColumnDef { name, ty }, reference))
    }

    /// Declared type: words plus parenthesised arguments and array brackets,
    /// up to the first column-constraint keyword.
    fn parse_type(&mut self) -> Option<String> {
        let mut ty = String::new();

        loop {
            match self.current().clone() {
                Token::Ident(word) => {
                    if !ty.is_empty() {
                        ty.push(' ');
                    }
                    ty.push_str(&word);
                    self.advance();
                }
                Token::LParen if !ty.is_empty() => {
                    let args = self.collect_type_args();
                    ty.push_str(&args);
                }
                Token::LBracket if !ty.is_empty() => {
                    self.advance();
                    while let Token::Num(_) = self.current() {
                        self.advance();
                    }
                    self.eat(&Token::RBracket);
                    ty.push_str("[]");
                }
                // Constraint keywords, commas and the closing paren end the type.
                _ => break,
            }
        }

        if ty.is_empty() { None } else { Some(ty) }
    }

    fn collect_type_args(&mut self) -> String {
        self.advance(); // (
        let mut args = Vec::new();

        loop {
            match self.current() {
                Token::Num(n) | Token::Ident(n) => {
                    args.push(n.clone());
                    self.advance();
                }
                Token::Str(s) => {
                    args.push(format!("'{}'", s));
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                _ => self.advance(),
            }
        }

        format!("({})", args.join(","))
    }

    /// `table [(column)]` after REFERENCES. The column defaults to `id`.
    fn parse_reference(&mut self) -> Result<(String, String), String> {
        let target = self.table_name().ok_or("missing referenced table")?;

        let column = if self.current() == &Token::LParen {
            self.single_column("referenced column")?
        } else {
            "id".to_string()
        };

        Ok((target, column))
    }

    /// `FOREIGN KEY (column) REFERENCES table [(column)]`
    fn parse_foreign_key_clause(&mut self, table: &str) -> Result<ForeignKey, String> {
        self.advance(); // FOREIGN
        if !self.eat(&Token::Key) {
            return Err("expected KEY after FOREIGN".to_string());
        }

        let column = self.single_column("foreign key column")?;

        if !self.eat(&Token::References) {
            return Err("missing REFERENCES".to_string());
        }
        let (foreign_table, foreign_column) = self.parse_reference()?;

        Ok(ForeignKey {
            table: table.to_string(),
            column,
            foreign_table,
            foreign_column,
        })
    }

    /// A parenthesised list holding exactly one identifier.
    fn single_column(&mut self, what: &str) -> Result<String, String> {
        if !self.eat(&Token::LParen) {
            return Err(format!("missing {what}"));
        }

        let mut columns = Vec::new();
        loop {
            match self.current() {
                Token::Ident(name) => {
                    columns.push(name.clone());
                    self.advance();
                }
                Token::Comma => self.advance(),
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(format!("unterminated {what} list")),
                _ => self.advance(),
            }
        }

        match columns.len() {
            0 => Err(format!("missing {what}")),
            1 => Ok(columns.remove(0)),
            _ => Err("composite foreign keys are not supported".to_string()),
        }
    }

    /// Table targeted by `ALTER TABLE [ONLY] [IF EXISTS] name`.
    fn parse_alter_target(&mut self) -> Result<String, String> {
        let at = self
            .find_phrase(&[Token::Alter, Token::Table])
            .ok_or("missing ALTER TABLE target")?;
        self.pos = at + 2;
        self.eat(&Token::Only);
        self.eat_if_exists();
        self.table_name().ok_or_else(|| "missing table name".to_string())
    }

    fn parse_add_column(&mut self, at: usize) -> Command {
        let kind = CommandKind::AddColumn;
        let table = match self.parse_alter_target() {
            Ok(table) => table,
            Err(reason) => return Command::malformed(kind, reason),
        };

        self.pos = at;
        self.eat_if_not_exists();

        let Some(name) = self.column_name() else {
            return Command::malformed(kind, "missing column name");
        };
        let Some(ty) = self.parse_type() else {
            return Command::malformed(kind, format!("missing type for column {name}"));
        };

        let mut references = None;
        while !matches!(self.current(), Token::Eof | Token::Comma) {
            if self.eat(&Token::References) {
                match self.parse_reference() {
                    Ok((foreign_table, foreign_column)) => {
                        references = Some(ForeignKey {
                            table: table.clone(),
                            column: name.clone(),
                            foreign_table,
                            foreign_column,
                        });
                    }
                    Err(reason) => return Command::malformed(kind, reason),
                }
            } else {
                self.advance();
            }
        }

        Command::AddColumn(AddColumn {
            table,
            column: ColumnDef { name, ty: Some(ty) },
            references,
        })
    }

    fn parse_add_foreign_key(&mut self, at: usize) -> Command {
        let kind = CommandKind::AddForeignKey;
        let table = match self.parse_alter_target() {
            Ok(table) => table,
            Err(reason) => return Command::malformed(kind, reason),
        };

        self.pos = at;
        if self.eat(&Token::Constraint) {
            self.ident();
        }
        if self.current() != &Token::Foreign {
            return Command::malformed(kind, "ADD CONSTRAINT without FOREIGN KEY");
        }

        match self.parse_foreign_key_clause(&table) {
            Ok(fk) => Command::AddForeignKey(fk),
            Err(reason) => Command::malformed(kind, reason),
        }
    }

    fn skip_parenthesized(&mut self) {
        if !self.eat(&Token::LParen) {
            self.advance();
            return;
        }
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    /// Skip one element of a table body, stopping before the next
    /// top-level comma or the closing parenthesis.
    fn skip_element(&mut self) {
        while !matches!(self.current(), Token::Comma | Token::RParen | Token::Eof) {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }
}
