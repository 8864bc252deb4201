//! Structured form of a parsed DDL statement.

use std::fmt;

/// The three statement shapes the parser recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    CreateTable,
    AddColumn,
    AddForeignKey,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::CreateTable => "create table",
            CommandKind::AddColumn => "add column",
            CommandKind::AddForeignKey => "add foreign key",
        };
        f.write_str(name)
    }
}

/// A column declaration: name plus declared type as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    /// `None` for typeless columns, which only a table body may declare.
    pub ty: Option<String>,
}

/// A single-column foreign key from `table.column` to
/// `foreign_table.foreign_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub table: String,
    pub if_not_exists: bool,
    /// Columns declared in the parenthesised body, in order.
    pub columns: Vec<ColumnDef>,
    /// Inline and table-level foreign keys of the body, in order.
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumn {
    pub table: String,
    pub column: ColumnDef,
    pub references: Option<ForeignKey>,
}

/// One normalized schema operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CreateTable(CreateTable),
    AddColumn(AddColumn),
    AddForeignKey(ForeignKey),
    /// The line matched none of the recognised shapes.
    Unrecognized,
    /// The line matched a recognised keyword but is missing required parts.
    Malformed { kind: CommandKind, reason: String },
}

impl Command {
    pub(crate) fn malformed(kind: CommandKind, reason: impl Into<String>) -> Self {
        Command::Malformed {
            kind,
            reason: reason.into(),
        }
    }

    /// The recognised shape, `None` for unrecognized lines.
    pub fn kind(&self) -> Option<CommandKind> {
        match self {
            Command::CreateTable(_) => Some(CommandKind::CreateTable),
            Command::AddColumn(_) => Some(CommandKind::AddColumn),
            Command::AddForeignKey(_) => Some(CommandKind::AddForeignKey),
            Command::Malformed { kind, .. } => Some(*kind),
            Command::Unrecognized => None,
        }
    }

    /// True when the command carries everything its kind needs.
    pub fn is_valid(&self) -> bool {
        !matches!(self, Command::Unrecognized | Command::Malformed { .. })
    }

    /// The table this command operates on, if it has one.
    pub fn table(&self) -> Option<&str> {
        match self {
            Command::CreateTable(c) => Some(&c.table),
            Command::AddColumn(c) => Some(&c.table),
            Command::AddForeignKey(fk) => Some(&fk.table),
            Command::Unrecognized | Command::Malformed { .. } => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CreateTable(c) => {
                write!(f, "create table {}", c.table)?;
                if !c.columns.is_empty() {
                    write!(f, " ({} columns", c.columns.len())?;
                    if !c.foreign_keys.is_empty() {
                        write!(f, ", {} foreign keys", c.foreign_keys.len())?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
            Command::AddColumn(c) => {
                write!(f, "add column {}.{}", c.table, c.column.name)?;
                if let Some(ty) = &c.column.ty {
                    write!(f, " {}", ty)?;
                }
                if let Some(fk) = &c.references {
                    write!(f, " -> {}.{}", fk.foreign_table, fk.foreign_column)?;
                }
                Ok(())
            }
            Command::AddForeignKey(fk) => write!(
                f,
                "add foreign key {}.{} -> {}.{}",
                fk.table, fk.column, fk.foreign_table, fk.foreign_column
            ),
            Command::Unrecognized => f.write_str("unrecognized"),
            Command::Malformed { kind, reason } => write!(f, "malformed {}: {}", kind, reason),
        }
    }
}

/// One non-blank line of the statement log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 0-based position among non-blank lines; doubles as the step index.
    pub index: usize,
    /// 1-based physical line number in the input.
    pub line: usize,
    /// Trimmed raw text without the trailing separator.
    pub text: String,
    pub command: Command,
}
