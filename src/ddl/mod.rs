//! DDL statement log parsing.

pub mod command;
mod lexer;
mod parser;

pub use command::{AddColumn, ColumnDef, Command, CommandKind, CreateTable, ForeignKey, Statement};
pub use parser::{parse_command, parse_statements};
