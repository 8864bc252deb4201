//! Compiler from diagram source back to a [`Graph`].
//!
//! Every declaration is replayed through the [`DiagramGraph`] interface, so
//! source text and graph edits share one set of rules. Grammar:
//!
//! ```text
//! line  := path ':' '{' NL (entry NL)* '}'
//!        | path ':' value
//!        | path '->' path
//!        | path
//! entry := segment ':' value | segment
//! ```
//!
//! Repeated declarations of an object or field merge into the existing one.

use crate::graph::key::Segment;
use crate::graph::lexer::{Lexer, Token};
use crate::graph::{DiagramGraph, Graph, GraphError};

use super::RenderError;

/// Compile diagram source into a graph.
pub fn compile(source: &str) -> Result<Graph, RenderError> {
    let tokens = Lexer::new(source).tokenize()?;
    Compiler {
        tokens,
        pos: 0,
        line: 1,
        graph: Graph::new(),
    }
    .run()
}

struct Compiler {
    tokens: Vec<Token>,
    pos: usize,
    line: usize,
    graph: Graph,
}

impl Compiler {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok == Token::Newline {
            self.line += 1;
        }
        self.pos += 1;
        tok
    }

    fn skip_newlines(&mut self) {
        while *self.peek() == Token::Newline {
            self.advance();
        }
    }

    fn error(&self, message: impl Into<String>) -> RenderError {
        RenderError::Compile {
            line: self.line,
            message: message.into(),
        }
    }

    fn graph_error(&self, source: GraphError) -> RenderError {
        RenderError::Graph {
            line: self.line,
            source,
        }
    }

    fn run(mut self) -> Result<Graph, RenderError> {
        loop {
            self.skip_newlines();
            if *self.peek() == Token::Eof {
                return Ok(self.graph);
            }
            self.declaration()?;
            if !matches!(self.peek(), Token::Newline | Token::Eof) {
                return Err(self.error(format!("unexpected {:?} at end of line", self.peek())));
            }
        }
    }

    fn segment(&mut self) -> Result<Segment, RenderError> {
        let segment = Segment::from_token(self.peek()).ok_or_else(|| self.error("expected a name"))?;
        self.advance();
        Ok(segment)
    }

    /// `segment(.segment)*` rendered back to an escaped key.
    fn path(&mut self) -> Result<String, RenderError> {
        let mut key = self.segment()?.to_string();
        while *self.peek() == Token::Dot {
            self.advance();
            key.push('.');
            key.push_str(&self.segment()?.to_string());
        }
        Ok(key)
    }

    fn value(&mut self) -> Result<String, RenderError> {
        match self.advance() {
            Token::Ident(value) | Token::Str(value) => Ok(value),
            tok => Err(self.error(format!("expected a value, found {:?}", tok))),
        }
    }

    fn declaration(&mut self) -> Result<(), RenderError> {
        let key = self.path()?;

        match self.peek() {
            Token::Arrow => {
                self.advance();
                let target = self.path()?;
                self.create(&format!("{} -> {}", key, target))
            }
            Token::Colon => {
                self.advance();
                if *self.peek() == Token::LBrace {
                    self.advance();
                    self.declare(&key)?;
                    self.block(&key)
                } else {
                    let value = self.value()?;
                    self.set(&key, &value)
                }
            }
            _ => self.declare(&key),
        }
    }

    fn block(&mut self, object: &str) -> Result<(), RenderError> {
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    return Ok(());
                }
                Token::Eof => return Err(self.error(format!("unclosed block for {}", object))),
                _ => {}
            }

            let key = format!("{}.{}", object, self.segment()?);
            if *self.peek() == Token::Colon {
                self.advance();
                let value = self.value()?;
                self.set(&key, &value)?;
            } else {
                self.declare(&key)?;
            }

            if !matches!(self.peek(), Token::Newline | Token::RBrace) {
                return Err(self.error(format!("unexpected {:?} in block for {}", self.peek(), object)));
            }
        }
    }

    fn create(&mut self, key: &str) -> Result<(), RenderError> {
        let (graph, _) = self.graph.create(key).map_err(|e| self.graph_error(e))?;
        self.graph = graph;
        Ok(())
    }

    /// Create unless it already exists.
    fn declare(&mut self, key: &str) -> Result<(), RenderError> {
        match self.graph.create(key) {
            Ok((graph, _)) => {
                self.graph = graph;
                Ok(())
            }
            Err(GraphError::AlreadyExists { .. }) => Ok(()),
            Err(e) => Err(self.graph_error(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), RenderError> {
        self.graph = self.graph.set(key, value).map_err(|e| self.graph_error(e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Endpoint;

    #[test]
    fn test_compile_serialized_graph() {
        let graph = Graph::new()
            .create("users")
            .unwrap()
            .0
            .set("users.shape", "sql_table")
            .unwrap()
            .set("users.id", "int")
            .unwrap()
            .set("users.\"shape\"", "double precision")
            .unwrap()
            .create("\"order items\"")
            .unwrap()
            .0
            .set("\"order items\".user_id", "int")
            .unwrap()
            .create("\"order items\".user_id -> users.id")
            .unwrap()
            .0;

        assert_eq!(compile(&graph.serialize()).unwrap(), graph);
    }

    #[test]
    fn test_top_level_set_and_bare_declarations() {
        let graph = compile("users\nusers.shape: sql_table\nusers.id: int\nusers.note\n").unwrap();
        let users = graph.object("users").unwrap();
        assert!(users.is_table());
        assert_eq!(users.fields.len(), 2);
        assert_eq!(users.field("note").unwrap().value, None);
    }

    #[test]
    fn test_repeated_blocks_merge() {
        let graph = compile("a: {\n  x: int\n}\na: {\n  y: int\n}\n").unwrap();
        assert_eq!(graph.objects().len(), 1);
        assert_eq!(graph.object("a").unwrap().fields.len(), 2);
    }

    #[test]
    fn test_edge_between_objects() {
        let graph = compile("a\nb\na -> b # comment\n").unwrap();
        assert_eq!(graph.edges()[0].from, Endpoint::object("a"));
        assert_eq!(graph.edges()[0].to, Endpoint::object("b"));
    }

    #[test]
    fn test_unknown_reference_reports_line() {
        let err = compile("a: {\n  x: int\n}\n\na.x -> b.y\n").unwrap_err();
        assert!(matches!(
            err,
            RenderError::Graph {
                line: 5,
                source: GraphError::UnknownReference { .. }
            }
        ));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(compile("a: {\n  x: int\n"), Err(RenderError::Compile { .. })));
        assert!(matches!(compile("a: {\n  x: {\n}\n"), Err(RenderError::Compile { .. })));
        assert!(matches!(compile("a b\n"), Err(RenderError::Compile { line: 1, .. })));
        assert!(matches!(compile("a:\n"), Err(RenderError::Compile { .. })));
        assert!(matches!(compile("a - b\n"), Err(RenderError::Lex(_))));
    }
}
