//! Path keys addressing objects, fields, attributes and edges.
//!
//! A segment is a bare word (alphanumerics and `_`) or a double-quoted
//! string with `\"` and `\\` escapes. A key is `seg` or `seg.seg`; an edge
//! key joins two keys with `->`. An unquoted trailing `shape` addresses the
//! shape attribute of the object before it.

use std::fmt;

use super::GraphError;
use super::lexer::{Lexer, Token, is_bare_char};

/// Attribute keyword for an object's shape.
pub const SHAPE: &str = "shape";

/// One segment of a key as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub quoted: bool,
}

impl Segment {
    pub(crate) fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Ident(name) => Some(Self {
                name: name.clone(),
                quoted: false,
            }),
            Token::Str(name) => Some(Self {
                name: name.clone(),
                quoted: true,
            }),
            _ => None,
        }
    }

    fn is_reserved(&self) -> bool {
        !self.quoted && self.name == SHAPE
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_reserved() {
            f.write_str(&self.name)
        } else {
            f.write_str(&escape(&self.name))
        }
    }
}

/// One end of an edge: an object, or a field of an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub object: String,
    pub field: Option<String>,
}

impl Endpoint {
    pub fn object(object: &str) -> Self {
        Self {
            object: object.to_string(),
            field: None,
        }
    }

    pub fn field(object: &str, field: &str) -> Self {
        Self {
            object: object.to_string(),
            field: Some(field.to_string()),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.object))?;
        if let Some(field) = &self.field {
            write!(f, ".{}", escape(field))?;
        }
        Ok(())
    }
}

/// A parsed key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathKey {
    Object(String),
    Field { object: String, field: String },
    Shape(String),
    Edge { from: Endpoint, to: Endpoint },
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Object(object) => f.write_str(&escape(object)),
            PathKey::Field { object, field } => write!(f, "{}.{}", escape(object), escape(field)),
            PathKey::Shape(object) => write!(f, "{}.{}", escape(object), SHAPE),
            PathKey::Edge { from, to } => write!(f, "{} -> {}", from, to),
        }
    }
}

/// Escape an identifier for use as a key segment.
pub fn escape(name: &str) -> String {
    let bare = !name.is_empty() && name.chars().all(is_bare_char) && name != SHAPE;
    if bare { name.to_string() } else { quote(name) }
}

/// Escape a scalar value for the diagram source.
pub fn escape_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_bare_char) {
        value.to_string()
    } else {
        quote(value)
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `table.column` with both parts escaped.
pub fn join(object: &str, field: &str) -> String {
    format!("{}.{}", escape(object), escape(field))
}

/// Parse a key string.
pub fn parse(key: &str) -> Result<PathKey, GraphError> {
    let tokens = Lexer::new(key)
        .tokenize()
        .map_err(|e| GraphError::invalid_key(key, e.to_string()))?;

    let mut pos = 0;
    let from = parse_segments(key, &tokens, &mut pos)?;

    match &tokens[pos] {
        Token::Eof => path_target(key, from),
        Token::Arrow => {
            pos += 1;
            let to = parse_segments(key, &tokens, &mut pos)?;
            if tokens[pos] != Token::Eof {
                return Err(GraphError::invalid_key(key, "unexpected text after edge target"));
            }
            Ok(PathKey::Edge {
                from: endpoint(key, from)?,
                to: endpoint(key, to)?,
            })
        }
        _ => Err(GraphError::invalid_key(key, "expected `.`, `->` or end of key")),
    }
}

/// `seg(.seg)*` starting at `pos`; leaves `pos` on the first token after it.
pub(crate) fn parse_segments(
    key: &str,
    tokens: &[Token],
    pos: &mut usize,
) -> Result<Vec<Segment>, GraphError> {
    let mut segments = Vec::new();
    loop {
        let segment = tokens
            .get(*pos)
            .and_then(Segment::from_token)
            .ok_or_else(|| GraphError::invalid_key(key, "expected a name"))?;
        segments.push(segment);
        *pos += 1;

        if tokens.get(*pos) == Some(&Token::Dot) {
            *pos += 1;
        } else {
            return Ok(segments);
        }
    }
}

/// Resolve segments to an object, field or shape attribute.
pub(crate) fn path_target(key: &str, segments: Vec<Segment>) -> Result<PathKey, GraphError> {
    let mut segments = segments.into_iter();
    let (Some(first), second, None) = (segments.next(), segments.next(), segments.next()) else {
        return Err(GraphError::invalid_key(key, "keys nest at most two levels (table.column)"));
    };

    if first.is_reserved() {
        return Err(GraphError::invalid_key(key, "`shape` is an attribute, not an object"));
    }

    Ok(match second {
        None => PathKey::Object(first.name),
        Some(second) if second.is_reserved() => PathKey::Shape(first.name),
        Some(second) => PathKey::Field {
            object: first.name,
            field: second.name,
        },
    })
}

fn endpoint(key: &str, segments: Vec<Segment>) -> Result<Endpoint, GraphError> {
    match path_target(key, segments)? {
        PathKey::Object(object) => Ok(Endpoint {
            object,
            field: None,
        }),
        PathKey::Field { object, field } => Ok(Endpoint {
            object,
            field: Some(field),
        }),
        _ => Err(GraphError::invalid_key(key, "edges connect objects or fields, not attributes")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("users"), "users");
        assert_eq!(escape("order items"), "\"order items\"");
        assert_eq!(escape("shape"), "\"shape\"");
        assert_eq!(escape(""), "\"\"");
        assert_eq!(escape("say \"hi\""), r#""say \"hi\"""#);
        assert_eq!(escape("ユーザー"), "ユーザー");
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value("int"), "int");
        assert_eq!(escape_value("shape"), "shape");
        assert_eq!(escape_value("VARCHAR(255)"), "\"VARCHAR(255)\"");
        assert_eq!(escape_value("double precision"), "\"double precision\"");
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(parse("users").unwrap(), PathKey::Object("users".into()));
        assert_eq!(
            parse("users.id").unwrap(),
            PathKey::Field {
                object: "users".into(),
                field: "id".into()
            }
        );
        assert_eq!(parse("users.shape").unwrap(), PathKey::Shape("users".into()));
        assert_eq!(
            parse(r#"users."shape""#).unwrap(),
            PathKey::Field {
                object: "users".into(),
                field: "shape".into()
            }
        );
    }

    #[test]
    fn test_parse_edge() {
        let key = parse(r#"users.account_id -> "all accounts".id"#).unwrap();
        assert_eq!(
            key,
            PathKey::Edge {
                from: Endpoint::field("users", "account_id"),
                to: Endpoint::field("all accounts", "id"),
            }
        );
        assert_eq!(key.to_string(), r#"users.account_id -> "all accounts".id"#);
    }

    #[test]
    fn test_parse_rejects_bad_keys() {
        for key in ["", "a.b.c", "shape", "a ->", "a -> b.shape", "a b", "a.", "a -> b -> c"] {
            assert!(
                matches!(parse(key), Err(GraphError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_escaping() {
        for name in ["users", "order items", "shape", "a.b", "quote\"d"] {
            let key = join(name, "id");
            assert_eq!(
                parse(&key).unwrap(),
                PathKey::Field {
                    object: name.to_string(),
                    field: "id".to_string()
                },
                "{key}"
            );
        }
    }
}
