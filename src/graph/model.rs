//! In-memory diagram graph.

use tracing::trace;

use super::key::{self, Endpoint, PathKey};
use super::{DiagramGraph, GraphError, TABLE_SHAPE, format};

/// A field inside an object; for tables, a column and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    pub id: String,
    pub shape: Option<String>,
    pub fields: Vec<Field>,
}

impl Object {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            shape: None,
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_table(&self) -> bool {
        self.shape.as_deref() == Some(TABLE_SHAPE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// Objects and edges, both kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    objects: Vec<Object>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn object(&self, id: &str) -> Option<&Object> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.edges.is_empty()
    }

    fn object_mut(&mut self, id: &str) -> Option<&mut Object> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    fn check_endpoint(&self, key: &str, endpoint: &Endpoint) -> Result<(), GraphError> {
        let object = self
            .object(&endpoint.object)
            .ok_or_else(|| GraphError::unknown_reference(key, key::escape(&endpoint.object)))?;
        match &endpoint.field {
            Some(field) if object.field(field).is_none() => {
                Err(GraphError::unknown_reference(key, endpoint.to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl DiagramGraph for Graph {
    fn create(&self, key: &str) -> Result<(Self, String), GraphError> {
        let path = key::parse(key)?;
        let resolved = path.to_string();
        let mut next = self.clone();

        match path {
            PathKey::Object(id) => {
                if self.object(&id).is_some() {
                    return Err(GraphError::AlreadyExists { key: resolved });
                }
                next.objects.push(Object::new(&id));
            }
            PathKey::Field { object, field } => {
                let owner = next
                    .object_mut(&object)
                    .ok_or_else(|| GraphError::unknown_reference(key, key::escape(&object)))?;
                if owner.field(&field).is_some() {
                    return Err(GraphError::AlreadyExists { key: resolved });
                }
                owner.fields.push(Field {
                    name: field,
                    value: None,
                });
            }
            PathKey::Shape(_) => {
                return Err(GraphError::invalid_key(key, "attributes are set, not created"));
            }
            PathKey::Edge { from, to } => {
                self.check_endpoint(key, &from)?;
                self.check_endpoint(key, &to)?;
                if self.edges.iter().any(|e| e.from == from && e.to == to) {
                    return Err(GraphError::AlreadyExists { key: resolved });
                }
                next.edges.push(Edge { from, to });
            }
        }

        trace!(key = %resolved, "created");
        Ok((next, resolved))
    }

    fn set(&self, key: &str, value: &str) -> Result<Self, GraphError> {
        let path = key::parse(key)?;
        let mut next = self.clone();

        match path {
            PathKey::Shape(object) => {
                let owner = next
                    .object_mut(&object)
                    .ok_or_else(|| GraphError::unknown_reference(key, key::escape(&object)))?;
                owner.shape = Some(value.to_string());
            }
            PathKey::Field { object, field } => {
                let owner = next
                    .object_mut(&object)
                    .ok_or_else(|| GraphError::unknown_reference(key, key::escape(&object)))?;
                match owner.fields.iter_mut().find(|f| f.name == field) {
                    Some(existing) => existing.value = Some(value.to_string()),
                    None => owner.fields.push(Field {
                        name: field,
                        value: Some(value.to_string()),
                    }),
                }
            }
            PathKey::Object(_) => {
                return Err(GraphError::invalid_key(key, "top-level objects carry no value"));
            }
            PathKey::Edge { .. } => {
                return Err(GraphError::invalid_key(key, "edges carry no value"));
            }
        }

        trace!(key, value, "set");
        Ok(next)
    }

    fn serialize(&self) -> String {
        format::format(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Graph {
        let (graph, _) = Graph::new().create("users").unwrap();
        graph.set("users.shape", "sql_table").unwrap()
    }

    #[test]
    fn test_create_object() {
        let (graph, resolved) = Graph::new().create("users").unwrap();
        assert_eq!(resolved, "users");
        assert_eq!(graph.objects().len(), 1);
        assert_eq!(graph.object("users").unwrap().shape, None);
    }

    #[test]
    fn test_create_returns_escaped_key() {
        let (_, resolved) = Graph::new().create("\"order items\"").unwrap();
        assert_eq!(resolved, "\"order items\"");
    }

    #[test]
    fn test_create_leaves_original_untouched() {
        let empty = Graph::new();
        let (graph, _) = empty.create("users").unwrap();
        assert!(empty.is_empty());
        assert!(!graph.is_empty());
    }

    #[test]
    fn test_create_duplicate_object() {
        let graph = users();
        assert_eq!(
            graph.create("users").unwrap_err(),
            GraphError::AlreadyExists {
                key: "users".into()
            }
        );
    }

    #[test]
    fn test_set_shape_and_field() {
        let graph = users().set("users.id", "int").unwrap();
        let object = graph.object("users").unwrap();
        assert!(object.is_table());
        assert_eq!(object.field("id").unwrap().value.as_deref(), Some("int"));
    }

    #[test]
    fn test_set_overwrites_field() {
        let graph = users()
            .set("users.id", "int")
            .unwrap()
            .set("users.name", "text")
            .unwrap()
            .set("users.id", "bigint")
            .unwrap();
        let object = graph.object("users").unwrap();
        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.fields[0].name, "id");
        assert_eq!(object.fields[0].value.as_deref(), Some("bigint"));
    }

    #[test]
    fn test_set_on_missing_object() {
        let err = Graph::new().set("ghosts.id", "int").unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownReference {
                key: "ghosts.id".into(),
                missing: "ghosts".into()
            }
        );
    }

    #[test]
    fn test_set_rejects_object_and_edge_keys() {
        let graph = users();
        assert!(matches!(graph.set("users", "x"), Err(GraphError::InvalidKey { .. })));
        assert!(matches!(
            graph.set("users -> users", "x"),
            Err(GraphError::InvalidKey { .. })
        ));
    }

    #[test]
    fn test_create_edge() {
        let graph = users()
            .set("users.id", "int")
            .unwrap()
            .create("orders")
            .unwrap()
            .0
            .set("orders.user_id", "int")
            .unwrap();

        let (graph, resolved) = graph.create("orders.user_id -> users.id").unwrap();
        assert_eq!(resolved, "orders.user_id -> users.id");
        assert_eq!(
            graph.edges(),
            &[Edge {
                from: Endpoint::field("orders", "user_id"),
                to: Endpoint::field("users", "id"),
            }]
        );

        assert!(matches!(
            graph.create("orders.user_id -> users.id"),
            Err(GraphError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_edge_to_missing_endpoint() {
        let graph = users().set("users.id", "int").unwrap();
        assert_eq!(
            graph.create("orders.user_id -> users.id").unwrap_err(),
            GraphError::UnknownReference {
                key: "orders.user_id -> users.id".into(),
                missing: "orders".into()
            }
        );
        assert_eq!(
            graph.create("users.id -> users.missing").unwrap_err(),
            GraphError::UnknownReference {
                key: "users.id -> users.missing".into(),
                missing: "users.missing".into()
            }
        );
    }

    #[test]
    fn test_create_field_and_shape() {
        let (graph, resolved) = users().create("users.id").unwrap();
        assert_eq!(resolved, "users.id");
        assert_eq!(graph.object("users").unwrap().field("id").unwrap().value, None);
        assert!(matches!(graph.create("users.id"), Err(GraphError::AlreadyExists { .. })));
        assert!(matches!(graph.create("users.shape"), Err(GraphError::InvalidKey { .. })));
    }

    #[test]
    fn test_quoted_shape_is_a_field() {
        let graph = users().set("users.\"shape\"", "text").unwrap();
        let object = graph.object("users").unwrap();
        assert!(object.is_table());
        assert_eq!(object.field("shape").unwrap().value.as_deref(), Some("text"));
    }
}
