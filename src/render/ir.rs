use crate::graph::Graph;

/// Render-ready view of a diagram graph.
#[derive(Debug, Clone, Default)]
pub struct DiagramIR {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub is_table: bool,
    pub columns: Vec<ColumnIR>,
}

#[derive(Debug, Clone)]
pub struct ColumnIR {
    pub name: String,
    pub typ: Option<String>,
    /// Source of at least one edge.
    pub is_fk: bool,
    /// Target of at least one edge.
    pub is_referenced: bool,
}

impl ColumnIR {
    /// Text drawn for the row.
    pub fn text(&self) -> String {
        let marker = if self.is_referenced { "◆ " } else { "  " };
        match &self.typ {
            Some(typ) => format!("{}{}: {}", marker, self.name, typ),
            None => format!("{}{}", marker, self.name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub from: String,
    pub from_column: Option<String>,
    pub to: String,
    pub to_column: Option<String>,
}

impl Node {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn rows(&self) -> Vec<String> {
        self.columns.iter().map(ColumnIR::text).collect()
    }
}

impl DiagramIR {
    pub fn from_graph(graph: &Graph) -> Self {
        let is_source = |object: &str, field: &str| {
            graph
                .edges()
                .iter()
                .any(|e| e.from.object == object && e.from.field.as_deref() == Some(field))
        };
        let is_target = |object: &str, field: &str| {
            graph
                .edges()
                .iter()
                .any(|e| e.to.object == object && e.to.field.as_deref() == Some(field))
        };

        let nodes = graph
            .objects()
            .iter()
            .map(|object| Node {
                id: object.id.clone(),
                label: object.id.clone(),
                is_table: object.is_table(),
                columns: object
                    .fields
                    .iter()
                    .map(|field| ColumnIR {
                        name: field.name.clone(),
                        typ: field.value.clone(),
                        is_fk: is_source(&object.id, &field.name),
                        is_referenced: is_target(&object.id, &field.name),
                    })
                    .collect(),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|e| Edge {
                from: e.from.object.clone(),
                from_column: e.from.field.clone(),
                to: e.to.object.clone(),
                to_column: e.to.field.clone(),
            })
            .collect();

        DiagramIR { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::compile::compile;

    #[test]
    fn test_ir_from_graph() {
        let graph = compile(
            "users: {\n  shape: sql_table\n  id: int\n}\n\norders: {\n  shape: sql_table\n  user_id: int\n}\n\norders.user_id -> users.id\n",
        )
        .unwrap();
        let ir = DiagramIR::from_graph(&graph);

        assert_eq!(ir.nodes.len(), 2);
        assert_eq!(ir.edges.len(), 1);

        let users = ir.node("users").unwrap();
        assert!(users.is_table);
        assert!(users.columns[0].is_referenced);
        assert!(!users.columns[0].is_fk);

        let orders = ir.node("orders").unwrap();
        assert!(orders.columns[0].is_fk);
        assert_eq!(orders.column_index("user_id"), Some(0));
    }

    #[test]
    fn test_row_text() {
        let column = ColumnIR {
            name: "id".into(),
            typ: Some("int".into()),
            is_fk: false,
            is_referenced: true,
        };
        assert_eq!(column.text(), "◆ id: int");

        let column = ColumnIR {
            name: "note".into(),
            typ: None,
            is_fk: false,
            is_referenced: false,
        };
        assert_eq!(column.text(), "  note");
    }
}
