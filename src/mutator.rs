//! Maps parsed commands onto diagram graph edits.

use tracing::{debug, trace};

use crate::ddl::{AddColumn, ColumnDef, Command, CreateTable, ForeignKey};
use crate::graph::key::{escape, join};
use crate::graph::{DiagramGraph, GraphError, TABLE_SHAPE};

/// Apply one command to `graph`, returning the updated graph.
///
/// Unrecognized and malformed commands return the graph unchanged.
pub fn apply<G: DiagramGraph>(graph: G, command: &Command) -> Result<G, GraphError> {
    match command {
        Command::CreateTable(create) => create_table(graph, create),
        Command::AddColumn(add) => add_column(graph, add),
        Command::AddForeignKey(fk) => add_foreign_key(&graph, fk),
        Command::Unrecognized | Command::Malformed { .. } => {
            trace!(%command, "no-op");
            Ok(graph)
        }
    }
}

fn create_table<G: DiagramGraph>(graph: G, create: &CreateTable) -> Result<G, GraphError> {
    let (graph, resolved) = match graph.create(&escape(&create.table)) {
        Ok(created) => created,
        Err(GraphError::AlreadyExists { key }) if create.if_not_exists => {
            debug!(table = %key, "table exists, skipping");
            return Ok(graph);
        }
        Err(e) => return Err(e),
    };

    let mut graph = graph.set(&format!("{}.shape", resolved), TABLE_SHAPE)?;
    for column in &create.columns {
        graph = put_column(graph, &create.table, column)?;
    }
    for fk in &create.foreign_keys {
        graph = add_foreign_key(&graph, fk)?;
    }
    Ok(graph)
}

fn add_column<G: DiagramGraph>(graph: G, add: &AddColumn) -> Result<G, GraphError> {
    let graph = put_column(graph, &add.table, &add.column)?;
    match &add.references {
        Some(fk) => add_foreign_key(&graph, fk),
        None => Ok(graph),
    }
}

/// Typed columns are set; a typeless column is declared without a value and
/// leaves an existing column as it is.
fn put_column<G: DiagramGraph>(graph: G, table: &str, column: &ColumnDef) -> Result<G, GraphError> {
    let key = join(table, &column.name);
    match &column.ty {
        Some(ty) => graph.set(&key, ty),
        None => match graph.create(&key) {
            Ok((graph, _)) => Ok(graph),
            Err(GraphError::AlreadyExists { .. }) => Ok(graph),
            Err(e) => Err(e),
        },
    }
}

fn add_foreign_key<G: DiagramGraph>(graph: &G, fk: &ForeignKey) -> Result<G, GraphError> {
    let key = format!(
        "{} -> {}",
        join(&fk.table, &fk.column),
        join(&fk.foreign_table, &fk.foreign_column)
    );
    let (graph, _) = graph.create(&key)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ddl::{ColumnDef, CommandKind, parse_command};
    use crate::graph::{Endpoint, Graph};

    fn run(lines: &[&str]) -> Result<Graph, GraphError> {
        lines.iter().try_fold(Graph::new(), |graph, line| {
            let command = parse_command(line).unwrap();
            apply(graph, &command)
        })
    }

    #[test]
    fn test_create_table() {
        let graph = run(&["CREATE TABLE users"]).unwrap();
        assert_eq!(graph.objects().len(), 1);
        assert!(graph.object("users").unwrap().is_table());
    }

    #[test]
    fn test_create_table_twice() {
        let err = run(&["CREATE TABLE users", "CREATE TABLE users"]).unwrap_err();
        assert_eq!(
            err,
            GraphError::AlreadyExists {
                key: "users".into()
            }
        );
    }

    #[test]
    fn test_create_table_if_not_exists_keeps_graph() {
        let once = run(&["CREATE TABLE users", "ALTER TABLE users ADD COLUMN id int"]).unwrap();
        let twice = run(&[
            "CREATE TABLE users",
            "ALTER TABLE users ADD COLUMN id int",
            "CREATE TABLE IF NOT EXISTS users",
        ])
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_add_column() {
        let graph = run(&["CREATE TABLE users", "ALTER TABLE users ADD COLUMN id int"]).unwrap();
        let field = graph.object("users").unwrap().field("id").unwrap();
        assert_eq!(field.value.as_deref(), Some("int"));
    }

    #[test]
    fn test_add_column_to_missing_table() {
        let err = run(&["ALTER TABLE ghosts ADD COLUMN id int"]).unwrap_err();
        assert!(matches!(err, GraphError::UnknownReference { missing, .. } if missing == "ghosts"));
    }

    #[test]
    fn test_add_foreign_key() {
        let graph = run(&[
            "CREATE TABLE users",
            "CREATE TABLE accounts",
            "ALTER TABLE accounts ADD COLUMN id int",
            "ALTER TABLE users ADD COLUMN account_id int",
            "ALTER TABLE users ADD CONSTRAINT fk FOREIGN KEY (account_id) REFERENCES accounts (id)",
        ])
        .unwrap();
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].from, Endpoint::field("users", "account_id"));
        assert_eq!(graph.edges()[0].to, Endpoint::field("accounts", "id"));
    }

    #[test]
    fn test_duplicate_foreign_key() {
        let err = run(&[
            "CREATE TABLE a",
            "ALTER TABLE a ADD COLUMN id int",
            "ALTER TABLE a ADD FOREIGN KEY (id) REFERENCES a (id)",
            "ALTER TABLE a ADD FOREIGN KEY (id) REFERENCES a (id)",
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::AlreadyExists { .. }));
    }

    #[test]
    fn test_foreign_key_to_missing_column() {
        let err = run(&[
            "CREATE TABLE users",
            "ALTER TABLE users ADD COLUMN account_id int",
            "ALTER TABLE users ADD FOREIGN KEY (account_id) REFERENCES accounts (id)",
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::UnknownReference { missing, .. } if missing == "accounts"));
    }

    #[test]
    fn test_create_table_with_body() {
        let graph = run(&[
            "CREATE TABLE users (id int PRIMARY KEY)",
            "CREATE TABLE orders (id int, user_id int REFERENCES users (id))",
        ])
        .unwrap();
        let orders = graph.object("orders").unwrap();
        assert!(orders.is_table());
        assert_eq!(orders.fields.len(), 2);
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_create_table_with_typeless_columns() {
        let graph = run(&[
            "CREATE TABLE t (a, b, a)",
            "ALTER TABLE t ADD COLUMN c int",
            "ALTER TABLE t ADD COLUMN a text",
        ])
        .unwrap();
        let t = graph.object("t").unwrap();
        let names: Vec<&str> = t.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(t.field("a").unwrap().value.as_deref(), Some("text"));
        assert_eq!(t.field("b").unwrap().value, None);
    }

    #[test]
    fn test_escapes_identifiers() {
        let command = Command::AddColumn(AddColumn {
            table: "order items".into(),
            column: ColumnDef {
                name: "shape".into(),
                ty: Some("text".into()),
            },
            references: None,
        });
        let graph = run(&[r#"CREATE TABLE "order items""#]).unwrap();
        let graph = apply(graph, &command).unwrap();
        let object = graph.object("order items").unwrap();
        assert!(object.is_table());
        assert_eq!(object.field("shape").unwrap().value.as_deref(), Some("text"));
    }

    #[test]
    fn test_noops_leave_graph_unchanged() {
        let graph = run(&["CREATE TABLE users"]).unwrap();
        let after = apply(graph.clone(), &Command::Unrecognized).unwrap();
        assert_eq!(after, graph);
        let after = apply(
            graph.clone(),
            &Command::Malformed {
                kind: CommandKind::AddColumn,
                reason: "missing column type".into(),
            },
        )
        .unwrap();
        assert_eq!(after, graph);
    }
}
