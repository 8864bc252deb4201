//! Property tests for the statement parser and the replay pipeline.

use erdreplay::ddl::{Command, parse_command, parse_statements};
use erdreplay::graph::key;
use erdreplay::{DiagramGraph, Graph, ReplayConfig, replay_source};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,10}"
}

proptest! {
    #[test]
    fn parser_never_panics(line in "\\PC{0,80}") {
        let _ = parse_command(&line);
        let _ = parse_statements(&line);
    }

    #[test]
    fn statement_indices_are_dense(input in "([A-Z ;()a-z]{0,20}\n){0,10}") {
        let statements = parse_statements(&input);
        for (i, statement) in statements.iter().enumerate() {
            prop_assert_eq!(statement.index, i);
        }
    }

    #[test]
    fn create_table_round_trips_name(table in identifier()) {
        let command = parse_command(&format!("CREATE TABLE {table};")).unwrap();
        prop_assert_eq!(command.table(), Some(table.as_str()));
    }

    #[test]
    fn escaped_keys_resolve_to_the_same_name(name in "\\PC{0,12}") {
        let (graph, _) = Graph::new().create(&key::escape(&name)).unwrap();
        prop_assert!(graph.object(&name).is_some());
    }

    #[test]
    fn replay_is_deterministic(
        tables in prop::collection::vec(identifier(), 1..5),
        columns in prop::collection::vec((identifier(), "(int|text|bigint)"), 0..6),
    ) {
        let mut input = String::new();
        let mut created: Vec<&String> = Vec::new();
        for table in &tables {
            if !created.contains(&table) {
                input.push_str(&format!("CREATE TABLE {table};\n"));
                created.push(table);
            }
        }
        for (i, (column, ty)) in columns.iter().enumerate() {
            let table = created[i % created.len()];
            input.push_str(&format!("ALTER TABLE {table} ADD COLUMN {column} {ty};\n"));
        }

        let first = replay_source(&input, &ReplayConfig::default()).unwrap();
        let second = replay_source(&input, &ReplayConfig::default()).unwrap();
        prop_assert_eq!(&first, &second);

        let valid = parse_statements(&input)
            .iter()
            .filter(|s| !matches!(s.command, Command::Unrecognized | Command::Malformed { .. }))
            .count();
        prop_assert_eq!(valid, created.len() + columns.len());
    }
}
