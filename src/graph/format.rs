//! Serializer from [`Graph`] to diagram source.
//!
//! ```text
//! users: {
//!   shape: sql_table
//!   id: int
//! }
//!
//! orders.user_id -> users.id
//! ```

use super::key::{escape, escape_value};
use super::{Graph, Object};

/// Serialize a graph to diagram source text.
pub fn format(graph: &Graph) -> String {
    let mut output = String::new();

    for (i, object) in graph.objects().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        format_object(&mut output, object);
    }

    if !graph.edges().is_empty() {
        if !graph.objects().is_empty() {
            output.push('\n');
        }
        for edge in graph.edges() {
            output.push_str(&format!("{} -> {}\n", edge.from, edge.to));
        }
    }

    output
}

fn format_object(output: &mut String, object: &Object) {
    let id = escape(&object.id);

    if object.shape.is_none() && object.fields.is_empty() {
        output.push_str(&id);
        output.push('\n');
        return;
    }

    output.push_str(&format!("{}: {{\n", id));
    if let Some(shape) = &object.shape {
        output.push_str(&format!("  shape: {}\n", escape_value(shape)));
    }
    for field in &object.fields {
        match &field.value {
            Some(value) => {
                output.push_str(&format!("  {}: {}\n", escape(&field.name), escape_value(value)))
            }
            None => output.push_str(&format!("  {}\n", escape(&field.name))),
        }
    }
    output.push_str("}\n");
}
