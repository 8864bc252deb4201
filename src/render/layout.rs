//! Level-based layout.
//!
//! Referenced tables sit on upper levels, referencing tables below them.
//! Nodes keep insertion order within a level. Edges are orthogonal
//! polylines between column rows, bending once at a vertical segment.

use std::collections::HashMap;

use crate::config::RenderOptions;

use super::ir::{DiagramIR, Edge, Node};
use super::measure::TextMetrics;

/// Distance an edge travels past the rightmost node before turning back.
const LOOP_OFFSET: f64 = 24.0;

#[derive(Debug, Clone)]
pub struct LayoutNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutNode {
    fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone)]
pub struct LayoutEdge {
    /// Index into `DiagramIR::edges`.
    pub edge_index: usize,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

pub struct LayoutEngine {
    pub(crate) metrics: TextMetrics,
    padding: f64,
    node_gap_x: f64,
    node_gap_y: f64,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(&RenderOptions::default())
    }
}

impl LayoutEngine {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            metrics: TextMetrics::default(),
            padding: options.padding,
            node_gap_x: options.node_gap_x,
            node_gap_y: options.node_gap_y,
        }
    }

    pub fn layout(&self, ir: &DiagramIR) -> Layout {
        let levels = assign_levels(ir);
        let nodes = self.place_nodes(&levels);

        let positions: HashMap<&str, &LayoutNode> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let edges: Vec<LayoutEdge> = ir
            .edges
            .iter()
            .enumerate()
            .filter_map(|(edge_index, edge)| {
                let from = positions.get(edge.from.as_str())?;
                let to = positions.get(edge.to.as_str())?;
                Some(LayoutEdge {
                    edge_index,
                    points: self.route(ir, edge, from, to),
                })
            })
            .collect();

        let right = nodes
            .iter()
            .map(LayoutNode::right)
            .chain(edges.iter().flat_map(|e| e.points.iter().map(|p| p.0)))
            .fold(0.0, f64::max);
        let bottom = nodes.iter().map(|n| n.y + n.height).fold(0.0, f64::max);

        Layout {
            width: right.max(self.padding) + self.padding,
            height: bottom.max(self.padding) + self.padding,
            nodes,
            edges,
        }
    }

    fn place_nodes(&self, levels: &[Vec<&Node>]) -> Vec<LayoutNode> {
        let mut layout_nodes = Vec::new();
        let mut y = self.padding;

        for level in levels {
            let mut x = self.padding;
            let mut max_height: f64 = 0.0;

            for node in level {
                let (width, height) = self.metrics.node_size(&node.label, &node.rows());
                layout_nodes.push(LayoutNode {
                    id: node.id.clone(),
                    x,
                    y,
                    width,
                    height,
                });
                x += width + self.node_gap_x;
                max_height = max_height.max(height);
            }

            y += max_height + self.node_gap_y;
        }

        layout_nodes
    }

    /// Anchor height for an edge end: the column row, or the node's middle.
    fn anchor_y(&self, ir: &DiagramIR, node: &LayoutNode, column: Option<&str>) -> f64 {
        column
            .and_then(|name| ir.node(&node.id)?.column_index(name))
            .map(|row| node.y + self.metrics.row_center(row))
            .unwrap_or(node.y + node.height / 2.0)
    }

    fn route(&self, ir: &DiagramIR, edge: &Edge, from: &LayoutNode, to: &LayoutNode) -> Vec<(f64, f64)> {
        let y1 = self.anchor_y(ir, from, edge.from_column.as_deref());
        let y2 = self.anchor_y(ir, to, edge.to_column.as_deref());

        if from.right() <= to.x {
            let mid = (from.right() + to.x) / 2.0;
            vec![(from.right(), y1), (mid, y1), (mid, y2), (to.x, y2)]
        } else if to.right() <= from.x {
            let mid = (to.right() + from.x) / 2.0;
            vec![(from.x, y1), (mid, y1), (mid, y2), (to.right(), y2)]
        } else {
            // Overlapping columns, self references included: loop around the right.
            let outer = from.right().max(to.right()) + LOOP_OFFSET;
            vec![(from.right(), y1), (outer, y1), (outer, y2), (to.right(), y2)]
        }
    }
}

/// Group nodes into levels. A node sits one level below the deepest node it
/// references; nodes caught in reference cycles go on a final level.
fn assign_levels(ir: &DiagramIR) -> Vec<Vec<&Node>> {
    let parents: Vec<Vec<&str>> = ir
        .nodes
        .iter()
        .map(|node| {
            let mut deps: Vec<&str> = ir
                .edges
                .iter()
                .filter(|e| e.from == node.id && e.to != node.id && ir.node(&e.to).is_some())
                .map(|e| e.to.as_str())
                .collect();
            deps.dedup();
            deps
        })
        .collect();

    let mut levels: HashMap<&str, usize> = HashMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for (node, deps) in ir.nodes.iter().zip(&parents) {
            if levels.contains_key(node.id.as_str()) {
                continue;
            }
            let parent_levels: Vec<usize> = deps.iter().filter_map(|p| levels.get(p).copied()).collect();
            if parent_levels.len() == deps.len() {
                let level = parent_levels.iter().max().map_or(0, |l| l + 1);
                levels.insert(node.id.as_str(), level);
                changed = true;
            }
        }
    }

    let cycle_level = levels.values().copied().max().map_or(0, |l| l + 1);
    let mut rows: Vec<Vec<&Node>> = Vec::new();
    for node in &ir.nodes {
        let level = levels.get(node.id.as_str()).copied().unwrap_or(cycle_level);
        if rows.len() <= level {
            rows.resize_with(level + 1, Vec::new);
        }
        rows[level].push(node);
    }
    rows.retain(|row| !row.is_empty());
    rows
}
