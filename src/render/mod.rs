//! Diagram source to SVG.
//!
//! [`SvgRenderer`] compiles source back into a [`Graph`], derives a
//! [`DiagramIR`], lays it out by reference depth and writes SVG.

pub mod compile;
pub mod ir;
pub mod layout;
pub mod measure;
pub mod svg;

use tracing::trace;

use crate::config::RenderOptions;
use crate::graph::{Graph, GraphError, LexError};

pub use ir::DiagramIR;
pub use layout::{Layout, LayoutEngine};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),
    #[error("line {line}: {message}")]
    Compile { line: usize, message: String },
    #[error("line {line}: {source}")]
    Graph { line: usize, source: GraphError },
    #[error("failed to write SVG")]
    Format(#[from] std::fmt::Error),
}

/// Turns diagram source into image bytes.
pub trait Renderer {
    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError>;
}

#[derive(Default)]
pub struct SvgRenderer {
    engine: LayoutEngine,
}

impl SvgRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            engine: LayoutEngine::new(options),
        }
    }

    /// Render an already compiled graph.
    pub fn render_graph(&self, graph: &Graph) -> Result<String, RenderError> {
        let ir = DiagramIR::from_graph(graph);
        let layout = self.engine.layout(&ir);
        trace!(nodes = layout.nodes.len(), edges = layout.edges.len(), "laid out");
        Ok(svg::write_svg(&ir, &layout, &self.engine.metrics)?)
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, source: &str) -> Result<Vec<u8>, RenderError> {
        let graph = compile::compile(source)?;
        Ok(self.render_graph(&graph)?.into_bytes())
    }
}
