//! Replays a statement log one statement at a time, rendering a snapshot of
//! the cumulative diagram after each.

use tracing::{debug, info, info_span, warn};

use crate::config::{NoopPolicy, ReplayConfig};
use crate::ddl::{Command, Statement};
use crate::error::ReplayError;
use crate::graph::DiagramGraph;
use crate::mutator;
use crate::render::{Renderer, SvgRenderer};
use crate::sink::{ArtifactSink, snapshot_name};

/// Outcome counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Snapshots handed to the sink.
    pub snapshots: usize,
    /// Step indices of statements that left the graph unchanged.
    pub noops: Vec<usize>,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct Replay<G> {
    pub graph: G,
    /// Serialized final graph, as handed to the sink.
    pub source: String,
    pub report: ReplayReport,
}

/// Drives a run. Rendering options live in the renderer, so only the
/// replay policy is kept here.
pub struct Sequencer<R> {
    renderer: R,
    noop_policy: NoopPolicy,
    strict: bool,
}

impl Sequencer<SvgRenderer> {
    /// Sequencer with the built-in SVG renderer configured from `config.render`.
    pub fn with_svg(config: &ReplayConfig) -> Self {
        Self::new(SvgRenderer::new(&config.render), config)
    }
}

impl<R: Renderer> Sequencer<R> {
    pub fn new(renderer: R, config: &ReplayConfig) -> Self {
        Self {
            renderer,
            noop_policy: config.noop_policy,
            strict: config.strict,
        }
    }

    /// Fold `statements` into `graph`, emitting a snapshot per step and the
    /// final source at the end. Stops at the first failing step; snapshots
    /// already emitted stay emitted.
    pub fn run<G, S>(&self, graph: G, statements: &[Statement], sink: &mut S) -> Result<Replay<G>, ReplayError>
    where
        G: DiagramGraph,
        S: ArtifactSink + ?Sized,
    {
        let _span = info_span!("replay", statements = statements.len()).entered();

        let (graph, report) = statements.iter().try_fold(
            (graph, ReplayReport::default()),
            |(graph, mut report), statement| {
                let graph = self.step(graph, statement, &mut *sink, &mut report)?;
                Ok::<_, ReplayError>((graph, report))
            },
        )?;

        let source = graph.serialize();
        sink.emit_source(&source).map_err(|source| ReplayError::Sink {
            artifact: "diagram source".to_string(),
            source,
        })?;

        info!(snapshots = report.snapshots, noops = report.noops.len(), "replay finished");
        Ok(Replay {
            graph,
            source,
            report,
        })
    }

    fn step<G, S>(
        &self,
        graph: G,
        statement: &Statement,
        sink: &mut S,
        report: &mut ReplayReport,
    ) -> Result<G, ReplayError>
    where
        G: DiagramGraph,
        S: ArtifactSink + ?Sized,
    {
        let index = statement.index;
        let graph = apply_statement(graph, statement, self.strict)?;

        if !statement.command.is_valid() {
            report.noops.push(index);
            if self.noop_policy == NoopPolicy::Skip {
                debug!(index, "no-op, snapshot skipped");
                return Ok(graph);
            }
        }

        let source = graph.serialize();
        let bytes = self.renderer.render(&source).map_err(|source| ReplayError::Render {
            index,
            line: statement.line,
            text: statement.text.clone(),
            source,
        })?;

        sink.emit_snapshot(index, &bytes).map_err(|source| ReplayError::Sink {
            artifact: snapshot_name(index),
            source,
        })?;
        report.snapshots += 1;

        debug!(index, command = %statement.command, bytes = bytes.len(), "snapshot emitted");
        Ok(graph)
    }
}

/// Apply one statement without rendering. Malformed statements abort when
/// `strict` is set and are skipped with a warning otherwise.
pub fn apply_statement<G: DiagramGraph>(graph: G, statement: &Statement, strict: bool) -> Result<G, ReplayError> {
    if let Command::Malformed { reason, .. } = &statement.command {
        if strict {
            return Err(ReplayError::Malformed {
                index: statement.index,
                line: statement.line,
                text: statement.text.clone(),
                reason: reason.clone(),
            });
        }
        warn!(index = statement.index, line = statement.line, %reason, "skipping malformed statement");
    }

    mutator::apply(graph, &statement.command).map_err(|source| ReplayError::Mutation {
        index: statement.index,
        line: statement.line,
        text: statement.text.clone(),
        source,
    })
}
