//! Replay a log of DDL statements into step-by-step ER diagram snapshots.
//!
//! Each non-blank line of the input is one statement. Statements are parsed
//! ([`ddl`]), applied in order to a diagram graph ([`mutator`]) and rendered
//! after every step ([`sequencer`]). The final diagram source is emitted
//! last.
//!
//! ```
//! use erdreplay::{ReplayConfig, replay, sink::MemorySink};
//!
//! let mut sink = MemorySink::new();
//! let report = replay(
//!     "CREATE TABLE users;\nALTER TABLE users ADD COLUMN id int;",
//!     &ReplayConfig::default(),
//!     &mut sink,
//! )
//! .unwrap();
//!
//! assert_eq!(report.snapshots, 2);
//! assert!(sink.source.unwrap().contains("id: int"));
//! ```

pub mod config;
pub mod ddl;
pub mod error;
pub mod graph;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod mutator;
pub mod render;
pub mod sequencer;
pub mod sink;

use wasm_bindgen::prelude::*;

pub use config::{NoopPolicy, RenderOptions, ReplayConfig};
pub use error::ReplayError;
pub use graph::{DiagramGraph, Graph};
pub use render::{Renderer, SvgRenderer};
pub use sequencer::{Replay, ReplayReport, Sequencer};

use sink::{ArtifactSink, MemorySink};

/// Parse `input` and replay it onto an empty [`Graph`] with the built-in
/// SVG renderer.
pub fn replay<S>(input: &str, config: &ReplayConfig, sink: &mut S) -> Result<ReplayReport, ReplayError>
where
    S: ArtifactSink + ?Sized,
{
    let statements = ddl::parse_statements(input);
    let sequencer = Sequencer::with_svg(config);
    let replay = sequencer.run(Graph::new(), &statements, sink)?;
    Ok(replay.report)
}

/// Final diagram source for `input`, without rendering anything.
pub fn replay_source(input: &str, config: &ReplayConfig) -> Result<String, ReplayError> {
    let graph = ddl::parse_statements(input)
        .iter()
        .try_fold(Graph::new(), |graph, statement| {
            sequencer::apply_statement(graph, statement, config.strict)
        })?;
    Ok(graph.serialize())
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// One rendered step: the statement index it belongs to and its SVG.
#[wasm_bindgen(getter_with_clone)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub step: usize,
    pub svg: String,
}

/// Replay DDL statements into `{ step, svg }` snapshots. With `skip_noop`
/// the steps can have gaps.
#[wasm_bindgen(js_name = "ddlToSnapshots")]
pub fn ddl_to_snapshots(input: &str, skip_noop: Option<bool>) -> Result<js_sys::Array, String> {
    let snapshots = js_sys::Array::new();
    for snapshot in snapshots_for(input, skip_noop.unwrap_or(false))? {
        snapshots.push(&JsValue::from(snapshot));
    }
    Ok(snapshots)
}

fn snapshots_for(input: &str, skip_noop: bool) -> Result<Vec<Snapshot>, String> {
    let config = ReplayConfig {
        noop_policy: if skip_noop { NoopPolicy::Skip } else { NoopPolicy::Emit },
        ..ReplayConfig::default()
    };

    let mut sink = MemorySink::new();
    replay(input, &config, &mut sink).map_err(|e| error_chain(&e))?;

    Ok(sink
        .snapshots
        .into_iter()
        .map(|(step, bytes)| Snapshot {
            step,
            svg: String::from_utf8_lossy(&bytes).into_owned(),
        })
        .collect())
}

/// Replay DDL statements and return the final diagram source
#[wasm_bindgen(js_name = "ddlToSource")]
pub fn ddl_to_source(input: &str) -> Result<String, String> {
    replay_source(input, &ReplayConfig::default()).map_err(|e| error_chain(&e))
}

/// Error message followed by its sources.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_source() {
        let source = replay_source(
            "CREATE TABLE users\nCREATE TABLE accounts\nALTER TABLE accounts ADD COLUMN id int\n\
             ALTER TABLE users ADD COLUMN account_id int\n\
             ALTER TABLE users ADD CONSTRAINT fk FOREIGN KEY (account_id) REFERENCES accounts (id)",
            &ReplayConfig::default(),
        )
        .unwrap();
        assert!(source.ends_with("users.account_id -> accounts.id\n"));
    }

    #[test]
    fn test_replay_source_strict() {
        let input = "CREATE TABLE users\nALTER TABLE users ADD COLUMN id";
        assert!(replay_source(input, &ReplayConfig::default()).is_ok());

        let strict = ReplayConfig {
            strict: true,
            ..ReplayConfig::default()
        };
        assert!(matches!(
            replay_source(input, &strict),
            Err(ReplayError::Malformed { index: 1, .. })
        ));
    }

    #[test]
    fn test_error_chain() {
        let err = replay_source("ALTER TABLE ghosts ADD COLUMN id int", &ReplayConfig::default()).unwrap_err();
        assert_eq!(
            error_chain(&err),
            "statement 0 (line 1) could not be applied: ALTER TABLE ghosts ADD COLUMN id int: \
             unknown reference `ghosts` in `ghosts.id`"
        );
    }

    #[test]
    fn test_snapshots_keep_their_step() {
        let input = "CREATE TABLE users\nDROP TABLE x\nALTER TABLE users ADD COLUMN id int\n";

        let all = snapshots_for(input, false).unwrap();
        let steps: Vec<usize> = all.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 1, 2]);

        let skipped = snapshots_for(input, true).unwrap();
        let steps: Vec<usize> = skipped.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 2]);
        assert_eq!(skipped[1], all[2]);
        assert!(skipped[1].svg.contains("id: int"));
    }

    #[test]
    fn test_ddl_to_source() {
        assert_eq!(ddl_to_source("CREATE TABLE t").unwrap(), "t: {\n  shape: sql_table\n}\n");
        assert!(ddl_to_source("ALTER TABLE t ADD COLUMN id int").is_err());
    }
}
