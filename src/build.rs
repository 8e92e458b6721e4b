use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RelGraphConfig;
use crate::graph::RelationGraph;
use crate::graph::registry::SharedGraph;
use crate::naming::relative_module_path;
use crate::parser::parse_file;
use crate::scanner::{ScanError, ScanOptions, Scanner};
use crate::walker::walk_project;

/// Aggregate statistics produced by one scan run.
#[derive(Debug, Default, Serialize)]
pub struct ScanReport {
    /// Files discovered under the root.
    pub file_count: usize,
    /// Files walked to completion.
    pub scanned: usize,
    /// Files that could not be read or parsed; they contribute nothing.
    pub skipped: usize,
    /// Files whose walk hit an unsupported shape; their relations may be partial.
    pub aborted: usize,
    /// Edges written across all files, including those from aborted walks.
    pub relations: usize,
    /// Wall-clock time for the run in seconds.
    pub elapsed_secs: f64,
}

/// Stack reserved for each scan worker. Lowering and scanning recurse once per
/// nesting level, so the default depth bound needs far more than rayon's 2 MiB.
const WORKER_STACK_BYTES: usize = 64 * 1024 * 1024;

/// What happened to one file.
enum FileOutcome {
    Complete { relations: usize },
    Aborted { relations: usize, error: ScanError },
    Skipped(anyhow::Error),
}

/// Discover, parse and scan every JavaScript file under `root` into one graph.
///
/// Files are scanned in parallel against a single shared registry. A file that
/// fails is logged and counted; the run carries on with the rest.
pub fn build_graph(
    root: &Path,
    config: &RelGraphConfig,
) -> anyhow::Result<(RelationGraph, ScanReport)> {
    let start = Instant::now();
    let files = walk_project(root, config)
        .with_context(|| format!("failed to walk {}", root.display()))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .stack_size(WORKER_STACK_BYTES)
        .thread_name(|i| format!("relgraph-scan-{i}"))
        .build()
        .context("failed to start scan worker pool")?;

    let shared = SharedGraph::new();
    let outcomes: Vec<FileOutcome> = pool.install(|| {
        files
            .par_iter()
            .map(|path| scan_file(root, path, &shared, &config.scan))
            .collect()
    });

    let mut report = ScanReport {
        file_count: files.len(),
        ..ScanReport::default()
    };
    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            FileOutcome::Complete { relations } => {
                report.scanned += 1;
                report.relations += relations;
            }
            FileOutcome::Aborted { relations, error } => {
                warn!(
                    "{}: scan aborted after {relations} relation(s), graph may be partial: {error}",
                    path.display()
                );
                report.aborted += 1;
                report.relations += relations;
            }
            FileOutcome::Skipped(err) => {
                warn!("{}: skipped: {err:#}", path.display());
                report.skipped += 1;
            }
        }
    }
    report.elapsed_secs = start.elapsed().as_secs_f64();

    let graph = shared.into_inner();
    info!(
        files = report.file_count,
        vertices = graph.vertex_count(),
        relations = report.relations,
        "scan finished in {:.2}s",
        report.elapsed_secs
    );
    Ok((graph, report))
}

fn scan_file(
    root: &Path,
    path: &Path,
    shared: &SharedGraph,
    options: &ScanOptions,
) -> FileOutcome {
    let tree = match std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .and_then(|source| {
            parse_file(path, &source, options.max_depth).map_err(anyhow::Error::from)
        })
    {
        Ok(tree) => tree,
        Err(err) => return FileOutcome::Skipped(err),
    };

    let rel = relative_module_path(root, path);
    let mut scanner = Scanner::new(shared, &rel, options);
    match scanner.scan(&tree) {
        Ok(()) => {
            debug!("{rel}: {} relation(s)", scanner.emitted());
            FileOutcome::Complete {
                relations: scanner.emitted(),
            }
        }
        Err(error) => FileOutcome::Aborted {
            relations: scanner.emitted(),
            error,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edge::Relation;
    use std::fs;

    fn count(graph: &RelationGraph, from: &str, to: &str, relation: Relation) -> usize {
        match (graph.vertex(from), graph.vertex(to)) {
            (Some(f), Some(t)) => graph.count_relations(f, t, relation),
            _ => 0,
        }
    }

    #[test]
    fn test_build_graph_links_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("app.js"),
            "require(['./util', 'lib/dom.js'], function (util, dom) {\n  start();\n});\n\
             function start() { util.go(); }\n",
        )
        .unwrap();
        fs::write(
            src.join("util.js"),
            "var self = new Base(this);\nfunction go() { log('go'); }\n",
        )
        .unwrap();

        let (graph, report) = build_graph(dir.path(), &RelGraphConfig::default()).unwrap();

        assert_eq!(report.file_count, 2);
        assert_eq!(report.scanned, 2);
        assert_eq!(report.skipped + report.aborted, 0);

        assert_eq!(count(&graph, "app", "util", Relation::Requires), 1);
        assert_eq!(count(&graph, "app", "dom", Relation::Requires), 1);
        assert_eq!(count(&graph, "app", "require", Relation::Invokes), 1);
        assert_eq!(count(&graph, "app", "start", Relation::Invokes), 1);
        assert_eq!(count(&graph, "app", "start", Relation::Declares), 1);
        assert_eq!(
            count(&graph, "app", "go", Relation::Invokes),
            0,
            "member calls are not invocations"
        );
        assert_eq!(count(&graph, "util", "Base", Relation::Extends), 1);
        assert_eq!(count(&graph, "util", "go", Relation::Declares), 1);
        assert_eq!(count(&graph, "util", "log", Relation::Invokes), 1);

        let util = graph.vertex("util").unwrap();
        assert!(graph.graph[util].is_module);
        assert_eq!(report.relations, graph.graph.edge_count());
    }

    #[test]
    fn test_build_graph_counts_aborted_and_skipped_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ok.js"), "ready();").unwrap();
        fs::write(dir.path().join("broken.js"), "function (").unwrap();
        fs::write(dir.path().join("modern.js"), "setup();\nclass Widget {}\nteardown();").unwrap();

        let (graph, report) = build_graph(dir.path(), &RelGraphConfig::default()).unwrap();

        assert_eq!(report.file_count, 3);
        assert_eq!(report.scanned, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.aborted, 1);

        // Edges emitted before the unsupported class remain.
        assert_eq!(count(&graph, "modern", "setup", Relation::Invokes), 1);
        assert!(graph.vertex("teardown").is_none());
        assert!(graph.vertex("broken").is_none(), "unparsed files get no module vertex");
    }

    fn nested_call(levels: usize) -> String {
        format!("x = {}f(){};\n", "[".repeat(levels), "]".repeat(levels))
    }

    #[test]
    fn test_build_graph_aborts_files_nested_past_the_bound() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deep.js"), nested_call(2000)).unwrap();

        let (graph, report) = build_graph(dir.path(), &RelGraphConfig::default()).unwrap();

        assert_eq!(report.file_count, 1);
        assert_eq!(report.scanned, 0);
        assert_eq!(report.aborted + report.skipped, 1);
        assert_eq!(report.aborted, 1);
        assert_eq!(count(&graph, "deep", "f", Relation::Invokes), 0);
    }

    #[test]
    fn test_build_graph_scans_nesting_below_the_default_bound() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("deep.js"), nested_call(900)).unwrap();

        let (graph, report) = build_graph(dir.path(), &RelGraphConfig::default()).unwrap();

        assert_eq!(report.scanned, 1, "depth 900 fits under the default bound of 1024");
        assert_eq!(count(&graph, "deep", "f", Relation::Invokes), 1);
    }

    #[test]
    fn test_build_graph_looks_through_parentheses() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("widget.js"),
            "var self = (new Base());\nrequire((['./a']), function () {});\n(init)();\n",
        )
        .unwrap();

        let (graph, report) = build_graph(dir.path(), &RelGraphConfig::default()).unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(count(&graph, "widget", "Base", Relation::Extends), 1);
        assert_eq!(count(&graph, "widget", "Base", Relation::Invokes), 1);
        assert_eq!(count(&graph, "widget", "a", Relation::Requires), 1);
        assert_eq!(count(&graph, "widget", "require", Relation::Invokes), 1);
        assert_eq!(count(&graph, "widget", "init", Relation::Invokes), 1);
    }
}
