use serde::Serialize;

use crate::build::ScanReport;
use crate::query::stats::GraphStats;

#[derive(Serialize)]
struct ScanSummary<'a> {
    #[serde(flatten)]
    report: &'a ScanReport,
    graph: &'a GraphStats,
}

/// Print a summary of a scan run.
///
/// - `json = true`: emit a pretty-printed JSON object to stdout.
/// - `json = false`: emit a cargo-style human-readable summary to stdout.
///
/// Skipped and aborted files are reported on **stderr** so that the stdout
/// stream remains clean for downstream JSON consumers.
pub fn print_summary(report: &ScanReport, graph: &GraphStats, json: bool) {
    if json {
        match serde_json::to_string_pretty(&ScanSummary { report, graph }) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("error serialising summary: {}", e),
        }
        return;
    }

    println!(
        "Scanned {} files in {:.2}s",
        report.file_count, report.elapsed_secs
    );
    println!(
        "  {} vertices ({} modules, {} symbols)",
        graph.vertex_count, graph.modules, graph.symbols
    );
    let breakdown: Vec<String> = graph
        .edges
        .iter()
        .map(|(relation, n)| format!("{} {}", n, relation))
        .collect();
    println!("  {} relations: {}", graph.edge_count, breakdown.join(", "));

    if report.skipped > 0 {
        eprintln!("  {} files skipped (read or parse errors)", report.skipped);
    }
    if report.aborted > 0 {
        eprintln!(
            "  {} files aborted on unsupported syntax (relations may be partial)",
            report.aborted
        );
    }
}
