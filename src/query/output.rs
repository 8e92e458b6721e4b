use std::io::IsTerminal;

use crate::cli::OutputFormat;
use crate::query::show::{RelationEntry, ShowResult};
use crate::query::stats::GraphStats;

fn entry_label(e: &RelationEntry) -> String {
    if e.count > 1 {
        format!("{} x{}", e.name, e.count)
    } else {
        e.name.clone()
    }
}

/// Format and print show results to stdout according to the selected output format.
pub fn format_show_results(results: &[ShowResult], format: &OutputFormat) {
    match format {
        OutputFormat::Compact => {
            for r in results {
                println!("vertex {} {}", r.name, r.role);
                for e in &r.outgoing {
                    println!("  -> {} {}", e.relation, entry_label(e));
                }
                for e in &r.incoming {
                    println!("  <- {} {}", e.relation, entry_label(e));
                }
            }
            println!("{} vertices found", results.len());
        }

        OutputFormat::Table => {
            let use_color = std::io::stdout().is_terminal();
            let rel_w = "RELATION".len();
            let name_w = results
                .iter()
                .flat_map(|r| r.outgoing.iter().chain(r.incoming.iter()))
                .map(|e| e.name.len())
                .max()
                .unwrap_or(4)
                .max(4);

            for r in results {
                if use_color {
                    println!("\x1b[1m{}\x1b[0m ({})", r.name, r.role);
                } else {
                    println!("{} ({})", r.name, r.role);
                }
                println!(
                    "  {:<3}  {:<rel_w$}  {:<name_w$}  {:>5}",
                    "DIR", "RELATION", "NAME", "COUNT",
                );
                println!("  {}", "-".repeat(rel_w + name_w + 16));
                for (dir, e) in r
                    .outgoing
                    .iter()
                    .map(|e| ("out", e))
                    .chain(r.incoming.iter().map(|e| ("in", e)))
                {
                    println!(
                        "  {:<3}  {:<rel_w$}  {:<name_w$}  {:>5}",
                        dir,
                        e.relation.as_str(),
                        e.name,
                        e.count,
                    );
                }
                println!();
            }
            println!("{} vertices found", results.len());
        }

        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(results).unwrap_or_default();
            println!("{}", json);
        }
    }
}

/// Format and print graph statistics to stdout.
pub fn format_stats(stats: &GraphStats, format: &OutputFormat) {
    match format {
        OutputFormat::Compact | OutputFormat::Table => {
            println!(
                "vertices {} modules {} symbols {} merged {}",
                stats.vertex_count, stats.modules, stats.symbols, stats.merged
            );
            for (relation, n) in &stats.edges {
                println!("{} {}", relation, n);
            }
            println!("edges {}", stats.edge_count);
            println!("uninvoked declarations {}", stats.uninvoked_declarations);
        }

        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(stats).unwrap_or_default();
            println!("{}", json);
        }
    }
}
