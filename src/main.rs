mod ast;
mod build;
mod cli;
mod config;
mod export;
mod graph;
mod naming;
mod output;
mod parser;
mod query;
mod scanner;
mod walker;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use build::{ScanReport, build_graph};
use cli::{Cli, Commands};
use config::RelGraphConfig;
use export::model::ExportParams;
use graph::RelationGraph;

/// Environment variable holding the tracing filter directive.
const LOG_ENV: &str = "RELGRAPH_LOG";

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,relgraph=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn scan(path: &Path) -> Result<(RelationGraph, ScanReport)> {
    let config = RelGraphConfig::load(path);
    build_graph(path, &config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan { path, json } => {
            let (graph, report) = scan(&path)?;
            let stats = query::stats::graph_stats(&graph);
            output::print_summary(&report, &stats, json);
        }
        Commands::Show {
            name,
            path,
            relation,
            case_insensitive,
            format,
        } => {
            let (graph, _) = scan(&path)?;
            let results =
                query::show::show_relations(&graph, &name, case_insensitive, &relation)?;
            if results.is_empty() {
                eprintln!("no vertex matches '{}'", name);
                std::process::exit(1);
            }
            query::output::format_show_results(&results, &format);
        }
        Commands::Stats { path, format } => {
            let (graph, _) = scan(&path)?;
            let stats = query::stats::graph_stats(&graph);
            query::output::format_stats(&stats, &format);
        }
        Commands::Export {
            path,
            format,
            relation,
            keep_isolated,
        } => {
            let (graph, _) = scan(&path)?;
            let params = ExportParams {
                format,
                relations: relation,
                prune_isolated: !keep_isolated,
            };
            let result = export::export_graph(&graph, &params)?;
            print!("{}", result.content);
            if !result.content.ends_with('\n') {
                println!();
            }
            tracing::info!(
                vertices = result.node_count,
                edges = result.edge_count,
                "export complete"
            );
        }
    }

    Ok(())
}
