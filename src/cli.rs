use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::export::model::ExportFormat;
use crate::graph::edge::Relation;

/// Structural relation graph for JavaScript codebases.
///
/// relgraph walks every JavaScript file under a directory and records which
/// module declares, invokes, extends, and requires what.
#[derive(Parser, Debug)]
#[command(
    name = "relgraph",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    /// Log per-file progress to stderr (same as RELGRAPH_LOG=debug).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for query results.
#[derive(Clone, Debug, ValueEnum, Default)]
pub enum OutputFormat {
    /// Compact one-line-per-result format (default).
    #[default]
    Compact,
    /// Human-readable columnar table with optional ANSI color when stdout is a terminal.
    Table,
    /// Structured JSON suitable for programmatic consumption.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a project directory and print a summary of the relation graph.
    Scan {
        /// Path to the project root to scan.
        path: PathBuf,

        /// Output the summary as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Show the relations of every vertex whose name matches a pattern.
    ///
    /// Re-scans the project before executing the query. Supports regex patterns
    /// (e.g. "^util$" or "Base.*") and case-insensitive matching.
    Show {
        /// Vertex name or regex pattern.
        name: String,

        /// Path to the project root to scan and query.
        path: PathBuf,

        /// Only report these relations (repeatable or comma-separated).
        #[arg(short, long, value_delimiter = ',')]
        relation: Vec<Relation>,

        /// Case-insensitive pattern matching.
        #[arg(short = 'i', long)]
        case_insensitive: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Graph statistics: module, symbol, and per-relation edge counts.
    Stats {
        /// Path to the project root to scan.
        path: PathBuf,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Compact)]
        format: OutputFormat,
    },

    /// Render the relation graph to stdout as Graphviz DOT or JSON.
    Export {
        /// Path to the project root to scan.
        path: PathBuf,

        /// Export format.
        #[arg(long, value_enum, default_value_t = ExportFormat::Dot)]
        format: ExportFormat,

        /// Only export these relations (repeatable or comma-separated).
        #[arg(short, long, value_delimiter = ',')]
        relation: Vec<Relation>,

        /// Keep vertices that have no exported edge.
        #[arg(long)]
        keep_isolated: bool,
    },
}
