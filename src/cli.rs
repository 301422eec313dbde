use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "semdex",
    about = "Semantic search over folders of documents"
)]
pub struct Cli {
    /// Override the data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Embed a directory of document folders into the store
    Ingest(IngestArgs),
    /// Search one collection, or all of them
    Search(SearchArgs),
    /// Show document counts and sizes per collection
    Overview(OverviewArgs),
    /// Print the first documents of a collection
    Preview(PreviewArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

// -- Ingest --

#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// Base directory; every top-level folder becomes a collection
    pub path: PathBuf,
}

// -- Search --

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// The search query
    pub query: String,

    /// Search only within this collection
    #[arg(short = 'c', long)]
    pub collection: Option<String>,

    /// Results per collection, between 1 and 10
    #[arg(short = 'n', long, default_value = "5")]
    pub count: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Overview --

#[derive(Debug, Parser)]
pub struct OverviewArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Preview --

#[derive(Debug, Parser)]
pub struct PreviewArgs {
    /// Collection to preview
    pub collection: String,

    /// Number of documents to print
    #[arg(long, default_value = "5")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// -- Completions --

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

impl CompletionsArgs {
    /// Generate shell completions and print to stdout.
    pub fn generate(&self) {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.shell,
            &mut cmd,
            "semdex",
            &mut std::io::stdout(),
        );
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_search_defaults() {
        let cli = Cli::parse_from(["semdex", "search", "hello"]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.query, "hello");
                assert_eq!(args.count, 5);
                assert_eq!(args.collection, None);
                assert!(!args.json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_search_with_collection() {
        let cli = Cli::parse_from([
            "semdex", "search", "hello", "-c", "notes", "-n", "3",
        ]);
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.collection.as_deref(), Some("notes"));
                assert_eq!(args.count, 3);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn parse_preview_defaults() {
        let cli = Cli::parse_from(["semdex", "preview", "notes"]);
        match cli.command {
            Command::Preview(args) => {
                assert_eq!(args.collection, "notes");
                assert_eq!(args.limit, 5);
            }
            _ => panic!("expected preview command"),
        }
    }
}
