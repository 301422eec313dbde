use clap::Parser;
use kdam::tqdm;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod data_dir;
pub mod embedder;
pub mod error;
pub mod ingestion;
pub mod inventory;
pub mod loader;
pub mod query;
pub mod store;

use cli::{Cli, Command};
use data_dir::DataDir;
use embedder::HashEmbedder;
use query::QueryResult;
use store::VectorStore;

fn init_tracing(verbose: u8) {
    let filter = if let Ok(env) = std::env::var("SEMDEX_LOG") {
        EnvFilter::new(env)
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> error::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::Completions(args) = &cli.command {
        args.generate();
        return Ok(());
    }

    let data_dir = DataDir::resolve(cli.data_dir.as_deref())?;
    let store = VectorStore::open(&data_dir.store_db())?;
    let embedder = HashEmbedder::default();

    match cli.command {
        Command::Ingest(args) => cmd_ingest(&store, &embedder, &args)?,
        Command::Search(args) => cmd_search(&store, &embedder, &args)?,
        Command::Overview(args) => cmd_overview(&store, args.json)?,
        Command::Preview(args) => cmd_preview(&store, &args)?,
        Command::Completions(_) => {}
    }

    Ok(())
}

fn cmd_ingest(
    store: &VectorStore,
    embedder: &HashEmbedder,
    args: &cli::IngestArgs,
) -> error::Result<()> {
    let groups = loader::load_groups(&args.path)?;
    if groups.is_empty() {
        println!("No document groups found in {}", args.path.display());
        return Ok(());
    }

    let mut reports = Vec::new();
    let mut failures = Vec::new();

    for group in tqdm!(groups.iter(), desc = "embedding") {
        match ingestion::ingest_group(embedder, store, group) {
            Ok(0) => {}
            Ok(count) => reports.push((group.name.clone(), count)),
            Err(error) => failures.push((group.name.clone(), error)),
        }
    }
    eprintln!();

    for (name, count) in &reports {
        println!("{name}: {count} document(s)");
    }
    for (name, error) in &failures {
        eprintln!("warning: failed to ingest '{name}': {error}");
    }

    Ok(())
}

fn cmd_search(
    store: &VectorStore,
    embedder: &HashEmbedder,
    args: &cli::SearchArgs,
) -> error::Result<()> {
    let k = args.count.clamp(1, 10);

    let results = match &args.collection {
        Some(name) => {
            query::search_collection(embedder, store, name, &args.query, k)?
        }
        None => query::search_all(embedder, store, &args.query, k)?,
    };

    if args.json {
        format_json(&results, &args.query);
    } else {
        format_human(&results);
    }

    Ok(())
}

fn cmd_overview(store: &VectorStore, json: bool) -> error::Result<()> {
    let summaries = inventory::summarize(store)?;

    if json {
        print!("[");
        for (i, s) in summaries.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            print!("{{\"collection\":");
            print_json_string(&s.name);
            print!(
                ",\"documents\":{},\"max_document_chars\":{}}}",
                s.documents, s.max_document_chars
            );
        }
        println!("]");
    } else if summaries.is_empty() {
        println!("No collections in the store.");
    } else {
        for s in &summaries {
            println!(
                "{}\t{} document(s)\tlongest {} chars",
                s.name, s.documents, s.max_document_chars
            );
        }
    }

    Ok(())
}

fn cmd_preview(
    store: &VectorStore,
    args: &cli::PreviewArgs,
) -> error::Result<()> {
    let collection = store.collection(&args.collection)?;
    let entries = collection.get_limited(args.limit.max(1))?;

    if args.json {
        print!("[");
        for (i, (id, document)) in entries.iter().enumerate() {
            if i > 0 {
                print!(",");
            }
            print!("{{\"id\":");
            print_json_string(id);
            print!(",\"document\":");
            print_json_string(&truncate_chars(document, 1000));
            print!("}}");
        }
        println!("]");
    } else if entries.is_empty() {
        println!("Collection '{}' is empty.", args.collection);
    } else {
        for (id, document) in &entries {
            println!("--- {id} ---");
            println!("{}", truncate_chars(document, 1000));
        }
    }

    Ok(())
}

/// Format results for human-readable terminal output.
fn format_human(results: &[QueryResult]) {
    if results.is_empty() {
        println!("No results found.");
        return;
    }

    for (i, r) in results.iter().enumerate() {
        match &r.collection {
            Some(name) => println!(
                "{:>3}. [{:.3}] {name} #{}",
                i + 1,
                r.similarity,
                short_id(&r.id)
            ),
            None => {
                println!("{:>3}. [{:.3}] #{}", i + 1, r.similarity, short_id(&r.id))
            }
        }
        println!("     {}", preview_line(&r.document, 120));
    }
    println!("\n{} result(s)", results.len());
}

/// Format results as JSON output.
fn format_json(results: &[QueryResult], query: &str) {
    print!("{{\"query\":");
    print_json_string(query);
    print!(",\"result_count\":{},\"results\":[", results.len());

    for (i, r) in results.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!("{{\"rank\":{}", i + 1);
        if let Some(name) = &r.collection {
            print!(",\"collection\":");
            print_json_string(name);
        }
        print!(",\"id\":");
        print_json_string(&r.id);
        print!(
            ",\"similarity\":{:.6},\"distance\":{:.6},\"document\":",
            r.similarity, r.distance
        );
        print_json_string(&truncate_chars(&r.document, 1000));
        print!("}}");
    }

    println!("]}}");
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn preview_line(document: &str, max_chars: usize) -> String {
    let flat = document.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&flat, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}

fn print_json_string(s: &str) {
    print!("\"");
    for c in s.chars() {
        match c {
            '"' => print!("\\\""),
            '\\' => print!("\\\\"),
            '\n' => print!("\\n"),
            '\r' => print!("\\r"),
            '\t' => print!("\\t"),
            c if c < '\x20' => print!("\\u{:04x}", c as u32),
            c => print!("{c}"),
        }
    }
    print!("\"");
}
