//! semdex - semantic search over folders of documents.
//!
//! semdex embeds directories of markdown and text files into a persistent
//! vector store backed by [redb](https://github.com/cberner/redb). Every
//! top-level folder becomes a named collection; queries run against one
//! collection or fan out over all of them and merge into a single ranked
//! list.
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use semdex::{HashEmbedder, VectorStore};
//! use semdex::{ingestion, loader, query};
//!
//! let store = VectorStore::open(Path::new("./store.redb")).unwrap();
//! let embedder = HashEmbedder::default();
//!
//! let groups = loader::load_groups(Path::new("./documents")).unwrap();
//! let outcome = ingestion::ingest_groups(&embedder, &store, &groups);
//! println!("ingested {} collection(s)", outcome.reports.len());
//!
//! let results = query::search_all(&embedder, &store, "solar panels", 5).unwrap();
//! for r in &results {
//!     println!(
//!         "[{:.3}] {} #{}",
//!         r.similarity,
//!         r.collection.as_deref().unwrap_or("-"),
//!         r.id
//!     );
//! }
//! ```

pub mod data_dir;
pub mod embedder;
pub mod error;
pub mod ingestion;
pub mod inventory;
pub mod loader;
pub mod query;
pub mod store;

pub use data_dir::DataDir;
pub use embedder::{Embedder, HashEmbedder};
pub use error::{Error, Result};
pub use inventory::CollectionSummary;
pub use loader::DocumentGroup;
pub use query::QueryResult;
pub use store::{Collection, Match, Metadata, VectorStore};
