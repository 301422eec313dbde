use std::path::Path;

use semdex::{Embedder, Error, HashEmbedder, VectorStore};
use semdex::{ingestion, inventory, loader, query};

/// Build a small corpus:
///
/// ```text
/// base/
///   docs-a/hello.md     "hello world"
///   docs-a/farewell.md  "goodbye"
///   docs-b/pasta.md     "boil water cook pasta"
///   docs-b/garden.md    "gardening plants sunlight"
/// ```
fn write_corpus(base: &Path) {
    for (dir, file, body) in [
        ("docs-a", "hello.md", "hello world"),
        ("docs-a", "farewell.md", "goodbye"),
        ("docs-b", "pasta.md", "boil water cook pasta"),
        ("docs-b", "garden.md", "gardening plants sunlight"),
    ] {
        let dir = base.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), body).unwrap();
    }
}

fn ingested_store() -> (tempfile::TempDir, VectorStore, HashEmbedder) {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus");
    std::fs::create_dir(&corpus).unwrap();
    write_corpus(&corpus);

    let store = VectorStore::open(&tmp.path().join("store.redb")).unwrap();
    let embedder = HashEmbedder::default();

    let groups = loader::load_groups(&corpus).unwrap();
    let outcome = ingestion::ingest_groups(&embedder, &store, &groups);
    assert!(outcome.failures.is_empty());

    (tmp, store, embedder)
}

#[test]
fn ingest_fills_one_collection_per_folder() {
    let (_tmp, store, _embedder) = ingested_store();

    assert_eq!(store.list_collections().unwrap(), vec!["docs-a", "docs-b"]);
    assert_eq!(store.collection("docs-a").unwrap().count().unwrap(), 2);
    assert_eq!(store.collection("docs-b").unwrap().count().unwrap(), 2);
}

#[test]
fn hello_query_finds_hello_world() {
    let (_tmp, store, embedder) = ingested_store();

    let results =
        query::search_collection(&embedder, &store, "docs-a", "hello", 1)
            .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document, "hello world");
    assert!((results[0].similarity - (1.0 - results[0].distance)).abs() < 1e-6);

    // The same query scores lower against a collection holding only an
    // unrelated document.
    let farewell_only =
        store.create_or_get_collection("farewell-only", 384).unwrap();
    let embedding = embedder.embed(&["goodbye".to_string()]).unwrap();
    farewell_only
        .add(
            &["f1".to_string()],
            &["goodbye".to_string()],
            &embedding,
            None,
        )
        .unwrap();
    let other = query::search_collection(
        &embedder,
        &store,
        "farewell-only",
        "hello",
        1,
    )
    .unwrap();
    assert!(results[0].similarity > other[0].similarity);
}

#[test]
fn federated_search_ranks_across_collections() {
    let (_tmp, store, embedder) = ingested_store();

    let results = query::search_all(&embedder, &store, "cook pasta", 2).unwrap();

    // Two collections, at most two results each, all tagged.
    assert!(results.len() <= 4);
    assert!(results.iter().all(|r| r.collection.is_some()));
    assert_eq!(results[0].collection.as_deref(), Some("docs-b"));
    assert_eq!(results[0].document, "boil water cook pasta");
    for window in results.windows(2) {
        assert!(window[0].similarity >= window[1].similarity);
    }
}

#[test]
fn reingesting_the_same_corpus_appends() {
    let tmp = tempfile::tempdir().unwrap();
    let corpus = tmp.path().join("corpus");
    std::fs::create_dir(&corpus).unwrap();
    write_corpus(&corpus);

    let store = VectorStore::open(&tmp.path().join("store.redb")).unwrap();
    let embedder = HashEmbedder::default();
    let groups = loader::load_groups(&corpus).unwrap();

    ingestion::ingest_groups(&embedder, &store, &groups);
    ingestion::ingest_groups(&embedder, &store, &groups);

    let summaries = inventory::summarize(&store).unwrap();
    assert_eq!(summaries.len(), 2);
    // Append-only ingestion doubles the counts, id collisions aside.
    assert!(summaries.iter().all(|s| s.documents == 4));
}

#[test]
fn inventory_reports_longest_document() {
    let (_tmp, store, _embedder) = ingested_store();

    let summaries = inventory::summarize(&store).unwrap();
    let docs_b = summaries.iter().find(|s| s.name == "docs-b").unwrap();
    assert_eq!(docs_b.documents, 2);
    assert_eq!(docs_b.max_document_chars, "gardening plants sunlight".len());
}

#[test]
fn searching_a_missing_collection_fails() {
    let (_tmp, store, embedder) = ingested_store();

    let result =
        query::search_collection(&embedder, &store, "no-such", "hello", 1);
    assert!(matches!(
        result,
        Err(Error::NotFound {
            kind: "collection",
            ..
        })
    ));
}
