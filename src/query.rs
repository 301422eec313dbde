use rayon::prelude::*;
use tracing::warn;

use crate::{
    embedder::Embedder,
    error::{Error, Result},
    store::VectorStore,
};

/// One ranked search hit.
///
/// `collection` is `None` when the query targeted a single explicit
/// collection and `Some(name)` in federated mode, where results from
/// several collections are merged and the origin matters.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub collection: Option<String>,
    pub id: String,
    pub document: String,
    pub distance: f32,
    /// `1 - distance`; valid as a similarity because embeddings are unit
    /// vectors under cosine distance.
    pub similarity: f32,
}

/// Search one collection for the `k` documents nearest to `query_text`.
///
/// The query is embedded with the same embedder used at ingestion. The
/// store returns matches in ascending distance order and that order is
/// kept, so results arrive sorted by descending similarity. An empty
/// result list is a valid outcome; an unknown collection name is an
/// error.
pub fn search_collection(
    embedder: &dyn Embedder,
    store: &VectorStore,
    collection_name: &str,
    query_text: &str,
    k: usize,
) -> Result<Vec<QueryResult>> {
    validate_k(k)?;
    let embedding = embed_query(embedder, query_text)?;
    let collection = store.collection(collection_name)?;

    let matches = collection.query(&embedding, k)?;
    Ok(matches
        .into_iter()
        .map(|m| QueryResult {
            collection: None,
            id: m.id,
            document: m.document,
            distance: m.distance,
            similarity: 1.0 - m.distance,
        })
        .collect())
}

/// Search every collection in the store and merge the results into one
/// globally ranked list.
///
/// The query is embedded once and reused for every collection. Each
/// collection contributes up to `k_per_collection` matches tagged with
/// its name; per-collection lookups are independent reads and run in
/// parallel, then the concatenated list is re-sorted by descending
/// similarity. The sort is stable and collections are visited in
/// lexicographic order, so equal similarities come out in a reproducible
/// order.
///
/// A collection that fails to answer contributes nothing and is logged;
/// partial results beat failing the whole fan-out. A store with no
/// collections yields an empty list.
pub fn search_all(
    embedder: &dyn Embedder,
    store: &VectorStore,
    query_text: &str,
    k_per_collection: usize,
) -> Result<Vec<QueryResult>> {
    validate_k(k_per_collection)?;
    let embedding = embed_query(embedder, query_text)?;
    let names = store.list_collections()?;

    let per_collection: Vec<Vec<QueryResult>> = names
        .par_iter()
        .map(|name| {
            let matches = store
                .collection(name)
                .and_then(|c| c.query(&embedding, k_per_collection));
            match matches {
                Ok(matches) => matches
                    .into_iter()
                    .map(|m| QueryResult {
                        collection: Some(name.clone()),
                        id: m.id,
                        document: m.document,
                        distance: m.distance,
                        similarity: 1.0 - m.distance,
                    })
                    .collect(),
                Err(error) => {
                    warn!(
                        collection = %name,
                        %error,
                        "collection skipped in federated query"
                    );
                    Vec::new()
                }
            }
        })
        .collect();

    let mut results: Vec<QueryResult> =
        per_collection.into_iter().flatten().collect();
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(results)
}

fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(Error::Config("result count must be at least 1".into()));
    }
    Ok(())
}

fn embed_query(embedder: &dyn Embedder, query_text: &str) -> Result<Vec<f32>> {
    if query_text.trim().is_empty() {
        return Err(Error::EmptyInput("query text"));
    }

    let mut vectors = embedder.embed(&[query_text.to_string()])?;
    Ok(vectors.remove(0))
}
