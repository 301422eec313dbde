use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    embedder::Embedder,
    error::Result,
    loader::DocumentGroup,
    store::VectorStore,
};

/// Outcome of ingesting one document group.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub collection: String,
    pub documents: usize,
}

/// A group whose ingestion failed; the other groups are unaffected.
#[derive(Debug)]
pub struct IngestFailure {
    pub collection: String,
    pub error: crate::error::Error,
}

/// Combined outcome of [`ingest_groups`].
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub reports: Vec<IngestReport>,
    pub failures: Vec<IngestFailure>,
}

/// Embed one document group and append it to the collection named after
/// the group.
///
/// The whole group is embedded in a single batch call, every document
/// gets a fresh random id, and the collection is created on first use.
/// Re-running over the same group appends duplicates with new ids; there
/// is no upsert.
///
/// Returns the number of documents written. An empty group is skipped
/// without creating its collection.
pub fn ingest_group(
    embedder: &dyn Embedder,
    store: &VectorStore,
    group: &DocumentGroup,
) -> Result<usize> {
    if group.documents.is_empty() {
        return Ok(0);
    }

    let embeddings = embedder.embed(&group.documents)?;
    let ids: Vec<String> = group
        .documents
        .iter()
        .map(|_| Uuid::new_v4().to_string())
        .collect();

    let collection =
        store.create_or_get_collection(&group.name, embedder.dimension())?;
    collection.add(&ids, &group.documents, &embeddings, None)?;

    info!(
        collection = %group.name,
        documents = group.documents.len(),
        "ingested document group"
    );
    Ok(group.documents.len())
}

/// Ingest every group, isolating failures.
///
/// A group that fails to embed or store is recorded in the outcome and
/// logged; it does not abort the remaining groups, and groups ingested
/// before it stay in the store.
pub fn ingest_groups(
    embedder: &dyn Embedder,
    store: &VectorStore,
    groups: &[DocumentGroup],
) -> IngestOutcome {
    let mut outcome = IngestOutcome::default();

    for group in groups {
        match ingest_group(embedder, store, group) {
            Ok(0) => {}
            Ok(documents) => outcome.reports.push(IngestReport {
                collection: group.name.clone(),
                documents,
            }),
            Err(error) => {
                warn!(
                    collection = %group.name,
                    %error,
                    "skipping document group"
                );
                outcome.failures.push(IngestFailure {
                    collection: group.name.clone(),
                    error,
                });
            }
        }
    }

    outcome
}
