use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Registry of collection names to their embedding dimension.
const COLLECTIONS: TableDefinition<&str, u32> =
    TableDefinition::new("collections");

/// Optional per-document key-value metadata.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A nearest-neighbor match returned by [`Collection::query`].
#[derive(Debug, Clone)]
pub struct Match {
    pub id: String,
    pub document: String,
    pub metadata: Option<Metadata>,
    /// Cosine distance to the query embedding; smaller is more similar.
    pub distance: f32,
}

/// On-disk document record: the text plus optional metadata. Embeddings
/// live in a separate table as raw f32 bytes so queries can scan them
/// without deserializing document bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRecord {
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Metadata>,
}

/// Persistent store of named collections of embedded documents.
///
/// Each collection is a pair of redb tables (`docs/<name>`,
/// `embeddings/<name>`) keyed by document id, plus a registry entry
/// recording the collection's embedding dimension. All embeddings within
/// a collection share that dimension; writes and queries with a different
/// width are rejected instead of silently corrupting distances.
pub struct VectorStore {
    db: Database,
}

impl VectorStore {
    /// Open or create a vector store at the given path.
    ///
    /// # Examples
    ///
    /// ```
    /// # let tmp = tempfile::tempdir().unwrap();
    /// use semdex::VectorStore;
    ///
    /// let store = VectorStore::open(&tmp.path().join("store.redb")).unwrap();
    /// assert!(store.list_collections().unwrap().is_empty());
    /// ```
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        txn.open_table(COLLECTIONS)?;
        txn.commit()?;

        Ok(Self { db })
    }

    /// Open a collection, registering it with the given embedding
    /// dimension if it does not exist yet.
    ///
    /// Fails with a dimension mismatch if the collection already exists
    /// with a different dimension.
    pub fn create_or_get_collection(
        &self,
        name: &str,
        dimension: usize,
    ) -> Result<Collection<'_>> {
        if name.is_empty() {
            return Err(Error::Config(
                "collection name must not be empty".into(),
            ));
        }
        if dimension == 0 {
            return Err(Error::Config(
                "embedding dimension must be positive".into(),
            ));
        }

        if let Some(existing) = self.dimension_of(name)? {
            if existing != dimension {
                return Err(Error::DimensionMismatch {
                    collection: name.to_string(),
                    expected: existing,
                    actual: dimension,
                });
            }
            return Ok(Collection {
                store: self,
                name: name.to_string(),
                dimension,
            });
        }

        let txn = self.db.begin_write()?;
        {
            let mut registry = txn.open_table(COLLECTIONS)?;
            registry.insert(name, dimension as u32)?;

            // Create both per-collection tables up front so an empty
            // collection is still queryable.
            let docs_name = docs_table_name(name);
            let docs_def: TableDefinition<&str, &[u8]> =
                TableDefinition::new(&docs_name);
            txn.open_table(docs_def)?;

            let emb_name = embeddings_table_name(name);
            let emb_def: TableDefinition<&str, &[u8]> =
                TableDefinition::new(&emb_name);
            txn.open_table(emb_def)?;
        }
        txn.commit()?;

        Ok(Collection {
            store: self,
            name: name.to_string(),
            dimension,
        })
    }

    /// Open an existing collection by name.
    pub fn collection(&self, name: &str) -> Result<Collection<'_>> {
        match self.dimension_of(name)? {
            Some(dimension) => Ok(Collection {
                store: self,
                name: name.to_string(),
                dimension,
            }),
            None => Err(Error::NotFound {
                kind: "collection",
                name: name.to_string(),
            }),
        }
    }

    /// List all collection names in lexicographic order.
    pub fn list_collections(&self) -> Result<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COLLECTIONS)?;
        let mut result = Vec::new();
        for entry in table.iter()? {
            let (k, _) = entry?;
            result.push(k.value().to_string());
        }
        Ok(result)
    }

    fn dimension_of(&self, name: &str) -> Result<Option<usize>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(COLLECTIONS)?;
        Ok(table.get(name)?.map(|v| v.value() as usize))
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore").finish_non_exhaustive()
    }
}

/// Handle to one named collection inside a [`VectorStore`].
#[derive(Debug)]
pub struct Collection<'a> {
    store: &'a VectorStore,
    name: String,
    dimension: usize,
}

impl Collection<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Append documents to the collection in a single transaction.
    ///
    /// All slices must have matching lengths, and every embedding must
    /// match the collection's dimension. Existing ids are overwritten,
    /// but callers are expected to supply fresh ids (ingestion is
    /// append-only).
    pub fn add(
        &self,
        ids: &[String],
        documents: &[String],
        embeddings: &[Vec<f32>],
        metadatas: Option<&[Option<Metadata>]>,
    ) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != embeddings.len() {
            return Err(Error::Config(format!(
                "mismatched lengths: {} ids, {} documents, {} embeddings",
                ids.len(),
                documents.len(),
                embeddings.len()
            )));
        }
        if let Some(metadatas) = metadatas
            && metadatas.len() != ids.len()
        {
            return Err(Error::Config(format!(
                "mismatched lengths: {} ids, {} metadatas",
                ids.len(),
                metadatas.len()
            )));
        }
        for embedding in embeddings {
            if embedding.len() != self.dimension {
                return Err(Error::DimensionMismatch {
                    collection: self.name.clone(),
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let txn = self.store.db.begin_write()?;
        {
            let docs_name = docs_table_name(&self.name);
            let docs_def: TableDefinition<&str, &[u8]> =
                TableDefinition::new(&docs_name);
            let mut docs = txn.open_table(docs_def)?;

            let emb_name = embeddings_table_name(&self.name);
            let emb_def: TableDefinition<&str, &[u8]> =
                TableDefinition::new(&emb_name);
            let mut embs = txn.open_table(emb_def)?;

            for (i, id) in ids.iter().enumerate() {
                let record = StoredRecord {
                    text: documents[i].clone(),
                    metadata: metadatas.and_then(|m| m[i].clone()),
                };
                let bytes = serde_json::to_vec(&record)?;
                docs.insert(id.as_str(), bytes.as_slice())?;
                embs.insert(
                    id.as_str(),
                    bytemuck::cast_slice::<f32, u8>(&embeddings[i]),
                )?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Return the `k` stored documents nearest to the query embedding,
    /// ordered by ascending cosine distance. Returns fewer than `k`
    /// matches when the collection is smaller, and an empty list for an
    /// empty collection.
    ///
    /// Ties are broken by document id, so results are reproducible.
    pub fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<Match>> {
        if embedding.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                collection: self.name.clone(),
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        let txn = self.store.db.begin_read()?;

        let emb_name = embeddings_table_name(&self.name);
        let emb_def: TableDefinition<&str, &[u8]> =
            TableDefinition::new(&emb_name);
        let embs = txn.open_table(emb_def)?;

        let mut scored: Vec<(String, f32)> = Vec::new();
        for entry in embs.iter()? {
            let (id, bytes) = entry?;
            let stored = decode_embedding(bytes.value());
            scored.push((
                id.value().to_string(),
                cosine_distance(embedding, &stored),
            ));
        }

        // Stable sort keeps the id order for equal distances.
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        let docs_name = docs_table_name(&self.name);
        let docs_def: TableDefinition<&str, &[u8]> =
            TableDefinition::new(&docs_name);
        let docs = txn.open_table(docs_def)?;

        let mut matches = Vec::with_capacity(scored.len());
        for (id, distance) in scored {
            let Some(guard) = docs.get(id.as_str())? else {
                continue;
            };
            let record: StoredRecord = serde_json::from_slice(guard.value())?;
            matches.push(Match {
                id,
                document: record.text,
                metadata: record.metadata,
                distance,
            });
        }
        Ok(matches)
    }

    /// All `(id, document)` pairs in id order.
    pub fn get_all(&self) -> Result<Vec<(String, String)>> {
        self.get(None)
    }

    /// The first `limit` `(id, document)` pairs in id order.
    pub fn get_limited(&self, limit: usize) -> Result<Vec<(String, String)>> {
        self.get(Some(limit))
    }

    fn get(&self, limit: Option<usize>) -> Result<Vec<(String, String)>> {
        let txn = self.store.db.begin_read()?;
        let docs_name = docs_table_name(&self.name);
        let docs_def: TableDefinition<&str, &[u8]> =
            TableDefinition::new(&docs_name);
        let docs = txn.open_table(docs_def)?;

        let mut result = Vec::new();
        for entry in docs.iter()? {
            if let Some(limit) = limit
                && result.len() >= limit
            {
                break;
            }
            let (id, bytes) = entry?;
            let record: StoredRecord = serde_json::from_slice(bytes.value())?;
            result.push((id.value().to_string(), record.text));
        }
        Ok(result)
    }

    /// Number of documents stored in the collection.
    pub fn count(&self) -> Result<usize> {
        let txn = self.store.db.begin_read()?;
        let docs_name = docs_table_name(&self.name);
        let docs_def: TableDefinition<&str, &[u8]> =
            TableDefinition::new(&docs_name);
        let docs = txn.open_table(docs_def)?;

        let mut count = 0;
        for entry in docs.iter()? {
            entry?;
            count += 1;
        }
        Ok(count)
    }
}

fn docs_table_name(collection: &str) -> String {
    format!("docs/{collection}")
}

fn embeddings_table_name(collection: &str) -> String {
    format!("embeddings/{collection}")
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Cosine distance in [0, 2]. Zero-norm vectors compare as maximally
/// dissimilar to everything (distance 1, similarity 0).
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}
