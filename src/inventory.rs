use crate::{error::Result, store::VectorStore};

/// Read-only stats for one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: String,
    pub documents: usize,
    /// Character count of the longest stored document, 0 when empty.
    pub max_document_chars: usize,
}

/// Summarize every collection in the store, in lexicographic name order.
pub fn summarize(store: &VectorStore) -> Result<Vec<CollectionSummary>> {
    store
        .list_collections()?
        .into_iter()
        .map(|name| {
            let collection = store.collection(&name)?;
            let entries = collection.get_all()?;
            let max_document_chars = entries
                .iter()
                .map(|(_, document)| document.chars().count())
                .max()
                .unwrap_or(0);

            Ok(CollectionSummary {
                name,
                documents: entries.len(),
                max_document_chars,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, VectorStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = VectorStore::open(&tmp.path().join("store.redb")).unwrap();
        (tmp, store)
    }

    #[test]
    fn reports_counts_and_longest_document() {
        let (_tmp, store) = test_store();
        let collection = store.create_or_get_collection("notes", 2).unwrap();
        collection
            .add(
                &["a".to_string(), "b".to_string()],
                &["short".to_string(), "a longer document".to_string()],
                &[vec![1.0, 0.0], vec![0.0, 1.0]],
                None,
            )
            .unwrap();

        let summaries = summarize(&store).unwrap();
        assert_eq!(
            summaries,
            vec![CollectionSummary {
                name: "notes".to_string(),
                documents: 2,
                max_document_chars: "a longer document".len(),
            }]
        );
    }

    #[test]
    fn empty_collection_reports_zero() {
        let (_tmp, store) = test_store();
        store.create_or_get_collection("empty", 2).unwrap();

        let summaries = summarize(&store).unwrap();
        assert_eq!(summaries[0].documents, 0);
        assert_eq!(summaries[0].max_document_chars, 0);
    }

    #[test]
    fn empty_store_reports_nothing() {
        let (_tmp, store) = test_store();
        assert!(summarize(&store).unwrap().is_empty());
    }

    #[test]
    fn summaries_follow_collection_order() {
        let (_tmp, store) = test_store();
        store.create_or_get_collection("zebra", 2).unwrap();
        store.create_or_get_collection("apple", 2).unwrap();

        let names: Vec<_> = summarize(&store)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["apple", "zebra"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let (_tmp, store) = test_store();
        let collection = store.create_or_get_collection("notes", 2).unwrap();
        collection
            .add(
                &["a".to_string()],
                &["héllo".to_string()],
                &[vec![1.0, 0.0]],
                None,
            )
            .unwrap();

        let summaries = summarize(&store).unwrap();
        assert_eq!(summaries[0].max_document_chars, 5);
    }
}
