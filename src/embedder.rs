use std::hash::Hasher;

use lazy_static::lazy_static;
use regex::Regex;
use rustc_hash::{FxHashSet, FxHasher};
use unicode_normalization::UnicodeNormalization;

use crate::error::{Error, Result};

/// Embedding width of the default model.
pub const DEFAULT_DIMENSION: usize = 384;

/// Maps text to fixed-length vectors.
///
/// Documents and queries must go through the same embedder so they live in
/// the same embedding space; mixing models produces meaningless distances.
/// A length-1 input is valid and is how queries are embedded.
pub trait Embedder {
    /// The fixed length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").unwrap();
    static ref STOP_WORDS: FxHashSet<&'static str> = {
        let words = vec![
            "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
            "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
            "to", "was", "were", "will", "with",
        ];
        words.into_iter().collect()
    };
}

/// Deterministic feature-hashing embedder.
///
/// Tokens are unicode-normalized, lowercased, stripped of punctuation, and
/// stop-word filtered, then hashed into a fixed number of buckets. The
/// resulting term-count vector is L2-normalized, so cosine distances over
/// these vectors stay in [0, 2] and `1 - distance` is a usable similarity.
///
/// The same text always produces the same vector; there is no model state
/// to load and no fitting step.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn tokenize(text: &str) -> Vec<String> {
        let text = text.nfc().collect::<String>().to_lowercase();
        let text = NON_WORD.replace_all(&text, " ");

        text.split_whitespace()
            .filter(|token| !STOP_WORDS.contains(token))
            .map(|token| token.to_string())
            .collect()
    }

    fn bucket(&self, token: &str) -> usize {
        let mut hasher = FxHasher::default();
        hasher.write(token.as_bytes());
        (hasher.finish() % self.dimension as u64) as usize
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in Self::tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

impl Embedder for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Err(Error::EmptyInput("no texts to embed"));
        }
        if texts.iter().all(|text| text.trim().is_empty()) {
            return Err(Error::EmptyInput("all texts are empty"));
        }

        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn deterministic_across_calls() {
        let embedder = HashEmbedder::default();
        let a = embedder
            .embed(&["the quick brown fox".to_string()])
            .unwrap();
        let b = embedder
            .embed(&["the quick brown fox".to_string()])
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn vectors_have_fixed_dimension() {
        let embedder = HashEmbedder::new(64);
        let vectors = embedder
            .embed(&["hello".to_string(), "world".to_string()])
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 64));
    }

    #[test]
    fn vectors_are_unit_length() {
        let embedder = HashEmbedder::default();
        let vectors = embedder
            .embed(&["boil water cook pasta sauce".to_string()])
            .unwrap();
        let norm = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn output_order_matches_input_order() {
        let embedder = HashEmbedder::default();
        let texts =
            vec!["gardening plants".to_string(), "machine learning".to_string()];
        let batch = embedder.embed(&texts).unwrap();
        let first = embedder.embed(&texts[..1]).unwrap();
        let second = embedder.embed(&texts[1..]).unwrap();
        assert_eq!(batch[0], first[0]);
        assert_eq!(batch[1], second[0]);
    }

    #[test]
    fn shared_terms_score_higher() {
        let embedder = HashEmbedder::default();
        let vectors = embedder
            .embed(&[
                "hello world".to_string(),
                "goodbye".to_string(),
                "hello".to_string(),
            ])
            .unwrap();
        let query = &vectors[2];
        assert!(dot(query, &vectors[0]) > dot(query, &vectors[1]));
    }

    #[test]
    fn punctuation_and_case_do_not_matter() {
        let embedder = HashEmbedder::default();
        let vectors = embedder
            .embed(&["Hello, World!".to_string(), "hello world".to_string()])
            .unwrap();
        assert_eq!(vectors[0], vectors[1]);
    }

    #[test]
    fn empty_batch_is_rejected() {
        let embedder = HashEmbedder::default();
        let result = embedder.embed(&[]);
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn all_blank_batch_is_rejected() {
        let embedder = HashEmbedder::default();
        let result = embedder.embed(&["   ".to_string(), "\n".to_string()]);
        assert!(matches!(result, Err(Error::EmptyInput(_))));
    }
}
