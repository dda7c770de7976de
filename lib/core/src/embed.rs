//! Deterministic text embedding
//!
//! Hashed bag-of-tokens embedding: no trained model, no network, identical
//! input always produces an identical vector. Retrieval quality comes from
//! token overlap, which is enough at the target scale; swapping in a learned
//! model is an extension point, not a default.

use crate::vector::Vector;
use std::hash::{BuildHasher, Hash, Hasher};

/// Default embedding dimensionality shared with the index
pub const DEFAULT_DIM: usize = 384;

/// Fixed seeds so the hash is reproducible across process restarts
const HASH_SEEDS: (u64, u64, u64, u64) = (
    0x5157_4f52_4b5f_5631,
    0x7461_7374_6576_6563,
    0x656d_6265_645f_7631,
    0x0000_0000_0000_2a2a,
);

/// Tokens too common to carry retrieval signal
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in",
    "is", "it", "of", "on", "or", "that", "the", "this", "to", "with",
];

/// Deterministic hashed bag-of-tokens embedder
#[derive(Debug, Clone)]
pub struct TextEmbedder {
    dim: usize,
    strip_stopwords: bool,
}

impl TextEmbedder {
    #[must_use]
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            strip_stopwords: true,
        }
    }

    #[must_use]
    pub fn with_stopwords(mut self, strip: bool) -> Self {
        self.strip_stopwords = strip;
        self
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed a text into a fixed-length vector.
    ///
    /// Each token contributes +1 or -1 to one of `dim` buckets; the sign is
    /// derived from the token hash so unrelated texts do not collapse into a
    /// positive-only region. The result is L2-normalized unless it is the
    /// zero vector (empty or stopword-only text), which is returned as-is.
    #[must_use]
    pub fn embed(&self, text: &str) -> Vector {
        let mut buckets = vec![0.0f32; self.dim];

        for token in self.tokenize(text) {
            let hash = token_hash(&token);
            let pos = (hash as usize) % self.dim;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            buckets[pos] += sign;
        }

        let mut vector = Vector::new(buckets);
        if !vector.is_zero() {
            vector.normalize();
        }
        vector
    }

    /// Embed a batch of texts, preserving order.
    ///
    /// Equivalent to mapping [`TextEmbedder::embed`] over the input.
    #[must_use]
    pub fn embed_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<Vector> {
        texts.iter().map(|t| self.embed(t.as_ref())).collect()
    }

    /// Tokenize on whitespace/punctuation, lowercase, drop one-char tokens
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| s.len() > 1)
            .filter(|s| !self.strip_stopwords || !STOPWORDS.contains(s))
            .map(str::to_owned)
            .collect()
    }
}

impl Default for TextEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIM)
    }
}

fn token_hash(token: &str) -> u64 {
    let state = ahash::RandomState::with_seeds(
        HASH_SEEDS.0,
        HASH_SEEDS.1,
        HASH_SEEDS.2,
        HASH_SEEDS.3,
    );
    let mut hasher = state.build_hasher();
    token.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_deterministic() {
        let embedder = TextEmbedder::new(64);
        let v1 = embedder.embed("high protein vegan lunch");
        let v2 = embedder.embed("high protein vegan lunch");
        assert_eq!(v1.as_slice(), v2.as_slice());
    }

    #[test]
    fn test_embed_dimension_and_norm() {
        let embedder = TextEmbedder::new(128);
        let v = embedder.embed("lentil soup with garlic");
        assert_eq!(v.dim(), 128);
        assert!((v.norm() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = TextEmbedder::new(32);
        assert!(embedder.embed("").is_zero());
        // Stopword-only text also embeds to zero
        assert!(embedder.embed("the and of").is_zero());
        // Zero vector is returned unchanged, not normalized
        assert_eq!(embedder.embed("").as_slice(), &[0.0; 32]);
    }

    #[test]
    fn test_batch_equals_mapped_embed() {
        let embedder = TextEmbedder::new(96);
        let texts = ["lentil soup", "chicken salad", "peanut noodles"];
        let batch = embedder.embed_batch(&texts);
        assert_eq!(batch.len(), 3);
        for (text, vector) in texts.iter().zip(&batch) {
            assert_eq!(embedder.embed(text).as_slice(), vector.as_slice());
        }
    }

    #[test]
    fn test_related_texts_more_similar() {
        let embedder = TextEmbedder::default();
        let soup_a = embedder.embed("lentil soup with carrots and cumin");
        let soup_b = embedder.embed("hearty lentil soup with cumin");
        let phone = embedder.embed("smartphone with oled display");

        assert!(soup_a.cosine_similarity(&soup_b) > soup_a.cosine_similarity(&phone));
    }

    #[test]
    fn test_signed_buckets_present() {
        // With enough tokens both signs should show up
        let embedder = TextEmbedder::new(16).with_stopwords(false);
        let v = embedder.embed(
            "apples oranges bananas grapes lemons limes cherries mangoes peaches plums",
        );
        let has_pos = v.as_slice().iter().any(|x| *x > 0.0);
        let has_neg = v.as_slice().iter().any(|x| *x < 0.0);
        assert!(has_pos && has_neg);
    }
}
