use crate::filter::MetadataFilter;
use crate::recipe::Recipe;
use crate::vector::Vector;
use crate::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a recipe index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    pub name: String,
    pub dim: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            dim: crate::embed::DEFAULT_DIM,
        }
    }
}

/// One indexed recipe: id, embedding, and the immutable metadata snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub id: String,
    pub vector: Vector,
    pub recipe: Recipe,
}

/// In-memory vector index over recipes
///
/// Readers (search/get/stats) run concurrently; upsert/delete/restore take
/// the write side of the lock. Search is a filtered linear scan, O(index
/// size), which fits the target scale of hundreds to low-thousands of
/// records.
pub struct RecipeIndex {
    config: IndexConfig,
    entries: RwLock<HashMap<String, IndexEntry>>,
}

impl RecipeIndex {
    #[must_use]
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.config.dim
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Insert or replace an entry
    pub fn upsert(&self, id: impl Into<String>, vector: Vector, recipe: Recipe) -> Result<()> {
        if vector.dim() != self.config.dim {
            return Err(Error::DimensionMismatch {
                expected: self.config.dim,
                actual: vector.dim(),
            });
        }

        let id = id.into();
        let entry = IndexEntry {
            id: id.clone(),
            vector,
            recipe,
        };
        self.entries.write().insert(id, entry);
        Ok(())
    }

    /// Get the metadata snapshot for an id
    pub fn get(&self, id: &str) -> Result<Recipe> {
        self.entries
            .read()
            .get(id)
            .map(|e| e.recipe.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Remove an entry by id
    pub fn delete(&self, id: &str) -> Result<()> {
        match self.entries.write().remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    /// Search for the `k` most similar entries passing the filter.
    ///
    /// The filter runs before any similarity is computed, so `k` bounds
    /// results only among entries that pass it. Results are ordered by
    /// descending cosine similarity, ties broken by ascending id. An empty
    /// index yields an empty list, not an error.
    pub fn search(
        &self,
        query: &Vector,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<(String, f32)>> {
        if query.dim() != self.config.dim {
            return Err(Error::DimensionMismatch {
                expected: self.config.dim,
                actual: query.dim(),
            });
        }

        let entries = self.entries.read();
        let mut scored: Vec<(String, f32)> = entries
            .values()
            .filter(|entry| filter.map_or(true, |f| f.matches(&entry.recipe)))
            .map(|entry| (entry.id.clone(), entry.vector.cosine_similarity(query)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Snapshot of all entries, for persistence and stats
    #[must_use]
    pub fn entries(&self) -> Vec<IndexEntry> {
        self.entries.read().values().cloned().collect()
    }

    /// Replace the full entry set, e.g. when loading a snapshot.
    ///
    /// Exclusive with in-flight searches; every entry must match the
    /// configured dimensionality.
    pub fn restore(&self, entries: Vec<IndexEntry>) -> Result<()> {
        for entry in &entries {
            if entry.vector.dim() != self.config.dim {
                return Err(Error::DimensionMismatch {
                    expected: self.config.dim,
                    actual: entry.vector.dim(),
                });
            }
        }

        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            map.insert(entry.id.clone(), entry);
        }
        *self.entries.write() = map;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Condition;
    use crate::recipe::IngredientEntry;

    fn recipe(id: &str, tags: &[&str]) -> Recipe {
        Recipe {
            id: id.into(),
            title: format!("Recipe {id}"),
            ingredients: vec![IngredientEntry::new("water", 1.0, "cup")],
            instructions: vec![],
            nutrition: Default::default(),
            dietary_tags: tags.iter().map(|t| t.to_string()).collect(),
            health_benefits: vec![],
            cuisine: String::new(),
        }
    }

    fn index(dim: usize) -> RecipeIndex {
        RecipeIndex::new(IndexConfig {
            name: "test".into(),
            dim,
        })
    }

    #[test]
    fn test_upsert_and_get() {
        let idx = index(3);
        idx.upsert("r1", Vector::new(vec![1.0, 0.0, 0.0]), recipe("r1", &[]))
            .unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get("r1").unwrap().id, "r1");
    }

    #[test]
    fn test_dimension_mismatch() {
        let idx = index(3);
        let err = idx
            .upsert("r1", Vector::new(vec![1.0, 0.0]), recipe("r1", &[]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));

        let err = idx.search(&Vector::new(vec![1.0]), 5, None).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_get_delete_unknown_id() {
        let idx = index(2);
        assert!(matches!(idx.get("nope"), Err(Error::NotFound(_))));
        assert!(matches!(idx.delete("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_search_ordering_and_ties() {
        let idx = index(2);
        // b and c share an identical vector; ties resolve by ascending id
        idx.upsert("c", Vector::new(vec![1.0, 0.0]), recipe("c", &[]))
            .unwrap();
        idx.upsert("b", Vector::new(vec![1.0, 0.0]), recipe("b", &[]))
            .unwrap();
        idx.upsert("a", Vector::new(vec![0.0, 1.0]), recipe("a", &[]))
            .unwrap();

        let results = idx.search(&Vector::new(vec![1.0, 0.0]), 10, None).unwrap();
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        // Scores are non-increasing
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_filter_bounds_k_among_passing_entries() {
        let idx = index(2);
        idx.upsert("v1", Vector::new(vec![1.0, 0.0]), recipe("v1", &["vegan"]))
            .unwrap();
        idx.upsert("v2", Vector::new(vec![0.9, 0.1]), recipe("v2", &["vegan"]))
            .unwrap();
        idx.upsert("m1", Vector::new(vec![1.0, 0.0]), recipe("m1", &[]))
            .unwrap();

        let filter = MetadataFilter::new().with(Condition::TagPresent("vegan".into()));
        let results = idx
            .search(&Vector::new(vec![1.0, 0.0]), 2, Some(&filter))
            .unwrap();
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        // m1 never competes for the k slots
        assert_eq!(ids, vec!["v1", "v2"]);
    }

    #[test]
    fn test_empty_index_returns_empty() {
        let idx = index(2);
        let results = idx.search(&Vector::new(vec![1.0, 0.0]), 5, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_restore_round_trip() {
        let idx = index(2);
        idx.upsert("a", Vector::new(vec![1.0, 0.0]), recipe("a", &[]))
            .unwrap();
        idx.upsert("b", Vector::new(vec![0.0, 1.0]), recipe("b", &[]))
            .unwrap();

        let probe = Vector::new(vec![0.7, 0.3]);
        let before = idx.search(&probe, 10, None).unwrap();

        let other = index(2);
        other.restore(idx.entries()).unwrap();
        let after = other.search(&probe, 10, None).unwrap();
        assert_eq!(before, after);
    }
}
