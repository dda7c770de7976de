//! Retrieval orchestrator
//!
//! Composes the embedder, the vector index, the compatibility scorer, and the
//! substitution resolver into the engine's public surface: embed the query,
//! over-fetch candidates, score each for dietary fit, drop hard violations,
//! and re-rank by a blended key.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tastevec_core::{
    Error, IndexConfig, MetadataFilter, Recipe, RecipeIndex, Result, TextEmbedder, UserProfile,
    Vector, DEFAULT_DIM,
};
use tastevec_diet::{
    CompatibilityResult, CompatibilityScorer, RuleSet, SubstitutionCandidate,
    SubstitutionConstraints, SubstitutionResolver,
};
use tracing::{debug, info};

/// Weight of vector similarity in the combined rank key
pub const SIMILARITY_WEIGHT: f32 = 0.5;
/// Weight of the compatibility score in the combined rank key
pub const COMPATIBILITY_WEIGHT: f32 = 0.5;

/// Candidates fetched per requested result on the first pass
pub const DEFAULT_OVERFETCH_FACTOR: usize = 3;
/// Candidates fetched per requested result on the starvation re-fetch
pub const DEFAULT_REFETCH_FACTOR: usize = 10;

/// Configuration for a [`RecipeEngine`]
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub name: String,
    pub dim: usize,
    pub overfetch_factor: usize,
    pub refetch_factor: usize,
    pub similarity_weight: f32,
    pub compatibility_weight: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "recipes".to_string(),
            dim: DEFAULT_DIM,
            overfetch_factor: DEFAULT_OVERFETCH_FACTOR,
            refetch_factor: DEFAULT_REFETCH_FACTOR,
            similarity_weight: SIMILARITY_WEIGHT,
            compatibility_weight: COMPATIBILITY_WEIGHT,
        }
    }
}

/// One ranked answer from [`RecipeEngine::query`]
#[derive(Debug, Clone, Serialize)]
pub struct RecipeResult {
    pub recipe: Recipe,
    pub similarity: f32,
    pub compatibility: CompatibilityResult,
    pub combined_score: f32,
}

/// How many indexed recipes satisfy a restriction
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RestrictionCoverage {
    pub compatible: usize,
    pub total: usize,
}

/// Read-only introspection of the engine
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub record_count: usize,
    pub dimensionality: usize,
    pub restriction_coverage: BTreeMap<String, RestrictionCoverage>,
    pub unique_ingredients: usize,
    pub cuisines: usize,
}

/// The retrieval-and-compatibility engine
///
/// A single logical in-memory resource: reads run concurrently, mutations
/// (index/delete/load) take exclusive access through the index's lock. No
/// operation blocks on network or disk except the explicit save/load pair.
pub struct RecipeEngine {
    config: EngineConfig,
    embedder: TextEmbedder,
    index: RecipeIndex,
    rules: Arc<RuleSet>,
    scorer: CompatibilityScorer,
    resolver: SubstitutionResolver,
}

impl RecipeEngine {
    /// Create an empty engine with the built-in rule tables
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rules(config, Arc::new(RuleSet::builtin()))
    }

    /// Create an empty engine with caller-provided rule tables
    #[must_use]
    pub fn with_rules(config: EngineConfig, rules: Arc<RuleSet>) -> Self {
        let embedder = TextEmbedder::new(config.dim);
        let index = RecipeIndex::new(IndexConfig {
            name: config.name.clone(),
            dim: config.dim,
        });
        let scorer = CompatibilityScorer::new(rules.clone());
        let resolver = SubstitutionResolver::new(rules.clone());
        Self {
            config,
            embedder,
            index,
            rules,
            scorer,
            resolver,
        }
    }

    /// Wrap an already-populated index, e.g. one loaded from a snapshot
    pub fn with_index(config: EngineConfig, index: RecipeIndex) -> Result<Self> {
        if index.dim() != config.dim {
            return Err(Error::DimensionMismatch {
                expected: config.dim,
                actual: index.dim(),
            });
        }
        let mut engine = Self::new(config);
        engine.index = index;
        Ok(engine)
    }

    #[must_use]
    pub fn rules(&self) -> &Arc<RuleSet> {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Validate and index one normalized recipe record
    pub fn index_recipe(&self, recipe: Recipe) -> Result<()> {
        recipe.validate()?;
        let vector = self.embedder.embed(&recipe.embedding_text());
        self.index.upsert(recipe.id.clone(), vector, recipe)
    }

    /// Index a batch of records; fails on the first malformed one
    pub fn index_recipes(&self, recipes: Vec<Recipe>) -> Result<usize> {
        let count = recipes.len();
        for recipe in recipes {
            self.index_recipe(recipe)?;
        }
        info!(count, total = self.index.len(), "indexed recipes");
        Ok(count)
    }

    /// Remove one recipe from the index
    pub fn delete_recipe(&self, id: &str) -> Result<()> {
        self.index.delete(id)
    }

    /// Retrieve the `k` best recipes for a query text and profile.
    ///
    /// Retrieval applies no dietary filter: partial-conflict recipes must
    /// surface with warnings rather than being silently dropped, so filtering
    /// by violation happens after scoring. Candidates with any violation are
    /// excluded outright; if that starves the result below `k`, one re-fetch
    /// with the larger factor is attempted before returning a short set.
    pub fn query(&self, text: &str, profile: &UserProfile, k: usize) -> Result<Vec<RecipeResult>> {
        self.rules.validate_profile(profile)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedder.embed(text);
        let fetch = k.saturating_mul(self.config.overfetch_factor);
        let mut results = self.fetch_and_score(&query_vector, profile, fetch)?;

        if results.len() < k && self.index.len() > fetch {
            let refetch = k.saturating_mul(self.config.refetch_factor);
            debug!(found = results.len(), k, refetch, "result set starved, re-fetching");
            results = self.fetch_and_score(&query_vector, profile, refetch)?;
        }

        results.truncate(k);
        Ok(results)
    }

    /// Score one recipe against a profile without touching the index
    pub fn analyze(&self, recipe: &Recipe, profile: &UserProfile) -> Result<CompatibilityResult> {
        self.rules.validate_profile(profile)?;
        recipe.validate()?;
        Ok(self.scorer.score(recipe, profile))
    }

    /// Propose substitutions for an ingredient under the given constraints
    pub fn suggest(
        &self,
        ingredient: &str,
        constraints: &SubstitutionConstraints,
    ) -> Result<Vec<SubstitutionCandidate>> {
        self.rules
            .validate_codes(&constraints.restrictions, &constraints.allergies)?;
        Ok(self.resolver.suggest(ingredient, constraints))
    }

    /// List up to `k` indexed recipes passing a metadata filter, id order
    pub fn browse(&self, filter: &MetadataFilter, k: usize) -> Result<Vec<Recipe>> {
        let zero = Vector::zeros(self.config.dim);
        let ids = self.index.search(&zero, usize::MAX, Some(filter))?;
        let mut recipes = Vec::with_capacity(ids.len().min(k));
        for (id, _) in ids {
            // All similarities against the zero probe are equal, so the
            // id tie-break already ordered them
            if recipes.len() == k {
                break;
            }
            match self.index.get(&id) {
                Ok(recipe) => recipes.push(recipe),
                Err(Error::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(recipes)
    }

    /// Write the index to a snapshot file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        tastevec_storage::save_index(&self.index, path.as_ref())?;
        info!(records = self.index.len(), path = %path.as_ref().display(), "saved snapshot");
        Ok(())
    }

    /// Replace the index contents from a snapshot file.
    ///
    /// The snapshot's dimensionality must match the engine's; a mismatch is
    /// a configuration bug and is propagated unchanged.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let loaded = tastevec_storage::load_index(path.as_ref())?;
        if loaded.dim() != self.config.dim {
            return Err(Error::DimensionMismatch {
                expected: self.config.dim,
                actual: loaded.dim(),
            });
        }
        let entries = loaded.entries();
        let count = entries.len();
        self.index.restore(entries)?;
        info!(records = count, path = %path.as_ref().display(), "loaded snapshot");
        Ok(count)
    }

    /// Read-only stats; runs entirely on the read side of the lock
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        let entries = self.index.entries();
        let total = entries.len();

        let mut ingredients = HashSet::new();
        let mut cuisines = HashSet::new();
        for entry in &entries {
            for name in entry.recipe.ingredient_names() {
                ingredients.insert(name);
            }
            if !entry.recipe.cuisine.is_empty() {
                cuisines.insert(entry.recipe.cuisine.to_lowercase());
            }
        }

        let mut coverage = BTreeMap::new();
        for code in self.rules.restriction_codes() {
            let Some(rule) = self.rules.restriction(code) else {
                continue;
            };
            let compatible = entries
                .iter()
                .filter(|entry| {
                    rule.satisfied_by
                        .iter()
                        .any(|tag| entry.recipe.has_dietary_tag(tag))
                })
                .count();
            coverage.insert(code.to_string(), RestrictionCoverage { compatible, total });
        }

        EngineStats {
            record_count: total,
            dimensionality: self.config.dim,
            restriction_coverage: coverage,
            unique_ingredients: ingredients.len(),
            cuisines: cuisines.len(),
        }
    }

    /// Fetch, score, hard-drop, and order one candidate batch
    fn fetch_and_score(
        &self,
        query: &Vector,
        profile: &UserProfile,
        fetch: usize,
    ) -> Result<Vec<RecipeResult>> {
        let candidates = self.index.search(query, fetch, None)?;
        let mut results = Vec::with_capacity(candidates.len());

        for (id, similarity) in candidates {
            let recipe = match self.index.get(&id) {
                Ok(recipe) => recipe,
                // Deleted between search and get; a writer won the race
                Err(Error::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            let compatibility = self.scorer.score(&recipe, profile);
            if !compatibility.is_compatible() {
                continue;
            }
            let combined_score = self.config.similarity_weight * similarity
                + self.config.compatibility_weight * compatibility.score;
            results.push(RecipeResult {
                recipe,
                similarity,
                compatibility,
                combined_score,
            });
        }

        results.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.recipe.id.cmp(&b.recipe.id))
        });
        Ok(results)
    }
}
