//! # tastevec
//!
//! An in-memory recipe retrieval engine with dietary compatibility scoring
//! and ingredient substitution.
//!
//! tastevec embeds free-text queries with a deterministic feature hash,
//! retrieves candidates from an in-memory cosine-similarity index, scores
//! each against the user's dietary/health profile, and re-ranks by a blended
//! key. Recipes that violate an allergy or restriction are excluded outright;
//! soft concerns surface as warnings with machine-readable reason codes.
//!
//! ## Quick Start
//!
//! ```rust
//! use tastevec::prelude::*;
//!
//! let engine = RecipeEngine::new(EngineConfig::default());
//!
//! engine.index_recipe(Recipe {
//!     id: "lentil-soup".to_string(),
//!     title: "Lentil Soup".to_string(),
//!     ingredients: vec![IngredientEntry::new("lentils", 200.0, "g")],
//!     instructions: vec!["Simmer until tender".to_string()],
//!     nutrition: Default::default(),
//!     dietary_tags: vec!["vegan".to_string(), "gluten_free".to_string()],
//!     health_benefits: vec![],
//!     cuisine: "mediterranean".to_string(),
//! }).unwrap();
//!
//! let profile = UserProfile {
//!     restrictions: vec!["vegan".to_string()],
//!     allergies: vec!["peanut".to_string()],
//!     ..Default::default()
//! };
//!
//! let results = engine.query("hearty lentil soup", &profile, 5).unwrap();
//! assert_eq!(results[0].recipe.id, "lentil-soup");
//! ```
//!
//! ## Crate Structure
//!
//! - [`tastevec_core`] - Embedder, vector index, data model, typed filters
//! - [`tastevec_diet`] - Rule tables, compatibility scorer, substitution resolver
//! - [`tastevec_storage`] - Atomic bincode snapshots

pub mod engine;

// Re-export core types
pub use tastevec_core::{
    Condition, Error, IndexConfig, IndexEntry, IngredientEntry, MetadataFilter, Nutrient,
    NutrientGoal, NutrientProfile, Recipe, RecipeIndex, Result, TextEmbedder, UserProfile, Vector,
    DEFAULT_DIM,
};

// Re-export dietary intelligence
pub use tastevec_diet::{
    CompatibilityResult, CompatibilityScorer, NutrientDelta, NutrientDirection, ReasonCode,
    RuleSet, SubstitutionCandidate, SubstitutionConstraints, SubstitutionResolver,
};

// Re-export storage
pub use tastevec_storage::{load_index, save_index, IndexSnapshot};

pub use engine::{
    EngineConfig, EngineStats, RecipeEngine, RecipeResult, RestrictionCoverage,
    COMPATIBILITY_WEIGHT, SIMILARITY_WEIGHT,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CompatibilityResult, Condition, EngineConfig, EngineStats, Error, IngredientEntry,
        MetadataFilter, Nutrient, NutrientGoal, NutrientProfile, Recipe, RecipeEngine,
        RecipeResult, Result, RuleSet, SubstitutionCandidate, SubstitutionConstraints,
        TextEmbedder, UserProfile,
    };
}
