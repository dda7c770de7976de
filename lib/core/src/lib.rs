//! # tastevec Core
//!
//! Core library for the tastevec recipe retrieval engine.
//!
//! This crate provides the fundamental data structures and algorithms:
//!
//! - [`Vector`] - Dense vector with cosine similarity
//! - [`TextEmbedder`] - Deterministic hashed bag-of-tokens embedding
//! - [`Recipe`] / [`UserProfile`] - The immutable data model
//! - [`MetadataFilter`] - Typed metadata predicates, combined by conjunction
//! - [`RecipeIndex`] - In-memory index with filtered similarity search
//!
//! ## Example
//!
//! ```rust
//! use tastevec_core::{IndexConfig, IngredientEntry, Recipe, RecipeIndex, TextEmbedder};
//!
//! let embedder = TextEmbedder::new(64);
//! let index = RecipeIndex::new(IndexConfig { name: "recipes".to_string(), dim: 64 });
//!
//! let recipe = Recipe {
//!     id: "lentil-soup".to_string(),
//!     title: "Lentil Soup".to_string(),
//!     ingredients: vec![IngredientEntry::new("lentils", 200.0, "g")],
//!     instructions: vec![],
//!     nutrition: Default::default(),
//!     dietary_tags: vec!["vegan".to_string()],
//!     health_benefits: vec![],
//!     cuisine: "mediterranean".to_string(),
//! };
//!
//! let vector = embedder.embed(&recipe.embedding_text());
//! index.upsert(recipe.id.clone(), vector, recipe).unwrap();
//!
//! let results = index.search(&embedder.embed("lentil soup"), 10, None).unwrap();
//! assert_eq!(results[0].0, "lentil-soup");
//! ```

pub mod embed;
pub mod error;
pub mod filter;
pub mod index;
pub mod recipe;
pub mod vector;

pub use embed::{TextEmbedder, DEFAULT_DIM};
pub use error::{Error, Result};
pub use filter::{Condition, MetadataFilter};
pub use index::{IndexConfig, IndexEntry, RecipeIndex};
pub use recipe::{
    IngredientEntry, Nutrient, NutrientGoal, NutrientProfile, Recipe, UserProfile,
};
pub use vector::Vector;
