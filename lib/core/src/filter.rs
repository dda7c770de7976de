// Typed metadata filter evaluated before ranking
use crate::recipe::{Nutrient, Recipe};
use serde::{Deserialize, Serialize};

/// A single predicate over recipe metadata
///
/// Closed set on purpose: filters stay type-safe and testable in isolation
/// instead of being arbitrary callbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Recipe carries the dietary tag
    TagPresent(String),
    /// Recipe does not carry the dietary tag
    TagAbsent(String),
    /// Some ingredient name contains the keyword (case-insensitive)
    IngredientContains(String),
    /// No ingredient name contains the keyword
    IngredientAbsent(String),
    /// Nutrient quantity falls inside the (optional) bounds, inclusive
    NutrientRange {
        nutrient: Nutrient,
        min: Option<f32>,
        max: Option<f32>,
    },
}

impl Condition {
    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        match self {
            Condition::TagPresent(tag) => recipe.has_dietary_tag(tag),
            Condition::TagAbsent(tag) => !recipe.has_dietary_tag(tag),
            Condition::IngredientContains(keyword) => {
                let keyword = keyword.to_lowercase();
                recipe
                    .ingredient_names()
                    .iter()
                    .any(|name| name.contains(&keyword))
            }
            Condition::IngredientAbsent(keyword) => {
                let keyword = keyword.to_lowercase();
                !recipe
                    .ingredient_names()
                    .iter()
                    .any(|name| name.contains(&keyword))
            }
            Condition::NutrientRange { nutrient, min, max } => {
                let value = recipe.nutrition.get(*nutrient);
                min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
            }
        }
    }
}

/// Conjunction of conditions; the empty filter matches everything
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    conditions: Vec<Condition>,
}

impl MetadataFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    #[must_use]
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.conditions.iter().all(|c| c.matches(recipe))
    }
}
