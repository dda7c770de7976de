//! Recipe and user-profile data model
//!
//! Records are normalized by the ingestion collaborator before they reach the
//! core; validation here is the construction boundary, so the scorer and
//! resolver can treat their inputs as well-formed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of tracked nutrients, per serving
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Calories,
    Protein,
    Carbohydrates,
    Fat,
    Fiber,
    Sodium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 6] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbohydrates,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sodium,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbohydrates => "carbohydrates",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sodium => "sodium",
        }
    }
}

impl std::fmt::Display for Nutrient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Nutrient {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "calories" => Ok(Nutrient::Calories),
            "protein" => Ok(Nutrient::Protein),
            "carbohydrates" | "carbs" => Ok(Nutrient::Carbohydrates),
            "fat" => Ok(Nutrient::Fat),
            "fiber" => Ok(Nutrient::Fiber),
            "sodium" => Ok(Nutrient::Sodium),
            other => Err(Error::MalformedProfile(format!(
                "unknown nutrient '{other}'"
            ))),
        }
    }
}

/// Per-serving nutrient quantities, all non-negative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientProfile {
    #[serde(default)]
    pub calories: f32,
    #[serde(default)]
    pub protein: f32,
    #[serde(default)]
    pub carbohydrates: f32,
    #[serde(default)]
    pub fat: f32,
    #[serde(default)]
    pub fiber: f32,
    #[serde(default)]
    pub sodium: f32,
}

impl NutrientProfile {
    #[must_use]
    pub fn get(&self, nutrient: Nutrient) -> f32 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbohydrates => self.carbohydrates,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sodium => self.sodium,
        }
    }

    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        Nutrient::ALL.iter().all(|n| self.get(*n) >= 0.0)
    }
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    pub name: String,
    #[serde(default)]
    pub quantity: f32,
    #[serde(default)]
    pub unit: String,
}

impl IngredientEntry {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: f32, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

/// An immutable recipe record
///
/// Created at ingestion time from normalized source data, never mutated after
/// indexing, removed only by delete/reindex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub ingredients: Vec<IngredientEntry>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub nutrition: NutrientProfile,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub health_benefits: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
}

impl Recipe {
    /// Check the construction-boundary invariants.
    ///
    /// Every recipe has an id, a title, at least one ingredient, and a
    /// non-negative nutrient profile.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::MalformedRecipe("empty recipe id".into()));
        }
        if self.title.trim().is_empty() {
            return Err(Error::MalformedRecipe(format!(
                "recipe '{}' has an empty title",
                self.id
            )));
        }
        if self.ingredients.is_empty() {
            return Err(Error::MalformedRecipe(format!(
                "recipe '{}' has no ingredients",
                self.id
            )));
        }
        if !self.nutrition.is_non_negative() {
            return Err(Error::MalformedRecipe(format!(
                "recipe '{}' has a negative nutrient quantity",
                self.id
            )));
        }
        Ok(())
    }

    /// Lowercased ingredient names, in recipe order
    #[must_use]
    pub fn ingredient_names(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(|i| i.name.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn has_dietary_tag(&self, tag: &str) -> bool {
        self.dietary_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    #[must_use]
    pub fn has_health_benefit(&self, benefit: &str) -> bool {
        self.health_benefits
            .iter()
            .any(|b| b.eq_ignore_ascii_case(benefit))
    }

    /// Flat text rendition of the record for embedding
    ///
    /// Mirrors the field order the index was built with so query-side and
    /// ingest-side vocabularies line up.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        let ingredients = self
            .ingredients
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{} {} {} {} {} {}",
            self.title,
            self.cuisine,
            self.dietary_tags.join(" "),
            self.health_benefits.join(" "),
            ingredients,
            self.instructions.join(" "),
        )
    }
}

/// Target and tolerance band for a per-nutrient daily goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientGoal {
    pub target: f32,
    #[serde(default)]
    pub tolerance: f32,
}

/// A user's dietary/health profile, supplied per request
///
/// The core does not persist profiles. Codes are validated against the rule
/// tables at the boundary; unrecognized codes are rejected, never ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub goals: BTreeMap<Nutrient, NutrientGoal>,
}

impl UserProfile {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
            && self.allergies.is_empty()
            && self.conditions.is_empty()
            && self.goals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: "r1".into(),
            title: "Lentil Soup".into(),
            ingredients: vec![
                IngredientEntry::new("lentils", 200.0, "g"),
                IngredientEntry::new("carrot", 1.0, "piece"),
            ],
            instructions: vec!["Simmer until tender".into()],
            nutrition: NutrientProfile {
                calories: 320.0,
                protein: 18.0,
                carbohydrates: 40.0,
                fat: 6.0,
                fiber: 12.0,
                sodium: 380.0,
            },
            dietary_tags: vec!["vegan".into(), "gluten_free".into()],
            health_benefits: vec!["heart_healthy".into()],
            cuisine: "mediterranean".into(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_recipe().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_ingredients() {
        let mut recipe = sample_recipe();
        recipe.ingredients.clear();
        assert!(matches!(
            recipe.validate(),
            Err(Error::MalformedRecipe(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_nutrient() {
        let mut recipe = sample_recipe();
        recipe.nutrition.sodium = -1.0;
        assert!(matches!(
            recipe.validate(),
            Err(Error::MalformedRecipe(_))
        ));
    }

    #[test]
    fn test_tag_lookup_is_case_insensitive() {
        let recipe = sample_recipe();
        assert!(recipe.has_dietary_tag("Vegan"));
        assert!(!recipe.has_dietary_tag("keto"));
        assert!(recipe.has_health_benefit("HEART_HEALTHY"));
    }

    #[test]
    fn test_embedding_text_contains_fields() {
        let text = sample_recipe().embedding_text();
        assert!(text.contains("Lentil Soup"));
        assert!(text.contains("lentils"));
        assert!(text.contains("vegan"));
    }
}
