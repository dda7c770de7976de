//! Static dietary reference tables
//!
//! Process-wide reference data: allergen keyword tables, restriction rules,
//! health-condition heuristics, and the substitution table. Built once with
//! [`RuleSet::builtin`], shared by `Arc` into the scorer and resolver, never
//! mutated at runtime.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tastevec_core::recipe::{Nutrient, UserProfile};
use tastevec_core::{Error, Result};

/// A dietary restriction: which tags satisfy it and which ingredient
/// keywords conflict with it even on a tagged recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictionRule {
    /// Any of these dietary tags satisfies the restriction (e.g. a vegan
    /// recipe satisfies a vegetarian requirement)
    pub satisfied_by: Vec<String>,
    /// Ingredient keywords that conflict regardless of tagging
    pub excluded_keywords: Vec<String>,
}

/// Ingredient keywords associated with an allergen code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllergenRule {
    pub keywords: Vec<String>,
}

/// A nutrient ceiling for a health condition
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NutrientLimit {
    pub nutrient: Nutrient,
    pub threshold: f32,
    pub weight: f32,
}

/// Heuristics for one supported health condition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionRule {
    pub limits: Vec<NutrientLimit>,
    /// Benefit tags that halve the condition's penalty when present
    pub recommended_benefits: Vec<String>,
}

/// Signed per-serving nutrient change of swapping in a replacement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientDelta {
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

impl NutrientDelta {
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
}

/// One replacement candidate in a substitution rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub ratio: String,
    pub note: String,
    /// Restriction/allergy codes this swap resolves
    pub resolves: Vec<String>,
    pub delta: NutrientDelta,
}

/// Ordered replacement candidates for one source ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionRule {
    pub source: String,
    pub candidates: Vec<CandidateSpec>,
}

/// The immutable rule tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    restrictions: BTreeMap<String, RestrictionRule>,
    allergens: BTreeMap<String, AllergenRule>,
    conditions: BTreeMap<String, ConditionRule>,
    substitutions: HashMap<String, SubstitutionRule>,
}

impl RuleSet {
    #[must_use]
    pub fn restriction(&self, code: &str) -> Option<&RestrictionRule> {
        self.restrictions.get(code)
    }

    #[must_use]
    pub fn allergen(&self, code: &str) -> Option<&AllergenRule> {
        self.allergens.get(code)
    }

    #[must_use]
    pub fn condition(&self, code: &str) -> Option<&ConditionRule> {
        self.conditions.get(code)
    }

    /// Look up a substitution rule by normalized source name
    #[must_use]
    pub fn substitution(&self, normalized_name: &str) -> Option<&SubstitutionRule> {
        self.substitutions.get(normalized_name)
    }

    /// Supported restriction codes, sorted
    pub fn restriction_codes(&self) -> impl Iterator<Item = &str> {
        self.restrictions.keys().map(String::as_str)
    }

    /// Reject profiles referencing codes the tables do not know.
    ///
    /// Unrecognized codes are a boundary error, never silently ignored: a
    /// profile that cannot be fully honored must not be scored at all.
    pub fn validate_profile(&self, profile: &UserProfile) -> Result<()> {
        self.validate_codes(&profile.restrictions, &profile.allergies)?;
        for condition in &profile.conditions {
            if !self.conditions.contains_key(condition) {
                return Err(Error::MalformedProfile(format!(
                    "unknown health condition '{condition}'"
                )));
            }
        }
        for (nutrient, goal) in &profile.goals {
            if goal.target < 0.0 || goal.tolerance < 0.0 {
                return Err(Error::MalformedProfile(format!(
                    "negative goal for {nutrient}"
                )));
            }
        }
        Ok(())
    }

    /// Validate restriction/allergy codes, shared with the substitution path
    pub fn validate_codes(&self, restrictions: &[String], allergies: &[String]) -> Result<()> {
        for restriction in restrictions {
            if !self.restrictions.contains_key(restriction) {
                return Err(Error::MalformedProfile(format!(
                    "unknown dietary restriction '{restriction}'"
                )));
            }
        }
        for allergy in allergies {
            if !self.allergens.contains_key(allergy) {
                return Err(Error::MalformedProfile(format!(
                    "unknown allergy '{allergy}'"
                )));
            }
        }
        Ok(())
    }

    /// The built-in reference tables
    #[must_use]
    pub fn builtin() -> Self {
        let mut restrictions = BTreeMap::new();
        restrictions.insert(
            "vegan".to_string(),
            restriction(
                &["vegan"],
                &[
                    "beef", "pork", "chicken", "turkey", "lamb", "bacon", "fish", "salmon",
                    "tuna", "shrimp", "anchovy", "gelatin", "milk", "butter", "cheese",
                    "cream", "yogurt", "egg", "honey",
                ],
            ),
        );
        restrictions.insert(
            "vegetarian".to_string(),
            restriction(
                &["vegetarian", "vegan"],
                &[
                    "beef", "pork", "chicken", "turkey", "lamb", "bacon", "fish", "salmon",
                    "tuna", "shrimp", "anchovy", "gelatin",
                ],
            ),
        );
        restrictions.insert(
            "gluten_free".to_string(),
            restriction(
                &["gluten_free"],
                &["wheat", "barley", "rye", "couscous", "semolina"],
            ),
        );
        restrictions.insert(
            "dairy_free".to_string(),
            restriction(
                &["dairy_free", "vegan"],
                &["milk", "butter", "cheese", "cream", "yogurt", "ghee"],
            ),
        );
        restrictions.insert(
            "low_carb".to_string(),
            restriction(&["low_carb", "keto"], &[]),
        );
        restrictions.insert(
            "keto".to_string(),
            restriction(&["keto"], &["sugar", "bread", "pasta", "rice", "potato"]),
        );

        let mut allergens = BTreeMap::new();
        allergens.insert(
            "peanut".to_string(),
            allergen(&["peanut", "groundnut"]),
        );
        allergens.insert(
            "tree_nut".to_string(),
            allergen(&["almond", "walnut", "cashew", "pecan", "pistachio", "hazelnut"]),
        );
        allergens.insert(
            "dairy".to_string(),
            allergen(&["milk", "butter", "cheese", "cream", "yogurt", "ghee", "whey"]),
        );
        allergens.insert("egg".to_string(), allergen(&["egg", "mayonnaise"]));
        allergens.insert(
            "gluten".to_string(),
            allergen(&["wheat", "flour", "barley", "rye", "bread", "pasta"]),
        );
        allergens.insert(
            "shellfish".to_string(),
            allergen(&["shrimp", "crab", "lobster", "prawn", "oyster", "mussel", "clam", "scallop"]),
        );
        allergens.insert(
            "fish".to_string(),
            allergen(&["salmon", "tuna", "cod", "anchovy", "sardine", "trout"]),
        );
        allergens.insert(
            "soy".to_string(),
            allergen(&["soy", "tofu", "edamame", "tempeh"]),
        );
        allergens.insert("sesame".to_string(), allergen(&["sesame", "tahini"]));

        let mut conditions = BTreeMap::new();
        conditions.insert(
            "diabetes".to_string(),
            ConditionRule {
                limits: vec![limit(Nutrient::Carbohydrates, 45.0, 1.0)],
                recommended_benefits: strings(&["diabetes_friendly", "blood_sugar_control"]),
            },
        );
        conditions.insert(
            "hypertension".to_string(),
            ConditionRule {
                limits: vec![limit(Nutrient::Sodium, 600.0, 1.0)],
                recommended_benefits: strings(&["blood_pressure_control", "heart_healthy"]),
            },
        );
        conditions.insert(
            "heart_disease".to_string(),
            ConditionRule {
                limits: vec![
                    limit(Nutrient::Fat, 25.0, 0.5),
                    limit(Nutrient::Sodium, 500.0, 0.5),
                ],
                recommended_benefits: strings(&["heart_healthy", "cholesterol_lowering"]),
            },
        );
        conditions.insert(
            "obesity".to_string(),
            ConditionRule {
                limits: vec![limit(Nutrient::Calories, 700.0, 1.0)],
                recommended_benefits: strings(&["weight_management", "low_carb"]),
            },
        );
        conditions.insert(
            "high_cholesterol".to_string(),
            ConditionRule {
                limits: vec![limit(Nutrient::Fat, 20.0, 1.0)],
                recommended_benefits: strings(&["cholesterol_lowering", "heart_healthy"]),
            },
        );

        let substitutions = builtin_substitutions();

        Self {
            restrictions,
            allergens,
            conditions,
            substitutions,
        }
    }
}

/// Substring-aware keyword match, both arguments lowercase.
///
/// Matches when either string contains the other, or any word of one
/// contains a word of the other ("peanut" matches "peanut butter",
/// "soy sauce" matches "soy").
#[must_use]
pub fn keyword_matches(keyword: &str, ingredient: &str) -> bool {
    if ingredient.contains(keyword) || keyword.contains(ingredient) {
        return true;
    }
    keyword.split_whitespace().any(|kw| {
        ingredient
            .split_whitespace()
            .any(|iw| iw.contains(kw) || kw.contains(iw))
    })
}

fn restriction(satisfied_by: &[&str], excluded: &[&str]) -> RestrictionRule {
    RestrictionRule {
        satisfied_by: strings(satisfied_by),
        excluded_keywords: strings(excluded),
    }
}

fn allergen(keywords: &[&str]) -> AllergenRule {
    AllergenRule {
        keywords: strings(keywords),
    }
}

fn limit(nutrient: Nutrient, threshold: f32, weight: f32) -> NutrientLimit {
    NutrientLimit {
        nutrient,
        threshold,
        weight,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn candidate(
    name: &str,
    ratio: &str,
    note: &str,
    resolves: &[&str],
    delta: NutrientDelta,
) -> CandidateSpec {
    CandidateSpec {
        name: name.to_string(),
        ratio: ratio.to_string(),
        note: note.to_string(),
        resolves: strings(resolves),
        delta,
    }
}

fn builtin_substitutions() -> HashMap<String, SubstitutionRule> {
    let rules = vec![
        SubstitutionRule {
            source: "butter".to_string(),
            candidates: vec![
                candidate(
                    "olive oil",
                    "3:4",
                    "use three quarters the amount",
                    &["dairy", "dairy_free", "vegan", "vegetarian"],
                    NutrientDelta {
                        calories: 17.0,
                        fat: 2.0,
                        sodium: -91.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "coconut oil",
                    "1:1",
                    "adds a mild coconut note",
                    &["dairy", "dairy_free", "vegan", "vegetarian"],
                    NutrientDelta {
                        calories: 15.0,
                        fat: 2.1,
                        sodium: -91.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "unsweetened applesauce",
                    "1:2",
                    "halve the amount, best in baking",
                    &["dairy", "dairy_free", "vegan", "vegetarian"],
                    NutrientDelta {
                        calories: -89.0,
                        carbohydrates: 3.4,
                        fat: -11.4,
                        fiber: 0.3,
                        sodium: -90.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "ghee",
                    "1:1",
                    "clarified butter, still dairy",
                    &[],
                    NutrientDelta {
                        calories: 10.0,
                        sodium: -91.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "peanut butter".to_string(),
            candidates: vec![
                candidate(
                    "sunflower seed butter",
                    "1:1",
                    "closest texture match",
                    &["peanut", "tree_nut", "vegan", "vegetarian", "dairy_free"],
                    NutrientDelta {
                        calories: 5.0,
                        protein: -1.0,
                        fat: 1.0,
                        sodium: 30.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "almond butter",
                    "1:1",
                    "slightly sweeter",
                    &["peanut", "vegan", "vegetarian", "dairy_free"],
                    NutrientDelta {
                        calories: 4.0,
                        protein: -0.5,
                        carbohydrates: -0.5,
                        fat: 1.5,
                        fiber: 1.0,
                        sodium: -70.0,
                    },
                ),
                candidate(
                    "tahini",
                    "1:1",
                    "savory, works in sauces",
                    &["peanut", "tree_nut", "vegan", "vegetarian", "dairy_free"],
                    NutrientDelta {
                        calories: -5.0,
                        protein: -1.5,
                        fat: 0.5,
                        sodium: -60.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "chicken".to_string(),
            candidates: vec![
                candidate(
                    "tofu",
                    "1:1",
                    "press and marinate first",
                    &["vegan", "vegetarian"],
                    NutrientDelta {
                        calories: -90.0,
                        protein: -14.0,
                        fat: -4.0,
                        sodium: -60.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "chickpeas",
                    "1:1",
                    "by cooked weight",
                    &["vegan", "vegetarian"],
                    NutrientDelta {
                        calories: -30.0,
                        protein: -17.0,
                        carbohydrates: 27.0,
                        fat: -1.0,
                        fiber: 7.5,
                        sodium: -50.0,
                    },
                ),
                candidate(
                    "jackfruit",
                    "1:1",
                    "young green jackfruit, shreds like meat",
                    &["vegan", "vegetarian"],
                    NutrientDelta {
                        calories: -120.0,
                        protein: -28.0,
                        carbohydrates: 23.0,
                        fat: -3.0,
                        fiber: 1.5,
                        sodium: -60.0,
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "milk".to_string(),
            candidates: vec![
                candidate(
                    "almond milk",
                    "1:1",
                    "unsweetened",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -112.0,
                        protein: -7.0,
                        carbohydrates: -9.0,
                        fat: -5.5,
                        sodium: 65.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "oat milk",
                    "1:1",
                    "closest body to whole milk",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -29.0,
                        protein: -5.0,
                        carbohydrates: 4.0,
                        fat: -3.0,
                        fiber: 0.8,
                        sodium: -5.0,
                    },
                ),
                candidate(
                    "soy milk",
                    "1:1",
                    "highest protein of the plant milks",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -44.0,
                        protein: -1.7,
                        fat: -4.4,
                        sodium: 10.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "egg".to_string(),
            candidates: vec![
                candidate(
                    "flax egg",
                    "1:1",
                    "one tablespoon ground flax plus three tablespoons water",
                    &["egg", "vegan"],
                    NutrientDelta {
                        calories: -33.0,
                        protein: -4.4,
                        fat: -1.2,
                        fiber: 1.9,
                        ..Default::default()
                    },
                ),
                candidate(
                    "mashed banana",
                    "1:1",
                    "half a banana per egg, sweetens the result",
                    &["egg", "vegan"],
                    NutrientDelta {
                        calories: -19.0,
                        protein: -5.7,
                        carbohydrates: 13.5,
                        fat: -4.8,
                        fiber: 1.6,
                        sodium: -70.0,
                    },
                ),
                candidate(
                    "silken tofu",
                    "1:1",
                    "quarter cup per egg, neutral flavor",
                    &["egg", "vegan"],
                    NutrientDelta {
                        calories: -40.0,
                        protein: -1.3,
                        fat: -3.0,
                        sodium: -66.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "wheat flour".to_string(),
            candidates: vec![
                candidate(
                    "rice flour",
                    "1:1",
                    "lighter crumb",
                    &["gluten", "gluten_free"],
                    NutrientDelta {
                        calories: 20.0,
                        protein: -3.0,
                        carbohydrates: 6.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "oat flour",
                    "1:1",
                    "use certified gluten-free oats",
                    &["gluten", "gluten_free"],
                    NutrientDelta {
                        calories: -35.0,
                        protein: 2.0,
                        carbohydrates: -10.0,
                        fiber: 4.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "almond flour",
                    "1:1",
                    "denser, moist crumb",
                    &["gluten", "gluten_free", "low_carb", "keto"],
                    NutrientDelta {
                        calories: 185.0,
                        protein: 8.0,
                        carbohydrates: -68.0,
                        fat: 48.0,
                        fiber: 8.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "soy sauce".to_string(),
            candidates: vec![
                candidate(
                    "coconut aminos",
                    "1:1",
                    "milder and sweeter",
                    &["soy", "gluten", "gluten_free"],
                    NutrientDelta {
                        sodium: -609.0,
                        carbohydrates: 1.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "tamari",
                    "1:1",
                    "wheat-free but still soy",
                    &["gluten", "gluten_free"],
                    NutrientDelta {
                        sodium: 61.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "cream".to_string(),
            candidates: vec![
                candidate(
                    "coconut cream",
                    "1:1",
                    "whips like dairy cream",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: 40.0,
                        fat: 5.0,
                        sodium: -20.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "cashew cream",
                    "1:1",
                    "soaked blended cashews",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -120.0,
                        protein: 4.0,
                        fat: -14.0,
                        sodium: -30.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "cheese".to_string(),
            candidates: vec![
                candidate(
                    "nutritional yeast",
                    "1:4",
                    "savory finish, far less volume needed",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -90.0,
                        protein: 2.0,
                        fat: -8.0,
                        fiber: 2.0,
                        sodium: -300.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "cashew cheese",
                    "1:1",
                    "cultured spread",
                    &["dairy", "dairy_free", "vegan"],
                    NutrientDelta {
                        calories: -30.0,
                        fat: -3.0,
                        sodium: -250.0,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "sugar".to_string(),
            candidates: vec![
                candidate(
                    "maple syrup",
                    "3:4",
                    "reduce other liquid slightly",
                    &["vegan"],
                    NutrientDelta {
                        calories: 4.0,
                        carbohydrates: 0.8,
                        ..Default::default()
                    },
                ),
                candidate(
                    "honey",
                    "3:4",
                    "not vegan",
                    &[],
                    NutrientDelta {
                        calories: 16.0,
                        carbohydrates: 4.7,
                        ..Default::default()
                    },
                ),
                candidate(
                    "stevia",
                    "1:24",
                    "a pinch replaces a tablespoon",
                    &["low_carb", "keto"],
                    NutrientDelta {
                        calories: -48.0,
                        carbohydrates: -12.6,
                        ..Default::default()
                    },
                ),
            ],
        },
        SubstitutionRule {
            source: "salt".to_string(),
            candidates: vec![
                candidate(
                    "lemon juice",
                    "1:1",
                    "brightens without sodium",
                    &[],
                    NutrientDelta {
                        calories: 3.0,
                        carbohydrates: 1.0,
                        sodium: -2300.0,
                        ..Default::default()
                    },
                ),
                candidate(
                    "dried herbs",
                    "1:1",
                    "oregano, thyme, or a blend",
                    &[],
                    NutrientDelta {
                        calories: 2.0,
                        fiber: 0.4,
                        sodium: -2325.0,
                        ..Default::default()
                    },
                ),
            ],
        },
    ];

    rules
        .into_iter()
        .map(|rule| (rule.source.clone(), rule))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tastevec_core::recipe::NutrientGoal;

    #[test]
    fn test_builtin_tables_populated() {
        let rules = RuleSet::builtin();
        assert!(rules.restriction("vegan").is_some());
        assert!(rules.allergen("peanut").is_some());
        assert!(rules.condition("diabetes").is_some());
        assert!(rules.substitution("butter").is_some());
        assert!(rules.restriction("flat_earth_diet").is_none());
    }

    #[test]
    fn test_keyword_matches() {
        assert!(keyword_matches("peanut", "peanut butter"));
        assert!(keyword_matches("milk", "whole milk"));
        assert!(keyword_matches("soy sauce", "soy"));
        assert!(!keyword_matches("milk", "coconut oil"));
    }

    #[test]
    fn test_validate_profile_rejects_unknown_codes() {
        let rules = RuleSet::builtin();

        let profile = UserProfile {
            restrictions: vec!["vegan".into()],
            allergies: vec!["peanut".into()],
            conditions: vec!["diabetes".into()],
            ..Default::default()
        };
        assert!(rules.validate_profile(&profile).is_ok());

        let bad = UserProfile {
            restrictions: vec!["carnivore_x".into()],
            ..Default::default()
        };
        assert!(matches!(
            rules.validate_profile(&bad),
            Err(Error::MalformedProfile(_))
        ));

        let bad = UserProfile {
            allergies: vec!["kryptonite".into()],
            ..Default::default()
        };
        assert!(rules.validate_profile(&bad).is_err());

        let bad = UserProfile {
            conditions: vec!["vertigo".into()],
            ..Default::default()
        };
        assert!(rules.validate_profile(&bad).is_err());
    }

    #[test]
    fn test_validate_profile_rejects_negative_goal() {
        let rules = RuleSet::builtin();
        let mut profile = UserProfile::default();
        profile.goals.insert(
            Nutrient::Protein,
            NutrientGoal {
                target: -5.0,
                tolerance: 0.0,
            },
        );
        assert!(rules.validate_profile(&profile).is_err());
    }

    #[test]
    fn test_vegan_satisfies_vegetarian() {
        let rules = RuleSet::builtin();
        let rule = rules.restriction("vegetarian").unwrap();
        assert!(rule.satisfied_by.iter().any(|t| t == "vegan"));
    }
}
