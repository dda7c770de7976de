//! Dietary compatibility scoring
//!
//! Produces a [0,1] compatibility score plus machine-readable reason codes
//! for every (recipe, profile) pair. Violations are data in the result, not
//! errors; malformed input is rejected earlier, at the construction boundary.

use crate::rules::{keyword_matches, RuleSet};
use crate::substitute::{SubstitutionCandidate, SubstitutionConstraints, SubstitutionResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tastevec_core::recipe::{Nutrient, NutrientGoal, Recipe, UserProfile};

/// Weight of restriction satisfaction in the blended score
pub const RESTRICTION_WEIGHT: f32 = 0.4;
/// Weight of the health-condition component in the blended score
pub const HEALTH_WEIGHT: f32 = 0.4;
/// Weight of nutritional-goal closeness in the blended score
pub const GOAL_WEIGHT: f32 = 0.2;

/// Factor applied to a condition's penalty when the recipe carries one of
/// the condition's recommended benefit tags
const BENEFIT_PENALTY_RELIEF: f32 = 0.5;
/// Goal closeness below this adds a `GoalMissed` warning
const GOAL_WARN_THRESHOLD: f32 = 0.5;
/// Substitution proposals attached per conflicting ingredient
const SUGGESTIONS_PER_CONFLICT: usize = 2;

/// Machine-readable reason for a violation or warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ReasonCode {
    /// Hard: an ingredient matches an allergen in the profile
    AllergenPresent { allergen: String, ingredient: String },
    /// Hard: the recipe is not tagged for a required restriction
    RestrictionUnmet { restriction: String },
    /// Hard: the recipe is tagged but contains a conflicting ingredient
    RestrictionConflict {
        restriction: String,
        ingredient: String,
    },
    /// Soft: a nutrient exceeds a health-condition threshold
    ConditionCaution { condition: String, nutrient: Nutrient },
    /// Soft: a nutrient is far outside the profile's goal band
    GoalMissed { nutrient: Nutrient },
}

/// The outcome of scoring one recipe against one profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityResult {
    pub recipe_id: String,
    /// In [0,1]; exactly 0 whenever any violation is present
    pub score: f32,
    pub violations: Vec<ReasonCode>,
    pub warnings: Vec<ReasonCode>,
    pub substitutions: Vec<SubstitutionCandidate>,
}

impl CompatibilityResult {
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Scores recipes against user profiles using the shared rule tables
#[derive(Debug, Clone)]
pub struct CompatibilityScorer {
    rules: Arc<RuleSet>,
    resolver: SubstitutionResolver,
}

impl CompatibilityScorer {
    #[must_use]
    pub fn new(rules: Arc<RuleSet>) -> Self {
        let resolver = SubstitutionResolver::new(rules.clone());
        Self { rules, resolver }
    }

    /// Score a recipe against a profile.
    ///
    /// Total over well-formed inputs: profiles are validated at the boundary
    /// and unknown codes never reach this point. Reason codes come out in
    /// deterministic order, profile order first, recipe ingredient order
    /// second.
    #[must_use]
    pub fn score(&self, recipe: &Recipe, profile: &UserProfile) -> CompatibilityResult {
        let ingredients = recipe.ingredient_names();
        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut conflicting: Vec<String> = Vec::new();

        // Allergies first: never partially satisfied
        for allergy in &profile.allergies {
            if let Some(rule) = self.rules.allergen(allergy) {
                for ingredient in &ingredients {
                    if rule.keywords.iter().any(|k| keyword_matches(k, ingredient)) {
                        violations.push(ReasonCode::AllergenPresent {
                            allergen: allergy.clone(),
                            ingredient: ingredient.clone(),
                        });
                        push_unique(&mut conflicting, ingredient);
                    }
                }
            }
        }

        // Restrictions: evaluated independently so the result names which
        // restriction failed
        for restriction in &profile.restrictions {
            if let Some(rule) = self.rules.restriction(restriction) {
                let tagged = rule
                    .satisfied_by
                    .iter()
                    .any(|tag| recipe.has_dietary_tag(tag));
                if !tagged {
                    violations.push(ReasonCode::RestrictionUnmet {
                        restriction: restriction.clone(),
                    });
                    continue;
                }
                for ingredient in &ingredients {
                    if rule
                        .excluded_keywords
                        .iter()
                        .any(|k| keyword_matches(k, ingredient))
                    {
                        violations.push(ReasonCode::RestrictionConflict {
                            restriction: restriction.clone(),
                            ingredient: ingredient.clone(),
                        });
                        push_unique(&mut conflicting, ingredient);
                    }
                }
            }
        }

        let health_component = self.health_component(recipe, profile, &mut warnings);
        let goal_component = goal_component(recipe, profile, &mut warnings);

        let substitutions = self.conflict_substitutions(&conflicting, profile);

        let score = if violations.is_empty() {
            (RESTRICTION_WEIGHT
                + HEALTH_WEIGHT * health_component
                + GOAL_WEIGHT * goal_component)
                .clamp(0.0, 1.0)
        } else {
            0.0
        };

        CompatibilityResult {
            recipe_id: recipe.id.clone(),
            score,
            violations,
            warnings,
            substitutions,
        }
    }

    /// Continuous [0,1] component from the health-condition rule table
    fn health_component(
        &self,
        recipe: &Recipe,
        profile: &UserProfile,
        warnings: &mut Vec<ReasonCode>,
    ) -> f32 {
        let mut penalty = 0.0f32;

        for condition in &profile.conditions {
            let Some(rule) = self.rules.condition(condition) else {
                continue;
            };

            let mut condition_penalty = 0.0f32;
            for limit in &rule.limits {
                let value = recipe.nutrition.get(limit.nutrient);
                if value > limit.threshold {
                    let overrun = ((value - limit.threshold) / limit.threshold).min(1.0);
                    condition_penalty += overrun * limit.weight;
                    warnings.push(ReasonCode::ConditionCaution {
                        condition: condition.clone(),
                        nutrient: limit.nutrient,
                    });
                }
            }

            if rule
                .recommended_benefits
                .iter()
                .any(|b| recipe.has_health_benefit(b))
            {
                condition_penalty *= BENEFIT_PENALTY_RELIEF;
            }
            penalty += condition_penalty;
        }

        (1.0 - penalty).clamp(0.0, 1.0)
    }

    /// Ranked substitution proposals for every conflicting ingredient
    fn conflict_substitutions(
        &self,
        conflicting: &[String],
        profile: &UserProfile,
    ) -> Vec<SubstitutionCandidate> {
        if conflicting.is_empty() {
            return Vec::new();
        }
        let constraints = SubstitutionConstraints {
            restrictions: profile.restrictions.clone(),
            allergies: profile.allergies.clone(),
            direction: None,
        };
        conflicting
            .iter()
            .flat_map(|ingredient| {
                self.resolver
                    .suggest(ingredient, &constraints)
                    .into_iter()
                    .take(SUGGESTIONS_PER_CONFLICT)
            })
            .collect()
    }
}

fn goal_component(
    recipe: &Recipe,
    profile: &UserProfile,
    warnings: &mut Vec<ReasonCode>,
) -> f32 {
    if profile.goals.is_empty() {
        return 1.0;
    }

    let mut total = 0.0f32;
    for (nutrient, goal) in &profile.goals {
        let closeness = goal_closeness(recipe.nutrition.get(*nutrient), goal);
        if closeness < GOAL_WARN_THRESHOLD {
            warnings.push(ReasonCode::GoalMissed {
                nutrient: *nutrient,
            });
        }
        total += closeness;
    }
    total / profile.goals.len() as f32
}

/// 1 inside the tolerance band, then linear falloff normalized by the target
fn goal_closeness(value: f32, goal: &NutrientGoal) -> f32 {
    let deviation = (value - goal.target).abs();
    if deviation <= goal.tolerance {
        return 1.0;
    }
    if goal.target <= 0.0 {
        return 0.0;
    }
    (1.0 - (deviation - goal.tolerance) / goal.target).clamp(0.0, 1.0)
}

fn push_unique(items: &mut Vec<String>, item: &str) {
    if !items.iter().any(|existing| existing == item) {
        items.push(item.to_string());
    }
}
