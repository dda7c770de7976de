//! # tastevec Diet
//!
//! Dietary intelligence for the tastevec recipe engine:
//!
//! - [`RuleSet`] - Immutable allergen/restriction/condition/substitution tables
//! - [`CompatibilityScorer`] - [0,1] compatibility with machine-readable reasons
//! - [`SubstitutionResolver`] - Constraint-safe ranked ingredient replacements
//!
//! Rule tables are built once and shared by `Arc`; the scorer and resolver
//! are total functions over validated inputs.

pub mod rules;
pub mod score;
pub mod substitute;

pub use rules::{
    keyword_matches, AllergenRule, CandidateSpec, ConditionRule, NutrientDelta, NutrientLimit,
    RestrictionRule, RuleSet, SubstitutionRule,
};
pub use score::{
    CompatibilityResult, CompatibilityScorer, ReasonCode, GOAL_WEIGHT, HEALTH_WEIGHT,
    RESTRICTION_WEIGHT,
};
pub use substitute::{
    normalize_name, NutrientDirection, SubstitutionCandidate, SubstitutionConstraints,
    SubstitutionResolver,
};
