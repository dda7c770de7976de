//! Ingredient substitution resolver
//!
//! Proposes constraint-safe replacements for an ingredient from the static
//! substitution table. The resolver never mutates recipes; it only proposes
//! alternatives.

use crate::rules::{keyword_matches, CandidateSpec, NutrientDelta, RuleSet};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tastevec_core::recipe::Nutrient;

/// Preparation words stripped during name normalization
const MODIFIERS: &[&str] = &[
    "fresh", "dried", "frozen", "canned", "organic", "raw", "cooked", "unsalted", "salted",
];

/// A desired nutritional direction for ranking candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NutrientDirection {
    Reduce(Nutrient),
    Increase(Nutrient),
}

/// Active constraints a replacement must not violate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionConstraints {
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub direction: Option<NutrientDirection>,
}

impl SubstitutionConstraints {
    #[must_use]
    pub fn allergies(codes: &[&str]) -> Self {
        Self {
            allergies: codes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn restrictions(codes: &[&str]) -> Self {
        Self {
            restrictions: codes.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }
}

/// A ranked replacement proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubstitutionCandidate {
    pub original: String,
    pub name: String,
    pub ratio: String,
    pub note: String,
    /// The active constraint codes this swap resolves, in profile order
    pub resolves: Vec<String>,
    pub delta: NutrientDelta,
}

/// Resolves ingredient substitutions against the static rule table
#[derive(Debug, Clone)]
pub struct SubstitutionResolver {
    rules: Arc<RuleSet>,
}

impl SubstitutionResolver {
    #[must_use]
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Propose ranked replacements for an ingredient.
    ///
    /// Unknown ingredients return an empty list; absence of a rule is a
    /// valid, common case, not an error. Candidates that would themselves
    /// violate an active allergy or restriction are filtered out. The rest
    /// rank by resolved-constraint count, then improvement toward the stated
    /// direction, then original table order.
    #[must_use]
    pub fn suggest(
        &self,
        ingredient: &str,
        constraints: &SubstitutionConstraints,
    ) -> Vec<SubstitutionCandidate> {
        let normalized = normalize_name(ingredient);
        let Some(rule) = self.rules.substitution(&normalized) else {
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32, SubstitutionCandidate)> = rule
            .candidates
            .iter()
            .filter(|spec| !self.violates(spec, constraints))
            .map(|spec| {
                let resolves = self.resolved_codes(spec, constraints);
                let improvement = direction_improvement(spec, constraints.direction);
                let candidate = SubstitutionCandidate {
                    original: normalized.clone(),
                    name: spec.name.clone(),
                    ratio: spec.ratio.clone(),
                    note: spec.note.clone(),
                    resolves,
                    delta: spec.delta,
                };
                (candidate.resolves.len(), improvement, candidate)
            })
            .collect();

        // Stable sort keeps the table order as the final tie-break
        ranked.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
        });

        ranked.into_iter().map(|(_, _, c)| c).collect()
    }

    /// True when the replacement itself conflicts with an active constraint.
    ///
    /// A candidate that declares it resolves a constraint is exempt from
    /// that constraint's keyword check: "almond milk" trips the dairy
    /// keyword "milk" by name, but the table says it resolves dairy.
    fn violates(&self, spec: &CandidateSpec, constraints: &SubstitutionConstraints) -> bool {
        let name = spec.name.to_lowercase();

        for allergy in &constraints.allergies {
            if spec.resolves.contains(allergy) {
                continue;
            }
            if let Some(rule) = self.rules.allergen(allergy) {
                if rule.keywords.iter().any(|k| keyword_matches(k, &name)) {
                    return true;
                }
            }
        }

        for restriction in &constraints.restrictions {
            if spec.resolves.contains(restriction) {
                continue;
            }
            if let Some(rule) = self.rules.restriction(restriction) {
                if rule
                    .excluded_keywords
                    .iter()
                    .any(|k| keyword_matches(k, &name))
                {
                    return true;
                }
            }
        }

        false
    }

    /// Active constraint codes this candidate resolves, in profile order
    fn resolved_codes(
        &self,
        spec: &CandidateSpec,
        constraints: &SubstitutionConstraints,
    ) -> Vec<String> {
        constraints
            .allergies
            .iter()
            .chain(constraints.restrictions.iter())
            .filter(|code| spec.resolves.contains(code))
            .cloned()
            .collect()
    }
}

/// Case/whitespace-normalize an ingredient name for table lookup.
///
/// Strips preparation modifiers so "Unsalted Butter" resolves the "butter"
/// rule.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .filter(|word| !MODIFIERS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

fn direction_improvement(spec: &CandidateSpec, direction: Option<NutrientDirection>) -> f32 {
    match direction {
        Some(NutrientDirection::Reduce(nutrient)) => -spec.delta.get(nutrient),
        Some(NutrientDirection::Increase(nutrient)) => spec.delta.get(nutrient),
        None => 0.0,
    }
}
