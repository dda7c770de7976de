// Integration tests for tastevec
use tastevec::{
    EngineConfig, Error, IngredientEntry, NutrientProfile, ReasonCode, Recipe, RecipeEngine,
    SubstitutionConstraints, TextEmbedder, UserProfile,
};

fn lentil_soup() -> Recipe {
    Recipe {
        id: "lentil-soup".into(),
        title: "Lentil Soup".into(),
        ingredients: vec![
            IngredientEntry::new("lentils", 200.0, "g"),
            IngredientEntry::new("carrot", 2.0, "piece"),
            IngredientEntry::new("cumin", 1.0, "tsp"),
        ],
        instructions: vec!["Simmer lentils and carrots until tender".into()],
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

fn chicken_salad() -> Recipe {
    Recipe {
        id: "chicken-salad".into(),
        title: "Chicken Salad".into(),
        ingredients: vec![
            IngredientEntry::new("chicken breast", 150.0, "g"),
            IngredientEntry::new("lettuce", 80.0, "g"),
            IngredientEntry::new("olive oil", 1.0, "tbsp"),
        ],
        instructions: vec!["Grill the chicken, toss with lettuce".into()],
        nutrition: NutrientProfile {
            calories: 280.0,
            protein: 32.0,
            carbohydrates: 6.0,
            fat: 14.0,
            fiber: 2.0,
            sodium: 240.0,
        },
        dietary_tags: vec!["gluten_free".into()],
        health_benefits: vec![],
        cuisine: "american".into(),
    }
}

fn peanut_noodles() -> Recipe {
    Recipe {
        id: "peanut-noodles".into(),
        title: "Peanut Noodles".into(),
        ingredients: vec![
            IngredientEntry::new("rice noodles", 200.0, "g"),
            IngredientEntry::new("peanut butter", 3.0, "tbsp"),
            IngredientEntry::new("scallions", 2.0, "piece"),
        ],
        instructions: vec!["Toss cooked noodles in the peanut sauce".into()],
        nutrition: NutrientProfile {
            calories: 540.0,
            protein: 16.0,
            carbohydrates: 70.0,
            fat: 22.0,
            fiber: 5.0,
            sodium: 720.0,
        },
        dietary_tags: vec!["vegan".into()],
        health_benefits: vec![],
        cuisine: "thai".into(),
    }
}

fn engine_with_scenario_recipes(dim: usize) -> RecipeEngine {
    let engine = RecipeEngine::new(EngineConfig {
        dim,
        ..Default::default()
    });
    engine
        .index_recipes(vec![lentil_soup(), chicken_salad(), peanut_noodles()])
        .unwrap();
    engine
}

#[test]
fn test_vegan_peanut_allergy_scenario() {
    // Query "high protein vegan lunch" with {restrictions: [vegan],
    // allergies: [peanut]}, k=2. Peanut Noodles is hard-dropped (allergy),
    // Chicken Salad is hard-dropped (restriction), Lentil Soup comes back
    // alone with a perfect compatibility score and no warnings.
    let engine = engine_with_scenario_recipes(128);
    let profile = UserProfile {
        restrictions: vec!["vegan".into()],
        allergies: vec!["peanut".into()],
        ..Default::default()
    };

    let results = engine
        .query("high protein vegan lunch", &profile, 2)
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.recipe.id, "lentil-soup");
    assert!((result.compatibility.score - 1.0).abs() < 1e-6);
    assert!(result.compatibility.violations.is_empty());
    assert!(result.compatibility.warnings.is_empty());
}

#[test]
fn test_dropped_recipes_still_analyzable() {
    // The hard drop is about query results; analyze still reports why
    let engine = engine_with_scenario_recipes(64);
    let profile = UserProfile {
        restrictions: vec!["vegan".into()],
        allergies: vec!["peanut".into()],
        ..Default::default()
    };

    let noodles = engine.analyze(&peanut_noodles(), &profile).unwrap();
    assert_eq!(noodles.score, 0.0);
    assert!(noodles.violations.iter().any(|v| matches!(
        v,
        ReasonCode::AllergenPresent { allergen, .. } if allergen == "peanut"
    )));
    // A safe swap for the offending ingredient comes attached
    assert!(!noodles.substitutions.is_empty());

    let salad = engine.analyze(&chicken_salad(), &profile).unwrap();
    assert_eq!(salad.score, 0.0);
    assert!(salad.violations.iter().any(|v| matches!(
        v,
        ReasonCode::RestrictionUnmet { restriction } if restriction == "vegan"
    )));
}

#[test]
fn test_butter_substitution_scenario() {
    // suggest("butter", {allergies:["dairy"]}) returns only dairy-free
    // replacements, highest-resolving candidate first
    let engine = RecipeEngine::new(EngineConfig::default());
    let constraints = SubstitutionConstraints {
        allergies: vec!["dairy".into()],
        ..Default::default()
    };

    let candidates = engine.suggest("butter", &constraints).unwrap();
    assert!(!candidates.is_empty());
    for candidate in &candidates {
        assert!(candidate.resolves.contains(&"dairy".to_string()));
        assert_ne!(candidate.name, "ghee");
    }
    for candidate in &candidates {
        assert!(candidates[0].resolves.len() >= candidate.resolves.len());
    }
}

#[test]
fn test_suggest_unknown_ingredient_is_empty_not_error() {
    let engine = RecipeEngine::new(EngineConfig::default());
    let candidates = engine
        .suggest("dragonfruit zest", &SubstitutionConstraints::default())
        .unwrap();
    assert!(candidates.is_empty());
}

#[test]
fn test_suggest_rejects_unknown_constraint_codes() {
    let engine = RecipeEngine::new(EngineConfig::default());
    let constraints = SubstitutionConstraints {
        allergies: vec!["moonrock".into()],
        ..Default::default()
    };
    assert!(matches!(
        engine.suggest("butter", &constraints),
        Err(Error::MalformedProfile(_))
    ));
}

#[test]
fn test_save_load_round_trip_preserves_query_results() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.snapshot");

    let engine = engine_with_scenario_recipes(96);
    engine.save(&path).unwrap();

    let restored = RecipeEngine::new(EngineConfig {
        dim: 96,
        ..Default::default()
    });
    assert_eq!(restored.load(&path).unwrap(), 3);

    let profile = UserProfile {
        restrictions: vec!["vegan".into()],
        ..Default::default()
    };
    for probe in ["vegan lunch", "noodles", "salad with chicken"] {
        let before = engine.query(probe, &profile, 3).unwrap();
        let after = restored.query(probe, &profile, 3).unwrap();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert_eq!(a.recipe.id, b.recipe.id);
            assert_eq!(a.similarity, b.similarity);
            assert_eq!(a.combined_score, b.combined_score);
        }
    }
}

#[test]
fn test_load_dimension_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.snapshot");

    engine_with_scenario_recipes(64).save(&path).unwrap();

    let other = RecipeEngine::new(EngineConfig {
        dim: 128,
        ..Default::default()
    });
    assert!(matches!(
        other.load(&path),
        Err(Error::DimensionMismatch {
            expected: 128,
            actual: 64
        })
    ));
}

#[test]
fn test_refetch_fills_short_results() {
    // With k=2 and overfetch 3, the first pass fetches 6 candidates. Flood
    // the index with non-vegan recipes so the initial window starves, and
    // check the re-fetch still finds the vegan ones.
    let engine = RecipeEngine::new(EngineConfig {
        dim: 64,
        overfetch_factor: 3,
        refetch_factor: 20,
        ..Default::default()
    });

    for i in 0..18 {
        engine
            .index_recipe(Recipe {
                id: format!("meat-{i:02}"),
                title: "Vegan Style Chicken Bowl".into(),
                ingredients: vec![IngredientEntry::new("chicken thigh", 150.0, "g")],
                instructions: vec![],
                nutrition: Default::default(),
                dietary_tags: vec![],
                health_benefits: vec![],
                cuisine: "fusion".into(),
            })
            .unwrap();
    }
    engine
        .index_recipe(Recipe {
            id: "zz-tofu-bowl".into(),
            title: "Tofu Bowl".into(),
            ingredients: vec![IngredientEntry::new("tofu", 150.0, "g")],
            instructions: vec![],
            nutrition: Default::default(),
            dietary_tags: vec!["vegan".into()],
            health_benefits: vec![],
            cuisine: "fusion".into(),
        })
        .unwrap();
    engine
        .index_recipe(Recipe {
            id: "zz-veggie-bowl".into(),
            title: "Veggie Bowl".into(),
            ingredients: vec![IngredientEntry::new("broccoli", 150.0, "g")],
            instructions: vec![],
            nutrition: Default::default(),
            dietary_tags: vec!["vegan".into()],
            health_benefits: vec![],
            cuisine: "fusion".into(),
        })
        .unwrap();

    let profile = UserProfile {
        restrictions: vec!["vegan".into()],
        ..Default::default()
    };
    // The query text matches the flood recipes hardest, so the vegan bowls
    // sit outside the first over-fetch window
    let results = engine
        .query("vegan style chicken bowl", &profile, 2)
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.recipe.dietary_tags.contains(&"vegan".to_string())));
}

#[test]
fn test_warnings_surface_without_dropping() {
    // A hypertension profile still sees the salty recipe, ranked but warned
    let engine = engine_with_scenario_recipes(64);
    let profile = UserProfile {
        conditions: vec!["hypertension".into()],
        ..Default::default()
    };

    let results = engine.query("noodles with peanut sauce", &profile, 3).unwrap();
    let noodles = results
        .iter()
        .find(|r| r.recipe.id == "peanut-noodles")
        .expect("salty recipe is not dropped for a condition");
    assert!(noodles.compatibility.score < 1.0);
    assert!(noodles
        .compatibility
        .warnings
        .iter()
        .any(|w| matches!(w, ReasonCode::ConditionCaution { condition, .. } if condition == "hypertension")));
}

#[test]
fn test_embed_batch_matches_single_embeds() {
    let embedder = TextEmbedder::new(256);
    let texts: Vec<String> = (0..10).map(|i| format!("recipe number {i}")).collect();
    let batch = embedder.embed_batch(&texts);
    for (text, vector) in texts.iter().zip(&batch) {
        assert_eq!(embedder.embed(text).as_slice(), vector.as_slice());
    }
}

#[test]
fn test_stats_reflect_index() {
    let engine = engine_with_scenario_recipes(64);
    let stats = engine.stats();

    assert_eq!(stats.record_count, 3);
    assert_eq!(stats.dimensionality, 64);
    assert_eq!(stats.cuisines, 3);

    let vegan = stats.restriction_coverage.get("vegan").unwrap();
    assert_eq!(vegan.compatible, 2);
    assert_eq!(vegan.total, 3);

    let gluten_free = stats.restriction_coverage.get("gluten_free").unwrap();
    assert_eq!(gluten_free.compatible, 2);
}
