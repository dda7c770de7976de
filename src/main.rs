use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tastevec::{
    Condition, EngineConfig, MetadataFilter, Nutrient, NutrientDirection, Recipe, RecipeEngine,
    SubstitutionConstraints, UserProfile,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Recipe retrieval with dietary compatibility scoring
#[derive(Parser, Debug)]
#[command(name = "tastevec")]
#[command(about = "An in-memory recipe retrieval and dietary compatibility engine", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse normalized recipe JSON and build a snapshot
    Ingest {
        /// Path to a JSON array of recipe records
        #[arg(short, long)]
        recipes: PathBuf,

        /// Snapshot file to write
        #[arg(short, long, default_value = "tastevec.snapshot")]
        snapshot: PathBuf,

        /// Embedding dimensionality
        #[arg(long, default_value_t = tastevec::DEFAULT_DIM)]
        dim: usize,
    },

    /// Query a snapshot for recipes matching a text and profile
    Query {
        /// Snapshot file to load
        #[arg(short, long, default_value = "tastevec.snapshot")]
        snapshot: PathBuf,

        /// Free-text query
        text: String,

        /// Number of results
        #[arg(short, default_value_t = 5)]
        k: usize,

        /// Active dietary restrictions (repeatable)
        #[arg(long = "restrict")]
        restrictions: Vec<String>,

        /// Active allergies (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Active health conditions (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,
    },

    /// Propose substitutions for an ingredient
    Suggest {
        /// Ingredient name
        ingredient: String,

        /// Active dietary restrictions (repeatable)
        #[arg(long = "restrict")]
        restrictions: Vec<String>,

        /// Active allergies (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,

        /// Nutrient to reduce, e.g. "sodium"
        #[arg(long)]
        reduce: Option<String>,
    },

    /// List indexed recipes carrying a dietary tag
    Browse {
        /// Snapshot file to load
        #[arg(short, long, default_value = "tastevec.snapshot")]
        snapshot: PathBuf,

        /// Required dietary tag
        #[arg(long)]
        tag: String,

        /// Number of results
        #[arg(short, default_value_t = 10)]
        k: usize,
    },

    /// Print index statistics
    Stats {
        /// Snapshot file to load
        #[arg(short, long, default_value = "tastevec.snapshot")]
        snapshot: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Ingest {
            recipes,
            snapshot,
            dim,
        } => ingest(&recipes, &snapshot, dim),
        Command::Query {
            snapshot,
            text,
            k,
            restrictions,
            allergies,
            conditions,
        } => {
            let engine = open(&snapshot)?;
            let profile = UserProfile {
                restrictions,
                allergies,
                conditions,
                ..Default::default()
            };
            let results = engine.query(&text, &profile, k)?;
            info!(count = results.len(), "query complete");
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Suggest {
            ingredient,
            restrictions,
            allergies,
            reduce,
        } => {
            let engine = RecipeEngine::new(EngineConfig::default());
            let direction = reduce
                .map(|name| name.parse::<Nutrient>().map(NutrientDirection::Reduce))
                .transpose()?;
            let constraints = SubstitutionConstraints {
                restrictions,
                allergies,
                direction,
            };
            let candidates = engine.suggest(&ingredient, &constraints)?;
            println!("{}", serde_json::to_string_pretty(&candidates)?);
            Ok(())
        }
        Command::Browse { snapshot, tag, k } => {
            let engine = open(&snapshot)?;
            let filter = MetadataFilter::new().with(Condition::TagPresent(tag));
            let recipes = engine.browse(&filter, k)?;
            println!("{}", serde_json::to_string_pretty(&recipes)?);
            Ok(())
        }
        Command::Stats { snapshot } => {
            let engine = open(&snapshot)?;
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
            Ok(())
        }
    }
}

/// Parse raw recipe JSON and write a snapshot.
///
/// This is the ingestion collaborator: the core never parses files.
fn ingest(recipes_path: &Path, snapshot_path: &Path, dim: usize) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(recipes_path)
        .with_context(|| format!("reading {}", recipes_path.display()))?;
    let recipes: Vec<Recipe> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", recipes_path.display()))?;

    let engine = RecipeEngine::new(EngineConfig {
        dim,
        ..Default::default()
    });
    let count = engine.index_recipes(recipes)?;
    engine.save(snapshot_path)?;

    info!(count, snapshot = %snapshot_path.display(), "ingest complete");
    Ok(())
}

/// Load a snapshot into an engine sized to the snapshot's dimensionality
fn open(snapshot_path: &Path) -> anyhow::Result<RecipeEngine> {
    let index = tastevec::load_index(snapshot_path)
        .with_context(|| format!("loading {}", snapshot_path.display()))?;
    let config = EngineConfig {
        name: index.name().to_string(),
        dim: index.dim(),
        ..Default::default()
    };
    Ok(RecipeEngine::with_index(config, index)?)
}
