//! Kalima CLI - explore the vocabulary graph from the terminal

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use kalima_core::application::CorpusService;
use kalima_core::config::Config;
use kalima_core::domain::corpus::{CorpusRepository, CorpusSnapshot, Word, WordId};
use kalima_core::api::recommendations::RecommendationsBody;
use kalima_core::domain::enrichment::{
    EnrichmentOptions, SEMANTIC_SIMILARITY_THRESHOLD, enrich_snapshot, load_embeddings,
};
use kalima_core::domain::graph::{GraphData, LinkKind, NodeKind};
use kalima_core::domain::recommend::Recommendation;
use kalima_core::infrastructure::corpus::{InMemoryCorpusRepository, SqliteCorpusRepository};
use kalima_core::storage::Database;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "kalima")]
#[command(author, version, about = "Graph views and learn-next recommendations for Quranic vocabulary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read the corpus from a JSON snapshot instead of the database
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Database file (overrides storage.database_path)
    #[arg(long, global = true, value_name = "PATH")]
    database: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Query(QueryCommand),

    /// Load a JSON snapshot into the database
    Import {
        /// Snapshot file to import
        file: PathBuf,
    },

    /// Fill in difficulty scores and seed relationships in a snapshot
    Enrich {
        /// Snapshot to read
        input: PathBuf,

        /// Where to write the enriched snapshot (defaults to overwriting the input)
        output: Option<PathBuf>,

        /// Recompute difficulty for words that already have one
        #[arg(long)]
        overwrite_difficulty: bool,

        /// JSON array of `{word_id, embedding}` records used to seed semantic-similar edges
        #[arg(long, value_name = "PATH")]
        embeddings: Option<PathBuf>,

        /// Cosine similarity an embedding pair must exceed
        #[arg(long, default_value_t = SEMANTIC_SIMILARITY_THRESHOLD)]
        similarity_threshold: f32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Commands that read the corpus
#[derive(Subcommand)]
enum QueryCommand {
    /// Show the unit overview graph
    Overview {
        /// Include links between units that share words
        #[arg(long)]
        bridges: bool,
    },

    /// Show the graph of one unit
    Unit {
        /// Unit code (e.g. "A")
        code: String,

        /// Include relationship links between the unit's words
        #[arg(long)]
        relationships: bool,
    },

    /// Show the neighborhood of one word
    Word {
        /// Word ID
        id: WordId,
    },

    /// Recommend words to learn next
    Recommend {
        /// Word ID the learner just studied
        id: WordId,

        /// Maximum number of recommendations (defaults to recommend.default_limit)
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Search words by transliteration, gloss or Arabic form
    Search {
        /// Text to look for
        query: String,

        #[arg(long, short, default_value = "20")]
        limit: usize,
    },

    /// Show corpus statistics
    Stats,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_files();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("kalima=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Query(query) => {
            let config = Config::load()?;
            config.validate()?;

            match &cli.snapshot {
                Some(path) => {
                    let repository = InMemoryCorpusRepository::load(path)?;
                    let service = CorpusService::from_config(Arc::new(repository), &config);
                    run_query(&service, query, cli.format, &config).await
                }
                None => {
                    let db = open_database(cli.database.as_deref(), &config).await?;
                    let repository = SqliteCorpusRepository::new(db.pool().clone());
                    let service = CorpusService::from_config(Arc::new(repository), &config);
                    let result = run_query(&service, query, cli.format, &config).await;
                    db.close().await;
                    result
                }
            }
        }

        Commands::Import { file } => {
            let config = Config::load()?;
            cmd_import(&file, cli.database.as_deref(), &config, cli.format, cli.quiet).await
        }

        Commands::Enrich {
            input,
            output,
            overwrite_difficulty,
            embeddings,
            similarity_threshold,
        } => {
            let mut options = EnrichmentOptions {
                overwrite_difficulty,
                similarity_threshold,
                ..EnrichmentOptions::default()
            };
            if let Some(path) = &embeddings {
                options.embeddings = load_embeddings(path)?;
            }
            cmd_enrich(&input, output.as_deref(), &options, cli.format, cli.quiet)
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),
    }
}

/// Load `.env.local` then `.env`; variables already set win
fn load_env_files() {
    for file in [".env.local", ".env"] {
        dotenvy::from_filename(file).ok();
    }
}

async fn open_database(explicit: Option<&Path>, config: &Config) -> anyhow::Result<Database> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config.database_path()?,
    };
    Database::open(path.clone())
        .await
        .with_context(|| format!("Failed to open corpus database: {}", path.display()))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Query Commands
// ============================================================================

async fn run_query<R: CorpusRepository>(
    service: &CorpusService<R>,
    query: QueryCommand,
    format: OutputFormat,
    config: &Config,
) -> anyhow::Result<()> {
    match query {
        QueryCommand::Overview { bridges } => {
            let graph = service.overview(bridges).await?;
            match format {
                OutputFormat::Json => print_json(&graph),
                OutputFormat::Text => {
                    print_graph(&graph);
                    Ok(())
                }
            }
        }

        QueryCommand::Unit {
            code,
            relationships,
        } => {
            let graph = service.unit_detail(&code, relationships).await?;
            match format {
                OutputFormat::Json => print_json(&graph),
                OutputFormat::Text => {
                    if graph.is_empty() {
                        println!("Unit {} has no sub-themes.", code.to_uppercase());
                    } else {
                        print_graph(&graph);
                    }
                    Ok(())
                }
            }
        }

        QueryCommand::Word { id } => {
            let focus = service.word_focus(id).await?;
            match format {
                OutputFormat::Json => print_json(&focus),
                OutputFormat::Text => {
                    print_graph(&focus.graph);
                    if focus.hidden_theme_mates > 0 {
                        println!("  (+{} more sub-theme mates not shown)", focus.hidden_theme_mates);
                    }
                    Ok(())
                }
            }
        }

        QueryCommand::Recommend { id, limit } => {
            let limit = limit.unwrap_or(config.recommend.default_limit);
            let recommendations = service.recommend(id, limit).await?;
            match format {
                OutputFormat::Json => print_json(&RecommendationsBody { recommendations }),
                OutputFormat::Text => {
                    let focal = service.require_word(id).await?;
                    print_recommendations(&focal, &recommendations);
                    Ok(())
                }
            }
        }

        QueryCommand::Search { query, limit } => {
            let words = service.search(&query, limit).await?;
            match format {
                OutputFormat::Json => print_json(&words),
                OutputFormat::Text => {
                    if words.is_empty() {
                        println!("No words match '{}'.", query);
                    }
                    for word in &words {
                        println!("{}", word_line(word));
                    }
                    Ok(())
                }
            }
        }

        QueryCommand::Stats => {
            let stats = service.stats().await?;
            match format {
                OutputFormat::Json => print_json(&stats),
                OutputFormat::Text => {
                    println!("Corpus");
                    println!("  Units:          {}", stats.units);
                    println!("  Sub-themes:     {}", stats.sub_themes);
                    println!("  Words:          {}", stats.words);
                    println!("  Memberships:    {}", stats.word_themes);
                    println!("  Relationships:  {}", stats.relationships);
                    for (relationship_type, count) in &stats.relationships_by_type {
                        println!("    {:<22} {}", relationship_type, count);
                    }
                    println!("  With root:      {}", stats.words_with_root);
                    println!("  With difficulty: {}", stats.words_with_difficulty);
                    Ok(())
                }
            }
        }
    }
}

fn word_line(word: &Word) -> String {
    let mut line = format!("[{}] {}", word.id, word.arabic);
    if let Some(transliteration) = &word.transliteration {
        line.push_str(&format!(" ({})", transliteration));
    }
    if let Some(gloss) = &word.gloss {
        line.push_str(&format!(" - {}", gloss));
    }
    if let Some(difficulty) = word.difficulty {
        line.push_str(&format!(" [difficulty {}]", difficulty));
    }
    line
}

fn print_graph(graph: &GraphData) {
    let units = graph.nodes_of_kind(NodeKind::Unit).count();
    let sub_themes = graph.nodes_of_kind(NodeKind::SubTheme).count();
    let words = graph.nodes_of_kind(NodeKind::Word).count();
    println!(
        "{} nodes ({} units, {} sub-themes, {} words), {} links",
        graph.nodes.len(),
        units,
        sub_themes,
        words,
        graph.links.len()
    );

    for node in &graph.nodes {
        let pin = if node.pinned { "*" } else { " " };
        match &node.arabic {
            Some(arabic) => println!("{} {:<12} {} {}", pin, node.id, node.label, arabic),
            None => println!("{} {:<12} {}", pin, node.id, node.label),
        }
    }

    for link in graph.links.iter().filter(|l| l.kind != LinkKind::Membership) {
        match link.count {
            Some(count) => println!(
                "  {} -- {} [{}, {} shared, weight {:.2}]",
                link.source,
                link.target,
                link.kind.as_str(),
                count,
                link.weight
            ),
            None => println!(
                "  {} -- {} [{}, weight {:.2}]",
                link.source,
                link.target,
                link.kind.as_str(),
                link.weight
            ),
        }
    }
}

fn print_recommendations(focal: &Word, recommendations: &[Recommendation]) {
    println!("After {}:", word_line(focal));
    if recommendations.is_empty() {
        println!("  No recommendations.");
        return;
    }
    for (rank, recommendation) in recommendations.iter().enumerate() {
        let reasons: Vec<&str> = recommendation.reasons.iter().map(|s| s.as_str()).collect();
        println!(
            "{:>3}. {} score {:.2} ({})",
            rank + 1,
            word_line(&recommendation.word),
            recommendation.score,
            reasons.join(", ")
        );
    }
}

// ============================================================================
// Corpus Maintenance
// ============================================================================

async fn cmd_import(
    snapshot_path: &Path,
    database: Option<&Path>,
    config: &Config,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let snapshot = CorpusSnapshot::load(snapshot_path)?;
    let db = open_database(database, config).await?;
    let repository = SqliteCorpusRepository::new(db.pool().clone());

    let report = repository.import_snapshot(&snapshot).await?;
    db.close().await;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text if !quiet => {
            println!("Imported {} into {}", snapshot_path.display(), db.path().display());
            println!("  Units:          {}", report.units);
            println!("  Sub-themes:     {}", report.sub_themes);
            println!("  Words:          {}", report.words);
            println!("  Memberships:    {}", report.word_themes);
            println!("  Relationships:  {}", report.relationships);
            if report.skipped_relationships > 0 {
                println!("  Skipped:        {} self-referencing", report.skipped_relationships);
            }
        }
        OutputFormat::Text => {}
    }
    Ok(())
}

fn cmd_enrich(
    input: &Path,
    output: Option<&Path>,
    options: &EnrichmentOptions,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    if !(0.0..=1.0).contains(&options.similarity_threshold) {
        anyhow::bail!(
            "--similarity-threshold must be between 0 and 1, got {}",
            options.similarity_threshold
        );
    }

    let mut snapshot = CorpusSnapshot::load(input)?;
    let report = enrich_snapshot(&mut snapshot, options);
    let output = output.unwrap_or(input);
    snapshot.save(output)?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text if !quiet => {
            println!("Enriched snapshot written to {}", output.display());
            println!("  Difficulties set:     {}", report.difficulties_set);
            println!("  Relationships added:  {}", report.relationships_added);
            for (relationship_type, count) in &report.relationships_by_type {
                println!("    {:<22} {}", relationship_type, count);
            }
        }
        OutputFormat::Text => {}
    }
    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            println!("{}", config.get(&key)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path()?.display());
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
