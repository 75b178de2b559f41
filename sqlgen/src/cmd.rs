use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use common::config::Settings;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sqlgen")]
#[command(about = "generate sql from natural-language prompts against stored database descriptions", long_about = None)]
pub struct Cli {
    /// Directory holding the schema store and query cache
    #[arg(long, global = true, env = "SQLGEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory accepted queries are written to
    #[arg(long, global = true, env = "SQLGEN_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Chat model name
    #[arg(long, global = true, env = "SQLGEN_MODEL")]
    model: Option<String>,

    /// Base url of the openai-compatible api
    #[arg(long, global = true, env = "SQLGEN_API_BASE")]
    api_base: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "SQLGEN_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Maximum attempts per generation when the service fails
    #[arg(long, global = true, env = "SQLGEN_MAX_ATTEMPTS")]
    max_attempts: Option<usize>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive prompt loop (default)
    Run,
    /// Inspect or edit stored database descriptions
    Schemas {
        #[command(subcommand)]
        subcommand: SchemaCommands,
    },
    /// Inspect or reset the prompt cache
    Cache {
        #[command(subcommand)]
        subcommand: CacheCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// List stored databases
    List,
    /// Rename and/or retype one column
    Edit {
        /// 1-based database number as shown by `schemas list`
        database: usize,
        schema: String,
        old_column: String,
        new_column: String,
        /// string, float, integer or date
        column_type: String,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// List cached prompts and queries
    List,
    /// Remove the entry for one prompt
    Forget { prompt: String },
    /// Remove every entry
    Clear,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::resolve(
            self.data_dir,
            self.output_dir,
            self.model,
            self.api_base,
            self.timeout_secs,
            self.max_attempts,
        );

        match self.command.unwrap_or(Commands::Run) {
            Commands::Run => run(&settings).await,
            Commands::Schemas { subcommand } => match subcommand {
                SchemaCommands::List => list_schemas(&settings),
                SchemaCommands::Edit {
                    database,
                    schema,
                    old_column,
                    new_column,
                    column_type,
                } => edit_schema(
                    &settings,
                    database,
                    &schema,
                    &old_column,
                    &new_column,
                    &column_type,
                ),
            },
            Commands::Cache { subcommand } => match subcommand {
                CacheCommands::List => list_cache(&settings),
                CacheCommands::Forget { prompt } => forget_prompt(&settings, &prompt),
                CacheCommands::Clear => clear_cache(&settings),
            },
        }
    }
}

/// load `KEY=value` lines from `path`, or from the nearest `.env` upwards of the
/// working directory; variables already set in the process win
pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    loaded.ok()
}

async fn run(settings: &Settings) -> Result<()> {
    use common::agent::QueryGenerator;
    use common::cache::QueryCache;
    use common::console::StdConsole;
    use common::credential::ApiKey;
    use common::llm::ChatClient;
    use common::schema::SchemaStore;
    use common::session::{run_interactive, GenerationSession};
    use std::sync::Arc;

    // credential is checked before anything interactive happens
    let api_key = ApiKey::from_env()?;

    let mut store = SchemaStore::open(settings.schema_path())
        .with_context(|| format!("failed to load {}", settings.schema_path().display()))?;
    let cache = QueryCache::open(settings.cache_path())
        .with_context(|| format!("failed to load {}", settings.cache_path().display()))?;

    let client = ChatClient::new(api_key, settings.model.clone())?;
    let generator = QueryGenerator::new(Arc::new(client), settings.max_attempts);

    tracing::info!(
        model = %settings.model.model,
        databases = store.len(),
        cached = cache.len(),
        "starting interactive session"
    );

    let mut session = GenerationSession::new(
        StdConsole::new(),
        cache,
        generator,
        settings.output_dir().to_path_buf(),
    );

    run_interactive(&mut store, &mut session).await?;
    Ok(())
}

fn list_schemas(settings: &Settings) -> Result<()> {
    let store = common::schema::SchemaStore::open(settings.schema_path())?;
    if store.is_empty() {
        println!("no stored databases");
        return Ok(());
    }
    for summary in store.list() {
        println!("{}", summary);
    }
    Ok(())
}

fn edit_schema(
    settings: &Settings,
    database: usize,
    schema: &str,
    old_column: &str,
    new_column: &str,
    column_type: &str,
) -> Result<()> {
    use common::schema::{ColumnType, SchemaStore};

    let column_type: ColumnType = column_type.parse()?;
    let mut store = SchemaStore::open(settings.schema_path())?;
    store.edit_column(database, schema, old_column, new_column, column_type)?;

    println!("updated {}.{} -> {} ({})", schema, old_column, new_column, column_type);
    Ok(())
}

fn list_cache(settings: &Settings) -> Result<()> {
    let cache = common::cache::QueryCache::open(settings.cache_path())?;
    if cache.is_empty() {
        println!("cache is empty");
        return Ok(());
    }
    for (prompt, query) in cache.entries() {
        println!("{}\n  {}\n", prompt, query.replace('\n', "\n  "));
    }
    Ok(())
}

fn forget_prompt(settings: &Settings, prompt: &str) -> Result<()> {
    let mut cache = common::cache::QueryCache::open(settings.cache_path())?;
    if cache.invalidate(prompt)? {
        println!("removed cached query for '{}'", prompt);
    } else {
        println!("no cached query for '{}'", prompt);
    }
    Ok(())
}

fn clear_cache(settings: &Settings) -> Result<()> {
    let mut cache = common::cache::QueryCache::open(settings.cache_path())?;
    let removed = cache.clear()?;
    println!("removed {} cached queries", removed);
    Ok(())
}
