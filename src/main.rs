/// Version injected at compile time via HOLONET_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("HOLONET_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use holonet::config::{validate_api_uri, Config};
use holonet::resource::{Reference, Resource, ResourceKind, ResourceStore, StoreOptions, Stores};
use holonet::swapi::{SwapiClient, SwapiHttpClient};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

/// Browse the Star Wars API from the terminal
#[derive(Parser, Debug)]
#[command(name = "holonet", version, about, long_about = None)]
struct Args {
    /// API root (overrides HOLONET_API_URI and the config file)
    #[arg(long, global = true)]
    api_uri: Option<String>,

    /// Parallel requests per reference field
    #[arg(short, long, global = true)]
    concurrency: Option<usize>,

    /// Follow pagination links when listing
    #[arg(long, global = true)]
    all_pages: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every entity of a kind
    List {
        /// films, people, planets or vehicles
        kind: ResourceKind,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one entity and resolve what it references
    Show {
        /// films, people, planets or vehicles
        kind: ResourceKind,
        /// Numeric id, as in `.../people/<id>/`
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print or update the saved configuration
    Config {
        /// Save a new API root
        #[arg(long = "set-api-uri")]
        set_api_uri: Option<String>,
        /// Save a new default concurrency
        #[arg(long = "set-concurrency")]
        set_concurrency: Option<usize>,
        /// Save whether listing follows pagination
        #[arg(long = "set-follow-pages")]
        set_follow_pages: Option<bool>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not open log file {:?}: {}", log_path, e);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env("HOLONET_LOG")
        .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("holonet {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("holonet").join("holonet.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".holonet").join("holonet.log");
    }
    PathBuf::from("holonet.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();

    if let Command::Config {
        set_api_uri,
        set_concurrency,
        set_follow_pages,
    } = &args.command
    {
        return run_config(
            &mut config,
            set_api_uri.as_deref(),
            *set_concurrency,
            *set_follow_pages,
        );
    }

    let api_uri = match &args.api_uri {
        Some(uri) => validate_api_uri(uri)?,
        None => validate_api_uri(&config.effective_api_uri())
            .context("Configured API URI is invalid; fix it with `holonet config --set-api-uri`")?,
    };
    let concurrency = args
        .concurrency
        .filter(|n| *n > 0)
        .unwrap_or_else(|| config.effective_concurrency());
    let options = StoreOptions {
        follow_pages: args.all_pages || config.effective_follow_pages(),
    };

    tracing::info!("Using API root: {}, concurrency: {}", api_uri, concurrency);

    let client = SwapiClient::new(&api_uri)?;
    let stores = Stores::new(&client, options);

    match args.command {
        Command::List { kind, json } => match kind {
            ResourceKind::Film => list(&stores, &stores.films, json).await,
            ResourceKind::Person => list(&stores, &stores.people, json).await,
            ResourceKind::Planet => list(&stores, &stores.planets, json).await,
            ResourceKind::Vehicle => list(&stores, &stores.vehicles, json).await,
        },
        Command::Show { kind, id, json } => match kind {
            ResourceKind::Film => show(&stores, &stores.films, &id, concurrency, json).await,
            ResourceKind::Person => show(&stores, &stores.people, &id, concurrency, json).await,
            ResourceKind::Planet => show(&stores, &stores.planets, &id, concurrency, json).await,
            ResourceKind::Vehicle => show(&stores, &stores.vehicles, &id, concurrency, json).await,
        },
        Command::Config { .. } => Ok(()),
    }
}

fn run_config(
    config: &mut Config,
    api_uri: Option<&str>,
    concurrency: Option<usize>,
    follow_pages: Option<bool>,
) -> Result<()> {
    if let Some(uri) = api_uri {
        config.set_api_uri(uri)?;
    }
    if let Some(n) = concurrency {
        config.set_concurrency(n)?;
    }
    if let Some(follow) = follow_pages {
        config.set_follow_pages(follow)?;
    }

    println!("api_uri      = {}", config.effective_api_uri());
    println!("concurrency  = {}", config.effective_concurrency());
    println!("follow_pages = {}", config.effective_follow_pages());
    Ok(())
}

async fn list<T: Resource>(
    stores: &Stores,
    store: &ResourceStore<T, SwapiHttpClient>,
    json: bool,
) -> Result<()> {
    let items = store.list_all().await;

    if let Some(err) = stores.error(T::KIND) {
        return Err(anyhow!(err));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    println!("{} ({})", T::KIND.display_name(), items.len());
    for item in &items {
        let id = holonet::resource::resource_id(item.url())
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:>4}  {}", id, item.display_name());
    }
    Ok(())
}

async fn show<T: Resource>(
    stores: &Stores,
    store: &ResourceStore<T, SwapiHttpClient>,
    id: &str,
    concurrency: usize,
    json: bool,
) -> Result<()> {
    let (entity, resolution) = stores.load_detail(store, id, concurrency).await;

    let Some(entity) = entity else {
        let err = stores
            .error(T::KIND)
            .unwrap_or_else(|| format!("{} {} not found", T::KIND, id));
        return Err(anyhow!(err));
    };

    resolution.settled().await;

    let references = entity.references();
    let kinds: Vec<ResourceKind> = references.iter().map(Reference::kind).collect();

    if json {
        let mut value = serde_json::to_value(&entity)?;
        if let Some(map) = value.as_object_mut() {
            let resolved: serde_json::Map<String, serde_json::Value> = references
                .iter()
                .map(|r| (r.label().to_lowercase(), serde_json::json!(stores.labels(r))))
                .collect();
            map.insert("resolved".to_string(), serde_json::Value::Object(resolved));
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", entity.display_name());
        println!("{}", entity.url());
        for reference in &references {
            let labels = stores.labels(reference);
            if labels.is_empty() {
                println!("  {}: -", reference.label());
            } else {
                println!("  {}: {}", reference.label(), labels.join(", "));
            }
        }
    }

    if let Some(err) = stores.first_error(&kinds) {
        eprintln!("warning: {}", err);
    }
    Ok(())
}
