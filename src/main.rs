use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tome_harvest::config::{
    default_config_path, find_config_file, get_config, load_config, Config, ConfigFile,
};
use tome_harvest::models::{Provider, ProviderBookId, ProviderSeriesId};
use tome_harvest::utils::{ClientRegistry, ReqwestTransport};
use tome_harvest::ProviderRegistry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tome Harvest - Fetch comic and manga metadata from external catalogs
#[derive(Parser, Debug)]
#[command(name = "tome-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch series and book metadata from external catalogs", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available metadata providers
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProviderArg {
    #[value(name = "kodansha")]
    Kodansha,
    #[value(name = "nautiljon")]
    Nautiljon,
}

impl From<ProviderArg> for Provider {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Kodansha => Provider::Kodansha,
            ProviderArg::Nautiljon => Provider::Nautiljon,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search a catalog for series by name
    #[command(alias = "s")]
    Search {
        /// Provider to query
        #[arg(value_enum)]
        provider: ProviderArg,

        /// Series name
        name: String,

        /// Maximum number of results
        #[arg(long, short, default_value_t = 10)]
        limit: usize,
    },

    /// Find the first series whose title matches and fetch its metadata
    #[command(alias = "m")]
    Match {
        /// Provider to query
        #[arg(value_enum)]
        provider: ProviderArg,

        /// Series name
        name: String,
    },

    /// Fetch series metadata by provider id
    Series {
        /// Provider to query
        #[arg(value_enum)]
        provider: ProviderArg,

        /// Provider-local series id
        series_id: String,
    },

    /// Fetch book metadata by provider ids
    Book {
        /// Provider to query
        #[arg(value_enum)]
        provider: ProviderArg,

        /// Provider-local series id
        series_id: String,

        /// Provider-local book id
        book_id: String,
    },

    /// List the providers enabled in this build and configuration
    Providers,

    /// Write a config file with default settings
    InitConfig {
        /// Where to write it (defaults to the standard config location)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    // Writing a fresh config must not depend on the current one parsing
    if let Commands::InitConfig { path, force } = cli.command {
        return init_config(path, force);
    }

    let config = resolve_config(cli.config.as_deref())?;

    let transport = Arc::new(
        ReqwestTransport::new(&config.http).context("failed to build HTTP transport")?,
    );
    let clients = ClientRegistry::from_config(&config, transport);
    let registry = ProviderRegistry::from_config(&config, &clients)?;

    match cli.command {
        Commands::Search {
            provider,
            name,
            limit,
        } => {
            let results = registry
                .get_required(provider.into())?
                .search_series(&name, limit)
                .await?;
            print_json(&results)?;
        }
        Commands::Match { provider, name } => {
            let matched = registry
                .get_required(provider.into())?
                .match_series_metadata(&name)
                .await?;
            match matched {
                Some(series) => print_json(&series)?,
                None => eprintln!("No match for '{}'", name),
            }
        }
        Commands::Series {
            provider,
            series_id,
        } => {
            let series = registry
                .get_required(provider.into())?
                .get_series_metadata(&ProviderSeriesId::new(series_id))
                .await?;
            print_json(&series)?;
        }
        Commands::Book {
            provider,
            series_id,
            book_id,
        } => {
            let book = registry
                .get_required(provider.into())?
                .get_book_metadata(
                    &ProviderSeriesId::new(series_id),
                    &ProviderBookId::new(book_id),
                )
                .await?;
            print_json(&book)?;
        }
        Commands::Providers => {
            for provider in registry.all() {
                let id = provider.provider_name();
                println!("{:<12} {}", id.id(), id.name());
            }
        }
        Commands::InitConfig { path, force } => init_config(path, force)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tome_harvest={}", level)),
    );

    // Logs go to stderr so stdout stays parseable JSON
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(explicit: Option<&std::path::Path>) -> Result<Config> {
    match find_config_file(explicit) {
        Some(path) => {
            tracing::info!("Using config file: {}", path.display());
            load_config(&path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        }
        None => get_config().context("failed to read configuration from environment"),
    }
}

fn init_config(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path
        .or_else(default_config_path)
        .context("no standard config directory on this platform; pass --path")?;

    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    ConfigFile::save(&Config::default(), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
