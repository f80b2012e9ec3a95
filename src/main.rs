use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use paddock::buffered_eprintln;
use paddock::config::Config;
use paddock::fetch::AnalysisRequest;
use paddock::provider::{cache, CacheConfig, JolpicaClient, ResponseCache, SessionKind};
use paddock::scoring::ScoringStrategy;
use paddock::{EXIT_CONFIG, EXIT_FAILURE, EXIT_NETWORK, EXIT_SUCCESS};

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive dashboard (default if no subcommand)
    Dashboard,
    /// List the rounds of a season
    Races {
        /// Season year (must be one of the configured seasons)
        #[arg(long)]
        season: Option<u16>,
    },
    /// Results table, position deltas and best performer for one session
    Analyze {
        /// Event name as listed by `races`, or its round number
        event: String,
        #[arg(long)]
        season: Option<u16>,
        #[arg(long, value_enum)]
        session: Option<SessionKind>,
        #[arg(long, value_enum)]
        strategy: Option<ScoringStrategy>,
        /// Number of rows in the results table
        #[arg(long)]
        top: Option<usize>,
    },
    /// Head-to-head of two drivers in one session
    Compare {
        event: String,
        /// Full name of the first driver, e.g. "Max Verstappen"
        driver_a: String,
        /// Full name of the second driver
        driver_b: String,
        #[arg(long)]
        season: Option<u16>,
        #[arg(long, value_enum)]
        session: Option<SessionKind>,
    },
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Remove all cached provider responses
    Clear,
}

#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(about = "Race results, position deltas and head-to-heads in the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/paddock/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Always fetch from the provider, bypassing the response cache
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    paddock::stderr_buffer::init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Dashboard);
    let start_time = Instant::now();
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before loading, so a broken config file can be replaced
    if let Commands::Init { force } = command {
        let path = config_path.unwrap_or_else(paddock::config::get_config_path);
        if let Err(e) = paddock::config::write_default_config(&path, force) {
            buffered_eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
        println!("Wrote default config to {}", path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    // Load config
    let config = match paddock::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            buffered_eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if let Err(errors) = paddock::config::validate_config(&config) {
        buffered_eprintln!("Config errors:");
        for error in errors {
            buffered_eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let cache_path = config.cache_dir.clone().unwrap_or_else(cache::get_cache_path);

    if let Commands::Cache { action: CacheAction::Clear } = command {
        if let Err(e) = cache::clear_cache(&cache_path) {
            buffered_eprintln!("Failed to clear cache: {:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
        println!("Cleared cache at {}", cache_path.display());
        std::process::exit(EXIT_SUCCESS);
    }

    let cache_config = CacheConfig {
        enabled: !cli.no_cache,
    };
    let client = match create_client(&config, &cache_config, cache_path) {
        Ok(c) => c,
        Err(e) => {
            buffered_eprintln!("Failed to create provider client: {:#}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    let use_colors = paddock::output::should_use_colors();

    match command {
        Commands::Dashboard => {
            // Detect the background before raw mode takes over the terminal
            let theme = paddock::tui::resolve_theme();
            let app = paddock::tui::App::new(&config, paddock::tui::ThemeColors::for_theme(theme));
            if let Err(e) = paddock::tui::run_tui(app, &client).await {
                buffered_eprintln!("TUI error: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::Races { season } => {
            let season = season_or_exit(&config, season);
            match paddock::fetch::load_calendar(&client, season).await {
                Ok(events) => println!("{}", paddock::output::format_calendar(&events, use_colors)),
                Err(e) => {
                    buffered_eprintln!("Warning: {}", e);
                    std::process::exit(e.exit_code());
                }
            }
        }
        Commands::Analyze {
            event,
            season,
            session,
            strategy,
            top,
        } => {
            let request = AnalysisRequest {
                season: season_or_exit(&config, season),
                event,
                session: session.unwrap_or(config.session),
                strategy: strategy.unwrap_or(config.strategy),
            };
            let analysis = match paddock::fetch::analyze_race(&client, &request).await {
                Ok(a) => a,
                Err(e) => {
                    buffered_eprintln!("Error: {}", e);
                    std::process::exit(e.exit_code());
                }
            };

            let top_n = top.unwrap_or(config.top_n);
            println!("{}", paddock::output::format_analysis(&analysis, top_n, use_colors));

            if cli.verbose {
                eprintln!();
                eprintln!("Score breakdown (ranked):");
                for scored in analysis.ranked() {
                    eprintln!("{}", scored.row.full_name);
                    eprintln!("{}", paddock::output::format_breakdown(&scored.score));
                }
            }
        }
        Commands::Compare {
            event,
            driver_a,
            driver_b,
            season,
            session,
        } => {
            let request = AnalysisRequest {
                season: season_or_exit(&config, season),
                event,
                session: session.unwrap_or(config.session),
                strategy: config.strategy,
            };
            let result = match paddock::fetch::analyze_race(&client, &request).await {
                Ok(analysis) => analysis.compare(&driver_a, &driver_b),
                Err(e) => Err(e),
            };
            match result {
                Ok(h2h) => println!("{}", paddock::output::format_comparison(&h2h, use_colors)),
                Err(e) => {
                    buffered_eprintln!("Error: {}", e);
                    std::process::exit(e.exit_code());
                }
            }
        }
        // Handled before the client is built
        Commands::Init { .. } | Commands::Cache { .. } => {}
    }

    if cli.verbose {
        eprintln!("Done in {:?}", start_time.elapsed());
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Build the provider client, with the response cache unless disabled
fn create_client(
    config: &Config,
    cache_config: &CacheConfig,
    cache_path: PathBuf,
) -> anyhow::Result<JolpicaClient> {
    let cache = if cache_config.enabled {
        match ResponseCache::open(cache_path) {
            Ok(c) => Some(c),
            Err(e) => {
                // Run uncached rather than fail
                tracing::warn!("response cache unavailable: {:#}", e);
                None
            }
        }
    } else {
        tracing::debug!("response cache disabled (--no-cache)");
        None
    };

    let timeout = config.provider.timeout_duration()?;
    Ok(JolpicaClient::new(config.provider.base_url.clone(), timeout, cache)?)
}

/// Season from the flag or the config default; must be a configured season
fn season_or_exit(config: &Config, season: Option<u16>) -> u16 {
    let season = season.unwrap_or(config.default_season);
    if !config.seasons.contains(&season) {
        let listed: Vec<String> = config.seasons.iter().map(|s| s.to_string()).collect();
        buffered_eprintln!(
            "Season {} is not configured. Choose one of: {}",
            season,
            listed.join(", ")
        );
        std::process::exit(EXIT_CONFIG);
    }
    season
}
