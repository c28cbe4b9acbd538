//! bops CLI
//!
//! Entry point for the `bops` command-line tool.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing::Level;

use bops::config::{redact_secrets, CACHE_PREFIX, CACHE_SUFFIX};
use bops::error_handler::ErrorHandler;
use bops::filesystem::Filesystem;
use bops::logging::{self, LogStream};
use bops::{Bootstrap, DirectoryNavigator, Navigator};

#[derive(Parser)]
#[command(name = "bops")]
#[command(about = "Application bootstrap and configuration inspector", version)]
struct Cli {
    /// Log at debug level
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log destination: stdout, stderr or file:<path>
    #[arg(long, global = true, default_value = "stderr")]
    log_stream: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged configuration as JSON
    Config {
        /// Project root (default: current directory)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,

        /// Environment name (overrides BOPS_ENVIRONMENT)
        #[arg(long, short = 'e')]
        env: Option<String>,

        /// Only print the value at this dotted path
        #[arg(long, short = 'k')]
        key: Option<String>,

        /// Print secret values instead of masking them
        #[arg(long)]
        show_secrets: bool,
    },

    /// List registered services
    Services {
        /// Project root (default: current directory)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,

        /// Environment name (overrides BOPS_ENVIRONMENT)
        #[arg(long, short = 'e')]
        env: Option<String>,
    },

    /// Config cache management
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Delete generated config cache files
    Clear {
        /// Project root (default: current directory)
        #[arg(long, short = 'r')]
        root: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let stream = match cli.log_stream.parse::<LogStream>() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    if let Err(e) = logging::init(&stream, level) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(2);
    }
    ErrorHandler::install_panic_hook();

    match cli.command {
        Commands::Config {
            root,
            env,
            key,
            show_secrets,
        } => run_config(root, env, key, show_secrets),
        Commands::Services { root, env } => run_services(root, env),
        Commands::Cache { action } => match action {
            CacheCommands::Clear { root } => run_cache_clear(root),
        },
    }
}

fn navigator(root: Option<PathBuf>) -> DirectoryNavigator {
    DirectoryNavigator::new(root.unwrap_or_else(|| PathBuf::from(".")))
}

fn bootstrap(root: Option<PathBuf>, env: Option<String>) -> Bootstrap {
    let mut builder = Bootstrap::builder(navigator(root));
    if let Some(env) = env {
        builder = builder.environment(env);
    }
    match builder.build() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Bootstrap failed: {}", e);
            process::exit(1);
        }
    }
}

fn run_config(root: Option<PathBuf>, env: Option<String>, key: Option<String>, show_secrets: bool) {
    let app = bootstrap(root, env);
    let Some(config) = app.config() else {
        eprintln!("Configuration service is not registered");
        process::exit(1);
    };

    let mut value = match key.as_deref() {
        Some(path) => match config.get(path) {
            Some(v) => v.clone(),
            None => {
                eprintln!("No configuration value at '{}'", path);
                process::exit(1);
            }
        },
        None => config.to_value(),
    };

    if !show_secrets {
        redact_secrets(&mut value);
    }

    match serde_json::to_string_pretty(&value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_services(root: Option<PathBuf>, env: Option<String>) {
    let app = bootstrap(root, env);
    println!("Environment: {}", app.environment().name());
    for file in app.environment().loaded_files() {
        println!("  loaded {}", file.display());
    }
    println!();
    println!("Services:");
    for name in app.container().names() {
        println!("  {}", name);
    }
}

fn run_cache_clear(root: Option<PathBuf>) {
    let nav = navigator(root);
    let cache = Filesystem::rooted(nav.config_cache_dir());

    let mut removed = 0;
    for file in cache.list_files() {
        let Some(name) = file.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let generated = name
            .strip_suffix(".json")
            .is_some_and(|stem| stem.starts_with(CACHE_PREFIX) && stem.ends_with(CACHE_SUFFIX));
        if !generated {
            continue;
        }
        match cache.delete(&file) {
            Ok(true) => {
                println!("removed {}", cache.root().join(&file).display());
                removed += 1;
            }
            Ok(false) => {}
            Err(e) => {
                eprintln!("Failed to remove {}: {}", file.display(), e);
                process::exit(1);
            }
        }
    }

    if removed == 0 {
        println!("No config cache files in {}", cache.root().display());
    }
}
