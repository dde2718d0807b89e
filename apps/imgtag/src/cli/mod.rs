//! # imgtag CLI Module
//!
//! This module implements the CLI interface for imgtag.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show catalog counts
//! - `init` - Initialize a new catalog database
//! - `import` - Load images and tag entries from a JSON dataset
//! - `list` - Print one listing page
//! - `sample` - Run a tag sample

mod commands;

use crate::config::AppConfig;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// imgtag - image catalog with tag-based sampling
///
/// Serves paginated image metadata and resolves tag lists to shuffled,
/// deduplicated pages of image records.
#[derive(Parser, Debug)]
#[command(name = "imgtag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the catalog database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Tag matching: "case-insensitive" or "exact"
    #[arg(long, global = true)]
    pub tag_match: Option<String>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Dataset to load before serving (required to serve anything from the memory backend)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Show catalog status
    Status,

    /// Initialize a new empty database
    Init {
        /// Overwrite an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Import images and tag entries from a JSON dataset
    Import {
        /// Path to the dataset file
        #[arg(short, long)]
        file: PathBuf,

        /// Build tag entries from each record's own tags
        #[arg(long)]
        derive_tags: bool,
    },

    /// Print one page of the image listing
    List {
        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<u64>,

        /// Print every record instead of one page
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Sample images carrying any of the given tags
    Sample {
        /// Tags to look up (comma-separated)
        #[arg(short, long, value_delimiter = ',', required = true)]
        tags: Vec<String>,

        /// Page number, starting at 1
        #[arg(short, long)]
        page: Option<u64>,

        /// Shuffle seed (defaults to the current Unix time in seconds)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Keep store order instead of shuffling
        #[arg(long, conflicts_with = "seed")]
        no_shuffle: bool,
    },
}

impl Cli {
    /// Configuration after applying file, environment and global flags.
    pub fn resolve_config(&self) -> Result<AppConfig, AppError> {
        self.apply_flags(AppConfig::load(self.config.as_deref())?)
    }

    /// Apply the global flags on top of an already loaded configuration.
    pub fn apply_flags(&self, mut config: AppConfig) -> Result<AppConfig, AppError> {
        if let Some(database) = &self.database {
            config.database.clone_from(database);
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.parse()?;
        }
        if let Some(mode) = &self.tag_match {
            config.tag_match = mode
                .parse()
                .map_err(|e| AppError::Config(format!("{}", e)))?;
        }
        Ok(config)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let config = cli.resolve_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server {
            host,
            port,
            dataset,
        }) => {
            let mut config = config;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            cmd_server(&config, dataset.as_deref()).await
        }
        Some(Commands::Status) => cmd_status(&config, json_mode),
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::Import { file, derive_tags }) => {
            cmd_import(&config, json_mode, &file, derive_tags)
        }
        Some(Commands::List { page, all }) => cmd_list(&config, json_mode, page, all),
        Some(Commands::Sample {
            tags,
            page,
            seed,
            no_shuffle,
        }) => cmd_sample(&config, json_mode, tags, page, seed, no_shuffle),
        None => cmd_status(&config, json_mode),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::BackendKind;
    use imgtag_core::TagMatch;

    #[test]
    fn sample_tags_split_on_commas() {
        let cli = Cli::try_parse_from(["imgtag", "sample", "--tags", "sunset,beach", "--seed", "7"])
            .unwrap();
        match cli.command {
            Some(Commands::Sample { tags, seed, .. }) => {
                assert_eq!(tags, vec!["sunset".to_string(), "beach".to_string()]);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn seed_conflicts_with_no_shuffle() {
        let result = Cli::try_parse_from([
            "imgtag",
            "sample",
            "--tags",
            "a",
            "--seed",
            "1",
            "--no-shuffle",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "imgtag",
            "-B",
            "memory",
            "--tag-match",
            "exact",
            "-D",
            "other.redb",
            "status",
        ])
        .unwrap();
        let env = |key: &str| match key {
            "IMGTAG_BACKEND" => Some("redb".to_string()),
            "IMGTAG_TAG_MATCH" => Some("case-insensitive".to_string()),
            "IMGTAG_DATABASE" => Some("env.redb".to_string()),
            _ => None,
        };
        let from_env = AppConfig::default().with_env(env).unwrap();
        assert_eq!(from_env.backend, BackendKind::Redb);

        let config = cli.apply_flags(from_env).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.tag_match, TagMatch::Exact);
        assert_eq!(config.database, PathBuf::from("other.redb"));
    }

    #[test]
    fn absent_flags_keep_loaded_config() {
        let cli = Cli::try_parse_from(["imgtag", "status"]).unwrap();
        let loaded = AppConfig::default()
            .with_env(|key| (key == "IMGTAG_DATABASE").then(|| "env.redb".to_string()))
            .unwrap();
        let config = cli.apply_flags(loaded).unwrap();
        assert_eq!(config.database, PathBuf::from("env.redb"));
        assert_eq!(config.backend, AppConfig::default().backend);
    }

    #[test]
    fn bad_backend_flag_is_config_error() {
        let cli = Cli::try_parse_from(["imgtag", "-B", "mongo", "status"]).unwrap();
        assert!(matches!(
            cli.apply_flags(AppConfig::default()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn list_all_conflicts_with_page() {
        assert!(Cli::try_parse_from(["imgtag", "list", "--all", "--page", "2"]).is_err());
        let cli = Cli::try_parse_from(["imgtag", "list", "--all"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { all: true, page: None })));
    }
}
