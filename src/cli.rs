//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

use crate::core::config::{DEFAULT_AUTH_CONFIG_PATH, DEFAULT_CONFIG_PATH};

/// Launcher API archiver - polls launcher endpoints, diffs and mirrors assets
#[derive(Parser, Debug)]
#[command(name = "launcher-archive")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level of this crate; `RUST_LOG` takes precedence
    #[arg(long, global = true, default_value = "info", env = "LAUNCHER_ARCHIVE_LOG_LEVEL")]
    pub log_level: Level,

    /// Configuration file, created with defaults when missing
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Credentials for the mirror sinks
    #[arg(long, global = true, default_value = DEFAULT_AUTH_CONFIG_PATH)]
    pub auth_config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Fetch every target, update the archive, mirror new binaries and
    /// regenerate the markdown listings
    Archive {
        /// Archive root
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_defaults() {
        let cli = Cli::try_parse_from(["launcher-archive", "archive"]).unwrap();
        assert_eq!(cli.log_level, Level::INFO);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(
            cli.command,
            Commands::Archive {
                output_dir: PathBuf::from("output")
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "launcher-archive",
            "archive",
            "-o",
            "/tmp/out",
            "--log-level",
            "trace",
        ])
        .unwrap();
        assert_eq!(cli.log_level, Level::TRACE);
        assert_eq!(
            cli.command,
            Commands::Archive {
                output_dir: PathBuf::from("/tmp/out")
            }
        );
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["launcher-archive"]).is_err());
    }
}
