//! Core CLI definitions

use clap::{ArgAction, Args, Parser, Subcommand};
use gearcat::{AlignmentPolicy, OutputFormat};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gearcat")]
#[command(about = "Equipment set catalog builder", long_about = None)]
pub struct Cli {
    /// Increase log output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "GEARCAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where tier exports are read from and how they are aligned
#[derive(Args, Clone, Debug, Default)]
pub struct SourceArgs {
    /// Directory containing one subdirectory per equipment set
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Item alignment policy (identifier, positional)
    #[arg(short, long)]
    pub alignment: Option<AlignmentPolicy>,

    /// Use positional alignment for this set directory (repeatable)
    #[arg(long, value_name = "SET_DIR")]
    pub positional: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rebuild the catalog from every set's tier exports
    #[command(visible_alias = "r")]
    Rebuild {
        #[command(flatten)]
        source: SourceArgs,

        /// Output file (uses configured default if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output layout (catalog, gear)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Refresh set effects from Base exports, keeping prior item lists
    #[command(visible_alias = "e")]
    Effects {
        /// Directory containing one subdirectory per equipment set
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Prior catalog to take item lists from (defaults to the output file)
        #[arg(short, long)]
        prior: Option<PathBuf>,

        /// Output file (uses configured default if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not attempt to repair a truncated prior catalog
        #[arg(long)]
        strict: bool,
    },

    /// Reconcile one set and print it as JSON
    #[command(visible_alias = "s")]
    Show {
        /// Set directory name under the root
        set_dir: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output layout (catalog, gear)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set default source root
        #[arg(long)]
        root: Option<PathBuf>,

        /// Set default output file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Set default prior catalog
        #[arg(long)]
        prior: Option<PathBuf>,

        /// Set default alignment policy
        #[arg(long)]
        alignment: Option<AlignmentPolicy>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rebuild() {
        let cli = Cli::try_parse_from([
            "gearcat",
            "rebuild",
            "--root",
            "Equipment/Lv70",
            "--alignment",
            "positional",
            "--positional",
            "Legacy",
            "-f",
            "gear",
        ])
        .unwrap();

        match cli.command {
            Commands::Rebuild {
                source,
                output,
                format,
            } => {
                assert_eq!(source.root, Some(PathBuf::from("Equipment/Lv70")));
                assert_eq!(source.alignment, Some(AlignmentPolicy::Positional));
                assert_eq!(source.positional, vec!["Legacy".to_string()]);
                assert_eq!(output, None);
                assert_eq!(format, Some(OutputFormat::Gear));
            }
            _ => panic!("expected rebuild"),
        }
    }

    #[test]
    fn test_parse_effects_alias() {
        let cli = Cli::try_parse_from(["gearcat", "e", "--strict", "-p", "old.json"]).unwrap();
        match cli.command {
            Commands::Effects { prior, strict, .. } => {
                assert_eq!(prior, Some(PathBuf::from("old.json")));
                assert!(strict);
            }
            _ => panic!("expected effects"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["gearcat", "show", "Aurora", "-vv", "--config", "c.toml"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn test_rejects_unknown_alignment() {
        assert!(Cli::try_parse_from(["gearcat", "rebuild", "--alignment", "fuzzy"]).is_err());
    }
}
