use std::path::PathBuf;

use clap::{Parser, Subcommand};
use duml::model::format::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "duml")]
#[command(version, about = "Parse and inspect DUML files", long_about = None)]
pub struct Cli {
    /// Config file to load instead of the platform default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Trim whitespace around values
    #[arg(long, global = true)]
    pub trim: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse files and print the resulting documents
    Parse {
        /// Files to parse (`-` reads stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Do not report lost nodes
        #[arg(long)]
        no_lost: bool,
    },

    /// Parse every DUML file under the given paths and report problems
    Check {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Parse a file and print it back as normalized DUML
    Render {
        /// File to render (`-` reads stdin)
        file: PathBuf,
    },

    /// Reparse and print a file every time it changes
    Watch {
        /// File to watch
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_format_and_global_flags() {
        let cli = Cli::try_parse_from(["duml", "parse", "a.duml", "b.duml", "--format", "tree", "--trim"])
            .unwrap();
        assert!(cli.trim);
        match cli.command {
            Command::Parse {
                files,
                format,
                no_lost,
            } => {
                assert_eq!(files, vec![PathBuf::from("a.duml"), PathBuf::from("b.duml")]);
                assert_eq!(format, Some(OutputFormat::Tree));
                assert!(!no_lost);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_requires_a_path() {
        assert!(Cli::try_parse_from(["duml", "check"]).is_err());
    }
}
