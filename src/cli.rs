//! Command-line interface definitions.

use crate::tui::BANNER;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dirsort")]
#[command(about = "Sort a directory into category folders, normalize names and unpack archives")]
#[command(before_help = BANNER)]
#[command(version)]
pub struct Args {
    /// Directory to sort in place (e.g. "/home/me/Downloads")
    #[arg(short, long)]
    pub source: PathBuf,

    /// Answer the "create empty folders" question up front instead of being prompted
    #[arg(long, value_enum)]
    pub create_empty: Option<Answer>,

    /// Use this config file instead of ~/.config/dirsort/config.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    #[value(name = "y", alias = "yes")]
    Yes,
    #[value(name = "n", alias = "no")]
    No,
}

impl From<Answer> for bool {
    fn from(answer: Answer) -> bool {
        answer == Answer::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_source() {
        let args = Args::try_parse_from(["dirsort", "-s", "/tmp/data"]).unwrap();
        assert_eq!(args.source, PathBuf::from("/tmp/data"));
        assert_eq!(args.create_empty, None);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_parse_long_options() {
        let args = Args::try_parse_from([
            "dirsort",
            "--source",
            "/tmp/data",
            "--create-empty",
            "yes",
            "--config",
            "/tmp/c.toml",
        ])
        .unwrap();
        assert_eq!(args.create_empty, Some(Answer::Yes));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_source_is_required() {
        assert!(Args::try_parse_from(["dirsort"]).is_err());
    }

    #[test]
    fn test_answer_into_bool() {
        assert!(bool::from(Answer::Yes));
        assert!(!bool::from(Answer::No));
    }
}
