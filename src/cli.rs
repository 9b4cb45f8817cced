use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to markdown file
    #[clap(short, long)]
    pub input: PathBuf,

    /// Path to output epub file
    #[clap(short, long)]
    pub output: PathBuf,

    /// Overwrite existing epub file
    #[clap(short = 'f', long)]
    pub overwrite: bool,

    /// Title of the book (defaults to the first `# ` heading, then the filename)
    #[clap(short, long)]
    pub title: Option<String>,

    /// Author of the book
    #[clap(short, long)]
    pub author: Option<String>,

    /// Language code (e.g., en, ja, zh) [default: en]
    #[clap(short, long)]
    pub language: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate epub file from the specified markdown file
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// Config file (defaults to md2epub.toml in the current directory, if present)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v for info, -vv for debug); RUST_LOG takes precedence
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn can_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn can_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "md2epub", "generate", "-i", "book.md", "-o", "book.epub", "-f", "-t", "Custom", "-a",
            "Jane Doe", "-l", "ja",
        ])
        .expect("can parse flags");

        let Commands::Generate(args) = cli.command;
        assert_eq!(args.input, PathBuf::from("book.md"));
        assert_eq!(args.output, PathBuf::from("book.epub"));
        assert!(args.overwrite);
        assert_eq!(args.title.as_deref(), Some("Custom"));
        assert_eq!(args.author.as_deref(), Some("Jane Doe"));
        assert_eq!(args.language.as_deref(), Some("ja"));
    }

    #[test]
    fn can_parse_long_flags_with_defaults() {
        let cli = Cli::try_parse_from([
            "md2epub",
            "generate",
            "--input",
            "notes.md",
            "--output",
            "notes.epub",
        ])
        .expect("can parse flags");

        assert!(cli.config.is_none());
        assert_eq!(cli.verbose, 0);
        let Commands::Generate(args) = cli.command;
        assert!(!args.overwrite);
        assert!(args.title.is_none());
        assert!(args.author.is_none());
        assert!(args.language.is_none());
    }

    #[test]
    fn rejects_missing_required_flags() {
        assert!(Cli::try_parse_from(["md2epub", "generate", "-i", "book.md"]).is_err());
        assert!(Cli::try_parse_from(["md2epub", "generate", "-o", "book.epub"]).is_err());
    }

    #[test]
    fn can_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "md2epub",
            "generate",
            "-i",
            "a.md",
            "-o",
            "a.epub",
            "--config",
            "custom.toml",
            "-vv",
        ])
        .expect("can parse flags");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.verbose, 2);
    }
}
