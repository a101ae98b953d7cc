use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::zettel::OutputMode;

#[derive(Parser, Debug)]
#[command(
    name = "zettel2latex",
    version,
    about = "Convert zettelkasten notes to LaTeX-flavoured Markdown"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Convert(ConvertArgs),
    Inventory(InventoryArgs),
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ArchiveArgs {
    /// Directory holding the note files.
    #[arg(long = "archive", env = "PHI_ARCHIVE")]
    pub archive_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Keep per-note front matter and heading levels instead of book chapters.
    #[arg(short = 's', long = "stand-alone", default_value_t = false)]
    pub stand_alone: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(required = true)]
    pub zettel_ids: Vec<String>,
}

impl ConvertArgs {
    pub fn mode(&self) -> OutputMode {
        if self.stand_alone {
            OutputMode::Standalone
        } else {
            OutputMode::Book
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub archive: ArchiveArgs,

    /// Notes to check; every note in the archive when omitted.
    pub zettel_ids: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_defaults_to_book_mode() {
        let cli = Cli::try_parse_from(["zettel2latex", "convert", "--archive", "/notes", "123"])
            .expect("arguments parse");
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.mode(), OutputMode::Book);
        assert_eq!(args.zettel_ids, vec!["123".to_string()]);
        assert_eq!(args.archive.archive_root, PathBuf::from("/notes"));
    }

    #[test]
    fn convert_stand_alone_flag_selects_standalone_mode() {
        let cli = Cli::try_parse_from([
            "zettel2latex",
            "convert",
            "--archive",
            "/notes",
            "-s",
            "123",
            "456",
        ])
        .expect("arguments parse");
        let Commands::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.mode(), OutputMode::Standalone);
        assert_eq!(args.zettel_ids.len(), 2);
    }

    #[test]
    fn convert_requires_a_zettel_id() {
        assert!(Cli::try_parse_from(["zettel2latex", "convert", "--archive", "/notes"]).is_err());
    }
}
