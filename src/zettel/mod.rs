//! Zettel-to-LaTeX rewriting engine.
//!
//! A note is read line by line: the front-matter block becomes either a
//! chapter heading or a normalized metadata block, and every body line runs
//! through the markup table, where the first matching rule (in table order)
//! is substituted and scanning resumes after the match.

pub mod assemble;
pub mod citation;
pub mod front_matter;
pub mod locator;
pub mod metadata;
pub mod patterns;
pub mod rewrite;

use anyhow::{Context, Result};
use regex::Regex;

use self::locator::NoteLocator;
use self::patterns::{Markup, MetadataField, PatternTable};

/// How converted notes are laid out.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputMode {
    /// Notes become chapters of one document; headings move down a level.
    #[default]
    Book,
    /// Each note keeps its own front matter.
    Standalone,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Standalone => "standalone",
        }
    }
}

/// Rule tables, note lookup, and output mode shared by every note in a run.
#[derive(Debug)]
pub struct Engine<L> {
    markup: PatternTable<Markup>,
    fields: PatternTable<MetadataField>,
    first_word: Regex,
    locator: L,
    mode: OutputMode,
}

impl<L: NoteLocator> Engine<L> {
    pub fn new(locator: L, mode: OutputMode) -> Result<Self> {
        Ok(Self {
            markup: PatternTable::markup()?,
            fields: PatternTable::front_matter()?,
            first_word: Regex::new(assemble::FIRST_WORD_PATTERN)
                .context("failed to compile first-word regex")?,
            locator,
            mode,
        })
    }

    pub fn markup(&self) -> &PatternTable<Markup> {
        &self.markup
    }

    pub fn fields(&self) -> &PatternTable<MetadataField> {
        &self.fields
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::fs;

    use tempfile::TempDir;

    use super::locator::ArchiveLocator;
    use super::{Engine, OutputMode};

    pub fn archive(notes: &[(&str, &str)]) -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        for (name, body) in notes {
            fs::write(dir.path().join(name), body).expect("write note");
        }
        dir
    }

    pub fn engine(dir: &TempDir, mode: OutputMode) -> Engine<ArchiveLocator> {
        Engine::new(ArchiveLocator::new(dir.path()), mode).expect("engine builds")
    }
}
