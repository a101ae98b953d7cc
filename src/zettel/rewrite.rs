use tracing::warn;

use super::citation::resolve_citation;
use super::locator::NoteLocator;
use super::patterns::{Classified, Markup};
use super::{Engine, OutputMode};

fn zettelref(note_id: &str) -> String {
    format!("\\zettelref{{{note_id}}}")
}

impl<L: NoteLocator> Engine<L> {
    /// Rewrites one line of a note body.
    ///
    /// The winning rule's match is replaced, the text before it is kept
    /// verbatim, and scanning restarts on the text after the match, so
    /// substituted output is never scanned again. Anchored rules anchor at
    /// the start of whatever text remains.
    pub fn rewrite(&self, chunk: &str, note_id: &str) -> String {
        let mut out = String::with_capacity(chunk.len());
        let mut rest = chunk;

        while let Some(found) = self.markup.classify(rest) {
            out.push_str(&rest[..found.start]);
            out.push_str(&self.render(&found, &rest[found.start..found.end], note_id));
            rest = &rest[found.end..];
        }

        out.push_str(rest);
        out
    }

    fn render(&self, found: &Classified<'_, Markup>, matched: &str, note_id: &str) -> String {
        let book = self.mode == OutputMode::Book;

        match found.kind {
            Markup::Ignore | Markup::YamlEndDiv | Markup::YamlDiv => matched.to_string(),
            Markup::Footnote => format!("[^fn-{note_id}-{}]", found.group("fn_id")),
            Markup::ParallelTexts => format!(
                "{} {}",
                zettelref(found.group("id_left")),
                zettelref(found.group("id_right"))
            ),
            Markup::PandocCiteNoAuthor => {
                let target = found.group("id");
                format!("[-@{}] {}", self.citation_text(target), zettelref(target))
            }
            Markup::PandocCite => {
                let target = found.group("id");
                format!("[@{}] {}", self.citation_text(target), zettelref(target))
            }
            Markup::PandocCiteInline => {
                let target = found.group("id");
                format!("@{} {}", self.citation_text(target), zettelref(target))
            }
            Markup::Quote
            | Markup::NoRef
            | Markup::AddRef
            | Markup::Link
            | Markup::CrossRefAlt
            | Markup::CrossRef => zettelref(found.group("id")),
            Markup::HeadingTop => String::from(if book { "## " } else { "# " }),
            Markup::HeadingLower => String::from(if book { "### " } else { "## " }),
            Markup::Hashtag => format!("\\hashtag{{{}}}", found.group("tag")),
            Markup::SymForAll | Markup::SymExists | Markup::SymRightArrow | Markup::SymSupset => {
                format!("\\{} ", found.kind.as_str())
            }
            Markup::SymTherefore | Markup::SymBecause | Markup::SymMindMap | Markup::SymIdeaSpace => {
                format!("\\{}", found.kind.as_str())
            }
        }
    }

    fn citation_text(&self, target: &str) -> String {
        match resolve_citation(&self.locator, &self.fields, target) {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!(zettel = %target, "cited zettel has no citekey");
                String::new()
            }
            Err(err) => {
                warn!(zettel = %target, error = %err, "citation target unavailable");
                String::new()
            }
        }
    }
}
