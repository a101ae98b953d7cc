use regex::Regex;
use tracing::{debug, warn};

use super::Engine;
use super::front_matter::{BlockState, FrontMatter, LineDisposition};
use super::locator::{LookupError, NoteLocator};
use super::metadata::{Metadata, title_from_path};
use super::patterns::Markup;

pub(crate) const FIRST_WORD_PATTERN: &str = r"^\s*[a-zA-Z0-9*_]+";

/// Puts the margin note right after the first word of the opening line, or
/// at its end when the line starts with something else.
fn splice_margin_note(line: &str, margin_note: &str, first_word: &Regex) -> String {
    match first_word.find(line) {
        Some(word) => format!(
            "{}{margin_note}{}",
            &line[..word.end()],
            &line[word.end()..]
        ),
        None => format!("{line}{margin_note}"),
    }
}

impl<L: NoteLocator> Engine<L> {
    pub fn assemble(&self, note_id: &str) -> Result<Vec<String>, LookupError> {
        let (path, lines) = self.locator.read_lines(note_id)?;
        debug!(zettel = %note_id, path = %path.display(), lines = lines.len(), "assembling zettel");

        let mut front = FrontMatter::new(
            note_id,
            Metadata {
                title: title_from_path(&path),
                ..Metadata::default()
            },
        );
        let mut data = Vec::with_capacity(lines.len() + 4);
        let mut got_content = false;

        for line in &lines {
            match front.accept(line, &self.fields, self.mode) {
                LineDisposition::Consumed => continue,
                LineDisposition::Closed(block) => {
                    data.extend(block);
                    continue;
                }
                LineDisposition::Body => {}
            }

            let kind = self.markup.classify(line).map(|found| found.kind);
            if kind == Some(Markup::Ignore) {
                continue;
            }

            let mut line = line.clone();
            if !got_content && !line.trim().is_empty() {
                front.seal();
                got_content = true;
                let margin_note = front.metadata().citation().margin_note();

                if kind == Some(Markup::HeadingTop) {
                    let title = front.metadata().title.as_deref().unwrap_or_default();
                    if self.heading_text(&line) == title {
                        // already shown as the chapter heading
                        got_content = false;
                        continue;
                    }
                    line.push_str(&margin_note);
                } else {
                    line = splice_margin_note(&line, &margin_note, &self.first_word);
                }
            }

            if got_content {
                data.push(self.rewrite(&line, note_id));
            }
        }

        if front.state() == BlockState::Inside {
            warn!(zettel = %note_id, path = %path.display(), "front matter never closed");
        }

        data.push(format!("\\label{{{note_id}-last}}"));
        Ok(data)
    }

    fn heading_text<'a>(&self, line: &'a str) -> &'a str {
        self.markup
            .regex(Markup::HeadingTop)
            .and_then(|regex| regex.find(line))
            .map(|prefix| &line[prefix.end()..])
            .unwrap_or(line)
    }
}

#[cfg(test)]
mod tests {
    use regex::Regex;

    use super::{FIRST_WORD_PATTERN, splice_margin_note};
    use crate::zettel::OutputMode;
    use crate::zettel::locator::LookupError;
    use crate::zettel::testing::{archive, engine};

    const SAMPLE: &str = "---\n\
        title: 'Sample'\n\
        id: 001\n\
        citekey: Doe2019\n\
        loc: 10\n\
        ...\n\
        \n\
        Hello +[[002]] world\n";

    #[test]
    fn book_mode_converts_sample_note() {
        let dir = archive(&[("001 Sample.md", SAMPLE)]);
        let engine = engine(&dir, OutputMode::Book);

        let lines = engine.assemble("001").expect("note converts");
        assert_eq!(
            lines,
            vec![
                "",
                "# Sample",
                "\\setzettel{001}",
                "",
                "Hello\\marginnote{\\fullcite[10]{Doe2019}} \\zettelref{002} world",
                "\\label{001-last}",
            ]
        );
    }

    #[test]
    fn standalone_mode_keeps_front_matter() {
        let dir = archive(&[("001 Sample.md", SAMPLE)]);
        let engine = engine(&dir, OutputMode::Standalone);

        let lines = engine.assemble("001").expect("note converts");
        assert_eq!(
            lines[..4],
            ["---", "title:    Sample  ", "id:    001  ", "zettel_id: 001"]
        );
        assert_eq!(lines.last().map(String::as_str), Some("\\label{001-last}"));
        assert!(lines[lines.len() - 2].starts_with("Hello\\marginnote"));
    }

    #[test]
    fn heading_matching_title_is_dropped() {
        let note = "---\ntitle: 'Sample'\ncitekey: Doe2019\n---\n# Sample\n\nFirst words here.\n## Part\n";
        let dir = archive(&[("001 Sample.md", note)]);
        let engine = engine(&dir, OutputMode::Book);

        let lines = engine.assemble("001").expect("note converts");
        assert_eq!(
            lines[4..],
            [
                "First\\marginnote{\\fullcite{Doe2019}} words here.",
                "## Part",
                "\\label{001-last}",
            ]
        );
    }

    #[test]
    fn heading_with_other_text_carries_margin_note() {
        let note = "---\ncitekey: Doe2019\n---\n# Elsewhere\n";
        let dir = archive(&[("001 Sample.md", note)]);
        let engine = engine(&dir, OutputMode::Book);

        let lines = engine.assemble("001").expect("note converts");
        assert_eq!(lines[4], "## Elsewhere\\marginnote{\\fullcite{Doe2019}}");
    }

    #[test]
    fn note_without_front_matter_uses_file_title() {
        let note = "\n○ private remark\nPlain body\n---\nafter rule\n";
        let dir = archive(&[("0042 Loose thought.txt", note)]);
        let engine = engine(&dir, OutputMode::Book);

        let lines = engine.assemble("0042").expect("note converts");
        assert_eq!(
            lines,
            vec!["Plain body", "---", "after rule", "\\label{0042-last}"]
        );
    }

    #[test]
    fn missing_note_is_an_error() {
        let dir = archive(&[]);
        let engine = engine(&dir, OutputMode::Book);
        assert!(matches!(
            engine.assemble("777"),
            Err(LookupError::NotFound { .. })
        ));
    }

    #[test]
    fn splice_margin_note_after_first_word_or_at_end() {
        let first_word = Regex::new(FIRST_WORD_PATTERN).expect("first-word pattern compiles");
        assert_eq!(
            splice_margin_note("  Word rest", "[M]", &first_word),
            "  Word[M] rest"
        );
        assert_eq!(
            splice_margin_note("*bold* rest", "[M]", &first_word),
            "*bold*[M] rest"
        );
        assert_eq!(
            splice_margin_note("> quoted", "[M]", &first_word),
            "> quoted[M]"
        );
    }
}
