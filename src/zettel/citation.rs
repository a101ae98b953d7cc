use super::locator::{LookupError, NoteLocator};
use super::metadata::Metadata;
use super::patterns::{MetadataField, PatternTable};

const NO_LOCATION: &str = "0";

/// Bibliographic source of a note, as read from its front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Citation {
    pub citekey: Option<String>,
    pub location: Option<String>,
}

impl Citation {
    fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .filter(|location| *location != NO_LOCATION)
    }

    /// `"key, location"`, or `"key"` alone; `None` without a citekey.
    pub fn text(&self) -> Option<String> {
        let citekey = self.citekey.as_deref()?;
        Some(match self.location() {
            Some(location) => format!("{citekey}, {location}"),
            None => citekey.to_string(),
        })
    }

    pub fn margin_note(&self) -> String {
        match (self.citekey.as_deref(), self.location()) {
            (Some(citekey), Some(location)) => {
                format!("\\marginnote{{\\fullcite[{location}]{{{citekey}}}}}")
            }
            (Some(citekey), None) => format!("\\marginnote{{\\fullcite{{{citekey}}}}}"),
            (None, _) => String::new(),
        }
    }
}

/// Reads the note behind `note_id` and formats its citation. The last
/// `citekey:` and `loc:` lines in the file win.
pub fn resolve_citation<L: NoteLocator + ?Sized>(
    locator: &L,
    fields: &PatternTable<MetadataField>,
    note_id: &str,
) -> Result<Option<String>, LookupError> {
    let (_, lines) = locator.read_lines(note_id)?;
    let metadata = Metadata::from_lines(lines.iter().map(String::as_str), fields);
    Ok(metadata.citation().text())
}
