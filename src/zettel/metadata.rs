use std::path::Path;

use super::citation::Citation;
use super::patterns::{MetadataField, PatternTable};

/// Front-matter values of one note. Every field is optional; a repeated
/// field keeps the last value read but its first position in `seen`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: Option<String>,
    pub citekey: Option<String>,
    pub loc: Option<String>,
    pub id: Option<String>,
    pub seen: Vec<MetadataField>,
}

impl Metadata {
    pub fn absorb_line(
        &mut self,
        line: &str,
        fields: &PatternTable<MetadataField>,
    ) -> Option<MetadataField> {
        let found = fields.classify(line)?;
        let value = found.group("id").to_string();
        match found.kind {
            MetadataField::Citekey => self.citekey = Some(value),
            MetadataField::Loc => self.loc = Some(value),
            MetadataField::Title => self.title = Some(value),
            MetadataField::Id => self.id = Some(value),
        }
        if !self.seen.contains(&found.kind) {
            self.seen.push(found.kind);
        }
        Some(found.kind)
    }

    pub fn from_lines<'a, I>(lines: I, fields: &PatternTable<MetadataField>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut metadata = Self::default();
        for line in lines {
            metadata.absorb_line(line, fields);
        }
        metadata
    }

    pub fn citation(&self) -> Citation {
        Citation {
            citekey: self.citekey.clone(),
            location: self.loc.clone(),
        }
    }

    pub fn get(&self, field: MetadataField) -> Option<&str> {
        match field {
            MetadataField::Citekey => self.citekey.as_deref(),
            MetadataField::Loc => self.loc.as_deref(),
            MetadataField::Title => self.title.as_deref(),
            MetadataField::Id => self.id.as_deref(),
        }
    }
}

/// `"1234 Some title.md"` yields `Some title`; a bare `"1234.md"` has none.
pub fn title_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.trim_start_matches(|c: char| c.is_ascii_digit());
    if stem.len() - rest.len() < 3 || !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let title = rest.trim();
    (!title.is_empty()).then(|| title.to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn fields() -> PatternTable<MetadataField> {
        PatternTable::front_matter().expect("field table compiles")
    }

    #[test]
    fn from_lines_collects_known_fields() {
        let lines = [
            "---",
            "title: 'Sample'",
            "id: 001",
            "citekey: Doe2019",
            "loc: 10",
            "tags: #x",
            "...",
        ];
        let metadata = Metadata::from_lines(lines, &fields());
        assert_eq!(metadata.title.as_deref(), Some("Sample"));
        assert_eq!(metadata.id.as_deref(), Some("001"));
        assert_eq!(metadata.citekey.as_deref(), Some("Doe2019"));
        assert_eq!(metadata.loc.as_deref(), Some("10"));
    }

    #[test]
    fn repeated_fields_keep_last_value() {
        let metadata = Metadata::from_lines(["loc: 3", "loc: 7"], &fields());
        assert_eq!(metadata.loc.as_deref(), Some("7"));
    }

    #[test]
    fn seen_records_first_appearance_order() {
        let metadata = Metadata::from_lines(
            ["id: 001", "citekey: Doe2019", "loc: 10", "id: 002"],
            &fields(),
        );
        assert_eq!(
            metadata.seen,
            vec![MetadataField::Id, MetadataField::Citekey, MetadataField::Loc]
        );
        assert_eq!(metadata.id.as_deref(), Some("002"));
    }

    #[test]
    fn absorb_line_reports_unrecognized_lines() {
        let mut metadata = Metadata::default();
        assert_eq!(metadata.absorb_line("author: someone", &fields()), None);
        assert_eq!(
            metadata.absorb_line("citekey: @Smith2020", &fields()),
            Some(MetadataField::Citekey)
        );
        assert_eq!(metadata.get(MetadataField::Citekey), Some("Smith2020"));
    }

    #[test]
    fn title_from_path_strips_identifier_and_extension() {
        assert_eq!(
            title_from_path(&PathBuf::from("/archive/1234 Some title.md")).as_deref(),
            Some("Some title")
        );
        assert_eq!(title_from_path(&PathBuf::from("/archive/1234.md")), None);
        assert_eq!(title_from_path(&PathBuf::from("/archive/12 short.md")), None);
        assert_eq!(title_from_path(&PathBuf::from("/archive/notes.md")), None);
    }
}
