use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: String,
    pub filename: String,
    pub title: Option<String>,
    pub citekey: Option<String>,
    pub loc: Option<String>,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub archive_root: String,
    pub note_count: usize,
    pub notes: Vec<NoteEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Missing,
    Ambiguous,
    Uncitable,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Ambiguous => "ambiguous",
            Self::Uncitable => "uncitable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFinding {
    pub zettel_id: String,
    pub line: usize,
    pub marker: String,
    pub target_id: String,
    pub kind: FindingKind,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub generated_at: String,
    pub archive_root: String,
    pub zettels_checked: usize,
    pub references_checked: usize,
    pub findings: Vec<ReferenceFinding>,
}
