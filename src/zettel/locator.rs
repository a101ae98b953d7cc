use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no file found for zettel {note_id} in {}", .root.display())]
    NotFound { note_id: String, root: PathBuf },

    #[error("zettel {note_id} matches {} files: {}", .matches.len(), display_paths(.matches))]
    Ambiguous {
        note_id: String,
        matches: Vec<PathBuf>,
    },

    #[error("failed to read {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps a note identifier to the file that holds it.
pub trait NoteLocator {
    fn locate(&self, note_id: &str) -> Result<PathBuf, LookupError>;

    fn read_lines(&self, note_id: &str) -> Result<(PathBuf, Vec<String>), LookupError> {
        let path = self.locate(note_id)?;
        let lines = read_note_lines(&path)?;
        Ok((path, lines))
    }
}

/// Looks notes up in a flat archive directory where every file name starts
/// with the note identifier followed by a space or a dot.
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    root: PathBuf,
}

impl ArchiveLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn notes(&self) -> Result<Vec<(String, PathBuf)>, LookupError> {
        let mut notes = Vec::new();
        for path in self.files()? {
            if let Some(note_id) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(note_id_from_file_name)
            {
                notes.push((note_id.to_string(), path));
            }
        }
        notes.sort();
        Ok(notes)
    }

    fn files(&self) -> Result<Vec<PathBuf>, LookupError> {
        let unreadable = |source| LookupError::Unreadable {
            path: self.root.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            // follows symlinks
            if path.is_file() {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl NoteLocator for ArchiveLocator {
    fn locate(&self, note_id: &str) -> Result<PathBuf, LookupError> {
        let mut matches = self
            .files()?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| names_note(name, note_id))
            })
            .collect::<Vec<_>>();
        matches.sort();

        match matches.len() {
            0 => Err(LookupError::NotFound {
                note_id: note_id.to_string(),
                root: self.root.clone(),
            }),
            1 => Ok(matches.remove(0)),
            _ => Err(LookupError::Ambiguous {
                note_id: note_id.to_string(),
                matches,
            }),
        }
    }
}

fn names_note(file_name: &str, note_id: &str) -> bool {
    file_name
        .strip_prefix(note_id)
        .is_some_and(|rest| rest.starts_with([' ', '.']))
}

/// The leading identifier of an archive file name: at least three digits
/// followed by a space or a dot.
pub fn note_id_from_file_name(file_name: &str) -> Option<&str> {
    let digits = file_name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(file_name.len());
    let rest = &file_name[digits..];
    (digits >= 3 && rest.starts_with([' ', '.'])).then(|| &file_name[..digits])
}

pub fn read_note_lines(path: &Path) -> Result<Vec<String>, LookupError> {
    let raw = fs::read_to_string(path).map_err(|source| LookupError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.lines().map(ToOwned::to_owned).collect())
}
