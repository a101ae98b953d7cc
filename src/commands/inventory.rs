use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::model::{NoteEntry, NoteInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};
use crate::zettel::locator::{ArchiveLocator, read_note_lines};
use crate::zettel::metadata::{Metadata, title_from_path};
use crate::zettel::patterns::PatternTable;

pub fn run(args: InventoryArgs) -> Result<()> {
    let archive_root = &args.archive.archive_root;
    let manifest = build_manifest(archive_root)?;

    if args.dry_run {
        info!(
            note_count = manifest.note_count,
            archive = %manifest.archive_root,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args.manifest_path.unwrap_or_else(|| {
        archive_root
            .join(".zettel2latex")
            .join("note_inventory.json")
    });

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(note_count = manifest.note_count, "inventory completed");

    Ok(())
}

pub fn build_manifest(archive_root: &Path) -> Result<NoteInventoryManifest> {
    let fields = PatternTable::front_matter()?;
    let locator = ArchiveLocator::new(archive_root);
    let note_paths = locator
        .notes()
        .with_context(|| format!("failed to scan archive {}", archive_root.display()))?;

    if note_paths.is_empty() {
        bail!("no zettels found in {}", archive_root.display());
    }

    let mut notes = Vec::with_capacity(note_paths.len());
    for (id, path) in note_paths {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        let lines = read_note_lines(&path)?;
        let mut metadata = Metadata::from_lines(lines.iter().map(String::as_str), &fields);
        if metadata.title.is_none() {
            metadata.title = title_from_path(&path);
        }
        let sha256 = sha256_file(&path)?;

        notes.push(NoteEntry {
            id,
            filename,
            title: metadata.title,
            citekey: metadata.citekey,
            loc: metadata.loc,
            sha256,
        });
    }

    notes.sort_by(|a, b| a.id.cmp(&b.id).then(a.filename.cmp(&b.filename)));
    warn_duplicate_ids(&notes);

    Ok(NoteInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        archive_root: archive_root.display().to_string(),
        note_count: notes.len(),
        notes,
    })
}

fn warn_duplicate_ids(notes: &[NoteEntry]) {
    let mut by_id: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for note in notes {
        by_id
            .entry(note.id.as_str())
            .or_default()
            .push(note.filename.as_str());
    }

    for (id, filenames) in by_id.into_iter().filter(|(_, names)| names.len() > 1) {
        warn!(zettel = %id, files = %filenames.join(", "), "duplicate zettel id in archive");
    }
}
