use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ConvertArgs;
use crate::util::write_lines;
use crate::zettel::Engine;
use crate::zettel::locator::{ArchiveLocator, NoteLocator};

pub fn run(args: ConvertArgs) -> Result<()> {
    let mode = args.mode();
    let locator = ArchiveLocator::new(&args.archive.archive_root);
    let engine = Engine::new(locator, mode)?;

    info!(
        archive = %args.archive.archive_root.display(),
        mode = mode.as_str(),
        zettels = args.zettel_ids.len(),
        "starting conversion"
    );

    let data = convert_all(&engine, &args.zettel_ids)?;
    write_lines(args.output.as_deref(), &data)?;

    info!(zettels = args.zettel_ids.len(), lines = data.len(), "conversion completed");
    Ok(())
}

/// Converts notes in order into one stream of lines. A note that cannot be
/// found stops the run.
pub fn convert_all<L: NoteLocator>(engine: &Engine<L>, zettel_ids: &[String]) -> Result<Vec<String>> {
    let mut data = Vec::new();
    for zettel_id in zettel_ids {
        let lines = engine
            .assemble(zettel_id)
            .with_context(|| format!("failed to convert zettel {zettel_id}"))?;
        data.extend(lines);
    }
    Ok(data)
}
