use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::CheckArgs;
use crate::model::{CheckReport, FindingKind, ReferenceFinding};
use crate::util::now_utc_string;
use crate::zettel::citation::resolve_citation;
use crate::zettel::front_matter::{FrontMatter, LineDisposition};
use crate::zettel::locator::{ArchiveLocator, LookupError, NoteLocator};
use crate::zettel::metadata::Metadata;
use crate::zettel::patterns::Markup;
use crate::zettel::{Engine, OutputMode};

/// A cross-reference or citation marker found in a note body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub line: usize,
    pub marker: Markup,
    pub target_id: String,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let archive_root = &args.archive.archive_root;
    let engine = Engine::new(ArchiveLocator::new(archive_root), OutputMode::Book)?;

    let zettel_ids = if args.zettel_ids.is_empty() {
        engine
            .locator()
            .notes()
            .with_context(|| format!("failed to scan archive {}", archive_root.display()))?
            .into_iter()
            .map(|(id, _)| id)
            .collect::<Vec<_>>()
    } else {
        args.zettel_ids.clone()
    };

    info!(archive = %archive_root.display(), zettels = zettel_ids.len(), "checking references");

    let mut references_checked = 0;
    let mut findings = Vec::new();
    for zettel_id in &zettel_ids {
        let references = collect_references(&engine, zettel_id)
            .with_context(|| format!("failed to read zettel {zettel_id}"))?;
        references_checked += references.len();
        findings.extend(check_references(&engine, zettel_id, &references));
    }

    for finding in &findings {
        warn!(
            zettel = %finding.zettel_id,
            line = finding.line,
            marker = %finding.marker,
            target = %finding.target_id,
            kind = finding.kind.as_str(),
            detail = %finding.detail,
            "reference problem"
        );
    }

    let report = CheckReport {
        generated_at: now_utc_string(),
        archive_root: archive_root.display().to_string(),
        zettels_checked: zettel_ids.len(),
        references_checked,
        findings,
    };

    if args.json {
        let payload =
            serde_json::to_string_pretty(&report).context("failed to serialize check report")?;
        println!("{payload}");
    }

    info!(
        zettels = report.zettels_checked,
        references = report.references_checked,
        findings = report.findings.len(),
        "check completed"
    );

    if !report.findings.is_empty() {
        bail!("{} reference problem(s) found", report.findings.len());
    }
    Ok(())
}

/// Reference markers in the body of `zettel_id`, scanned with the same
/// first-rule-wins walk the rewriter uses. Line numbers are 1-based.
pub fn collect_references<L: NoteLocator>(
    engine: &Engine<L>,
    zettel_id: &str,
) -> Result<Vec<Reference>, LookupError> {
    let (_, lines) = engine.locator().read_lines(zettel_id)?;
    let mut front = FrontMatter::new(zettel_id, Metadata::default());
    let mut references = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        if front.accept(line, engine.fields(), engine.mode()) != LineDisposition::Body {
            continue;
        }
        if !line.trim().is_empty() {
            front.seal();
        }
        if engine.markup().classify(line).map(|found| found.kind) == Some(Markup::Ignore) {
            continue;
        }

        let mut rest = line.as_str();
        while let Some(found) = engine.markup().classify(rest) {
            let targets = match found.kind {
                Markup::ParallelTexts => vec![found.group("id_left"), found.group("id_right")],
                Markup::PandocCiteNoAuthor
                | Markup::PandocCiteInline
                | Markup::PandocCite
                | Markup::NoRef
                | Markup::Quote
                | Markup::AddRef
                | Markup::Link
                | Markup::CrossRefAlt
                | Markup::CrossRef => vec![found.group("id")],
                _ => Vec::new(),
            };
            references.extend(targets.into_iter().map(|target_id| Reference {
                line: index + 1,
                marker: found.kind,
                target_id: target_id.to_string(),
            }));
            rest = &rest[found.end..];
        }
    }

    Ok(references)
}

pub fn check_references<L: NoteLocator>(
    engine: &Engine<L>,
    zettel_id: &str,
    references: &[Reference],
) -> Vec<ReferenceFinding> {
    let finding = |reference: &Reference, kind: FindingKind, detail: String| ReferenceFinding {
        zettel_id: zettel_id.to_string(),
        line: reference.line,
        marker: reference.marker.as_str().to_string(),
        target_id: reference.target_id.clone(),
        kind,
        detail,
    };

    let mut findings = Vec::new();
    for reference in references {
        let lookup = if reference.marker.is_citation() {
            resolve_citation(engine.locator(), engine.fields(), &reference.target_id)
        } else {
            engine.locator().locate(&reference.target_id).map(|_| Some(String::new()))
        };

        match lookup {
            Ok(Some(_)) => {}
            Ok(None) => findings.push(finding(
                reference,
                FindingKind::Uncitable,
                "cited zettel has no citekey".to_string(),
            )),
            Err(err @ LookupError::Ambiguous { .. }) => {
                findings.push(finding(reference, FindingKind::Ambiguous, err.to_string()))
            }
            Err(err) => findings.push(finding(reference, FindingKind::Missing, err.to_string())),
        }
    }
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zettel::testing::{archive, engine};

    #[test]
    fn collect_references_skips_front_matter_and_follows_rule_order() {
        let dir = archive(&[(
            "100 Source.md",
            "---\ntitle: 'see [[999]]'\n---\nA [[200]] and >[[300]]::[[400]]\nB @[[500]]\n",
        )]);
        let engine = engine(&dir, OutputMode::Book);

        let references = collect_references(&engine, "100").expect("note readable");
        let summary = references
            .iter()
            .map(|r| (r.line, r.marker, r.target_id.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                (4, Markup::ParallelTexts, "300"),
                (4, Markup::ParallelTexts, "400"),
                (5, Markup::PandocCite, "500"),
            ]
        );
    }

    #[test]
    fn ignored_lines_contribute_no_references() {
        let dir = archive(&[
            ("100 Source.md", "○ draft about [[999]]\n△ [[998]]\nBody [[200]]\n"),
            ("200 Target.md", "x\n"),
        ]);
        let engine = engine(&dir, OutputMode::Book);

        let references = collect_references(&engine, "100").expect("note readable");
        assert_eq!(
            references,
            vec![Reference {
                line: 3,
                marker: Markup::CrossRef,
                target_id: "200".to_string(),
            }]
        );
        assert!(check_references(&engine, "100", &references).is_empty());
    }

    #[test]
    fn check_references_reports_missing_ambiguous_and_uncitable_targets() {
        let dir = archive(&[
            ("100 Source.md", "[[200]]\n[[300]]\n@[[400]]\n@[[500]]\n"),
            ("300 One.md", "x\n"),
            ("300.txt", "y\n"),
            ("400 No key.md", "---\ntitle: 'No key'\n---\n"),
            ("500 Keyed.md", "---\ncitekey: Roe2001\n---\n"),
        ]);
        let engine = engine(&dir, OutputMode::Book);

        let references = collect_references(&engine, "100").expect("note readable");
        assert_eq!(references.len(), 4);

        let findings = check_references(&engine, "100", &references);
        let kinds = findings
            .iter()
            .map(|f| (f.target_id.as_str(), f.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ("200", FindingKind::Missing),
                ("300", FindingKind::Ambiguous),
                ("400", FindingKind::Uncitable),
            ]
        );
        assert_eq!(findings[0].line, 1);
        assert_eq!(findings[0].marker, "cross_ref");
    }
}
