use anyhow::{Context, Result};
use regex::{Captures, Regex};

/// Markup recognized in a note body, in precedence order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Markup {
    Ignore,
    Footnote,
    ParallelTexts,
    PandocCiteNoAuthor,
    PandocCiteInline,
    PandocCite,
    NoRef,
    Quote,
    AddRef,
    Link,
    CrossRefAlt,
    CrossRef,
    YamlEndDiv,
    YamlDiv,
    HeadingTop,
    HeadingLower,
    Hashtag,
    SymTherefore,
    SymBecause,
    SymMindMap,
    SymIdeaSpace,
    SymForAll,
    SymExists,
    SymRightArrow,
    SymSupset,
}

impl Markup {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::Footnote => "footnote",
            Self::ParallelTexts => "parallel_texts",
            Self::PandocCiteNoAuthor => "pandoc_cite_noauthor",
            Self::PandocCiteInline => "pandoc_cite_inline",
            Self::PandocCite => "pandoc_cite",
            Self::NoRef => "no_ref",
            Self::Quote => "quote",
            Self::AddRef => "add_ref",
            Self::Link => "link",
            Self::CrossRefAlt => "cross_ref_alt",
            Self::CrossRef => "cross_ref",
            Self::YamlEndDiv => "yaml_end_div",
            Self::YamlDiv => "yaml_div",
            Self::HeadingTop => "md_heading_top",
            Self::HeadingLower => "md_heading_lower",
            Self::Hashtag => "hashtag",
            Self::SymTherefore => "symtherefore",
            Self::SymBecause => "symbecause",
            Self::SymMindMap => "symmindmap",
            Self::SymIdeaSpace => "symideaspace",
            Self::SymForAll => "symforall",
            Self::SymExists => "symexists",
            Self::SymRightArrow => "symrightarrow",
            Self::SymSupset => "symsupset",
        }
    }

    /// Citation markers resolve the target note's citekey when rendered.
    pub fn is_citation(self) -> bool {
        matches!(
            self,
            Self::PandocCiteNoAuthor | Self::PandocCiteInline | Self::PandocCite
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MetadataField {
    Citekey,
    Loc,
    Title,
    Id,
}

impl MetadataField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Citekey => "citekey",
            Self::Loc => "loc",
            Self::Title => "title",
            Self::Id => "id",
        }
    }
}

#[derive(Debug)]
pub struct PatternRule<K> {
    pub kind: K,
    pub regex: Regex,
}

/// Result of classifying a chunk: the winning rule and where its match ends.
#[derive(Debug)]
pub struct Classified<'t, K> {
    pub kind: K,
    pub captures: Captures<'t>,
    pub start: usize,
    pub end: usize,
}

impl<'t, K> Classified<'t, K> {
    pub fn group(&self, name: &str) -> &'t str {
        self.captures.name(name).map(|m| m.as_str()).unwrap_or_default()
    }
}

/// Ordered rule list. Position is the only precedence: the first rule whose
/// pattern matches anywhere in the text wins, wherever the match sits.
#[derive(Debug)]
pub struct PatternTable<K> {
    rules: Vec<PatternRule<K>>,
}

impl<K: Copy> PatternTable<K> {
    fn compile(specs: &[(K, &str)], label: &str) -> Result<Self> {
        let mut rules = Vec::with_capacity(specs.len());
        for &(kind, pattern) in specs {
            let regex = Regex::new(pattern)
                .with_context(|| format!("failed to compile {label} pattern: {pattern}"))?;
            rules.push(PatternRule { kind, regex });
        }
        Ok(Self { rules })
    }

    pub fn classify<'t>(&self, text: &'t str) -> Option<Classified<'t, K>> {
        self.rules.iter().find_map(|rule| {
            let captures = rule.regex.captures(text)?;
            let whole = captures.get(0)?;
            Some(Classified {
                kind: rule.kind,
                start: whole.start(),
                end: whole.end(),
                captures,
            })
        })
    }

    pub fn regex(&self, kind: K) -> Option<&Regex>
    where
        K: PartialEq,
    {
        self.rules
            .iter()
            .find(|rule| rule.kind == kind)
            .map(|rule| &rule.regex)
    }
}

impl PatternTable<Markup> {
    pub fn markup() -> Result<Self> {
        Self::compile(
            &[
                (Markup::Ignore, r"^(△|○)"),
                (Markup::Footnote, r"\[\^(?P<fn_id>[a-zA-Z0-9_-]+)]"),
                (
                    Markup::ParallelTexts,
                    r" *>\s{0,1}\[\[(?P<id_left>\d{3,})\]\]::\[\[(?P<id_right>\d{3,})\]\]",
                ),
                (Markup::PandocCiteNoAuthor, r"-@\[\[(?P<id>\d{3,})\]\]"),
                (Markup::PandocCiteInline, r"@@\[\[(?P<id>\d{3,})\]\]"),
                (Markup::PandocCite, r"@\[\[(?P<id>\d{3,})\]\]"),
                (Markup::NoRef, r"-\[\[(?P<id>\d{3,})\]\]"),
                (Markup::Quote, r" *>\s{0,1}\[\[(?P<id>\d{3,})\]\]"),
                (Markup::AddRef, r"\+\[\[(?P<id>\d{3,})\]\]"),
                (Markup::Link, r"§\[\[(?P<id>\d{3,})\]\]"),
                (Markup::CrossRefAlt, r"\[\[(?P<id>\d{3,})\]\]:"),
                (Markup::CrossRef, r"\[\[(?P<id>\d{3,})\]\]"),
                (Markup::YamlEndDiv, r"^\.\.\.$"),
                (Markup::YamlDiv, r"^---$"),
                (Markup::HeadingTop, r"^#{1,2}\s+"),
                (Markup::HeadingLower, r"^#{3,}\s+"),
                (Markup::Hashtag, r"#(?P<tag>[0-9A-Za-z./_&øφƒβπ]+)\b"),
                (Markup::SymTherefore, "∴"),
                (Markup::SymBecause, "∵"),
                (Markup::SymMindMap, "🧠"),
                (Markup::SymIdeaSpace, "💡"),
                (Markup::SymForAll, "∀"),
                (Markup::SymExists, "∃"),
                (Markup::SymRightArrow, "→"),
                (Markup::SymSupset, "⊃"),
            ],
            "markup",
        )
    }
}

impl PatternTable<MetadataField> {
    pub fn front_matter() -> Result<Self> {
        Self::compile(
            &[
                (
                    MetadataField::Citekey,
                    r"^citekey:[ \t]*@{0,1}(?P<id>[A-Za-z\d:]+)\s*$",
                ),
                (MetadataField::Loc, r"^loc:[ \t]*(?P<id>\S+)\s*$"),
                (MetadataField::Title, r"^title:\s*'(?P<id>.*)'\s*$"),
                (MetadataField::Id, r"^id:\s*Φ{0,1}(?P<id>\d{3,})"),
            ],
            "front-matter",
        )
    }
}
