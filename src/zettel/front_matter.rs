use super::OutputMode;
use super::metadata::Metadata;
use super::patterns::{MetadataField, PatternTable};

const BLOCK_OPEN: &str = "---";
const BLOCK_CLOSE: &str = "...";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BlockState {
    Before,
    Inside,
    After,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineDisposition {
    Consumed,
    /// The block just closed; emit these lines in its place.
    Closed(Vec<String>),
    Body,
}

#[derive(Debug)]
pub struct FrontMatter {
    state: BlockState,
    zettel_id: String,
    metadata: Metadata,
}

impl FrontMatter {
    /// `zettel_id` stands in for a missing `id:` field in the chapter
    /// heading only; the standalone header carries what the block set.
    pub fn new(zettel_id: &str, defaults: Metadata) -> Self {
        Self {
            state: BlockState::Before,
            zettel_id: zettel_id.to_string(),
            metadata: defaults,
        }
    }

    pub fn state(&self) -> BlockState {
        self.state
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// No block may open once body content has started.
    pub fn seal(&mut self) {
        if self.state == BlockState::Before {
            self.state = BlockState::After;
        }
    }

    pub fn accept(
        &mut self,
        line: &str,
        fields: &PatternTable<MetadataField>,
        mode: OutputMode,
    ) -> LineDisposition {
        match self.state {
            BlockState::Before if line == BLOCK_OPEN => {
                self.state = BlockState::Inside;
                LineDisposition::Consumed
            }
            BlockState::Before | BlockState::After => LineDisposition::Body,
            BlockState::Inside => {
                if line == BLOCK_OPEN || line == BLOCK_CLOSE {
                    self.state = BlockState::After;
                    return LineDisposition::Closed(self.emit(mode));
                }
                self.metadata.absorb_line(line, fields);
                LineDisposition::Consumed
            }
        }
    }

    fn emit(&self, mode: OutputMode) -> Vec<String> {
        match mode {
            OutputMode::Book => self.chapter(),
            OutputMode::Standalone => self.header(),
        }
    }

    fn chapter(&self) -> Vec<String> {
        let title = self.metadata.title.as_deref().unwrap_or_default();
        let id = self.metadata.id.as_deref().unwrap_or(&self.zettel_id);
        vec![
            String::new(),
            format!("# {title}"),
            format!("\\setzettel{{{id}}}"),
            String::new(),
        ]
    }

    fn header(&self) -> Vec<String> {
        let mut lines = vec![BLOCK_OPEN.to_string()];
        let rest = self
            .metadata
            .seen
            .iter()
            .copied()
            .filter(|field| *field != MetadataField::Title);
        for field in std::iter::once(MetadataField::Title).chain(rest) {
            let Some(value) = self.metadata.get(field) else {
                continue;
            };
            lines.push(format!("{}:    {value}  ", field.as_str()));
            if field == MetadataField::Id {
                lines.push(format!("zettel_id: {value}"));
            }
        }
        lines.push(BLOCK_CLOSE.to_string());
        lines.push(String::new());
        lines
    }
}
