//! Fenced code block dispatch keyed by declared language.

use std::collections::HashMap;

use crate::{
    diagram::{DiagramId, DiagramSlot, DIAGRAM_LANGUAGE},
    document::Block,
};

/// Per-document state shared by transforms.
#[derive(Debug, Default)]
pub struct TransformContext {
    diagrams: usize,
}

impl TransformContext {
    pub fn next_diagram_id(&mut self) -> DiagramId {
        let id = DiagramId::for_index(self.diagrams);
        self.diagrams += 1;
        id
    }
}

pub trait BlockTransform: Send + Sync {
    fn transform(&self, language: Option<&str>, code: &str, ctx: &mut TransformContext) -> Block;
}

/// Renders the block as literal code.
pub struct LiteralCode;

impl BlockTransform for LiteralCode {
    fn transform(&self, language: Option<&str>, code: &str, _ctx: &mut TransformContext) -> Block {
        Block::Code {
            language: language.map(str::to_string),
            code: code.to_string(),
        }
    }
}

/// Hands the block to the diagram renderer through a keyed slot.
pub struct DiagramBlock;

impl BlockTransform for DiagramBlock {
    fn transform(&self, _language: Option<&str>, code: &str, ctx: &mut TransformContext) -> Block {
        Block::Diagram(DiagramSlot {
            id: ctx.next_diagram_id(),
            source: code.to_string(),
        })
    }
}

pub struct TransformRegistry {
    fallback: Box<dyn BlockTransform>,
    by_language: HashMap<String, Box<dyn BlockTransform>>,
}

impl TransformRegistry {
    pub fn new(fallback: Box<dyn BlockTransform>) -> Self {
        Self {
            fallback,
            by_language: HashMap::new(),
        }
    }

    pub fn register(
        mut self,
        language: impl Into<String>,
        transform: Box<dyn BlockTransform>,
    ) -> Self {
        self.by_language
            .insert(language.into().to_ascii_lowercase(), transform);
        self
    }

    /// `info` is the raw fence info string; only its first word is the language.
    pub fn apply(&self, info: Option<&str>, code: &str, ctx: &mut TransformContext) -> Block {
        let language = info
            .and_then(|info| info.split_whitespace().next())
            .filter(|language| !language.is_empty());
        let transform = language
            .and_then(|language| self.by_language.get(&language.to_ascii_lowercase()))
            .unwrap_or(&self.fallback);
        transform.transform(language, code, ctx)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new(Box::new(LiteralCode)).register(DIAGRAM_LANGUAGE, Box::new(DiagramBlock))
    }
}
