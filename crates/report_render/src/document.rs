//! Markdown report to document tree.
//!
//! Fenced code blocks are not rendered here; they go through the
//! [`TransformRegistry`], which decides between literal code and a diagram slot.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};
use serde::Serialize;

use crate::{
    diagram::DiagramSlot,
    transform::{TransformContext, TransformRegistry},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Inline {
    Text(String),
    Code(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Link { href: String, content: Vec<Inline> },
    Image { src: String, alt: String },
    SoftBreak,
    HardBreak,
}

impl Inline {
    pub fn plain_text(inlines: &[Inline]) -> String {
        let mut out = String::new();
        for inline in inlines {
            match inline {
                Inline::Text(text) | Inline::Code(text) => out.push_str(text),
                Inline::Emphasis(children)
                | Inline::Strong(children)
                | Inline::Strikethrough(children)
                | Inline::Link {
                    content: children, ..
                } => out.push_str(&Inline::plain_text(children)),
                Inline::Image { alt, .. } => out.push_str(alt),
                Inline::SoftBreak | Inline::HardBreak => out.push(' '),
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph(Vec<Inline>),
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    BlockQuote(Vec<Block>),
    Code {
        language: Option<String>,
        code: String,
    },
    Diagram(DiagramSlot),
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn parse(markdown: &str, registry: &TransformRegistry) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut builder = TreeBuilder::new(registry);
        for event in Parser::new_ext(markdown, options) {
            builder.handle(event);
        }
        Self {
            blocks: builder.finish(),
        }
    }

    /// Diagram slots in document order.
    pub fn diagrams(&self) -> Vec<&DiagramSlot> {
        let mut slots = Vec::new();
        collect_diagrams(&self.blocks, &mut slots);
        slots
    }
}

fn collect_diagrams<'a>(blocks: &'a [Block], slots: &mut Vec<&'a DiagramSlot>) {
    for block in blocks {
        match block {
            Block::Diagram(slot) => slots.push(slot),
            Block::BlockQuote(children) => collect_diagrams(children, slots),
            Block::List { items, .. } => {
                for item in items {
                    collect_diagrams(item, slots);
                }
            }
            _ => {}
        }
    }
}

enum ContainerKind {
    Root,
    Quote,
    Item,
}

enum LeafKind {
    Paragraph,
    Heading(u8),
    Html,
}

enum SpanKind {
    Emphasis,
    Strong,
    Strikethrough,
    Link(String),
    Image(String),
}

enum Frame {
    /// `loose` holds inline content of tight list items, which has no paragraph wrapper.
    Container {
        kind: ContainerKind,
        blocks: Vec<Block>,
        loose: Vec<Inline>,
    },
    List {
        start: Option<u64>,
        items: Vec<Vec<Block>>,
    },
    Leaf {
        kind: LeafKind,
        inlines: Vec<Inline>,
    },
    Span {
        kind: SpanKind,
        inlines: Vec<Inline>,
    },
    Code {
        info: Option<String>,
        code: String,
    },
    Ignored,
}

impl Frame {
    fn container(kind: ContainerKind) -> Self {
        Frame::Container {
            kind,
            blocks: Vec::new(),
            loose: Vec::new(),
        }
    }

    fn leaf(kind: LeafKind) -> Self {
        Frame::Leaf {
            kind,
            inlines: Vec::new(),
        }
    }

    fn span(kind: SpanKind) -> Self {
        Frame::Span {
            kind,
            inlines: Vec::new(),
        }
    }
}

struct TreeBuilder<'r> {
    registry: &'r TransformRegistry,
    ctx: TransformContext,
    stack: Vec<Frame>,
}

impl<'r> TreeBuilder<'r> {
    fn new(registry: &'r TransformRegistry) -> Self {
        Self {
            registry,
            ctx: TransformContext::default(),
            stack: vec![Frame::container(ContainerKind::Root)],
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                if let Some(Frame::Code { code, .. }) = self.stack.last_mut() {
                    code.push_str(&text);
                } else {
                    self.push_inline(Inline::Text(text.into_string()));
                }
            }
            Event::Code(code) => self.push_inline(Inline::Code(code.into_string())),
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push_inline(Inline::Text(html.into_string()))
            }
            Event::SoftBreak => self.push_inline(Inline::SoftBreak),
            Event::HardBreak => self.push_inline(Inline::HardBreak),
            Event::Rule => self.push_block(Block::Rule),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_inline(Inline::Text(marker.to_string()));
            }
            Event::FootnoteReference(label) => {
                self.push_inline(Inline::Text(format!("[^{label}]")))
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => Frame::leaf(LeafKind::Paragraph),
            Tag::Heading { level, .. } => Frame::leaf(LeafKind::Heading(level as u8)),
            Tag::HtmlBlock => Frame::leaf(LeafKind::Html),
            Tag::BlockQuote(..) => Frame::container(ContainerKind::Quote),
            Tag::List(start) => Frame::List {
                start,
                items: Vec::new(),
            },
            Tag::Item => Frame::container(ContainerKind::Item),
            Tag::CodeBlock(kind) => Frame::Code {
                info: match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.to_string())
                    }
                    _ => None,
                },
                code: String::new(),
            },
            Tag::Emphasis => Frame::span(SpanKind::Emphasis),
            Tag::Strong => Frame::span(SpanKind::Strong),
            Tag::Strikethrough => Frame::span(SpanKind::Strikethrough),
            Tag::Link { dest_url, .. } => Frame::span(SpanKind::Link(dest_url.into_string())),
            Tag::Image { dest_url, .. } => Frame::span(SpanKind::Image(dest_url.into_string())),
            _ => Frame::Ignored,
        };
        if matches!(
            frame,
            Frame::Leaf { .. } | Frame::List { .. } | Frame::Code { .. } | Frame::Container { .. }
        ) {
            self.flush_loose();
        }
        self.stack.push(frame);
    }

    fn end(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame {
            Frame::Leaf { kind, inlines } => match kind {
                LeafKind::Paragraph | LeafKind::Html => self.push_block(Block::Paragraph(inlines)),
                LeafKind::Heading(level) => self.push_block(Block::Heading {
                    level,
                    content: inlines,
                }),
            },
            Frame::Span { kind, inlines } => {
                let inline = match kind {
                    SpanKind::Emphasis => Inline::Emphasis(inlines),
                    SpanKind::Strong => Inline::Strong(inlines),
                    SpanKind::Strikethrough => Inline::Strikethrough(inlines),
                    SpanKind::Link(href) => Inline::Link {
                        href,
                        content: inlines,
                    },
                    SpanKind::Image(src) => Inline::Image {
                        src,
                        alt: Inline::plain_text(&inlines),
                    },
                };
                self.push_inline(inline);
            }
            Frame::Code { info, code } => {
                let block = self.registry.apply(info.as_deref(), &code, &mut self.ctx);
                self.push_block(block);
            }
            Frame::List { start, items } => self.push_block(Block::List { start, items }),
            Frame::Container {
                kind,
                mut blocks,
                loose,
            } => {
                if !loose.is_empty() {
                    blocks.push(Block::Paragraph(loose));
                }
                match kind {
                    ContainerKind::Item => {
                        if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                            items.push(blocks);
                        } else {
                            for block in blocks {
                                self.push_block(block);
                            }
                        }
                    }
                    ContainerKind::Quote => self.push_block(Block::BlockQuote(blocks)),
                    ContainerKind::Root => {}
                }
            }
            Frame::Ignored => {}
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        for frame in self.stack.iter_mut().rev() {
            let target = match frame {
                Frame::Leaf { inlines, .. } | Frame::Span { inlines, .. } => inlines,
                Frame::Container { loose, .. } => loose,
                Frame::Code { .. } | Frame::List { .. } | Frame::Ignored => continue,
            };
            if let Inline::Text(text) = &inline {
                if let Some(Inline::Text(previous)) = target.last_mut() {
                    previous.push_str(text);
                    return;
                }
            }
            target.push(inline);
            return;
        }
    }

    fn push_block(&mut self, block: Block) {
        for frame in self.stack.iter_mut().rev() {
            if let Frame::Container { blocks, loose, .. } = frame {
                if !loose.is_empty() {
                    blocks.push(Block::Paragraph(std::mem::take(loose)));
                }
                blocks.push(block);
                return;
            }
        }
    }

    fn flush_loose(&mut self) {
        if let Some(Frame::Container { blocks, loose, .. }) = self.stack.last_mut() {
            if !loose.is_empty() {
                blocks.push(Block::Paragraph(std::mem::take(loose)));
            }
        }
    }

    fn finish(mut self) -> Vec<Block> {
        while self.stack.len() > 1 {
            self.end();
        }
        match self.stack.pop() {
            Some(Frame::Container {
                mut blocks, loose, ..
            }) => {
                if !loose.is_empty() {
                    blocks.push(Block::Paragraph(loose));
                }
                blocks
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
