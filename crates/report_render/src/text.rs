//! Plain terminal rendering.

use std::{collections::BTreeMap, fmt::Write as _};

use crate::{
    diagram::{DiagramId, RenderedDiagram, DIAGRAM_FAILURE_PLACEHOLDER},
    document::{Block, Inline},
    view::{RankedOptionView, RenderedView, ReportView, PENDING_PLACEHOLDER},
};

pub fn render_view(view: &RenderedView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Ranked Options");
    out.push_str(&render_ranking(&view.options));
    let _ = writeln!(out, "\nStrategic Directive");
    match &view.report {
        ReportView::Pending => {
            let _ = writeln!(out, "  {PENDING_PLACEHOLDER}");
        }
        ReportView::Ready(rendered) => {
            render_blocks(&mut out, &rendered.document.blocks, &rendered.diagrams, 0);
        }
    }
    out
}

pub fn render_ranking(options: &[RankedOptionView]) -> String {
    let mut out = String::new();
    for option in options {
        let marker = if option.is_winner { "*" } else { " " };
        let _ = writeln!(
            out,
            "{marker} {}. Option {}  score {}",
            option.rank, option.option_id, option.score
        );
        for item in &option.evidence.items {
            let _ = writeln!(out, "      - {}", item.text);
        }
        if let Some(more) = option.evidence.more_label() {
            let _ = writeln!(out, "      {more}");
        }
    }
    out
}

fn render_blocks(
    out: &mut String,
    blocks: &[Block],
    diagrams: &BTreeMap<DiagramId, RenderedDiagram>,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                let _ = writeln!(
                    out,
                    "\n{indent}{} {}",
                    "#".repeat(usize::from(*level)),
                    inline_text(content)
                );
            }
            Block::Paragraph(content) => {
                let _ = writeln!(out, "{indent}{}", inline_text(content));
            }
            Block::List { start, items } => {
                for (index, item) in items.iter().enumerate() {
                    let bullet = match start {
                        Some(start) => format!("{}.", start + index as u64),
                        None => "-".to_string(),
                    };
                    let _ = write!(out, "{indent}{bullet} ");
                    let mut rendered = String::new();
                    render_blocks(&mut rendered, item, diagrams, depth + 1);
                    out.push_str(rendered.trim_start());
                }
            }
            Block::BlockQuote(children) => {
                let mut rendered = String::new();
                render_blocks(&mut rendered, children, diagrams, 0);
                for line in rendered.lines() {
                    let _ = writeln!(out, "{indent}> {line}");
                }
            }
            Block::Code { code, .. } => {
                for line in code.lines() {
                    let _ = writeln!(out, "{indent}    {line}");
                }
            }
            Block::Diagram(slot) => {
                let status = match diagrams.get(&slot.id) {
                    Some(RenderedDiagram::Image(image)) => {
                        format!(
                            "diagram {} ({} bytes, {})",
                            slot.id,
                            image.bytes.len(),
                            image.media_type
                        )
                    }
                    Some(RenderedDiagram::Failed { .. }) => {
                        format!("{DIAGRAM_FAILURE_PLACEHOLDER} ({})", slot.id)
                    }
                    None => format!("diagram {} not rendered", slot.id),
                };
                let _ = writeln!(out, "{indent}[{status}]");
            }
            Block::Rule => {
                let _ = writeln!(out, "{indent}----");
            }
        }
    }
}

fn inline_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Code(code) => {
                let _ = write!(out, "`{code}`");
            }
            Inline::Emphasis(children) => {
                let _ = write!(out, "_{}_", inline_text(children));
            }
            Inline::Strong(children) => {
                let _ = write!(out, "**{}**", inline_text(children));
            }
            Inline::Strikethrough(children) => {
                let _ = write!(out, "~~{}~~", inline_text(children));
            }
            Inline::Link { href, content } => {
                let _ = write!(out, "{} <{href}>", inline_text(content));
            }
            Inline::Image { alt, .. } => {
                let _ = write!(out, "[image: {alt}]");
            }
            Inline::SoftBreak => out.push(' '),
            Inline::HardBreak => out.push('\n'),
        }
    }
    out
}
