//! Standalone HTML rendering of a [`RenderedView`].

use std::{collections::BTreeMap, fmt::Write as _};

use crate::{
    diagram::{DiagramId, RenderedDiagram, DIAGRAM_FAILURE_PLACEHOLDER},
    document::{Block, Inline},
    view::{RankedOptionView, RenderedView, ReportView, PENDING_PLACEHOLDER},
};

const STYLESHEET: &str = "\
body{font-family:sans-serif;background:#f8fafc;color:#0f172a;margin:2rem}
.layout{display:grid;grid-template-columns:1fr 2fr;gap:1.5rem}
.option{background:#fff;border:1px solid #e2e8f0;border-radius:.75rem;padding:1rem;margin-bottom:.75rem;opacity:.8}
.option.winner{background:#f0fdf4;border-color:#bbf7d0;opacity:1}
.score{font-family:monospace;font-weight:bold;float:right}
.evidence{font-size:.8rem;color:#64748b;list-style:none;padding-left:0}
.more{font-size:.75rem;font-style:italic;color:#94a3b8}
.report{background:#fff;border:1px solid #e2e8f0;border-radius:.75rem;padding:2rem}
.report-pending{color:#94a3b8;font-style:italic;text-align:center;margin-top:5rem}
.heading-1{font-size:1.8rem}.heading-2{font-size:1.4rem;border-bottom:1px solid #e2e8f0}
.heading-3{font-size:1.15rem}.paragraph{line-height:1.6}
.list{padding-left:1.5rem}.list-ordered{list-style:decimal}.list-unordered{list-style:disc}
.code{background:#0f172a;color:#e2e8f0;padding:1rem;border-radius:.5rem;overflow-x:auto}
.diagram{display:flex;justify-content:center;padding:1.5rem;border:1px solid #f1f5f9}
.diagram-error{color:red;padding:10px;border:1px solid red}
";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn safe_href(href: &str) -> String {
    let lower = href.trim().to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("vbscript:") {
        "#".to_string()
    } else {
        escape(href)
    }
}

pub fn render_page(view: &RenderedView, title: &str) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLESHEET}</style>\n</head>\n<body>\n",
        escape(title)
    );
    let _ = writeln!(out, "<h1>{}</h1>", escape(title));
    out.push_str("<div class=\"layout\">\n");
    out.push_str(&render_ranking(&view.options));
    out.push_str(&render_report(&view.report));
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

pub fn render_ranking(options: &[RankedOptionView]) -> String {
    let mut out = String::from("<section class=\"ranking\">\n<h2>Ranked Options</h2>\n");
    for option in options {
        let class = if option.is_winner {
            "option winner"
        } else {
            "option"
        };
        let _ = writeln!(
            out,
            "<div class=\"{class}\" data-option-id=\"{}\">\n<span class=\"rank\">{}. Option {}</span><span class=\"score\">{}</span>",
            option.option_id, option.rank, option.option_id, option.score
        );
        out.push_str("<ul class=\"evidence\">\n");
        for item in &option.evidence.items {
            let _ = writeln!(
                out,
                "<li><span title=\"{}\">{}</span></li>",
                escape(&item.title),
                escape(&item.text)
            );
        }
        out.push_str("</ul>\n");
        if let Some(more) = option.evidence.more_label() {
            let _ = writeln!(out, "<p class=\"more\">{}</p>", escape(&more));
        }
        out.push_str("</div>\n");
    }
    out.push_str("</section>\n");
    out
}

pub fn render_report(report: &ReportView) -> String {
    let mut out = String::from("<section class=\"report\">\n<h2>Strategic Directive</h2>\n");
    match report {
        ReportView::Pending => {
            let _ = writeln!(out, "<div class=\"report-pending\">{PENDING_PLACEHOLDER}</div>");
        }
        ReportView::Ready(rendered) => {
            out.push_str("<article>\n");
            render_blocks(&mut out, &rendered.document.blocks, &rendered.diagrams);
            out.push_str("</article>\n");
        }
    }
    out.push_str("</section>\n");
    out
}

fn render_blocks(
    out: &mut String,
    blocks: &[Block],
    diagrams: &BTreeMap<DiagramId, RenderedDiagram>,
) {
    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                let level = (*level).clamp(1, 6);
                let _ = writeln!(
                    out,
                    "<h{level} class=\"heading heading-{level}\">{}</h{level}>",
                    render_inlines(content)
                );
            }
            Block::Paragraph(content) => {
                let _ = writeln!(out, "<p class=\"paragraph\">{}</p>", render_inlines(content));
            }
            Block::List { start, items } => {
                match start {
                    Some(1) => out.push_str("<ol class=\"list list-ordered\">\n"),
                    Some(start) => {
                        let _ = writeln!(out, "<ol class=\"list list-ordered\" start=\"{start}\">");
                    }
                    None => out.push_str("<ul class=\"list list-unordered\">\n"),
                }
                for item in items {
                    out.push_str("<li class=\"list-item\">\n");
                    render_blocks(out, item, diagrams);
                    out.push_str("</li>\n");
                }
                out.push_str(if start.is_some() { "</ol>\n" } else { "</ul>\n" });
            }
            Block::BlockQuote(children) => {
                out.push_str("<blockquote class=\"quote\">\n");
                render_blocks(out, children, diagrams);
                out.push_str("</blockquote>\n");
            }
            Block::Code { language, code } => {
                let class = language
                    .as_deref()
                    .map(|language| format!(" language-{}", escape(language)))
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "<pre class=\"code\"><code class=\"code-block{class}\">{}</code></pre>",
                    escape(code)
                );
            }
            Block::Diagram(slot) => match diagrams.get(&slot.id) {
                Some(RenderedDiagram::Image(image)) => {
                    let _ = writeln!(
                        out,
                        "<figure class=\"diagram\" id=\"{}\"><img alt=\"diagram\" src=\"{}\"></figure>",
                        escape(slot.id.as_str()),
                        image.data_uri()
                    );
                }
                Some(RenderedDiagram::Failed { message }) => {
                    let _ = writeln!(
                        out,
                        "<div class=\"diagram-error\" id=\"{}\" title=\"{}\">{DIAGRAM_FAILURE_PLACEHOLDER}</div>",
                        escape(slot.id.as_str()),
                        escape(message)
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        "<pre class=\"code\"><code class=\"code-block language-mermaid\">{}</code></pre>",
                        escape(&slot.source)
                    );
                }
            },
            Block::Rule => out.push_str("<hr class=\"rule\">\n"),
        }
    }
}

fn render_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(&escape(text)),
            Inline::Code(code) => {
                let _ = write!(out, "<code class=\"code-inline\">{}</code>", escape(code));
            }
            Inline::Emphasis(children) => {
                let _ = write!(out, "<em>{}</em>", render_inlines(children));
            }
            Inline::Strong(children) => {
                let _ = write!(out, "<strong>{}</strong>", render_inlines(children));
            }
            Inline::Strikethrough(children) => {
                let _ = write!(out, "<del>{}</del>", render_inlines(children));
            }
            Inline::Link { href, content } => {
                let _ = write!(
                    out,
                    "<a class=\"link\" href=\"{}\">{}</a>",
                    safe_href(href),
                    render_inlines(content)
                );
            }
            Inline::Image { src, alt } => {
                let _ = write!(
                    out,
                    "<img class=\"inline-image\" src=\"{}\" alt=\"{}\">",
                    safe_href(src),
                    escape(alt)
                );
            }
            Inline::SoftBreak => out.push('\n'),
            Inline::HardBreak => out.push_str("<br>\n"),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagram::{DiagramImage, DiagramSlot},
        document::Document,
        evidence::EvidenceList,
        transform::TransformRegistry,
        view::RenderedDocument,
    };
    use shared::domain::OptionId;

    #[test]
    fn escapes_markup_in_text_and_tooltips() {
        let option = RankedOptionView {
            rank: 1,
            option_id: OptionId(4),
            score: "0.50".into(),
            is_winner: true,
            evidence: EvidenceList::from_reasons(&["GEMINI: <b>risky</b> & \"odd\"".to_string()]),
        };

        let html = render_ranking(&[option]);

        assert!(html.contains("class=\"option winner\""));
        assert!(html.contains("&lt;b&gt;risky&lt;/b&gt; &amp; &quot;odd&quot;"));
        assert!(html.contains("title=\"GEMINI: &lt;b&gt;"));
    }

    #[test]
    fn headings_paragraphs_and_lists_get_distinct_classes() {
        let document = Document::parse(
            "# Top\n\n## Sub\n\nBody text.\n\n1. one\n2. two\n\n- a\n",
            &TransformRegistry::default(),
        );
        let report = ReportView::Ready(RenderedDocument {
            document,
            diagrams: BTreeMap::new(),
        });

        let html = render_report(&report);

        assert!(html.contains("<h1 class=\"heading heading-1\">Top</h1>"));
        assert!(html.contains("<h2 class=\"heading heading-2\">Sub</h2>"));
        assert!(html.contains("<p class=\"paragraph\">Body text.</p>"));
        assert!(html.contains("<ol class=\"list list-ordered\">"));
        assert!(html.contains("<ul class=\"list list-unordered\">"));
    }

    #[test]
    fn diagrams_embed_as_data_uri_or_error_box() {
        let ok = DiagramSlot {
            id: DiagramId::for_index(0),
            source: "graph TD; A-->B".into(),
        };
        let bad = DiagramSlot {
            id: DiagramId::for_index(1),
            source: "graph ???".into(),
        };
        let mut diagrams = BTreeMap::new();
        diagrams.insert(ok.id.clone(), RenderedDiagram::Image(DiagramImage::svg("<svg/>")));
        diagrams.insert(
            bad.id.clone(),
            RenderedDiagram::Failed {
                message: "parse error".into(),
            },
        );
        let report = ReportView::Ready(RenderedDocument {
            document: Document {
                blocks: vec![Block::Diagram(ok), Block::Diagram(bad)],
            },
            diagrams,
        });

        let html = render_report(&report);

        assert!(html.contains("<figure class=\"diagram\" id=\"mermaid-0\"><img alt=\"diagram\" src=\"data:image/svg+xml;base64,PHN2Zy8+\">"));
        assert!(html.contains("id=\"mermaid-1\" title=\"parse error\">Failed to render diagram</div>"));
    }

    #[test]
    fn pending_report_renders_placeholder() {
        let html = render_report(&ReportView::Pending);
        assert!(html.contains("Report generation pending..."));
        assert!(!html.contains("<article>"));
    }

    #[test]
    fn script_links_are_neutralized() {
        let html = render_inlines(&[Inline::Link {
            href: "JavaScript:alert(1)".into(),
            content: vec![Inline::Text("click".into())],
        }]);
        assert_eq!(html, "<a class=\"link\" href=\"#\">click</a>");
    }
}
