//! Turns an evaluated decision result into a displayable view.

use std::sync::Arc;

use shared::protocol::DecisionResult;
use tracing::debug;

pub mod diagram;
pub mod document;
pub mod evidence;
pub mod html;
pub mod text;
pub mod transform;
pub mod view;

pub use diagram::{
    DiagramConfig, DiagramEngine, DiagramError, DiagramId, DiagramImage, DiagramRenderer,
    DiagramSlot, MermaidCliEngine, RenderedDiagram,
};
pub use document::{Block, Document, Inline};
pub use transform::{BlockTransform, TransformContext, TransformRegistry};
pub use view::{RankedOptionView, RenderedDocument, RenderedView, ReportView};

pub struct ResultRenderer {
    registry: TransformRegistry,
    diagrams: DiagramRenderer,
}

impl ResultRenderer {
    pub fn new(registry: TransformRegistry, engine: Arc<dyn DiagramEngine>) -> Self {
        Self {
            registry,
            diagrams: DiagramRenderer::new(engine),
        }
    }

    /// Uses the default registry: literal code plus the diagram override.
    pub fn with_engine(engine: Arc<dyn DiagramEngine>) -> Self {
        Self::new(TransformRegistry::default(), engine)
    }

    pub async fn render(&self, result: &DecisionResult) -> RenderedView {
        let options = view::rank_options(result);
        let report = match result.report() {
            None => ReportView::Pending,
            Some(markdown) => {
                let document = Document::parse(markdown, &self.registry);
                let slots = document.diagrams();
                debug!(
                    decision_id = %result.decision_id,
                    blocks = document.blocks.len(),
                    diagrams = slots.len(),
                    "report parsed"
                );
                let diagrams = self.diagrams.render_all(&slots).await;
                ReportView::Ready(RenderedDocument { document, diagrams })
            }
        };

        RenderedView {
            decision_id: result.decision_id,
            options,
            report,
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
