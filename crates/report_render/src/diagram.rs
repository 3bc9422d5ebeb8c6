//! Out-of-band compilation of diagram blocks embedded in a report.

use std::{collections::BTreeMap, fmt, path::PathBuf, process::Stdio, sync::Arc};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

/// Fenced-block language routed to the diagram renderer.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";
pub const DIAGRAM_FAILURE_PLACEHOLDER: &str = "Failed to render diagram";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DiagramId(String);

impl DiagramId {
    pub fn for_index(index: usize) -> Self {
        Self(format!("{DIAGRAM_LANGUAGE}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramSlot {
    pub id: DiagramId,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramImage {
    pub media_type: String,
    #[serde(serialize_with = "serialize_base64")]
    pub bytes: Vec<u8>,
}

impl DiagramImage {
    pub fn svg(markup: impl Into<String>) -> Self {
        Self {
            media_type: "image/svg+xml".to_string(),
            bytes: markup.into().into_bytes(),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

fn serialize_base64<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RenderedDiagram {
    Image(DiagramImage),
    Failed { message: String },
}

impl RenderedDiagram {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("diagram source is empty")]
    EmptySource,
    #[error("failed to launch diagram compiler '{program}': {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("diagram compiler exited with {status}: {stderr}")]
    Compile { status: String, stderr: String },
    #[error("diagram workspace i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Compiles diagram source into an image.
#[async_trait]
pub trait DiagramEngine: Send + Sync {
    async fn compile(&self, id: &DiagramId, source: &str) -> Result<DiagramImage, DiagramError>;
}

/// Replaces non-breaking spaces and strips one trailing newline.
pub fn normalize_source(source: &str) -> String {
    let normalized = source.replace('\u{a0}', " ");
    let trimmed = normalized
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(normalized.as_str());
    trimmed.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramConfig {
    pub program: PathBuf,
    pub theme: String,
    pub background: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("mmdc"),
            theme: "neutral".into(),
            background: "white".into(),
        }
    }
}

/// Runs the Mermaid CLI in a scratch directory per render.
pub struct MermaidCliEngine {
    config: DiagramConfig,
}

impl MermaidCliEngine {
    pub fn new(config: DiagramConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DiagramEngine for MermaidCliEngine {
    async fn compile(&self, id: &DiagramId, source: &str) -> Result<DiagramImage, DiagramError> {
        let workdir = tokio::task::spawn_blocking(tempfile::tempdir)
            .await
            .map_err(std::io::Error::other)??;
        let input = workdir.path().join(format!("{id}.mmd"));
        let output = workdir.path().join(format!("{id}.svg"));
        tokio::fs::write(&input, source).await?;

        let program = self.config.program.display().to_string();
        debug!(diagram_id = %id, program = %program, "compiling diagram");
        let result = Command::new(&self.config.program)
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .arg("--theme")
            .arg(&self.config.theme)
            .arg("--backgroundColor")
            .arg(&self.config.background)
            .arg("--quiet")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| DiagramError::Launch { program, source })?;

        if !result.status.success() {
            return Err(DiagramError::Compile {
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let svg = tokio::fs::read(&output).await?;
        Ok(DiagramImage {
            media_type: "image/svg+xml".to_string(),
            bytes: svg,
        })
    }
}

pub struct DiagramRenderer {
    engine: Arc<dyn DiagramEngine>,
}

impl DiagramRenderer {
    pub fn new(engine: Arc<dyn DiagramEngine>) -> Self {
        Self { engine }
    }

    /// Never fails: a compile error becomes an inline placeholder and a log line.
    pub async fn render(&self, slot: &DiagramSlot) -> RenderedDiagram {
        let source = normalize_source(&slot.source);
        let compiled = if source.trim().is_empty() {
            Err(DiagramError::EmptySource)
        } else {
            self.engine.compile(&slot.id, &source).await
        };

        match compiled {
            Ok(image) => RenderedDiagram::Image(image),
            Err(err) => {
                error!(diagram_id = %slot.id, error = %err, "failed to render diagram");
                RenderedDiagram::Failed {
                    message: err.to_string(),
                }
            }
        }
    }

    /// Renders every slot concurrently; one failure does not affect the others.
    pub async fn render_all(&self, slots: &[&DiagramSlot]) -> BTreeMap<DiagramId, RenderedDiagram> {
        let rendered = join_all(slots.iter().map(|slot| async move {
            (slot.id.clone(), self.render(slot).await)
        }))
        .await;
        rendered.into_iter().collect()
    }
}

#[cfg(test)]
#[path = "tests/diagram_tests.rs"]
mod tests;
