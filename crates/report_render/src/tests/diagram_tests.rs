use super::*;
use tokio::sync::Mutex;

/// Accepts sources starting with `graph`; anything else is a syntax error.
#[derive(Default)]
struct FakeEngine {
    compiled: Mutex<Vec<(DiagramId, String)>>,
}

#[async_trait]
impl DiagramEngine for FakeEngine {
    async fn compile(&self, id: &DiagramId, source: &str) -> Result<DiagramImage, DiagramError> {
        self.compiled
            .lock()
            .await
            .push((id.clone(), source.to_string()));
        if !source.starts_with("graph") {
            return Err(DiagramError::Rejected(format!("syntax error in {id}")));
        }
        Ok(DiagramImage::svg(format!("<svg data-id=\"{id}\"/>")))
    }
}

fn slot(index: usize, source: &str) -> DiagramSlot {
    DiagramSlot {
        id: DiagramId::for_index(index),
        source: source.to_string(),
    }
}

#[test]
fn normalize_replaces_nbsp_and_strips_one_trailing_newline() {
    assert_eq!(normalize_source("graph\u{a0}TD\nA-->B\n"), "graph TD\nA-->B");
    assert_eq!(normalize_source("graph TD\r\n"), "graph TD");
    assert_eq!(normalize_source("graph TD\n\n"), "graph TD\n");
    assert_eq!(normalize_source("graph TD"), "graph TD");
}

#[test]
fn ids_are_stable_per_index() {
    assert_eq!(DiagramId::for_index(0).as_str(), "mermaid-0");
    assert_eq!(DiagramId::for_index(3), DiagramId::for_index(3));
}

#[tokio::test]
async fn renderer_compiles_normalized_source() {
    let engine = Arc::new(FakeEngine::default());
    let renderer = DiagramRenderer::new(engine.clone());

    let rendered = renderer.render(&slot(0, "graph\u{a0}LR\n")).await;

    assert_eq!(
        rendered,
        RenderedDiagram::Image(DiagramImage::svg("<svg data-id=\"mermaid-0\"/>"))
    );
    let compiled = engine.compiled.lock().await;
    assert_eq!(compiled[0].1, "graph LR");
}

#[tokio::test]
async fn failure_becomes_placeholder_instead_of_error() {
    let renderer = DiagramRenderer::new(Arc::new(FakeEngine::default()));

    let rendered = renderer.render(&slot(0, "not a diagram")).await;

    assert!(rendered.is_failed());
}

#[tokio::test]
async fn empty_source_is_not_sent_to_engine() {
    let engine = Arc::new(FakeEngine::default());
    let renderer = DiagramRenderer::new(engine.clone());

    let rendered = renderer.render(&slot(0, "\n")).await;

    assert!(rendered.is_failed());
    assert!(engine.compiled.lock().await.is_empty());
}

#[tokio::test]
async fn one_failing_diagram_does_not_affect_another() {
    let renderer = DiagramRenderer::new(Arc::new(FakeEngine::default()));
    let good = slot(0, "graph TD; A-->B");
    let bad = slot(1, "?? broken");

    let rendered = renderer.render_all(&[&good, &bad]).await;

    assert_eq!(rendered.len(), 2);
    assert!(!rendered[&good.id].is_failed());
    assert!(rendered[&bad.id].is_failed());
}

#[tokio::test]
async fn missing_cli_reports_launch_failure() {
    let engine = MermaidCliEngine::new(DiagramConfig {
        program: PathBuf::from("/nonexistent/arbiter-mmdc"),
        ..DiagramConfig::default()
    });

    let err = engine
        .compile(&DiagramId::for_index(0), "graph TD; A-->B")
        .await
        .expect_err("program does not exist");

    assert!(matches!(err, DiagramError::Launch { .. }));
}

/// Writes an executable shell script standing in for `mmdc`.
#[cfg(unix)]
fn fake_cli(dir: &std::path::Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("mmdc");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path
}

#[cfg(unix)]
#[tokio::test]
async fn cli_output_file_is_read_back_as_svg() {
    let dir = tempfile::tempdir().expect("tempdir");
    let program = fake_cli(
        dir.path(),
        r#"while [ "$#" -gt 0 ]; do
  if [ "$1" = "--output" ]; then out="$2"; fi
  shift
done
printf '<svg/>' > "$out""#,
    );
    let engine = MermaidCliEngine::new(DiagramConfig {
        program,
        ..DiagramConfig::default()
    });

    let image = engine
        .compile(&DiagramId::for_index(0), "graph TD; A-->B")
        .await
        .expect("compiled");

    assert_eq!(image, DiagramImage::svg("<svg/>"));
}

#[cfg(unix)]
#[tokio::test]
async fn cli_nonzero_exit_reports_compile_failure_with_stderr() {
    let dir = tempfile::tempdir().expect("tempdir");
    let program = fake_cli(dir.path(), "echo 'Parse error on line 2' >&2\nexit 3");
    let engine = MermaidCliEngine::new(DiagramConfig {
        program,
        ..DiagramConfig::default()
    });

    let err = engine
        .compile(&DiagramId::for_index(1), "graph ???")
        .await
        .expect_err("non-zero exit");

    match err {
        DiagramError::Compile { stderr, .. } => assert_eq!(stderr, "Parse error on line 2"),
        other => panic!("expected compile error, got {other:?}"),
    }
}
