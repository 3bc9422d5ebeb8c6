//! Decision workspace at `/decisions/:id`.

use std::{path::Path, sync::Arc};

use client_core::{
    evidence::read_evidence, AnalysisTrigger, DecisionQueryCache, FetchOutcome, UploadController,
    UploadState,
};
use report_render::{RenderedView, ResultRenderer};
use shared::{
    domain::{DecisionId, EvidenceDocument},
    protocol::{DecisionResult, UploadAck},
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    app::AppContext,
    events::{UiError, UiErrorContext},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionSnapshot {
    pub decision_id: DecisionId,
    pub run_label: &'static str,
    pub is_fetching: bool,
    pub upload: UploadState,
    pub banner: Option<String>,
    pub view: Option<RenderedView>,
}

pub struct DecisionPage {
    decision_id: DecisionId,
    cache: Arc<DecisionQueryCache>,
    uploads: UploadController,
    renderer: Arc<ResultRenderer>,
    banner: Mutex<Option<UiError>>,
    /// Last rendered result, reused while the cache still holds the same `Arc`.
    rendered: Mutex<Option<(Arc<DecisionResult>, RenderedView)>>,
}

impl DecisionPage {
    pub fn new(ctx: &AppContext, decision_id: DecisionId) -> Self {
        Self {
            decision_id,
            cache: ctx.cache.clone(),
            uploads: UploadController::new(ctx.api.clone(), ctx.cache.clone()),
            renderer: ctx.renderer.clone(),
            banner: Mutex::new(None),
            rendered: Mutex::new(None),
        }
    }

    pub fn decision_id(&self) -> DecisionId {
        self.decision_id
    }

    pub async fn trigger(&self) -> AnalysisTrigger {
        self.cache.trigger_for(self.decision_id).await
    }

    pub async fn banner(&self) -> Option<UiError> {
        self.banner.lock().await.clone()
    }

    pub async fn dismiss_banner(&self) {
        self.banner.lock().await.take();
    }

    pub async fn upload_state(&self) -> UploadState {
        self.uploads.state().await
    }

    /// Reads `path` from disk and uploads it as evidence.
    pub async fn add_evidence_file(&self, path: &Path) -> Result<UploadAck, UiError> {
        let document = match read_evidence(path).await {
            Ok(document) => document,
            Err(err) => return Err(self.fail(UiErrorContext::Upload, &err).await),
        };
        self.add_evidence(document).await
    }

    pub async fn add_evidence(&self, document: EvidenceDocument) -> Result<UploadAck, UiError> {
        match self.uploads.upload(self.decision_id, document).await {
            Ok(ack) => {
                self.dismiss_banner().await;
                Ok(ack)
            }
            Err(err) => Err(self.fail(UiErrorContext::Upload, &err).await),
        }
    }

    /// Runs (or re-runs) the analysis and returns the resulting view.
    ///
    /// `Ok(None)` means the fetch was superseded by a newer run or an upload.
    pub async fn run_analysis(&self) -> Result<Option<RenderedView>, UiError> {
        match self.cache.run_analysis(self.decision_id).await {
            Ok(FetchOutcome::Applied(_)) => {
                self.dismiss_banner().await;
                Ok(self.view().await)
            }
            Ok(FetchOutcome::Superseded) => {
                info!(decision_id = %self.decision_id, "analysis result superseded");
                Ok(None)
            }
            Err(err) => Err(self.fail(UiErrorContext::RunAnalysis, &err).await),
        }
    }

    /// View of the cached result, or `None` before the first run and after an upload.
    pub async fn view(&self) -> Option<RenderedView> {
        let cached = self.cache.cached(self.decision_id).await;
        let mut rendered = self.rendered.lock().await;
        let Some(cached) = cached else {
            *rendered = None;
            return None;
        };
        if let Some((source, view)) = rendered.as_ref() {
            if Arc::ptr_eq(source, &cached) {
                return Some(view.clone());
            }
        }

        debug!(decision_id = %self.decision_id, "rendering decision result");
        let view = self.renderer.render(&cached).await;
        *rendered = Some((cached, view.clone()));
        Some(view)
    }

    pub async fn snapshot(&self) -> DecisionSnapshot {
        DecisionSnapshot {
            decision_id: self.decision_id,
            run_label: self.trigger().await.label(),
            is_fetching: self.cache.is_fetching(self.decision_id).await,
            upload: self.upload_state().await,
            banner: self.banner().await.map(|err| err.banner()),
            view: self.view().await,
        }
    }

    async fn fail(&self, context: UiErrorContext, err: &client_core::ClientError) -> UiError {
        let ui_error = UiError::from_client(context, err);
        *self.banner.lock().await = Some(ui_error.clone());
        ui_error
    }
}
