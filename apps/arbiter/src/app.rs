//! Shared objects built once at start-up and handed to every page.

use std::sync::Arc;

use anyhow::Context;
use client_core::{DecisionApi, DecisionQueryCache, HttpDecisionApi};
use report_render::{DiagramEngine, MermaidCliEngine, ResultRenderer};
use shared::error::ValidationError;
use tracing::info;

use crate::{
    config::Settings,
    events::{UiError, UiErrorCategory, UiErrorContext},
    pages::{DecisionPage, HomePage},
    routes::Route,
};

#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<dyn DecisionApi>,
    pub cache: Arc<DecisionQueryCache>,
    pub renderer: Arc<ResultRenderer>,
}

pub enum Page {
    Home(HomePage),
    Decision(DecisionPage),
    /// Rendered without contacting the backend.
    Invalid(UiError),
}

impl AppContext {
    pub fn new(api: Arc<dyn DecisionApi>, engine: Arc<dyn DiagramEngine>) -> Self {
        Self {
            cache: Arc::new(DecisionQueryCache::new(api.clone())),
            renderer: Arc::new(ResultRenderer::with_engine(engine)),
            api,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api = HttpDecisionApi::with_headers(&settings.api_url, &settings.headers)
            .with_context(|| format!("failed to configure backend client for '{}'", settings.api_url))?;
        info!(
            api_url = %api.base_url(),
            mmdc = %settings.mmdc_path.display(),
            theme = %settings.diagram_theme,
            "application context ready"
        );
        let engine = MermaidCliEngine::new(settings.diagram_config());
        Ok(Self::new(Arc::new(api), Arc::new(engine)))
    }

    pub fn open(&self, route: &Route) -> Page {
        match route {
            Route::Home => Page::Home(HomePage::new(self.cache.clone())),
            Route::Decision(id) => Page::Decision(DecisionPage::new(self, *id)),
            Route::InvalidDecision(raw) => Page::Invalid(UiError::from_client(
                UiErrorContext::Navigation,
                &ValidationError::InvalidDecisionId(raw.clone()).into(),
            )),
            Route::NotFound(path) => Page::Invalid(UiError::new(
                UiErrorCategory::NotFound,
                UiErrorContext::Navigation,
                format!("no page at '{path}'"),
            )),
        }
    }
}
