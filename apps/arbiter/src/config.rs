use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use report_render::DiagramConfig;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "arbiter.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub headers: BTreeMap<String, String>,
    pub mmdc_path: PathBuf,
    pub diagram_theme: String,
    pub diagram_background: String,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".into(),
            headers: BTreeMap::new(),
            mmdc_path: PathBuf::from("mmdc"),
            diagram_theme: "neutral".into(),
            diagram_background: "white".into(),
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn diagram_config(&self) -> DiagramConfig {
        DiagramConfig {
            program: self.mmdc_path.clone(),
            theme: self.diagram_theme.clone(),
            background: self.diagram_background.clone(),
        }
    }
}

/// Keys accepted in `arbiter.toml`. Unset keys keep the current value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_url: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    mmdc_path: Option<PathBuf>,
    diagram_theme: Option<String>,
    diagram_background: Option<String>,
    log_filter: Option<String>,
}

/// Defaults, then the config file, then the process environment.
///
/// An explicit `config_path` must exist; the default `arbiter.toml` is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    settings.headers.extend(file_cfg.headers);
    if let Some(v) = file_cfg.mmdc_path {
        settings.mmdc_path = v;
    }
    if let Some(v) = file_cfg.diagram_theme {
        settings.diagram_theme = v;
    }
    if let Some(v) = file_cfg.diagram_background {
        settings.diagram_background = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

/// `APP__*` names win over the short `ARBITER_*` aliases.
pub fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("ARBITER_API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = var("ARBITER_MMDC") {
        settings.mmdc_path = PathBuf::from(v);
    }
    if let Some(v) = var("APP__MMDC") {
        settings.mmdc_path = PathBuf::from(v);
    }

    if let Some(v) = var("APP__DIAGRAM_THEME") {
        settings.diagram_theme = v;
    }
    if let Some(v) = var("APP__DIAGRAM_BACKGROUND") {
        settings.diagram_background = v;
    }

    if let Some(v) = var("APP__LOG") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
