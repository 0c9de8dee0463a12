//! Declarative figure configuration
//!
//! A [`FigureConfig`] describes a figure in YAML or JSON and turns into a
//! [`FigureBuilder`]. Only token-valued options can be expressed; camera and
//! controller instances need the builder API.

use crate::core::surface::CanvasBackend;
use crate::error::{LayoutError, Result};
use crate::figure::{Figure, FigureBuilder, DEFAULT_SIZE};
use crate::layout::controllers::ControllerIds;
use crate::layout::grid::CellSpec;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Environment variable holding the path of an optional figure config file.
pub const CONFIG_ENV: &str = "GRIDPLOT_CONFIG";

/// One token for every cell, a flat row-major list, or nested rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenSpec {
    One(String),
    Flat(Vec<String>),
    Nested(Vec<Vec<String>>),
}

impl TokenSpec {
    pub fn into_cell_spec<T: From<String>>(self) -> CellSpec<T> {
        match self {
            TokenSpec::One(token) => CellSpec::all(token),
            TokenSpec::Flat(tokens) => CellSpec::each(tokens),
            TokenSpec::Nested(rows) => CellSpec::rows(rows),
        }
    }

    /// All tokens in row-major order
    pub fn into_list(self) -> Vec<String> {
        match self {
            TokenSpec::One(token) => vec![token],
            TokenSpec::Flat(tokens) => tokens,
            TokenSpec::Nested(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

impl From<&str> for TokenSpec {
    fn from(token: &str) -> Self {
        TokenSpec::One(token.to_string())
    }
}

/// Serialized form of [`ControllerIds`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControllerIdsConfig {
    /// Only `"sync"` is accepted
    Token(String),
    Flat(Vec<i64>),
    Nested(Vec<Vec<i64>>),
    Names(Vec<Vec<String>>),
}

impl TryFrom<ControllerIdsConfig> for ControllerIds {
    type Error = LayoutError;

    fn try_from(config: ControllerIdsConfig) -> Result<Self> {
        Ok(match config {
            ControllerIdsConfig::Token(token) => ControllerIds::from_token(&token)?,
            ControllerIdsConfig::Flat(ids) => ControllerIds::ById(CellSpec::Each(ids)),
            ControllerIdsConfig::Nested(rows) => ControllerIds::by_id(rows),
            ControllerIdsConfig::Names(groups) => ControllerIds::ByName(groups),
        })
    }
}

/// Figure description loaded from YAML or JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureConfig {
    /// Grid `(rows, cols)`
    pub shape: (usize, usize),
    /// `"2d"` / `"3d"` tokens
    pub cameras: TokenSpec,
    pub controller_types: Option<TokenSpec>,
    pub controller_ids: Option<ControllerIdsConfig>,
    pub names: Option<TokenSpec>,
    /// Canvas `(width, height)` in logical pixels
    pub size: (u32, u32),
    /// Canvas backend name, e.g. `"offscreen"`
    pub canvas: Option<String>,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            shape: (1, 1),
            cameras: TokenSpec::from("2d"),
            controller_types: None,
            controller_ids: None,
            names: None,
            size: DEFAULT_SIZE,
            canvas: None,
        }
    }
}

impl FigureConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LayoutError::Config(e.to_string()))
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LayoutError::Config(e.to_string()))
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| LayoutError::Config(e.to_string()))
    }

    /// Read a config file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| LayoutError::Config(format!("failed to read {}: {e}", path.display())))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.map_err(|e| match e {
            LayoutError::Config(msg) => LayoutError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Builder carrying every option of this config
    pub fn builder(self) -> Result<FigureBuilder> {
        let mut builder = Figure::builder()
            .shape(self.shape.0, self.shape.1)
            .cameras(self.cameras.into_cell_spec())
            .size(self.size.0, self.size.1);
        if let Some(types) = self.controller_types {
            builder = builder.controller_types(types.into_cell_spec());
        }
        if let Some(ids) = self.controller_ids {
            builder = builder.controller_ids(ids.try_into()?);
        }
        if let Some(names) = self.names {
            builder = builder.names(names.into_list());
        }
        if let Some(canvas) = self.canvas {
            builder = builder.canvas_backend(canvas.parse::<CanvasBackend>()?);
        }
        Ok(builder)
    }

    pub fn build(self) -> Result<Figure> {
        self.builder()?.build()
    }
}

/// Load the config named by [`CONFIG_ENV`], or the default when it is unset.
pub fn load_config() -> Result<FigureConfig> {
    match env::var(CONFIG_ENV) {
        Ok(path) if path.trim().is_empty() => {
            log::warn!(target: "gridplot", "{CONFIG_ENV} is set but empty; using defaults");
            Ok(FigureConfig::default())
        }
        Ok(path) => {
            let config = FigureConfig::from_path(&path)?;
            log::debug!(target: "gridplot", "loaded figure config from {path}");
            Ok(config)
        }
        Err(_) => Ok(FigureConfig::default()),
    }
}
