//! Reader configuration.
//!
//! Handles loading, validating, and merging `infopath.toml`. Stock defaults
//! are the base layer; a user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `infopath.toml` is read from the directory passed as `--config-dir`
//! (the working directory by default). A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [schema]
//! treat_grouped_checkboxes_as_selects = false  # checkbox groups as multiselects
//!
//! [render]
//! xsltproc = "xsltproc"         # XSLT 1.0 processor binary
//! replace_text_boxes = true     # text box spans become <input type="text">
//! wrap_in_form = true           # wrap body content in the manifest's <form>
//!
//! [template]
//! placeholder = "{{ form.{name} }}"  # {name} is replaced by the field name
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILE: &str = "infopath.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Reader configuration loaded from `infopath.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// Field-table inference settings.
    pub schema: SchemaConfig,
    /// View rendering settings.
    pub render: RenderConfig,
    /// Template conversion settings.
    pub template: TemplateConfig,
}

impl ReaderConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.render.xsltproc.trim().is_empty() {
            return Err(ConfigError::Validation(
                "render.xsltproc must not be empty".into(),
            ));
        }
        if !self.template.placeholder.contains("{name}") {
            return Err(ConfigError::Validation(
                "template.placeholder must contain {name}".into(),
            ));
        }
        Ok(())
    }
}

/// Field-table inference settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Present folded checkbox groups as multiselects.
    pub treat_grouped_checkboxes_as_selects: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Program used by [`crate::render::Xsltproc`].
    pub xsltproc: String,
    pub replace_text_boxes: bool,
    /// Wrap rendered body content in a `<form>` built from the manifest's
    /// submit target.
    pub wrap_in_form: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            xsltproc: "xsltproc".to_string(),
            replace_text_boxes: true,
            wrap_in_form: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    /// Replacement for each bound control; `{name}` becomes the field name.
    pub placeholder: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            placeholder: "{{ form.{name} }}".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ReaderConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `infopath.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ReaderConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ReaderConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `infopath.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<ReaderConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `infopath.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# InfoPath Reader Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from the directory given with --config-dir
# (the current directory by default). Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Field-table inference
# ---------------------------------------------------------------------------
[schema]
# Schema groups made of boolean members are folded into one checkbox field.
# Set to true to present those fields as multiselects instead.
treat_grouped_checkboxes_as_selects = false

# ---------------------------------------------------------------------------
# View rendering
# ---------------------------------------------------------------------------
[render]
# XSLT 1.0 processor. Called as: <xsltproc> <stylesheet> -
xsltproc = "xsltproc"

# Replace InfoPath text box spans with literal <input type="text"> elements.
replace_text_boxes = true

# Wrap the rendered body in a <form> using the manifest's submit target.
wrap_in_form = true

# ---------------------------------------------------------------------------
# Template conversion
# ---------------------------------------------------------------------------
[template]
# Text substituted for each bound control. {name} becomes the field name.
placeholder = "{{ form.{name} }}"
"##
}
