use std::fs;
use std::path::{Path, PathBuf};

use chargen_core::fields::{FieldMap, canonical_field_names};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const STANDARD_TEMPLATE_NAME: &str = "ATDW Character Sheet";

#[derive(Debug, thiserror::Error)]
pub enum FillError {
    #[error("template {path} not found")]
    TemplateMissing { path: PathBuf },
    #[error("failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid template {path}: {message}")]
    TemplateInvalid { path: PathBuf, message: String },
    #[error("failed to encode filled sheet: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The set of named form fields a sheet document exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SheetTemplate {
    pub name: String,
    pub fields: Vec<String>,
}

impl SheetTemplate {
    pub fn standard() -> Self {
        Self {
            name: STANDARD_TEMPLATE_NAME.to_string(),
            fields: canonical_field_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, FillError> {
        let bytes = fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FillError::TemplateMissing {
                    path: path.to_path_buf(),
                }
            } else {
                FillError::TemplateRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let template: Self =
            serde_json::from_slice(&bytes).map_err(|e| FillError::TemplateInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if template.fields.is_empty() {
            return Err(FillError::TemplateInvalid {
                path: path.to_path_buf(),
                message: "template declares no fields".to_string(),
            });
        }
        Ok(template)
    }

    pub fn sorted_field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Field names containing `query`, ignoring case, in sorted order.
    pub fn filter_fields(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.sorted_field_names()
            .into_iter()
            .filter(|name| name.to_lowercase().contains(&query))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillOptions {
    /// Ask viewers to regenerate field appearances so filled values show.
    pub need_appearances: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            need_appearances: true,
        }
    }
}

/// Places a field map onto a sheet template and returns the filled document.
pub trait SheetFiller {
    fn fill(
        &self,
        fields: &FieldMap,
        template: &SheetTemplate,
        options: FillOptions,
    ) -> Result<Vec<u8>, FillError>;
}

/// Writes the filled sheet as a JSON document: every template field in
/// template order, blank when the map has no value for it.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSheetFiller;

impl SheetFiller for JsonSheetFiller {
    fn fill(
        &self,
        fields: &FieldMap,
        template: &SheetTemplate,
        options: FillOptions,
    ) -> Result<Vec<u8>, FillError> {
        let mut values = JsonMap::new();
        for name in &template.fields {
            let value = fields.get(name).unwrap_or("");
            values.insert(name.clone(), JsonValue::String(value.to_string()));
        }
        for key in fields.keys() {
            if !values.contains_key(key) {
                tracing::debug!(field = key, template = %template.name, "field not on template; dropped");
            }
        }

        let mut doc = JsonMap::new();
        doc.insert(
            "template".to_string(),
            JsonValue::String(template.name.clone()),
        );
        doc.insert(
            "need_appearances".to_string(),
            JsonValue::Bool(options.need_appearances),
        );
        doc.insert("fields".to_string(), JsonValue::Object(values));

        let mut bytes = serde_json::to_vec_pretty(&JsonValue::Object(doc))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
