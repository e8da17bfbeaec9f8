//! Categorical label codec.
//!
//! Each categorical field has a frozen, ordered class list produced at
//! training time; a value's code is its index in that list. The exercise and
//! diet models were trained independently, so each owns an [`EncoderSet`] and
//! callers must use the set matching the model they feed. The two sets are
//! never merged even when they describe the same logical field.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use vitafit_core::error::CoreError;

use crate::error::ArtifactError;

/// Frozen bidirectional mapping between category labels and integer codes.
///
/// Exported class lists may hold numbers (`frequency_per_week` is trained on
/// integer labels); those are kept in their JSON text form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<ClassLabel>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassLabel {
    Text(String),
    Number(serde_json::Number),
}

impl From<Vec<ClassLabel>> for LabelEncoder {
    fn from(labels: Vec<ClassLabel>) -> Self {
        Self::new(labels.into_iter().map(|label| match label {
            ClassLabel::Text(text) => text,
            ClassLabel::Number(n) => n.to_string(),
        }))
    }
}

impl LabelEncoder {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Code for `value`, matched case-insensitively against the class list.
    pub fn encode(&self, field: &str, value: &str) -> Result<u32, CoreError> {
        let needle = value.trim().to_lowercase();
        self.classes
            .iter()
            .position(|c| c.to_lowercase() == needle)
            .map(|i| i as u32)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid {field} value: '{value}'. Must be one of: [{}]",
                    self.classes.join(", ")
                ))
            })
    }

    /// Label for `code`. A code outside the class list means the model and
    /// encoder artifacts are out of sync.
    pub fn decode(&self, field: &str, code: u32) -> Result<&str, CoreError> {
        self.classes
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| {
                CoreError::Downstream(format!(
                    "{field} code {code} is outside the encoder's {} classes",
                    self.classes.len()
                ))
            })
    }
}

/// Named collection of encoders trained alongside one model.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    name: &'static str,
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderSet {
    pub fn new(name: &'static str, encoders: BTreeMap<String, LabelEncoder>) -> Self {
        Self { name, encoders }
    }

    /// Read a `{ "field": ["class", ...] }` JSON file.
    pub fn load(name: &'static str, path: &Path) -> Result<Self, ArtifactError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: display.clone(),
            source,
        })?;
        let encoders: BTreeMap<String, LabelEncoder> = serde_json::from_str(&text)
            .map_err(|source| ArtifactError::Json {
                path: display,
                source,
            })?;
        Ok(Self::new(name, encoders))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.encoders.contains_key(field)
    }

    /// Fail unless every listed field has a non-empty encoder.
    pub fn require(&self, fields: &[&str]) -> Result<(), ArtifactError> {
        for field in fields {
            match self.encoders.get(*field) {
                Some(e) if !e.classes.is_empty() => {}
                Some(_) => {
                    return Err(ArtifactError::Invalid(format!(
                        "{} encoder for '{field}' has no classes",
                        self.name
                    )))
                }
                None => {
                    return Err(ArtifactError::Invalid(format!(
                        "{} encoders are missing '{field}'",
                        self.name
                    )))
                }
            }
        }
        Ok(())
    }

    fn encoder(&self, field: &str) -> Result<&LabelEncoder, CoreError> {
        self.encoders.get(field).ok_or_else(|| {
            CoreError::Configuration(format!("{} encoder for '{field}' is not loaded", self.name))
        })
    }

    pub fn encode(&self, field: &str, value: &str) -> Result<u32, CoreError> {
        self.encoder(field)?.encode(field, value)
    }

    pub fn decode(&self, field: &str, code: u32) -> Result<&str, CoreError> {
        self.encoder(field)?.decode(field, code)
    }
}
