use ndarray::{Array1, ArrayD, Axis};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use crate::error::{Error, Result};

// Image file extensions accepted when scanning a directory
pub const IMG_EXTS: &[&str] = &["jpg", "JPG", "jpeg", "png", "tif", "tiff", "bmp"];

pub static IMG_EXTS_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();

/// Get the image extensions set
pub fn get_img_exts_set() -> &'static HashSet<&'static str> {
    IMG_EXTS_SET.get_or_init(|| IMG_EXTS.iter().copied().collect())
}

/// One per-object annotation field.
///
/// Numeric fields carry the objects along axis 0, so `bboxes` for `n` objects
/// is an `n x 4` array and `labels` is a length-`n` integer array. Anything
/// that is not numeric (text transcriptions, polygon lists of varying size)
/// lives in `List`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnField {
    Int(ArrayD<i64>),
    Float(ArrayD<f64>),
    List(Vec<Value>),
}

impl AnnField {
    pub fn kind(&self) -> &'static str {
        match self {
            AnnField::Int(a) if a.ndim() == 0 => "scalar int array",
            AnnField::Float(a) if a.ndim() == 0 => "scalar float array",
            AnnField::Int(_) => "int array",
            AnnField::Float(_) => "float array",
            AnnField::List(_) => "list",
        }
    }

    /// Number of objects, or `None` for a scalar array without an object axis.
    pub fn len(&self) -> Option<usize> {
        match self {
            AnnField::Int(a) => a.shape().first().copied(),
            AnnField::Float(a) => a.shape().first().copied(),
            AnnField::List(v) => Some(v.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len().unwrap_or(0) == 0
    }

    /// Keep the objects at `inds`, in that order.
    ///
    /// Arrays are gathered along the object axis; lists are rebuilt element by
    /// element. The field must have an object axis and every index must be in
    /// bounds, which [`Annotations::validate`] guarantees.
    pub(crate) fn select(&self, inds: &[usize]) -> AnnField {
        match self {
            AnnField::Int(a) => AnnField::Int(a.select(Axis(0), inds)),
            AnnField::Float(a) => AnnField::Float(a.select(Axis(0), inds)),
            AnnField::List(v) => AnnField::List(inds.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

impl From<Vec<i64>> for AnnField {
    fn from(values: Vec<i64>) -> Self {
        AnnField::Int(Array1::from(values).into_dyn())
    }
}

impl From<Vec<f64>> for AnnField {
    fn from(values: Vec<f64>) -> Self {
        AnnField::Float(Array1::from(values).into_dyn())
    }
}

impl From<Vec<Value>> for AnnField {
    fn from(values: Vec<Value>) -> Self {
        AnnField::List(values)
    }
}

impl From<ArrayD<i64>> for AnnField {
    fn from(array: ArrayD<i64>) -> Self {
        AnnField::Int(array)
    }
}

impl From<ArrayD<f64>> for AnnField {
    fn from(array: ArrayD<f64>) -> Self {
        AnnField::Float(array)
    }
}

/// The annotation block of a record: field name to per-object values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    fields: BTreeMap<String, AnnField>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, field: impl Into<AnnField>) -> Self {
        self.insert(key, field);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, field: impl Into<AnnField>) {
        self.fields.insert(key.into(), field.into());
    }

    pub fn get(&self, key: &str) -> Option<&AnnField> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AnnField> {
        self.fields.get_mut(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnnField)> {
        self.fields.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut AnnField)> {
        self.fields.iter_mut()
    }

    /// True when the block has no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The integer class labels, if present and integer typed.
    pub fn labels(&self) -> Option<&ArrayD<i64>> {
        match self.fields.get("labels") {
            Some(AnnField::Int(labels)) => Some(labels),
            _ => None,
        }
    }

    /// Number of objects, taken from `labels` when present.
    pub fn num_objects(&self) -> usize {
        self.fields
            .get("labels")
            .or_else(|| self.fields.values().next())
            .and_then(AnnField::len)
            .unwrap_or(0)
    }

    /// Check that every field has an object axis of the same length.
    pub fn validate(&self, id: &str) -> Result<usize> {
        let expected = self.num_objects();
        for (key, field) in &self.fields {
            match field.len() {
                None => {
                    return Err(Error::UnsupportedField {
                        key: key.clone(),
                        kind: field.kind(),
                    })
                }
                Some(found) if found != expected => {
                    return Err(Error::LengthMismatch {
                        id: id.to_string(),
                        key: key.clone(),
                        expected,
                        found,
                    })
                }
                Some(_) => {}
            }
        }
        Ok(expected)
    }

    /// Keep only the objects at `inds` in every field.
    ///
    /// Only called on a block that passed [`Annotations::validate`].
    pub(crate) fn select(&mut self, inds: &[usize]) {
        for field in self.fields.values_mut() {
            *field = field.select(inds);
        }
    }
}

/// One image of a dataset together with its annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ann: Option<Annotations>,
    /// Any other metadata a parser attached; `null` counts as unset.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, filename: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
            width,
            height,
            ann: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_ann(mut self, ann: Annotations) -> Self {
        self.ann = Some(ann);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// True when the record has no annotation block or an empty one.
    pub fn has_no_ann(&self) -> bool {
        self.ann.as_ref().is_none_or(Annotations::is_empty)
    }
}

// Counters reported by the label remapping passes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemapStats {
    pub records_seen: usize,
    pub records_filtered: usize,
    pub objects_kept: usize,
    pub objects_dropped: usize,
}

impl RemapStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Remap Summary ===");
        log::info!("Records seen: {}", self.records_seen);
        log::info!("Objects kept: {}", self.objects_kept);
        if self.objects_dropped > 0 {
            log::info!(
                "Objects dropped: {} (from {} records)",
                self.objects_dropped,
                self.records_filtered
            );
        }
    }
}
