//! Merging auxiliary per-image contents (extra labels, predictions, metadata)
//! into a base batch.

use clap::ValueEnum;
use log::{debug, info};
use ndarray::{concatenate, Axis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{AnnField, Annotations, Record};

/// How a prior's values combine with values already on the base.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeType {
    /// Keep base metadata, append prior objects to the base objects.
    #[default]
    Addition,
    /// Prior metadata and annotation fields overwrite the base.
    Replace,
}

impl fmt::Display for MergeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeType::Addition => f.write_str("addition"),
            MergeType::Replace => f.write_str("replace"),
        }
    }
}

impl FromStr for MergeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "addition" => Ok(MergeType::Addition),
            "replace" => Ok(MergeType::Replace),
            other => Err(format!(
                "merge type must be 'addition' or 'replace', got '{}'",
                other
            )),
        }
    }
}

/// Merge `priors` into `bases`, matching records by id.
///
/// Priors without a matching base are skipped. Reserved fields (`id`,
/// `filename`, `width`, `height`) are never touched; other metadata is copied
/// when the base lacks it or when merging with [`MergeType::Replace`].
pub fn merge_prior_contents(
    bases: &mut [Record],
    priors: &[Record],
    merge_type: MergeType,
) -> Result<()> {
    let mut id_mapper: HashMap<String, usize> = HashMap::with_capacity(bases.len());
    for (i, base) in bases.iter().enumerate() {
        id_mapper.entry(base.id.clone()).or_insert(i);
    }

    let mut merged = 0usize;
    for prior in priors {
        let Some(&index) = id_mapper.get(&prior.id) else {
            debug!("No base record for prior {}, skipping", prior.id);
            continue;
        };
        merge_record(&mut bases[index], prior, merge_type)?;
        merged += 1;
    }
    info!(
        "Merged {} of {} prior records ({})",
        merged,
        priors.len(),
        merge_type
    );
    Ok(())
}

fn merge_record(base: &mut Record, prior: &Record, merge_type: MergeType) -> Result<()> {
    for (key, value) in &prior.extra {
        let unset = base.extra.get(key).is_none_or(|v| v.is_null());
        if unset || merge_type == MergeType::Replace {
            base.extra.insert(key.clone(), value.clone());
        }
    }

    let Some(prior_ann) = &prior.ann else {
        return Ok(());
    };
    if base.has_no_ann() {
        base.ann = Some(prior_ann.clone());
        return Ok(());
    }
    if let Some(base_ann) = base.ann.as_mut() {
        merge_annotations(&base.id, base_ann, prior_ann, merge_type)?;
    }
    Ok(())
}

fn merge_annotations(
    id: &str,
    base_ann: &mut Annotations,
    prior_ann: &Annotations,
    merge_type: MergeType,
) -> Result<()> {
    if !base_ann.keys().eq(prior_ann.keys()) {
        return Err(Error::AnnKeyMismatch {
            id: id.to_string(),
            base: base_ann.keys().cloned().collect(),
            prior: prior_ann.keys().cloned().collect(),
        });
    }

    // Nothing is written back until every field merged.
    let mut merged = Vec::with_capacity(prior_ann.iter().count());
    for (key, prior_field) in prior_ann.iter() {
        let Some(base_field) = base_ann.get(key) else {
            continue;
        };
        let field = match merge_type {
            MergeType::Replace => prior_field.clone(),
            MergeType::Addition => add_field(key, base_field, prior_field)?,
        };
        merged.push((key.clone(), field));
    }
    for (key, field) in merged {
        base_ann.insert(key, field);
    }
    Ok(())
}

fn add_field(key: &str, base: &AnnField, prior: &AnnField) -> Result<AnnField> {
    match (base, prior) {
        (AnnField::Int(b), AnnField::Int(p)) => {
            Ok(AnnField::Int(concatenate(Axis(0), &[b.view(), p.view()])?))
        }
        (AnnField::Float(b), AnnField::Float(p)) => {
            Ok(AnnField::Float(concatenate(Axis(0), &[b.view(), p.view()])?))
        }
        // Mixed numeric fields promote to float.
        (AnnField::Int(b), AnnField::Float(p)) => {
            let b = b.mapv(|v| v as f64);
            Ok(AnnField::Float(concatenate(Axis(0), &[b.view(), p.view()])?))
        }
        (AnnField::Float(b), AnnField::Int(p)) => {
            let p = p.mapv(|v| v as f64);
            Ok(AnnField::Float(concatenate(Axis(0), &[b.view(), p.view()])?))
        }
        (AnnField::List(b), AnnField::List(p)) => {
            let mut items = b.clone();
            for item in p {
                match items.iter_mut().find(|existing| *existing == item) {
                    Some(existing) => *existing = item.clone(),
                    None => items.push(item.clone()),
                }
            }
            Ok(AnnField::List(items))
        }
        (base, prior) => Err(Error::IncompatibleFields {
            key: key.to_string(),
            base: base.kind(),
            prior: prior.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_type_from_str() {
        assert_eq!("addition".parse::<MergeType>(), Ok(MergeType::Addition));
        assert_eq!("replace".parse::<MergeType>(), Ok(MergeType::Replace));
        assert!("Replace".parse::<MergeType>().is_err());
        assert_eq!(MergeType::default(), MergeType::Addition);
    }

    #[test]
    fn test_add_list_upserts() {
        let base = AnnField::List(vec![json!("a"), json!("b")]);
        let prior = AnnField::List(vec![json!("b"), json!("c")]);
        let merged = add_field("texts", &base, &prior).unwrap();
        assert_eq!(
            merged,
            AnnField::List(vec![json!("a"), json!("b"), json!("c")])
        );
    }

    #[test]
    fn test_add_mixed_kinds_fails() {
        let base = AnnField::from(vec![1.0f64, 2.0]);
        let prior = AnnField::List(vec![json!(3.0)]);
        let err = add_field("scores", &base, &prior).unwrap_err();
        assert!(matches!(
            err,
            Error::IncompatibleFields {
                base: "float array",
                prior: "list",
                ..
            }
        ));
    }

    #[test]
    fn test_add_int_to_float_promotes() {
        let base = AnnField::from(vec![1i64, 2]);
        let prior = AnnField::from(vec![0.5f64]);
        let merged = add_field("scores", &base, &prior).unwrap();
        assert_eq!(merged, AnnField::from(vec![1.0f64, 2.0, 0.5]));
    }
}
