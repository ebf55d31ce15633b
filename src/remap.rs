//! Relabeling of annotation batches when the class ordering changes.

use log::{debug, info};
use std::collections::HashMap;

use crate::classes::ClassSpec;
use crate::error::{Error, Result};
use crate::types::{AnnField, Record, RemapStats};

/// Old label to new label, `None` for classes that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapper {
    table: Vec<Option<i64>>,
}

impl LabelMapper {
    pub fn new<S: AsRef<str>>(old_classes: &[S], new_classes: &[S]) -> Self {
        // the last position wins for repeated names
        let new_cls2lbl: HashMap<&str, i64> = new_classes
            .iter()
            .enumerate()
            .map(|(i, cls)| (cls.as_ref(), i as i64))
            .collect();
        let table = old_classes
            .iter()
            .map(|cls| new_cls2lbl.get(cls.as_ref()).copied())
            .collect();
        Self { table }
    }

    pub fn get(&self, label: i64) -> Option<Option<i64>> {
        usize::try_from(label)
            .ok()
            .and_then(|i| self.table.get(i))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Relabel every record, dropping the objects whose class is gone.
    pub fn apply(&self, contents: &mut [Record]) -> Result<RemapStats> {
        let mut stats = RemapStats::new();
        for content in contents.iter_mut() {
            stats.records_seen += 1;
            let Some(ann) = content.ann.as_mut() else {
                continue;
            };
            if ann.is_empty() {
                continue;
            }
            let old_labels = match ann.get("labels") {
                Some(AnnField::Int(labels)) => labels,
                Some(other) => {
                    return Err(Error::UnsupportedField {
                        key: "labels".to_string(),
                        kind: other.kind(),
                    })
                }
                None => {
                    return Err(Error::MissingLabels {
                        id: content.id.clone(),
                    })
                }
            };
            if old_labels.ndim() != 1 {
                let kind = match old_labels.ndim() {
                    0 => "scalar int array",
                    _ => "multi-axis int array",
                };
                return Err(Error::UnsupportedField {
                    key: "labels".to_string(),
                    kind,
                });
            }
            ann.validate(&content.id)?;

            let mut new_labels = Vec::with_capacity(old_labels.len());
            let mut keep_inds = Vec::with_capacity(old_labels.len());
            for (i, &label) in old_labels.iter().enumerate() {
                let mapped = self.get(label).ok_or_else(|| Error::LabelOutOfRange {
                    id: content.id.clone(),
                    label,
                    num_classes: self.len(),
                })?;
                if let Some(new_label) = mapped {
                    new_labels.push(new_label);
                    keep_inds.push(i);
                }
            }

            let dropped = old_labels.len() - keep_inds.len();
            if dropped > 0 {
                ann.select(&keep_inds);
                stats.records_filtered += 1;
                stats.objects_dropped += dropped;
            }
            stats.objects_kept += new_labels.len();
            ann.insert("labels", new_labels);
        }
        Ok(stats)
    }
}

/// Relabel `contents` from `old_classes` to `new_classes` in place.
///
/// Objects whose class is missing from `new_classes` are removed from every
/// annotation field. Records themselves are never removed, even when all of
/// their objects are.
pub fn change_cls_order<S: AsRef<str>>(
    contents: &mut [Record],
    old_classes: &[S],
    new_classes: &[S],
) -> Result<RemapStats> {
    let unchanged = old_classes.len() == new_classes.len()
        && old_classes
            .iter()
            .zip(new_classes)
            .all(|(o, n)| o.as_ref() == n.as_ref());
    if unchanged {
        debug!("Class ordering unchanged, skipping relabel");
        return Ok(RemapStats::new());
    }

    let mapper = LabelMapper::new(old_classes, new_classes);
    let stats = mapper.apply(contents)?;
    info!(
        "Relabeled {} records from {} to {} classes",
        stats.records_seen,
        old_classes.len(),
        new_classes.len()
    );
    Ok(stats)
}

/// Like [`change_cls_order`], but the target ordering is resolved from a spec.
pub fn change_cls_order_to<S: AsRef<str>>(
    contents: &mut [Record],
    old_classes: &[S],
    new_classes: &ClassSpec,
) -> Result<RemapStats> {
    let new_classes = new_classes.resolve()?;
    let old_classes: Vec<&str> = old_classes.iter().map(AsRef::as_ref).collect();
    let new_classes: Vec<&str> = new_classes.iter().map(String::as_str).collect();
    change_cls_order(contents, &old_classes, &new_classes)
}

/// Remove the classes in `to_remove` and renumber the rest in their old order.
///
/// Returns the new class ordering. When none of `to_remove` is present the
/// records are left untouched and `old_classes` comes back as is.
pub fn remove_cls_from<S, R>(
    contents: &mut [Record],
    old_classes: &[S],
    to_remove: &[R],
) -> Result<Vec<String>>
where
    S: AsRef<str>,
    R: AsRef<str>,
{
    let new_classes: Vec<&str> = old_classes
        .iter()
        .map(AsRef::as_ref)
        .filter(|cls| !to_remove.iter().any(|r| r.as_ref() == *cls))
        .collect();
    let old_classes: Vec<&str> = old_classes.iter().map(AsRef::as_ref).collect();

    if new_classes.len() == old_classes.len() {
        debug!("No class to remove, records left untouched");
        return Ok(old_classes.iter().map(|c| c.to_string()).collect());
    }

    let mapper = LabelMapper::new(&old_classes, &new_classes);
    let stats = mapper.apply(contents)?;
    info!(
        "Removed {} classes, dropping {} objects",
        old_classes.len() - new_classes.len(),
        stats.objects_dropped
    );
    Ok(new_classes.into_iter().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_mapper_table() {
        let mapper = LabelMapper::new(&["a", "b", "c"], &["c", "a"]);
        assert_eq!(mapper.len(), 3);
        assert_eq!(mapper.get(0), Some(Some(1)));
        assert_eq!(mapper.get(1), Some(None));
        assert_eq!(mapper.get(2), Some(Some(0)));
        assert_eq!(mapper.get(3), None);
        assert_eq!(mapper.get(-1), None);
    }

    #[test]
    fn test_label_mapper_repeated_names() {
        let mapper = LabelMapper::new(&["a", "b"], &["b", "a", "b"]);
        assert_eq!(mapper.get(1), Some(Some(2)));
        assert_eq!(mapper.get(0), Some(Some(1)));
    }
}
