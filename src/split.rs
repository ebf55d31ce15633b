//! Selecting the records of an imageset (train/val/test lists) from a batch.

use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Record;

/// Image ids to select, given inline or as a list file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSet {
    Ids(Vec<String>),
    File(PathBuf),
}

impl ImageSet {
    /// The raw entries, one per line for list files.
    pub fn entries(&self) -> Result<Vec<String>> {
        match self {
            ImageSet::Ids(ids) => Ok(ids.clone()),
            ImageSet::File(path) => {
                let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                Ok(content.lines().map(str::to_string).collect())
            }
        }
    }
}

impl From<Vec<String>> for ImageSet {
    fn from(ids: Vec<String>) -> Self {
        ImageSet::Ids(ids)
    }
}

impl From<&[&str]> for ImageSet {
    fn from(ids: &[&str]) -> Self {
        ImageSet::Ids(ids.iter().map(|s| s.to_string()).collect())
    }
}

impl From<PathBuf> for ImageSet {
    fn from(path: PathBuf) -> Self {
        ImageSet::File(path)
    }
}

impl From<&Path> for ImageSet {
    fn from(path: &Path) -> Self {
        ImageSet::File(path.to_path_buf())
    }
}

/// Records selected by an imageset, in imageset order.
#[derive(Debug)]
pub struct ImageSetSplit<'a> {
    pub contents: Vec<&'a Record>,
    /// Bare ids that matched no record.
    pub missing: Vec<String>,
}

impl ImageSetSplit<'_> {
    pub fn to_owned_contents(&self) -> Vec<Record> {
        self.contents.iter().map(|&r| r.clone()).collect()
    }
}

/// Reduce an imageset entry (`dir/img001.jpg`, `img001.png`, `img001`) to a bare id.
pub fn entry_to_id(entry: &str) -> &str {
    let name = entry.trim().rsplit('/').next().unwrap_or_default();
    match name.rfind('.') {
        // a leading dot is part of the name, not an extension
        Some(dot) if name[..dot].chars().any(|c| c != '.') => &name[..dot],
        _ => name,
    }
}

/// Pick the records listed in `imgset`.
///
/// Entries that match no record are logged and skipped. Repeated entries
/// select the same record again.
pub fn split_imgset<'a>(contents: &'a [Record], imgset: &ImageSet) -> Result<ImageSetSplit<'a>> {
    let mut id_mapper: HashMap<&str, usize> = HashMap::with_capacity(contents.len());
    for (i, content) in contents.iter().enumerate() {
        id_mapper.entry(content.id.as_str()).or_insert(i);
    }

    let entries = imgset.entries()?;
    let mut split = ImageSetSplit {
        contents: Vec::with_capacity(entries.len()),
        missing: Vec::new(),
    };
    for entry in &entries {
        let img_id = entry_to_id(entry);
        match id_mapper.get(img_id) {
            Some(&i) => split.contents.push(&contents[i]),
            None => {
                warn!("Can't find ID:{} image!", img_id);
                split.missing.push(img_id.to_string());
            }
        }
    }

    info!(
        "Selected {} of {} imageset entries",
        split.contents.len(),
        entries.len()
    );
    Ok(split)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_to_id() {
        assert_eq!(entry_to_id("img001"), "img001");
        assert_eq!(entry_to_id("  img001.jpg\n"), "img001");
        assert_eq!(entry_to_id("some/path/img001.jpg"), "img001");
        assert_eq!(entry_to_id("/abs/P0001.tar.png"), "P0001.tar");
        assert_eq!(entry_to_id(".hidden"), ".hidden");
        assert_eq!(entry_to_id("dir/"), "");
    }
}
