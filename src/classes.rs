//! Class vocabularies of the supported datasets and the resolver that turns a
//! class specifier (alias, class-list file, `|`-separated names or a list of
//! those) into an ordered class list.

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{Error, Result};

const DOTA1_0: &[&str] = &[
    "large-vehicle",
    "swimming-pool",
    "helicopter",
    "bridge",
    "plane",
    "ship",
    "soccer-ball-field",
    "basketball-court",
    "ground-track-field",
    "small-vehicle",
    "baseball-diamond",
    "tennis-court",
    "roundabout",
    "storage-tank",
    "harbor",
];

const DOTA1_5: &[&str] = &[
    "large-vehicle",
    "swimming-pool",
    "helicopter",
    "bridge",
    "plane",
    "ship",
    "soccer-ball-field",
    "basketball-court",
    "ground-track-field",
    "small-vehicle",
    "baseball-diamond",
    "tennis-court",
    "roundabout",
    "storage-tank",
    "harbor",
    "container-crane",
];

const DOTA2_0: &[&str] = &[
    "large-vehicle",
    "swimming-pool",
    "helicopter",
    "bridge",
    "plane",
    "ship",
    "soccer-ball-field",
    "basketball-court",
    "ground-track-field",
    "small-vehicle",
    "baseball-diamond",
    "tennis-court",
    "roundabout",
    "storage-tank",
    "harbor",
    "container-crane",
    "airport",
    "helipad",
];

const DOTA_GSD_2025_03: &[&str] = &[
    "large-vehicle",
    "swimming-pool",
    "helicopter",
    "bridge",
    "plane",
    "ship",
    "soccer-ball-field",
    "basketball-court",
    "ground-track-field",
    "small-vehicle",
    "baseball-diamond",
    "tennis-court",
    "roundabout",
    "storage-tank",
    "harbor",
    "container-crane",
    "helipad",
];

const DIOR: &[&str] = &[
    "airplane",
    "airport",
    "baseballfield",
    "basketballcourt",
    "bridge",
    "chimney",
    "expressway-service-area",
    "expressway-toll-station",
    "dam",
    "golffield",
    "groundtrackfield",
    "harbor",
    "overpass",
    "ship",
    "stadium",
    "storagetank",
    "tenniscourt",
    "trainstation",
    "vehicle",
    "windmill",
];

const HRSC: &[&str] = &["ship"];

const HRSC_CLS: &[&str] = &[
    "01", "02", "03", "04", "05", "06", "07", "08", "09", "10", "11", "12", "13", "14", "15", "16",
    "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "30", "31", "32",
    "33",
];

const TEXT: &[&str] = &["text"];

const VOC: &[&str] = &[
    "person",
    "bird",
    "cat",
    "cow",
    "dog",
    "horse",
    "sheep",
    "aeroplane",
    "bicycle",
    "boat",
    "bus",
    "car",
    "motorbike",
    "train",
    "bottle",
    "chair",
    "diningtable",
    "pottedplant",
    "sofa",
    "tvmonitor",
];

/// Known datasets, their class lists, and every spelling that names them.
const DATASETS: &[(&str, &[&str], &[&str])] = &[
    (
        "DOTA1_0",
        DOTA1_0,
        &[
            "dota", "dota1", "dota1.0", "dota1_0", "DOTA", "DOTA1", "DOTA1.0", "DOTA1_0",
        ],
    ),
    (
        "DOTA1_5",
        DOTA1_5,
        &["dota1.5", "dota1_5", "DOTA1.5", "DOTA1_5"],
    ),
    (
        "DOTA2_0",
        DOTA2_0,
        &["dota2", "dota2.0", "dota2_0", "DOTA2", "DOTA2.0", "DOTA2_0"],
    ),
    (
        "DOTA_GSD_2025_03",
        DOTA_GSD_2025_03,
        &[
            "dota_gsd_2025_03",
            "dota_GSD_2025_03",
            "dota_gsd_202503",
            "dota_GSD_202503",
            "DOTA_gsd_2025_03",
            "DOTA_GSD_2025_03",
            "DOTA_gsd_202503",
            "DOTA_GSD_202503",
        ],
    ),
    ("DIOR", DIOR, &["dior", "DIOR"]),
    ("HRSC", HRSC, &["hrsc", "hrsc2016", "HRSC", "HRSC2016"]),
    (
        "HRSC_cls",
        HRSC_CLS,
        &["hrsc_cls", "hrsc2016_cls", "HRSC_cls", "HRSC2016_cls"],
    ),
    (
        "MSRA_TD500",
        TEXT,
        &["msra_td500", "MSRA_TD500", "msra-td500", "MSRA-TD500"],
    ),
    (
        "HUST_TR400",
        TEXT,
        &["hust_tr500", "HUST_TR400", "hust-tr400", "HUST-TR400"],
    ),
    (
        "RCTW_17",
        TEXT,
        &["rctw_17", "RCTW_17", "rctw-17", "RCTW-17"],
    ),
    ("SynthText", TEXT, &["synthtext", "SynthText"]),
    ("ICDAR2015", TEXT, &["ICDAR2015", "icdar2015"]),
    ("VOC", VOC, &["VOC", "voc"]),
];

static ALIAS_TABLE: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();

/// Alias spelling to class list, built once on first use.
pub fn alias_table() -> &'static HashMap<&'static str, &'static [&'static str]> {
    ALIAS_TABLE.get_or_init(|| {
        DATASETS
            .iter()
            .flat_map(|&(_, classes, aliases)| aliases.iter().map(move |&alias| (alias, classes)))
            .collect()
    })
}

/// Class list of a dataset by its canonical name (`DOTA1_0`, `DIOR`, ...).
pub fn dataset_classes(name: &str) -> Option<&'static [&'static str]> {
    DATASETS
        .iter()
        .find(|(dataset, _, _)| *dataset == name)
        .map(|&(_, classes, _)| classes)
}

/// Canonical names of every built-in dataset.
pub fn dataset_names() -> impl Iterator<Item = &'static str> {
    DATASETS.iter().map(|&(name, _, _)| name)
}

fn lookup_alias(alias: &str) -> Option<Vec<String>> {
    alias_table()
        .get(alias)
        .map(|classes| classes.iter().map(|c| c.to_string()).collect())
}

/// Something that names an ordered set of classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassSpec {
    /// A class-list file path, a dataset alias, or `a|b|c` literal names.
    Name(String),
    /// Aliases and literal names, each resolved on its own and concatenated.
    List(Vec<String>),
}

impl ClassSpec {
    /// Build a spec from command-line values: one value is a [`ClassSpec::Name`],
    /// several are a [`ClassSpec::List`].
    pub fn from_args(values: &[String]) -> ClassSpec {
        match values {
            [single] => ClassSpec::Name(single.clone()),
            _ => ClassSpec::List(values.to_vec()),
        }
    }

    pub fn resolve(&self) -> Result<Vec<String>> {
        match self {
            ClassSpec::Name(name) => resolve_name(name),
            ClassSpec::List(items) => Ok(resolve_list(items)),
        }
    }
}

impl From<&str> for ClassSpec {
    fn from(name: &str) -> Self {
        ClassSpec::Name(name.to_string())
    }
}

impl From<String> for ClassSpec {
    fn from(name: String) -> Self {
        ClassSpec::Name(name)
    }
}

impl From<Vec<String>> for ClassSpec {
    fn from(items: Vec<String>) -> Self {
        ClassSpec::List(items)
    }
}

impl From<&[&str]> for ClassSpec {
    fn from(items: &[&str]) -> Self {
        ClassSpec::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl TryFrom<&Value> for ClassSpec {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => Ok(ClassSpec::Name(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(Error::InvalidClassSpec(json_type_name(other))),
                })
                .collect::<Result<Vec<_>>>()
                .map(ClassSpec::List),
            other => Err(Error::InvalidClassSpec(json_type_name(other))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn resolve_name(name: &str) -> Result<Vec<String>> {
    let path = Path::new(name);
    if path.is_file() {
        return read_class_file(path);
    }
    if let Some(classes) = lookup_alias(name) {
        return Ok(classes);
    }
    Ok(name.split('|').map(str::to_string).collect())
}

fn resolve_list(items: &[String]) -> Vec<String> {
    let mut classes = Vec::new();
    for item in items {
        match lookup_alias(item) {
            Some(expanded) => classes.extend(expanded),
            None => classes.push(item.clone()),
        }
    }
    classes
}

/// Read a class-list file, one class name per line.
pub fn read_class_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let classes: Vec<String> = content.lines().map(|line| line.trim().to_string()).collect();
    debug!("Read {} classes from {}", classes.len(), path.display());
    Ok(classes)
}

/// Write a class ordering as a class-list file.
pub fn save_classes(path: &Path, classes: &[String]) -> Result<()> {
    let mut content = classes.join("\n");
    content.push('\n');
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

/// Resolve any class specifier to an ordered class list.
pub fn get_classes(spec: impl Into<ClassSpec>) -> Result<Vec<String>> {
    spec.into().resolve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_alias_is_unique() {
        let total: usize = DATASETS.iter().map(|(_, _, aliases)| aliases.len()).sum();
        assert_eq!(alias_table().len(), total);
    }

    #[test]
    fn test_dataset_classes() {
        assert_eq!(dataset_classes("DOTA1_0").map(<[_]>::len), Some(15));
        assert_eq!(dataset_classes("DOTA2_0").map(<[_]>::len), Some(18));
        assert_eq!(dataset_classes("HRSC_cls").map(<[_]>::len), Some(33));
        assert_eq!(dataset_classes("dota"), None);
    }

    #[test]
    fn test_from_args() {
        let one = vec!["dota".to_string()];
        assert_eq!(ClassSpec::from_args(&one), ClassSpec::Name("dota".into()));
        let two = vec!["dota".to_string(), "car".to_string()];
        assert_eq!(ClassSpec::from_args(&two), ClassSpec::List(two.clone()));
    }
}
