//! Object-detection dataset annotation toolkit
//!
//! This library holds dataset annotations (DOTA, DIOR, HRSC, VOC, ICDAR, ...)
//! in one record model and provides class vocabulary resolution, label
//! remapping, class removal, prior-content merging and imageset splitting.

pub mod classes;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod remap;
pub mod split;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use classes::{get_classes, ClassSpec};
pub use config::{Args, Command};
pub use error::{Error, Result};
pub use io::{load_batch, load_imgs, read_img_info, save_batch};
pub use merge::{merge_prior_contents, MergeType};
pub use remap::{change_cls_order, change_cls_order_to, remove_cls_from, LabelMapper};
pub use split::{split_imgset, ImageSet, ImageSetSplit};
pub use types::{AnnField, Annotations, Record, RemapStats};
pub use utils::{nproc_map, prog_map, ConstMapper};
