use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

use crate::merge::MergeType;

/// Command-line arguments for editing object-detection annotation batches.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Resolve a class specifier and print one class per line
    Classes {
        /// Dataset aliases, class-list files, `a|b|c` names or plain class names
        #[arg(required = true)]
        spec: Vec<String>,
    },

    /// Build a batch of annotation-less records from an image directory
    Scan {
        /// Directory containing the images
        #[arg(short = 'd', long = "img_dir")]
        img_dir: PathBuf,

        /// Number of worker threads
        #[arg(long = "nproc", default_value_t = 1, value_parser = validate_nproc)]
        nproc: usize,

        /// Output batch file (JSON)
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Relabel a batch for a new class ordering
    Remap {
        /// Input batch file (JSON)
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Class ordering the labels currently refer to
        #[arg(long = "old_classes", required = true, num_args = 1..)]
        old_classes: Vec<String>,

        /// Class ordering to relabel to
        #[arg(long = "new_classes", required = true, num_args = 1..)]
        new_classes: Vec<String>,

        /// Output batch file (JSON)
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Drop classes from a batch and renumber the remaining ones
    Remove {
        /// Input batch file (JSON)
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Class ordering the labels currently refer to
        #[arg(long = "old_classes", required = true, num_args = 1..)]
        old_classes: Vec<String>,

        /// Class names to remove
        #[arg(long = "remove", required = true, num_args = 1..)]
        remove: Vec<String>,

        /// Output batch file (JSON)
        #[arg(short = 'o', long = "output")]
        output: PathBuf,

        /// Where to write the resulting class list, one class per line
        #[arg(long = "classes_out")]
        classes_out: Option<PathBuf>,
    },

    /// Merge prior contents into a base batch by image id
    Merge {
        /// Base batch file (JSON)
        #[arg(short = 'b', long = "base")]
        base: PathBuf,

        /// Prior batch file (JSON)
        #[arg(short = 'p', long = "prior")]
        prior: PathBuf,

        /// How prior values combine with base values
        #[arg(long = "merge_type", value_enum, default_value = "addition")]
        merge_type: MergeType,

        /// Output batch file (JSON)
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Keep the records listed in an imageset file
    Split {
        /// Input batch file (JSON)
        #[arg(short = 'i', long = "input")]
        input: PathBuf,

        /// Imageset file, one id, filename or path per line
        #[arg(long = "imgset")]
        imgset: PathBuf,

        /// Output batch file (JSON)
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
}

// Validate that at least one worker is requested
pub fn validate_nproc(s: &str) -> Result<usize, String> {
    match usize::from_str(s) {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("NPROC must be a positive integer".to_string()),
    }
}
