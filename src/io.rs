use glob::glob;
use log::{error, info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{get_img_exts_set, Record};
use crate::utils::prog_map;

/// Build an annotation-less record for one image file.
///
/// Returns `None` for files whose extension is not an image extension, and
/// for images whose header cannot be read.
pub fn read_img_info(imgpath: &Path) -> Option<Record> {
    let ext = imgpath.extension()?.to_str()?;
    if !get_img_exts_set().contains(ext) {
        return None;
    }
    let imgfile = imgpath.file_name()?.to_string_lossy().into_owned();
    let img_id = imgpath.file_stem()?.to_string_lossy().into_owned();

    match image::image_dimensions(imgpath) {
        Ok((width, height)) => Some(Record::new(img_id, imgfile, width, height)),
        Err(e) => {
            error!("Failed to read image size ({}): {}", imgpath.display(), e);
            None
        }
    }
}

/// Read every image directly inside `img_dir` into records, sorted by filename.
pub fn load_imgs(img_dir: &Path, nproc: usize) -> Result<Vec<Record>> {
    if !img_dir.is_dir() {
        return Err(Error::io(
            img_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let pattern = img_dir.join("*");
    let imgpaths: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .map_err(|e| {
            Error::io(
                img_dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            )
        })?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();

    info!(
        "Reading {} files from {} with {} workers",
        imgpaths.len(),
        img_dir.display(),
        nproc
    );
    let mut contents = prog_map(|path: PathBuf| read_img_info(&path), imgpaths, nproc);
    contents.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(contents)
}

/// Load a batch saved by [`save_batch`].
pub fn load_batch(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let contents: Vec<Record> = serde_json::from_reader(BufReader::new(file))?;
    info!("Loaded {} records from {}", contents.len(), path.display());
    Ok(contents)
}

/// Save a batch as a JSON array of records.
pub fn save_batch(path: &Path, contents: &[Record]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, contents)?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    info!("Saved {} records to {}", contents.len(), path.display());
    Ok(())
}
