//! Bundling split parts into a zip archive for bulk retrieval

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{SplitXError, SplitXResult};

/// Write `files` into a deflate-compressed archive at `zip_path`.
pub fn bundle(files: &[PathBuf], zip_path: &Path) -> SplitXResult<PathBuf> {
    let out = File::create(zip_path)?;
    let mut writer = ZipWriter::new(out);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SplitXError::ConfigError {
                message: format!("invalid part path: {}", file.display()),
            })?;
        writer.start_file(name, options)?;
        let mut input = File::open(file)?;
        io::copy(&mut input, &mut writer)?;
    }

    writer.finish()?;
    info!("Bundled {} parts into {}", files.len(), zip_path.display());
    Ok(zip_path.to_path_buf())
}
