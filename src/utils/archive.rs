use crate::error::{Error, Result};
use crate::utils::files::{ensure_directory, remove_if_exists};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::read::ZipArchive;

/// Unpack every member of `zip_path` into `target_dir`, then delete the zip.
///
/// A corrupt archive fails part-way and whatever was already written stays on
/// disk.
pub fn extract_and_clean(zip_path: &Path, target_dir: &Path) -> Result<PathBuf> {
    info!("Extracting {} to {}", zip_path.display(), target_dir.display());
    ensure_directory(target_dir)?;

    let file = File::open(zip_path).map_err(|e| Error::io(zip_path, e))?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| Error::Archive(zip_path.to_path_buf(), e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::Archive(zip_path.to_path_buf(), e))?;

        // Skip names that would escape the target
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            debug!("Skipping unsafe entry {}", entry.name());
            continue;
        };
        let dest = target_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        // Read failures (bad CRC, truncated data) belong to the archive
        let mut body = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut body)
            .map_err(|e| Error::Archive(zip_path.to_path_buf(), zip::result::ZipError::Io(e)))?;
        fs::write(&dest, &body).map_err(|e| Error::io(&dest, e))?;
        debug!("Extracted {}", relative.display());
    }

    remove_if_exists(zip_path)?;
    info!("Removed {}", zip_path.display());
    Ok(target_dir.to_path_buf())
}
