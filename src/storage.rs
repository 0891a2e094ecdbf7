use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::{fs, io};
use tempfile::NamedTempFile;

use crate::validate::Category;

pub fn init_upload_root(root: &Path) -> io::Result<()> {
    fs::create_dir_all(root)?;
    info!("Upload root ready: {}", root.display());
    Ok(())
}

/// Create the category directory if needed (0755 on unix). An already
/// existing directory is success, including under concurrent creators.
pub fn ensure_category_dir(root: &Path, category: Category) -> io::Result<PathBuf> {
    let dir = root.join(category.dir_name());

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        fs::DirBuilder::new().recursive(true).mode(0o755).create(&dir)?;
    }
    #[cfg(not(unix))]
    fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// Write through a temp file in the same directory, then rename onto the
/// final path. A partial write is never visible at the final path; a rename
/// over an existing name is the documented overwrite behavior.
pub fn persist(dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    let target = dir.join(filename);
    tmp.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}
