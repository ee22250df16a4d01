//! Atomic file replacement for file-backed stores.
//!
//! Contents go to a hidden temporary file in the target directory which is
//! then renamed over the target, so readers never observe a partial write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::ObjectStoreError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
///
/// # Errors
///
/// Returns [`ObjectStoreError::Write`] if the temporary file cannot be
/// written or renamed. The temporary file is removed on failure.
pub(super) fn write_atomic(dir: &Dir, file_name: &str, contents: &str) -> Result<(), ObjectStoreError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(".{file_name}.tmp.{}.{suffix}.{counter}", std::process::id());

    if let Err(err) = write_temp_file(dir, &tmp_name, contents) {
        drop(dir.remove_file(&tmp_name));
        return Err(ObjectStoreError::write(format!(
            "failed to write '{tmp_name}': {err}"
        )));
    }
    if let Err(err) = rename_over(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(ObjectStoreError::write(format!(
            "failed to replace '{file_name}': {err}"
        )));
    }
    sync_directory(dir);
    Ok(())
}

fn write_temp_file(dir: &Dir, tmp_name: &str, contents: &str) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

#[cfg(windows)]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_over(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_directory(dir: &Dir) {
    // Best effort; a failed directory sync does not undo the rename.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}
