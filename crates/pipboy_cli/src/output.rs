//! Stage-then-rename writes for edited saves.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, warn};

/// Writes `bytes` to `out_path` through a temporary file in the same
/// directory. Returns the backup path when `backup` copied an existing file.
pub(crate) fn write_atomically(
    out_path: &Path,
    bytes: &[u8],
    force_overwrite: bool,
    backup: bool,
) -> Result<Option<PathBuf>, String> {
    let exists = out_path.exists();
    if exists && !force_overwrite {
        return Err(format!(
            "refusing to overwrite existing file {} (use --force-overwrite)",
            out_path.display()
        ));
    }

    let backup_path = if exists && backup {
        Some(create_backup(out_path)?)
    } else {
        None
    };

    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create directory {}: {e}", parent.display()))?;
    }

    let temp_path = temporary_path(out_path);
    debug!("staging {} bytes in {}", bytes.len(), temp_path.display());
    if let Err(e) = stage(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(format!("cannot write {}: {e}", temp_path.display()));
    }

    match fs::rename(&temp_path, out_path) {
        Ok(()) => Ok(backup_path),
        Err(rename_err) if exists && force_overwrite => {
            warn!("rename over {} failed ({rename_err}), replacing", out_path.display());
            let replaced = fs::remove_file(out_path).and_then(|()| fs::rename(&temp_path, out_path));
            match replaced {
                Ok(()) => Ok(backup_path),
                Err(e) => {
                    let _ = fs::remove_file(&temp_path);
                    Err(format!("cannot replace {}: {e}", out_path.display()))
                }
            }
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(format!(
                "cannot rename {} to {}: {e}",
                temp_path.display(),
                out_path.display()
            ))
        }
    }
}

fn stage(temp_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// `<path>.bak`, or the first free `<path>.bak.N`.
fn create_backup(out_path: &Path) -> Result<PathBuf, String> {
    let base = out_path.as_os_str().to_string_lossy().into_owned();
    let mut candidate = PathBuf::from(format!("{base}.bak"));
    let mut n = 1usize;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{base}.bak.{n}"));
        n += 1;
    }

    fs::copy(out_path, &candidate).map_err(|e| {
        format!(
            "cannot back up {} to {}: {e}",
            out_path.display(),
            candidate.display()
        )
    })?;
    Ok(candidate)
}

/// `.<name>.tmp.<pid>.<nanos>` beside the target.
fn temporary_path(out_path: &Path) -> PathBuf {
    let name = out_path
        .file_name()
        .map_or_else(|| "save".into(), |n| n.to_string_lossy().into_owned());
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    let temp_name = format!(".{name}.tmp.{}.{nanos}", process::id());
    match out_path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}
