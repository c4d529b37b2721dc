use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;
use tracing::{error, info};

/// Mirror failure, tagged with the path that stopped the walk.
#[derive(Debug, Error)]
#[error("failed to mirror {}", path.display())]
pub struct MirrorError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl MirrorError {
    fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Directories whose name ends with this suffix are skipped entirely:
    /// not created at the destination, not descended into.
    pub exclude_suffix: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            exclude_suffix: ".aedtresults".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorReport {
    pub files: u32,
    pub dirs: u32,
    pub excluded: u32,
    /// True when the walk stopped on an error.
    pub failed: bool,
}

/// Mirror `src` into `dst`.
///
/// An error anywhere in the walk ends the run for the whole tree; it is
/// logged here rather than propagated, so a failed mirror still exits
/// cleanly. There is no retry and no partial-failure recovery.
pub fn run_mirror(src: &Path, dst: &Path, config: &MirrorConfig) -> MirrorReport {
    let mut report = MirrorReport::default();

    let walk = fs::create_dir_all(dst)
        .map_err(|e| MirrorError::new(dst, e))
        .and_then(|()| copy_tree(src, dst, config, &mut report));

    if let Err(e) = walk {
        error!(path = %e.path.display(), error = %e.source, "mirror aborted");
        report.failed = true;
    }

    info!(
        files = report.files,
        dirs = report.dirs,
        excluded = report.excluded,
        "mirror finished"
    );
    report
}

/// Depth-first copy. Directory timestamps are restored post-order, after
/// the children whose copies would touch them have been written.
pub fn copy_tree(
    src: &Path,
    dst: &Path,
    config: &MirrorConfig,
    report: &mut MirrorReport,
) -> Result<(), MirrorError> {
    let entries = fs::read_dir(src).map_err(|e| MirrorError::new(src, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| MirrorError::new(src, e))?;
        let s = entry.path();
        let d = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| MirrorError::new(&s, e))?;

        if file_type.is_dir() {
            if entry.file_name().to_string_lossy().ends_with(&config.exclude_suffix) {
                info!(path = %s.display(), "skipping excluded directory");
                report.excluded += 1;
                continue;
            }

            if !d.exists() {
                fs::create_dir_all(&d).map_err(|e| MirrorError::new(&d, e))?;
            }
            info!(path = %s.display(), "copying directory");
            copy_tree(&s, &d, config, report)?;
            restore_mtime(&s, &d)?;
            report.dirs += 1;
        } else if file_type.is_file() {
            fs::copy(&s, &d).map_err(|e| MirrorError::new(&s, e))?;
            restore_mtime(&s, &d)?;
            info!(path = %s.display(), "copied file");
            report.files += 1;
        }
        // Anything else (symlinks, sockets) is left behind, as before.
    }

    Ok(())
}

fn restore_mtime(src: &Path, dst: &Path) -> Result<(), MirrorError> {
    let meta = fs::metadata(src).map_err(|e| MirrorError::new(src, e))?;
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_mtime(dst, mtime).map_err(|e| MirrorError::new(dst, e))
}
