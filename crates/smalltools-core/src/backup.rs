use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Default cap on the size of a top-level entry included in the archive.
pub const DEFAULT_MAX_BYTES: u64 = 30 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory whose top-level entries are archived.
    pub root: PathBuf,
    /// Name of the archive folder under `root`; never archived itself.
    pub history_dir: String,
    /// Entries larger than this (files, or directories by recursive total)
    /// are left out. The cap is inclusive.
    pub max_bytes: u64,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            history_dir: "history".to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

#[derive(Debug)]
pub struct BackupReport {
    /// The archive that was written.
    pub archive: PathBuf,
    /// Top-level entries included.
    pub entries: u32,
    /// Files written into the archive.
    pub files: u32,
    /// Top-level entries skipped for being over the size cap.
    pub skipped: u32,
}

/// Total byte size of an entry: a file's length, or the recursive sum of
/// file lengths under a directory. Entries that vanish mid-walk count as 0.
pub fn entry_size(path: &Path) -> u64 {
    if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    } else {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }
}

/// Archive the small top-level entries of `config.root` into a Deflate zip
/// named after the current local time, under the history folder.
pub fn run_backup(config: &BackupConfig) -> Result<BackupReport> {
    let root = &config.root;
    if !root.is_dir() {
        bail!("backup root is not a directory: {}", root.display());
    }

    let history = root.join(&config.history_dir);
    fs::create_dir_all(&history)
        .with_context(|| format!("failed to create {}", history.display()))?;

    let mut top_level: Vec<PathBuf> = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to read entry of {}", root.display()))?;
        if entry.file_name().to_string_lossy() == config.history_dir.as_str() {
            continue;
        }
        top_level.push(entry.path());
    }
    top_level.sort();

    let mut included = Vec::new();
    let mut skipped = 0u32;
    for path in top_level {
        let size = entry_size(&path);
        if size > config.max_bytes {
            debug!(path = %path.display(), size, "entry over size cap, skipping");
            skipped += 1;
            continue;
        }
        included.push(path);
    }

    let stamp = Local::now().format("%y-%m-%d %H-%M-%S");
    let archive = history.join(format!("{stamp}.zip"));
    let files = write_archive(root, &included, &archive)?;

    info!(
        archive = %archive.display(),
        entries = included.len(),
        files,
        skipped,
        "archive written"
    );

    Ok(BackupReport {
        archive,
        entries: included.len() as u32,
        files,
        skipped,
    })
}

fn write_archive(root: &Path, entries: &[PathBuf], archive: &Path) -> Result<u32> {
    let file = File::create(archive)
        .with_context(|| format!("failed to create {}", archive.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0u32;
    for entry in entries {
        if entry.is_dir() {
            // Directories contribute their files recursively; empty
            // directories contribute nothing.
            for found in WalkDir::new(entry)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                add_file(&mut writer, root, found.path(), options)?;
                files += 1;
            }
        } else {
            add_file(&mut writer, root, entry, options)?;
            files += 1;
        }
    }

    writer.finish().context("failed to finalize archive")?;
    Ok(files)
}

fn add_file(
    writer: &mut ZipWriter<File>,
    root: &Path,
    path: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    let name = archive_name(root, path)?;
    debug!(%name, "archiving file");

    writer
        .start_file(name, options)
        .with_context(|| format!("failed to start archive entry for {}", path.display()))?;
    let mut input =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    io::copy(&mut input, writer)
        .with_context(|| format!("failed to archive {}", path.display()))?;
    Ok(())
}

/// Archive entry key: the path relative to the backup root, `/`-joined
/// regardless of platform.
fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside the backup root", path.display()))?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::io::Write;

    use super::*;

    fn write_bytes(path: &Path, len: usize) {
        let mut f = File::create(path).unwrap();
        f.write_all(&vec![b'x'; len]).unwrap();
    }

    fn config(root: &Path, max_bytes: u64) -> BackupConfig {
        BackupConfig {
            root: root.to_path_buf(),
            max_bytes,
            ..BackupConfig::default()
        }
    }

    fn archive_names(archive: &Path) -> BTreeSet<String> {
        let zip = zip::ZipArchive::new(File::open(archive).unwrap()).unwrap();
        zip.file_names().map(str::to_owned).collect()
    }

    #[test]
    fn size_cap_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        write_bytes(&dir.path().join("at-cap.txt"), 100);
        write_bytes(&dir.path().join("over-cap.txt"), 101);

        let report = run_backup(&config(dir.path(), 100)).unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.skipped, 1);

        let names = archive_names(&report.archive);
        assert!(names.contains("at-cap.txt"));
        assert!(!names.contains("over-cap.txt"));
    }

    #[test]
    fn directory_size_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("data/inner");
        fs::create_dir_all(&sub).unwrap();
        write_bytes(&dir.path().join("data/a.txt"), 60);
        write_bytes(&sub.join("b.txt"), 60);

        assert_eq!(entry_size(&dir.path().join("data")), 120);

        // 120 bytes total pushes the whole directory over a 100-byte cap.
        let report = run_backup(&config(dir.path(), 100)).unwrap();
        assert_eq!(report.entries, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn archive_preserves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("docs/notes")).unwrap();
        write_bytes(&dir.path().join("docs/notes/todo.txt"), 10);
        write_bytes(&dir.path().join("top.txt"), 10);

        let report = run_backup(&config(dir.path(), 1024)).unwrap();
        assert_eq!(report.files, 2);

        let names = archive_names(&report.archive);
        assert!(names.contains("top.txt"));
        assert!(names.contains("docs/notes/todo.txt"));
    }

    #[test]
    fn history_dir_is_never_archived() {
        let dir = tempfile::tempdir().unwrap();
        write_bytes(&dir.path().join("keep.txt"), 10);

        let first = run_backup(&config(dir.path(), 1024)).unwrap();
        assert!(first.archive.starts_with(dir.path().join("history")));

        // A second run must not pick up the archive the first one wrote.
        let second = run_backup(&config(dir.path(), 1024)).unwrap();
        let names = archive_names(&second.archive);
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["keep.txt"]);
    }
}
