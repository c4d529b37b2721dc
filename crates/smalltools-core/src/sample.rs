use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// How many stills to pull aside and where in the sequence to start.
#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub count: u32,
    pub start: u32,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self { count: 8, start: 5 }
    }
}

/// Outcome of one relocation pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleReport {
    pub moved: u32,
    pub missing: u32,
}

/// Evenly spaced frame indices: `count` values from `start` at a fixed
/// stride of `max(1, (total - start) / count)`. The stride floor means the
/// tail of a short sequence can be overshot; the caller treats those as
/// misses rather than errors.
pub fn sample_indices(total: u32, start: u32, count: u32) -> Vec<u32> {
    if count == 0 {
        return Vec::new();
    }
    let stride = (total.saturating_sub(start) / count).max(1);
    (0..count).map(|i| start + i * stride).collect()
}

/// Move each selected still out of `folder` into its `sample/` subfolder,
/// keeping the original index-based file name. A missing source file is
/// reported and skipped so one overshoot never fails the whole run.
pub fn relocate_samples(
    folder: &Path,
    total: u32,
    config: &SampleConfig,
) -> Result<SampleReport> {
    let sample_dir = folder.join("sample");
    fs::create_dir_all(&sample_dir)
        .with_context(|| format!("failed to create {}", sample_dir.display()))?;

    let mut report = SampleReport::default();
    for index in sample_indices(total, config.start, config.count) {
        let name = format!("{index}.png");
        let src = folder.join(&name);
        if !src.exists() {
            warn!(index, folder = %folder.display(), "sample frame not found");
            report.missing += 1;
            continue;
        }
        fs::rename(&src, sample_dir.join(&name))
            .with_context(|| format!("failed to move {}", src.display()))?;
        report.moved += 1;
    }

    info!(
        folder = %folder.display(),
        moved = report.moved,
        missing = report.missing,
        "samples relocated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn indices_are_evenly_strided() {
        let indices = sample_indices(20, 5, 8);
        assert_eq!(indices.len(), 8);
        assert_eq!(indices[0], 5);
        // (20 - 5) / 8 floors to 1.
        assert_eq!(indices, vec![5, 6, 7, 8, 9, 10, 11, 12]);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn indices_with_wide_stride() {
        assert_eq!(sample_indices(100, 0, 6), vec![0, 16, 32, 48, 64, 80]);
    }

    #[test]
    fn stride_never_drops_below_one() {
        // start past the end of the sequence still yields distinct indices.
        assert_eq!(sample_indices(3, 10, 4), vec![10, 11, 12, 13]);
    }

    #[test]
    fn zero_count_selects_nothing() {
        assert!(sample_indices(20, 0, 0).is_empty());
    }

    #[test]
    #[traced_test]
    fn relocates_and_reports_misses() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..10 {
            File::create(dir.path().join(format!("{i}.png"))).unwrap();
        }

        // total=10, start=8, count=4 gives stride 1 and indices 8..=11;
        // 10 and 11 do not exist.
        let config = SampleConfig { count: 4, start: 8 };
        let report = relocate_samples(dir.path(), 10, &config).unwrap();

        assert_eq!(report.moved, 2);
        assert_eq!(report.missing, 2);
        assert!(dir.path().join("sample/8.png").exists());
        assert!(dir.path().join("sample/9.png").exists());
        assert!(!dir.path().join("8.png").exists());
        assert!(logs_contain("sample frame not found"));
    }

    #[test]
    fn unsampled_frames_stay_in_place() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            File::create(dir.path().join(format!("{i}.png"))).unwrap();
        }

        let config = SampleConfig { count: 2, start: 0 };
        let report = relocate_samples(dir.path(), 6, &config).unwrap();

        // stride = 6 / 2 = 3, so 0 and 3 move.
        assert_eq!(report.moved, 2);
        assert_eq!(report.missing, 0);
        for i in [1, 2, 4, 5] {
            assert!(dir.path().join(format!("{i}.png")).exists());
        }
    }
}
