mod cli;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use smalltools_core::backup::{run_backup, BackupConfig};
use smalltools_core::extract::{extract_dir, ExtractConfig};
use smalltools_core::mirror::{run_mirror, MirrorConfig};
use smalltools_core::sample::SampleConfig;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Frames {
            dir,
            samples,
            start_frame,
            overlay,
            font,
        } => {
            info!(?dir, samples, start_frame, "extracting gif frames");

            let config = ExtractConfig {
                samples: SampleConfig {
                    count: samples,
                    start: start_frame,
                },
                overlay,
                font_path: font,
            };

            let reports = extract_dir(&dir, &config)?;
            for report in &reports {
                info!(
                    input = %report.input.display(),
                    frames = report.frame_count,
                    sampled = report.samples.moved,
                    missing = report.samples.missing,
                    "source processed"
                );
            }
            info!(sources = reports.len(), "extraction complete");
        }

        cli::Command::Backup {
            root,
            history_dir,
            max_mib,
        } => {
            info!(?root, max_mib, "starting backup");

            let report = run_backup(&BackupConfig {
                root,
                history_dir,
                max_bytes: max_mib * 1024 * 1024,
            })?;

            info!(
                archive = %report.archive.display(),
                entries = report.entries,
                files = report.files,
                skipped = report.skipped,
                "backup complete"
            );
        }

        cli::Command::Mirror {
            src,
            dst,
            exclude_suffix,
        } => {
            info!(?src, ?dst, "starting mirror");

            let report = run_mirror(&src, &dst, &MirrorConfig { exclude_suffix });

            if report.failed {
                warn!("mirror stopped early, destination may be incomplete");
            }
            info!(
                files = report.files,
                dirs = report.dirs,
                excluded = report.excluded,
                "mirror complete"
            );
        }
    }

    Ok(())
}
