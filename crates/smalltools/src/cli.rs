use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "smalltools", about = "Personal file and image utilities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Explode every gif in a directory into cropped png stills.
    Frames {
        /// Directory scanned for *.gif inputs.
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Number of stills relocated into the sample/ subfolder.
        #[arg(short, long, default_value_t = 8)]
        samples: u32,

        /// First frame index eligible for sampling.
        #[arg(long, default_value_t = 5)]
        start_frame: u32,

        /// Draw the computed crop box on the debug animation.
        #[arg(long)]
        overlay: bool,

        /// Font used for frame-index labels on the debug animation.
        #[arg(long)]
        font: Option<PathBuf>,
    },

    /// Archive the small top-level entries of a directory into a
    /// timestamped zip under its history folder.
    Backup {
        /// Directory whose entries are archived.
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Archive folder name under the root; never archived itself.
        #[arg(long, default_value = "history")]
        history_dir: String,

        /// Size cap in MiB; bigger entries are left out of the archive.
        #[arg(long, default_value_t = 30)]
        max_mib: u64,
    },

    /// Mirror a directory tree, skipping result directories and keeping
    /// modification times.
    Mirror {
        /// Source directory.
        #[arg(short, long)]
        src: PathBuf,

        /// Destination directory.
        #[arg(short, long)]
        dst: PathBuf,

        /// Directories whose name ends with this suffix are not copied.
        #[arg(long, default_value = ".aedtresults")]
        exclude_suffix: String,
    },
}
