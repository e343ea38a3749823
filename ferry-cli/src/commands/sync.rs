//! `ferry sync` — mirror one or more source trees into a destination.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use log::LevelFilter;

use ferry_storage::{sync_with_observer, LocalStorage, SyncObserver};

/// Arguments for `ferry sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Source directories, in order, followed by the destination directory.
    #[arg(required = true, num_args = 2.., value_name = "SRC... DST")]
    pub paths: Vec<PathBuf>,

    /// Display per-file progress (INFO level log).
    #[arg(short, long)]
    pub verbose: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        init_logging(self.verbose);

        let (dest, sources) = self
            .paths
            .split_last()
            .context("expected <src>... <dst>")?;
        let dst_storage = LocalStorage::new(dest)
            .with_context(|| format!("failed to open destination {}", dest.display()))?;

        for source in sources {
            let src_storage = LocalStorage::new(source)
                .with_context(|| format!("failed to open source {}", source.display()))?;
            sync_with_observer(
                &src_storage,
                Path::new("."),
                &dst_storage,
                Path::new("."),
                &LogObserver,
            )
            .with_context(|| format!("failed to sync source {}", source.display()))?;
        }
        Ok(())
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    // try_init: tests may run multiple commands in one process.
    let _ = env_logger::Builder::new().filter_level(level).try_init();
}

/// Reports sync progress through the `log` facade.
struct LogObserver;

impl SyncObserver for LogObserver {
    fn sync_started(&self, src_root: &Path, dst_root: &Path) {
        log::info!("sync {} -> {}", src_root.display(), dst_root.display());
    }

    fn file_copied(&self, dst_path: &Path, bytes: u64) {
        log::info!("copied {} ({bytes} bytes)", dst_path.display());
    }

    fn already_in_sync(&self) {
        log::info!("directories are in sync");
    }
}
