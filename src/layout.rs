use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    config::DEFAULT_CONFIG,
    error::{Error, Result},
    CONFIG_FILE, INCLUDES_DIR, LAYOUTS_DIR, POSTS_DIR, SITE_DIR,
};

/// the directories and files that make up a fresh elx site
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    pub dirs: &'a [&'a str],
    pub files: &'a [LayoutFile<'a>],
}

/// a file created by `init`, along with what gets written to it
#[derive(Debug, Clone, Copy)]
pub struct LayoutFile<'a> {
    pub path: &'a str,
    pub contents: &'a str,
}

/// the layout generated by the `init` subcommand
pub const DEFAULT_LAYOUT: Layout<'static> = Layout {
    dirs: &[SITE_DIR, INCLUDES_DIR, LAYOUTS_DIR, POSTS_DIR],
    files: &[LayoutFile {
        path: CONFIG_FILE,
        contents: DEFAULT_CONFIG,
    }],
};

/// what `init` did; files that could not be written are collected rather than aborting
#[derive(Debug, Default)]
pub struct InitReport {
    pub dirs: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl InitReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Create `layout` underneath `base`.
///
/// Directories are created first, recursively and idempotently, and any failure there is
/// returned immediately. Files are then written, overwriting whatever is already present;
/// a failed write is logged and recorded in the report while the remaining files are
/// still attempted.
pub fn init(base: impl AsRef<Path>, layout: &Layout) -> Result<InitReport> {
    let base = base.as_ref();
    let mut report = InitReport::default();

    for dir in layout.dirs {
        let path = base.join(dir);
        create_dir(&path).map_err(|source| Error::DirError {
            path: path.clone(),
            source,
        })?;
        log::debug!("Created directory: {}", path.display());
        report.dirs.push(path);
    }

    for file in layout.files {
        let path = base.join(file.path);
        match fs::write(&path, file.contents) {
            Ok(()) => {
                log::debug!("Created file: {}", path.display());
                report.files.push(path);
            }
            Err(err) => {
                log::warn!("Failed to write `{}`: {err}", path.display());
                report.failed.push(path);
            }
        }
    }

    Ok(report)
}

#[cfg(unix)]
fn create_dir(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o775).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
}
